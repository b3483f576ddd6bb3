//! 元过滤指令解析
//!
//! 支持的指令（可带 `/` 前缀）：
//! - `favorite:true|false`
//! - `minwidth:N` `maxwidth:N` `minheight:N` `maxheight:N`
//! - `minfilesize:N` `maxfilesize:N` `minviews:N` `maxviews:N`
//! - `rating:s|safe|q|questionable|e|explicit`（可重复，累加）
//! - `type:image|video|audio`（可重复，累加）
//! - `parent:none|false|any|true|<id>`
//! - `children:true|false`
//! - `after:YYYY-MM-DD` `before:YYYY-MM-DD`（含当天）
//!
//! 无法识别的指令与非法值会被忽略；同一标量指令出现多次时以最后一次为准。

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::{MediaType, MetaFilters, Rating};
use crate::services::lexer;

/// 解析元过滤指令字符串
pub fn parse_filter_directives(input: &str) -> MetaFilters {
    let mut filters = MetaFilters::default();

    for word in input.split(lexer::is_whitespace).filter(|w| !w.is_empty()) {
        let directive = word.strip_prefix('/').unwrap_or(word);
        match directive.split_once(':') {
            Some((key, value)) if apply(&mut filters, &key.to_ascii_lowercase(), value) => {}
            _ => tracing::debug!("忽略无效的过滤指令: {}", word),
        }
    }

    filters
}

/// 应用单条指令，返回是否被接受
fn apply(filters: &mut MetaFilters, key: &str, value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    match key {
        "favorite" => set(&mut filters.is_favorite, parse_bool(&lowered)),
        "minwidth" => set(&mut filters.width.min, parse_int(value)),
        "maxwidth" => set(&mut filters.width.max, parse_int(value)),
        "minheight" => set(&mut filters.height.min, parse_int(value)),
        "maxheight" => set(&mut filters.height.max, parse_int(value)),
        "minfilesize" => set(&mut filters.file_size.min, parse_int(value)),
        "maxfilesize" => set(&mut filters.file_size.max, parse_int(value)),
        "minviews" => set(&mut filters.view_count.min, parse_int(value)),
        "maxviews" => set(&mut filters.view_count.max, parse_int(value)),
        "rating" => push_unique(&mut filters.ratings, Rating::parse(&lowered)),
        "type" => push_unique(&mut filters.media_types, MediaType::parse(&lowered)),
        "children" => set(&mut filters.has_children, parse_bool(&lowered)),
        "parent" => match lowered.as_str() {
            "none" | "false" => {
                filters.has_parent = Some(false);
                filters.parent_id = None;
                true
            }
            "any" | "true" => {
                filters.has_parent = Some(true);
                filters.parent_id = None;
                true
            }
            _ => match parse_int(value) {
                Some(id) => {
                    filters.has_parent = Some(true);
                    filters.parent_id = Some(id);
                    true
                }
                None => false,
            },
        },
        "after" => set(
            &mut filters.created.after,
            NaiveTime::from_hms_opt(0, 0, 0).and_then(|start| parse_day(value, start)),
        ),
        "before" => set(
            &mut filters.created.before,
            NaiveTime::from_hms_opt(23, 59, 59).and_then(|end| parse_day(value, end)),
        ),
        _ => false,
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            if !list.contains(&v) {
                list.push(v);
            }
            true
        }
        None => false,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.parse().ok()
}

fn parse_day(value: &str, time: NaiveTime) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NumericRange;

    #[test]
    fn test_empty_input() {
        assert!(parse_filter_directives("").is_empty());
        assert!(parse_filter_directives("   ").is_empty());
    }

    #[test]
    fn test_numeric_ranges() {
        let filters = parse_filter_directives("/minwidth:800 maxwidth:1920 /minheight:600 maxfilesize:5000 minviews:2");
        assert_eq!(filters.width, NumericRange::between(800, 1920));
        assert_eq!(filters.height, NumericRange::at_least(600));
        assert_eq!(filters.file_size, NumericRange::at_most(5000));
        assert_eq!(filters.view_count, NumericRange::at_least(2));
    }

    #[test]
    fn test_ratings_and_types_accumulate() {
        let filters = parse_filter_directives("rating:s /rating:Explicit rating:safe type:video type:audio");
        assert_eq!(filters.ratings, vec![Rating::Safe, Rating::Explicit]);
        assert_eq!(filters.media_types, vec![MediaType::Video, MediaType::Audio]);
    }

    #[test]
    fn test_parent_forms() {
        assert_eq!(parse_filter_directives("parent:none").has_parent, Some(false));
        assert_eq!(parse_filter_directives("parent:any").has_parent, Some(true));

        let filters = parse_filter_directives("parent:42");
        assert_eq!(filters.has_parent, Some(true));
        assert_eq!(filters.parent_id, Some(42));

        // 后出现的指令覆盖先前的
        let filters = parse_filter_directives("parent:42 parent:none");
        assert_eq!(filters.has_parent, Some(false));
        assert_eq!(filters.parent_id, None);
    }

    #[test]
    fn test_flags() {
        let filters = parse_filter_directives("favorite:true children:false");
        assert_eq!(filters.is_favorite, Some(true));
        assert_eq!(filters.has_children, Some(false));

        let filters = parse_filter_directives("favorite:true favorite:false");
        assert_eq!(filters.is_favorite, Some(false));
    }

    #[test]
    fn test_date_bounds_are_inclusive_days() {
        let filters = parse_filter_directives("after:2024-01-01 before:2024-01-31");
        assert_eq!(
            filters.created.after,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            filters.created.before,
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn test_invalid_directives_are_ignored() {
        let filters = parse_filter_directives(
            "minwidth:wide rating:nsfw type:gif favorite:maybe after:yesterday unknown:1 plain /",
        );
        assert!(filters.is_empty());

        // 非法值不会覆盖已有的合法值
        let filters = parse_filter_directives("minwidth:100 minwidth:abc");
        assert_eq!(filters.width.min, Some(100));
    }
}
