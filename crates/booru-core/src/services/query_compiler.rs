//! 查询编译器
//!
//! Turns a parsed [`SearchQuery`] plus [`MetaFilters`] into SQL conditions
//! over `media m`. Produces a predicate description only; execution belongs to
//! the pagination layer.
//!
//! Group semantics:
//! - every include tag gets its own `EXISTS` check (intersection)
//! - optional tags share one `EXISTS ... IN (...)` check (union)
//! - exclude tags share one `NOT EXISTS ... IN (...)` check
//!
//! Groups are ANDed together, then ANDed with the metafilters. An unknown
//! include tag therefore matches nothing and an unknown exclude tag
//! excludes nothing. `tags.name` is `COLLATE NOCASE`, so lookups are
//! case-insensitive on top of the lower-casing done here.

use rusqlite::types::{ToSql, ToSqlOutput};

use crate::models::{MetaFilters, NumericRange, SearchQuery};
use crate::utils::error::{AppError, AppResult};

/// Bound parameter for a compiled condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Int(v) => v.to_sql(),
            SqlParam::Text(s) => s.to_sql(),
        }
    }
}

/// 编译结果：AND 连接的条件及其参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    /// `media m` 上的条件，按 AND 组合
    pub conditions: Vec<String>,
    /// 与条件中的 `?` 一一对应
    pub params: Vec<SqlParam>,
    /// 已应用的过滤项（用于日志）
    pub facets: Vec<&'static str>,
}

impl CompiledQuery {
    /// ` WHERE ...`，无条件时为空串
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Copy of this query with one more condition appended.
    pub fn bounded(&self, condition: &str, param: SqlParam) -> CompiledQuery {
        let mut bounded = self.clone();
        bounded.conditions.push(condition.to_string());
        bounded.params.push(param);
        bounded
    }

    fn push(&mut self, facet: &'static str, condition: impl Into<String>, params: Vec<SqlParam>) {
        self.conditions.push(condition.into());
        self.params.extend(params);
        self.facets.push(facet);
    }

    fn push_range(&mut self, facet: &'static str, column: &str, range: &NumericRange) {
        if range.is_unbounded() {
            return;
        }
        if let Some(min) = range.min {
            self.push(facet, format!("{} >= ?", column), vec![SqlParam::Int(min)]);
        }
        if let Some(max) = range.max {
            self.push(facet, format!("{} <= ?", column), vec![SqlParam::Int(max)]);
        }
    }
}

const TAG_MEMBERSHIP: &str = "SELECT 1 FROM media_tags mt JOIN tags t ON t.id = mt.tag_id WHERE mt.media_id = m.id";

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Trim, lower-case and de-duplicate tag names, keeping first occurrence order.
///
/// An empty name cannot come out of the parser, so it is reported as an
/// internal error rather than a user error.
fn normalize_tags(group: &'static str, tags: &[String]) -> AppResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = tag.trim().to_ascii_lowercase();
        if name.is_empty() {
            tracing::error!("编译失败：{} 组中存在空标签名", group);
            return Err(AppError::Internal(format!("{} 组中存在空标签名", group)));
        }
        if !normalized.contains(&name) {
            normalized.push(name);
        }
    }
    Ok(normalized)
}

fn text_params(values: impl IntoIterator<Item = String>) -> Vec<SqlParam> {
    values.into_iter().map(SqlParam::Text).collect()
}

/// 编译查询与元过滤条件
pub fn compile(query: &SearchQuery, filters: &MetaFilters) -> AppResult<CompiledQuery> {
    let mut compiled = CompiledQuery::default();

    // 包含：每个标签独立 EXISTS
    for name in normalize_tags("include", &query.include_tags)? {
        compiled.push(
            "include",
            format!("EXISTS ({} AND t.name = ?)", TAG_MEMBERSHIP),
            vec![SqlParam::Text(name)],
        );
    }

    // 可选：至少命中一个
    let optional = normalize_tags("optional", &query.optional_tags)?;
    if !optional.is_empty() {
        compiled.push(
            "optional",
            format!("EXISTS ({} AND t.name IN ({}))", TAG_MEMBERSHIP, placeholders(optional.len())),
            text_params(optional),
        );
    }

    // 排除：一个都不能有
    let exclude = normalize_tags("exclude", &query.exclude_tags)?;
    if !exclude.is_empty() {
        compiled.push(
            "exclude",
            format!("NOT EXISTS ({} AND t.name IN ({}))", TAG_MEMBERSHIP, placeholders(exclude.len())),
            text_params(exclude),
        );
    }

    compile_filters(&mut compiled, filters);

    tracing::debug!(
        "查询编译完成: {} 个条件, facets={:?}",
        compiled.conditions.len(),
        compiled.facets
    );
    Ok(compiled)
}

fn compile_filters(compiled: &mut CompiledQuery, filters: &MetaFilters) {
    if !filters.ratings.is_empty() {
        compiled.push(
            "rating",
            format!("m.rating IN ({})", placeholders(filters.ratings.len())),
            text_params(filters.ratings.iter().map(|r| r.as_str().to_string())),
        );
    }

    if !filters.media_types.is_empty() {
        compiled.push(
            "media_type",
            format!("m.media_type IN ({})", placeholders(filters.media_types.len())),
            text_params(filters.media_types.iter().map(|t| t.as_str().to_string())),
        );
    }

    compiled.push_range("width", "m.width", &filters.width);
    compiled.push_range("height", "m.height", &filters.height);
    compiled.push_range("file_size", "m.file_size", &filters.file_size);
    compiled.push_range("view_count", "m.view_count", &filters.view_count);

    if let Some(favorite) = filters.is_favorite {
        compiled.push(
            "favorite",
            "m.is_favorite = ?",
            vec![SqlParam::Int(i64::from(favorite))],
        );
    }

    match filters.has_parent {
        Some(true) => compiled.push("has_parent", "m.parent_id IS NOT NULL", Vec::new()),
        Some(false) => compiled.push("has_parent", "m.parent_id IS NULL", Vec::new()),
        None => {}
    }

    if let Some(parent_id) = filters.parent_id {
        compiled.push("parent_id", "m.parent_id = ?", vec![SqlParam::Int(parent_id)]);
    }

    if let Some(has_children) = filters.has_children {
        compiled.push(
            "has_children",
            "m.has_children = ?",
            vec![SqlParam::Int(i64::from(has_children))],
        );
    }

    if filters.created.is_unbounded() {
        return;
    }
    if let Some(after) = filters.created.after {
        compiled.push("created_after", "m.created_at >= ?", vec![SqlParam::Int(after.timestamp())]);
    }
    if let Some(before) = filters.created.before {
        compiled.push("created_before", "m.created_at <= ?", vec![SqlParam::Int(before.timestamp())]);
    }
}
