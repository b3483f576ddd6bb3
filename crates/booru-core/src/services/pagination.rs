//! 键集分页
//!
//! Pages are windows over the compiled predicate ordered by `m.id`. The
//! cursor is a value comparison (`id > after`, `id < before`), never a row
//! lookup, so the anchor row may disappear between requests.
//!
//! Ordering is fixed to ascending media ID. Any other sort key would need a
//! composite `(key, id)` cursor in place of the bare ID bounds below.

use rusqlite::{params_from_iter, Connection};

use crate::db::media_dao::row_to_media;
use crate::models::{Media, SearchResult};
use crate::services::query_compiler::{CompiledQuery, SqlParam};
use crate::utils::error::{AppError, AppResult};

/// Where the requested page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAnchor {
    /// 第一页
    First,
    /// 跳过前 n 条匹配记录
    Offset(i64),
    /// ID 大于该值（下一页）
    After(i64),
    /// ID 小于该值（上一页）
    Before(i64),
}

/// 已校验的分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub anchor: PageAnchor,
}

impl PageWindow {
    /// Validate caller paging input.
    ///
    /// Rejects a non-positive limit, a negative offset and more than one of
    /// `after_id`/`before_id`/`offset`. A limit above `max_page_size` is
    /// clamped.
    pub fn new(
        limit: i64,
        after_id: Option<i64>,
        before_id: Option<i64>,
        offset: Option<i64>,
        max_page_size: i64,
    ) -> AppResult<Self> {
        if limit <= 0 {
            return Err(AppError::InvalidInput(format!("limit 必须为正数: {}", limit)));
        }

        let anchor = match (after_id, before_id, offset) {
            (None, None, None) => PageAnchor::First,
            (Some(after), None, None) => PageAnchor::After(after),
            (None, Some(before), None) => PageAnchor::Before(before),
            (None, None, Some(offset)) if offset < 0 => {
                return Err(AppError::InvalidInput(format!("offset 不能为负数: {}", offset)));
            }
            (None, None, Some(0)) => PageAnchor::First,
            (None, None, Some(offset)) => PageAnchor::Offset(offset),
            _ => {
                return Err(AppError::InvalidInput(
                    "afterID、beforeID 与 offset 只能指定一个".to_string(),
                ));
            }
        };

        let max = max_page_size.max(1);
        let limit = if limit > max {
            tracing::debug!("limit {} 超过上限，截断为 {}", limit, max);
            max
        } else {
            limit
        };

        Ok(Self { limit, anchor })
    }
}

fn query_media(conn: &Connection, sql: &str, params: &[SqlParam]) -> AppResult<Vec<Media>> {
    let mut stmt = conn.prepare(sql)?;
    let media = stmt
        .query_map(params_from_iter(params.iter()), row_to_media)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(media)
}

/// 匹配总数（忽略分页）
pub fn count_matches(conn: &Connection, compiled: &CompiledQuery) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM media m{}", compiled.where_sql());
    let count = conn.query_row(&sql, params_from_iter(compiled.params.iter()), |row| row.get(0))?;
    Ok(count)
}

/// 是否存在 ID 大于 `last_id` 的匹配记录
pub fn exists_after(conn: &Connection, compiled: &CompiledQuery, last_id: i64) -> AppResult<bool> {
    let bounded = compiled.bounded("m.id > ?", SqlParam::Int(last_id));
    let sql = format!("SELECT EXISTS(SELECT 1 FROM media m{})", bounded.where_sql());
    let exists = conn.query_row(&sql, params_from_iter(bounded.params.iter()), |row| row.get(0))?;
    Ok(exists)
}

/// 取一页数据，结果始终按 ID 升序
pub fn fetch_window(
    conn: &Connection,
    compiled: &CompiledQuery,
    window: &PageWindow,
) -> AppResult<Vec<Media>> {
    let (query, order, offset) = match window.anchor {
        PageAnchor::First => (compiled.clone(), "ASC", None),
        PageAnchor::Offset(n) => (compiled.clone(), "ASC", Some(n)),
        PageAnchor::After(id) => (compiled.bounded("m.id > ?", SqlParam::Int(id)), "ASC", None),
        PageAnchor::Before(id) => (compiled.bounded("m.id < ?", SqlParam::Int(id)), "DESC", None),
    };

    let mut sql = format!(
        "SELECT m.* FROM media m{} ORDER BY m.id {} LIMIT ?",
        query.where_sql(),
        order
    );
    let mut params = query.params;
    params.push(SqlParam::Int(window.limit));
    if let Some(n) = offset {
        sql.push_str(" OFFSET ?");
        params.push(SqlParam::Int(n));
    }

    let mut media = query_media(conn, &sql, &params)?;
    if order == "DESC" {
        media.reverse();
    }
    Ok(media)
}

/// Count, page and has-more check for one window.
///
/// Callers should run this inside [`crate::db::Database::read_snapshot`] so
/// the three reads agree.
pub fn fetch_page(
    conn: &Connection,
    compiled: &CompiledQuery,
    window: &PageWindow,
) -> AppResult<SearchResult> {
    let total_count = count_matches(conn, compiled)?;
    let media = fetch_window(conn, compiled, window)?;

    let (first_id, last_id) = match (media.first(), media.last()) {
        (Some(first), Some(last)) => (first.id, last.id),
        _ => return Ok(SearchResult::empty(total_count)),
    };
    let has_more = exists_after(conn, compiled, last_id)?;

    Ok(SearchResult {
        media,
        total_count,
        first_id: Some(first_id),
        last_id: Some(last_id),
        has_more,
    })
}
