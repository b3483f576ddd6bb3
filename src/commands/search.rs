//! 搜索相关命令

use booru_core::models::{MetaFilters, SearchQuery, SearchRequest, SearchResult};
use booru_core::services::{parse, parse_filter_directives};
use booru_core::{CommandError, DatabaseStats};

use super::run_blocking;
use crate::AppState;

/// 标签查询搜索
///
/// 未指定 `limit` 时使用设置中的默认页大小；`after_id`、`before_id`、
/// `offset` 至多指定一个。
pub async fn search_media(
    state: &AppState,
    query: String,
    filters: Option<MetaFilters>,
    limit: Option<i64>,
    after_id: Option<i64>,
    before_id: Option<i64>,
    offset: Option<i64>,
) -> Result<SearchResult, CommandError> {
    let service = state.core.search().clone();

    let request = SearchRequest {
        query,
        filters: filters.unwrap_or_default(),
        limit: limit.unwrap_or_else(|| service.default_page_size()),
        after_id,
        before_id,
        offset,
    };

    service.execute_async(request).await.map_err(CommandError::from)
}

/// 仅解析查询（用于前端实时校验与高亮）
pub async fn parse_search_query(query: String) -> Result<SearchQuery, CommandError> {
    parse(&query).map_err(CommandError::from)
}

/// 解析元过滤指令
pub async fn parse_search_filters(input: String) -> Result<MetaFilters, CommandError> {
    Ok(parse_filter_directives(&input))
}

/// 获取数据库统计信息
pub async fn get_database_stats(state: &AppState) -> Result<DatabaseStats, CommandError> {
    let db = state.core.db.clone();
    run_blocking(move || db.stats()).await
}
