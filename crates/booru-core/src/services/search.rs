//! 搜索执行器
//!
//! 解析 → 分页校验 → 编译 → 在同一快照内执行计数、分页与 has-more 探测。

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

use crate::db::Database;
use crate::models::{AppSettings, SearchRequest, SearchResult};
use crate::services::pagination::{fetch_page, PageWindow};
use crate::services::query_compiler::compile;
use crate::services::query_parser::QueryParser;
use crate::utils::error::AppResult;

/// 搜索服务
#[derive(Clone)]
pub struct SearchService {
    db: Arc<Database>,
    settings: Arc<RwLock<AppSettings>>,
}

impl SearchService {
    pub fn new(db: Arc<Database>, settings: Arc<RwLock<AppSettings>>) -> Self {
        Self { db, settings }
    }

    /// Tag query search with keyset paging.
    ///
    /// `after_id` and `before_id` are mutually exclusive; neither means the
    /// first page.
    pub fn search(
        &self,
        query: &str,
        limit: i64,
        after_id: Option<i64>,
        before_id: Option<i64>,
    ) -> AppResult<SearchResult> {
        self.execute(&SearchRequest {
            query: query.to_string(),
            limit,
            after_id,
            before_id,
            ..Default::default()
        })
    }

    /// 执行完整的搜索请求（含元过滤与 offset）
    pub fn execute(&self, request: &SearchRequest) -> AppResult<SearchResult> {
        let start = Instant::now();

        // 语法错误优先于其他错误
        let query = QueryParser::parse(&request.query)?;
        if query.is_empty() && request.filters.is_empty() {
            tracing::debug!("空查询，匹配全部媒体");
        }

        let max_page_size = self.settings.read().search.max_page_size;
        let window = PageWindow::new(
            request.limit,
            request.after_id,
            request.before_id,
            request.offset,
            max_page_size,
        )?;

        let compiled = compile(&query, &request.filters)?;
        let result = self
            .db
            .read_snapshot(|conn| fetch_page(conn, &compiled, &window))?;

        tracing::debug!(
            "搜索 {:?} 完成: {} 条 / 共 {} 条, has_more={}, 耗时 {}ms",
            request.query,
            result.media.len(),
            result.total_count,
            result.has_more,
            start.elapsed().as_millis()
        );

        Ok(result)
    }

    /// 在阻塞线程池中执行搜索
    #[cfg(feature = "tokio-runtime")]
    pub async fn execute_async(&self, request: SearchRequest) -> AppResult<SearchResult> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.execute(&request))
            .await
            .map_err(|e| crate::utils::error::AppError::Internal(format!("搜索任务失败: {}", e)))?
    }

    /// 未指定 limit 时使用的页大小
    pub fn default_page_size(&self) -> i64 {
        self.settings.read().search.default_page_size
    }
}
