//! Booru 命令模块
//!
//! 前端调用的异步命令，统一返回 `Result<T, CommandError>`

pub mod search;
pub mod settings;
pub mod tags;

pub use search::*;
pub use settings::*;
pub use tags::*;

use booru_core::{AppError, AppResult, CommandError};

/// 在阻塞线程池中执行数据库操作
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, CommandError>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("后台任务失败: {}", e)))
        .and_then(|result| result)
        .map_err(CommandError::from)
}


#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use booru_core::paths::DefaultPathProvider;
    use booru_core::{BooruCore, SettingsManager};
    use tempfile::TempDir;

    use crate::AppState;

    /// 基于临时目录的应用状态；TempDir 需与状态一同存活
    pub fn test_state() -> (AppState, TempDir) {
        let tmp = TempDir::new().unwrap();
        let provider = Arc::new(DefaultPathProvider::with_base_dir(tmp.path().to_path_buf()));
        let manager = SettingsManager::new(provider.as_ref()).unwrap();
        let core = BooruCore::new(provider).unwrap();
        (AppState::new(core, manager), tmp)
    }
}
