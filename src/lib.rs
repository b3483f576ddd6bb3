//! Booru - 基于标签检索的媒体库
//!
//! 应用层：启动、日志与前端调用的命令

pub mod commands;
pub mod logging;

use std::sync::Arc;

use booru_core::paths::DefaultPathProvider;
use booru_core::{AppResult, BooruCore, SettingsManager, SharedPathProvider};
use tracing_appender::non_blocking::WorkerGuard;

/// 应用程序状态
pub struct AppState {
    pub core: Arc<BooruCore>,
    pub settings_manager: Arc<SettingsManager>,
    /// 文件日志写入线程的 guard，随状态一同释放
    _log_guard: Option<WorkerGuard>,
}

impl AppState {
    /// 不初始化日志的状态（用于测试或宿主自行管理日志）
    pub fn new(core: BooruCore, settings_manager: SettingsManager) -> Self {
        Self {
            core: Arc::new(core),
            settings_manager: Arc::new(settings_manager),
            _log_guard: None,
        }
    }

    /// 加载设置、初始化日志并打开数据库
    pub fn bootstrap(path_provider: SharedPathProvider) -> AppResult<Self> {
        let settings_manager = SettingsManager::new(path_provider.as_ref())?;
        let settings = settings_manager.load()?;

        let log_guard = logging::init(path_provider.as_ref(), &settings.logging)?;

        tracing::info!("Booru 启动中...");
        tracing::info!("数据库路径: {:?}", path_provider.database_path());

        let core = BooruCore::with_settings(path_provider, settings)?;

        tracing::info!("数据库初始化完成");

        Ok(Self {
            core: Arc::new(core),
            settings_manager: Arc::new(settings_manager),
            _log_guard: log_guard,
        })
    }
}

/// 使用默认数据目录启动
pub fn run() -> AppResult<AppState> {
    AppState::bootstrap(Arc::new(DefaultPathProvider::new()))
}
