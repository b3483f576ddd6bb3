//! 日志初始化
//!
//! 控制台输出 + 按天滚动的日志文件（`logs_dir()/booru.log.YYYY-MM-DD`）。
//! `RUST_LOG` 优先于设置中的日志级别。

use booru_core::models::LoggingSettings;
use booru_core::{AppResult, PathProvider};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "booru.log";

/// 构造日志过滤器
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局日志
///
/// 返回的 guard 必须在应用生命周期内保持存活，否则文件日志会丢失缓冲内容。
/// 全局订阅者已存在时（例如测试中重复初始化）仅记录并跳过。
pub fn init(provider: &dyn PathProvider, settings: &LoggingSettings) -> AppResult<Option<WorkerGuard>> {
    let (file_layer, guard) = if settings.file_logging {
        let logs_dir = provider.logs_dir();
        std::fs::create_dir_all(&logs_dir)?;

        let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
    {
        tracing::debug!("日志系统已初始化，跳过: {}", e);
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use booru_core::paths::DefaultPathProvider;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_logs_dir() {
        let tmp = TempDir::new().unwrap();
        let provider = DefaultPathProvider::with_base_dir(tmp.path().to_path_buf());

        let guard = init(&provider, &LoggingSettings::default()).unwrap();
        assert!(guard.is_some());
        assert!(provider.logs_dir().is_dir());

        // 第二次初始化不报错
        let settings = LoggingSettings {
            file_logging: false,
            ..Default::default()
        };
        assert!(init(&provider, &settings).unwrap().is_none());
    }

    #[test]
    fn test_bad_level_falls_back() {
        let settings = LoggingSettings {
            level: "not a level [".to_string(),
            ..Default::default()
        };
        // 不会 panic
        let _ = env_filter(&settings);
    }
}
