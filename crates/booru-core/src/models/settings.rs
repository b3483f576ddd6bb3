//! 应用程序设置数据模型

use serde::{Deserialize, Serialize};

/// 搜索设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    /// 未指定 limit 时的默认页大小
    pub default_page_size: i64,
    /// 页大小上限，超出时截断
    pub max_page_size: i64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 500,
        }
    }
}

/// 数据库设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// 锁等待超时（毫秒）
    pub busy_timeout_ms: u64,
    /// 页缓存大小（KB）
    pub cache_size_kb: i64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5000,
            cache_size_kb: 64000, // 64MB
        }
    }
}

/// 日志设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// EnvFilter 语法，RUST_LOG 优先
    pub level: String,
    /// 是否写入滚动日志文件
    pub file_logging: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            file_logging: true,
        }
    }
}

/// 应用程序设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// 搜索设置
    pub search: SearchSettings,
    /// 数据库设置
    pub database: DatabaseSettings,
    /// 日志设置
    pub logging: LoggingSettings,
}
