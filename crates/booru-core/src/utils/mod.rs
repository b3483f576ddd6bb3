//! Booru 工具模块
//!
//! 包含通用工具函数

pub mod error;

pub use error::*;

/// 当前 Unix 时间戳（秒）
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
