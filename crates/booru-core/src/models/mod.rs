//! Booru 数据模型模块
//!
//! 包含所有数据结构定义

pub mod media;
pub mod search;
pub mod settings;
pub mod tag;

// 重新导出常用类型
pub use media::{CreateMedia, Media, MediaType, Rating};
pub use search::{DateRange, MetaFilters, NumericRange, SearchQuery, SearchRequest, SearchResult};
pub use settings::{AppSettings, DatabaseSettings, LoggingSettings, SearchSettings};
pub use tag::{CreateTag, Tag, TagCategory};
