//! Booru 服务模块
//!
//! 查询解析、编译、分页与搜索执行

pub mod lexer;
pub mod query_parser;
pub mod query_compiler;
pub mod pagination;
pub mod filters;
pub mod tag_input;
pub mod search;
pub mod settings;

// 重新导出常用类型
pub use query_parser::{parse, ParseError, QueryParser};
pub use query_compiler::{compile, CompiledQuery, SqlParam};
pub use pagination::{fetch_page, PageAnchor, PageWindow};
pub use filters::parse_filter_directives;
pub use tag_input::{parse_tag_input, validate_tag_name};
pub use search::SearchService;
pub use settings::SettingsManager;
