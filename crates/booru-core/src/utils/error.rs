//! Booru 错误处理模块
//!
//! 定义核心库错误类型

use serde::Serialize;
use thiserror::Error;

use crate::services::query_parser::ParseError;

/// 核心库错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 查询语法错误
    #[error("查询语法错误: {0}")]
    Parse(#[from] ParseError),

    /// 调用参数无效
    #[error("参数无效: {0}")]
    InvalidInput(String),

    /// 记录未找到
    #[error("未找到: {0}")]
    NotFound(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内部错误（不应出现，出现即为缺陷）
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for the command layer.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "E_DB_ERROR",
            AppError::Io(_) => "E_IO_ERROR",
            AppError::Serialization(_) => "E_SERIALIZATION",
            AppError::Parse(ParseError::InvalidCharacter { .. }) => "E_PARSE_INVALID_CHARACTER",
            AppError::Parse(ParseError::EmptyTag { .. }) => "E_PARSE_EMPTY_TAG",
            AppError::InvalidInput(_) => "E_INVALID_INPUT",
            AppError::NotFound(_) => "E_NOT_FOUND",
            AppError::Config(_) => "E_CONFIG",
            AppError::Internal(_) => "E_INTERNAL",
        }
    }

    /// 是否可由用户修正后重试（语法错误、参数错误）
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::Parse(_) | AppError::InvalidInput(_))
    }
}

/// 用于命令层返回的错误包装
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    /// 语法错误时携带出错字符与位置
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<AppError> for CommandError {
    fn from(err: AppError) -> Self {
        let details = match &err {
            AppError::Parse(parse_err) => serde_json::to_value(parse_err).ok(),
            _ => None,
        };

        CommandError {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}

impl From<ParseError> for CommandError {
    fn from(err: ParseError) -> Self {
        AppError::from(err).into()
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

// 实现 Serialize 以便可以直接返回给前端
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let cmd_error = CommandError {
            code: self.code().to_string(),
            message: self.to_string(),
            details: None,
        };
        cmd_error.serialize(serializer)
    }
}

/// 核心库结果类型别名
pub type AppResult<T> = Result<T, AppError>;
