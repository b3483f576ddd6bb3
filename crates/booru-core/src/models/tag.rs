//! 标签数据模型

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// 标签分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    #[default]
    General,
    Metadata,
    Artist,
}

impl TagCategory {
    /// 数据库中的数值编码
    pub fn as_i64(&self) -> i64 {
        match self {
            TagCategory::General => 0,
            TagCategory::Metadata => 1,
            TagCategory::Artist => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(TagCategory::General),
            1 => Some(TagCategory::Metadata),
            2 => Some(TagCategory::Artist),
            _ => None,
        }
    }

    /// 解析标签输入中的分类前缀
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "general" | "g" => Some(TagCategory::General),
            "metadata" | "meta" | "m" => Some(TagCategory::Metadata),
            "artist" | "a" => Some(TagCategory::Artist),
            _ => None,
        }
    }
}

impl ToSql for TagCategory {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for TagCategory {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        TagCategory::from_i64(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

/// 标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// 标签ID
    pub id: i64,
    /// 标签名（大小写不敏感唯一）
    pub name: String,
    pub category: TagCategory,
    /// 使用次数（由触发器维护）
    pub usage_count: i64,
    /// 创建时间（Unix 秒）
    pub created_at: i64,
}

/// 用于创建新标签的输入结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTag {
    pub name: String,
    #[serde(default)]
    pub category: TagCategory,
}

impl CreateTag {
    pub fn general(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: TagCategory::General,
        }
    }
}
