//! 媒体数据模型

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// 媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }
}

/// 内容分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    #[default]
    Safe,
    Questionable,
    Explicit,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Safe => "safe",
            Rating::Questionable => "questionable",
            Rating::Explicit => "explicit",
        }
    }

    /// 解析分级，接受完整名称与单字母缩写
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "safe" | "s" => Some(Rating::Safe),
            "questionable" | "q" => Some(Rating::Questionable),
            "explicit" | "e" => Some(Rating::Explicit),
            _ => None,
        }
    }
}

macro_rules! impl_text_sql {
    ($ty:ty, $name:literal) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                <$ty>::parse(s)
                    .ok_or_else(|| FromSqlError::Other(format!("未知{}: {}", $name, s).into()))
            }
        }
    };
}

impl_text_sql!(MediaType, "媒体类型");
impl_text_sql!(Rating, "分级");

/// 媒体记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// 媒体ID（插入时单调递增）
    pub id: i64,
    /// 内容哈希
    pub content_hash: String,
    /// 文件扩展名
    pub file_ext: String,
    pub media_type: MediaType,
    pub mime_type: String,
    /// 文件大小（字节）
    pub file_size: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// 时长（秒，音视频）
    pub duration: Option<f64>,
    pub rating: Rating,
    pub is_favorite: bool,
    /// tag_count = general + metadata + artist（由触发器维护）
    pub tag_count: i64,
    pub tag_count_general: i64,
    pub tag_count_metadata: i64,
    pub tag_count_artist: i64,
    pub parent_id: Option<i64>,
    pub has_children: bool,
    pub view_count: i64,
    /// Unix 秒
    pub created_at: i64,
    pub updated_at: i64,
    pub last_viewed_at: Option<i64>,
}

/// 用于创建媒体记录的输入结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedia {
    pub content_hash: String,
    pub file_ext: String,
    pub media_type: MediaType,
    pub mime_type: String,
    pub file_size: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub duration: Option<f64>,
    #[serde(default)]
    pub rating: Rating,
    pub parent_id: Option<i64>,
    /// 为空时使用当前时间
    pub created_at: Option<i64>,
}

impl CreateMedia {
    /// 最小化的图片输入，其余字段留空
    pub fn image(content_hash: impl Into<String>) -> Self {
        Self {
            content_hash: content_hash.into(),
            file_ext: "png".to_string(),
            media_type: MediaType::Image,
            mime_type: "image/png".to_string(),
            file_size: 0,
            width: None,
            height: None,
            duration: None,
            rating: Rating::Safe,
            parent_id: None,
            created_at: None,
        }
    }
}
