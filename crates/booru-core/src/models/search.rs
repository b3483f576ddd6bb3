//! 搜索相关数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::{Media, MediaType, Rating};
use crate::services::lexer::Operator;

/// Parsed tag query.
///
/// Built fresh by [`crate::services::query_parser::parse`] for every call and
/// never mutated afterwards. Tag names are kept exactly as typed; the
/// compiler normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Every tag must be present.
    pub include_tags: Vec<String>,
    /// At least one tag must be present when non-empty.
    pub optional_tags: Vec<String>,
    /// No tag may be present.
    pub exclude_tags: Vec<String>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.include_tags.is_empty() && self.optional_tags.is_empty() && self.exclude_tags.is_empty()
    }

    /// Canonical query string for this AST.
    ///
    /// Optional terms are written with the `~` prefix, so the `or` keyword
    /// never appears in the output. Parsing the result yields an equal query.
    pub fn to_query_string(&self) -> String {
        let include = self.include_tags.iter().cloned();
        let optional = self
            .optional_tags
            .iter()
            .map(|t| format!("{}{}", Operator::Optional.as_char(), t));
        let exclude = self
            .exclude_tags
            .iter()
            .map(|t| format!("{}{}", Operator::Exclude.as_char(), t));
        include.chain(optional).chain(exclude).collect::<Vec<_>>().join(" ")
    }
}

/// 数值区间（闭区间，两端均可省略）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumericRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl NumericRange {
    pub fn between(min: i64, max: i64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    pub fn at_least(min: i64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn at_most(max: i64) -> Self {
        Self { min: None, max: Some(max) }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// 创建时间区间（闭区间）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateRange {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_unbounded(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }
}

/// Non-tag constraints over media attributes. Every field is optional and an
/// absent bound imposes nothing; present fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaFilters {
    /// 分级属于集合之一
    pub ratings: Vec<Rating>,
    /// 媒体类型属于集合之一
    pub media_types: Vec<MediaType>,
    pub width: NumericRange,
    pub height: NumericRange,
    pub file_size: NumericRange,
    pub view_count: NumericRange,
    pub is_favorite: Option<bool>,
    pub has_parent: Option<bool>,
    pub has_children: Option<bool>,
    pub parent_id: Option<i64>,
    pub created: DateRange,
}

impl MetaFilters {
    pub fn is_empty(&self) -> bool {
        *self == MetaFilters::default()
    }
}

/// A complete search call: query text, metafilters and paging inputs.
///
/// `after_id`, `before_id` and `offset` are mutually exclusive; all three
/// absent means the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub query: String,
    pub filters: MetaFilters,
    pub limit: i64,
    #[serde(rename = "afterID", alias = "afterId")]
    pub after_id: Option<i64>,
    #[serde(rename = "beforeID", alias = "beforeId")]
    pub before_id: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: i64) -> Self {
        Self {
            query: query.into(),
            limit,
            ..Default::default()
        }
    }

    pub fn after(mut self, id: i64) -> Self {
        self.after_id = Some(id);
        self
    }

    pub fn before(mut self, id: i64) -> Self {
        self.before_id = Some(id);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_filters(mut self, filters: MetaFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// 按 ID 升序
    pub media: Vec<Media>,
    /// 匹配总数（忽略分页）
    pub total_count: i64,
    #[serde(rename = "firstID")]
    pub first_id: Option<i64>,
    #[serde(rename = "lastID")]
    pub last_id: Option<i64>,
    /// 是否存在 ID > last_id 的匹配记录
    pub has_more: bool,
}

impl SearchResult {
    pub fn empty(total_count: i64) -> Self {
        Self {
            media: Vec::new(),
            total_count,
            first_id: None,
            last_id: None,
            has_more: false,
        }
    }

    pub fn ids(&self) -> Vec<i64> {
        self.media.iter().map(|m| m.id).collect()
    }
}
