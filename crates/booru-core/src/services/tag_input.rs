//! 标签输入解析
//!
//! 用于为媒体打标签，格式：`tag_one artist:someone meta:highres`。
//! 分类前缀只在第一个 `:` 处拆分；未知前缀视为标签名的一部分。

use crate::models::{CreateTag, TagCategory};
use crate::services::lexer;
use crate::utils::error::{AppError, AppResult};

/// 标签名首尾不允许出现的字符
const RESTRICTED_EDGE_CHARS: [char; 4] = ['-', '~', ':', '*'];

/// 校验标签名
pub fn validate_tag_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::InvalidInput("标签名不能为空".to_string()));
    }

    if let Some(bad) = name.chars().find(|c| !lexer::is_tag_char(*c)) {
        return Err(AppError::InvalidInput(format!(
            "标签 '{}' 包含非法字符 {:?}",
            name, bad
        )));
    }

    if let Some(first) = name.chars().next().filter(|c| RESTRICTED_EDGE_CHARS.contains(c)) {
        return Err(AppError::InvalidInput(format!(
            "标签 '{}' 不能以 '{}' 开头",
            name, first
        )));
    }
    if let Some(last) = name.chars().last().filter(|c| RESTRICTED_EDGE_CHARS.contains(c)) {
        return Err(AppError::InvalidInput(format!(
            "标签 '{}' 不能以 '{}' 结尾",
            name, last
        )));
    }

    Ok(())
}

/// 解析用户输入的标签列表
///
/// 全部转为小写，重复标签只保留第一次出现。任一标签非法时整体失败。
pub fn parse_tag_input(input: &str) -> AppResult<Vec<CreateTag>> {
    let lowered = input.to_lowercase();
    let mut tags: Vec<CreateTag> = Vec::new();

    for word in lowered.split(lexer::is_whitespace).filter(|w| !w.is_empty()) {
        let (name, category) = match word.split_once(':') {
            Some((prefix, rest)) => match TagCategory::from_prefix(prefix) {
                Some(category) => (rest, category),
                None => (word, TagCategory::General),
            },
            None => (word, TagCategory::General),
        };

        // `artist:` 这类只有前缀的输入直接跳过
        if name.is_empty() {
            continue;
        }
        validate_tag_name(name)?;

        if tags.iter().any(|t| t.name == name) {
            continue;
        }
        tags.push(CreateTag {
            name: name.to_string(),
            category,
        });
    }

    Ok(tags)
}
