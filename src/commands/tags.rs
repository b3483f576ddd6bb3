//! 标签管理命令

use booru_core::models::Tag;
use booru_core::services::parse_tag_input;
use booru_core::CommandError;

use super::run_blocking;
use crate::AppState;

/// 自动补全默认返回数量
const DEFAULT_SUGGESTION_LIMIT: i64 = 10;

/// 根据名称获取标签（不区分大小写）
pub async fn get_tag_by_name(state: &AppState, tag_name: String) -> Result<Option<Tag>, CommandError> {
    let db = state.core.db.clone();
    run_blocking(move || db.get_tag_by_name(&tag_name)).await
}

/// 标签前缀补全，按使用次数排序
pub async fn suggest_tags(
    state: &AppState,
    prefix: String,
    limit: Option<i64>,
) -> Result<Vec<Tag>, CommandError> {
    let db = state.core.db.clone();
    let limit = limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT);
    run_blocking(move || db.suggest_tags(&prefix, limit)).await
}

/// 获取媒体的所有标签
pub async fn get_tags_for_media(state: &AppState, media_id: i64) -> Result<Vec<Tag>, CommandError> {
    let db = state.core.db.clone();
    run_blocking(move || db.get_tags_for_media(media_id)).await
}

/// 为媒体添加标签
///
/// `input` 为空白分隔的标签列表，可带分类前缀（`artist:name`）。
pub async fn add_tags_to_media(
    state: &AppState,
    media_id: i64,
    input: String,
) -> Result<Vec<Tag>, CommandError> {
    let tags = parse_tag_input(&input).map_err(CommandError::from)?;
    let db = state.core.db.clone();
    run_blocking(move || db.add_tags_to_media(media_id, &tags)).await
}

/// 从媒体移除标签
pub async fn remove_tag_from_media(
    state: &AppState,
    media_id: i64,
    tag_id: i64,
) -> Result<bool, CommandError> {
    let db = state.core.db.clone();
    run_blocking(move || db.remove_tag_from_media(media_id, tag_id)).await
}
