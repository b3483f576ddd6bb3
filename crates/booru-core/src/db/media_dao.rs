//! 媒体数据访问层

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{CreateMedia, Media, Rating};
use crate::utils::error::{AppError, AppResult};
use crate::utils::unix_now;

use super::connection::Database;

/// 从数据库行映射到 Media 结构
pub(crate) fn row_to_media(row: &Row<'_>) -> rusqlite::Result<Media> {
    Ok(Media {
        id: row.get("id")?,
        content_hash: row.get("content_hash")?,
        file_ext: row.get("file_ext")?,
        media_type: row.get("media_type")?,
        mime_type: row.get("mime_type")?,
        file_size: row.get("file_size")?,
        width: row.get("width")?,
        height: row.get("height")?,
        duration: row.get("duration")?,
        rating: row.get("rating")?,
        is_favorite: row.get::<_, i32>("is_favorite")? != 0,
        tag_count: row.get("tag_count")?,
        tag_count_general: row.get("tag_count_general")?,
        tag_count_metadata: row.get("tag_count_metadata")?,
        tag_count_artist: row.get("tag_count_artist")?,
        parent_id: row.get("parent_id")?,
        has_children: row.get::<_, i32>("has_children")? != 0,
        view_count: row.get("view_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        last_viewed_at: row.get("last_viewed_at")?,
    })
}

fn insert_media(conn: &Connection, media: &CreateMedia) -> AppResult<i64> {
    let now = unix_now();
    conn.execute(
        r#"
        INSERT INTO media (
            content_hash, file_ext, media_type, mime_type, file_size,
            width, height, duration, rating, parent_id, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
        params![
            media.content_hash,
            media.file_ext,
            media.media_type,
            media.mime_type,
            media.file_size,
            media.width,
            media.height,
            media.duration,
            media.rating,
            media.parent_id,
            media.created_at.unwrap_or(now),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn media_exists(conn: &Connection, media_id: i64) -> AppResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM media WHERE id = ?1)",
        params![media_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

impl Database {
    // ==================== Media CRUD ====================

    /// 创建媒体记录
    pub fn create_media(&self, media: &CreateMedia) -> AppResult<i64> {
        let conn = self.connection()?;
        insert_media(&conn, media)
    }

    /// 批量创建媒体记录（单个事务）
    pub fn create_media_batch(&self, items: &[CreateMedia]) -> AppResult<Vec<i64>> {
        self.transaction(|conn| items.iter().map(|media| insert_media(conn, media)).collect())
    }

    /// 根据 ID 获取媒体
    pub fn get_media(&self, media_id: i64) -> AppResult<Option<Media>> {
        let conn = self.connection()?;
        let media = conn
            .query_row("SELECT * FROM media WHERE id = ?1", params![media_id], row_to_media)
            .optional()?;
        Ok(media)
    }

    /// 根据内容哈希获取媒体
    pub fn get_media_by_hash(&self, content_hash: &str) -> AppResult<Option<Media>> {
        let conn = self.connection()?;
        let media = conn
            .query_row(
                "SELECT * FROM media WHERE content_hash = ?1",
                params![content_hash],
                row_to_media,
            )
            .optional()?;
        Ok(media)
    }

    /// 删除媒体（关联标签级联删除，计数由触发器维护）
    pub fn delete_media(&self, media_id: i64) -> AppResult<bool> {
        let conn = self.connection()?;
        let rows = conn.execute("DELETE FROM media WHERE id = ?1", params![media_id])?;
        Ok(rows > 0)
    }

    /// 设置收藏状态
    pub fn set_media_favorite(&self, media_id: i64, is_favorite: bool) -> AppResult<bool> {
        let conn = self.connection()?;
        let rows = conn.execute(
            "UPDATE media SET is_favorite = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_favorite as i32, unix_now(), media_id],
        )?;
        Ok(rows > 0)
    }

    /// 设置分级
    pub fn set_media_rating(&self, media_id: i64, rating: Rating) -> AppResult<bool> {
        let conn = self.connection()?;
        let rows = conn.execute(
            "UPDATE media SET rating = ?1, updated_at = ?2 WHERE id = ?3",
            params![rating, unix_now(), media_id],
        )?;
        Ok(rows > 0)
    }

    /// 设置或清除父媒体
    pub fn set_media_parent(&self, media_id: i64, parent_id: Option<i64>) -> AppResult<bool> {
        if parent_id == Some(media_id) {
            return Err(AppError::InvalidInput("媒体不能以自身为父媒体".to_string()));
        }

        self.transaction(|conn| {
            if let Some(parent) = parent_id {
                if !media_exists(conn, parent)? {
                    return Err(AppError::NotFound(format!("父媒体 {}", parent)));
                }
            }
            let rows = conn.execute(
                "UPDATE media SET parent_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![parent_id, unix_now(), media_id],
            )?;
            Ok(rows > 0)
        })
    }

    /// 记录一次浏览
    pub fn record_view(&self, media_id: i64) -> AppResult<()> {
        self.transaction(|conn| {
            if !media_exists(conn, media_id)? {
                return Err(AppError::NotFound(format!("媒体 {}", media_id)));
            }
            conn.execute(
                "INSERT INTO view_history (media_id, viewed_at) VALUES (?1, ?2)",
                params![media_id, unix_now()],
            )?;
            Ok(())
        })
    }

    /// 媒体总数
    pub fn count_media(&self) -> AppResult<i64> {
        let conn = self.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))?;
        Ok(count)
    }
}
