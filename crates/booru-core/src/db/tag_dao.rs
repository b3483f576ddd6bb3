//! 标签数据访问层

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{CreateTag, Tag};
use crate::utils::error::{AppError, AppResult};
use crate::utils::unix_now;

use super::connection::Database;

/// 自动补全返回数量上限
const MAX_SUGGESTIONS: i64 = 100;

/// 从数据库行映射到 Tag 结构
fn row_to_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        category: row.get("category")?,
        usage_count: row.get("usage_count")?,
        created_at: row.get("created_at")?,
    })
}

fn find_tag_by_name(conn: &Connection, name: &str) -> AppResult<Option<Tag>> {
    // name 列为 NOCASE，比较大小写不敏感
    let tag = conn
        .query_row("SELECT * FROM tags WHERE name = ?1", params![name.trim()], row_to_tag)
        .optional()?;
    Ok(tag)
}

fn insert_tag(conn: &Connection, tag: &CreateTag) -> AppResult<i64> {
    let name = tag.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("标签名不能为空".to_string()));
    }
    conn.execute(
        "INSERT INTO tags (name, category, usage_count, created_at) VALUES (?1, ?2, 0, ?3)",
        params![name, tag.category, unix_now()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn get_or_insert_tag(conn: &Connection, tag: &CreateTag) -> AppResult<Tag> {
    if let Some(existing) = find_tag_by_name(conn, &tag.name)? {
        return Ok(existing);
    }
    let id = insert_tag(conn, tag)?;
    let created = conn.query_row("SELECT * FROM tags WHERE id = ?1", params![id], row_to_tag)?;
    Ok(created)
}

/// LIKE 模式转义（`%` 和 `_` 是合法的标签字符）
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Database {
    // ==================== Tag CRUD ====================

    /// 创建标签
    pub fn create_tag(&self, tag: &CreateTag) -> AppResult<i64> {
        let conn = self.connection()?;
        insert_tag(&conn, tag)
    }

    /// 根据 ID 获取标签
    pub fn get_tag(&self, tag_id: i64) -> AppResult<Option<Tag>> {
        let conn = self.connection()?;
        let tag = conn
            .query_row("SELECT * FROM tags WHERE id = ?1", params![tag_id], row_to_tag)
            .optional()?;
        Ok(tag)
    }

    /// 根据名称获取标签（大小写不敏感）
    pub fn get_tag_by_name(&self, name: &str) -> AppResult<Option<Tag>> {
        let conn = self.connection()?;
        find_tag_by_name(&conn, name)
    }

    /// 获取或创建标签；已存在时保留原分类
    pub fn get_or_create_tag(&self, tag: &CreateTag) -> AppResult<Tag> {
        self.transaction(|conn| get_or_insert_tag(conn, tag))
    }

    /// 删除标签
    pub fn delete_tag(&self, tag_id: i64) -> AppResult<bool> {
        self.transaction(|conn| {
            // 先删关联，触发器需要读取标签分类来回退媒体计数
            conn.execute("DELETE FROM media_tags WHERE tag_id = ?1", params![tag_id])?;
            let rows = conn.execute("DELETE FROM tags WHERE id = ?1", params![tag_id])?;
            Ok(rows > 0)
        })
    }

    // ==================== Media-Tag 关联 ====================

    /// 为媒体添加标签（不存在的标签会被创建，单个事务）
    pub fn add_tags_to_media(&self, media_id: i64, tags: &[CreateTag]) -> AppResult<Vec<Tag>> {
        self.transaction(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM media WHERE id = ?1)",
                params![media_id],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(AppError::NotFound(format!("媒体 {}", media_id)));
            }

            let now = unix_now();
            let mut attached = Vec::with_capacity(tags.len());
            for input in tags {
                let tag = get_or_insert_tag(conn, input)?;
                conn.execute(
                    "INSERT OR IGNORE INTO media_tags (media_id, tag_id, created_at) VALUES (?1, ?2, ?3)",
                    params![media_id, tag.id, now],
                )?;
                attached.push(tag);
            }

            tracing::debug!("媒体 {} 添加了 {} 个标签", media_id, attached.len());
            Ok(attached)
        })
    }

    /// 从媒体移除标签
    pub fn remove_tag_from_media(&self, media_id: i64, tag_id: i64) -> AppResult<bool> {
        let conn = self.connection()?;
        let rows = conn.execute(
            "DELETE FROM media_tags WHERE media_id = ?1 AND tag_id = ?2",
            params![media_id, tag_id],
        )?;
        Ok(rows > 0)
    }

    /// 获取媒体的所有标签（按分类、名称排序）
    pub fn get_tags_for_media(&self, media_id: i64) -> AppResult<Vec<Tag>> {
        let conn = self.connection()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT t.* FROM tags t
            INNER JOIN media_tags mt ON t.id = mt.tag_id
            WHERE mt.media_id = ?1
            ORDER BY t.category, t.name
            "#,
        )?;
        let tags = stmt
            .query_map(params![media_id], row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tags)
    }

    /// 按前缀联想标签，使用次数多的优先
    pub fn suggest_tags(&self, prefix: &str, limit: i64) -> AppResult<Vec<Tag>> {
        if limit <= 0 {
            return Err(AppError::InvalidInput("limit 必须为正数".to_string()));
        }

        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM tags
            WHERE name LIKE ?1 ESCAPE '\'
            ORDER BY usage_count DESC, name ASC
            LIMIT ?2
            "#,
        )?;
        let pattern = format!("{}%", escape_like(prefix));
        let tags = stmt
            .query_map(params![pattern, limit.min(MAX_SUGGESTIONS)], row_to_tag)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateMedia, TagCategory};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    #[test]
    fn test_create_and_get_tag() {
        let db = setup();

        let id = db.create_tag(&CreateTag::general("blue_sky")).unwrap();
        let tag = db.get_tag(id).unwrap().unwrap();
        assert_eq!(tag.name, "blue_sky");
        assert_eq!(tag.category, TagCategory::General);
        assert_eq!(tag.usage_count, 0);
    }

    #[test]
    fn test_name_is_case_insensitive() {
        let db = setup();
        let id = db.create_tag(&CreateTag::general("Cat")).unwrap();

        assert_eq!(db.get_tag_by_name("cat").unwrap().map(|t| t.id), Some(id));
        assert_eq!(db.get_tag_by_name("CAT").unwrap().map(|t| t.id), Some(id));
        assert!(db.create_tag(&CreateTag::general("cAT")).is_err());
    }

    #[test]
    fn test_get_or_create_keeps_category() {
        let db = setup();
        let artist = CreateTag {
            name: "someone".to_string(),
            category: TagCategory::Artist,
        };
        let first = db.get_or_create_tag(&artist).unwrap();
        let second = db.get_or_create_tag(&CreateTag::general("SOMEONE")).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.category, TagCategory::Artist);
    }

    #[test]
    fn test_counts_follow_associations() {
        let db = setup();
        let media_id = db.create_media(&CreateMedia::image("a")).unwrap();

        let tags = db
            .add_tags_to_media(
                media_id,
                &[
                    CreateTag::general("cat"),
                    CreateTag {
                        name: "artist_x".to_string(),
                        category: TagCategory::Artist,
                    },
                    CreateTag {
                        name: "highres".to_string(),
                        category: TagCategory::Metadata,
                    },
                    // 重复添加不计数
                    CreateTag::general("cat"),
                ],
            )
            .unwrap();
        assert_eq!(tags.len(), 4);

        let media = db.get_media(media_id).unwrap().unwrap();
        assert_eq!(media.tag_count, 3);
        assert_eq!(media.tag_count_general, 1);
        assert_eq!(media.tag_count_artist, 1);
        assert_eq!(media.tag_count_metadata, 1);

        let cat = db.get_tag_by_name("cat").unwrap().unwrap();
        assert_eq!(cat.usage_count, 1);

        assert!(db.remove_tag_from_media(media_id, cat.id).unwrap());
        let media = db.get_media(media_id).unwrap().unwrap();
        assert_eq!(media.tag_count, 2);
        assert_eq!(media.tag_count_general, 0);
        assert_eq!(db.get_tag(cat.id).unwrap().unwrap().usage_count, 0);
    }

    #[test]
    fn test_delete_media_releases_usage() {
        let db = setup();
        let a = db.create_media(&CreateMedia::image("a")).unwrap();
        let b = db.create_media(&CreateMedia::image("b")).unwrap();
        db.add_tags_to_media(a, &[CreateTag::general("cat")]).unwrap();
        db.add_tags_to_media(b, &[CreateTag::general("cat")]).unwrap();
        assert_eq!(db.get_tag_by_name("cat").unwrap().unwrap().usage_count, 2);

        db.delete_media(a).unwrap();
        assert_eq!(db.get_tag_by_name("cat").unwrap().unwrap().usage_count, 1);
    }

    #[test]
    fn test_delete_tag_keeps_media_counts_consistent() {
        let db = setup();
        let media_id = db.create_media(&CreateMedia::image("a")).unwrap();
        let tags = db
            .add_tags_to_media(
                media_id,
                &[CreateTag::general("cat"), CreateTag::general("dog")],
            )
            .unwrap();

        assert!(db.delete_tag(tags[0].id).unwrap());

        let media = db.get_media(media_id).unwrap().unwrap();
        assert_eq!(media.tag_count, 1);
        assert_eq!(media.tag_count_general, 1);
        assert_eq!(
            media.tag_count,
            media.tag_count_general + media.tag_count_metadata + media.tag_count_artist
        );
        assert_eq!(db.get_tags_for_media(media_id).unwrap().len(), 1);
    }

    #[test]
    fn test_add_tags_to_missing_media() {
        let db = setup();
        let result = db.add_tags_to_media(99, &[CreateTag::general("cat")]);
        assert!(matches!(result, Err(AppError::NotFound(_))));
        // 事务回滚，标签未被创建
        assert!(db.get_tag_by_name("cat").unwrap().is_none());
    }

    #[test]
    fn test_tags_for_media_order() {
        let db = setup();
        let media_id = db.create_media(&CreateMedia::image("a")).unwrap();
        db.add_tags_to_media(
            media_id,
            &[
                CreateTag {
                    name: "zeta".to_string(),
                    category: TagCategory::Artist,
                },
                CreateTag::general("beta"),
                CreateTag::general("alpha"),
            ],
        )
        .unwrap();

        let names: Vec<String> = db
            .get_tags_for_media(media_id)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_suggest_tags() {
        let db = setup();
        let a = db.create_media(&CreateMedia::image("a")).unwrap();
        let b = db.create_media(&CreateMedia::image("b")).unwrap();
        db.add_tags_to_media(a, &[CreateTag::general("cat"), CreateTag::general("cat_ears")])
            .unwrap();
        db.add_tags_to_media(b, &[CreateTag::general("cat_ears")]).unwrap();
        db.create_tag(&CreateTag::general("catalog")).unwrap();
        db.create_tag(&CreateTag::general("dog")).unwrap();

        let names: Vec<String> = db
            .suggest_tags("CAT", 10)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["cat_ears", "cat", "catalog"]);

        // `_` 按字面匹配
        let names: Vec<String> = db
            .suggest_tags("cat_", 10)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["cat_ears"]);

        assert_eq!(db.suggest_tags("cat", 1).unwrap().len(), 1);
        assert!(db.suggest_tags("  ", 10).unwrap().is_empty());
        assert!(db.suggest_tags("cat", 0).is_err());
    }
}
