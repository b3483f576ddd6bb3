//! 数据库 Schema 定义
//!
//! 包含所有表的 CREATE 语句和迁移脚本

/// 数据库版本
pub const SCHEMA_VERSION: i32 = 2;

/// 初始化 Schema SQL
pub const INIT_SCHEMA: &str = r#"
-- 媒体表
CREATE TABLE IF NOT EXISTS media (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    content_hash        TEXT NOT NULL UNIQUE,
    file_ext            TEXT NOT NULL,
    media_type          TEXT NOT NULL CHECK(media_type IN ('image', 'video', 'audio')),
    mime_type           TEXT NOT NULL,
    file_size           INTEGER NOT NULL,
    width               INTEGER,
    height              INTEGER,
    duration            REAL,
    rating              TEXT NOT NULL DEFAULT 'safe' CHECK(rating IN ('safe', 'questionable', 'explicit')),
    is_favorite         INTEGER NOT NULL DEFAULT 0 CHECK(is_favorite IN (0, 1)),
    tag_count           INTEGER NOT NULL DEFAULT 0,
    tag_count_general   INTEGER NOT NULL DEFAULT 0,
    tag_count_metadata  INTEGER NOT NULL DEFAULT 0,
    tag_count_artist    INTEGER NOT NULL DEFAULT 0,
    parent_id           INTEGER REFERENCES media(id) ON DELETE SET NULL,
    has_children        INTEGER NOT NULL DEFAULT 0 CHECK(has_children IN (0, 1)),
    view_count          INTEGER NOT NULL DEFAULT 0,
    created_at          INTEGER NOT NULL,
    updated_at          INTEGER NOT NULL,
    last_viewed_at      INTEGER
);

-- 标签表（0=general, 1=metadata, 2=artist）
CREATE TABLE IF NOT EXISTS tags (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL UNIQUE COLLATE NOCASE,
    category        INTEGER NOT NULL DEFAULT 0 CHECK(category IN (0, 1, 2)),
    usage_count     INTEGER NOT NULL DEFAULT 0,
    created_at      INTEGER NOT NULL
);

-- 媒体-标签关联表
CREATE TABLE IF NOT EXISTS media_tags (
    media_id        INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
    tag_id          INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    created_at      INTEGER NOT NULL,
    PRIMARY KEY (media_id, tag_id)
);

-- 浏览记录
CREATE TABLE IF NOT EXISTS view_history (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    media_id        INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
    viewed_at       INTEGER NOT NULL
);

-- Schema 版本表
CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      INTEGER NOT NULL
);

-- 索引
CREATE INDEX IF NOT EXISTS idx_media_created_at ON media(created_at);
CREATE INDEX IF NOT EXISTS idx_media_rating ON media(rating);
CREATE INDEX IF NOT EXISTS idx_media_media_type ON media(media_type);
CREATE INDEX IF NOT EXISTS idx_media_parent_id ON media(parent_id);
CREATE INDEX IF NOT EXISTS idx_media_width ON media(width);
CREATE INDEX IF NOT EXISTS idx_media_height ON media(height);
CREATE INDEX IF NOT EXISTS idx_media_file_size ON media(file_size);
CREATE INDEX IF NOT EXISTS idx_tags_usage ON tags(usage_count DESC);
CREATE INDEX IF NOT EXISTS idx_media_tags_tag_media ON media_tags(tag_id, media_id);
CREATE INDEX IF NOT EXISTS idx_view_history_media ON view_history(media_id, viewed_at DESC);

-- 触发器：关联插入时维护计数
CREATE TRIGGER IF NOT EXISTS trg_media_tags_insert
AFTER INSERT ON media_tags
BEGIN
    UPDATE tags SET usage_count = usage_count + 1 WHERE id = NEW.tag_id;

    UPDATE media
    SET tag_count = tag_count + 1,
        tag_count_general = tag_count_general +
            CASE WHEN (SELECT category FROM tags WHERE id = NEW.tag_id) = 0 THEN 1 ELSE 0 END,
        tag_count_metadata = tag_count_metadata +
            CASE WHEN (SELECT category FROM tags WHERE id = NEW.tag_id) = 1 THEN 1 ELSE 0 END,
        tag_count_artist = tag_count_artist +
            CASE WHEN (SELECT category FROM tags WHERE id = NEW.tag_id) = 2 THEN 1 ELSE 0 END,
        updated_at = unixepoch()
    WHERE id = NEW.media_id;
END;

-- 触发器：关联删除时维护计数
CREATE TRIGGER IF NOT EXISTS trg_media_tags_delete
AFTER DELETE ON media_tags
BEGIN
    UPDATE tags SET usage_count = usage_count - 1 WHERE id = OLD.tag_id;

    UPDATE media
    SET tag_count = tag_count - 1,
        tag_count_general = tag_count_general -
            CASE WHEN (SELECT category FROM tags WHERE id = OLD.tag_id) = 0 THEN 1 ELSE 0 END,
        tag_count_metadata = tag_count_metadata -
            CASE WHEN (SELECT category FROM tags WHERE id = OLD.tag_id) = 1 THEN 1 ELSE 0 END,
        tag_count_artist = tag_count_artist -
            CASE WHEN (SELECT category FROM tags WHERE id = OLD.tag_id) = 2 THEN 1 ELSE 0 END,
        updated_at = unixepoch()
    WHERE id = OLD.media_id;
END;

-- 触发器：父子关系
CREATE TRIGGER IF NOT EXISTS trg_media_parent_insert
AFTER INSERT ON media
WHEN NEW.parent_id IS NOT NULL
BEGIN
    UPDATE media SET has_children = 1 WHERE id = NEW.parent_id;
END;

CREATE TRIGGER IF NOT EXISTS trg_media_parent_update
AFTER UPDATE OF parent_id ON media
BEGIN
    UPDATE media SET has_children = 1 WHERE id = NEW.parent_id;
    UPDATE media
    SET has_children = EXISTS (SELECT 1 FROM media c WHERE c.parent_id = OLD.parent_id)
    WHERE id = OLD.parent_id;
END;

CREATE TRIGGER IF NOT EXISTS trg_media_parent_delete
AFTER DELETE ON media
WHEN OLD.parent_id IS NOT NULL
BEGIN
    UPDATE media
    SET has_children = EXISTS (SELECT 1 FROM media c WHERE c.parent_id = OLD.parent_id)
    WHERE id = OLD.parent_id;
END;

-- 触发器：浏览记录
CREATE TRIGGER IF NOT EXISTS trg_view_history_insert
AFTER INSERT ON view_history
BEGIN
    UPDATE media
    SET view_count = view_count + 1,
        last_viewed_at = NEW.viewed_at
    WHERE id = NEW.media_id;
END;
"#;

/// 迁移脚本
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// 所有迁移脚本列表
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "Add (tag_id, media_id) index for tag membership lookups",
    sql: r#"
        CREATE INDEX IF NOT EXISTS idx_media_tags_tag_media ON media_tags(tag_id, media_id);
    "#,
}];
