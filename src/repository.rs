use crate::models::{
    BlogPost, ContentKind, ContentRef, Photo, PostContent, TextBlock, UpdatePhotoRequest,
    UpdatePostRequest, UpdateTextBlockRequest, UpdateVideoRequest, Video,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract for posts and their content collections. Handlers
/// talk to `Arc<dyn Repository>` only, so the SQLite implementation can be
/// swapped for a mock in tests.
///
/// Visibility rules live in the queries themselves: the published listing never
/// returns drafts, and the author listing is scoped to one author. Every
/// multi-row mutation (cascade delete, reorder) is a single transaction.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Post retrieval ---
    // Published-only listing, newest first. The ordering key is
    // (COALESCE(published_at, created_at) DESC, id ASC): a stable snapshot key,
    // so pagination neither duplicates nor skips rows under concurrent inserts.
    async fn list_published(&self, limit: i64, offset: i64) -> sqlx::Result<Vec<BlogPost>>;
    async fn count_published(&self) -> sqlx::Result<i64>;
    // Management view: every post of one author, drafts included.
    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<BlogPost>>;
    async fn count_by_author(&self, author_id: Uuid) -> sqlx::Result<i64>;

    // No visibility check here; the caller decides what the viewer may see.
    async fn get_post(&self, id: Uuid) -> sqlx::Result<Option<BlogPost>>;
    async fn get_post_by_slug(&self, slug: &str) -> sqlx::Result<Option<BlogPost>>;
    async fn slug_exists(&self, slug: &str) -> sqlx::Result<bool>;

    // --- Post mutations ---
    async fn insert_post(&self, post: BlogPost) -> sqlx::Result<BlogPost>;
    // Partial update via COALESCE; only provided fields are written.
    // `published_at` is set here exactly when the caller publishes.
    async fn update_post(
        &self,
        id: Uuid,
        changes: UpdatePostRequest,
        published_at: Option<DateTime<Utc>>,
    ) -> sqlx::Result<Option<BlogPost>>;
    // Deletes the post and all its content rows in one transaction.
    async fn delete_post_cascade(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Content collections ---
    async fn get_content(&self, post_id: Uuid) -> sqlx::Result<PostContent>;
    async fn count_content(&self, post_id: Uuid) -> sqlx::Result<i64>;
    // Next free slot at the end of the post's merged sequence.
    async fn next_display_order(&self, post_id: Uuid) -> sqlx::Result<f64>;

    async fn insert_photo(&self, photo: Photo) -> sqlx::Result<Photo>;
    async fn update_photo(
        &self,
        post_id: Uuid,
        id: Uuid,
        changes: UpdatePhotoRequest,
    ) -> sqlx::Result<Option<Photo>>;
    async fn delete_photo(&self, post_id: Uuid, id: Uuid) -> sqlx::Result<bool>;

    async fn insert_video(&self, video: Video) -> sqlx::Result<Video>;
    async fn update_video(
        &self,
        post_id: Uuid,
        id: Uuid,
        changes: UpdateVideoRequest,
    ) -> sqlx::Result<Option<Video>>;
    async fn delete_video(&self, post_id: Uuid, id: Uuid) -> sqlx::Result<bool>;

    async fn insert_text_block(&self, block: TextBlock) -> sqlx::Result<TextBlock>;
    async fn update_text_block(
        &self,
        post_id: Uuid,
        id: Uuid,
        changes: UpdateTextBlockRequest,
    ) -> sqlx::Result<Option<TextBlock>>;
    async fn delete_text_block(&self, post_id: Uuid, id: Uuid) -> sqlx::Result<bool>;

    // Applies a precomputed reorder plan atomically. Returns false (and writes
    // nothing) if any referenced row no longer exists.
    async fn apply_reorder(&self, post_id: Uuid, plan: &[(ContentRef, f64)])
    -> sqlx::Result<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The concrete implementation of the `Repository` trait, backed by SQLite.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Creates the content tables when absent. Content rows carry a foreign key to
/// posts so a row referencing a missing post cannot be written, but the cascade
/// on delete is performed explicitly by `delete_post_cascade`, not by the
/// storage engine.
pub async fn init_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id            BLOB PRIMARY KEY,
            slug          TEXT NOT NULL UNIQUE,
            title         TEXT NOT NULL,
            description   TEXT,
            cover_image   TEXT,
            template_id   TEXT NOT NULL,
            author_id     BLOB NOT NULL,
            status        TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL,
            published_at  TEXT
        );

        CREATE TABLE IF NOT EXISTS photos (
            id            BLOB PRIMARY KEY,
            post_id       BLOB NOT NULL REFERENCES posts(id),
            display_order REAL NOT NULL,
            url           TEXT NOT NULL,
            caption       TEXT,
            alt_text      TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS videos (
            id               BLOB PRIMARY KEY,
            post_id          BLOB NOT NULL REFERENCES posts(id),
            display_order    REAL NOT NULL,
            url              TEXT NOT NULL,
            caption          TEXT,
            thumbnail        TEXT,
            duration_seconds INTEGER,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS text_blocks (
            id            BLOB PRIMARY KEY,
            post_id       BLOB NOT NULL REFERENCES posts(id),
            display_order REAL NOT NULL,
            content       TEXT NOT NULL,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status, published_at);
        CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id);
        CREATE INDEX IF NOT EXISTS idx_photos_post ON photos(post_id);
        CREATE INDEX IF NOT EXISTS idx_videos_post ON videos(post_id);
        CREATE INDEX IF NOT EXISTS idx_text_blocks_post ON text_blocks(post_id);
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

const POST_COLUMNS: &str = "id, slug, title, description, cover_image, template_id, \
                            author_id, status, created_at, updated_at, published_at";

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_published(&self, limit: i64, offset: i64) -> sqlx::Result<Vec<BlogPost>> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE status = 'published' \
             ORDER BY COALESCE(published_at, created_at) DESC, id ASC \
             LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_published(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE status = 'published'")
            .fetch_one(&self.pool)
            .await
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<BlogPost>> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ? \
             ORDER BY COALESCE(published_at, created_at) DESC, id ASC \
             LIMIT ? OFFSET ?"
        ))
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_by_author(&self, author_id: Uuid) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_post(&self, id: Uuid) -> sqlx::Result<Option<BlogPost>> {
        sqlx::query_as::<_, BlogPost>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_post_by_slug(&self, slug: &str) -> sqlx::Result<Option<BlogPost>> {
        sqlx::query_as::<_, BlogPost>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
    }

    async fn slug_exists(&self, slug: &str) -> sqlx::Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn insert_post(&self, post: BlogPost) -> sqlx::Result<BlogPost> {
        sqlx::query(
            "INSERT INTO posts (id, slug, title, description, cover_image, template_id, \
             author_id, status, created_at, updated_at, published_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.cover_image)
        .bind(&post.template_id)
        .bind(post.author_id)
        .bind(post.status)
        .bind(post.created_at)
        .bind(post.updated_at)
        .bind(post.published_at)
        .execute(&self.pool)
        .await?;
        Ok(post)
    }

    async fn update_post(
        &self,
        id: Uuid,
        changes: UpdatePostRequest,
        published_at: Option<DateTime<Utc>>,
    ) -> sqlx::Result<Option<BlogPost>> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "UPDATE posts SET \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                cover_image = COALESCE(?, cover_image), \
                template_id = COALESCE(?, template_id), \
                status = COALESCE(?, status), \
                published_at = COALESCE(?, published_at), \
                updated_at = ? \
             WHERE id = ? \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.cover_image)
        .bind(changes.template_id)
        .bind(changes.status)
        .bind(published_at)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post_cascade(&self, id: Uuid) -> sqlx::Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM photos WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM videos WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM text_blocks WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if deleted {
            tx.commit().await?;
        } else {
            tx.rollback().await?;
        }
        Ok(deleted)
    }

    async fn get_content(&self, post_id: Uuid) -> sqlx::Result<PostContent> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT id, post_id, display_order, url, caption, alt_text, created_at \
             FROM photos WHERE post_id = ? ORDER BY display_order ASC, created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let videos = sqlx::query_as::<_, Video>(
            "SELECT id, post_id, display_order, url, caption, thumbnail, duration_seconds, \
             created_at \
             FROM videos WHERE post_id = ? ORDER BY display_order ASC, created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let text_blocks = sqlx::query_as::<_, TextBlock>(
            "SELECT id, post_id, display_order, content, created_at \
             FROM text_blocks WHERE post_id = ? ORDER BY display_order ASC, created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(PostContent {
            photos,
            videos,
            text_blocks,
        })
    }

    async fn count_content(&self, post_id: Uuid) -> sqlx::Result<i64> {
        sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM photos WHERE post_id = ?) \
                  + (SELECT COUNT(*) FROM videos WHERE post_id = ?) \
                  + (SELECT COUNT(*) FROM text_blocks WHERE post_id = ?)",
        )
        .bind(post_id)
        .bind(post_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn next_display_order(&self, post_id: Uuid) -> sqlx::Result<f64> {
        let max: f64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order), -1.0) FROM ( \
                SELECT display_order FROM photos WHERE post_id = ? \
                UNION ALL SELECT display_order FROM videos WHERE post_id = ? \
                UNION ALL SELECT display_order FROM text_blocks WHERE post_id = ?)",
        )
        .bind(post_id)
        .bind(post_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(max + 1.0)
    }

    async fn insert_photo(&self, photo: Photo) -> sqlx::Result<Photo> {
        sqlx::query(
            "INSERT INTO photos (id, post_id, display_order, url, caption, alt_text, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(photo.id)
        .bind(photo.post_id)
        .bind(photo.display_order)
        .bind(&photo.url)
        .bind(&photo.caption)
        .bind(&photo.alt_text)
        .bind(photo.created_at)
        .execute(&self.pool)
        .await?;
        Ok(photo)
    }

    async fn update_photo(
        &self,
        post_id: Uuid,
        id: Uuid,
        changes: UpdatePhotoRequest,
    ) -> sqlx::Result<Option<Photo>> {
        sqlx::query_as::<_, Photo>(
            "UPDATE photos SET \
                url = COALESCE(?, url), \
                caption = COALESCE(?, caption), \
                alt_text = COALESCE(?, alt_text), \
                display_order = COALESCE(?, display_order) \
             WHERE id = ? AND post_id = ? \
             RETURNING id, post_id, display_order, url, caption, alt_text, created_at",
        )
        .bind(changes.url)
        .bind(changes.caption)
        .bind(changes.alt_text)
        .bind(changes.display_order)
        .bind(id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_photo(&self, post_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM photos WHERE id = ? AND post_id = ?")
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_video(&self, video: Video) -> sqlx::Result<Video> {
        sqlx::query(
            "INSERT INTO videos (id, post_id, display_order, url, caption, thumbnail, \
             duration_seconds, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(video.id)
        .bind(video.post_id)
        .bind(video.display_order)
        .bind(&video.url)
        .bind(&video.caption)
        .bind(&video.thumbnail)
        .bind(video.duration_seconds)
        .bind(video.created_at)
        .execute(&self.pool)
        .await?;
        Ok(video)
    }

    async fn update_video(
        &self,
        post_id: Uuid,
        id: Uuid,
        changes: UpdateVideoRequest,
    ) -> sqlx::Result<Option<Video>> {
        sqlx::query_as::<_, Video>(
            "UPDATE videos SET \
                url = COALESCE(?, url), \
                caption = COALESCE(?, caption), \
                thumbnail = COALESCE(?, thumbnail), \
                duration_seconds = COALESCE(?, duration_seconds), \
                display_order = COALESCE(?, display_order) \
             WHERE id = ? AND post_id = ? \
             RETURNING id, post_id, display_order, url, caption, thumbnail, duration_seconds, \
                       created_at",
        )
        .bind(changes.url)
        .bind(changes.caption)
        .bind(changes.thumbnail)
        .bind(changes.duration_seconds)
        .bind(changes.display_order)
        .bind(id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_video(&self, post_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM videos WHERE id = ? AND post_id = ?")
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_text_block(&self, block: TextBlock) -> sqlx::Result<TextBlock> {
        sqlx::query(
            "INSERT INTO text_blocks (id, post_id, display_order, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(block.id)
        .bind(block.post_id)
        .bind(block.display_order)
        .bind(&block.content)
        .bind(block.created_at)
        .execute(&self.pool)
        .await?;
        Ok(block)
    }

    async fn update_text_block(
        &self,
        post_id: Uuid,
        id: Uuid,
        changes: UpdateTextBlockRequest,
    ) -> sqlx::Result<Option<TextBlock>> {
        sqlx::query_as::<_, TextBlock>(
            "UPDATE text_blocks SET \
                content = COALESCE(?, content), \
                display_order = COALESCE(?, display_order) \
             WHERE id = ? AND post_id = ? \
             RETURNING id, post_id, display_order, content, created_at",
        )
        .bind(changes.content)
        .bind(changes.display_order)
        .bind(id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_text_block(&self, post_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM text_blocks WHERE id = ? AND post_id = ?")
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn apply_reorder(
        &self,
        post_id: Uuid,
        plan: &[(ContentRef, f64)],
    ) -> sqlx::Result<bool> {
        let mut tx = self.pool.begin().await?;

        for (item, order) in plan {
            let table = match item.kind {
                ContentKind::Photo => "photos",
                ContentKind::Video => "videos",
                ContentKind::Text => "text_blocks",
            };
            let res =
                sqlx::query(&format!("UPDATE {table} SET display_order = ? WHERE id = ? AND post_id = ?"))
                    .bind(order)
                    .bind(item.id)
                    .bind(post_id)
                    .execute(&mut *tx)
                    .await?;
            // A row vanished between validation and the write: abandon the
            // whole reorder so no partial ordering is ever observable.
            if res.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(false);
            }
        }

        tx.commit().await?;
        Ok(true)
    }
}
