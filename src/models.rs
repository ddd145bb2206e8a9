use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The two access levels of the blog. Readers may only view published posts;
/// contributors additionally own and manage their posts and content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Reader,
    Contributor,
}

/// PostStatus
///
/// Post visibility state. The only supported transition is draft -> published;
/// it is one-way (unpublishing is rejected at the handler boundary).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[ts(export)]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

/// BlogPost
///
/// A post record from the `posts` table. Owned by its author (a contributor);
/// mutated by the author only. `published_at` is set exactly once, when the
/// post transitions to published.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogPost {
    pub id: Uuid,
    /// URL-safe unique identifier, derived from the title when not provided.
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    /// Object-storage key or absolute URL of the cover image.
    pub cover_image: Option<String>,
    /// Key into the template registry; controls frontend layout dispatch.
    pub template_id: String,
    // FK to the seeded user list (User.id of the owning contributor).
    pub author_id: Uuid,
    pub status: PostStatus,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
}

/// Photo
///
/// A photo item belonging to a post. `display_order` is the shared ordering key
/// across photos, videos, and text blocks of the same post.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Photo {
    pub id: Uuid,
    pub post_id: Uuid,
    pub display_order: f64,
    pub url: String,
    pub caption: Option<String>,
    pub alt_text: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Video
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Video {
    pub id: Uuid,
    pub post_id: Uuid,
    pub display_order: f64,
    pub url: String,
    pub caption: Option<String>,
    pub thumbnail: Option<String>,
    pub duration_seconds: Option<i64>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// TextBlock
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TextBlock {
    pub id: Uuid,
    pub post_id: Uuid,
    pub display_order: f64,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ContentKind
///
/// Type tag used wherever heterogeneous content items are referenced together
/// (reorder payloads, assembled sequences).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContentKind {
    Photo,
    Video,
    Text,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Input payload for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Extends the session from 24 hours to 7 days.
    #[serde(default)]
    pub remember_me: bool,
}

/// CreatePostRequest
///
/// Input payload for POST /posts. The slug is derived from the title when
/// omitted; the template defaults to the registry's default entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

/// UpdatePostRequest
///
/// Partial update payload for PATCH /posts/{id}. Only provided fields are
/// written; concurrent updates are last-write-wins at the row level.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

/// CreatePhotoRequest
///
/// `display_order` defaults to the end of the post's current sequence.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreatePhotoRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<f64>,
}

/// UpdatePhotoRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePhotoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<f64>,
}

/// CreateVideoRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateVideoRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<f64>,
}

/// UpdateVideoRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateVideoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<f64>,
}

/// CreateTextBlockRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateTextBlockRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<f64>,
}

/// UpdateTextBlockRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateTextBlockRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<f64>,
}

/// ContentRef
///
/// One entry of a reorder payload: a content item id plus its type tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContentRef {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ContentKind,
}

/// ReorderRequest
///
/// Target ordering for POST /posts/{id}/reorder. Must reference every content
/// item of the post exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<ContentRef>,
}

// --- Output Schemas ---

/// PublicProfile
///
/// The caller-visible subset of a seeded user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PublicProfile {
    pub username: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// LoginResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicProfile,
    /// Unix timestamp (seconds) at which the issued session expires.
    pub expires_at: i64,
}

/// LogoutResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Pagination
///
/// Echoed window plus the total row count under the same filter, so clients
/// can page without duplicates or gaps.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// PostListResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostListResponse {
    pub posts: Vec<BlogPost>,
    pub pagination: Pagination,
}

/// PostContent
///
/// The three per-type collections of a post, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostContent {
    pub photos: Vec<Photo>,
    pub videos: Vec<Video>,
    pub text_blocks: Vec<TextBlock>,
}

/// UploadResponse
///
/// Reference to a stored media object. Only this reference is persisted by the
/// content endpoints; the raw bytes never touch the database.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UploadResponse {
    /// Object key within the media bucket.
    pub id: String,
    pub url: String,
}

// --- Helpers ---

/// Derives a URL-safe slug from a post title: lowercased, alphanumerics kept,
/// everything else collapsed into single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Drei Tage in Rom!"), "drei-tage-in-rom");
        assert_eq!(slugify("  Küstenwanderung  2024  "), "k-stenwanderung-2024");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn content_ref_uses_type_tag_on_the_wire() {
        let r = ContentRef {
            id: Uuid::nil(),
            kind: ContentKind::Text,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "text");
    }

    #[test]
    fn post_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PostStatus::Published).unwrap(),
            "\"published\""
        );
    }
}
