use crate::{
    AppState,
    assembly::{self, ContentEntry},
    auth::{self, AuthUser, can_modify},
    error::ApiError,
    models::{
        BlogPost, ContentKind, CreatePhotoRequest, CreatePostRequest,
        CreateTextBlockRequest, CreateVideoRequest, LoginRequest, LoginResponse, LogoutResponse,
        Pagination, Photo, PostContent, PostListResponse, PostStatus, PublicProfile,
        ReorderRequest, Role, TextBlock, UpdatePhotoRequest, UpdatePostRequest,
        UpdateTextBlockRequest, UpdateVideoRequest, UploadResponse, Video, slugify,
    },
    templates::TemplateDescriptor,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Filter & Response Structs ---

/// StatusFilter
///
/// Listing mode for GET /posts. `published` is the browsing default;
/// `all` is the contributor's management view over their own posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Published,
    All,
}

/// PostFilter
///
/// Accepted query parameters for the post listing endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PostFilter {
    /// Visibility filter; defaults to `published`.
    pub status: Option<StatusFilter>,
    /// Page size; defaults to 20, capped at 100.
    pub limit: Option<i64>,
    /// Page start; defaults to 0.
    pub offset: Option<i64>,
}

/// UploadQuery
///
/// Query parameters for POST /upload. The filename only contributes its
/// extension to the generated object key.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// PostDetailResponse
///
/// A post plus its content: the three raw collections and the merged,
/// display-order-sorted rendering sequence.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PostDetailResponse {
    pub post: BlogPost,
    pub content: PostContent,
    pub sequence: Vec<ContentEntry>,
}

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

// --- Shared Helpers ---

/// Resolves a path segment as a post id (UUID) or, failing that, as a slug.
async fn resolve_post(state: &AppState, id_or_slug: &str) -> Result<Option<BlogPost>, ApiError> {
    let post = match Uuid::parse_str(id_or_slug) {
        Ok(id) => state.repo.get_post(id).await?,
        Err(_) => state.repo.get_post_by_slug(id_or_slug).await?,
    };
    Ok(post)
}

/// Loads a post for mutation and enforces the ownership capability.
///
/// A missing post is `NotFound`. A post the caller may not modify is
/// `Forbidden` when it is published (existence is public) but `NotFound` when
/// it is someone else's draft, so drafts never leak through error codes.
async fn load_owned_post(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<BlogPost, ApiError> {
    let post = state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

    if !can_modify(user, &post) {
        return Err(match post.status {
            PostStatus::Published => {
                ApiError::Forbidden("only the author may modify this post".to_string())
            }
            PostStatus::Draft => ApiError::NotFound("post not found".to_string()),
        });
    }
    Ok(post)
}

fn page_window(filter: &PostFilter) -> (i64, i64) {
    let limit = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = filter.offset.unwrap_or(0).max(0);
    (limit, offset)
}

// --- Session Handlers ---

/// login
///
/// [Public Route] Verifies credentials against the seeded store and issues a
/// signed session token, delivered both in the response body metadata and as an
/// HttpOnly cookie. Unknown username and wrong password produce byte-identical
/// responses.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::InvalidInput(
            "username and password are required".to_string(),
        ));
    }

    let user = state
        .credentials
        .verify(&payload.username, &payload.password)
        .ok_or(ApiError::InvalidCredentials)?;

    let issued = auth::issue_token(user, payload.remember_me, &state.config.jwt_secret)?;

    tracing::info!(username = %user.username, "session issued");

    let body = LoginResponse {
        success: true,
        user: PublicProfile {
            username: user.username.clone(),
            role: user.role,
            display_name: user.display_name.clone(),
        },
        expires_at: issued.expires_at,
    };

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            auth::session_cookie(&issued.token, issued.max_age),
        )]),
        Json(body),
    )
        .into_response())
}

/// logout
///
/// [Public Route] Clears the session cookie. The token itself is not revoked
/// (sessions are stateless), so logout is idempotent and always succeeds.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Cookie cleared", body = LogoutResponse))
)]
pub async fn logout() -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, auth::clear_session_cookie())]),
        Json(LogoutResponse { success: true }),
    )
        .into_response()
}

/// get_me
///
/// [Authenticated Route] The authenticated caller's own profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = PublicProfile))
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> Json<PublicProfile> {
    let display_name = state
        .credentials
        .lookup(&user.username)
        .and_then(|u| u.display_name.clone());
    Json(PublicProfile {
        username: user.username,
        role: user.role,
        display_name,
    })
}

// --- Template Handlers ---

/// list_templates
///
/// [Public Route] The fixed set of post templates the frontend can render.
#[utoipa::path(
    get,
    path = "/templates",
    responses((status = 200, description = "Available templates", body = [TemplateDescriptor]))
)]
pub async fn list_templates(State(state): State<AppState>) -> Json<Vec<TemplateDescriptor>> {
    Json(state.templates.entries().to_vec())
}

// --- Post Handlers ---

/// list_posts
///
/// [Authenticated Route] Role-gated post listing.
///
/// `status=published` (default) returns published posts for any caller.
/// `status=all` is the contributor management view: it returns the caller's own
/// posts in every status and is rejected with 403 for readers. Other authors'
/// drafts are never listed for anyone.
#[utoipa::path(
    get,
    path = "/posts",
    params(PostFilter),
    responses((status = 200, description = "Post page", body = PostListResponse))
)]
pub async fn list_posts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<PostListResponse>, ApiError> {
    let (limit, offset) = page_window(&filter);

    let (posts, total) = match filter.status.unwrap_or(StatusFilter::Published) {
        StatusFilter::Published => {
            let posts = state.repo.list_published(limit, offset).await?;
            let total = state.repo.count_published().await?;
            (posts, total)
        }
        StatusFilter::All => {
            if user.role != Role::Contributor {
                return Err(ApiError::Forbidden(
                    "the full listing is limited to contributors".to_string(),
                ));
            }
            let posts = state.repo.list_by_author(user.id, limit, offset).await?;
            let total = state.repo.count_by_author(user.id).await?;
            (posts, total)
        }
    };

    Ok(Json(PostListResponse {
        posts,
        pagination: Pagination {
            total,
            limit,
            offset,
        },
    }))
}

/// get_post_detail
///
/// [Authenticated Route] A single post by id or slug, with its content
/// collections and the assembled rendering sequence.
///
/// Visible when published, or to its author in any status. Anything else is a
/// 404 (never a 403), so the existence of drafts is not leaked.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post UUID or slug")),
    responses(
        (status = 200, description = "Post with content", body = PostDetailResponse),
        (status = 404, description = "Absent or not visible to the caller")
    )
)]
pub async fn get_post_detail(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let post = resolve_post(&state, &id_or_slug)
        .await?
        .filter(|p| p.status == PostStatus::Published || p.author_id == user.id)
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

    let content = state.repo.get_content(post.id).await?;
    let sequence = assembly::assemble(&content.photos, &content.videos, &content.text_blocks);

    Ok(Json(PostDetailResponse {
        post,
        content,
        sequence,
    }))
}

/// create_post
///
/// [Authenticated Route, contributor] Creates a post owned by the caller. The
/// slug is taken verbatim when provided (must be unused) or derived from the
/// title with a numeric suffix on collision. Creating directly as published
/// stamps `published_at`.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = BlogPost),
        (status = 400, description = "Invalid title/slug/template"),
        (status = 403, description = "Caller is not a contributor")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    if user.role != Role::Contributor {
        return Err(ApiError::Forbidden(
            "only contributors may create posts".to_string(),
        ));
    }
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidInput("title is required".to_string()));
    }

    let template_id = match &payload.template_id {
        Some(id) => state
            .templates
            .resolve(id)
            .ok_or_else(|| ApiError::InvalidInput(format!("unknown template '{id}'")))?,
        None => state.templates.default_id(),
    };

    let slug = match payload.slug {
        Some(explicit) => {
            let explicit = explicit.trim().to_string();
            if explicit.is_empty() {
                return Err(ApiError::InvalidInput("slug must not be empty".to_string()));
            }
            if state.repo.slug_exists(&explicit).await? {
                return Err(ApiError::InvalidInput(format!(
                    "slug '{explicit}' is already in use"
                )));
            }
            explicit
        }
        None => {
            let base = slugify(&payload.title);
            if base.is_empty() {
                return Err(ApiError::InvalidInput(
                    "title does not yield a usable slug".to_string(),
                ));
            }
            // First free variant: base, base-2, base-3, ...
            let mut candidate = base.clone();
            let mut suffix = 2;
            while state.repo.slug_exists(&candidate).await? {
                candidate = format!("{base}-{suffix}");
                suffix += 1;
            }
            candidate
        }
    };

    let status = payload.status.unwrap_or(PostStatus::Draft);
    let now = Utc::now();

    let post = BlogPost {
        id: Uuid::new_v4(),
        slug,
        title: payload.title,
        description: payload.description,
        cover_image: payload.cover_image,
        template_id: template_id.as_str().to_string(),
        author_id: user.id,
        status,
        created_at: now,
        updated_at: now,
        published_at: (status == PostStatus::Published).then_some(now),
    };

    let created = state.repo.insert_post(post).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_post
///
/// [Authenticated Route, owner] Partial metadata update. Publishing a draft
/// stamps `published_at` once; the reverse transition is rejected (the
/// draft -> published flow is one-way).
#[utoipa::path(
    patch,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = BlogPost),
        (status = 400, description = "Invalid template or status transition"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = load_owned_post(&state, &user, id).await?;

    if let Some(template) = &payload.template_id {
        if state.templates.resolve(template).is_none() {
            return Err(ApiError::InvalidInput(format!(
                "unknown template '{template}'"
            )));
        }
    }

    let published_at = match (post.status, payload.status) {
        (PostStatus::Published, Some(PostStatus::Draft)) => {
            return Err(ApiError::InvalidInput(
                "a published post cannot return to draft".to_string(),
            ));
        }
        (PostStatus::Draft, Some(PostStatus::Published)) => Some(Utc::now()),
        _ => None,
    };

    state
        .repo
        .update_post(id, payload, published_at)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))
}

/// delete_post
///
/// [Authenticated Route, owner] Deletes a post and every photo, video, and
/// text block belonging to it, in one transaction. Stored media objects are
/// left in the bucket (their references die with the rows).
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    load_owned_post(&state, &user, id).await?;

    if state.repo.delete_post_cascade(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("post not found".to_string()))
    }
}

// --- Content Item Handlers ---

/// add_photo
///
/// [Authenticated Route, owner] Appends a photo to the post's sequence unless
/// an explicit displayOrder is given.
#[utoipa::path(
    post,
    path = "/posts/{id}/photos",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreatePhotoRequest,
    responses((status = 201, description = "Created", body = Photo))
)]
pub async fn add_photo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreatePhotoRequest>,
) -> Result<(StatusCode, Json<Photo>), ApiError> {
    let post = load_owned_post(&state, &user, post_id).await?;
    if payload.url.trim().is_empty() {
        return Err(ApiError::InvalidInput("url is required".to_string()));
    }

    let display_order = match payload.display_order {
        Some(order) => order,
        None => state.repo.next_display_order(post.id).await?,
    };

    let photo = Photo {
        id: Uuid::new_v4(),
        post_id: post.id,
        display_order,
        url: payload.url,
        caption: payload.caption,
        alt_text: payload.alt_text,
        created_at: Utc::now(),
    };
    let created = state.repo.insert_photo(photo).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_photo
#[utoipa::path(
    patch,
    path = "/posts/{id}/photos/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("item_id" = Uuid, Path, description = "Photo ID")
    ),
    request_body = UpdatePhotoRequest,
    responses((status = 200, description = "Updated", body = Photo))
)]
pub async fn update_photo(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdatePhotoRequest>,
) -> Result<Json<Photo>, ApiError> {
    load_owned_post(&state, &user, post_id).await?;
    state
        .repo
        .update_photo(post_id, item_id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("photo not found".to_string()))
}

/// delete_photo
///
/// The stored object is not removed from the bucket; only its reference goes.
#[utoipa::path(
    delete,
    path = "/posts/{id}/photos/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("item_id" = Uuid, Path, description = "Photo ID")
    ),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_photo(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    load_owned_post(&state, &user, post_id).await?;
    if state.repo.delete_photo(post_id, item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("photo not found".to_string()))
    }
}

/// add_video
#[utoipa::path(
    post,
    path = "/posts/{id}/videos",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateVideoRequest,
    responses((status = 201, description = "Created", body = Video))
)]
pub async fn add_video(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let post = load_owned_post(&state, &user, post_id).await?;
    if payload.url.trim().is_empty() {
        return Err(ApiError::InvalidInput("url is required".to_string()));
    }

    let display_order = match payload.display_order {
        Some(order) => order,
        None => state.repo.next_display_order(post.id).await?,
    };

    let video = Video {
        id: Uuid::new_v4(),
        post_id: post.id,
        display_order,
        url: payload.url,
        caption: payload.caption,
        thumbnail: payload.thumbnail,
        duration_seconds: payload.duration_seconds,
        created_at: Utc::now(),
    };
    let created = state.repo.insert_video(video).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_video
#[utoipa::path(
    patch,
    path = "/posts/{id}/videos/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("item_id" = Uuid, Path, description = "Video ID")
    ),
    request_body = UpdateVideoRequest,
    responses((status = 200, description = "Updated", body = Video))
)]
pub async fn update_video(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateVideoRequest>,
) -> Result<Json<Video>, ApiError> {
    load_owned_post(&state, &user, post_id).await?;
    state
        .repo
        .update_video(post_id, item_id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("video not found".to_string()))
}

/// delete_video
#[utoipa::path(
    delete,
    path = "/posts/{id}/videos/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("item_id" = Uuid, Path, description = "Video ID")
    ),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_video(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    load_owned_post(&state, &user, post_id).await?;
    if state.repo.delete_video(post_id, item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("video not found".to_string()))
    }
}

/// add_text_block
#[utoipa::path(
    post,
    path = "/posts/{id}/text",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateTextBlockRequest,
    responses((status = 201, description = "Created", body = TextBlock))
)]
pub async fn add_text_block(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateTextBlockRequest>,
) -> Result<(StatusCode, Json<TextBlock>), ApiError> {
    let post = load_owned_post(&state, &user, post_id).await?;
    if payload.content.trim().is_empty() {
        return Err(ApiError::InvalidInput("content is required".to_string()));
    }

    let display_order = match payload.display_order {
        Some(order) => order,
        None => state.repo.next_display_order(post.id).await?,
    };

    let block = TextBlock {
        id: Uuid::new_v4(),
        post_id: post.id,
        display_order,
        content: payload.content,
        created_at: Utc::now(),
    };
    let created = state.repo.insert_text_block(block).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_text_block
#[utoipa::path(
    patch,
    path = "/posts/{id}/text/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("item_id" = Uuid, Path, description = "Text block ID")
    ),
    request_body = UpdateTextBlockRequest,
    responses((status = 200, description = "Updated", body = TextBlock))
)]
pub async fn update_text_block(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateTextBlockRequest>,
) -> Result<Json<TextBlock>, ApiError> {
    load_owned_post(&state, &user, post_id).await?;
    state
        .repo
        .update_text_block(post_id, item_id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("text block not found".to_string()))
}

/// delete_text_block
#[utoipa::path(
    delete,
    path = "/posts/{id}/text/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Post ID"),
        ("item_id" = Uuid, Path, description = "Text block ID")
    ),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_text_block(
    user: AuthUser,
    State(state): State<AppState>,
    Path((post_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    load_owned_post(&state, &user, post_id).await?;
    if state.repo.delete_text_block(post_id, item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("text block not found".to_string()))
    }
}

/// reorder_content
///
/// [Authenticated Route, owner] Applies a caller-specified total order to the
/// post's content. The payload must reference every current item exactly once;
/// the new displayOrder values are written in one transaction, so a partial
/// reorder is never observable. Responds with the freshly assembled sequence.
#[utoipa::path(
    post,
    path = "/posts/{id}/reorder",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "New sequence", body = [ContentEntry]),
        (status = 400, description = "Payload does not match the content set"),
        (status = 403, description = "Not the author")
    )
)]
pub async fn reorder_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<ReorderRequest>,
) -> Result<Json<Vec<ContentEntry>>, ApiError> {
    let post = load_owned_post(&state, &user, post_id).await?;

    let content = state.repo.get_content(post.id).await?;
    let mut current: Vec<(ContentKind, Uuid)> = Vec::new();
    current.extend(content.photos.iter().map(|p| (ContentKind::Photo, p.id)));
    current.extend(content.videos.iter().map(|v| (ContentKind::Video, v.id)));
    current.extend(content.text_blocks.iter().map(|t| (ContentKind::Text, t.id)));

    let plan = assembly::plan_reorder(&current, &payload.ordered_ids)?;

    if !state.repo.apply_reorder(post.id, &plan).await? {
        // A row was deleted between validation and the write; nothing was
        // changed, the caller should re-read and retry.
        return Err(ApiError::InvalidInput(
            "post content changed during reorder".to_string(),
        ));
    }

    let content = state.repo.get_content(post.id).await?;
    Ok(Json(assembly::assemble(
        &content.photos,
        &content.videos,
        &content.text_blocks,
    )))
}

// --- Media Upload ---

/// upload_media
///
/// [Authenticated Route, contributor] Stores raw media bytes in the object
/// bucket under a fresh `uploads/<uuid>.<ext>` key and returns the reference.
/// The object is written before any metadata row that will point at it; a
/// failed follow-up write leaves an orphaned object behind (no cleanup pass).
#[utoipa::path(
    post,
    path = "/upload",
    params(UploadQuery),
    request_body(content = Vec<u8>, description = "Raw media bytes", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Stored", body = UploadResponse),
        (status = 400, description = "Empty body"),
        (status = 403, description = "Caller is not a contributor")
    )
)]
pub async fn upload_media(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if user.role != Role::Contributor {
        return Err(ApiError::Forbidden(
            "only contributors may upload media".to_string(),
        ));
    }
    if body.is_empty() {
        return Err(ApiError::InvalidInput("upload body is empty".to_string()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let extension = query
        .filename
        .as_deref()
        .and_then(|name| std::path::Path::new(name).extension())
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let object_key = format!("uploads/{}.{}", Uuid::new_v4(), extension);

    match state
        .storage
        .upload(&object_key, &content_type, body.to_vec())
        .await
    {
        Ok(url) => Ok(Json(UploadResponse {
            id: object_key,
            url,
        })),
        Err(e) => {
            tracing::error!("storage upload failed: {e}");
            Err(ApiError::ServerError)
        }
    }
}
