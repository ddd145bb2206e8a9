use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Every route here sits behind the session verifier layer and receives a
/// validated `AuthUser`. Read access needs any role; mutations additionally
/// pass the `can_modify` ownership predicate (contributor + author) inside the
/// handlers, and uploads are contributor-only.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The caller's own profile, resolved from the session claims.
        .route("/me", get(handlers::get_me))
        // GET /posts?status=&limit=&offset=
        // Role-gated listing: published for everyone, `status=all` is the
        // contributor's own management view.
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        // GET /posts/{id} (the segment is a UUID or a slug)
        // Post detail with content collections and the assembled sequence.
        // Draft posts resolve only for their author; everyone else sees 404.
        // PATCH/DELETE are owner-only: metadata update (one-way publish) and
        // transactional cascade delete.
        .route(
            "/posts/{id}",
            get(handlers::get_post_detail)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // --- Content collections (owner-only) ---
        .route("/posts/{id}/photos", post(handlers::add_photo))
        .route(
            "/posts/{id}/photos/{item_id}",
            patch(handlers::update_photo).delete(handlers::delete_photo),
        )
        .route("/posts/{id}/videos", post(handlers::add_video))
        .route(
            "/posts/{id}/videos/{item_id}",
            patch(handlers::update_video).delete(handlers::delete_video),
        )
        .route("/posts/{id}/text", post(handlers::add_text_block))
        .route(
            "/posts/{id}/text/{item_id}",
            patch(handlers::update_text_block).delete(handlers::delete_text_block),
        )
        // POST /posts/{id}/reorder
        // Atomic re-assignment of displayOrder across all three collections.
        .route("/posts/{id}/reorder", post(handlers::reorder_content))
        // POST /upload?filename=
        // Raw-bytes media upload; the object is stored before any metadata
        // row references it.
        .route("/upload", post(handlers::upload_media))
}
