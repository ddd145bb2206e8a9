use chrono::{DateTime, TimeZone, Utc};
use reiseblog::{
    assembly,
    models::{BlogPost, ContentKind, ContentRef, Photo, PostStatus, TextBlock, Video},
    repository::{Repository, SqliteRepository, init_schema},
};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

// --- Fixtures ---

async fn test_repo() -> SqliteRepository {
    // A single connection keeps the in-memory database alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&pool).await.expect("schema");
    SqliteRepository::new(pool)
}

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn post(n: u128, author: u128, status: PostStatus, created_offset: i64) -> BlogPost {
    BlogPost {
        id: Uuid::from_u128(n),
        slug: format!("etappe-{n}"),
        title: format!("Etappe {n}"),
        description: Some("unterwegs".to_string()),
        cover_image: None,
        template_id: "journal".to_string(),
        author_id: Uuid::from_u128(author),
        status,
        created_at: ts(created_offset),
        updated_at: ts(created_offset),
        published_at: (status == PostStatus::Published).then(|| ts(created_offset)),
    }
}

fn photo(n: u128, post_id: Uuid, order: f64, created_offset: i64) -> Photo {
    Photo {
        id: Uuid::from_u128(n),
        post_id,
        display_order: order,
        url: format!("https://media.example/{n}.jpg"),
        caption: None,
        alt_text: None,
        created_at: ts(created_offset),
    }
}

fn video(n: u128, post_id: Uuid, order: f64, created_offset: i64) -> Video {
    Video {
        id: Uuid::from_u128(n),
        post_id,
        display_order: order,
        url: format!("https://media.example/{n}.mp4"),
        caption: None,
        thumbnail: None,
        duration_seconds: Some(30),
        created_at: ts(created_offset),
    }
}

fn text(n: u128, post_id: Uuid, order: f64, created_offset: i64) -> TextBlock {
    TextBlock {
        id: Uuid::from_u128(n),
        post_id,
        display_order: order,
        content: "Wir sind angekommen.".to_string(),
        created_at: ts(created_offset),
    }
}

/// Small deterministic PRNG so the fixture mix varies without a rand dependency.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn in_range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next() % (hi - lo)
    }
}

// --- Visibility & Listing ---

#[tokio::test]
async fn published_listing_never_contains_drafts() {
    let repo = test_repo().await;
    let mut rng = XorShift(0x5eed);

    let drafts = rng.in_range(5, 20);
    let published = rng.in_range(5, 20);

    let mut n = 1u128;
    for _ in 0..drafts {
        repo.insert_post(post(n, 1, PostStatus::Draft, n as i64)).await.unwrap();
        n += 1;
    }
    for _ in 0..published {
        repo.insert_post(post(n, 1, PostStatus::Published, n as i64)).await.unwrap();
        n += 1;
    }

    let listed = repo.list_published(1000, 0).await.unwrap();
    assert_eq!(listed.len() as u64, published);
    assert!(listed.iter().all(|p| p.status == PostStatus::Published));
    assert_eq!(repo.count_published().await.unwrap() as u64, published);
}

#[tokio::test]
async fn listing_is_reverse_chronological_with_id_tiebreak() {
    let repo = test_repo().await;

    // Distinct publish times, inserted out of order.
    repo.insert_post(post(1, 1, PostStatus::Published, 100)).await.unwrap();
    repo.insert_post(post(2, 1, PostStatus::Published, 300)).await.unwrap();
    repo.insert_post(post(3, 1, PostStatus::Published, 200)).await.unwrap();
    // Tie on published_at between 4 and 5: id ascending breaks it.
    let mut a = post(4, 1, PostStatus::Published, 400);
    let mut b = post(5, 1, PostStatus::Published, 400);
    a.published_at = Some(ts(500));
    b.published_at = Some(ts(500));
    repo.insert_post(b).await.unwrap();
    repo.insert_post(a).await.unwrap();

    let listed = repo.list_published(10, 0).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|p| p.id).collect();
    assert_eq!(
        ids,
        vec![
            Uuid::from_u128(4),
            Uuid::from_u128(5),
            Uuid::from_u128(2),
            Uuid::from_u128(3),
            Uuid::from_u128(1),
        ]
    );
}

#[tokio::test]
async fn drafts_sort_by_created_at_in_author_listing() {
    let repo = test_repo().await;
    repo.insert_post(post(1, 7, PostStatus::Draft, 100)).await.unwrap();
    repo.insert_post(post(2, 7, PostStatus::Published, 50)).await.unwrap();
    repo.insert_post(post(3, 7, PostStatus::Draft, 200)).await.unwrap();
    // Another author's post never shows up in the management view.
    repo.insert_post(post(4, 8, PostStatus::Draft, 300)).await.unwrap();

    let listed = repo.list_by_author(Uuid::from_u128(7), 10, 0).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|p| p.id).collect();
    assert_eq!(
        ids,
        vec![Uuid::from_u128(3), Uuid::from_u128(1), Uuid::from_u128(2)]
    );
    assert_eq!(repo.count_by_author(Uuid::from_u128(7)).await.unwrap(), 3);
}

#[tokio::test]
async fn pagination_never_duplicates_or_skips() {
    let repo = test_repo().await;
    for n in 1..=25u128 {
        repo.insert_post(post(n, 1, PostStatus::Published, n as i64)).await.unwrap();
    }

    let mut paged: Vec<Uuid> = Vec::new();
    let mut offset = 0;
    loop {
        let page = repo.list_published(10, offset).await.unwrap();
        if page.is_empty() {
            break;
        }
        offset += page.len() as i64;
        paged.extend(page.iter().map(|p| p.id));
    }

    let full: Vec<Uuid> = repo
        .list_published(1000, 0)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(paged.len(), 25);
    assert_eq!(paged, full);
}

// --- Direct access & mutation ---

#[tokio::test]
async fn posts_resolve_by_id_and_slug() {
    let repo = test_repo().await;
    repo.insert_post(post(1, 1, PostStatus::Published, 1)).await.unwrap();

    let by_id = repo.get_post(Uuid::from_u128(1)).await.unwrap().unwrap();
    assert_eq!(by_id.slug, "etappe-1");

    let by_slug = repo.get_post_by_slug("etappe-1").await.unwrap().unwrap();
    assert_eq!(by_slug.id, Uuid::from_u128(1));

    assert!(repo.get_post_by_slug("nirgendwo").await.unwrap().is_none());
    assert!(repo.slug_exists("etappe-1").await.unwrap());
    assert!(!repo.slug_exists("etappe-2").await.unwrap());
}

#[tokio::test]
async fn update_post_only_touches_provided_fields() {
    let repo = test_repo().await;
    repo.insert_post(post(1, 1, PostStatus::Draft, 1)).await.unwrap();

    let changes = reiseblog::models::UpdatePostRequest {
        title: Some("Neuer Titel".to_string()),
        ..Default::default()
    };
    let updated = repo
        .update_post(Uuid::from_u128(1), changes, None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Neuer Titel");
    assert_eq!(updated.description.as_deref(), Some("unterwegs"));
    assert_eq!(updated.status, PostStatus::Draft);
    assert!(updated.published_at.is_none());
    assert!(updated.updated_at > updated.created_at);
}

#[tokio::test]
async fn publishing_stamps_published_at() {
    let repo = test_repo().await;
    repo.insert_post(post(1, 1, PostStatus::Draft, 1)).await.unwrap();

    let publish_time = Utc::now();
    let changes = reiseblog::models::UpdatePostRequest {
        status: Some(PostStatus::Published),
        ..Default::default()
    };
    let updated = repo
        .update_post(Uuid::from_u128(1), changes, Some(publish_time))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, PostStatus::Published);
    assert_eq!(updated.published_at.unwrap().timestamp(), publish_time.timestamp());
}

#[tokio::test]
async fn cascade_delete_removes_every_content_row() {
    let repo = test_repo().await;
    let p = post(1, 1, PostStatus::Published, 1);
    let post_id = p.id;
    repo.insert_post(p).await.unwrap();

    for n in 10..13u128 {
        repo.insert_photo(photo(n, post_id, n as f64, n as i64)).await.unwrap();
    }
    for n in 20..22u128 {
        repo.insert_video(video(n, post_id, n as f64, n as i64)).await.unwrap();
    }
    repo.insert_text_block(text(30, post_id, 30.0, 30)).await.unwrap();

    assert_eq!(repo.count_content(post_id).await.unwrap(), 6);

    assert!(repo.delete_post_cascade(post_id).await.unwrap());

    assert!(repo.get_post(post_id).await.unwrap().is_none());
    assert_eq!(repo.count_content(post_id).await.unwrap(), 0);

    // A second delete is a no-op.
    assert!(!repo.delete_post_cascade(post_id).await.unwrap());
}

// --- Ordering & reorder ---

#[tokio::test]
async fn next_display_order_spans_all_three_collections() {
    let repo = test_repo().await;
    let p = post(1, 1, PostStatus::Draft, 1);
    let post_id = p.id;
    repo.insert_post(p).await.unwrap();

    assert_eq!(repo.next_display_order(post_id).await.unwrap(), 0.0);

    repo.insert_photo(photo(10, post_id, 0.0, 1)).await.unwrap();
    repo.insert_text_block(text(11, post_id, 2.5, 2)).await.unwrap();

    assert_eq!(repo.next_display_order(post_id).await.unwrap(), 3.5);
}

#[tokio::test]
async fn reorder_is_atomic_and_idempotent() {
    let repo = test_repo().await;
    let p = post(1, 1, PostStatus::Draft, 1);
    let post_id = p.id;
    repo.insert_post(p).await.unwrap();

    repo.insert_photo(photo(10, post_id, 0.0, 1)).await.unwrap();
    repo.insert_video(video(20, post_id, 1.0, 2)).await.unwrap();
    repo.insert_text_block(text(30, post_id, 2.0, 3)).await.unwrap();

    let target = vec![
        ContentRef { id: Uuid::from_u128(30), kind: ContentKind::Text },
        ContentRef { id: Uuid::from_u128(10), kind: ContentKind::Photo },
        ContentRef { id: Uuid::from_u128(20), kind: ContentKind::Video },
    ];
    let current = vec![
        (ContentKind::Photo, Uuid::from_u128(10)),
        (ContentKind::Video, Uuid::from_u128(20)),
        (ContentKind::Text, Uuid::from_u128(30)),
    ];
    let plan = assembly::plan_reorder(&current, &target).unwrap();

    assert!(repo.apply_reorder(post_id, &plan).await.unwrap());

    let read_orders = |content: &reiseblog::models::PostContent| -> Vec<(Uuid, f64)> {
        let seq = assembly::assemble(&content.photos, &content.videos, &content.text_blocks);
        seq.iter().map(|e| (e.id(), e.display_order())).collect()
    };

    let content = repo.get_content(post_id).await.unwrap();
    let first = read_orders(&content);
    assert_eq!(
        first,
        vec![
            (Uuid::from_u128(30), 0.0),
            (Uuid::from_u128(10), 1.0),
            (Uuid::from_u128(20), 2.0),
        ]
    );

    // Applying the same target order again yields identical assignments.
    assert!(repo.apply_reorder(post_id, &plan).await.unwrap());
    let content = repo.get_content(post_id).await.unwrap();
    assert_eq!(read_orders(&content), first);
}

#[tokio::test]
async fn reorder_rolls_back_when_a_row_vanished() {
    let repo = test_repo().await;
    let p = post(1, 1, PostStatus::Draft, 1);
    let post_id = p.id;
    repo.insert_post(p).await.unwrap();

    repo.insert_photo(photo(10, post_id, 0.0, 1)).await.unwrap();
    repo.insert_photo(photo(11, post_id, 1.0, 2)).await.unwrap();

    // Plan built against a snapshot that still contains photo 11...
    let current = vec![
        (ContentKind::Photo, Uuid::from_u128(10)),
        (ContentKind::Photo, Uuid::from_u128(11)),
    ];
    let target = vec![
        ContentRef { id: Uuid::from_u128(11), kind: ContentKind::Photo },
        ContentRef { id: Uuid::from_u128(10), kind: ContentKind::Photo },
    ];
    let plan = assembly::plan_reorder(&current, &target).unwrap();

    // ...which is then deleted before the write.
    assert!(repo.delete_photo(post_id, Uuid::from_u128(11)).await.unwrap());

    assert!(!repo.apply_reorder(post_id, &plan).await.unwrap());

    // The surviving row keeps its prior ordering: all-or-nothing.
    let content = repo.get_content(post_id).await.unwrap();
    assert_eq!(content.photos.len(), 1);
    assert_eq!(content.photos[0].display_order, 0.0);
}

#[tokio::test]
async fn content_updates_are_scoped_to_their_post() {
    let repo = test_repo().await;
    let a = post(1, 1, PostStatus::Draft, 1);
    let b = post(2, 1, PostStatus::Draft, 2);
    let (post_a, post_b) = (a.id, b.id);
    repo.insert_post(a).await.unwrap();
    repo.insert_post(b).await.unwrap();
    repo.insert_photo(photo(10, post_a, 0.0, 1)).await.unwrap();

    // Updating/deleting through the wrong post id must not match.
    let changes = reiseblog::models::UpdatePhotoRequest {
        caption: Some("am Meer".to_string()),
        ..Default::default()
    };
    assert!(
        repo.update_photo(post_b, Uuid::from_u128(10), changes.clone())
            .await
            .unwrap()
            .is_none()
    );
    assert!(!repo.delete_photo(post_b, Uuid::from_u128(10)).await.unwrap());

    let updated = repo
        .update_photo(post_a, Uuid::from_u128(10), changes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.caption.as_deref(), Some("am Meer"));
    // COALESCE keeps the untouched columns.
    assert_eq!(updated.url, "https://media.example/10.jpg");
}
