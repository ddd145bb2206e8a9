use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{ContentKind, ContentRef, Photo, TextBlock, Video};

/// ContentEntry
///
/// One element of an assembled rendering sequence: a photo, video, or text
/// block, tagged with its type on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export)]
pub enum ContentEntry {
    Photo(Photo),
    Video(Video),
    Text(TextBlock),
}

impl ContentEntry {
    pub fn id(&self) -> Uuid {
        match self {
            ContentEntry::Photo(p) => p.id,
            ContentEntry::Video(v) => v.id,
            ContentEntry::Text(t) => t.id,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentEntry::Photo(_) => ContentKind::Photo,
            ContentEntry::Video(_) => ContentKind::Video,
            ContentEntry::Text(_) => ContentKind::Text,
        }
    }

    pub fn display_order(&self) -> f64 {
        match self {
            ContentEntry::Photo(p) => p.display_order,
            ContentEntry::Video(v) => v.display_order,
            ContentEntry::Text(t) => t.display_order,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            ContentEntry::Photo(p) => p.created_at,
            ContentEntry::Video(v) => v.created_at,
            ContentEntry::Text(t) => t.created_at,
        }
    }
}

/// Merges a post's three content collections into one rendering sequence.
///
/// The sequence is the union of all items sorted by `display_order` ascending;
/// `display_order` is a total order across types, not per type. Equal keys fall
/// back to creation time, then id, so repeated calls over unchanged input yield
/// an identical sequence. Inputs are borrowed and never mutated; unreachable
/// media URLs are passed through untouched (rendering concern).
pub fn assemble(photos: &[Photo], videos: &[Video], text_blocks: &[TextBlock]) -> Vec<ContentEntry> {
    let mut entries: Vec<ContentEntry> =
        Vec::with_capacity(photos.len() + videos.len() + text_blocks.len());
    entries.extend(photos.iter().cloned().map(ContentEntry::Photo));
    entries.extend(videos.iter().cloned().map(ContentEntry::Video));
    entries.extend(text_blocks.iter().cloned().map(ContentEntry::Text));

    entries.sort_by(|a, b| {
        a.display_order()
            .partial_cmp(&b.display_order())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(&b.id()))
    });
    entries
}

/// Validates a reorder request against a post's current content and computes
/// the display_order assignment for each referenced item.
///
/// The request must reference every current item exactly once; anything else
/// (missing item, unknown id, duplicate, wrong type tag) is `InvalidInput`.
/// Assignments are consecutive whole numbers in the caller's order, which makes
/// re-applying the same request a no-op.
pub fn plan_reorder(
    current: &[(ContentKind, Uuid)],
    ordered: &[ContentRef],
) -> Result<Vec<(ContentRef, f64)>, ApiError> {
    let existing: HashSet<(ContentKind, Uuid)> = current.iter().copied().collect();

    if ordered.len() != existing.len() {
        return Err(ApiError::InvalidInput(format!(
            "reorder must list all {} content items, got {}",
            existing.len(),
            ordered.len()
        )));
    }

    let mut seen: HashSet<(ContentKind, Uuid)> = HashSet::with_capacity(ordered.len());
    for item in ordered {
        let key = (item.kind, item.id);
        if !existing.contains(&key) {
            return Err(ApiError::InvalidInput(format!(
                "unknown content item {} in reorder request",
                item.id
            )));
        }
        if !seen.insert(key) {
            return Err(ApiError::InvalidInput(format!(
                "content item {} listed twice in reorder request",
                item.id
            )));
        }
    }

    Ok(ordered
        .iter()
        .enumerate()
        .map(|(position, item)| (*item, position as f64))
        .collect())
}
