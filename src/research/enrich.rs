use futures::future::join_all;
use tracing::debug;

use super::entity::UniversityEntity;
use crate::wikipedia::PhotoLookup;

/// Lookup key for the summary service: parenthetical groups removed along with
/// the whitespace around them, then trimmed. Other spacing in the name is kept.
/// Falls back to the trimmed name if nothing is left.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut after_group = false;
    for c in name.chars() {
        match c {
            '(' => {
                if depth == 0 {
                    out.truncate(out.trim_end().len());
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                after_group = depth == 0;
            }
            _ if depth > 0 => {}
            c if after_group && c.is_whitespace() => {}
            c => {
                if after_group && !out.is_empty() {
                    out.push(' ');
                }
                after_group = false;
                out.push(c);
            }
        }
    }

    let cleaned = out.trim();
    if cleaned.is_empty() {
        name.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

/// Replaces every entity's photo with a looked-up thumbnail or `default_photo`.
/// Lookups run concurrently; order is preserved and no lookup can fail the batch.
pub async fn enrich_photos(
    lookup: &impl PhotoLookup,
    mut entities: Vec<UniversityEntity>,
    default_photo: &str,
) -> Vec<UniversityEntity> {
    let keys: Vec<String> = entities.iter().map(|e| sanitize_name(&e.name)).collect();
    let photos = join_all(keys.iter().map(|key| lookup.thumbnail(key))).await;

    for ((entity, key), photo) in entities.iter_mut().zip(&keys).zip(photos) {
        debug!(name = %entity.name, key = %key, found = photo.is_some(), "photo lookup settled");
        entity.photo = photo.unwrap_or_else(|| default_photo.to_string());
    }

    entities
}
