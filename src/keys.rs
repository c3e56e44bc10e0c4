//! Object-key helpers for story images stored as `story_id/filename`.

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp"];

/// Check whether an object key names an image we can OCR.
pub fn is_image_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Story id from a `story_id/filename` key.
pub fn story_id_from_key(key: &str) -> Option<&str> {
    let mut parts = key.split('/');
    let story_id = parts.next()?;
    parts.next()?;
    if story_id.is_empty() {
        None
    } else {
        Some(story_id)
    }
}
