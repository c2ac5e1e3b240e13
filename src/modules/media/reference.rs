//! Naming rules shared by the upload pipeline, the consistency checker and backups.

use std::collections::HashSet;

use crate::constants::PROPERTY_IMAGE_URL_PREFIX;
use crate::modules::property::schema::Photo;

/// A stored image name is a single path segment: no separators, no parent references.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

pub fn photo_url(filename: &str) -> String {
    format!("{PROPERTY_IMAGE_URL_PREFIX}/{filename}")
}

/// Reduces any legacy reference (bare name, `/uploads/properties/x.jpg`, absolute URL,
/// URL with query string) to the stored file name.
pub fn normalize_reference(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or_default();
    let name = without_query.rsplit('/').next().unwrap_or_default();
    if !is_safe_filename(name) || without_query.contains("..") {
        return None;
    }
    Some(name.to_string())
}

/// Orders by `order` (stable for ties) and renumbers 0..n.
pub fn renumber(mut photos: Vec<Photo>) -> Vec<Photo> {
    photos.sort_by_key(|p| p.order);
    for (index, photo) in photos.iter_mut().enumerate() {
        photo.order = index as i32;
    }
    photos
}

/// The legacy column derived from the canonical photo list.
pub fn legacy_images(photos: &[Photo]) -> Vec<String> {
    let mut ordered: Vec<&Photo> = photos.iter().collect();
    ordered.sort_by_key(|p| p.order);
    ordered.into_iter().map(|p| photo_url(&p.filename)).collect()
}

/// Appends new files after the current last photo.
pub fn append_photos(existing: &[Photo], filenames: &[String], alt_text: &str) -> Vec<Photo> {
    let mut photos = renumber(existing.to_vec());
    let known: HashSet<&str> = existing.iter().map(|p| p.filename.as_str()).collect();
    let mut next = photos.len() as i32;
    for filename in filenames {
        if known.contains(filename.as_str()) {
            continue;
        }
        photos.push(Photo { filename: filename.clone(), alt_text: alt_text.to_string(), order: next });
        next += 1;
    }
    photos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str, order: i32) -> Photo {
        Photo { filename: name.to_string(), alt_text: String::new(), order }
    }

    #[test]
    fn normalizes_legacy_reference_shapes() {
        assert_eq!(normalize_reference("a.jpg").as_deref(), Some("a.jpg"));
        assert_eq!(normalize_reference("/uploads/properties/a.jpg").as_deref(), Some("a.jpg"));
        assert_eq!(normalize_reference("uploads/properties/a.jpg").as_deref(), Some("a.jpg"));
        assert_eq!(
            normalize_reference("https://cdn.example.com/uploads/properties/a.jpg?v=3").as_deref(),
            Some("a.jpg")
        );
        assert_eq!(normalize_reference("  b.png#top ").as_deref(), Some("b.png"));
    }

    #[test]
    fn rejects_unusable_references() {
        assert_eq!(normalize_reference(""), None);
        assert_eq!(normalize_reference("/uploads/properties/"), None);
        assert_eq!(normalize_reference("/uploads/../../etc/passwd"), None);
        assert_eq!(normalize_reference(".."), None);
        assert_eq!(normalize_reference("../x.jpg"), None);
        assert_eq!(normalize_reference("uploads/../x.jpg"), None);
        assert!(!is_safe_filename("a\\b.jpg"));
        assert!(is_safe_filename("0190b2c4-7d1e-7aa0-9d1b-3f1f8e0e1a2b.jpg"));
    }

    #[test]
    fn renumber_sorts_then_compacts() {
        let photos = renumber(vec![photo("c", 9), photo("a", 1), photo("b", 4)]);
        let names: Vec<_> = photos.iter().map(|p| (p.filename.as_str(), p.order)).collect();
        assert_eq!(names, vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn legacy_column_follows_photo_order() {
        let images = legacy_images(&[photo("second.jpg", 1), photo("first.jpg", 0)]);
        assert_eq!(images, vec!["/uploads/properties/first.jpg", "/uploads/properties/second.jpg"]);
    }

    #[test]
    fn append_skips_known_files() {
        let photos = append_photos(
            &[photo("a.jpg", 3)],
            &["b.jpg".to_string(), "a.jpg".to_string()],
            "Villa",
        );
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].order, 0);
        assert_eq!(photos[1], Photo { filename: "b.jpg".into(), alt_text: "Villa".into(), order: 1 });
    }
}
