//! Pure comparison of a property's image columns against the files on disk.

use std::collections::HashSet;

use crate::modules::consistency::model::PropertyIssues;
use crate::modules::media::reference::{legacy_images, normalize_reference, renumber};
use crate::modules::property::schema::{Photo, PropertyImagesRow};

pub fn inspect(row: &PropertyImagesRow, on_disk: &HashSet<String>) -> PropertyIssues {
    let mut issues =
        PropertyIssues { property_id: row.id, title: row.title.clone(), ..Default::default() };

    let mut legacy = Vec::new();
    for raw in &row.images {
        match normalize_reference(raw) {
            Some(name) => legacy.push(name),
            None => issues.invalid.push(raw.clone()),
        }
    }
    let photo_names: Vec<&str> = row.photos.0.iter().map(|p| p.filename.as_str()).collect();

    let legacy_set: HashSet<&str> = legacy.iter().map(String::as_str).collect();
    let photo_set: HashSet<&str> = photo_names.iter().copied().collect();

    let mut seen = HashSet::new();
    for name in &photo_names {
        if !seen.insert(*name) {
            issues.duplicates.push(name.to_string());
            continue;
        }
        if !legacy_set.contains(name) {
            issues.photo_only.push(name.to_string());
        }
    }
    let mut seen_legacy = HashSet::new();
    for name in &legacy {
        if !seen_legacy.insert(name.as_str()) {
            issues.duplicates.push(name.clone());
            continue;
        }
        if !photo_set.contains(name.as_str()) {
            issues.legacy_only.push(name.clone());
        }
    }

    let mut missing: Vec<String> = legacy_set
        .union(&photo_set)
        .filter(|name| !on_disk.contains(**name))
        .map(|name| name.to_string())
        .collect();
    missing.sort();
    issues.missing = missing;
    issues.duplicates.sort();
    issues.duplicates.dedup();
    issues
}

/// Stored files that no property references through either column.
pub fn find_orphans(rows: &[PropertyImagesRow], on_disk: &[String]) -> Vec<String> {
    let referenced: HashSet<String> = rows
        .iter()
        .flat_map(|row| {
            row.photos
                .0
                .iter()
                .map(|p| p.filename.clone())
                .chain(row.images.iter().filter_map(|raw| normalize_reference(raw)))
        })
        .collect();
    on_disk.iter().filter(|name| !referenced.contains(*name)).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub photos: Vec<Photo>,
    pub images: Vec<String>,
    pub dropped: Vec<String>,
}

/// Merges legacy-only references into `photos`, drops names `available` rejects,
/// deduplicates and renumbers. The legacy column is rebuilt from the result.
pub fn reconcile(row: &PropertyImagesRow, available: impl Fn(&str) -> bool) -> Reconciled {
    let mut ordered = row.photos.0.clone();
    ordered.sort_by_key(|p| p.order);

    let mut next = ordered.iter().map(|p| p.order + 1).max().unwrap_or(0);
    for name in row.images.iter().filter_map(|raw| normalize_reference(raw)) {
        if !ordered.iter().any(|p| p.filename == name) {
            ordered.push(Photo { filename: name, alt_text: row.title.clone(), order: next });
            next += 1;
        }
    }

    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(ordered.len());
    let mut dropped = Vec::new();
    for photo in ordered {
        if !seen.insert(photo.filename.clone()) {
            continue;
        }
        if available(&photo.filename) {
            kept.push(photo);
        } else {
            dropped.push(photo.filename);
        }
    }

    let photos = renumber(kept);
    let images = legacy_images(&photos);
    Reconciled { photos, images, dropped }
}
