use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::backup::{model::PropertyImageSnapshot, store::BackupStore};
use crate::modules::media::{
    model::{IncomingImage, PhotoArrangement, UploadConfig},
    reference::{append_photos, legacy_images, renumber},
    storage::ImageStore,
};
use crate::modules::property::{
    model::PhotoList,
    repository::PropertyRepository,
    schema::{Photo, PropertyEntity},
};

/// Detects the image type from its leading bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

/// Keeps the uploaded extension when it agrees with the detected type.
fn extension_for(original_filename: &str, mime: &str) -> String {
    let candidates = mime_guess::get_mime_extensions_str(mime).unwrap_or(&[]);
    let original = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match original {
        Some(ext) if candidates.contains(&ext.as_str()) => ext,
        _ => match mime {
            "image/jpeg" => "jpg".to_string(),
            _ => candidates.first().map(|ext| ext.to_string()).unwrap_or_default(),
        },
    }
}

/// Applies a full arrangement; it must name exactly the current files.
pub fn arrange(
    current: &[Photo],
    arrangement: &[PhotoArrangement],
) -> Result<Vec<Photo>, error::SystemError> {
    let existing: HashSet<&str> = current.iter().map(|p| p.filename.as_str()).collect();
    let requested: HashSet<&str> = arrangement.iter().map(|p| p.filename.as_str()).collect();

    if requested.len() != arrangement.len() {
        return Err(error::SystemError::bad_request("Duplicate photo in arrangement"));
    }
    if requested != existing {
        return Err(error::SystemError::bad_request(
            "Arrangement must list exactly the property's current photos",
        ));
    }

    let photos = arrangement
        .iter()
        .map(|p| Photo { filename: p.filename.clone(), alt_text: p.alt_text.clone(), order: p.order })
        .collect();
    Ok(renumber(photos))
}

#[derive(Clone)]
pub struct MediaService {
    properties: Arc<dyn PropertyRepository + Send + Sync>,
    images: Arc<ImageStore>,
    backups: Arc<BackupStore>,
    config: UploadConfig,
}

impl MediaService {
    pub fn new(
        properties: Arc<dyn PropertyRepository + Send + Sync>,
        images: Arc<ImageStore>,
        backups: Arc<BackupStore>,
        config: UploadConfig,
    ) -> Self {
        info!("MediaService initialized with dependencies");
        Self { properties, images, backups, config }
    }

    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }

    pub fn max_files(&self) -> usize {
        self.config.max_files
    }

    /// Validate file type and size
    fn validate_image(&self, file: &IncomingImage) -> Result<&'static str, error::SystemError> {
        if file.bytes.is_empty() {
            return Err(error::SystemError::bad_request(format!(
                "File '{}' is empty",
                file.original_filename
            )));
        }

        if file.bytes.len() > self.config.max_file_size {
            return Err(error::SystemError::bad_request(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.config.max_file_size
            )));
        }

        match sniff_image_mime(&file.bytes) {
            Some(mime) if self.config.allowed_mime_types.iter().any(|m| m == mime) => Ok(mime),
            _ => Err(error::SystemError::bad_request(format!(
                "File '{}' is not an allowed image type",
                file.original_filename
            ))),
        }
    }

    async fn load(&self, property_id: &Uuid) -> Result<PropertyEntity, error::SystemError> {
        self.properties
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Property not found"))
    }

    async fn snapshot(&self, entity: &PropertyEntity, reason: &str) -> Result<(), error::SystemError> {
        self.backups
            .write_property_snapshot(&PropertyImageSnapshot::capture(
                entity.id,
                &entity.title,
                &entity.images,
                &entity.photos.0,
                reason,
            ))
            .await?;
        Ok(())
    }

    async fn store_photos(
        &self,
        property_id: &Uuid,
        photos: Vec<Photo>,
    ) -> Result<PhotoList, error::SystemError> {
        let photos = renumber(photos);
        let images = legacy_images(&photos);
        let entity = self.properties.set_images(property_id, &images, &photos).await?;
        Ok(PhotoList { photos: entity.photos.0, images: entity.images })
    }

    /// Saves every file, then appends them to the property in one update.
    /// Files already written are removed again if any later step fails.
    pub async fn upload_photos(
        &self,
        property_id: Uuid,
        files: Vec<IncomingImage>,
        alt_text: Option<String>,
    ) -> Result<PhotoList, error::SystemError> {
        if files.is_empty() {
            return Err(error::SystemError::bad_request("No file found in request"));
        }
        if files.len() > self.config.max_files {
            return Err(error::SystemError::bad_request(format!(
                "At most {} files can be uploaded at once",
                self.config.max_files
            )));
        }

        let mut checked = Vec::with_capacity(files.len());
        for file in &files {
            checked.push((file, self.validate_image(file)?));
        }

        let entity = self.load(&property_id).await?;

        let mut saved = Vec::with_capacity(checked.len());
        for (file, mime) in checked {
            let extension = extension_for(&file.original_filename, mime);
            match self.images.save(&file.bytes, &extension).await {
                Ok(name) => saved.push(name),
                Err(e) => {
                    self.discard(&saved).await;
                    return Err(e);
                }
            }
        }

        let alt_text = alt_text.unwrap_or_else(|| entity.title.clone());
        let photos = append_photos(&entity.photos.0, &saved, &alt_text);
        match self.store_photos(&property_id, photos).await {
            Ok(list) => {
                info!("Uploaded {} photo(s) to property {}", saved.len(), property_id);
                Ok(list)
            }
            Err(e) => {
                self.discard(&saved).await;
                Err(e)
            }
        }
    }

    async fn discard(&self, names: &[String]) {
        for name in names {
            if let Err(e) = self.images.remove(name).await {
                warn!("Could not remove orphaned upload {}: {}", name, e);
            }
        }
    }

    pub async fn delete_photo(
        &self,
        property_id: Uuid,
        filename: &str,
    ) -> Result<PhotoList, error::SystemError> {
        let entity = self.load(&property_id).await?;
        if !entity.photos.0.iter().any(|p| p.filename == filename) {
            return Err(error::SystemError::not_found("Photo not found on this property"));
        }

        self.snapshot(&entity, "delete_photo").await?;

        let photos: Vec<Photo> =
            entity.photos.0.iter().filter(|p| p.filename != filename).cloned().collect();
        let list = self.store_photos(&property_id, photos).await?;

        if !self.images.remove(filename).await? {
            warn!("Photo {} of property {} was already missing on disk", filename, property_id);
        }
        info!("Photo {} removed from property {}", filename, property_id);
        Ok(list)
    }

    pub async fn arrange_photos(
        &self,
        property_id: Uuid,
        arrangement: Vec<PhotoArrangement>,
    ) -> Result<PhotoList, error::SystemError> {
        let entity = self.load(&property_id).await?;
        let photos = arrange(&entity.photos.0, &arrangement)?;
        self.store_photos(&property_id, photos).await
    }

    pub async fn read_image(&self, filename: &str) -> Result<(Vec<u8>, String), error::SystemError> {
        let bytes = self.images.read(filename).await?;
        let mime = mime_guess::from_path(filename).first_or_octet_stream().to_string();
        Ok((bytes, mime))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use sqlx::types::Json;

    use super::*;
    use crate::modules::property::schema::PropertyStatus;
    use crate::modules::property::service::tests::{entity, MemoryPropertyRepo};

    pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];

    fn photo(name: &str, order: i32) -> Photo {
        Photo { filename: name.to_string(), alt_text: String::new(), order }
    }

    fn arrangement(name: &str, order: i32) -> PhotoArrangement {
        PhotoArrangement { filename: name.to_string(), alt_text: format!("alt {name}"), order }
    }

    async fn service(
        rows: Vec<PropertyEntity>,
    ) -> (tempfile::TempDir, Arc<MemoryPropertyRepo>, MediaService) {
        service_with(rows, UploadConfig::default()).await
    }

    pub async fn service_with(
        rows: Vec<PropertyEntity>,
        config: UploadConfig,
    ) -> (tempfile::TempDir, Arc<MemoryPropertyRepo>, MediaService) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(MemoryPropertyRepo::with(rows));
        let images = Arc::new(ImageStore::open(dir.path().join("uploads")).await.unwrap());
        let backups = Arc::new(BackupStore::open(dir.path().join("backups")).await.unwrap());
        let service = MediaService::new(repo.clone(), images, backups, config);
        (dir, repo, service)
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_image_mime(PNG), Some("image/png"));
        assert_eq!(sniff_image_mime(JPEG), Some("image/jpeg"));
        assert_eq!(sniff_image_mime(b"GIF89a..."), Some("image/gif"));
        assert_eq!(sniff_image_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_image_mime(b"%PDF-1.7"), None);
    }

    #[test]
    fn extension_prefers_matching_original() {
        assert_eq!(extension_for("House.JPEG", "image/jpeg"), "jpeg");
        assert_eq!(extension_for("house.png", "image/jpeg"), "jpg");
        assert_eq!(extension_for("noext", "image/png"), "png");
    }

    #[test]
    fn arrangement_must_match_current_set() {
        let current = vec![photo("a.jpg", 0), photo("b.jpg", 1)];

        let arranged =
            arrange(&current, &[arrangement("b.jpg", 5), arrangement("a.jpg", 7)]).unwrap();
        assert_eq!(arranged[0].filename, "b.jpg");
        assert_eq!(arranged[0].order, 0);
        assert_eq!(arranged[1].alt_text, "alt a.jpg");

        assert!(arrange(&current, &[arrangement("a.jpg", 0)]).is_err());
        assert!(arrange(&current, &[arrangement("a.jpg", 0), arrangement("a.jpg", 1)]).is_err());
        assert!(arrange(&current, &[arrangement("a.jpg", 0), arrangement("c.jpg", 1)]).is_err());
    }

    #[tokio::test]
    async fn upload_appends_and_syncs_legacy_column() {
        let mut row = entity("Villa", PropertyStatus::Published);
        row.photos = Json(vec![photo("old.jpg", 0)]);
        let id = row.id;
        let (_dir, repo, service) = service(vec![row]).await;

        let list = service
            .upload_photos(
                id,
                vec![IncomingImage { original_filename: "pool.png".into(), bytes: PNG.to_vec() }],
                None,
            )
            .await
            .unwrap();

        assert_eq!(list.photos.len(), 2);
        let new_name = &list.photos[1].filename;
        assert!(new_name.ends_with(".png"));
        assert_eq!(list.photos[1].alt_text, "Villa");
        assert_eq!(list.images[1], format!("/uploads/properties/{new_name}"));

        let stored = repo.get(&id).unwrap();
        assert_eq!(stored.images, list.images);
        assert!(service.read_image(new_name).await.is_ok());
    }

    #[tokio::test]
    async fn upload_rejects_non_images_before_writing() {
        let row = entity("Villa", PropertyStatus::Published);
        let id = row.id;
        let (dir, _repo, service) = service(vec![row]).await;

        let result = service
            .upload_photos(
                id,
                vec![
                    IncomingImage { original_filename: "a.jpg".into(), bytes: JPEG.to_vec() },
                    IncomingImage { original_filename: "b.jpg".into(), bytes: b"<html>".to_vec() },
                ],
                None,
            )
            .await;

        assert!(matches!(result, Err(error::SystemError::BadRequest(_))));
        assert!(crate::modules::media::storage::list_files(&dir.path().join("uploads"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn upload_to_unknown_property_leaves_no_files() {
        let (dir, _repo, service) = service(vec![]).await;
        let result = service
            .upload_photos(
                Uuid::now_v7(),
                vec![IncomingImage { original_filename: "a.jpg".into(), bytes: JPEG.to_vec() }],
                None,
            )
            .await;

        assert!(matches!(result, Err(error::SystemError::NotFound(_))));
        assert!(crate::modules::media::storage::list_files(&dir.path().join("uploads"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn delete_photo_snapshots_and_removes_file() {
        let mut row = entity("Villa", PropertyStatus::Published);
        row.photos = Json(vec![photo("a.jpg", 0), photo("b.jpg", 1)]);
        let id = row.id;
        let (dir, repo, service) = service(vec![row]).await;
        tokio::fs::write(dir.path().join("uploads/a.jpg"), b"x").await.unwrap();

        let list = service.delete_photo(id, "a.jpg").await.unwrap();
        assert_eq!(list.photos, vec![photo("b.jpg", 0)]);
        assert_eq!(repo.get(&id).unwrap().images, vec!["/uploads/properties/b.jpg"]);
        assert!(!dir.path().join("uploads/a.jpg").exists());

        let backups = BackupStore::open(dir.path().join("backups")).await.unwrap();
        assert_eq!(backups.list().await.unwrap().len(), 1);

        assert!(matches!(
            service.delete_photo(id, "a.jpg").await,
            Err(error::SystemError::NotFound(_))
        ));
    }
}
