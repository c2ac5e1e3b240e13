use chrono::{DateTime, Utc};
use log::{info, warn};
use sqlx::types::Json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

use crate::api::error;
use crate::modules::backup::{
    model::{
        BackupInfo, BackupKind, DatabaseSnapshot, FileRestoreSummary, PropertyImageSnapshot,
        PruneSummary, RestoreSummary, SNAPSHOT_VERSION,
    },
    repository::BackupRepository,
    store::BackupStore,
};
use crate::modules::consistency::reconcile::{reconcile, Reconciled};
use crate::modules::media::{
    reference::{is_safe_filename, normalize_reference},
    storage::{list_files, ImageStore},
};
use crate::modules::property::{
    repository::PropertyRepository,
    schema::{Photo, PropertyEntity, PropertyImagesRow},
};

#[derive(Debug, Clone, Copy)]
pub struct Retention {
    pub database_days: i64,
    pub image_days: i64,
}

impl Default for Retention {
    fn default() -> Self {
        Retention { database_days: 30, image_days: 90 }
    }
}

#[derive(Clone)]
pub struct BackupService {
    repo: Arc<dyn BackupRepository + Send + Sync>,
    properties: Arc<dyn PropertyRepository + Send + Sync>,
    store: Arc<BackupStore>,
    images: Arc<ImageStore>,
    staging_dir: PathBuf,
    retention: Retention,
}

impl BackupService {
    pub fn with_dependencies(
        repo: Arc<dyn BackupRepository + Send + Sync>,
        properties: Arc<dyn PropertyRepository + Send + Sync>,
        store: Arc<BackupStore>,
        images: Arc<ImageStore>,
        staging_dir: impl Into<PathBuf>,
        retention: Retention,
    ) -> Self {
        info!("BackupService initialized with dependencies");
        BackupService {
            repo,
            properties,
            store,
            images,
            staging_dir: staging_dir.into(),
            retention,
        }
    }

    pub async fn create_database_snapshot(&self) -> Result<BackupInfo, error::SystemError> {
        let snapshot = DatabaseSnapshot {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            tables: self.repo.dump().await?,
        };
        let backup = self.store.write_database_snapshot(&snapshot).await?;
        info!(
            "Database snapshot {} written: {} properties, {} users",
            backup.name,
            snapshot.tables.properties.len(),
            snapshot.tables.users.len()
        );
        Ok(backup)
    }

    pub async fn snapshot_property_images(
        &self,
        property_id: Uuid,
        reason: &str,
    ) -> Result<BackupInfo, error::SystemError> {
        let property = self.find_property(&property_id).await?;
        self.store
            .write_property_snapshot(&PropertyImageSnapshot::capture(
                property.id,
                &property.title,
                &property.images,
                &property.photos.0,
                reason,
            ))
            .await
    }

    /// Copies every stored image into a fresh `image-tree-<ts>` directory.
    pub async fn backup_image_tree(&self) -> Result<BackupInfo, error::SystemError> {
        let (name, dir) = self.store.create_image_tree(Utc::now()).await?;
        let files = self.images.list().await?;
        for file in &files {
            self.images.export(file, &dir).await?;
        }
        info!("Image tree backup {} written with {} file(s)", name, files.len());
        self.store.info(&name).await
    }

    pub async fn list(&self) -> Result<Vec<BackupInfo>, error::SystemError> {
        self.store.list().await
    }

    /// The current state is snapshotted first so a bad restore can itself be undone.
    /// Property references whose files cannot be found are dropped before writing.
    pub async fn restore_database(&self, name: &str) -> Result<RestoreSummary, error::SystemError> {
        let mut snapshot = self.store.read_database_snapshot(name).await?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(error::SystemError::bad_request(format!(
                "Snapshot version {} is newer than supported version {}",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        for property in &mut snapshot.tables.properties {
            let usable = self
                .usable_images(property.id, &property.title, &property.images, &property.photos.0)
                .await?;
            if !usable.dropped.is_empty() {
                warn!(
                    "Property {} in {}: dropped missing image(s) {:?}",
                    property.id, name, usable.dropped
                );
            }
            property.images = usable.images;
            property.photos = Json(usable.photos);
        }

        let safety = self.create_database_snapshot().await?;
        let summary = match self.repo.restore(&snapshot.tables).await {
            Ok(summary) => summary,
            Err(e) => {
                // A failed restore must not leave its safety copy as the newest snapshot.
                if let Err(cleanup) = self.store.remove(&safety.name).await {
                    warn!("Could not remove safety snapshot {}: {}", safety.name, cleanup);
                }
                return Err(e);
            }
        };
        let skipped_users = (snapshot.tables.users.len() as u64).saturating_sub(summary.users);
        if skipped_users > 0 {
            warn!("{} user(s) in {} no longer exist and were not recreated", skipped_users, name);
        }
        info!("Database restored from {} (previous state saved as {})", name, safety.name);
        Ok(summary)
    }

    pub async fn restore_latest_database(
        &self,
    ) -> Result<Option<(String, RestoreSummary)>, error::SystemError> {
        let Some(latest) = self.store.latest(BackupKind::Database).await? else {
            return Ok(None);
        };
        let summary = self.restore_database(&latest.name).await?;
        Ok(Some((latest.name, summary)))
    }

    /// Startup recovery: staged files are copied in, and an empty database is
    /// reloaded from the newest snapshot.
    pub async fn auto_restore(&self) -> Result<(), error::SystemError> {
        self.restore_from_staging().await?;
        if self.repo.has_properties().await? {
            return Ok(());
        }
        match self.restore_latest_database().await? {
            Some((name, summary)) => {
                info!("Empty database reloaded from {}: {} properties", name, summary.properties)
            }
            None => info!("Database is empty and no snapshot is available"),
        }
        Ok(())
    }

    pub async fn restore_property_images(
        &self,
        name: &str,
    ) -> Result<PropertyEntity, error::SystemError> {
        let snapshot = self.store.read_property_snapshot(name).await?;
        let current = self.find_property(&snapshot.property_id).await?;
        self.store
            .write_property_snapshot(&PropertyImageSnapshot::capture(
                current.id,
                &current.title,
                &current.images,
                &current.photos.0,
                "before_restore",
            ))
            .await?;

        let usable = self
            .usable_images(current.id, &current.title, &snapshot.images, &snapshot.photos)
            .await?;
        if !usable.dropped.is_empty() {
            warn!("Restoring {}: dropped missing image(s) {:?}", name, usable.dropped);
        }
        let property = self
            .properties
            .set_images(&snapshot.property_id, &usable.images, &usable.photos)
            .await?;
        info!("Images of property {} restored from {}", property.id, name);
        Ok(property)
    }

    pub async fn restore_image_tree(
        &self,
        name: &str,
    ) -> Result<FileRestoreSummary, error::SystemError> {
        let dir = self.store.image_tree_path(name).await?;
        let summary = self.copy_missing_from(&dir).await?;
        info!("Restored {} file(s) from {}", summary.copied.len(), name);
        Ok(summary)
    }

    pub async fn restore_from_staging(&self) -> Result<FileRestoreSummary, error::SystemError> {
        let summary = self.copy_missing_from(&self.staging_dir).await?;
        info!(
            "Restored {} file(s) from staging {}",
            summary.copied.len(),
            self.staging_dir.display()
        );
        Ok(summary)
    }

    pub async fn prune(&self, now: DateTime<Utc>) -> Result<PruneSummary, error::SystemError> {
        let summary = self
            .store
            .prune(now, self.retention.database_days, self.retention.image_days)
            .await?;
        if !summary.removed.is_empty() {
            info!("Pruned {} expired backup(s)", summary.removed.len());
        }
        Ok(summary)
    }

    async fn find_property(&self, id: &Uuid) -> Result<PropertyEntity, error::SystemError> {
        self.properties
            .find_by_id(id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Property not found"))
    }

    /// Brings back referenced files missing from the store (staging first, then
    /// image-tree backups newest first) and reconciles the columns against what is
    /// on disk afterwards.
    async fn usable_images(
        &self,
        property_id: Uuid,
        title: &str,
        images: &[String],
        photos: &[Photo],
    ) -> Result<Reconciled, error::SystemError> {
        let referenced: Vec<String> = photos
            .iter()
            .map(|p| p.filename.clone())
            .chain(images.iter().filter_map(|raw| normalize_reference(raw)))
            .filter(|name| is_safe_filename(name))
            .collect();
        self.recover_files(&referenced).await?;

        let on_disk: HashSet<String> = self.images.list().await?.into_iter().collect();
        let row = PropertyImagesRow {
            id: property_id,
            title: title.to_string(),
            images: images.to_vec(),
            photos: Json(photos.to_vec()),
        };
        Ok(reconcile(&row, |name| on_disk.contains(name)))
    }

    async fn recover_files(&self, names: &[String]) -> Result<Vec<String>, error::SystemError> {
        let mut missing = Vec::new();
        for name in names {
            if !self.images.exists(name).await && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        if missing.is_empty() {
            return Ok(missing);
        }

        let mut sources = vec![self.staging_dir.clone()];
        for backup in self.store.list().await? {
            if backup.kind == BackupKind::ImageTree {
                sources.push(self.store.image_tree_path(&backup.name).await?);
            }
        }

        let mut recovered = Vec::new();
        for name in missing {
            for dir in &sources {
                let source = dir.join(&name);
                if fs::metadata(&source).await.map(|m| m.is_file()).unwrap_or(false) {
                    self.images.import(&source, &name).await?;
                    recovered.push(name);
                    break;
                }
            }
        }
        if !recovered.is_empty() {
            info!("Recovered {} missing image file(s) from backups", recovered.len());
        }
        Ok(recovered)
    }

    /// Never overwrites a stored file.
    async fn copy_missing_from(&self, dir: &Path) -> Result<FileRestoreSummary, error::SystemError> {
        let mut summary = FileRestoreSummary::default();
        for name in list_files(dir).await? {
            if !is_safe_filename(&name) {
                continue;
            }
            if self.images.import(&dir.join(&name), &name).await? {
                summary.copied.push(name);
            } else {
                summary.skipped_existing += 1;
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use chrono::Duration;

    use super::*;
    use crate::modules::backup::model::{DatabaseTables, RedactedUser};
    use crate::modules::property::schema::PropertyStatus;
    use crate::modules::property::service::tests::{entity, MemoryPropertyRepo};
    use crate::modules::user::schema::UserRole;

    #[derive(Default)]
    pub struct MemoryBackupRepo {
        tables: Mutex<DatabaseTables>,
        restored: Mutex<Vec<DatabaseTables>>,
        fail_restore: AtomicBool,
    }

    #[async_trait::async_trait]
    impl BackupRepository for MemoryBackupRepo {
        async fn dump(&self) -> Result<DatabaseTables, error::SystemError> {
            Ok(self.tables.lock().unwrap().clone())
        }

        async fn has_properties(&self) -> Result<bool, error::SystemError> {
            Ok(!self.tables.lock().unwrap().properties.is_empty())
        }

        async fn restore(
            &self,
            tables: &DatabaseTables,
        ) -> Result<RestoreSummary, error::SystemError> {
            if self.fail_restore.load(Ordering::SeqCst) {
                return Err(error::SystemError::internal("connection reset"));
            }
            self.restored.lock().unwrap().push(tables.clone());
            Ok(RestoreSummary {
                properties: tables.properties.len() as u64,
                users: tables.users.len().saturating_sub(1) as u64,
                ..Default::default()
            })
        }
    }

    pub struct Fixture {
        pub dir: tempfile::TempDir,
        repo: Arc<MemoryBackupRepo>,
        properties: Arc<MemoryPropertyRepo>,
        pub service: BackupService,
    }

    pub async fn fixture(rows: Vec<PropertyEntity>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(MemoryBackupRepo::default());
        let properties = Arc::new(MemoryPropertyRepo::with(rows));
        let store = Arc::new(BackupStore::open(dir.path().join("backups")).await.unwrap());
        let images = Arc::new(ImageStore::open(dir.path().join("uploads")).await.unwrap());
        tokio::fs::create_dir_all(dir.path().join("staging")).await.unwrap();
        let service = BackupService::with_dependencies(
            repo.clone(),
            properties.clone(),
            store,
            images,
            dir.path().join("staging"),
            Retention::default(),
        );
        Fixture { dir, repo, properties, service }
    }

    fn user(name: &str) -> RedactedUser {
        RedactedUser {
            id: Uuid::now_v7(),
            username: name.into(),
            email: format!("{name}@example.com"),
            role: UserRole::User,
            is_active: true,
            display_name: name.into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn database_snapshot_roundtrip_takes_a_safety_copy() {
        let fx = fixture(Vec::new()).await;
        {
            let mut tables = fx.repo.tables.lock().unwrap();
            tables.properties.push(entity("Villa", PropertyStatus::Published));
            tables.users = vec![user("an"), user("binh")];
        }

        let backup = fx.service.create_database_snapshot().await.unwrap();
        assert_eq!(backup.kind, BackupKind::Database);
        assert!(backup.name.starts_with("database-"));

        let summary = fx.service.restore_database(&backup.name).await.unwrap();
        assert_eq!(summary.properties, 1);
        assert_eq!(summary.users, 1);

        let restored = fx.repo.restored.lock().unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].users.len(), 2);
        drop(restored);

        let databases = fx
            .service
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.kind == BackupKind::Database)
            .count();
        assert_eq!(databases, 2);
    }

    #[tokio::test]
    async fn restore_rejects_wrong_kind_and_traversal() {
        let fx = fixture(Vec::new()).await;
        assert!(matches!(
            fx.service.restore_database("../etc/passwd").await,
            Err(error::SystemError::BadRequest(_))
        ));
        assert!(matches!(
            fx.service.restore_database("image-tree-20240305T020000.000Z").await,
            Err(error::SystemError::BadRequest(_))
        ));
        assert!(matches!(
            fx.service.restore_database("database-20240305T020000.000Z.json").await,
            Err(error::SystemError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn property_images_restore_rewrites_both_columns() {
        let mut row = entity("Villa", PropertyStatus::Published);
        row.images = vec!["/uploads/properties/a.jpg".into()];
        row.photos =
            Json(vec![Photo { filename: "a.jpg".into(), alt_text: "front".into(), order: 0 }]);
        let id = row.id;
        let fx = fixture(vec![row]).await;
        tokio::fs::write(fx.dir.path().join("uploads/a.jpg"), b"a").await.unwrap();

        let backup = fx.service.snapshot_property_images(id, "manual").await.unwrap();
        fx.properties.rows.lock().unwrap().get_mut(&id).unwrap().photos = Json(Vec::new());
        fx.properties.rows.lock().unwrap().get_mut(&id).unwrap().images = Vec::new();

        let restored = fx.service.restore_property_images(&backup.name).await.unwrap();
        assert_eq!(restored.images, vec!["/uploads/properties/a.jpg"]);
        assert_eq!(restored.photos.0[0].alt_text, "front");
    }

    fn photo(name: &str, order: i32) -> Photo {
        Photo { filename: name.into(), alt_text: String::new(), order }
    }

    #[tokio::test]
    async fn property_images_restore_recovers_or_drops_missing_files() {
        let mut row = entity("Villa", PropertyStatus::Published);
        row.images = vec!["/uploads/properties/a.jpg".into(), "/uploads/properties/b.jpg".into()];
        row.photos = Json(vec![photo("a.jpg", 0), photo("b.jpg", 1)]);
        let id = row.id;
        let fx = fixture(vec![row]).await;
        let uploads = fx.dir.path().join("uploads");
        tokio::fs::write(uploads.join("a.jpg"), b"a").await.unwrap();
        tokio::fs::write(uploads.join("b.jpg"), b"b").await.unwrap();

        fx.service.backup_image_tree().await.unwrap();
        let backup = fx.service.snapshot_property_images(id, "delete_photo").await.unwrap();
        tokio::fs::remove_file(uploads.join("a.jpg")).await.unwrap();
        tokio::fs::remove_file(uploads.join("b.jpg")).await.unwrap();
        let trees: Vec<_> = fx
            .service
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.kind == BackupKind::ImageTree)
            .collect();
        tokio::fs::remove_file(fx.dir.path().join("backups").join(&trees[0].name).join("b.jpg"))
            .await
            .unwrap();

        let restored = fx.service.restore_property_images(&backup.name).await.unwrap();
        assert_eq!(restored.images, vec!["/uploads/properties/a.jpg"]);
        assert_eq!(restored.photos.0, vec![photo("a.jpg", 0)]);
        assert_eq!(tokio::fs::read(uploads.join("a.jpg")).await.unwrap(), b"a");
    }

    #[tokio::test]
    async fn database_restore_drops_references_without_files() {
        let fx = fixture(Vec::new()).await;
        let mut row = entity("Villa", PropertyStatus::Published);
        row.images = vec!["/uploads/properties/gone.jpg".into(), "/uploads/properties/kept.jpg".into()];
        row.photos = Json(vec![photo("gone.jpg", 0), photo("kept.jpg", 1)]);
        fx.repo.tables.lock().unwrap().properties.push(row);
        tokio::fs::write(fx.dir.path().join("staging/kept.jpg"), b"k").await.unwrap();

        let backup = fx.service.create_database_snapshot().await.unwrap();
        fx.service.restore_database(&backup.name).await.unwrap();

        let restored = fx.repo.restored.lock().unwrap();
        let property = &restored[0].properties[0];
        assert_eq!(property.photos.0, vec![photo("kept.jpg", 0)]);
        assert_eq!(property.images, vec!["/uploads/properties/kept.jpg"]);
        assert!(fx.dir.path().join("uploads/kept.jpg").exists());
    }

    #[tokio::test]
    async fn failed_restore_keeps_the_real_snapshot_newest() {
        let fx = fixture(Vec::new()).await;
        fx.repo.tables.lock().unwrap().properties.push(entity("Villa", PropertyStatus::Published));
        let real = fx.service.create_database_snapshot().await.unwrap();
        fx.repo.tables.lock().unwrap().properties.clear();

        fx.repo.fail_restore.store(true, Ordering::SeqCst);
        assert!(fx.service.auto_restore().await.is_err());
        let databases: Vec<_> = fx
            .service
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.kind == BackupKind::Database)
            .map(|b| b.name)
            .collect();
        assert_eq!(databases, vec![real.name.clone()]);

        fx.repo.fail_restore.store(false, Ordering::SeqCst);
        fx.service.auto_restore().await.unwrap();
        let restored = fx.repo.restored.lock().unwrap();
        assert_eq!(restored[0].properties.len(), 1);
    }

    #[tokio::test]
    async fn file_restores_never_overwrite() {
        let fx = fixture(Vec::new()).await;
        let uploads = fx.dir.path().join("uploads");
        tokio::fs::write(uploads.join("a.jpg"), b"original").await.unwrap();
        tokio::fs::write(uploads.join("b.jpg"), b"bbb").await.unwrap();

        let tree = fx.service.backup_image_tree().await.unwrap();
        assert_eq!(tree.size_bytes, 11);

        tokio::fs::remove_file(uploads.join("b.jpg")).await.unwrap();
        tokio::fs::write(uploads.join("a.jpg"), b"changed").await.unwrap();

        let summary = fx.service.restore_image_tree(&tree.name).await.unwrap();
        assert_eq!(summary.copied, vec!["b.jpg"]);
        assert_eq!(summary.skipped_existing, 1);
        assert_eq!(tokio::fs::read(uploads.join("a.jpg")).await.unwrap(), b"changed");

        tokio::fs::write(fx.dir.path().join("staging/c.jpg"), b"c").await.unwrap();
        tokio::fs::write(fx.dir.path().join("staging/a.jpg"), b"stale").await.unwrap();
        let summary = fx.service.restore_from_staging().await.unwrap();
        assert_eq!(summary.copied, vec!["c.jpg"]);
        assert_eq!(tokio::fs::read(uploads.join("a.jpg")).await.unwrap(), b"changed");
    }

    #[tokio::test]
    async fn auto_restore_only_reloads_an_empty_database() {
        let fx = fixture(Vec::new()).await;
        fx.repo.tables.lock().unwrap().properties.push(entity("Villa", PropertyStatus::Published));
        fx.service.create_database_snapshot().await.unwrap();

        fx.service.auto_restore().await.unwrap();
        assert!(fx.repo.restored.lock().unwrap().is_empty());

        fx.repo.tables.lock().unwrap().properties.clear();
        fx.service.auto_restore().await.unwrap();
        let restored = fx.repo.restored.lock().unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].properties.len(), 1);
    }

    #[tokio::test]
    async fn prune_uses_configured_retention() {
        let fx = fixture(Vec::new()).await;
        let backup = fx.service.create_database_snapshot().await.unwrap();

        let summary = fx.service.prune(Utc::now() + Duration::days(29)).await.unwrap();
        assert!(summary.removed.is_empty());
        let summary = fx.service.prune(Utc::now() + Duration::days(31)).await.unwrap();
        assert_eq!(summary.removed, vec![backup.name]);
    }
}
