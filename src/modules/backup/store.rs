//! Backup files on disk: naming, listing, reading and retention.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use uuid::Uuid;

use crate::api::error;
use crate::modules::backup::model::{
    BackupInfo, BackupKind, DatabaseSnapshot, PropertyImageSnapshot, PruneSummary,
};
use crate::modules::media::storage::list_files;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

pub fn backup_name(kind: BackupKind, property_id: Option<Uuid>, at: DateTime<Utc>) -> String {
    let ts = at.format(TIMESTAMP_FORMAT);
    match (kind, property_id) {
        (BackupKind::PropertyImages, Some(id)) => format!("{}-{id}-{ts}.json", kind.prefix()),
        (BackupKind::ImageTree, _) => format!("{}-{ts}", kind.prefix()),
        _ => format!("{}-{ts}.json", kind.prefix()),
    }
}

fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok().map(|t| t.and_utc())
}

/// Inverse of [`backup_name`]; anything else found in the directory is not a backup.
pub fn parse_backup_name(name: &str) -> Option<(BackupKind, Option<Uuid>, DateTime<Utc>)> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    if let Some(rest) = name.strip_prefix("property-images-") {
        let rest = rest.strip_suffix(".json")?;
        let (id, ts) = (rest.get(..36)?, rest.get(36..)?.strip_prefix('-')?);
        return Some((BackupKind::PropertyImages, Some(Uuid::parse_str(id).ok()?), parse_timestamp(ts)?));
    }
    if let Some(ts) = name.strip_prefix("database-") {
        return Some((BackupKind::Database, None, parse_timestamp(ts.strip_suffix(".json")?)?));
    }
    if let Some(ts) = name.strip_prefix("image-tree-") {
        return Some((BackupKind::ImageTree, None, parse_timestamp(ts)?));
    }
    None
}

/// Names of backups older than their kind's retention window.
pub fn select_expired(
    backups: &[BackupInfo],
    now: DateTime<Utc>,
    database_days: i64,
    image_days: i64,
) -> Vec<String> {
    backups
        .iter()
        .filter(|b| {
            let days = match b.kind {
                BackupKind::Database => database_days,
                BackupKind::PropertyImages | BackupKind::ImageTree => image_days,
            };
            b.created_at < now - Duration::days(days)
        })
        .map(|b| b.name.clone())
        .collect()
}

#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, error::SystemError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn resolve(&self, name: &str, kind: BackupKind) -> Result<PathBuf, error::SystemError> {
        match parse_backup_name(name) {
            Some((found, _, _)) if found == kind => Ok(self.dir.join(name)),
            _ => Err(error::SystemError::bad_request(format!(
                "'{name}' is not a {} backup",
                kind.prefix()
            ))),
        }
    }

    /// Names carry millisecond timestamps; a clash moves the later one forward.
    async fn unused_name(
        &self,
        kind: BackupKind,
        property_id: Option<Uuid>,
        mut at: DateTime<Utc>,
    ) -> String {
        loop {
            let name = backup_name(kind, property_id, at);
            if fs::metadata(self.dir.join(&name)).await.is_err() {
                return name;
            }
            at += Duration::milliseconds(1);
        }
    }

    async fn write_json<T: Serialize>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<BackupInfo, error::SystemError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = self.dir.join(format!("{name}.tmp"));
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, self.dir.join(name)).await?;
        self.info(name).await
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, error::SystemError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(error::SystemError::not_found("Backup not found"));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn write_database_snapshot(
        &self,
        snapshot: &DatabaseSnapshot,
    ) -> Result<BackupInfo, error::SystemError> {
        let name = self.unused_name(BackupKind::Database, None, snapshot.created_at).await;
        self.write_json(&name, snapshot).await
    }

    pub async fn write_property_snapshot(
        &self,
        snapshot: &PropertyImageSnapshot,
    ) -> Result<BackupInfo, error::SystemError> {
        let name = self
            .unused_name(BackupKind::PropertyImages, Some(snapshot.property_id), snapshot.created_at)
            .await;
        self.write_json(&name, snapshot).await
    }

    pub async fn read_database_snapshot(
        &self,
        name: &str,
    ) -> Result<DatabaseSnapshot, error::SystemError> {
        let path = self.resolve(name, BackupKind::Database)?;
        self.read_json(&path).await
    }

    pub async fn read_property_snapshot(
        &self,
        name: &str,
    ) -> Result<PropertyImageSnapshot, error::SystemError> {
        let path = self.resolve(name, BackupKind::PropertyImages)?;
        self.read_json(&path).await
    }

    /// Creates the empty directory for a new image-tree backup.
    pub async fn create_image_tree(
        &self,
        at: DateTime<Utc>,
    ) -> Result<(String, PathBuf), error::SystemError> {
        let name = self.unused_name(BackupKind::ImageTree, None, at).await;
        let path = self.dir.join(&name);
        fs::create_dir_all(&path).await?;
        Ok((name, path))
    }

    pub async fn image_tree_path(&self, name: &str) -> Result<PathBuf, error::SystemError> {
        let path = self.resolve(name, BackupKind::ImageTree)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(path),
            _ => Err(error::SystemError::not_found("Backup not found")),
        }
    }

    pub async fn info(&self, name: &str) -> Result<BackupInfo, error::SystemError> {
        let (kind, property_id, created_at) = parse_backup_name(name)
            .ok_or_else(|| error::SystemError::bad_request("Invalid backup name"))?;
        let path = self.dir.join(name);
        let meta = fs::metadata(&path).await?;
        let size_bytes = if meta.is_dir() {
            let mut total = 0;
            for file in list_files(&path).await? {
                total += fs::metadata(path.join(file)).await?.len();
            }
            total
        } else {
            meta.len()
        };
        Ok(BackupInfo { name: name.to_string(), kind, property_id, size_bytes, created_at })
    }

    /// Every recognised backup, newest first.
    pub async fn list(&self) -> Result<Vec<BackupInfo>, error::SystemError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if parse_backup_name(&name).is_none() {
                continue;
            }
            backups.push(self.info(&name).await?);
        }
        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.name.cmp(&a.name)));
        Ok(backups)
    }

    pub async fn latest(&self, kind: BackupKind) -> Result<Option<BackupInfo>, error::SystemError> {
        Ok(self.list().await?.into_iter().find(|b| b.kind == kind))
    }

    pub async fn remove(&self, name: &str) -> Result<(), error::SystemError> {
        let (kind, _, _) = parse_backup_name(name)
            .ok_or_else(|| error::SystemError::bad_request("Invalid backup name"))?;
        let path = self.dir.join(name);
        let result = match kind {
            BackupKind::ImageTree => fs::remove_dir_all(&path).await,
            _ => fs::remove_file(&path).await,
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(error::SystemError::not_found("Backup not found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn prune(
        &self,
        now: DateTime<Utc>,
        database_days: i64,
        image_days: i64,
    ) -> Result<PruneSummary, error::SystemError> {
        let expired = select_expired(&self.list().await?, now, database_days, image_days);
        let mut summary = PruneSummary::default();
        for name in expired {
            self.remove(&name).await?;
            summary.removed.push(name);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::modules::backup::model::{DatabaseTables, SNAPSHOT_VERSION};
    use crate::modules::property::schema::Photo;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 2, 0, 0).unwrap()
    }

    #[test]
    fn names_roundtrip_through_parser() {
        let id = Uuid::now_v7();
        let when = at(5);

        let name = backup_name(BackupKind::Database, None, when);
        assert_eq!(name, "database-20240305T020000.000Z.json");
        assert_eq!(parse_backup_name(&name), Some((BackupKind::Database, None, when)));

        let name = backup_name(BackupKind::PropertyImages, Some(id), when);
        assert_eq!(parse_backup_name(&name), Some((BackupKind::PropertyImages, Some(id), when)));

        let name = backup_name(BackupKind::ImageTree, None, when);
        assert_eq!(name, "image-tree-20240305T020000.000Z");
        assert_eq!(parse_backup_name(&name), Some((BackupKind::ImageTree, None, when)));
    }

    #[test]
    fn foreign_names_are_ignored() {
        assert_eq!(parse_backup_name("notes.txt"), None);
        assert_eq!(parse_backup_name("database-20240305T020000.000Z.json.tmp"), None);
        assert_eq!(parse_backup_name("database-yesterday.json"), None);
        assert_eq!(parse_backup_name("../database-20240305T020000.000Z.json"), None);
        assert_eq!(parse_backup_name("property-images-not-a-uuid-20240305T020000.000Z.json"), None);
    }

    #[test]
    fn retention_is_per_kind() {
        let info = |name: &str, kind, day| BackupInfo {
            name: name.to_string(),
            kind,
            property_id: None,
            size_bytes: 0,
            created_at: at(day),
        };
        let now = at(31);
        let backups = vec![
            info("db-old", BackupKind::Database, 1),
            info("db-new", BackupKind::Database, 25),
            info("img-old", BackupKind::PropertyImages, 1),
            info("tree-old", BackupKind::ImageTree, 1),
        ];

        assert_eq!(select_expired(&backups, now, 10, 90), vec!["db-old"]);
        assert_eq!(
            select_expired(&backups, now, 5, 20),
            vec!["db-old", "db-new", "img-old", "tree-old"]
        );
    }

    #[tokio::test]
    async fn write_list_read_prune() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackupStore::open(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join("README"), b"not a backup").await.unwrap();

        let old = DatabaseSnapshot {
            version: SNAPSHOT_VERSION,
            created_at: at(1),
            tables: DatabaseTables::default(),
        };
        let new = DatabaseSnapshot { created_at: at(25), ..old.clone() };
        store.write_database_snapshot(&old).await.unwrap();
        let latest = store.write_database_snapshot(&new).await.unwrap();

        let property_id = Uuid::now_v7();
        store
            .write_property_snapshot(&PropertyImageSnapshot {
                version: SNAPSHOT_VERSION,
                created_at: at(2),
                reason: "delete_photo".into(),
                property_id,
                title: "Villa".into(),
                images: vec!["/uploads/properties/a.jpg".into()],
                photos: vec![Photo { filename: "a.jpg".into(), alt_text: String::new(), order: 0 }],
            })
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].name, latest.name);
        assert_eq!(store.latest(BackupKind::Database).await.unwrap().unwrap().name, latest.name);

        let snapshot = store.read_property_snapshot(&listed[1].name).await.unwrap();
        assert_eq!(snapshot.property_id, property_id);
        assert!(store.read_database_snapshot(&listed[1].name).await.is_err());

        let pruned = store.prune(at(30), 10, 90).await.unwrap();
        assert_eq!(pruned.removed.len(), 1);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn image_tree_size_counts_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = BackupStore::open(dir.path()).await.unwrap();
        let (name, path) = store.create_image_tree(at(3)).await.unwrap();
        tokio::fs::write(path.join("a.jpg"), b"12345").await.unwrap();

        let info = store.info(&name).await.unwrap();
        assert_eq!(info.kind, BackupKind::ImageTree);
        assert_eq!(info.size_bytes, 5);
        assert_eq!(store.image_tree_path(&name).await.unwrap(), path);

        store.remove(&name).await.unwrap();
        assert!(store.image_tree_path(&name).await.is_err());
    }
}
