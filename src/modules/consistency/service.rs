use log::{info, warn};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::error;
use crate::modules::backup::{model::PropertyImageSnapshot, store::BackupStore};
use crate::modules::consistency::{
    model::{ConsistencyReport, RepairOptions, RepairSummary},
    reconcile::{find_orphans, inspect, reconcile},
};
use crate::modules::media::storage::{list_files, ImageStore};
use crate::modules::property::repository::PropertyRepository;

#[derive(Clone)]
pub struct ConsistencyService {
    properties: Arc<dyn PropertyRepository + Send + Sync>,
    images: Arc<ImageStore>,
    backups: Arc<BackupStore>,
    staging_dir: PathBuf,
}

impl ConsistencyService {
    pub fn new(
        properties: Arc<dyn PropertyRepository + Send + Sync>,
        images: Arc<ImageStore>,
        backups: Arc<BackupStore>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { properties, images, backups, staging_dir: staging_dir.into() }
    }

    pub async fn scan(&self) -> Result<ConsistencyReport, error::SystemError> {
        let rows = self.properties.list_image_rows().await?;
        let stored = self.images.list().await?;
        let on_disk: HashSet<String> = stored.iter().cloned().collect();

        let properties = rows
            .iter()
            .map(|row| inspect(row, &on_disk))
            .filter(|issues| !issues.is_clean())
            .collect();

        Ok(ConsistencyReport {
            checked_properties: rows.len(),
            stored_files: stored.len(),
            properties,
            orphans: find_orphans(&rows, &stored),
        })
    }

    /// Brings every property back to: `photos` canonical, legacy column derived,
    /// every reference backed by a stored file.
    pub async fn repair(&self, options: RepairOptions) -> Result<RepairSummary, error::SystemError> {
        let rows = self.properties.list_image_rows().await?;
        let mut on_disk: HashSet<String> = self.images.list().await?.into_iter().collect();
        let staged: HashSet<String> = if options.restore_from_staging {
            list_files(&self.staging_dir).await?.into_iter().collect()
        } else {
            HashSet::new()
        };

        let mut summary = RepairSummary::default();
        for row in &rows {
            let issues = inspect(row, &on_disk);
            if issues.is_clean() {
                continue;
            }

            self.backups
                .write_property_snapshot(&PropertyImageSnapshot::capture(
                    row.id,
                    &row.title,
                    &row.images,
                    &row.photos.0,
                    "consistency_repair",
                ))
                .await?;

            for name in issues.missing.iter().filter(|name| staged.contains(*name)) {
                if self.images.import(&self.staging_dir.join(name), name).await? {
                    info!("Restored {} from staging for property {}", name, row.id);
                    summary.restored_files.push(name.clone());
                }
                on_disk.insert(name.clone());
            }

            let reconciled = reconcile(row, |name| on_disk.contains(name));
            if reconciled.photos != row.photos.0 || reconciled.images != row.images {
                self.properties.set_images(&row.id, &reconciled.images, &reconciled.photos).await?;
                summary.properties_changed.push(row.id);
            }
            for name in reconciled.dropped {
                warn!("Dropped reference {} from property {}: file missing", name, row.id);
                summary.dropped_references.push(name);
            }
        }

        if options.remove_orphans {
            summary.removed_orphans = self.remove_orphans().await?;
        }

        info!(
            "Image repair finished: {} properties changed, {} files restored, {} references dropped, {} orphans removed",
            summary.properties_changed.len(),
            summary.restored_files.len(),
            summary.dropped_references.len(),
            summary.removed_orphans.len()
        );
        Ok(summary)
    }

    /// Orphans are copied into an image-tree backup before they are deleted.
    async fn remove_orphans(&self) -> Result<Vec<String>, error::SystemError> {
        let rows = self.properties.list_image_rows().await?;
        let orphans = find_orphans(&rows, &self.images.list().await?);
        if orphans.is_empty() {
            return Ok(orphans);
        }

        let (backup, dir) = self.backups.create_image_tree(chrono::Utc::now()).await?;
        for name in &orphans {
            self.images.export(name, &dir).await?;
        }
        for name in &orphans {
            self.images.remove(name).await?;
        }
        info!("Moved {} orphaned image(s) into backup {}", orphans.len(), backup);
        Ok(orphans)
    }
}
