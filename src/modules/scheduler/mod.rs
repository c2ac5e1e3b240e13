//! Periodic maintenance: database snapshots, backup retention, image consistency checks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::api::error;
use crate::modules::{backup::service::BackupService, consistency::service::ConsistencyService};

/// Six-field cron expressions (seconds first).
#[derive(Debug, Clone)]
pub struct Schedules {
    pub backup: String,
    pub prune: String,
    pub consistency: String,
}

pub struct CronJobs {
    scheduler: JobScheduler,
    backups: Arc<BackupService>,
    consistency: Arc<ConsistencyService>,
}

impl std::fmt::Debug for CronJobs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronJobs").finish()
    }
}

impl CronJobs {
    pub async fn new(
        backups: Arc<BackupService>,
        consistency: Arc<ConsistencyService>,
    ) -> Result<Self, error::SystemError> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self { scheduler, backups, consistency })
    }

    pub async fn register(&self, schedules: &Schedules) -> Result<(), error::SystemError> {
        self.register_database_backup(&schedules.backup).await?;
        self.register_prune(&schedules.prune).await?;
        self.register_consistency_check(&schedules.consistency).await?;
        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    pub async fn start(&self) -> Result<(), error::SystemError> {
        self.scheduler.start().await?;
        tracing::info!("Cron scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), error::SystemError> {
        self.scheduler.shutdown().await?;
        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    async fn register_database_backup(&self, cron: &str) -> Result<(), error::SystemError> {
        let backups = Arc::clone(&self.backups);
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let backups = Arc::clone(&backups);
            Box::pin(async move {
                match backups.create_database_snapshot().await {
                    Ok(backup) => tracing::info!(
                        backup = %backup.name,
                        size_bytes = backup.size_bytes,
                        "Scheduled database snapshot written"
                    ),
                    Err(e) => tracing::error!("Scheduled database snapshot failed: {}", e),
                }
            })
        })?;
        self.scheduler.add(job).await?;
        tracing::info!("Registered: database_backup ({})", cron);
        Ok(())
    }

    async fn register_prune(&self, cron: &str) -> Result<(), error::SystemError> {
        let backups = Arc::clone(&self.backups);
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let backups = Arc::clone(&backups);
            Box::pin(async move {
                match backups.prune(chrono::Utc::now()).await {
                    Ok(summary) => {
                        tracing::info!(removed = summary.removed.len(), "Backup retention applied")
                    }
                    Err(e) => tracing::error!("Backup pruning failed: {}", e),
                }
            })
        })?;
        self.scheduler.add(job).await?;
        tracing::info!("Registered: backup_prune ({})", cron);
        Ok(())
    }

    /// Report only; repairs stay a manual admin action.
    async fn register_consistency_check(&self, cron: &str) -> Result<(), error::SystemError> {
        let consistency = Arc::clone(&self.consistency);
        let job = Job::new_async(cron, move |_uuid, _lock| {
            let consistency = Arc::clone(&consistency);
            Box::pin(async move {
                match consistency.scan().await {
                    Ok(report) if report.is_clean() => tracing::debug!(
                        checked = report.checked_properties,
                        "Image consistency check passed"
                    ),
                    Ok(report) => tracing::warn!(
                        checked = report.checked_properties,
                        inconsistent = report.properties.len(),
                        orphans = report.orphans.len(),
                        "Image consistency check found issues"
                    ),
                    Err(e) => tracing::error!("Image consistency check failed: {}", e),
                }
            })
        })?;
        self.scheduler.add(job).await?;
        tracing::info!("Registered: consistency_check ({})", cron);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::constants::{DEFAULT_BACKUP_CRON, DEFAULT_CONSISTENCY_CRON, DEFAULT_PRUNE_CRON};

    #[test]
    fn default_schedules_parse() {
        for cron in [DEFAULT_BACKUP_CRON, DEFAULT_PRUNE_CRON, DEFAULT_CONSISTENCY_CRON] {
            assert!(Job::new_async(cron, |_, _| Box::pin(async {})).is_ok(), "{cron}");
        }
    }

    #[test]
    fn malformed_schedule_is_rejected() {
        assert!(Job::new_async("every night", |_, _| Box::pin(async {})).is_err());
    }
}
