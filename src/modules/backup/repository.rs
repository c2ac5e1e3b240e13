use crate::{
    api::error,
    modules::backup::model::{DatabaseTables, RestoreSummary},
};

/// Whole-database dump and restore used by snapshots.
#[async_trait::async_trait]
pub trait BackupRepository {
    async fn dump(&self) -> Result<DatabaseTables, error::SystemError>;
    async fn has_properties(&self) -> Result<bool, error::SystemError>;

    /// Upserts every row in a single transaction. Users are only updated, never inserted.
    async fn restore(&self, tables: &DatabaseTables) -> Result<RestoreSummary, error::SystemError>;
}
