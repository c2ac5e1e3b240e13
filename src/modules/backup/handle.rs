use actix_web::{get, post, web};
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::backup::{
    model::{BackupInfo, FileRestoreSummary, PruneSummary, RestoreRequest, RestoreSummary},
    service::BackupService,
};
use crate::modules::property::schema::PropertyEntity;
use crate::utils::ValidatedJson;

#[get("")]
pub async fn list_backups(
    backup_service: web::Data<BackupService>,
) -> Result<success::Success<Vec<BackupInfo>>, error::Error> {
    let backups = backup_service.list().await?;
    Ok(success::Success::ok(Some(backups)))
}

#[post("/database")]
pub async fn create_database_snapshot(
    backup_service: web::Data<BackupService>,
) -> Result<success::Success<BackupInfo>, error::Error> {
    let backup = backup_service.create_database_snapshot().await?;
    Ok(success::Success::created(Some(backup)).message("Database snapshot created"))
}

#[post("/images")]
pub async fn backup_image_tree(
    backup_service: web::Data<BackupService>,
) -> Result<success::Success<BackupInfo>, error::Error> {
    let backup = backup_service.backup_image_tree().await?;
    Ok(success::Success::created(Some(backup)).message("Image backup created"))
}

#[post("/properties/{property_id}")]
pub async fn snapshot_property_images(
    backup_service: web::Data<BackupService>,
    property_id: web::Path<Uuid>,
) -> Result<success::Success<BackupInfo>, error::Error> {
    let backup = backup_service.snapshot_property_images(property_id.into_inner(), "manual").await?;
    Ok(success::Success::created(Some(backup)).message("Property images snapshot created"))
}

#[post("/restore/database")]
pub async fn restore_database(
    backup_service: web::Data<BackupService>,
    body: ValidatedJson<RestoreRequest>,
) -> Result<success::Success<RestoreSummary>, error::Error> {
    let summary = backup_service.restore_database(&body.0.name).await?;
    Ok(success::Success::ok(Some(summary)).message("Database restored"))
}

#[post("/restore/property-images")]
pub async fn restore_property_images(
    backup_service: web::Data<BackupService>,
    body: ValidatedJson<RestoreRequest>,
) -> Result<success::Success<PropertyEntity>, error::Error> {
    let property = backup_service.restore_property_images(&body.0.name).await?;
    Ok(success::Success::ok(Some(property)).message("Property images restored"))
}

#[post("/restore/image-tree")]
pub async fn restore_image_tree(
    backup_service: web::Data<BackupService>,
    body: ValidatedJson<RestoreRequest>,
) -> Result<success::Success<FileRestoreSummary>, error::Error> {
    let summary = backup_service.restore_image_tree(&body.0.name).await?;
    Ok(success::Success::ok(Some(summary)).message("Images restored"))
}

#[post("/restore/staging")]
pub async fn restore_from_staging(
    backup_service: web::Data<BackupService>,
) -> Result<success::Success<FileRestoreSummary>, error::Error> {
    let summary = backup_service.restore_from_staging().await?;
    Ok(success::Success::ok(Some(summary)).message("Images restored from staging"))
}

#[post("/prune")]
pub async fn prune_backups(
    backup_service: web::Data<BackupService>,
) -> Result<success::Success<PruneSummary>, error::Error> {
    let summary = backup_service.prune(chrono::Utc::now()).await?;
    Ok(success::Success::ok(Some(summary)))
}
