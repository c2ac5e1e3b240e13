use actix_web::{delete, get, patch, post, web};
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::announcement::{model, schema::AnnouncementEntity, service::AnnouncementService};
use crate::utils::ValidatedJson;

#[get("")]
pub async fn list_visible(
    announcement_service: web::Data<AnnouncementService>,
) -> Result<success::Success<Vec<AnnouncementEntity>>, error::Error> {
    let announcements = announcement_service.list_visible().await?;
    Ok(success::Success::ok(Some(announcements)))
}

#[get("")]
pub async fn admin_list_announcements(
    announcement_service: web::Data<AnnouncementService>,
) -> Result<success::Success<Vec<AnnouncementEntity>>, error::Error> {
    let announcements = announcement_service.list_all().await?;
    Ok(success::Success::ok(Some(announcements)))
}

#[get("/{id}")]
pub async fn admin_get_announcement(
    announcement_service: web::Data<AnnouncementService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<AnnouncementEntity>, error::Error> {
    let announcement = announcement_service.get(id.into_inner()).await?;
    Ok(success::Success::ok(Some(announcement)))
}

#[post("")]
pub async fn admin_create_announcement(
    announcement_service: web::Data<AnnouncementService>,
    body: ValidatedJson<model::CreateAnnouncementModel>,
) -> Result<success::Success<AnnouncementEntity>, error::Error> {
    let announcement = announcement_service.create(body.0).await?;
    Ok(success::Success::created(Some(announcement)).message("Announcement created successfully"))
}

#[patch("/{id}")]
pub async fn admin_update_announcement(
    announcement_service: web::Data<AnnouncementService>,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::UpdateAnnouncementModel>,
) -> Result<success::Success<AnnouncementEntity>, error::Error> {
    let announcement = announcement_service.update(id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(announcement)).message("Announcement updated successfully"))
}

#[delete("/{id}")]
pub async fn admin_delete_announcement(
    announcement_service: web::Data<AnnouncementService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    announcement_service.delete(id.into_inner()).await?;
    Ok(success::Success::no_content())
}
