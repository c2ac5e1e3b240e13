use actix_web::{delete, get, patch, post, web};
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::project::{model, schema::ProjectEntity, service::ProjectService};
use crate::utils::ValidatedJson;

#[get("")]
pub async fn list_projects(
    project_service: web::Data<ProjectService>,
) -> Result<success::Success<Vec<ProjectEntity>>, error::Error> {
    let projects = project_service.list().await?;
    Ok(success::Success::ok(Some(projects)))
}

#[get("/{id}")]
pub async fn get_project(
    project_service: web::Data<ProjectService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<ProjectEntity>, error::Error> {
    let project = project_service.get(id.into_inner()).await?;
    Ok(success::Success::ok(Some(project)))
}

#[post("")]
pub async fn admin_create_project(
    project_service: web::Data<ProjectService>,
    body: ValidatedJson<model::CreateProjectModel>,
) -> Result<success::Success<ProjectEntity>, error::Error> {
    let project = project_service.create(body.0).await?;
    Ok(success::Success::created(Some(project)).message("Project created successfully"))
}

#[patch("/{id}")]
pub async fn admin_update_project(
    project_service: web::Data<ProjectService>,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::UpdateProjectModel>,
) -> Result<success::Success<ProjectEntity>, error::Error> {
    let project = project_service.update(id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(project)).message("Project updated successfully"))
}

#[delete("/{id}")]
pub async fn admin_delete_project(
    project_service: web::Data<ProjectService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    project_service.delete(id.into_inner()).await?;
    Ok(success::Success::no_content())
}
