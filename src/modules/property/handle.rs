use actix_web::{delete, get, patch, post, put, web, HttpRequest};
use uuid::Uuid;

use crate::api::{error, success};
use crate::middlewares::get_claims;
use crate::modules::property::{model, service::PropertyService};
use crate::utils::{ValidatedJson, ValidatedQuery};

type PropertyPage = success::Paginated<model::PropertyResponse>;

#[get("")]
pub async fn list_published(
    property_service: web::Data<PropertyService>,
    query: ValidatedQuery<model::PropertyQuery>,
) -> Result<success::Success<PropertyPage>, error::Error> {
    let page = property_service.list_published(&query.0).await?;
    Ok(success::Success::ok(Some(page)))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_published(
    property_service: web::Data<PropertyService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<model::PropertyResponse>, error::Error> {
    let property = property_service.get_published(id.into_inner()).await?;
    Ok(success::Success::ok(Some(property)))
}

#[get("/slug/{slug}")]
pub async fn get_published_by_slug(
    property_service: web::Data<PropertyService>,
    slug: web::Path<String>,
) -> Result<success::Success<model::PropertyResponse>, error::Error> {
    let property = property_service.get_published_by_slug(&slug).await?;
    Ok(success::Success::ok(Some(property)))
}

#[get("")]
pub async fn list_mine(
    property_service: web::Data<PropertyService>,
    query: ValidatedQuery<model::PropertyQuery>,
    req: HttpRequest,
) -> Result<success::Success<PropertyPage>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let page = property_service.list_mine(owner_id, &query.0).await?;
    Ok(success::Success::ok(Some(page)))
}

#[post("")]
pub async fn submit_property(
    property_service: web::Data<PropertyService>,
    body: ValidatedJson<model::CreatePropertyModel>,
    req: HttpRequest,
) -> Result<success::Success<model::PropertyResponse>, error::Error> {
    let claims = get_claims(&req)?;
    let property = property_service.create(claims.sub, claims.role, body.0).await?;
    Ok(success::Success::created(Some(property)).message("Property submitted for approval"))
}

#[get("")]
pub async fn admin_list_properties(
    property_service: web::Data<PropertyService>,
    query: ValidatedQuery<model::PropertyQuery>,
) -> Result<success::Success<PropertyPage>, error::Error> {
    let page = property_service.list_all(&query.0).await?;
    Ok(success::Success::ok(Some(page)))
}

#[post("")]
pub async fn admin_create_property(
    property_service: web::Data<PropertyService>,
    body: ValidatedJson<model::CreatePropertyModel>,
    req: HttpRequest,
) -> Result<success::Success<model::PropertyResponse>, error::Error> {
    let claims = get_claims(&req)?;
    let property = property_service.create(claims.sub, claims.role, body.0).await?;
    Ok(success::Success::created(Some(property)).message("Property created successfully"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn admin_get_property(
    property_service: web::Data<PropertyService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<model::PropertyResponse>, error::Error> {
    let property = property_service.get(id.into_inner()).await?;
    Ok(success::Success::ok(Some(property)))
}

#[patch("/{id:[0-9a-fA-F-]{36}}")]
pub async fn admin_update_property(
    property_service: web::Data<PropertyService>,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::UpdatePropertyModel>,
) -> Result<success::Success<model::PropertyResponse>, error::Error> {
    let property = property_service.update(id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(property)).message("Property updated successfully"))
}

#[put("/{id:[0-9a-fA-F-]{36}}/status")]
pub async fn admin_set_status(
    property_service: web::Data<PropertyService>,
    id: web::Path<Uuid>,
    body: web::Json<model::SetStatusModel>,
) -> Result<success::Success<model::PropertyResponse>, error::Error> {
    let property = property_service.set_status(id.into_inner(), body.status).await?;
    Ok(success::Success::ok(Some(property)).message("Property status updated"))
}

#[delete("/{id:[0-9a-fA-F-]{36}}")]
pub async fn admin_delete_property(
    property_service: web::Data<PropertyService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    property_service.delete(id.into_inner()).await?;
    Ok(success::Success::no_content())
}
