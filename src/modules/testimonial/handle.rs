use actix_web::{delete, get, patch, post, web};
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::testimonial::{model, schema::TestimonialEntity, service::TestimonialService};
use crate::utils::ValidatedJson;

#[get("")]
pub async fn list_published(
    testimonial_service: web::Data<TestimonialService>,
) -> Result<success::Success<Vec<TestimonialEntity>>, error::Error> {
    let testimonials = testimonial_service.list_published().await?;
    Ok(success::Success::ok(Some(testimonials)))
}

#[get("")]
pub async fn admin_list_testimonials(
    testimonial_service: web::Data<TestimonialService>,
) -> Result<success::Success<Vec<TestimonialEntity>>, error::Error> {
    let testimonials = testimonial_service.list_all().await?;
    Ok(success::Success::ok(Some(testimonials)))
}

#[post("")]
pub async fn admin_create_testimonial(
    testimonial_service: web::Data<TestimonialService>,
    body: ValidatedJson<model::CreateTestimonialModel>,
) -> Result<success::Success<TestimonialEntity>, error::Error> {
    let testimonial = testimonial_service.create(body.0).await?;
    Ok(success::Success::created(Some(testimonial)).message("Testimonial created successfully"))
}

#[patch("/{id}")]
pub async fn admin_update_testimonial(
    testimonial_service: web::Data<TestimonialService>,
    id: web::Path<Uuid>,
    body: ValidatedJson<model::UpdateTestimonialModel>,
) -> Result<success::Success<TestimonialEntity>, error::Error> {
    let testimonial = testimonial_service.update(id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(testimonial)).message("Testimonial updated successfully"))
}

#[delete("/{id}")]
pub async fn admin_delete_testimonial(
    testimonial_service: web::Data<TestimonialService>,
    id: web::Path<Uuid>,
) -> Result<success::Success<()>, error::Error> {
    testimonial_service.delete(id.into_inner()).await?;
    Ok(success::Success::no_content())
}
