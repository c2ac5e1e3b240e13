use crate::modules::testimonial::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/testimonials").service(list_published));
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/testimonials")
            .service(admin_list_testimonials)
            .service(admin_create_testimonial)
            .service(admin_update_testimonial)
            .service(admin_delete_testimonial),
    );
}
