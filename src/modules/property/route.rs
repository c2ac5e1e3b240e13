use crate::modules::property::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/properties")
            .service(list_published)
            .service(get_published_by_slug)
            .service(get_published),
    );
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/me/properties").service(list_mine).service(submit_property));
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/properties")
            .service(admin_list_properties)
            .service(admin_create_property)
            .service(admin_get_property)
            .service(admin_update_property)
            .service(admin_set_status)
            .service(admin_delete_property),
    );
}
