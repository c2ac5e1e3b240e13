use crate::modules::announcement::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/announcements").service(list_visible));
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/announcements")
            .service(admin_list_announcements)
            .service(admin_create_announcement)
            .service(admin_get_announcement)
            .service(admin_update_announcement)
            .service(admin_delete_announcement),
    );
}
