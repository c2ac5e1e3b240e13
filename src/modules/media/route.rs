use crate::modules::media::handle::*;
use actix_web::web::{scope, ServiceConfig};

use crate::constants::PROPERTY_IMAGE_URL_PREFIX;

pub fn static_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope(PROPERTY_IMAGE_URL_PREFIX).service(serve_image));
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/photos").service(upload_photos).service(arrange_photos).service(delete_photo),
    );
}
