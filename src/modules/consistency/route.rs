use crate::modules::consistency::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/images").service(scan).service(repair));
}
