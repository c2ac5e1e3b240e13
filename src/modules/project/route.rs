use crate::modules::project::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(scope("/projects").service(list_projects).service(get_project));
}

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/projects")
            .service(list_projects)
            .service(admin_create_project)
            .service(get_project)
            .service(admin_update_project)
            .service(admin_delete_project),
    );
}
