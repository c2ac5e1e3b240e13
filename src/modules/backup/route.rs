use crate::modules::backup::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn admin_configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/backups")
            .service(list_backups)
            .service(create_database_snapshot)
            .service(backup_image_tree)
            .service(snapshot_property_images)
            .service(restore_database)
            .service(restore_property_images)
            .service(restore_image_tree)
            .service(restore_from_staging)
            .service(prune_backups),
    );
}
