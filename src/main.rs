use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::{
    api::error,
    configs::{RedisCache, connect_database, run_migrations},
    constants::PROPERTIES_SUBDIR,
    middlewares::{authentication, authorization},
    modules::{
        announcement::{repository_pg::AnnouncementRepositoryPg, service::AnnouncementService},
        backup::{
            repository_pg::BackupRepositoryPg,
            service::{BackupService, Retention},
            store::BackupStore,
        },
        consistency::service::ConsistencyService,
        media::{model::UploadConfig, service::MediaService, storage::ImageStore},
        project::{repository_pg::ProjectRepositoryPg, service::ProjectService},
        property::{repository_pg::PropertyRepositoryPg, service::PropertyService},
        scheduler::{CronJobs, Schedules},
        testimonial::{repository_pg::TestimonialRepositoryPg, service::TestimonialService},
        user::{repository_pg::UserRepositoryPg, schema::UserRole, service::UserService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn index() -> &'static str {
    "Server is running"
}

#[actix_web::get("/health")]
async fn health_check(db_pool: web::Data<sqlx::PgPool>) -> Result<&'static str, error::Error> {
    sqlx::query("SELECT 1").execute(db_pool.get_ref()).await.map_err(error::SystemError::from)?;
    Ok("ok")
}

async fn bootstrap() -> Result<(), error::SystemError> {
    let db_pool = connect_database(&ENV.database_url, ENV.database_max_connections).await?;
    run_migrations(&db_pool).await?;
    let redis_pool = Arc::new(RedisCache::connect(&ENV.redis_url)?);

    let images = Arc::new(ImageStore::open(Path::new(&ENV.upload_dir).join(PROPERTIES_SUBDIR)).await?);
    let backups = Arc::new(BackupStore::open(&ENV.backup_dir).await?);

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let property_repo = Arc::new(PropertyRepositoryPg::new(db_pool.clone()));

    let user_service = UserService::with_dependencies(user_repo, redis_pool);
    let property_service =
        PropertyService::with_dependencies(property_repo.clone(), images.clone(), backups.clone());
    let media_service = MediaService::new(
        property_repo.clone(),
        images.clone(),
        backups.clone(),
        UploadConfig { max_file_size: ENV.max_upload_size, ..Default::default() },
    );
    let consistency_service = Arc::new(ConsistencyService::new(
        property_repo.clone(),
        images.clone(),
        backups.clone(),
        &ENV.staging_dir,
    ));
    let backup_service = Arc::new(BackupService::with_dependencies(
        Arc::new(BackupRepositoryPg::new(db_pool.clone())),
        property_repo,
        backups,
        images,
        &ENV.staging_dir,
        Retention {
            database_days: ENV.db_backup_retention_days,
            image_days: ENV.image_backup_retention_days,
        },
    ));
    let announcement_service = AnnouncementService::with_dependencies(Arc::new(
        AnnouncementRepositoryPg::new(db_pool.clone()),
    ));
    let project_service =
        ProjectService::with_dependencies(Arc::new(ProjectRepositoryPg::new(db_pool.clone())));
    let testimonial_service = TestimonialService::with_dependencies(Arc::new(
        TestimonialRepositoryPg::new(db_pool.clone()),
    ));

    user_service.ensure_owner().await?;
    if ENV.auto_restore_on_start {
        backup_service.auto_restore().await?;
    }

    let mut cron_jobs = CronJobs::new(backup_service.clone(), consistency_service.clone()).await?;
    cron_jobs
        .register(&Schedules {
            backup: ENV.backup_cron.clone(),
            prune: ENV.prune_cron.clone(),
            consistency: ENV.consistency_cron.clone(),
        })
        .await?;
    cron_jobs.start().await?;

    let backup_data = web::Data::from(backup_service);
    let consistency_data = web::Data::from(consistency_service);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allowed_origin(&ENV.frontend_url)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials()
                    .max_age(3600),
            )
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(property_service.clone()))
            .app_data(web::Data::new(media_service.clone()))
            .app_data(web::Data::new(announcement_service.clone()))
            .app_data(web::Data::new(project_service.clone()))
            .app_data(web::Data::new(testimonial_service.clone()))
            .app_data(backup_data.clone())
            .app_data(consistency_data.clone())
            .app_data(web::Data::new(db_pool.clone()))
            .service(index)
            .service(health_check)
            .configure(modules::media::route::static_configure)
            .service(
                web::scope("/api")
                    .configure(modules::user::route::public_api_configure)
                    .configure(modules::property::route::public_api_configure)
                    .configure(modules::announcement::route::public_api_configure)
                    .configure(modules::project::route::public_api_configure)
                    .configure(modules::testimonial::route::public_api_configure)
                    .service(
                        web::scope("/admin")
                            .wrap(from_fn(authorization(vec![UserRole::Owner, UserRole::Admin])))
                            .wrap(from_fn(authentication))
                            .configure(modules::user::route::admin_configure)
                            .configure(modules::property::route::admin_configure)
                            .configure(modules::media::route::admin_configure)
                            .configure(modules::consistency::route::admin_configure)
                            .configure(modules::backup::route::admin_configure)
                            .configure(modules::announcement::route::admin_configure)
                            .configure(modules::project::route::admin_configure)
                            .configure(modules::testimonial::route::admin_configure),
                    )
                    .service(
                        web::scope("")
                            .wrap(from_fn(authentication))
                            .configure(modules::user::route::configure)
                            .configure(modules::property::route::configure),
                    ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await?;

    cron_jobs.shutdown().await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    LazyLock::force(&ENV);
    if let Err(e) = tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish()) {
        log::warn!("Tracing subscriber already set: {}", e);
    }

    bootstrap().await.map_err(|e| {
        log::error!("Server stopped: {}", e);
        std::io::Error::other(e.to_string())
    })
}
