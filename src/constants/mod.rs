pub const PROPERTIES_SUBDIR: &str = "properties";
pub const PROPERTY_IMAGE_URL_PREFIX: &str = "/uploads/properties";
pub const PLACEHOLDER_IMAGE_URL: &str = "/images/placeholder-property.svg";

/// Six-field cron expressions (seconds first).
pub const DEFAULT_BACKUP_CRON: &str = "0 0 2 * * *";
pub const DEFAULT_PRUNE_CRON: &str = "0 30 3 * * *";
pub const DEFAULT_CONSISTENCY_CRON: &str = "0 0 * * * *";

pub struct Env {
    pub jwt_secret: String,
    pub access_token_expiration: u64,
    pub refresh_token_expiration: u64,
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub upload_dir: String,
    pub backup_dir: String,
    pub staging_dir: String,
    pub max_upload_size: usize,
    pub db_backup_retention_days: i64,
    pub image_backup_retention_days: i64,
    pub backup_cron: String,
    pub prune_cron: String,
    pub consistency_cron: String,
    pub auto_restore_on_start: bool,
    pub owner_username: Option<String>,
    pub owner_password: Option<String>,
    pub owner_email: Option<String>,
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let access_token_expiration = var_or("ACCESS_TOKEN_EXPIRATION", "900")
            .parse::<u64>()
            .expect("ACCESS_TOKEN_EXPIRATION must be a valid u64 integer");
        let refresh_token_expiration = var_or("REFRESH_TOKEN_EXPIRATION", "604800")
            .parse::<u64>()
            .expect("REFRESH_TOKEN_EXPIRATION must be a valid u64 integer");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let database_max_connections = var_or("DATABASE_MAX_CONNECTIONS", "5")
            .parse::<u32>()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32 integer");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url = var_or("FRONTEND_URL", "http://localhost:5173");
        let ip = var_or("IP", "127.0.0.1");
        let port = var_or("PORT", "8080").parse::<u16>().expect("PORT must be a valid u16 integer");

        let max_upload_size = var_or("MAX_UPLOAD_SIZE", "10485760")
            .parse::<usize>()
            .expect("MAX_UPLOAD_SIZE must be a valid byte count");
        let db_backup_retention_days = var_or("DB_BACKUP_RETENTION_DAYS", "30")
            .parse::<i64>()
            .expect("DB_BACKUP_RETENTION_DAYS must be a valid integer");
        let image_backup_retention_days = var_or("IMAGE_BACKUP_RETENTION_DAYS", "90")
            .parse::<i64>()
            .expect("IMAGE_BACKUP_RETENTION_DAYS must be a valid integer");

        Env {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
            database_url,
            database_max_connections,
            redis_url,
            frontend_url,
            ip,
            port,
            upload_dir: var_or("UPLOAD_DIR", "./public/uploads"),
            backup_dir: var_or("BACKUP_DIR", "./backups"),
            staging_dir: var_or("STAGING_DIR", "./attached_assets"),
            max_upload_size,
            db_backup_retention_days,
            image_backup_retention_days,
            backup_cron: var_or("BACKUP_CRON", DEFAULT_BACKUP_CRON),
            prune_cron: var_or("PRUNE_CRON", DEFAULT_PRUNE_CRON),
            consistency_cron: var_or("CONSISTENCY_CRON", DEFAULT_CONSISTENCY_CRON),
            auto_restore_on_start: var_or("AUTO_RESTORE_ON_START", "false")
                .parse::<bool>()
                .expect("AUTO_RESTORE_ON_START must be true or false"),
            owner_username: std::env::var("OWNER_USERNAME").ok(),
            owner_password: std::env::var("OWNER_PASSWORD").ok(),
            owner_email: std::env::var("OWNER_EMAIL").ok(),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
