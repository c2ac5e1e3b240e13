#![cfg(test)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Provides the required variables so `ENV` can be built without a `.env` file.
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("DATABASE_URL", "postgres://localhost/estate_test");
        std::env::set_var("REDIS_URL", "redis://127.0.0.1:6379");
        std::env::set_var("OWNER_USERNAME", "owner");
        std::env::set_var("OWNER_PASSWORD", "owner-secret");
    });
    std::sync::LazyLock::force(&crate::ENV);
}
