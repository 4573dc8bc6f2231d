//! Configuration keys and defaults
//!
//! Keys are the lower-cased environment variable names, so `SECRET_KEY` in the
//! environment and `secret_key` in `conf/application.yml` set the same value.
//! Nested keys use `__` in the environment (`LOGGING__LEVEL` is `logging.level`).

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const ENV_SEPARATOR: &str = "__";

pub const ENVIRONMENT: &str = "environment";
pub const DEFAULT_ENVIRONMENT: &str = "production";

// Security
pub const SECRET_KEY: &str = "secret_key";
// Only used when `environment` is development or testing
pub const DEVELOPMENT_SECRET_KEY: &str = "supermanager-development-secret";
pub const TOKEN_SIGNING_KEY: &str = "token_signing_key";
pub const TOKEN_LIFETIME_MINUTES: &str = "token_lifetime_minutes";
pub const TOKEN_REFRESH_LIFETIME_DAYS: &str = "token_refresh_lifetime_days";
pub const PASSWORD_RESET_TIMEOUT_SECONDS: &str = "password_reset_timeout_seconds";

// Network
pub const ALLOWED_HOSTS: &str = "allowed_hosts";
pub const ALLOWED_CIDR_NETS: &str = "allowed_cidr_nets";
pub const ANY_HOST: &str = "*";
pub const DEFAULT_CIDR_NETS: &[&str] = &["0.0.0.0/0", "::/0"];
pub const SERVER_ADDRESS: &str = "server_address";
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
pub const SERVER_PORT: &str = "server_port";
pub const DEFAULT_SERVER_PORT: u16 = 8000;
pub const SERVER_WORKERS: &str = "server_workers";

// Paging
pub const PAGINATION_PAGE_SIZE: &str = "pagination_page_size";

// Database
pub const DATABASE_URL: &str = "database_url";
pub const DATABASE_ENGINE: &str = "database_engine";
pub const DATABASE_NAME: &str = "database_name";
pub const DEFAULT_DATABASE_NAME: &str = "db.sqlite3";
pub const DATABASE_USER: &str = "database_user";
pub const DATABASE_PASSWORD: &str = "database_password";
pub const DATABASE_HOST: &str = "database_host";
pub const DEFAULT_DATABASE_HOST: &str = "localhost";
pub const DATABASE_PORT: &str = "database_port";
pub const DATABASE_MAX_CONNECTIONS: &str = "database_max_connections";
pub const DATABASE_MIN_CONNECTIONS: &str = "database_min_connections";
pub const DATABASE_CONNECT_TIMEOUT: &str = "database_connect_timeout";
pub const DATABASE_IDLE_TIMEOUT: &str = "database_idle_timeout";
pub const DATABASE_SQLX_LOGGING: &str = "database_sqlx_logging";

// Mail
pub const EMAIL_ENABLED: &str = "email_enabled";
pub const EMAIL_HOST: &str = "email_host";
pub const EMAIL_PORT: &str = "email_port";
pub const EMAIL_USER: &str = "email_user";
pub const EMAIL_PASSWORD: &str = "email_password";
pub const EMAIL_USE_TLS: &str = "email_use_tls";
pub const EMAIL_USE_SSL: &str = "email_use_ssl";
pub const EMAIL_TIMEOUT: &str = "email_timeout";
pub const DEFAULT_FROM_EMAIL: &str = "default_from_email";
pub const EMAIL_PWRESET_SUBJECT: &str = "email_pwreset_subject";
pub const EMAIL_PWRESET_MESSAGE: &str = "email_pwreset_message";
pub const EMAIL_PWRESET_URL: &str = "email_pwreset_url";
pub const FRONTEND_URL: &str = "frontend_url";

// Media
pub const MEDIA_ROOT: &str = "media_root";
pub const DEFAULT_MEDIA_ROOT: &str = "media";
pub const MEDIA_URL: &str = "media_url";
pub const DEFAULT_MEDIA_URL: &str = "/media/";
pub const AVATARS_DIR: &str = "avatars";
pub const MAX_AVATAR_BYTES: &str = "max_avatar_bytes";
pub const DEFAULT_MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

// Settings cache
pub const SETTINGS_CACHE_TTL_SECONDS: &str = "settings_cache_ttl_seconds";

// Logging
pub const LOGGING_DIR: &str = "logging.dir";
pub const DEFAULT_LOGGING_DIR: &str = "logs";
pub const LOGGING_LEVEL: &str = "logging.level";
pub const DEFAULT_LOGGING_LEVEL: &str = "info";
pub const LOGGING_CONSOLE: &str = "logging.console";
pub const LOGGING_FILE: &str = "logging.file";
pub const LOGGING_ROTATION: &str = "logging.rotation";
pub const DEFAULT_LOGGING_ROTATION: &str = "daily";
