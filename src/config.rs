use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup
/// and shared immutably across all services (repository, storage, auth) via the
/// application state.
#[derive(Clone)]
pub struct AppConfig {
    // SQLite database URL (the content store).
    pub db_url: String,
    // Path to the read-only credential seed file (username/passwordHash/role).
    pub users_file: String,
    // S3-compatible object storage endpoint (MinIO locally, R2 in production).
    pub s3_endpoint: String,
    // Storage region ("auto" for R2, a stub for MinIO).
    pub s3_region: String,
    // Access Key ID for the storage endpoint.
    pub s3_key: String,
    // Secret Access Key for the storage endpoint.
    pub s3_secret: String,
    // Bucket holding all uploaded media objects.
    pub s3_bucket: String,
    // Runtime environment marker. Controls log format selection.
    pub env: Env,
    // Secret used to sign and validate session tokens.
    pub jwt_secret: String,
}

/// Env
///
/// Runtime context. Local uses pretty logs and default MinIO credentials;
/// Production demands every secret be set explicitly and logs as JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// Session lifetime with `rememberMe` set, in seconds (7 days).
pub const SESSION_TTL_REMEMBER_SECS: i64 = 604_800;
/// Default session lifetime, in seconds (24 hours).
pub const SESSION_TTL_SECS: i64 = 86_400;

impl Default for AppConfig {
    /// Safe, non-panicking config for test setup. No environment variables are
    /// required to instantiate it.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            users_file: "users.json".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_key: "admin".to_string(),
            s3_secret: "password".to_string(),
            s3_bucket: "reiseblog-test".to_string(),
            env: Env::Local,
            jwt_secret: "local-test-signing-secret-not-for-production".to_string(),
        }
    }
}

impl AppConfig {
    /// Initializes configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics if a variable required for the current environment is missing.
    /// Production refuses to start without an explicit signing secret and
    /// storage credentials; Local falls back to Docker-friendly defaults.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            _ => env::var("JWT_SECRET")
                .unwrap_or_else(|_| "local-test-signing-secret-not-for-production".to_string()),
        };

        let users_file = env::var("USERS_FILE").unwrap_or_else(|_| "users.json".to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                db_url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:reiseblog.db?mode=rwc".to_string()),
                users_file,
                s3_endpoint: "http://localhost:9000".to_string(),
                s3_region: "us-east-1".to_string(),
                s3_key: "admin".to_string(),
                s3_secret: "password".to_string(),
                s3_bucket: "reiseblog-media".to_string(),
                jwt_secret,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                users_file,
                // R2 endpoint, e.g. https://<account-id>.r2.cloudflarestorage.com
                s3_endpoint: env::var("S3_ENDPOINT").expect("FATAL: S3_ENDPOINT required in prod"),
                s3_region: env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
                s3_key: env::var("S3_ACCESS_KEY").expect("FATAL: S3_ACCESS_KEY required in prod"),
                s3_secret: env::var("S3_SECRET_KEY")
                    .expect("FATAL: S3_SECRET_KEY required in prod"),
                s3_bucket: env::var("S3_BUCKET_NAME")
                    .unwrap_or_else(|_| "reiseblog-media".to_string()),
                jwt_secret,
            },
        }
    }
}
