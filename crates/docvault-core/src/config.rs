//! Configuration module
//!
//! Application settings loaded from the environment, covering the HTTP
//! server, database, authentication, storage backends and the expiry
//! notification job.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const MAX_DOCUMENT_SIZE_MB: usize = 10;
const NOTIFICATION_HOUR: u32 = 9;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload limits
    pub max_document_size_bytes: usize,
    // Expiry notification job
    pub expiry_notifications_enabled: bool,
    pub expiry_notification_hour: u32,
    // SMTP
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_tls: bool,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| s.parse::<StorageBackend>().ok());

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_document_size_bytes: env::var("MAX_DOCUMENT_SIZE_MB")
                .unwrap_or_else(|_| MAX_DOCUMENT_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_DOCUMENT_SIZE_MB)
                * 1024
                * 1024,
            expiry_notifications_enabled: env::var("EXPIRY_NOTIFICATIONS_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            expiry_notification_hour: env::var("EXPIRY_NOTIFICATION_HOUR")
                .unwrap_or_else(|_| NOTIFICATION_HOUR.to_string())
                .parse()
                .unwrap_or(NOTIFICATION_HOUR),
            smtp_host: env::var("SMTP_HOST").ok().filter(|s| !s.is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&p| p > 0),
            smtp_user: env::var("SMTP_USER").ok().filter(|s| !s.is_empty()),
            smtp_password: env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty()),
            smtp_from: env::var("SMTP_FROM").ok().filter(|s| !s.is_empty()),
            smtp_tls: env::var("SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.expiry_notification_hour > 23 {
            return Err(anyhow::anyhow!(
                "EXPIRY_NOTIFICATION_HOUR must be between 0 and 23"
            ));
        }

        if self.expiry_notifications_enabled
            && (self.smtp_host.is_none() || self.smtp_from.is_none())
        {
            return Err(anyhow::anyhow!(
                "EXPIRY_NOTIFICATIONS_ENABLED=true requires SMTP_HOST and SMTP_FROM to be set"
            ));
        }

        // Validate storage backend configuration
        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            database_url: "postgresql://localhost/docvault".to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            jwt_expiry_hours: JWT_EXPIRY_HOURS,
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/docvault".to_string()),
            local_storage_base_url: Some("http://localhost:4000/files".to_string()),
            max_document_size_bytes: MAX_DOCUMENT_SIZE_MB * 1024 * 1024,
            expiry_notifications_enabled: false,
            expiry_notification_hour: NOTIFICATION_HOUR,
            smtp_host: None,
            smtp_port: None,
            smtp_user: None,
            smtp_password: None,
            smtp_from: None,
            smtp_tls: true,
        }
    }

    #[test]
    fn validates_a_sane_local_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_short_jwt_secret() {
        let mut config = base_config();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_backend_requires_bucket_and_region() {
        let mut config = base_config();
        config.storage_backend = Some(StorageBackend::S3);
        assert!(config.validate().is_err());
        config.s3_bucket = Some("docs".to_string());
        config.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn notifications_require_smtp_settings() {
        let mut config = base_config();
        config.expiry_notifications_enabled = true;
        assert!(config.validate().is_err());
        config.smtp_host = Some("smtp.example.com".to_string());
        config.smtp_from = Some("noreply@example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_notification_hour() {
        let mut config = base_config();
        config.expiry_notification_hour = 24;
        assert!(config.validate().is_err());
    }
}
