//! Email service for sending expiry notifications via SMTP.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::info;

use docvault_core::Config;

/// Email service for sending expiry notifications.
/// No-op if notifications are disabled or SMTP is not configured.
#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl EmailService {
    /// Create email service from config. Returns `None` if disabled or SMTP not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.expiry_notifications_enabled {
            tracing::debug!("Expiry notifications disabled (EXPIRY_NOTIFICATIONS_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host.as_deref()?;
        let from = config.smtp_from.clone()?;
        let port = config.smtp_port.unwrap_or(587);

        let credentials = match (&config.smtp_user, &config.smtp_password) {
            (Some(u), Some(p)) => Some(Credentials::new(u.clone(), p.clone())),
            _ => None,
        };

        let mailer = if config.smtp_tls {
            let relay = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host) {
                Ok(relay) => relay,
                Err(e) => {
                    tracing::error!(
                        host = %host,
                        error = %e,
                        "Failed to build SMTP transport, notifications stay disabled"
                    );
                    return None;
                }
            };
            let b = relay.port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(
                host = %host,
                port = port,
                "Email service initialized (SMTP with STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = match credentials {
                Some(c) => b.credentials(c),
                None => b,
            };
            tracing::info!(host = %host, port = port, "Email service initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
        })
    }

    /// Send a plain-text email to a single recipient.
    pub async fn send(&self, to: &str, subject: &str, body_plain: &str) -> Result<(), String> {
        let to_addr: Mailbox = to
            .parse()
            .map_err(|e| format!("Invalid recipient address {}: {}", to, e))?;
        let from_addr: Mailbox = self
            .from
            .parse()
            .map_err(|e| format!("Invalid SMTP_FROM: {}", e))?;

        let email = Message::builder()
            .from(from_addr)
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body_plain.to_string())
            .map_err(|e| e.to_string())?;

        self.mailer.send(email).await.map_err(|e| e.to_string())?;
        info!(to = %to, "Expiry notification email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::StorageBackend;

    fn smtp_config() -> Config {
        Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            database_url: "postgresql://localhost/docvault".to_string(),
            db_max_connections: 20,
            db_timeout_seconds: 30,
            jwt_secret: "test-secret-key-min-32-characters-long".to_string(),
            jwt_expiry_hours: 24,
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("/tmp/docvault".to_string()),
            local_storage_base_url: Some("http://localhost:4000/files".to_string()),
            max_document_size_bytes: 10 * 1024 * 1024,
            expiry_notifications_enabled: true,
            expiry_notification_hour: 9,
            smtp_host: Some("smtp.example.com".to_string()),
            smtp_port: Some(587),
            smtp_user: None,
            smtp_password: None,
            smtp_from: Some("noreply@example.com".to_string()),
            smtp_tls: true,
        }
    }

    #[test]
    fn from_config_returns_none_when_notifications_disabled() {
        let mut config = smtp_config();
        config.expiry_notifications_enabled = false;
        assert!(EmailService::from_config(&config).is_none());
    }

    #[test]
    fn from_config_returns_none_without_smtp_host() {
        let mut config = smtp_config();
        config.smtp_host = None;
        assert!(EmailService::from_config(&config).is_none());
    }

    #[test]
    fn from_config_builds_a_service_for_a_configured_relay() {
        // Transport construction does not connect; this exercises the
        // STARTTLS build path end to end.
        assert!(EmailService::from_config(&smtp_config()).is_some());
    }
}
