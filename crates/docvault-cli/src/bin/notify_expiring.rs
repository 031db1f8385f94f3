//! One-shot runner for the expiry notification job.
//!
//! Intended for cron or a container scheduler (the API binary also runs the
//! job daily when EXPIRY_NOTIFICATIONS_ENABLED is set). Exits non-zero only
//! when the scan itself fails; individual owner failures are logged and
//! reported but do not fail the run.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use clap::Parser;
use docvault_core::Config;
use docvault_db::{DocumentRepository, UserRepository};
use docvault_notify::expiry::Mailer;
use docvault_notify::{EmailService, ExpiryNotifier};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "notify_expiring")]
#[command(about = "Email owners of documents expiring within the next week")]
struct Args {
    /// Log what would be sent without sending any email
    #[arg(long)]
    dry_run: bool,
}

struct DryRunMailer;

#[async_trait]
impl Mailer for DryRunMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        tracing::info!(to = %to, subject = %subject, "[dry-run] would send:\n{}", body);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await?;

    let mailer: Arc<dyn Mailer> = if args.dry_run {
        Arc::new(DryRunMailer)
    } else {
        let email = EmailService::from_config(&config).ok_or_else(|| {
            anyhow::anyhow!(
                "Email service not configured; set EXPIRY_NOTIFICATIONS_ENABLED=true and SMTP_* variables"
            )
        })?;
        Arc::new(email)
    };

    let notifier = ExpiryNotifier::new(
        Arc::new(DocumentRepository::new(pool.clone())),
        Arc::new(UserRepository::new(pool)),
        mailer,
    );

    let report = notifier.run(Utc::now()).await?;

    tracing::info!(
        scanned = report.scanned,
        owners_notified = report.owners_notified,
        failed_owners = report.failures.len(),
        "Expiry notification run finished"
    );
    for failure in &report.failures {
        tracing::warn!(owner_id = %failure.owner_id, error = %failure.error, "Owner not notified");
    }

    Ok(())
}
