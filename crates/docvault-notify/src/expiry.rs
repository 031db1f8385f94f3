//! Daily expiry notification job.
//!
//! Scans for non-archived documents expiring within the next week, groups
//! them by owner and sends each owner one summary email. A failure for one
//! owner never aborts the run; failures are collected and reported at the
//! end.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use async_trait::async_trait;
use docvault_core::models::{Document, User};
use docvault_core::AppError;
use docvault_db::{DocumentRepository, UserRepository};

use crate::EmailService;

/// How far ahead the job looks for expiring documents.
pub const LOOKAHEAD_DAYS: i64 = 7;

const SUBJECT: &str = "You have documents expiring soon.";

/// Source of documents that are about to expire.
#[async_trait]
pub trait ExpiringDocumentSource: Send + Sync {
    async fn expiring_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Document>, AppError>;
}

/// Lookup of owner accounts for notification addressing.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn get_owner(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

#[async_trait]
impl ExpiringDocumentSource for DocumentRepository {
    async fn expiring_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Document>, AppError> {
        DocumentRepository::expiring_between(self, from, until).await
    }
}

#[async_trait]
impl OwnerDirectory for UserRepository {
    async fn get_owner(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.get(id).await
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        EmailService::send(self, to, subject, body).await
    }
}

/// One owner group that could not be notified.
#[derive(Debug)]
pub struct OwnerFailure {
    pub owner_id: Uuid,
    pub error: String,
}

/// Outcome of a single notification run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub scanned: usize,
    pub owners_notified: usize,
    pub failures: Vec<OwnerFailure>,
}

/// The expiry notification job.
pub struct ExpiryNotifier {
    documents: Arc<dyn ExpiringDocumentSource>,
    owners: Arc<dyn OwnerDirectory>,
    mailer: Arc<dyn Mailer>,
}

impl ExpiryNotifier {
    pub fn new(
        documents: Arc<dyn ExpiringDocumentSource>,
        owners: Arc<dyn OwnerDirectory>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            documents,
            owners,
            mailer,
        }
    }

    /// Start the background task that runs the job once a day at `hour`
    /// (local time). Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>, hour: u32) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let wait = duration_until_next_run(Local::now(), hour);
                tracing::info!(
                    wait_secs = wait.as_secs(),
                    hour,
                    "Expiry notification job scheduled"
                );
                tokio::time::sleep(wait).await;

                match self.run(Utc::now()).await {
                    Ok(report) => {
                        if report.failures.is_empty() {
                            tracing::info!(
                                scanned = report.scanned,
                                owners_notified = report.owners_notified,
                                "Expiry notification run completed"
                            );
                        } else {
                            tracing::warn!(
                                scanned = report.scanned,
                                owners_notified = report.owners_notified,
                                failed_owners = report.failures.len(),
                                "Expiry notification run completed with failures"
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Expiry notification run failed");
                    }
                }
            }
        })
    }

    /// Run one notification pass. `now` anchors the lookahead window:
    /// documents expiring in `[now, now + 7 days]` are included.
    ///
    /// Each owner group is processed independently; the report carries the
    /// owners that could not be notified.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunReport, AppError> {
        let until = now + ChronoDuration::days(LOOKAHEAD_DAYS);
        let expiring = self.documents.expiring_between(now, until).await?;

        let mut report = RunReport {
            scanned: expiring.len(),
            ..Default::default()
        };

        let mut by_owner: HashMap<Uuid, Vec<Document>> = HashMap::new();
        for document in expiring {
            by_owner.entry(document.owner_id).or_default().push(document);
        }

        for (owner_id, mut documents) in by_owner {
            documents.sort_by_key(|d| d.expires_at);

            match self.notify_owner(owner_id, &documents).await {
                Ok(()) => report.owners_notified += 1,
                Err(error) => {
                    tracing::error!(
                        owner_id = %owner_id,
                        document_count = documents.len(),
                        error = %error,
                        "Failed to notify owner of expiring documents"
                    );
                    report.failures.push(OwnerFailure { owner_id, error });
                }
            }
        }

        Ok(report)
    }

    async fn notify_owner(&self, owner_id: Uuid, documents: &[Document]) -> Result<(), String> {
        let owner = self
            .owners
            .get_owner(owner_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("Owner {} not found", owner_id))?;

        let body = build_message_body(documents);
        self.mailer.send(&owner.email, SUBJECT, &body).await
    }
}

/// Builds the plain-text notification body listing each expiring document.
fn build_message_body(documents: &[Document]) -> String {
    let mut lines = vec![
        "You have documents expiring soon.".to_string(),
        String::new(),
        "Documents expiring soon:".to_string(),
    ];
    for document in documents {
        // expiring_between only returns rows with an expiry set.
        if let Some(expires_at) = document.expires_at {
            lines.push(format!(
                "{} expires at {}",
                document.name,
                expires_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
    }
    lines.push(String::new());
    lines.push("Please log into your account to review them.".to_string());
    lines.join("\n")
}

/// Time to wait from `now` until the next occurrence of `hour`:00 local time.
/// If that time already passed today, the run happens tomorrow.
pub fn duration_until_next_run(now: DateTime<Local>, hour: u32) -> Duration {
    let run_time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let today_run = now.date_naive().and_time(run_time);
    let next_run = if now.naive_local() < today_run {
        today_run
    } else {
        today_run + ChronoDuration::days(1)
    };

    (next_run - now.naive_local())
        .to_std()
        .unwrap_or(Duration::from_secs(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct StaticSource {
        documents: Vec<Document>,
    }

    #[async_trait]
    impl ExpiringDocumentSource for StaticSource {
        async fn expiring_between(
            &self,
            from: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> Result<Vec<Document>, AppError> {
            Ok(self
                .documents
                .iter()
                .filter(|d| {
                    d.archived_at.is_none()
                        && d.expires_at
                            .map(|e| e >= from && e <= until)
                            .unwrap_or(false)
                })
                .cloned()
                .collect())
        }
    }

    struct StaticDirectory {
        users: Vec<User>,
    }

    #[async_trait]
    impl OwnerDirectory for StaticDirectory {
        async fn get_owner(&self, id: Uuid) -> Result<Option<User>, AppError> {
            Ok(self.users.iter().find(|u| u.id == id).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
            if let Some(ref addr) = self.fail_for {
                if addr == to {
                    return Err("smtp refused".to_string());
                }
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn document(owner_id: Uuid, name: &str, expires_at: Option<DateTime<Utc>>) -> Document {
        Document {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            path: format!("documents/{}/{}.pdf", owner_id, name),
            expires_at,
            archived_at: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn notifier(
        documents: Vec<Document>,
        users: Vec<User>,
        mailer: Arc<RecordingMailer>,
    ) -> ExpiryNotifier {
        ExpiryNotifier::new(
            Arc::new(StaticSource { documents }),
            Arc::new(StaticDirectory { users }),
            mailer,
        )
    }

    #[tokio::test]
    async fn groups_documents_per_owner_into_one_email() {
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");

        let in_window = Some(now() + ChronoDuration::days(3));
        let documents = vec![
            document(alice.id, "Lease", in_window),
            document(alice.id, "Passport scan", Some(now() + ChronoDuration::days(6))),
            document(bob.id, "Invoice", in_window),
            // Outside the window and without expiry; both ignored.
            document(bob.id, "Far future", Some(now() + ChronoDuration::days(30))),
            document(bob.id, "No expiry", None),
        ];

        let mailer = Arc::new(RecordingMailer::default());
        let notifier = notifier(documents, vec![alice.clone(), bob.clone()], mailer.clone());

        let report = notifier.run(now()).await.unwrap();
        assert_eq!(report.scanned, 3);
        assert_eq!(report.owners_notified, 2);
        assert!(report.failures.is_empty());

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);

        let alice_mail = sent.iter().find(|(to, _, _)| to == &alice.email).unwrap();
        assert_eq!(alice_mail.1, "You have documents expiring soon.");
        assert!(alice_mail.2.contains("Documents expiring soon:"));
        assert!(alice_mail.2.contains("Lease expires at "));
        assert!(alice_mail.2.contains("Passport scan expires at "));
        assert!(alice_mail
            .2
            .contains("Please log into your account to review them."));

        let bob_mail = sent.iter().find(|(to, _, _)| to == &bob.email).unwrap();
        assert!(bob_mail.2.contains("Invoice expires at "));
        assert!(!bob_mail.2.contains("Far future"));
    }

    #[tokio::test]
    async fn one_failing_owner_does_not_abort_the_run() {
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");
        let in_window = Some(now() + ChronoDuration::days(2));

        let documents = vec![
            document(alice.id, "Lease", in_window),
            document(bob.id, "Invoice", in_window),
        ];

        let mailer = Arc::new(RecordingMailer {
            fail_for: Some(alice.email.clone()),
            ..Default::default()
        });
        let notifier = notifier(documents, vec![alice.clone(), bob.clone()], mailer.clone());

        let report = notifier.run(now()).await.unwrap();
        assert_eq!(report.owners_notified, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].owner_id, alice.id);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, bob.email);
    }

    #[tokio::test]
    async fn missing_owner_is_reported_and_skipped() {
        let ghost_id = Uuid::new_v4();
        let alice = user("alice@example.com");
        let in_window = Some(now() + ChronoDuration::days(1));

        let documents = vec![
            document(ghost_id, "Orphaned", in_window),
            document(alice.id, "Lease", in_window),
        ];

        let mailer = Arc::new(RecordingMailer::default());
        let notifier = notifier(documents, vec![alice.clone()], mailer.clone());

        let report = notifier.run(now()).await.unwrap();
        assert_eq!(report.owners_notified, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].owner_id, ghost_id);
        assert!(report.failures[0].error.contains("not found"));
    }

    #[tokio::test]
    async fn window_boundaries_are_inclusive() {
        let alice = user("alice@example.com");
        let documents = vec![
            document(alice.id, "At now", Some(now())),
            document(
                alice.id,
                "At window end",
                Some(now() + ChronoDuration::days(LOOKAHEAD_DAYS)),
            ),
            document(
                alice.id,
                "Past window end",
                Some(now() + ChronoDuration::days(LOOKAHEAD_DAYS) + ChronoDuration::seconds(1)),
            ),
        ];

        let mailer = Arc::new(RecordingMailer::default());
        let notifier = notifier(documents, vec![alice], mailer.clone());

        let report = notifier.run(now()).await.unwrap();
        assert_eq!(report.scanned, 2);

        let sent = mailer.sent.lock().unwrap();
        assert!(sent[0].2.contains("At now"));
        assert!(sent[0].2.contains("At window end"));
        assert!(!sent[0].2.contains("Past window end"));
    }

    #[tokio::test]
    async fn a_second_run_sends_again() {
        // The job is stateless; running twice in one day notifies twice.
        let alice = user("alice@example.com");
        let documents = vec![document(alice.id, "Lease", Some(now() + ChronoDuration::days(2)))];

        let mailer = Arc::new(RecordingMailer::default());
        let notifier = notifier(documents, vec![alice], mailer.clone());

        notifier.run(now()).await.unwrap();
        notifier.run(now()).await.unwrap();

        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn next_run_is_later_today_or_tomorrow() {
        let before = Local.with_ymd_and_hms(2024, 3, 15, 7, 30, 0).unwrap();
        assert_eq!(
            duration_until_next_run(before, 9),
            Duration::from_secs(90 * 60)
        );

        let after = Local.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        assert_eq!(
            duration_until_next_run(after, 9),
            Duration::from_secs(24 * 3600)
        );
    }
}
