use crate::core::config::Config;
use crate::services::api::{ApiClient, ForwardService};
use crate::services::email::attachment::AttachmentHandler;
use crate::services::email::fetcher::{Email, EmailFetcher, EmailMetadata, MailboxService};
use anyhow::Result;
use std::time::Duration;
use tracing::{error, info};

/// Orchestrates one connect → fetch → filter → forward → disconnect cycle
/// and repeats it on a fixed interval.
pub struct CvProcessor {
    config: Config,
    api: ApiClient,
}

impl CvProcessor {
    pub fn new(config: Config) -> Self {
        let api = ApiClient::new(&config);
        Self { config, api }
    }

    /// Run forever: one cycle immediately, then one per tick. Each cycle is
    /// awaited inline, so a cycle that outlasts the interval delays the next
    /// tick instead of overlapping it. Cycle errors are logged and do not
    /// stop the loop.
    pub async fn start(&self) -> Result<()> {
        info!("CV relay started");
        info!(
            "Checking for new emails every {} seconds",
            self.config.check_interval_ms / 1000
        );
        info!("Monitoring: {}", self.config.user);
        info!(
            "API endpoint: {}",
            self.config.api_url.as_deref().unwrap_or("not configured")
        );

        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.check_interval_ms));

        loop {
            interval.tick().await;
            if let Err(e) = self.process_emails().await {
                error!("Error in CV processing: {:#}", e);
            }
        }
    }

    /// One full cycle. The connection is released on every exit path before
    /// the cycle's result propagates.
    pub async fn process_emails(&self) -> Result<()> {
        info!("=== Starting CV processing ===");

        let mut fetcher = EmailFetcher::new(self.config.clone());
        let result = self.run_cycle(&mut fetcher).await;
        fetcher.disconnect().await;
        result?;

        info!("=== CV processing completed ===");
        Ok(())
    }

    async fn run_cycle<M: MailboxService>(&self, mailbox: &mut M) -> Result<()> {
        mailbox.connect().await?;

        let emails = mailbox.fetch_unseen_with_attachments().await?;
        if emails.is_empty() {
            info!("No emails with attachments to process");
            return Ok(());
        }

        for email in emails {
            self.process_email(mailbox, email).await?;
        }

        // Deleted messages are only flagged per email; one expunge removes
        // them all so the UIDs stay valid for the whole cycle.
        if self.config.delete_after_processing {
            mailbox.expunge().await?;
        }

        Ok(())
    }

    async fn process_email<M: MailboxService>(&self, mailbox: &mut M, email: Email) -> Result<()> {
        info!("Processing email from: {}", email.from);
        info!("Subject: {}", email.subject);
        info!("Attachments: {}", email.attachments.len());

        let uid = email.uid;
        let metadata = EmailMetadata::of(&email);
        let cv_attachments: Vec<_> = email
            .attachments
            .into_iter()
            .filter(|a| AttachmentHandler::is_cv_attachment(&a.filename))
            .collect();

        if cv_attachments.is_empty() {
            info!("No CV attachments found in this email");
        } else {
            info!("Found {} CV attachment(s)", cv_attachments.len());
            let results = self.api.send_all(&cv_attachments, &metadata).await;

            for result in &results {
                if result.success {
                    info!("{} - processed successfully", result.filename);
                } else {
                    error!(
                        "{} - failed: {}",
                        result.filename,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }

        if self.config.delete_after_processing {
            mailbox.flag_deleted(uid).await?;
        }

        Ok(())
    }
}
