use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::infrastructure::imap::ImapClient;
use crate::services::email::attachment::{Attachment, AttachmentHandler};
use crate::services::email::parser::EmailParser;
use async_trait::async_trait;
use mail_parser::MessageParser;
use tracing::info;

/// One fetched message, alive for a single cycle
#[derive(Debug, Clone)]
pub struct Email {
    pub uid: u32,
    pub from: String,
    pub subject: String,
    /// RFC 3339
    pub date: String,
    pub message_id: String,
    pub attachments: Vec<Attachment>,
}

/// The metadata fields forwarded alongside each attachment
#[derive(Debug, Clone)]
pub struct EmailMetadata {
    pub from: String,
    pub subject: String,
    pub date: String,
    pub message_id: String,
}

impl EmailMetadata {
    pub fn of(email: &Email) -> Self {
        Self {
            from: email.from.clone(),
            subject: email.subject.clone(),
            date: email.date.clone(),
            message_id: email.message_id.clone(),
        }
    }
}

/// Mailbox access as the orchestrator sees it. Implemented by `EmailFetcher`
/// over a live IMAP session and by mocks in tests.
#[async_trait]
pub trait MailboxService: Send + Sync {
    async fn connect(&mut self) -> AppResult<()>;
    async fn fetch_unseen_with_attachments(&mut self) -> AppResult<Vec<Email>>;
    async fn flag_deleted(&mut self, uid: u32) -> AppResult<()>;
    async fn expunge(&mut self) -> AppResult<()>;
    async fn disconnect(&mut self);
}

/// Mailbox client: wraps the IMAP transport with the fetch-unseen contract.
pub struct EmailFetcher {
    config: Config,
    client: ImapClient,
}

impl EmailFetcher {
    pub fn new(config: Config) -> Self {
        let client = ImapClient::new(&config);
        Self { config, client }
    }

    /// Parse one raw RFC 822 message into an `Email`.
    pub fn parse_message(uid: u32, raw: &[u8]) -> AppResult<Email> {
        let parsed = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| AppError::Fetch(format!("failed to parse message {}", uid)))?;

        Ok(Email {
            uid,
            from: EmailParser::parse_from_address(&parsed),
            subject: EmailParser::parse_subject(&parsed),
            date: EmailParser::parse_date(&parsed),
            message_id: EmailParser::parse_message_id(&parsed),
            attachments: AttachmentHandler::extract_attachments(&parsed),
        })
    }
}

#[async_trait]
impl MailboxService for EmailFetcher {
    async fn connect(&mut self) -> AppResult<()> {
        self.client.connect().await
    }

    /// Select the configured mailbox, search UNSEEN, fetch and parse each hit,
    /// and return only the emails carrying at least one attachment.
    ///
    /// When mark-as-read is enabled the fetch itself sets `\Seen`, so a
    /// zero-attachment message is still fetched (and flagged) even though it
    /// is excluded from the result. An empty UNSEEN search is success with an
    /// empty list, not an error. A parse failure of any single message fails
    /// the whole fetch.
    async fn fetch_unseen_with_attachments(&mut self) -> AppResult<Vec<Email>> {
        let read_only = !self.config.mark_as_read && !self.config.delete_after_processing;
        self.client
            .select_mailbox(&self.config.mailbox, read_only)
            .await?;

        let ids = self.client.search_unseen().await?;
        if ids.is_empty() {
            info!("No unread emails found");
            return Ok(Vec::new());
        }

        info!("Found {} unread email(s)", ids.len());
        let peek = !self.config.mark_as_read;
        let mut emails = Vec::new();

        for id in ids {
            let raw = self
                .client
                .fetch_raw(id, peek)
                .await?
                .ok_or_else(|| AppError::Fetch(format!("no data returned for message {}", id)))?;

            let email = Self::parse_message(id, &raw)?;
            if email.attachments.is_empty() {
                info!("Message {} has no attachments, skipping", id);
                continue;
            }
            emails.push(email);
        }

        info!("{} email(s) with attachments", emails.len());
        Ok(emails)
    }

    /// Flag a processed message `\Deleted` by UID. Expunge is a separate
    /// step so one cycle removes everything it flagged in a single pass.
    async fn flag_deleted(&mut self, uid: u32) -> AppResult<()> {
        self.client.flag_deleted(uid).await
    }

    async fn expunge(&mut self) -> AppResult<()> {
        self.client.expunge().await
    }

    /// Best-effort close; safe when never connected or already disconnected.
    async fn disconnect(&mut self) {
        self.client.logout().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            user: "recruit@example.com".to_string(),
            password: "secret".to_string(),
            host: "imap.example.com".to_string(),
            port: 993,
            tls: true,
            accept_invalid_certs: false,
            mailbox: "INBOX".to_string(),
            check_interval_ms: 60_000,
            mark_as_read: true,
            delete_after_processing: false,
            api_url: None,
            api_key: None,
        }
    }

    const RAW_WITH_ATTACHMENTS: &str = concat!(
        "From: Alice Martin <alice@example.com>\r\n",
        "To: recruit@example.com\r\n",
        "Subject: Application for backend role\r\n",
        "Date: Mon, 10 Mar 2025 10:00:00 +0000\r\n",
        "Message-ID: <msg-1@example.com>\r\n",
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/mixed; boundary=\"b1\"\r\n",
        "\r\n",
        "--b1\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "Please find my CV attached.\r\n",
        "--b1\r\n",
        "Content-Type: application/pdf; name=\"cv.pdf\"\r\n",
        "Content-Disposition: attachment; filename=\"cv.pdf\"\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "JVBERi0xLjQK\r\n",
        "--b1\r\n",
        "Content-Type: image/jpeg; name=\"photo.jpg\"\r\n",
        "Content-Disposition: attachment; filename=\"photo.jpg\"\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "/9j/4AAQ\r\n",
        "--b1--\r\n",
    );

    const RAW_WITHOUT_ATTACHMENTS: &str = concat!(
        "From: bob@example.com\r\n",
        "To: recruit@example.com\r\n",
        "Subject: Question about the role\r\n",
        "Date: Mon, 10 Mar 2025 11:00:00 +0000\r\n",
        "Message-ID: <msg-2@example.com>\r\n",
        "\r\n",
        "Is the position still open?\r\n",
    );

    #[test]
    fn test_parse_message_with_attachments() {
        let email = EmailFetcher::parse_message(7, RAW_WITH_ATTACHMENTS.as_bytes()).unwrap();

        assert_eq!(email.uid, 7);
        assert_eq!(email.from, "Alice Martin <alice@example.com>");
        assert_eq!(email.subject, "Application for backend role");
        assert!(email.date.starts_with("2025-03-10T10:00:00"));
        assert_eq!(email.message_id, "msg-1@example.com");

        assert_eq!(email.attachments.len(), 2);
        assert_eq!(email.attachments[0].filename, "cv.pdf");
        assert_eq!(email.attachments[0].content_type, "application/pdf");
        assert_eq!(email.attachments[0].data, b"%PDF-1.4\n");
        assert_eq!(email.attachments[0].size, 9);
        assert_eq!(email.attachments[1].filename, "photo.jpg");
    }

    #[test]
    fn test_parse_message_without_attachments() {
        let email = EmailFetcher::parse_message(8, RAW_WITHOUT_ATTACHMENTS.as_bytes()).unwrap();

        assert_eq!(email.from, "bob@example.com");
        assert!(email.attachments.is_empty());
    }

    #[test]
    fn test_parse_message_defaults_missing_headers() {
        let email =
            EmailFetcher::parse_message(9, b"To: recruit@example.com\r\n\r\nbody only\r\n")
                .unwrap();

        assert_eq!(email.from, "");
        assert_eq!(email.subject, "");
        assert_eq!(email.message_id, "");
        // Falls back to "now" rather than an empty date.
        assert!(!email.date.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_safe() {
        let mut fetcher = EmailFetcher::new(test_config());
        fetcher.disconnect().await;
        // Idempotent: a second disconnect is also a no-op.
        fetcher.disconnect().await;
    }
}
