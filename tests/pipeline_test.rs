//! Pipeline test: parse two unseen messages, keep only the one with
//! attachments, filter the CV candidates, and forward through a mock
//! endpoint. Mirrors a cycle without a live IMAP server.

use async_trait::async_trait;
use cv_relay::core::error::AppResult;
use cv_relay::services::api::ForwardService;
use cv_relay::services::email::attachment::AttachmentHandler;
use cv_relay::services::email::fetcher::{Email, EmailFetcher, EmailMetadata};
use std::sync::Mutex;

const MESSAGE_A: &str = concat!(
    "From: Alice Martin <alice@example.com>\r\n",
    "To: recruit@example.com\r\n",
    "Subject: Application for backend role\r\n",
    "Date: Mon, 10 Mar 2025 10:00:00 +0000\r\n",
    "Message-ID: <msg-a@example.com>\r\n",
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

const MESSAGE_B: &str = concat!(
    "From: bob@example.com\r\n",
    "To: recruit@example.com\r\n",
    "Subject: Question about the role\r\n",
    "Date: Mon, 10 Mar 2025 11:00:00 +0000\r\n",
    "Message-ID: <msg-b@example.com>\r\n",
    "\r\n",
    "Is the position still open?\r\n",
);

struct RecordingForwarder {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ForwardService for RecordingForwarder {
    async fn send(
        &self,
        attachment: &cv_relay::services::email::attachment::Attachment,
        metadata: &EmailMetadata,
    ) -> AppResult<serde_json::Value> {
        self.sent
            .lock()
            .unwrap()
            .push((attachment.filename.clone(), metadata.from.clone()));
        Ok(serde_json::json!({ "processed": true }))
    }
}

#[tokio::test]
async fn test_two_message_mailbox_forwards_single_cv() {
    // Fetch side: parse both messages, keep only those with attachments.
    let parsed: Vec<Email> = [(1u32, MESSAGE_A), (2u32, MESSAGE_B)]
        .iter()
        .map(|(uid, raw)| EmailFetcher::parse_message(*uid, raw.as_bytes()).unwrap())
        .collect();
    let with_attachments: Vec<Email> = parsed
        .into_iter()
        .filter(|e| !e.attachments.is_empty())
        .collect();

    assert_eq!(with_attachments.len(), 1);
    let email = &with_attachments[0];
    assert_eq!(email.message_id, "msg-a@example.com");
    assert_eq!(email.attachments.len(), 2);

    // Filter side: only the allowlisted suffix survives.
    let metadata = EmailMetadata::of(email);
    let cv_attachments: Vec<_> = email
        .attachments
        .iter()
        .filter(|a| AttachmentHandler::is_cv_attachment(&a.filename))
        .cloned()
        .collect();

    let names: Vec<_> = cv_attachments.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(names, ["cv.pdf"]);

    // Forward side: exactly one invocation, one result, metadata attached.
    let forwarder = RecordingForwarder {
        sent: Mutex::new(Vec::new()),
    };
    let results = forwarder.send_all(&cv_attachments, &metadata).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].filename, "cv.pdf");
    assert!(results[0].success);

    let sent = forwarder.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "cv.pdf");
    assert_eq!(sent[0].1, "Alice Martin <alice@example.com>");
}
