use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::services::email::attachment::Attachment;
use crate::services::email::fetcher::EmailMetadata;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{error, info};

/// Outcome of one forward attempt. Failures are data, not control flow.
#[derive(Debug, Clone, Serialize)]
pub struct ForwardResult {
    pub filename: String,
    pub success: bool,
    pub response: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Forwarding endpoint abstraction. `send_all` is provided on top of `send`
/// so every implementation (including test mocks) gets the same sequential,
/// order-preserving, never-failing aggregation.
#[async_trait]
pub trait ForwardService: Send + Sync {
    /// Forward one attachment plus email metadata. Returns the endpoint's
    /// response payload on success.
    async fn send(
        &self,
        attachment: &Attachment,
        metadata: &EmailMetadata,
    ) -> AppResult<serde_json::Value>;

    /// Forward each attachment in order, one at a time. Exactly one
    /// `ForwardResult` per attachment; an individual failure never aborts
    /// the rest.
    async fn send_all(
        &self,
        attachments: &[Attachment],
        metadata: &EmailMetadata,
    ) -> Vec<ForwardResult> {
        let mut results = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            match self.send(attachment, metadata).await {
                Ok(response) => results.push(ForwardResult {
                    filename: attachment.filename.clone(),
                    success: true,
                    response: Some(response),
                    error: None,
                }),
                Err(e) => results.push(ForwardResult {
                    filename: attachment.filename.clone(),
                    success: false,
                    response: None,
                    error: Some(e.to_string()),
                }),
            }
        }
        results
    }
}

/// HTTP client posting attachments as multipart/form-data.
pub struct ApiClient {
    client: reqwest::Client,
    url: Option<String>,
    key: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            // No request timeout: the poll cycle has no per-cycle deadline
            // and attachment bodies are unbounded.
            client: reqwest::Client::new(),
            url: config.api_url.clone(),
            key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl ForwardService for ApiClient {
    async fn send(
        &self,
        attachment: &Attachment,
        metadata: &EmailMetadata,
    ) -> AppResult<serde_json::Value> {
        let url = self.url.as_deref().ok_or_else(|| AppError::Forward {
            status: None,
            message: "forwarding URL not configured".to_string(),
        })?;

        let file_part = Part::bytes(attachment.data.clone())
            .file_name(attachment.filename.clone())
            .mime_str(&attachment.content_type)
            .map_err(|e| AppError::Forward {
                status: None,
                message: format!("invalid content type {}: {}", attachment.content_type, e),
            })?;

        let form = Form::new()
            .part("file", file_part)
            .text("emailFrom", metadata.from.clone())
            .text("emailSubject", metadata.subject.clone())
            .text("emailDate", metadata.date.clone())
            .text("attachmentFilename", attachment.filename.clone())
            .text("attachmentSize", attachment.size.to_string())
            .text("attachmentType", attachment.content_type.clone());

        let mut request = self.client.post(url).multipart(form);
        if let Some(key) = &self.key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| AppError::Forward {
            status: None,
            message: format!("request failed: {}", e),
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!(
                "Error sending attachment \"{}\": HTTP {}",
                attachment.filename,
                status.as_u16()
            );
            return Err(AppError::Forward {
                status: Some(status.as_u16()),
                message: format!("API returned HTTP {}: {}", status.as_u16(), body),
            });
        }

        info!(
            "Successfully sent attachment \"{}\" to API",
            attachment.filename
        );
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }
}
