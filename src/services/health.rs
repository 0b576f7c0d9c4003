use crate::core::config::Config;
use crate::services::email::fetcher::{EmailFetcher, MailboxService};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

const IMAP_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
const API_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
        }
    }
}

/// Standalone connectivity diagnostics for the mailbox and the API endpoint.
/// Both checks are stateless and independent of each other.
pub struct HealthCheck;

impl HealthCheck {
    /// Attempt an IMAP login under a short deadline. The connection is
    /// released as soon as the outcome is known.
    pub async fn check_imap(config: &Config) -> CheckOutcome {
        let mut fetcher = EmailFetcher::new(config.clone());

        let outcome = match timeout(IMAP_CHECK_TIMEOUT, fetcher.connect()).await {
            Ok(Ok(())) => CheckOutcome::ok("IMAP connection successful"),
            Ok(Err(e)) => CheckOutcome::error(format!("IMAP connection failed: {}", e)),
            Err(_) => CheckOutcome::error("IMAP connection timeout"),
        };

        fetcher.disconnect().await;
        outcome
    }

    /// Probe the forwarding endpoint's origin (scheme + host, not the full
    /// path). Any HTTP status counts as reachable; only transport failure is
    /// an error. A missing URL is a warning, not an error.
    pub async fn check_api(config: &Config) -> CheckOutcome {
        let Some(api_url) = config.api_url.as_deref() else {
            return CheckOutcome::warning("API URL not configured");
        };

        let origin = match reqwest::Url::parse(api_url) {
            Ok(url) => url.origin().ascii_serialization(),
            Err(e) => return CheckOutcome::error(format!("invalid API URL: {}", e)),
        };

        let client = reqwest::Client::new();
        match client
            .get(&origin)
            .timeout(API_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                CheckOutcome::ok(format!("API reachable (HTTP {})", response.status().as_u16()))
            }
            Err(e) => CheckOutcome::error(format!("API unreachable: {}", e)),
        }
    }

    /// Run both checks, log a human-readable report, and return overall
    /// pass/fail. Warnings do not fail the check.
    pub async fn check_all(config: &Config) -> bool {
        info!("Running health checks");

        info!("Checking IMAP connection...");
        let imap = Self::check_imap(config).await;
        Self::report("IMAP", &imap);

        info!("Checking API connection...");
        let api = Self::check_api(config).await;
        Self::report("API", &api);

        Self::overall(&imap, &api)
    }

    fn overall(imap: &CheckOutcome, api: &CheckOutcome) -> bool {
        imap.status != CheckStatus::Error && api.status != CheckStatus::Error
    }

    fn report(name: &str, outcome: &CheckOutcome) {
        match outcome.status {
            CheckStatus::Ok => info!("{}: {}", name, outcome.message),
            CheckStatus::Warning => warn!("{}: {}", name, outcome.message),
            CheckStatus::Error => error!("{}: {}", name, outcome.message),
        }
    }
}
