use anyhow::{Context, Result};
use tracing::warn;

/// Runtime configuration, resolved once at startup from the environment
/// (with `.env` support) and passed into each component explicitly.
#[derive(Clone, Debug)]
pub struct Config {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub tls: bool,
    pub accept_invalid_certs: bool,
    pub mailbox: String,
    pub check_interval_ms: u64,
    pub mark_as_read: bool,
    pub delete_after_processing: bool,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables / .env file
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let config = Self {
            user: Self::env_required("IMAP_USER")?,
            password: Self::env_required("IMAP_PASSWORD")?,
            host: Self::env_required("IMAP_HOST")?,
            port: Self::env_parse("IMAP_PORT", 993)?,
            tls: Self::env_parse("IMAP_TLS", true)?,
            accept_invalid_certs: Self::env_parse("IMAP_ACCEPT_INVALID_CERTS", false)?,
            mailbox: Self::env_or("MAILBOX", "INBOX"),
            check_interval_ms: Self::env_parse("CHECK_INTERVAL", 60_000)?,
            mark_as_read: Self::env_parse("MARK_AS_READ", true)?,
            delete_after_processing: Self::env_parse("DELETE_AFTER_PROCESSING", false)?,
            api_url: std::env::var("API_URL").ok().filter(|v| !v.is_empty()),
            api_key: std::env::var("API_KEY").ok().filter(|v| !v.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Invalid IMAP port: {}", self.port);
        }
        if self.host.is_empty() {
            anyhow::bail!("IMAP host cannot be empty");
        }
        if self.mailbox.is_empty() {
            anyhow::bail!("Mailbox name cannot be empty");
        }
        if self.check_interval_ms == 0 {
            anyhow::bail!("Check interval must be greater than 0");
        }
        if self.check_interval_ms > 3_600_000 {
            warn!(
                "Check interval {} ms is very long (>1 hour), is this intended?",
                self.check_interval_ms
            );
        }
        if self.api_url.is_none() {
            warn!("API_URL not set, attachments cannot be forwarded");
        }

        Ok(())
    }

    /// Read an environment variable or fall back to a default
    fn env_or(key: &str, default: &str) -> String {
        std::env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Read and parse an environment variable, using the default when unset
    fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        match std::env::var(key) {
            Ok(val) => val
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
            Err(_) => Ok(default),
        }
    }

    /// Read a required environment variable
    fn env_required(key: &str) -> Result<String> {
        std::env::var(key).context(format!("{} not set in environment", key))
    }
}
