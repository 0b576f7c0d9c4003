use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use async_imap::Session;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_native_tls::{TlsConnector, TlsStream};
use tracing::{info, warn};

/// An established IMAP session, TLS-wrapped or plaintext depending on
/// configuration. Dispatch happens once per operation via `with_session!`.
pub enum ImapSession {
    Tls(Session<TlsStream<TcpStream>>),
    Plain(Session<TcpStream>),
}

macro_rules! with_session {
    ($session:expr, $s:ident => $body:block) => {
        match $session {
            ImapSession::Tls($s) => $body,
            ImapSession::Plain($s) => $body,
        }
    };
}

/// Low-level IMAP client owning at most one session at a time.
/// Connection and login failures map to `AppError::Connection`; everything
/// after a successful login maps to `AppError::Fetch`. No internal retry,
/// the caller decides what a failed cycle means.
pub struct ImapClient {
    host: String,
    port: u16,
    user: String,
    password: String,
    tls: bool,
    accept_invalid_certs: bool,
    session: Option<ImapSession>,
}

impl ImapClient {
    pub fn new(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            password: config.password.clone(),
            tls: config.tls,
            accept_invalid_certs: config.accept_invalid_certs,
            session: None,
        }
    }

    pub async fn connect(&mut self) -> AppResult<()> {
        if self.session.is_some() {
            return Ok(());
        }

        info!("Connecting to IMAP server {}:{}", self.host, self.port);
        let tcp_stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| AppError::Connection(format!("TCP connect failed: {}", e)))?;

        let session = if self.tls {
            let native_tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(self.accept_invalid_certs)
                .build()
                .map_err(|e| {
                    AppError::Connection(format!("failed to create TLS connector: {}", e))
                })?;
            let connector = TlsConnector::from(native_tls);

            let tls_stream = connector
                .connect(&self.host, tcp_stream)
                .await
                .map_err(|e| AppError::Connection(format!("TLS handshake failed: {}", e)))?;

            let client = async_imap::Client::new(tls_stream);
            let session = client
                .login(&self.user, &self.password)
                .await
                .map_err(|e| AppError::Connection(format!("IMAP login failed: {}", e.0)))?;
            ImapSession::Tls(session)
        } else {
            let client = async_imap::Client::new(tcp_stream);
            let session = client
                .login(&self.user, &self.password)
                .await
                .map_err(|e| AppError::Connection(format!("IMAP login failed: {}", e.0)))?;
            ImapSession::Plain(session)
        };

        info!("Connected to IMAP server");
        self.session = Some(session);
        Ok(())
    }

    /// Best-effort logout. Safe to call when never connected and after a
    /// previous logout; never fails.
    pub async fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            let result = match session {
                ImapSession::Tls(mut s) => s.logout().await,
                ImapSession::Plain(mut s) => s.logout().await,
            };
            if let Err(e) = result {
                warn!("IMAP logout failed: {}", e);
            }
        }
    }

    /// Select a mailbox, read-only (EXAMINE) or read-write (SELECT).
    pub async fn select_mailbox(&mut self, mailbox: &str, read_only: bool) -> AppResult<()> {
        let session = self.session_mut()?;
        with_session!(session, s => {
            let result = if read_only {
                s.examine(mailbox).await
            } else {
                s.select(mailbox).await
            };
            result
                .map(|_| ())
                .map_err(|e| AppError::Fetch(format!("failed to select mailbox {}: {}", mailbox, e)))
        })
    }

    /// Search for unseen messages. UID search, so the identifiers stay valid
    /// while other messages are expunged; returned in ascending order.
    pub async fn search_unseen(&mut self) -> AppResult<Vec<u32>> {
        let session = self.session_mut()?;
        with_session!(session, s => {
            let uids = s
                .uid_search("UNSEEN")
                .await
                .map_err(|e| AppError::Fetch(format!("UNSEEN search failed: {}", e)))?;
            let mut uids: Vec<u32> = uids.into_iter().collect();
            uids.sort_unstable();
            Ok(uids)
        })
    }

    /// Fetch the raw RFC 822 body of one message by UID. A plain fetch
    /// implicitly sets `\Seen`; pass `peek` to leave the flags untouched.
    pub async fn fetch_raw(&mut self, uid: u32, peek: bool) -> AppResult<Option<Vec<u8>>> {
        let query = if peek { "BODY.PEEK[]" } else { "RFC822" };
        let session = self.session_mut()?;
        with_session!(session, s => {
            let mut fetch_stream = s
                .uid_fetch(uid.to_string(), query)
                .await
                .map_err(|e| AppError::Fetch(format!("failed to fetch message {}: {}", uid, e)))?;

            let mut raw = None;
            while let Some(msg) = fetch_stream.next().await {
                let msg = msg
                    .map_err(|e| AppError::Fetch(format!("failed to read fetch result: {}", e)))?;
                if let Some(body) = msg.body() {
                    raw = Some(body.to_vec());
                }
            }
            Ok(raw)
        })
    }

    /// Flag a message `\Deleted` by UID; it is removed on the next expunge.
    pub async fn flag_deleted(&mut self, uid: u32) -> AppResult<()> {
        let session = self.session_mut()?;
        with_session!(session, s => {
            let mut stream = s
                .uid_store(uid.to_string(), "+FLAGS (\\Deleted)")
                .await
                .map_err(|e| AppError::Fetch(format!("failed to flag message {} deleted: {}", uid, e)))?;
            while let Some(res) = stream.next().await {
                res.map_err(|e| AppError::Fetch(format!("failed to read store result: {}", e)))?;
            }
            Ok(())
        })
    }

    pub async fn expunge(&mut self) -> AppResult<()> {
        let session = self.session_mut()?;
        with_session!(session, s => {
            let stream = s
                .expunge()
                .await
                .map_err(|e| AppError::Fetch(format!("expunge failed: {}", e)))?;
            let mut stream = std::pin::pin!(stream);
            while let Some(res) = stream.next().await {
                res.map_err(|e| AppError::Fetch(format!("failed to read expunge result: {}", e)))?;
            }
            Ok(())
        })
    }

    fn session_mut(&mut self) -> AppResult<&mut ImapSession> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::Connection("IMAP session not connected".to_string()))
    }
}
