use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio::time::timeout;
use tokio_native_tls::TlsConnector;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, AppResult};
use crate::core::models::CredentialRecord;
use crate::services::mail::cipher::CredentialCipher;
use crate::services::mail::message::MailMessage;
use crate::services::mail::parser::EmailParser;
use crate::services::mail::reader::MailboxReader;

pub type ImapSession = async_imap::Session<tokio_native_tls::TlsStream<TcpStream>>;

/// Budget for DNS resolution, TCP connect and the TLS handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Budget for the IMAP LOGIN exchange.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(5);

const INBOX: &str = "INBOX";

/// Builds configured IMAP connections from a stored credential record.
///
/// Decrypts the password up front; no I/O happens until [`connect`] or
/// [`test`] is called.
///
/// [`connect`]: ImapConnector::connect
/// [`test`]: ImapConnector::test
pub struct ImapConnector {
    host: String,
    port: u16,
    user: String,
    password: String,
}

impl ImapConnector {
    pub fn from_record(
        cipher: &CredentialCipher,
        record: &CredentialRecord,
    ) -> AppResult<Self> {
        let password = cipher.decrypt(&record.encrypted_password)?;
        Ok(Self {
            host: record.host.clone(),
            port: record.port,
            user: record.user.clone(),
            password,
        })
    }

    /// Open a session and wrap it in a mailbox handle.
    pub async fn connect(&self) -> AppResult<ImapMailbox> {
        let session = self.open_session().await?;
        Ok(ImapMailbox {
            session: Some(session),
        })
    }

    /// Connection test: true if TCP, TLS and LOGIN all succeed within the
    /// configured timeouts, false otherwise. Never returns an error.
    pub async fn test(&self) -> bool {
        match self.open_session().await {
            Ok(mut session) => {
                debug!("IMAP connection test succeeded for {}", self.host);
                if let Err(e) = session.logout().await {
                    warn!("Logout after connection test failed: {}", e);
                }
                true
            }
            Err(e) => {
                info!(
                    "IMAP connection test failed for {}@{}:{}: {}",
                    self.user, self.host, self.port, e
                );
                false
            }
        }
    }

    async fn open_session(&self) -> AppResult<ImapSession> {
        let addr = timeout(CONNECT_TIMEOUT, lookup_host((self.host.as_str(), self.port)))
            .await
            .map_err(|_| {
                AppError::Connection(format!("DNS lookup for {} timed out", self.host))
            })?
            .map_err(|e| AppError::Connection(format!("DNS lookup failed: {}", e)))?
            .next()
            .ok_or_else(|| {
                AppError::Connection(format!("no addresses resolved for {}", self.host))
            })?;

        let tcp = timeout(CONNECT_TIMEOUT, self.open_tcp(addr))
            .await
            .map_err(|_| {
                AppError::Connection(format!(
                    "connect to {}:{} timed out",
                    self.host, self.port
                ))
            })??;

        let connector = TlsConnector::from(native_tls::TlsConnector::builder().build()?);
        let tls_stream = timeout(CONNECT_TIMEOUT, connector.connect(&self.host, tcp))
            .await
            .map_err(|_| {
                AppError::Tls(format!("TLS handshake with {} timed out", self.host))
            })?
            .map_err(|e| AppError::Tls(e.to_string()))?;

        let client = async_imap::Client::new(tls_stream);
        let session = timeout(AUTH_TIMEOUT, client.login(&self.user, &self.password))
            .await
            .map_err(|_| {
                AppError::Connection(format!("login to {} timed out", self.host))
            })?
            .map_err(|(e, _)| AppError::Imap(format!("authentication failed: {}", e)))?;

        debug!("IMAP session established with {}:{}", self.host, self.port);
        Ok(session)
    }

    async fn open_tcp(&self, addr: SocketAddr) -> AppResult<TcpStream> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_keepalive(true)?;
        socket
            .connect(addr)
            .await
            .map_err(|e| AppError::Connection(e.to_string()))
    }
}

/// Test a stored credential record end to end. All failure paths, including
/// an undecryptable token, resolve `false`; the caller only ever sees a
/// boolean, never the failure class.
pub async fn test_imap_connection(
    cipher: &CredentialCipher,
    record: &CredentialRecord,
) -> bool {
    match ImapConnector::from_record(cipher, record) {
        Ok(connector) => connector.test().await,
        Err(e) => {
            warn!(
                "Cannot build connection for {}@{}: {}",
                record.user, record.host, e
            );
            false
        }
    }
}

/// An open IMAP mailbox implementing [`MailboxReader`].
pub struct ImapMailbox {
    session: Option<ImapSession>,
}

impl ImapMailbox {
    fn session_mut(&mut self) -> AppResult<&mut ImapSession> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::Imap("session already closed".to_string()))
    }

    async fn fetch_unseen_inner(&mut self, limit: usize) -> AppResult<Vec<MailMessage>> {
        let session = self.session_mut()?;

        session
            .examine(INBOX)
            .await
            .map_err(|e| AppError::Imap(format!("failed to open INBOX: {}", e)))?;

        // UID SEARCH returns an unordered set; ascending uid order is the
        // closest stable equivalent of mailbox order.
        let mut uids: Vec<u32> = session
            .uid_search("UNSEEN")
            .await
            .map_err(|e| AppError::Imap(format!("UNSEEN search failed: {}", e)))?
            .into_iter()
            .collect();
        uids.sort_unstable();

        if uids.is_empty() {
            debug!("No unseen messages in INBOX");
            return Ok(Vec::new());
        }
        uids.truncate(limit);

        let sequence_set = uids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        info!("Fetching {} unseen messages", uids.len());

        let mut messages = Vec::with_capacity(uids.len());
        let mut stream = session
            .uid_fetch(&sequence_set, "(UID RFC822)")
            .await
            .map_err(|e| AppError::Imap(format!("fetch failed: {}", e)))?;

        while let Some(fetched) = stream.next().await {
            let fetched = fetched.map_err(|e| AppError::Imap(format!("fetch failed: {}", e)))?;
            let Some(uid) = fetched.uid else {
                warn!("Fetched message without uid, skipping");
                continue;
            };
            // A message is complete only once its body is fully parsed.
            match fetched.body() {
                Some(raw) => messages.push(EmailParser::parse(uid, raw)),
                None => {
                    warn!("No body returned for uid {}", uid);
                    messages.push(MailMessage::empty(uid));
                }
            }
        }

        Ok(messages)
    }
}

#[async_trait]
impl MailboxReader for ImapMailbox {
    async fn fetch_unseen(&mut self, limit: usize) -> AppResult<Vec<MailMessage>> {
        let result = self.fetch_unseen_inner(limit).await;
        if let Err(e) = self.close().await {
            warn!("Logout after fetch failed: {}", e);
        }
        result
    }

    async fn mark_as_read(&mut self, uid: u32) -> AppResult<()> {
        let session = self.session_mut()?;
        session
            .select(INBOX)
            .await
            .map_err(|e| AppError::Imap(format!("failed to select INBOX: {}", e)))?;

        let mut updates = session
            .uid_store(uid.to_string(), "+FLAGS (\\Seen)")
            .await
            .map_err(|e| AppError::Imap(format!("store \\Seen failed: {}", e)))?;
        while let Some(update) = updates.next().await {
            update.map_err(|e| AppError::Imap(format!("store \\Seen failed: {}", e)))?;
        }
        Ok(())
    }

    async fn move_to_folder(&mut self, uid: u32, folder: &str) -> AppResult<()> {
        let session = self.session_mut()?;
        session
            .select(INBOX)
            .await
            .map_err(|e| AppError::Imap(format!("failed to select INBOX: {}", e)))?;

        session
            .uid_mv(uid.to_string(), folder)
            .await
            .map_err(|e| AppError::Imap(format!("move to {} failed: {}", folder, e)))
    }

    async fn close(&mut self) -> AppResult<()> {
        if let Some(mut session) = self.session.take() {
            session
                .logout()
                .await
                .map_err(|e| AppError::Imap(format!("logout failed: {}", e)))?;
        }
        Ok(())
    }
}
