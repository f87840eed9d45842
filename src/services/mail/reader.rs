use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::services::mail::message::MailMessage;

/// Default cap on messages returned by a single unseen fetch.
pub const DEFAULT_FETCH_LIMIT: usize = 50;

/// Read and flag operations over one open mailbox connection.
///
/// A reader owns its connection for the lifetime of the logical operation
/// that created it and must not be shared between concurrent operations.
#[async_trait]
pub trait MailboxReader: Send {
    /// Fetch up to `limit` unseen INBOX messages, fully parsed.
    ///
    /// The connection is closed on completion, success or error; zero
    /// unseen messages resolve to an empty list.
    async fn fetch_unseen(&mut self, limit: usize) -> AppResult<Vec<MailMessage>>;

    /// Add the `\Seen` flag to a message.
    async fn mark_as_read(&mut self, uid: u32) -> AppResult<()>;

    /// Move a message out of the INBOX into another folder.
    async fn move_to_folder(&mut self, uid: u32, folder: &str) -> AppResult<()>;

    /// Log out and drop the connection. Idempotent.
    async fn close(&mut self) -> AppResult<()>;
}
