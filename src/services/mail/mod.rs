pub mod cipher;
pub mod message;
pub mod parser;
pub mod provider;
pub mod reader;

pub use cipher::CredentialCipher;
pub use message::{Attachment, MailMessage};
pub use provider::{ProviderPreset, IMAP_PROVIDERS};
pub use reader::{MailboxReader, DEFAULT_FETCH_LIMIT};
