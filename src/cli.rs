use clap::{Args, Parser, Subcommand};

use mail_onboard::core::error::AppResult;
use mail_onboard::core::models::CredentialRecord;
use mail_onboard::services::mail::CredentialCipher;

#[derive(Parser, Debug)]
#[command(name = "mail-onboard")]
#[command(about = "IMAP account onboarding helper: test, encrypt and read mailbox credentials", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection parameters shared by every account-level subcommand.
#[derive(Args, Debug, Clone)]
pub struct AccountArgs {
    /// IMAP server hostname
    #[arg(long)]
    pub host: String,

    /// IMAP server port
    #[arg(long, default_value = "993")]
    pub port: u16,

    /// Mailbox login name
    #[arg(long)]
    pub user: String,

    /// Mailbox password (encrypted before any further use)
    #[arg(long)]
    pub password: String,
}

impl AccountArgs {
    /// Encrypt the password and build the credential record the rest of
    /// the system operates on.
    pub fn into_record(self, cipher: &CredentialCipher) -> AppResult<CredentialRecord> {
        let encrypted_password = cipher.encrypt(&self.password)?;
        Ok(CredentialRecord::new(
            self.host,
            self.port,
            self.user,
            encrypted_password,
        ))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List well-known IMAP provider presets as JSON
    Providers,

    /// Encrypt a password with the configured cipher secrets
    Encrypt {
        /// Plaintext password to encrypt
        #[arg(long)]
        password: String,
    },

    /// Test an IMAP connection; exits non-zero on failure
    Test {
        #[command(flatten)]
        account: AccountArgs,
    },

    /// Fetch unseen INBOX messages and print them as JSON
    Fetch {
        #[command(flatten)]
        account: AccountArgs,

        /// Maximum number of messages to fetch
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Mark a message as read
    MarkRead {
        #[command(flatten)]
        account: AccountArgs,

        /// Message uid
        #[arg(long)]
        uid: u32,
    },

    /// Move a message to another folder
    Move {
        #[command(flatten)]
        account: AccountArgs,

        /// Message uid
        #[arg(long)]
        uid: u32,

        /// Destination folder name
        #[arg(long)]
        folder: String,
    },
}
