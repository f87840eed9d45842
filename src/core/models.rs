use serde::{Deserialize, Serialize};

/// A stored IMAP account credential.
///
/// `encrypted_password` is the opaque token produced by the credential
/// cipher; the plaintext password is never stored or logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub encrypted_password: String,
}

impl CredentialRecord {
    pub fn new(host: String, port: u16, user: String, encrypted_password: String) -> Self {
        Self {
            host,
            port,
            user,
            encrypted_password,
        }
    }
}
