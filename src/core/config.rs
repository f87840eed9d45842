use crate::core::error::{AppError, AppResult};

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;
/// Salt length in bytes, bound to every token as associated data
pub const SALT_LEN: usize = 16;

const SECRET_VAR: &str = "IMAP_ENCRYPT_SECRET";
const SALT_VAR: &str = "IMAP_ENCRYPT_SALT";

/// Key material for the credential cipher.
///
/// Passed explicitly into [`CredentialCipher::new`] so tests can inject
/// deterministic keys instead of reading ambient process state.
///
/// [`CredentialCipher::new`]: crate::services::mail::cipher::CredentialCipher::new
#[derive(Clone)]
pub struct CipherConfig {
    key: [u8; KEY_LEN],
    salt: [u8; SALT_LEN],
}

impl std::fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherConfig")
            .field("key", &"<redacted>")
            .field("salt", &"<redacted>")
            .finish()
    }
}

impl CipherConfig {
    pub fn new(key: [u8; KEY_LEN], salt: [u8; SALT_LEN]) -> Self {
        Self { key, salt }
    }

    /// Build from hex-encoded key and salt strings.
    pub fn from_hex(key_hex: &str, salt_hex: &str) -> AppResult<Self> {
        Ok(Self {
            key: decode_fixed(key_hex, SECRET_VAR)?,
            salt: decode_fixed(salt_hex, SALT_VAR)?,
        })
    }

    /// Load from `IMAP_ENCRYPT_SECRET` and `IMAP_ENCRYPT_SALT` environment
    /// variables (a `.env` file is honored). Missing or malformed values are
    /// a configuration error.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let key_hex = env_required(SECRET_VAR)?;
        let salt_hex = env_required(SALT_VAR)?;
        Self::from_hex(&key_hex, &salt_hex)
    }

    pub(crate) fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    pub(crate) fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }
}

fn env_required(key: &str) -> AppResult<String> {
    std::env::var(key).map_err(|_| AppError::Config(format!("{} not set", key)))
}

fn decode_fixed<const N: usize>(hex_str: &str, name: &str) -> AppResult<[u8; N]> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| AppError::Config(format!("{} is not valid hex: {}", name, e)))?;
    bytes.try_into().map_err(|_| {
        AppError::Config(format!("{} must be {} bytes ({} hex chars)", name, N, N * 2))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_valid() {
        let config = CipherConfig::from_hex(&"a".repeat(64), &"b".repeat(32));
        assert!(config.is_ok());
    }

    #[test]
    fn test_from_hex_wrong_length() {
        let err = CipherConfig::from_hex(&"a".repeat(62), &"b".repeat(32)).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = CipherConfig::from_hex(&"a".repeat(64), &"b".repeat(30)).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_from_hex_not_hex() {
        let err = CipherConfig::from_hex(&"z".repeat(64), &"b".repeat(32)).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let config = CipherConfig::from_hex(&"a".repeat(64), &"b".repeat(32)).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("aaaa"));
        assert!(!rendered.contains("bbbb"));
    }

    #[test]
    fn test_from_env_missing_then_present() {
        // Single test so the env mutations cannot race each other.
        std::env::remove_var(SECRET_VAR);
        std::env::remove_var(SALT_VAR);
        let err = CipherConfig::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        std::env::set_var(SECRET_VAR, "a".repeat(64));
        std::env::set_var(SALT_VAR, "b".repeat(32));
        assert!(CipherConfig::from_env().is_ok());

        std::env::remove_var(SECRET_VAR);
        std::env::remove_var(SALT_VAR);
    }
}
