use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};

use crate::core::config::{CipherConfig, SALT_LEN};
use crate::core::error::{AppError, AppResult};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const DELIMITER: char = ':';

/// AES-256-GCM cipher for mailbox passwords.
///
/// Tokens have the shape `hex(nonce || ciphertext) ":" hex(tag)`. A fresh
/// random nonce is generated per call and carried inside the token; the
/// configured salt is bound as associated data, so a token only decrypts
/// under the same deployment secrets that produced it.
pub struct CredentialCipher {
    cipher: Aes256Gcm,
    salt: [u8; SALT_LEN],
}

impl CredentialCipher {
    pub fn new(config: &CipherConfig) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(config.key()));
        Self {
            cipher,
            salt: *config.salt(),
        }
    }

    /// Encrypt a plaintext password into an opaque credential token.
    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &self.salt,
                },
            )
            .map_err(|_| AppError::Crypto("encryption failed".to_string()))?;

        // aes-gcm appends the tag to the ciphertext
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);
        let mut body = nonce.to_vec();
        body.extend_from_slice(ciphertext);

        Ok(format!(
            "{}{}{}",
            hex::encode(body),
            DELIMITER,
            hex::encode(tag)
        ))
    }

    /// Decrypt a credential token back into the plaintext password.
    ///
    /// Fails closed on a malformed token or a tag that does not verify;
    /// corrupted plaintext is never returned.
    pub fn decrypt(&self, token: &str) -> AppResult<String> {
        let mut parts = token.split(DELIMITER);
        let (body_hex, tag_hex) = match (parts.next(), parts.next(), parts.next()) {
            (Some(body), Some(tag), None) if !body.is_empty() && !tag.is_empty() => (body, tag),
            _ => {
                return Err(AppError::Crypto(
                    "malformed credential token".to_string(),
                ))
            }
        };

        let body = hex::decode(body_hex)
            .map_err(|_| AppError::Crypto("credential token is not valid hex".to_string()))?;
        let tag = hex::decode(tag_hex)
            .map_err(|_| AppError::Crypto("credential token is not valid hex".to_string()))?;

        if body.len() < NONCE_LEN || tag.len() != TAG_LEN {
            return Err(AppError::Crypto(
                "credential token has invalid length".to_string(),
            ));
        }

        let (nonce, ciphertext) = body.split_at(NONCE_LEN);
        let mut sealed = ciphertext.to_vec();
        sealed.extend_from_slice(&tag);

        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: &sealed,
                    aad: &self.salt,
                },
            )
            .map_err(|_| {
                AppError::Crypto("authentication tag verification failed".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Crypto("decrypted payload is not valid UTF-8".to_string()))
    }
}
