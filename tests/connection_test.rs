use mail_onboard::core::config::CipherConfig;
use mail_onboard::core::models::CredentialRecord;
use mail_onboard::infrastructure::imap::test_imap_connection;
use mail_onboard::services::mail::CredentialCipher;

fn test_cipher() -> CredentialCipher {
    let config = CipherConfig::from_hex(&"a".repeat(64), &"b".repeat(32)).unwrap();
    CredentialCipher::new(&config)
}

fn record_for(cipher: &CredentialCipher, host: &str, port: u16) -> CredentialRecord {
    CredentialRecord::new(
        host.to_string(),
        port,
        "user@example.com".to_string(),
        cipher.encrypt("password123").unwrap(),
    )
}

#[tokio::test]
async fn test_refused_port_resolves_false() {
    let cipher = test_cipher();
    // Nothing listens on port 1, the connect is refused immediately.
    let record = record_for(&cipher, "127.0.0.1", 1);
    assert!(!test_imap_connection(&cipher, &record).await);
}

#[tokio::test]
async fn test_unresolvable_host_resolves_false() {
    let cipher = test_cipher();
    // The .invalid TLD never resolves.
    let record = record_for(&cipher, "imap.nonexistent-server.invalid", 993);
    assert!(!test_imap_connection(&cipher, &record).await);
}

#[tokio::test]
async fn test_undecryptable_token_resolves_false() {
    let cipher = test_cipher();
    let record = CredentialRecord::new(
        "imap.gmail.com".to_string(),
        993,
        "user@example.com".to_string(),
        "deadbeef:deadbeef".to_string(),
    );
    // Fails before any network I/O and still only reports false.
    assert!(!test_imap_connection(&cipher, &record).await);
}

#[tokio::test]
async fn test_token_from_other_deployment_resolves_false() {
    let cipher = test_cipher();
    let other = CredentialCipher::new(
        &CipherConfig::from_hex(&"c".repeat(64), &"d".repeat(32)).unwrap(),
    );
    let record = CredentialRecord::new(
        "imap.gmail.com".to_string(),
        993,
        "user@example.com".to_string(),
        other.encrypt("password123").unwrap(),
    );
    assert!(!test_imap_connection(&cipher, &record).await);
}
