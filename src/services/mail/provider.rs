use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Connection preset for a well-known IMAP provider, used to pre-fill
/// onboarding input. Read-only, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPreset {
    pub host: &'static str,
    pub port: u16,
    pub tls: bool,
    pub display_name: &'static str,
}

/// Well-known IMAP providers keyed by hostname.
pub static IMAP_PROVIDERS: Lazy<HashMap<&'static str, ProviderPreset>> = Lazy::new(|| {
    let presets = [
        ProviderPreset {
            host: "imap.gmail.com",
            port: 993,
            tls: true,
            display_name: "Gmail",
        },
        ProviderPreset {
            host: "outlook.office365.com",
            port: 993,
            tls: true,
            display_name: "Outlook / Office 365",
        },
        ProviderPreset {
            host: "imap.mail.yahoo.com",
            port: 993,
            tls: true,
            display_name: "Yahoo Mail",
        },
        ProviderPreset {
            host: "imap.mail.me.com",
            port: 993,
            tls: true,
            display_name: "iCloud Mail",
        },
        ProviderPreset {
            host: "imap.fastmail.com",
            port: 993,
            tls: true,
            display_name: "Fastmail",
        },
        ProviderPreset {
            host: "imap.gemneye.org",
            port: 993,
            tls: true,
            display_name: "Gemneye",
        },
    ];
    presets.into_iter().map(|p| (p.host, p)).collect()
});

/// Look up the preset for a hostname, if one is known.
pub fn lookup(host: &str) -> Option<&'static ProviderPreset> {
    IMAP_PROVIDERS.get(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemneye_preset() {
        let preset = lookup("imap.gemneye.org").unwrap();
        assert_eq!(preset.host, "imap.gemneye.org");
        assert_eq!(preset.port, 993);
        assert!(preset.tls);
    }

    #[test]
    fn test_all_presets_use_tls() {
        assert!(IMAP_PROVIDERS.values().all(|p| p.tls && p.port == 993));
    }

    #[test]
    fn test_unknown_host() {
        assert!(lookup("imap.example.com").is_none());
    }
}
