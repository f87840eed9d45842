use chrono::{DateTime, Utc};
use mail_parser::{Message, MessageParser, MimeHeaders};
use tracing::warn;

use crate::services::mail::message::{Attachment, MailMessage};

/// Turns a raw RFC822 byte stream into a structured [`MailMessage`].
pub struct EmailParser;

impl EmailParser {
    /// Parse a fetched message body.
    ///
    /// A MIME parse failure is logged and yields a uid-tracked message with
    /// its body fields unset; a single broken message never aborts a batch.
    pub fn parse(uid: u32, raw: &[u8]) -> MailMessage {
        match MessageParser::default().parse(raw) {
            Some(parsed) => Self::from_parsed(uid, raw, &parsed),
            None => {
                warn!("Failed to MIME-parse message uid {}, keeping uid only", uid);
                MailMessage::empty(uid)
            }
        }
    }

    fn from_parsed(uid: u32, raw: &[u8], parsed: &Message) -> MailMessage {
        MailMessage {
            uid,
            message_id: parsed.message_id().unwrap_or("").to_string(),
            from: Self::first_address(parsed.from()),
            to: Self::first_address(parsed.to()),
            subject: parsed.subject().unwrap_or("").to_string(),
            date: Self::parse_date(parsed),
            plain_text: parsed.body_text(0).map(|t| t.to_string()),
            html_text: parsed.body_html(0).map(|t| t.to_string()),
            attachments: Self::extract_attachments(parsed),
            headers: Self::raw_headers(raw, parsed),
        }
    }

    /// First address of an address header, or empty string.
    fn first_address(list: Option<&mail_parser::Address>) -> String {
        list.and_then(|l| l.first())
            .and_then(|a| a.address.as_ref())
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    /// Message date, defaulting to the current time when absent or invalid.
    fn parse_date(parsed: &Message) -> DateTime<Utc> {
        parsed
            .date()
            .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0))
            .unwrap_or_else(Utc::now)
    }

    /// Extract decoded attachments from all non-text parts.
    fn extract_attachments(parsed: &Message) -> Vec<Attachment> {
        let mut attachments = Vec::new();

        for part in &parsed.parts {
            if part.is_text() {
                continue;
            }

            if let Some(filename) = part.attachment_name() {
                let content_type = part
                    .content_type()
                    .map(|ct| {
                        if let Some(subtype) = ct.subtype() {
                            format!("{}/{}", ct.c_type, subtype)
                        } else {
                            ct.c_type.to_string()
                        }
                    })
                    .unwrap_or_else(|| {
                        mime_guess::from_path(filename)
                            .first_or_octet_stream()
                            .to_string()
                    });

                let content = part.contents().to_vec();
                attachments.push(Attachment {
                    filename: filename.to_string(),
                    content_type,
                    size: content.len(),
                    content,
                });
            }
        }

        attachments
    }

    /// Raw header block as (name, value) pairs, in on-the-wire order.
    fn raw_headers(raw: &[u8], parsed: &Message) -> Vec<(String, String)> {
        parsed
            .headers()
            .iter()
            .filter_map(|h| {
                let span = raw.get(h.offset_start() as usize..h.offset_end() as usize)?;
                let value = String::from_utf8_lossy(span).trim().to_string();
                Some((h.name().to_string(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Message-ID: <abc123@example.com>\r\n\
From: Alice <alice@example.com>\r\n\
To: bob@example.com\r\n\
Subject: Quarterly invoice\r\n\
Date: Tue, 01 Jul 2025 10:00:00 +0000\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"outer\"\r\n\
\r\n\
--outer\r\n\
Content-Type: multipart/alternative; boundary=\"inner\"\r\n\
\r\n\
--inner\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Hi Bob, invoice attached.\r\n\
--inner\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>Hi Bob, invoice attached.</p>\r\n\
--inner--\r\n\
--outer\r\n\
Content-Type: application/pdf; name=\"invoice.pdf\"\r\n\
Content-Disposition: attachment; filename=\"invoice.pdf\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0xLjQ=\r\n\
--outer--\r\n";

    #[test]
    fn test_parse_scalar_fields() {
        let msg = EmailParser::parse(7, SAMPLE.as_bytes());

        assert_eq!(msg.uid, 7);
        assert_eq!(msg.message_id, "abc123@example.com");
        assert_eq!(msg.from, "alice@example.com");
        assert_eq!(msg.to, "bob@example.com");
        assert_eq!(msg.subject, "Quarterly invoice");
        assert_eq!(msg.date.to_rfc3339(), "2025-07-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_bodies() {
        let msg = EmailParser::parse(7, SAMPLE.as_bytes());

        assert!(msg
            .plain_text
            .as_deref()
            .unwrap()
            .contains("Hi Bob, invoice attached."));
        assert!(msg.html_text.unwrap().contains("<p>Hi Bob"));
    }

    #[test]
    fn test_parse_attachment() {
        let msg = EmailParser::parse(7, SAMPLE.as_bytes());

        assert_eq!(msg.attachments.len(), 1);
        let att = &msg.attachments[0];
        assert_eq!(att.filename, "invoice.pdf");
        assert_eq!(att.content_type, "application/pdf");
        assert_eq!(att.content, b"%PDF-1.4");
        assert_eq!(att.size, att.content.len());
    }

    #[test]
    fn test_parse_headers_block() {
        let msg = EmailParser::parse(7, SAMPLE.as_bytes());

        let subject = msg
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("subject"));
        assert_eq!(subject.map(|(_, v)| v.as_str()), Some("Quarterly invoice"));
    }

    #[test]
    fn test_missing_headers_default() {
        let raw = b"\r\nbody only\r\n";
        let msg = EmailParser::parse(3, raw);

        assert_eq!(msg.uid, 3);
        assert_eq!(msg.from, "");
        assert_eq!(msg.to, "");
        assert_eq!(msg.subject, "");
        assert_eq!(msg.message_id, "");
        // date defaults to roughly now
        assert!((Utc::now() - msg.date).num_seconds().abs() < 60);
    }

    #[test]
    fn test_unparseable_input_keeps_uid() {
        let msg = EmailParser::parse(9, &[]);
        assert_eq!(msg.uid, 9);
        assert!(msg.plain_text.is_none());
        assert!(msg.html_text.is_none());
        assert!(msg.attachments.is_empty());
    }
}
