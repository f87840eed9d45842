use chrono::{DateTime, Utc};
use serde::Serialize;

/// A decoded attachment extracted from a fetched message.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub content: Vec<u8>,
}

/// A fetched mail message. Produced transiently by the mailbox reader;
/// ownership transfers to the caller, nothing is persisted here.
#[derive(Debug, Clone, Serialize)]
pub struct MailMessage {
    pub uid: u32,
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: DateTime<Utc>,
    pub plain_text: Option<String>,
    pub html_text: Option<String>,
    pub attachments: Vec<Attachment>,
    pub headers: Vec<(String, String)>,
}

impl MailMessage {
    /// A uid-tracked message with every other field at its default, used
    /// when a message body cannot be fetched or parsed.
    pub fn empty(uid: u32) -> Self {
        Self {
            uid,
            message_id: String::new(),
            from: String::new(),
            to: String::new(),
            subject: String::new(),
            date: Utc::now(),
            plain_text: None,
            html_text: None,
            attachments: Vec::new(),
            headers: Vec::new(),
        }
    }
}
