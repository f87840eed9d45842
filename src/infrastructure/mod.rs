pub mod imap;
pub mod logging;
