mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use mail_onboard::core::config::CipherConfig;
use mail_onboard::infrastructure::imap::{test_imap_connection, ImapConnector};
use mail_onboard::infrastructure::logging::init_logging;
use mail_onboard::services::mail::{CredentialCipher, MailboxReader, IMAP_PROVIDERS};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("mail-onboard")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Providers => {
            println!("{}", serde_json::to_string_pretty(&*IMAP_PROVIDERS)?);
        }
        Commands::Encrypt { password } => {
            let cipher = load_cipher()?;
            println!("{}", cipher.encrypt(&password)?);
        }
        Commands::Test { account } => {
            let cipher = load_cipher()?;
            let record = account.into_record(&cipher)?;
            info!(
                "Testing IMAP connection to {}:{} for {}",
                record.host, record.port, record.user
            );
            if test_imap_connection(&cipher, &record).await {
                println!("IMAP connection successful");
            } else {
                // Deliberately generic: callers must not learn whether DNS,
                // TLS or the credentials were at fault.
                eprintln!("IMAP connection failed");
                std::process::exit(1);
            }
        }
        Commands::Fetch { account, limit } => {
            let cipher = load_cipher()?;
            let record = account.into_record(&cipher)?;
            let connector = ImapConnector::from_record(&cipher, &record)?;
            let mut mailbox = connector.connect().await?;
            let messages = mailbox.fetch_unseen(limit).await?;
            info!("Fetched {} unseen messages", messages.len());
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
        Commands::MarkRead { account, uid } => {
            let cipher = load_cipher()?;
            let record = account.into_record(&cipher)?;
            let connector = ImapConnector::from_record(&cipher, &record)?;
            let mut mailbox = connector.connect().await?;
            let result = mailbox.mark_as_read(uid).await;
            mailbox.close().await?;
            result?;
            info!("Marked uid {} as read", uid);
        }
        Commands::Move {
            account,
            uid,
            folder,
        } => {
            let cipher = load_cipher()?;
            let record = account.into_record(&cipher)?;
            let connector = ImapConnector::from_record(&cipher, &record)?;
            let mut mailbox = connector.connect().await?;
            let result = mailbox.move_to_folder(uid, &folder).await;
            mailbox.close().await?;
            result?;
            info!("Moved uid {} to {}", uid, folder);
        }
    }

    Ok(())
}

fn load_cipher() -> Result<CredentialCipher> {
    Ok(CredentialCipher::new(&CipherConfig::from_env()?))
}
