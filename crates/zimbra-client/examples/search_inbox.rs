//! Lists recent messages in a folder and saves their attachments.
//!
//! ```text
//! ZIMBRA_URL=https://zimbra.example.net \
//! ZIMBRA_ACCOUNT=user@example.net \
//! ZIMBRA_PASSWORD=secret \
//! RUST_LOG=zimbra_client=debug \
//! cargo run --example search_inbox -- /Inbox ./downloads
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use zimbra_client::{ClientConfig, HttpTransport, SearchOptions, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::var("ZIMBRA_URL").context("ZIMBRA_URL is not set")?;
    let account = std::env::var("ZIMBRA_ACCOUNT").context("ZIMBRA_ACCOUNT is not set")?;
    let password = std::env::var("ZIMBRA_PASSWORD").context("ZIMBRA_PASSWORD is not set")?;

    let mut args = std::env::args().skip(1);
    let folder = args.next().unwrap_or_else(|| "/Inbox".to_string());
    let target = args.next().map(PathBuf::from);

    let config = ClientConfig::new(&url)?;
    let mut session = Session::authenticate(HttpTransport::new(), config, account, &password)
        .await
        .context("login failed")?;

    let options = SearchOptions::new().with_limit(20);
    let messages = session.folder_messages(&folder, &options).await?;
    println!("{} message(s) in {folder}", messages.len());

    for message in &messages {
        println!(
            "{}  {:<30}  {}",
            message.timestamp.as_deref().unwrap_or("-"),
            message.from().first().map_or("-", String::as_str),
            message.subject
        );

        let Some(target) = &target else { continue };
        if message.attachments.is_empty() {
            continue;
        }
        for file in session.download_all(message).await? {
            let path = target.join(format!("{}-{}", message.id, file.attachment.basename));
            tokio::fs::write(&path, &file.payload)
                .await
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("    saved {}", path.display());
        }
    }

    Ok(())
}
