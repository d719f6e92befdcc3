use reqwest::Client;
use schedule_notifier::components::google_calendar::token::SCOPES;
use schedule_notifier::components::google_calendar::{
    ConsentFlow, CredentialStore, FileCredentialStore, InstalledAppFlow,
};
use schedule_notifier::config::CredentialPaths;
use schedule_notifier::error::AppResult;
use schedule_notifier::startup;

/// Authorize Google Calendar access once and write the token file.
///
/// Only needs the client secrets, so it can run on a machine with a browser
/// before `PB_TOKEN`/`GCAL_ID` are configured.
#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;
    dotenvy::dotenv().ok();

    authorize().await?;
    Ok(())
}

async fn authorize() -> AppResult<()> {
    let paths = CredentialPaths::from_env();

    println!("Opening browser for Google Calendar authorization...");
    let flow = InstalledAppFlow::new(paths.client_secrets_path, Client::new());
    let token = flow.authorize(SCOPES).await?;

    let store = FileCredentialStore::new(paths.token_path);
    store.save(&token)?;

    println!("Token successfully saved to {}", store.path().display());
    Ok(())
}
