use crate::components::digest::run_once;
use crate::components::google_calendar::{
    AuthorizationToken, FileCredentialStore, GoogleCalendarClient, InstalledAppFlow, TokenManager,
};
use crate::components::pushbullet::{Notifier, PushbulletClient};
use crate::config::Config;
use crate::error::{config_error, other_error, AppResult, Error};
use reqwest::Client;
use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Overrides the directory the program runs from
pub const HOME_ENV: &str = "SCHEDULE_NOTIFIER_HOME";

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Run from the executable's directory so `.env`, `token.json` and `credentials.json` resolve there
pub fn enter_home_dir() -> AppResult<PathBuf> {
    let home = match env::var_os(HOME_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => env::current_exe()?
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| other_error("Executable has no parent directory"))?,
    };

    env::set_current_dir(&home)?;
    Ok(home)
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Token manager backed by the token file and the browser consent flow
pub fn token_manager(
    config: &Config,
    client: &Client,
) -> AppResult<TokenManager<FileCredentialStore, InstalledAppFlow>> {
    let seed = config
        .preprovisioned_token
        .as_deref()
        .map(AuthorizationToken::from_json)
        .transpose()
        .map_err(|e| config_error(&format!("G_TOKEN is not a valid token: {}", e)))?;

    Ok(TokenManager::new(
        FileCredentialStore::new(&config.token_path),
        InstalledAppFlow::new(&config.client_secrets_path, client.clone()),
        client.clone(),
    )
    .with_seed(seed))
}

/// One full fetch-format-push cycle
pub async fn run(config: Config) -> AppResult<()> {
    let client = Client::new();

    let pushbullet = PushbulletClient::new(
        client.clone(),
        &config.pushbullet_api_url,
        &config.pushbullet_token,
    );
    let notifier = Notifier::connect(pushbullet).await?;

    let token = token_manager(&config, &client)?
        .obtain_valid_credential()
        .await?;

    debug!("Reading primary calendar of {}", config.google_calendar_id);
    let calendar = GoogleCalendarClient::new(client, &config.calendar_api_url, &token)?;

    let today = config.today();
    info!("Building schedule for {}", today);
    let digest = run_once(&calendar, &notifier, today).await?;
    debug!("Sent digest:\n{}", digest);

    Ok(())
}
