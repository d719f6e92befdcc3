use crate::error::{config_error, env_error, AppResult};
use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Default location of the persisted OAuth token
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Default location of the OAuth client secrets downloaded from Google Cloud
pub const DEFAULT_CLIENT_SECRETS_PATH: &str = "credentials.json";

/// Public Google Calendar v3 endpoint
pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Public Pushbullet v2 endpoint
pub const DEFAULT_PUSHBULLET_API_URL: &str = "https://api.pushbullet.com/v2";

/// Locations of the OAuth files, shared by the notifier and the token binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPaths {
    pub token_path: PathBuf,
    pub client_secrets_path: PathBuf,
}

impl CredentialPaths {
    /// Read `TOKEN_PATH` and `CLIENT_SECRETS_PATH` from the environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            token_path: path_or("TOKEN_PATH", DEFAULT_TOKEN_PATH),
            client_secrets_path: path_or("CLIENT_SECRETS_PATH", DEFAULT_CLIENT_SECRETS_PATH),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Pushbullet access token
    pub pushbullet_token: String,
    /// Google Calendar ID of the account (events are read from its primary calendar)
    pub google_calendar_id: String,
    /// Pre-provisioned authorized-user token JSON, used when no token file exists
    pub preprovisioned_token: Option<String>,
    /// Where the OAuth token is persisted
    pub token_path: PathBuf,
    /// OAuth client secrets, only read during consent
    pub client_secrets_path: PathBuf,
    /// Timezone used to decide what "today" is; system local time when unset
    pub timezone: Option<Tz>,
    /// Base URL of the Google Calendar API
    pub calendar_api_url: String,
    /// Base URL of the Pushbullet API
    pub pushbullet_api_url: String,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if it exists
    pub fn load() -> AppResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Required values
        let pushbullet_token = lookup("PB_TOKEN")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| env_error("PB_TOKEN"))?;
        let google_calendar_id = lookup("GCAL_ID")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| env_error("GCAL_ID"))?;

        let preprovisioned_token = lookup("G_TOKEN").filter(|v| !v.trim().is_empty());

        let CredentialPaths {
            token_path,
            client_secrets_path,
        } = CredentialPaths::from_lookup(&lookup);

        let timezone = match lookup("TIMEZONE").filter(|v| !v.is_empty()) {
            Some(name) => Some(
                name.parse::<Tz>()
                    .map_err(|_| config_error(&format!("Unknown TIMEZONE: {}", name)))?,
            ),
            None => None,
        };

        let calendar_api_url = lookup("GOOGLE_CALENDAR_API_URL")
            .unwrap_or_else(|| DEFAULT_CALENDAR_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let pushbullet_api_url = lookup("PUSHBULLET_API_URL")
            .unwrap_or_else(|| DEFAULT_PUSHBULLET_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            pushbullet_token,
            google_calendar_id,
            preprovisioned_token,
            token_path,
            client_secrets_path,
            timezone,
            calendar_api_url,
            pushbullet_api_url,
        })
    }

    /// The current date in the configured timezone
    pub fn today(&self) -> NaiveDate {
        match self.timezone {
            Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
            None => Local::now().date_naive(),
        }
    }
}
