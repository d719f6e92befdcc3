use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(schedule_notifier::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(schedule_notifier::config))]
    Config(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(
        code(schedule_notifier::authentication),
        help("Delete token.json and run get_calendar_token to authorize again")
    )]
    Authentication(String),

    #[error("Token refresh failed: {0}")]
    #[diagnostic(code(schedule_notifier::token_refresh))]
    TokenRefresh(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(schedule_notifier::calendar_fetch))]
    CalendarFetch(String),

    #[error("No devices registered on the Pushbullet account")]
    #[diagnostic(
        code(schedule_notifier::no_device),
        help("Install Pushbullet on a phone and sign in with the same account")
    )]
    NoDevice,

    #[error("Pushbullet API error: {0}")]
    #[diagnostic(code(schedule_notifier::push))]
    Push(String),

    #[error("Digest delivery failed: {0}")]
    #[diagnostic(code(schedule_notifier::delivery))]
    Delivery(String),

    #[error(transparent)]
    #[diagnostic(code(schedule_notifier::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(schedule_notifier::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(schedule_notifier::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create token refresh errors
pub fn token_refresh_error(message: &str) -> Error {
    Error::TokenRefresh(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn calendar_fetch_error(message: &str) -> Error {
    Error::CalendarFetch(message.to_string())
}

/// Helper to create Pushbullet errors
pub fn push_error(message: &str) -> Error {
    Error::Push(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
