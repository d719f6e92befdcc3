use super::consent::ConsentFlow;
use super::store::CredentialStore;
use crate::error::{auth_error, token_refresh_error, AppResult, Error};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Read-only access to calendars
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// Scopes requested during consent
pub const SCOPES: &[&str] = &[CALENDAR_READONLY_SCOPE];

/// Google's OAuth 2.0 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 10;

/// Persisted OAuth credential, in Google's authorized-user JSON layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationToken {
    #[serde(rename = "token", default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl AuthorizationToken {
    /// Parse an authorized-user JSON document
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize back to the authorized-user layout
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Access token for the `Authorization: Bearer` header
    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => Duration::try_seconds(EXPIRY_SKEW_SECS)
                .and_then(|skew| expiry.checked_sub_signed(skew))
                .map_or(true, |deadline| deadline <= now),
            None => false,
        }
    }

    /// Whether the recorded scopes cover `scope`; tokens without a scope record are trusted
    pub fn has_scope(&self, scope: &str) -> bool {
        match &self.scopes {
            Some(scopes) => scopes.iter().any(|s| s == scope),
            None => true,
        }
    }

    /// Fold a token endpoint response into this credential
    pub fn apply_grant(&mut self, grant: TokenResponse, now: DateTime<Utc>) {
        self.access_token = Some(grant.access_token);
        // Lifetimes chrono cannot represent leave the expiry unknown
        self.expiry = grant
            .expires_in
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));
        // Google only returns a refresh token on the first exchange
        if let Some(refresh_token) = grant.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = grant.scope {
            self.scopes = Some(scope.split_whitespace().map(str::to_string).collect());
        }
    }
}

/// Body of a successful token endpoint call
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// What to do with the stored credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    Reuse,
    Refresh,
    Consent,
}

/// Decide between reusing, refreshing or re-consenting
pub fn plan_token_action(token: Option<&AuthorizationToken>, now: DateTime<Utc>) -> TokenAction {
    let Some(token) = token else {
        return TokenAction::Consent;
    };

    if !SCOPES.iter().all(|scope| token.has_scope(scope)) {
        return TokenAction::Consent;
    }

    let valid = token.access_token.as_deref().is_some_and(|t| !t.is_empty())
        && !token.is_expired(now);
    if valid {
        return TokenAction::Reuse;
    }

    match token.refresh_token.as_deref() {
        Some(refresh_token) if !refresh_token.is_empty() => TokenAction::Refresh,
        _ => TokenAction::Consent,
    }
}

/// Exchange a refresh token for a new access token
pub async fn refresh_token(
    client: &Client,
    token: &AuthorizationToken,
) -> AppResult<AuthorizationToken> {
    let refresh_token = token
        .refresh_token
        .as_deref()
        .ok_or_else(|| token_refresh_error("No refresh token in token data"))?;

    let params = [
        ("client_id", token.client_id.as_str()),
        ("client_secret", token.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let response = client
        .post(&token.token_uri)
        .form(&params)
        .send()
        .await
        .map_err(|e| token_refresh_error(&format!("Failed to refresh token: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(token_refresh_error(&format!(
            "HTTP {} - {}",
            status, error_body
        )));
    }

    let grant: TokenResponse = response
        .json()
        .await
        .map_err(|e| token_refresh_error(&format!("Failed to parse token response: {}", e)))?;

    let mut refreshed = token.clone();
    refreshed.apply_grant(grant, Utc::now());
    Ok(refreshed)
}

/// Owns the token lifecycle: load, refresh or re-consent, persist
pub struct TokenManager<S, C> {
    store: S,
    consent: C,
    client: Client,
    seed: Option<AuthorizationToken>,
}

impl<S: CredentialStore, C: ConsentFlow> TokenManager<S, C> {
    pub fn new(store: S, consent: C, client: Client) -> Self {
        Self {
            store,
            consent,
            client,
            seed: None,
        }
    }

    /// Token to fall back on when the store is empty
    pub fn with_seed(mut self, seed: Option<AuthorizationToken>) -> Self {
        self.seed = seed;
        self
    }

    /// Return a usable credential, refreshing or re-authorizing as needed
    pub async fn obtain_valid_credential(&self) -> AppResult<AuthorizationToken> {
        let stored = match self.store.load() {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                if self.seed.is_some() {
                    debug!("No stored token, using pre-provisioned token");
                }
                self.seed.clone()
            }
            Err(Error::Serialization(e)) => {
                warn!("Stored token is corrupt, authorizing again: {}", e);
                None
            }
            Err(e) => return Err(auth_error(&format!("Failed to read stored token: {}", e))),
        };

        let token = match (plan_token_action(stored.as_ref(), Utc::now()), stored) {
            (TokenAction::Reuse, Some(token)) => {
                debug!("Reusing stored token");
                return Ok(token);
            }
            (TokenAction::Refresh, Some(token)) => {
                info!("Access token expired, refreshing");
                match refresh_token(&self.client, &token).await {
                    Ok(refreshed) => refreshed,
                    Err(e) => {
                        warn!("{}, falling back to consent", e);
                        self.consent.authorize(SCOPES).await?
                    }
                }
            }
            _ => {
                info!("No usable token, starting consent flow");
                self.consent.authorize(SCOPES).await?
            }
        };

        self.store.save(&token)?;
        Ok(token)
    }
}
