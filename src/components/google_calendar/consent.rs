use super::token::{AuthorizationToken, TokenResponse, DEFAULT_TOKEN_URI};
use crate::error::{auth_error, AppResult};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tiny_http::{Response, Server, StatusCode};
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// Google's OAuth 2.0 authorization endpoint
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Interactive authorization against the identity provider
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    async fn authorize(&self, scopes: &[&str]) -> AppResult<AuthorizationToken>;
}

/// OAuth client identity from the downloaded `credentials.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google wraps the client under the application type
#[derive(Debug, Deserialize)]
enum ClientSecretsFile {
    #[serde(rename = "installed")]
    Installed(ClientSecrets),
    #[serde(rename = "web")]
    Web(ClientSecrets),
}

impl ClientSecrets {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json)
            .map_err(|e| auth_error(&format!("Invalid client secrets: {}", e)))?;
        Ok(match file {
            ClientSecretsFile::Installed(secrets) | ClientSecretsFile::Web(secrets) => secrets,
        })
    }
}

/// Browser-based consent with a loopback redirect, for desktop OAuth clients
pub struct InstalledAppFlow {
    secrets_path: PathBuf,
    client: Client,
}

impl InstalledAppFlow {
    pub fn new(secrets_path: impl Into<PathBuf>, client: Client) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            client,
        }
    }

    fn load_secrets(&self) -> AppResult<ClientSecrets> {
        let contents = fs::read_to_string(&self.secrets_path).map_err(|e| {
            auth_error(&format!(
                "Cannot read client secrets {}: {}",
                self.secrets_path.display(),
                e
            ))
        })?;
        ClientSecrets::from_json(&contents)
    }
}

#[async_trait]
impl ConsentFlow for InstalledAppFlow {
    async fn authorize(&self, scopes: &[&str]) -> AppResult<AuthorizationToken> {
        let secrets = self.load_secrets()?;

        // Port 0 lets the OS pick a free port
        let server = Server::http("127.0.0.1:0")
            .map_err(|e| auth_error(&format!("Failed to start callback server: {}", e)))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| auth_error("Callback server has no TCP address"))?;
        let redirect_uri = format!("http://127.0.0.1:{}/", port);

        let state = Uuid::new_v4().to_string();
        let auth_url = authorization_url(&secrets, &redirect_uri, scopes, &state)?;

        println!(
            "Please visit this URL to authorize this application: {}",
            auth_url
        );
        if let Err(e) = webbrowser::open(auth_url.as_str()) {
            warn!("Could not open a browser: {}", e);
        }

        info!("Waiting for authorization callback on port {}", port);
        let code = tokio::task::spawn_blocking(move || wait_for_code(&server, &state))
            .await
            .map_err(|e| auth_error(&format!("Callback listener failed: {}", e)))??;

        exchange_code(&self.client, &secrets, &code, &redirect_uri, scopes).await
    }
}

/// Consent screen URL; `access_type=offline` asks for a refresh token
pub fn authorization_url(
    secrets: &ClientSecrets,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
) -> AppResult<Url> {
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scopes.join(" ").as_str()),
            ("state", state),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| auth_error(&format!("Invalid auth_uri: {}", e)))
}

/// Result of inspecting one request to the callback server
#[derive(Debug, PartialEq, Eq)]
pub enum Callback {
    Code(String),
    /// Browser noise such as `/favicon.ico`
    Unrelated,
}

/// Pull the authorization code out of a redirect request path
pub fn parse_callback(request_url: &str, expected_state: &str) -> AppResult<Callback> {
    let url = Url::parse("http://127.0.0.1")
        .and_then(|base| base.join(request_url))
        .map_err(|e| auth_error(&format!("Malformed callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(auth_error(&format!("Authorization denied: {}", error)));
    }
    let Some(code) = code else {
        return Ok(Callback::Unrelated);
    };
    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("Authorization callback state mismatch"));
    }
    Ok(Callback::Code(code))
}

fn wait_for_code(server: &Server, state: &str) -> AppResult<String> {
    loop {
        let request = server
            .recv()
            .map_err(|e| auth_error(&format!("Failed to receive callback: {}", e)))?;

        let outcome = parse_callback(request.url(), state);
        let reply = match &outcome {
            Ok(Callback::Code(_)) => {
                Response::from_string("Authorization successful! You can close this window.")
            }
            Ok(Callback::Unrelated) => {
                Response::from_string("Not found").with_status_code(StatusCode(404))
            }
            Err(e) => Response::from_string(format!("Authorization failed: {}", e))
                .with_status_code(StatusCode(400)),
        };
        if let Err(e) = request.respond(reply) {
            warn!("Failed to answer callback request: {}", e);
        }

        match outcome? {
            Callback::Code(code) => return Ok(code),
            Callback::Unrelated => continue,
        }
    }
}

async fn exchange_code(
    client: &Client,
    secrets: &ClientSecrets,
    code: &str,
    redirect_uri: &str,
    scopes: &[&str],
) -> AppResult<AuthorizationToken> {
    let response = client
        .post(&secrets.token_uri)
        .form(&[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to exchange authorization code: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(auth_error(&format!(
            "Failed to get token: HTTP {} - {}",
            status, error_body
        )));
    }

    let grant: TokenResponse = response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

    let mut token = AuthorizationToken {
        access_token: None,
        refresh_token: None,
        token_uri: secrets.token_uri.clone(),
        client_id: secrets.client_id.clone(),
        client_secret: secrets.client_secret.clone(),
        scopes: Some(scopes.iter().map(|s| s.to_string()).collect()),
        expiry: None,
    };
    token.apply_grant(grant, Utc::now());
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_client_secrets_file_layouts() {
        let installed = r#"{"installed": {
            "client_id": "123.apps.googleusercontent.com",
            "project_id": "schedule",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_secret": "shh",
            "redirect_uris": ["http://localhost"]
        }}"#;
        let secrets = ClientSecrets::from_json(installed).unwrap();
        assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret, "shh");

        let web = r#"{"web": {"client_id": "web-id", "client_secret": "web-secret"}}"#;
        let secrets = ClientSecrets::from_json(web).unwrap();
        assert_eq!(secrets.client_id, "web-id");
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(secrets.auth_uri, DEFAULT_AUTH_URI);

        assert!(matches!(
            ClientSecrets::from_json(r#"{"other": {}}"#),
            Err(Error::Authentication(_))
        ));
    }

    #[test]
    fn test_authorization_url() {
        let secrets = ClientSecrets {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            auth_uri: DEFAULT_AUTH_URI.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        };
        let url = authorization_url(
            &secrets,
            "http://127.0.0.1:4567/",
            &["https://www.googleapis.com/auth/calendar.readonly"],
            "nonce",
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "id".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://127.0.0.1:4567/".into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("state".into(), "nonce".into())));
        assert!(pairs.contains(&(
            "scope".into(),
            "https://www.googleapis.com/auth/calendar.readonly".into()
        )));
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(
            parse_callback("/?state=abc&code=4%2F0Ab&scope=x", "abc").unwrap(),
            Callback::Code("4/0Ab".to_string())
        );
        assert_eq!(
            parse_callback("/favicon.ico", "abc").unwrap(),
            Callback::Unrelated
        );
        assert!(matches!(
            parse_callback("/?state=other&code=123", "abc"),
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            parse_callback("/?error=access_denied&state=abc", "abc"),
            Err(Error::Authentication(ref m)) if m.contains("access_denied")
        ));
    }
}
