use super::models::{ApiErrorResponse, Device, DeviceList, NotePush};
use crate::error::{push_error, AppResult, Error};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

/// Operations the notifier needs from the push service
#[async_trait]
pub trait PushService: Send + Sync {
    async fn list_devices(&self) -> AppResult<Vec<Device>>;

    /// Deletes every push on the account, not only those sent to one device
    async fn delete_all_pushes(&self) -> AppResult<()>;

    async fn push_note(&self, device_iden: &str, title: &str, body: &str) -> AppResult<()>;
}

/// Pushbullet v2 REST client
#[derive(Clone)]
pub struct PushbulletClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl PushbulletClient {
    pub fn new(client: Client, base_url: &str, access_token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> AppResult<Response> {
        let response = request
            .header("Access-Token", &self.access_token)
            .send()
            .await
            .map_err(|e| push_error(&format!("Failed to {}: {}", action, e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, action).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl PushService for PushbulletClient {
    async fn list_devices(&self) -> AppResult<Vec<Device>> {
        let response = self
            .send(self.client.get(self.url("devices")), "list devices")
            .await?;
        let list: DeviceList = response
            .json()
            .await
            .map_err(|e| push_error(&format!("Failed to parse device list: {}", e)))?;
        Ok(list.devices)
    }

    async fn delete_all_pushes(&self) -> AppResult<()> {
        self.send(self.client.delete(self.url("pushes")), "delete pushes")
            .await?;
        Ok(())
    }

    async fn push_note(&self, device_iden: &str, title: &str, body: &str) -> AppResult<()> {
        let note = NotePush::new(device_iden, title, body);
        self.send(self.client.post(self.url("pushes")).json(&note), "push note")
            .await?;
        Ok(())
    }
}

async fn error_from_response(response: Response, action: &str) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());

    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|parsed| match (parsed.error.code, parsed.error.message) {
            (Some(code), Some(message)) => Some(format!("{} ({})", message, code)),
            (None, Some(message)) => Some(message),
            (Some(code), None) => Some(code),
            (None, None) => None,
        })
        .unwrap_or(body);

    push_error(&format!("Failed to {}: HTTP {} - {}", action, status, message))
}
