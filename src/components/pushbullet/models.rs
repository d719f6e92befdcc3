use serde::{Deserialize, Serialize};

/// A device registered to the Pushbullet account
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub iden: String,
    #[serde(default)]
    pub nickname: Option<String>,
    /// Deleted devices stay in the listing with `active: false`
    #[serde(default)]
    pub active: bool,
}

impl Device {
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.iden)
    }
}

#[derive(Debug, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Body of `POST /pushes` for a note
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotePush<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'a str,
    pub body: &'a str,
    pub device_iden: &'a str,
}

impl<'a> NotePush<'a> {
    pub fn new(device_iden: &'a str, title: &'a str, body: &'a str) -> Self {
        Self {
            kind: "note",
            title,
            body,
            device_iden,
        }
    }
}

/// Error envelope returned by the Pushbullet API
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
