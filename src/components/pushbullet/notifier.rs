use super::client::PushService;
use super::models::Device;
use crate::error::{AppResult, Error};
use tracing::{error, info};

/// Title of the digest note
pub const DIGEST_TITLE: &str = "Schedule";

/// Title of notes reporting a failed run step
pub const ERROR_TITLE: &str = "Schedule error";

/// Push context bound to one device, built once at startup
pub struct Notifier<P> {
    service: P,
    device: Device,
}

impl<P: PushService> Notifier<P> {
    /// Select the first active device on the account
    pub async fn connect(service: P) -> AppResult<Self> {
        let device = service
            .list_devices()
            .await?
            .into_iter()
            .find(|device| device.active)
            .ok_or(Error::NoDevice)?;

        info!("Pushing to device {}", device.display_name());
        Ok(Self { service, device })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Clear earlier pushes, then send the digest; both steps always run
    pub async fn push_digest(&self, message: &str) -> AppResult<()> {
        let cleared = self.service.delete_all_pushes().await;
        if let Err(e) = &cleared {
            error!("Failed to clear previous pushes: {}", e);
        }

        let sent = self
            .service
            .push_note(&self.device.iden, DIGEST_TITLE, message)
            .await;
        if let Err(e) = &sent {
            error!("Failed to send digest: {}", e);
        }

        match (cleared, sent) {
            (Ok(()), Ok(())) => {
                info!("Digest pushed to {}", self.device.display_name());
                Ok(())
            }
            (Err(clear), Ok(())) => Err(Error::Delivery(format!(
                "digest sent, but clearing previous pushes failed: {}",
                clear
            ))),
            (Ok(()), Err(send)) => Err(Error::Delivery(format!(
                "previous pushes cleared, but sending failed: {}",
                send
            ))),
            (Err(clear), Err(send)) => Err(Error::Delivery(format!(
                "clearing failed: {}; sending failed: {}",
                clear, send
            ))),
        }
    }

    /// Best-effort note describing a failure
    pub async fn push_error(&self, message: &str) -> AppResult<()> {
        self.service
            .push_note(&self.device.iden, ERROR_TITLE, message)
            .await
    }
}
