pub mod client;
pub mod models;
pub mod notifier;

pub use client::{PushService, PushbulletClient};
pub use models::Device;
pub use notifier::Notifier;
