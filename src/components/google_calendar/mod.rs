pub mod client;
pub mod consent;
pub mod models;
pub mod store;
pub mod time;
pub mod token;

pub use client::{CalendarSource, GoogleCalendarClient};
pub use consent::{ConsentFlow, InstalledAppFlow};
pub use models::{CalendarEvent, EventStart};
pub use store::{CredentialStore, FileCredentialStore};
pub use token::{AuthorizationToken, TokenManager};
