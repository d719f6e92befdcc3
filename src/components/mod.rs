pub mod digest;
pub mod google_calendar;
pub mod pushbullet;
