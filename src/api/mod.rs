pub mod models;
pub mod reminders;
