pub mod api;
pub mod health;
pub mod messaging;
pub mod reminder;
pub mod templates;
