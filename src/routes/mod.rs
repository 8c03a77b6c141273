pub mod auth;
pub mod dashboard;
pub mod health;
pub mod reports;
pub mod resources;
pub mod users;
