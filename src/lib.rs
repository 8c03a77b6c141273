pub mod app;
pub mod authz;
pub mod config;
pub mod db;
pub mod docs;
pub mod errors;
pub mod extract;
pub mod filters;
pub mod jwt;
pub mod models;
pub mod reports;
pub mod routes;
pub mod seed;
pub mod service;
pub mod utils;

// Re-export commonly used items for tests
pub use app::{create_app, router, AppState};
