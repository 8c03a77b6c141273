use crate::errors::AppError;
use crate::jwt::JwtConfig;

/// Process configuration gathered from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub const DEFAULT_PORT: u16 = 8000;

    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| AppError::configuration("DATABASE_URL not set"))?;

        Ok(Self {
            database_url,
            port: port_from_env()?,
            jwt: JwtConfig::from_env()?,
        })
    }
}

pub fn port_from_env() -> Result<u16, AppError> {
    match std::env::var("APP_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .map_err(|_| AppError::configuration("APP_PORT must be a valid port number")),
        Err(_) => Ok(AppConfig::DEFAULT_PORT),
    }
}

/// Loads `.env` from the working directory, then the crate-local one.
pub fn load_env() {
    dotenvy::dotenv().ok();
    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if crate_env.exists() {
        dotenvy::from_path(crate_env).ok();
    }
}
