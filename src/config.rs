use rand::RngCore;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session_secret: Vec<u8>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 8080,
        };

        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ => {
                log::warn!(
                    "SESSION_SECRET is not set; sessions will not survive a server restart"
                );
                let mut secret = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                secret.to_vec()
            }
        };

        Ok(Config {
            database_url,
            host,
            port,
            session_secret,
        })
    }
}
