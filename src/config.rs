use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::warn;

const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub addr: SocketAddr,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", env::var("DATABASE_MAX_CONNECTIONS").ok(), 5)?;
        let addr = parse_or(
            "AUCTION_ADDR",
            env::var("AUCTION_ADDR").ok(),
            SocketAddr::from(([0, 0, 0, 0], 3000)),
        )?;
        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set, using the development secret");
            DEV_SESSION_SECRET.to_string()
        });
        let ttl_hours: i64 = parse_or("SESSION_TTL_HOURS", env::var("SESSION_TTL_HOURS").ok(), 336)?;

        Ok(Self {
            database_url,
            database_max_connections,
            addr,
            session_secret,
            session_ttl: chrono::Duration::hours(ttl_hours),
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .with_context(|| format!("{name} has an invalid value: {value}")),
    }
}
