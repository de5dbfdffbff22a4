use crate::infrastructure::security::{DEFAULT_ACTIONS_PER_HOUR, DEFAULT_ACTIONS_PER_MINUTE};
use qa_errors::AppError;
use std::net::SocketAddr;
use std::str::FromStr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs in demo mode on the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub actions_per_minute: u32,
    pub actions_per_hour: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;
        let actions_per_minute =
            parse_or(&lookup, "VOTE_LIMIT_PER_MINUTE", Some(DEFAULT_ACTIONS_PER_MINUTE))?;
        let actions_per_hour =
            parse_or(&lookup, "VOTE_LIMIT_PER_HOUR", Some(DEFAULT_ACTIONS_PER_HOUR))?;

        Ok(Self {
            database_url,
            bind_addr,
            actions_per_minute,
            actions_per_hour,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: Option<T>) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("{} has an invalid value: {}", key, raw))),
        None => default.ok_or_else(|| AppError::InvalidInput(format!("{} must be set", key))),
    }
}
