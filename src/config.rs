use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::NaiveTime;
use tracing::info;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_token: String,
    pub from: String,
}

impl MailConfig {
    /// All three variables must be set for mail delivery to be enabled.
    pub fn new_from_env() -> Option<Self> {
        let api_url = env::var("MAIL_API_URL").ok()?;
        let api_token = env::var("MAIL_API_TOKEN").ok()?;
        let from = env::var("MAIL_FROM").ok()?;

        Some(Self {
            api_url,
            api_token,
            from,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub scheduler_enabled: bool,
    pub reminder_time: NaiveTime,
    pub mail: Option<MailConfig>,
}

impl Config {
    pub fn new_from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://streakify.db".to_string());

        let reminder_time = env::var("REMINDER_TIME").unwrap_or_else(|_| "20:00".to_string());
        let reminder_time = NaiveTime::parse_from_str(&reminder_time, "%H:%M")
            .map_err(|e| AppError::Config(format!("Invalid REMINDER_TIME {reminder_time}: {e}")))?;

        Ok(Self {
            database_url,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:3000")?,
            scheduler_enabled: try_load("SCHEDULER_ENABLED", "true")?,
            reminder_time,
            mail: MailConfig::new_from_env(),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| AppError::Config(format!("Invalid {key} value {raw}: {e}")))
}
