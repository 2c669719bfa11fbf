use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub whatsapp_from: String,
    pub database_url: String,
    pub http_port: u16,
    pub reminder_poll_minutes: u32,
}

fn required(name: &str) -> Result<String> {
    let value = env::var(name).map_err(|_| anyhow!("{} must be set", name))?;

    if value.trim().is_empty() {
        return Err(anyhow!("{} must be set", name));
    }

    Ok(value.trim().to_string())
}

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/reminders.db";

/// `DATABASE_URL`, or the default file database when unset or blank.
///
/// Separate from [`Config::from_env`] so the migrate tool runs without
/// messaging credentials.
pub fn database_url_from_env() -> String {
    match env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => DEFAULT_DATABASE_URL.to_string(),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let twilio_account_sid = required("TWILIO_ACCOUNT_SID")?;
        let twilio_auth_token = required("TWILIO_AUTH_TOKEN")?;
        let whatsapp_from = required("TWILIO_WHATSAPP_FROM")?;

        let database_url = database_url_from_env();

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let poll_str = env::var("REMINDER_POLL_MINUTES")
            .unwrap_or_else(|_| "1".to_string());
        let reminder_poll_minutes = match poll_str.trim().parse::<u32>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => return Err(anyhow!("Invalid REMINDER_POLL_MINUTES")),
        };

        Ok(Config {
            twilio_account_sid,
            twilio_auth_token,
            whatsapp_from,
            database_url,
            http_port,
            reminder_poll_minutes,
        })
    }
}
