//! Bot settings.

use std::time::Duration;

use forge_core::ServiceError;

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram Bot API settings.
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
    /// Long-poll window passed to `getUpdates`.
    pub poll_timeout: Duration,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Read `TELEGRAM_TOKEN` and the optional `TELEGRAM_API_URL`.
    pub fn from_env() -> Result<Self, ServiceError> {
        let token = std::env::var("TELEGRAM_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ServiceError::Config("TELEGRAM_TOKEN is not set".to_string()))?;

        let mut config = Self::new(token);
        if let Some(url) = std::env::var("TELEGRAM_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            config.api_url = url;
        }
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ServiceError> {
        if self.token.trim().is_empty() {
            return Err(ServiceError::Config(
                "Telegram bot token is empty".to_string(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(ServiceError::Config(
                "Telegram API URL is empty".to_string(),
            ));
        }
        Ok(())
    }
}

// The token is a credential; keep it out of debug output.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}
