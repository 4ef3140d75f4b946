//! Minimal Telegram Bot API client.
//!
//! Every method is a POST with a JSON body to `{api_url}/bot{token}/{method}`
//! and answers with an `{ ok, result, description }` envelope.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::TelegramConfig;

/// Slack added on top of the long-poll window before the HTTP call times out.
const POLL_SLACK: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {method} failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} rejected: {description}")]
    Rejected {
        method: &'static str,
        description: String,
    },
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
}

/// Client bound to a single bot token.
#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramApi {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.token
            ),
            poll_timeout: config.poll_timeout,
        }
    }

    /// Identify the bot; fails when the token is not accepted.
    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.call("getMe", &serde_json::json!({}), REQUEST_TIMEOUT)
            .await
    }

    /// Long-poll for updates newer than `offset`.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, ApiError> {
        let params = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &params, self.poll_timeout + POLL_SLACK)
            .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<Message, ApiError> {
        let params = SendMessage {
            chat_id,
            text,
            reply_to_message_id: reply_to,
        };
        self.call("sendMessage", &params, REQUEST_TIMEOUT).await
    }

    async fn call<P, T>(
        &self,
        method: &'static str,
        params: &P,
        timeout: Duration,
    ) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // reqwest errors carry the URL, which embeds the token.
        let http = |e: reqwest::Error| ApiError::Http {
            method,
            source: e.without_url(),
        };

        debug!(method, "Telegram API call");
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(params)
            .send()
            .await
            .map_err(http)?;

        let envelope: ApiResponse<T> = response.json().await.map_err(http)?;
        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(ApiError::Rejected {
                method,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}
