//! Agent backed by an OpenAI-compatible chat-completions endpoint.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Agent, AgentError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Messages kept per session, excluding the system prompt.
const MAX_HISTORY: usize = 20;

/// Sessions kept in memory; the least recently used one is evicted first.
const MAX_SESSIONS: usize = 1024;

/// Model endpoint settings, read from the same keys the generated `.env`
/// template declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_id: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ModelConfig {
    /// Read `MODEL_ID`, `MODEL_BASE_URL` and `MODEL_API_KEY`.
    pub fn from_env() -> Result<Self, AgentError> {
        let model_id = std::env::var("MODEL_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AgentError::Config("MODEL_ID is not set".to_string()))?;
        let base_url = std::env::var("MODEL_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var("MODEL_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            model_id,
            base_url,
            api_key,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Default)]
struct Session {
    history: Vec<ChatMessage>,
    last_used: u64,
}

/// Bounded session store keyed by session id.
#[derive(Default)]
struct Sessions {
    entries: HashMap<String, Session>,
    clock: u64,
}

impl Sessions {
    fn history(&self, session_id: &str) -> Option<&[ChatMessage]> {
        self.entries.get(session_id).map(|s| s.history.as_slice())
    }

    fn touch(&mut self, session_id: &str, capacity: usize) -> &mut Session {
        self.clock += 1;
        if !self.entries.contains_key(session_id) {
            while self.entries.len() >= capacity.max(1) {
                let Some(oldest) = self
                    .entries
                    .iter()
                    .min_by_key(|(_, s)| s.last_used)
                    .map(|(id, _)| id.clone())
                else {
                    break;
                };
                debug!(session_id = %oldest, "Evicting chat session");
                self.entries.remove(&oldest);
            }
        }
        let session = self.entries.entry(session_id.to_string()).or_default();
        session.last_used = self.clock;
        session
    }
}

/// A chat agent with a fixed system prompt and per-session history.
pub struct ModelAgent {
    name: String,
    description: String,
    system_prompt: String,
    config: ModelConfig,
    http_client: reqwest::Client,
    sessions: Mutex<Sessions>,
    max_sessions: usize,
}

impl ModelAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
        config: ModelConfig,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            config,
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            sessions: Mutex::new(Sessions::default()),
            max_sessions: MAX_SESSIONS,
        }
    }

    /// Override how many sessions are remembered at once.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    fn build_messages(&self, session_id: &str, message: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: self.system_prompt.clone(),
        }];
        if let Ok(sessions) = self.sessions.lock() {
            if let Some(history) = sessions.history(session_id) {
                messages.extend(history.iter().cloned());
            }
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });
        messages
    }

    fn remember(&self, session_id: &str, message: &str, reply: &str) {
        let Ok(mut sessions) = self.sessions.lock() else {
            return;
        };
        let history = &mut sessions.touch(session_id, self.max_sessions).history;
        history.push(ChatMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });
        history.push(ChatMessage {
            role: "assistant".to_string(),
            content: reply.to_string(),
        });
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
    }
}

#[async_trait]
impl Agent for ModelAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn chat(&self, session_id: &str, message: &str) -> Result<String, AgentError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let messages = self.build_messages(session_id, message);
        let body = ChatRequest {
            model: &self.config.model_id,
            messages: &messages,
        };

        debug!(agent = %self.name, session_id, turns = messages.len(), "Sending chat request");

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Request(format!("failed to parse response: {}", e)))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(AgentError::EmptyResponse)?;

        self.remember(session_id, message, &reply);
        Ok(reply)
    }
}
