//! The Telegram bot as a lifecycle-managed service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use forge_core::{Agent, Service, ServiceError, ServiceResult};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{Message, TelegramApi};
use crate::config::TelegramConfig;

/// Pause before polling again after a transport error.
const RETRY_BACKOFF: Duration = Duration::from_secs(3);

/// What to do with one inbound message.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Reply(String),
    Chat(String),
    Ignore,
}

fn route(message: &Message) -> Action {
    let Some(text) = message.text.as_deref().map(str::trim) else {
        return Action::Ignore;
    };
    if text.is_empty() {
        return Action::Ignore;
    }

    if let Some(command) = text.strip_prefix('/') {
        // "/start@my_bot args" addresses the command to a specific bot.
        let command = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();
        return match command {
            "start" => {
                let name = message
                    .from
                    .as_ref()
                    .map(|u| u.first_name.as_str())
                    .unwrap_or("there");
                Action::Reply(format!("Hi {}!", name))
            }
            "help" => Action::Reply("Help!".to_string()),
            _ => Action::Ignore,
        };
    }

    Action::Chat(text.to_string())
}

async fn handle_message(api: &TelegramApi, agent: &dyn Agent, message: &Message) {
    let chat_id = message.chat.id;
    let reply = match route(message) {
        Action::Ignore => return,
        Action::Reply(text) => text,
        Action::Chat(text) => match agent.chat(&chat_id.to_string(), &text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(chat_id, error = %e, "Agent exchange failed");
                return;
            }
        },
    };

    if let Err(e) = api
        .send_message(chat_id, &reply, Some(message.message_id))
        .await
    {
        warn!(chat_id, error = %e, "Failed to deliver reply");
    }
}

async fn poll_updates(api: TelegramApi, agent: Arc<dyn Agent>, cancel: CancellationToken) {
    let mut offset: Option<i64> = None;

    loop {
        let polled = tokio::select! {
            _ = cancel.cancelled() => break,
            polled = api.get_updates(offset) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "Polling failed; retrying");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_BACKOFF) => {}
                }
                continue;
            }
        };

        // The offset sent with the next poll acknowledges everything before
        // it, so it only moves past updates that were fully handled. An
        // update cut off by `stop` is redelivered on the next start.
        for update in updates {
            if let Some(message) = &update.message {
                debug!(update_id = update.update_id, chat_id = message.chat.id, "Telegram message");
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = handle_message(&api, agent.as_ref(), message) => {}
                }
            }
            offset = Some(update.update_id + 1);
        }
    }

    debug!("Telegram polling loop exited");
}

struct RunningBot {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Relays Telegram chats to an agent, one session per chat.
pub struct TelegramBot {
    agent: Arc<dyn Agent>,
    config: TelegramConfig,
    running: Option<RunningBot>,
    username: Option<String>,
}

impl TelegramBot {
    pub fn new(agent: Arc<dyn Agent>, config: TelegramConfig) -> Self {
        Self {
            agent,
            config,
            running: None,
            username: None,
        }
    }

    /// Bot username reported by `getMe`, once started.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

#[async_trait]
impl Service for TelegramBot {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&mut self) -> ServiceResult {
        if self.running.is_some() {
            return Ok(());
        }
        self.config.validate()?;

        let api = TelegramApi::new(&self.config);
        let me = api
            .get_me()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_updates(
            api,
            Arc::clone(&self.agent),
            cancel.clone(),
        ));

        info!(
            agent = self.agent.name(),
            bot = me.username.as_deref().unwrap_or(&me.first_name),
            "Telegram bot polling"
        );
        self.username = me.username;
        self.running = Some(RunningBot { cancel, handle });
        Ok(())
    }

    async fn stop(&mut self) -> ServiceResult {
        let Some(RunningBot { cancel, handle }) = self.running.take() else {
            return Ok(());
        };

        cancel.cancel();
        handle
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?;
        info!("Telegram bot stopped");
        Ok(())
    }
}
