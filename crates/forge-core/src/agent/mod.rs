//! The agent contract front-end services talk to.
//!
//! A service receives an `Arc<dyn Agent>` and translates its own protocol
//! into one `chat` exchange per inbound message.

pub mod model;

use async_trait::async_trait;
use thiserror::Error;

pub use model::{ModelAgent, ModelConfig};

/// Error raised by an agent exchange.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("agent request failed: {0}")]
    Request(String),

    #[error("agent backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("agent returned an empty response")]
    EmptyResponse,

    #[error("agent configuration error: {0}")]
    Config(String),
}

/// A conversational agent reachable by front-end services.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Identifier of the agent, as registered by the generated project.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Send one user message within a session and return the reply text.
    async fn chat(&self, session_id: &str, message: &str) -> Result<String, AgentError>;
}
