//! Application state.

use forge_core::Agent;
use std::sync::Arc;

use crate::routes::card::AgentCard;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn Agent>,
    pub card: Arc<AgentCard>,
}

impl AppState {
    pub fn new(agent: Arc<dyn Agent>, url: String) -> Self {
        let card = AgentCard::for_agent(agent.as_ref(), url);
        Self {
            agent,
            card: Arc::new(card),
        }
    }
}
