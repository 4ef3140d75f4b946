//! Agent card served at `/.well-known/agent.json`.

use axum::{extract::State, Json};
use forge_core::Agent;
use serde::Serialize;

use crate::state::AppState;

const PROTOCOL_VERSION: &str = "0.2.5";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Self-description of the fronted agent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub protocol_version: String,
    pub capabilities: AgentCapabilities,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
}

impl AgentCard {
    pub fn for_agent(agent: &dyn Agent, url: String) -> Self {
        Self {
            name: agent.name().to_string(),
            description: agent.description().to_string(),
            url,
            version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: AgentCapabilities {
                streaming: false,
                push_notifications: false,
            },
            default_input_modes: vec!["text/plain".to_string()],
            default_output_modes: vec!["text/plain".to_string()],
            skills: vec![AgentSkill {
                id: "chat".to_string(),
                name: "Chat".to_string(),
                description: format!("Converse with {}", agent.name()),
                tags: vec!["chat".to_string()],
            }],
        }
    }
}

pub async fn get_card(State(state): State<AppState>) -> Json<AgentCard> {
    Json((*state.card).clone())
}
