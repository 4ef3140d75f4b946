//! Requirement models.

use serde::{Deserialize, Serialize};

/// An external tool server the generated agent may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl McpServer {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// User-supplied description of the agent to scaffold.
///
/// Required fields default to empty strings so that a document missing them
/// is rejected by validation rather than by the JSON layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,
}

impl Requirement {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_mcp_server(mut self, server: McpServer) -> Self {
        self.mcp_servers.get_or_insert_with(Vec::new).push(server);
        self
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugins.get_or_insert_with(Vec::new).push(plugin.into());
        self
    }
}

/// A requirement that passed validation, with every default resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedRequirement {
    /// Normalized identifier (`"My Agent"` becomes `my_agent`).
    pub name: String,
    /// The name as the user wrote it, trimmed.
    pub display_name: String,
    pub description: String,
    /// The system prompt; falls back to the description.
    pub prompt: String,
    pub mcp_servers: Vec<McpServer>,
    pub plugins: Vec<String>,
}

impl ValidatedRequirement {
    pub fn has_mcp_servers(&self) -> bool {
        !self.mcp_servers.is_empty()
    }

    pub fn has_plugins(&self) -> bool {
        !self.plugins.is_empty()
    }
}
