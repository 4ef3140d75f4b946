//! Cross-file consistency checks for a rendered artifact.
//!
//! The entry point must reference exactly the declared plugins, in order,
//! once each, and the MCP wiring must agree between the agent module and the
//! entry point. A violation means the templates drifted from the
//! requirement, so it is reported as a render error.

use forge_core::{ForgeError, ForgeResult, ValidatedRequirement};

use crate::artifact::Artifact;

const PLUGIN_IMPORT: &str = "from coagent_web3.plugins import ";
const SERVER_DECLARATION: &str = "name=\"";
const SERVER_LISTING: &str = "#   - ";
const MCP_REGISTRATION: &str = "await runtime.register(mcp_server_agent)";
const MCP_AGENT_DECLARATION: &str = "mcp_server_agent = AgentSpec(";

/// Verify the cross-file invariants of `artifact` against `spec`.
pub fn verify_consistency(artifact: &Artifact, spec: &ValidatedRequirement) -> ForgeResult<()> {
    let agent = &artifact.agent_file.content;

    let declared = collect_after(agent, SERVER_DECLARATION, '"');
    let expected: Vec<&str> = spec.mcp_servers.iter().map(|s| s.name.as_str()).collect();
    if declared != expected {
        return Err(ForgeError::render(format!(
            "agent file declares MCP servers {:?}, expected {:?}",
            declared, expected
        )));
    }
    if agent.contains(MCP_AGENT_DECLARATION) != spec.has_mcp_servers() {
        return Err(ForgeError::render(
            "agent file MCP server agent does not match the declared servers",
        ));
    }

    let main = match (&artifact.main_file, spec.has_plugins()) {
        (None, false) => return Ok(()),
        (Some(main), true) => &main.content,
        (Some(_), false) => {
            return Err(ForgeError::render("entry point rendered without plugins"));
        }
        (None, true) => {
            return Err(ForgeError::render("plugins declared but entry point is missing"));
        }
    };

    let imported = collect_after(main, PLUGIN_IMPORT, ' ');
    if imported != spec.plugins {
        return Err(ForgeError::render(format!(
            "entry point imports plugins {:?}, expected {:?}",
            imported, spec.plugins
        )));
    }
    for index in 0..spec.plugins.len() {
        let registration = format!("plugin_{}.Plugin(runtime, {})", index, spec.name);
        if main.matches(&registration).count() != 1 {
            return Err(ForgeError::render(format!(
                "entry point must register plugin_{} exactly once",
                index
            )));
        }
    }

    if !main.contains(&format!("await runtime.register({})", spec.name)) {
        return Err(ForgeError::render(format!(
            "entry point does not register agent '{}'",
            spec.name
        )));
    }

    let listed = collect_after(main, SERVER_LISTING, ' ');
    if listed != expected {
        return Err(ForgeError::render(format!(
            "entry point lists MCP servers {:?}, expected {:?}",
            listed, expected
        )));
    }
    if main.contains(MCP_REGISTRATION) != spec.has_mcp_servers() {
        return Err(ForgeError::render(
            "entry point MCP registration does not match the declared servers",
        ));
    }

    Ok(())
}

/// For every line whose trimmed form starts with `prefix`, the token that
/// follows it up to `end`.
fn collect_after<'a>(content: &'a str, prefix: &str, end: char) -> Vec<&'a str> {
    content
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix(prefix))
        .map(|rest| rest.split(end).next().unwrap_or(rest))
        .collect()
}
