//! Turns a requirement into a complete agent project.
//!
//! Synthesis is pure: the same requirement always yields byte-identical
//! files. Nothing here touches the filesystem; see [`crate::persist`].

use std::error::Error as _;

use forge_core::requirement::validate;
use forge_core::{ForgeError, ForgeResult, Requirement, ValidatedRequirement};
use tera::{Context, Tera};
use tracing::debug;

use crate::artifact::{
    Artifact, GeneratedFile, ENTRY_POINT_FILE, ENV_FILE, INIT_FILE, MANIFEST_FILE, README_FILE,
};
use crate::consistency::verify_consistency;
use crate::templates::{self, ENV_CONTENT, PROJECT_VERSION};

/// Renders agent projects from a fixed set of templates.
pub struct Synthesizer {
    tera: Tera,
}

impl Synthesizer {
    pub fn new() -> ForgeResult<Self> {
        Ok(Self {
            tera: templates::registry()?,
        })
    }

    /// Validate `req` and render its artifact.
    pub fn build(&self, req: &Requirement) -> ForgeResult<Artifact> {
        let spec = validate(req)?;
        self.build_validated(&spec)
    }

    /// Render the artifact for an already validated requirement.
    pub fn build_validated(&self, spec: &ValidatedRequirement) -> ForgeResult<Artifact> {
        let mut context = Context::new();
        context.insert("name", &spec.name);
        context.insert("description", &spec.description);
        context.insert("prompt", &spec.prompt);
        context.insert("mcp_servers", &spec.mcp_servers);
        context.insert("plugins", &spec.plugins);
        context.insert("version", PROJECT_VERSION);

        let agent_file = GeneratedFile::new(
            format!("{}.py", spec.name),
            self.render(templates::AGENT, &context)?,
        );
        let pyproject_file =
            GeneratedFile::new(MANIFEST_FILE, self.render(templates::MANIFEST, &context)?);
        let init_file = GeneratedFile::new(INIT_FILE, "");

        let main_file = if spec.has_plugins() {
            Some(GeneratedFile::new(
                ENTRY_POINT_FILE,
                self.render(templates::ENTRY_POINT, &context)?,
            ))
        } else {
            None
        };

        let env_file = GeneratedFile::new(ENV_FILE, ENV_CONTENT);
        let readme_file =
            GeneratedFile::new(README_FILE, self.render(templates::README, &context)?);

        let artifact = Artifact {
            agent_file,
            pyproject_file,
            init_file,
            main_file,
            env_file,
            readme_file,
        };
        verify_consistency(&artifact, spec)?;

        debug!(
            agent = %spec.name,
            files = artifact.len(),
            mcp_servers = spec.mcp_servers.len(),
            plugins = spec.plugins.len(),
            "Synthesized agent project"
        );
        Ok(artifact)
    }

    fn render(&self, template: &str, context: &Context) -> ForgeResult<String> {
        self.tera.render(template, context).map_err(|e| {
            let mut msg = format!("{}: {}", template, e);
            let mut source = e.source();
            while let Some(cause) = source {
                msg.push_str(&format!(": {}", cause));
                source = cause.source();
            }
            ForgeError::render(msg)
        })
    }
}

/// Validate and synthesize with a fresh template registry.
pub fn build(req: &Requirement) -> ForgeResult<Artifact> {
    Synthesizer::new()?.build(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::McpServer;

    fn synth() -> Synthesizer {
        Synthesizer::new().unwrap()
    }

    fn with_servers() -> Requirement {
        Requirement::new("Research Agent", "Finds things")
            .with_mcp_server(McpServer::new("search", "http://localhost:9001/sse"))
            .with_mcp_server(McpServer::new("github", "http://localhost:9002/sse"))
    }

    #[test]
    fn test_demo_bot_without_plugins() {
        let req = Requirement::new("Demo Bot", "test");
        let artifact = synth().build(&req).unwrap();

        assert!(artifact.main_file.is_none());
        assert_eq!(artifact.files().len(), 5);
        assert_eq!(artifact.len(), 5);
        assert_eq!(artifact.agent_file.name, "demo_bot.py");
        assert!(artifact.readme_file.content.contains("demo_bot"));
        assert!(artifact.readme_file.content.contains("test"));
        assert_eq!(artifact.init_file.content, "");
        assert_eq!(artifact.init_file.name, "__init__.py");
    }

    #[test]
    fn test_build_is_deterministic() {
        let req = with_servers().with_plugin("a2a").with_plugin("telegram");
        let first = synth().build(&req).unwrap();
        let second = synth().build(&req).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_name_is_normalized_everywhere() {
        let req = Requirement::new("My   Agent", "does things").with_plugin("a2a");
        let artifact = synth().build(&req).unwrap();

        assert_eq!(artifact.agent_file.name, "my_agent.py");
        assert!(artifact
            .agent_file
            .content
            .contains("my_agent = AgentSpec(\"my_agent\", new(Agent))"));
        assert!(artifact.pyproject_file.content.contains("name = \"my_agent\""));
        let main = artifact.main_file.unwrap();
        assert!(main.content.contains("from my_agent import my_agent"));
        assert!(!main.content.contains("My Agent"));
    }

    #[test]
    fn test_non_identifier_names_never_reach_templates() {
        for name in ["Demo-Bot", "3D Bot", "Bot\"x", "class"] {
            let req = Requirement::new(name, "d").with_plugin("a2a");
            assert!(
                matches!(synth().build(&req), Err(ForgeError::ValidationError(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_single_telegram_plugin_is_referenced_once() {
        let req = Requirement::new("Demo Bot", "test").with_plugin("telegram");
        let artifact = synth().build(&req).unwrap();

        assert_eq!(artifact.files().len(), 6);
        let main = artifact.main_file.as_ref().expect("entry point");
        assert_eq!(main.name, "__main__.py");
        assert_eq!(main.content.matches("telegram").count(), 1);
        assert!(!main.content.contains("a2a"));
    }

    #[test]
    fn test_plugins_referenced_in_order() {
        let req = Requirement::new("Demo Bot", "test")
            .with_plugin("telegram")
            .with_plugin("a2a");
        let main = synth().build(&req).unwrap().main_file.unwrap().content;

        assert_eq!(main.matches("telegram").count(), 1);
        assert_eq!(main.matches("a2a").count(), 1);
        let telegram = main.find("telegram").unwrap();
        let a2a = main.find("a2a").unwrap();
        assert!(telegram < a2a);
        assert!(main.contains("plugin_0.Plugin(runtime, demo_bot)"));
        assert!(main.contains("plugin_1.Plugin(runtime, demo_bot)"));
    }

    #[test]
    fn test_no_mcp_wiring_without_servers() {
        let req = Requirement::new("Plain", "no tools").with_plugin("a2a");
        let artifact = synth().build(&req).unwrap();

        assert!(!artifact.agent_file.content.contains("mcp_server"));
        assert!(!artifact.agent_file.content.contains("NamedMCPServer"));
        let main = artifact.main_file.unwrap().content;
        assert!(!main.contains("mcp_server"));
    }

    #[test]
    fn test_mcp_servers_declared_in_order() {
        let artifact = synth().build(&with_servers()).unwrap();
        let agent = &artifact.agent_file.content;

        assert_eq!(agent.matches("NamedMCPServer(").count(), 2);
        let search = agent.find("name=\"search\"").unwrap();
        let github = agent.find("name=\"github\"").unwrap();
        assert!(search < github);
        assert!(agent.contains("url=\"http://localhost:9001/sse\""));
        assert!(agent.contains("mcp_server_agent = AgentSpec(\"mcp_server\", new(MCPServer))"));
        assert!(agent.contains("mcp_server_agent_type = mcp_server_agent.name"));
    }

    #[test]
    fn test_entry_point_shares_mcp_wiring() {
        let req = with_servers().with_plugin("a2a");
        let main = synth().build(&req).unwrap().main_file.unwrap().content;

        assert!(main.contains("from research_agent import research_agent, mcp_server_agent"));
        assert!(main.contains("await runtime.register(mcp_server_agent)"));
        let search = main.find("#   - search").unwrap();
        let github = main.find("#   - github").unwrap();
        assert!(search < github);
    }

    #[test]
    fn test_manifest_ignores_plugins_and_servers() {
        let plain = synth().build(&Requirement::new("Bot", "desc")).unwrap();
        let full = synth()
            .build(
                &Requirement::new("Bot", "desc")
                    .with_plugin("a2a")
                    .with_mcp_server(McpServer::new("search", "http://x/sse")),
            )
            .unwrap();

        assert_eq!(plain.pyproject_file, full.pyproject_file);
        assert!(plain.pyproject_file.content.contains("version = \"0.1.0\""));
        assert!(plain.pyproject_file.content.contains("description = \"desc\""));
        assert_eq!(plain.readme_file, full.readme_file);
        assert_eq!(plain.env_file, full.env_file);
    }

    #[test]
    fn test_prompt_falls_back_to_description() {
        let artifact = synth().build(&Requirement::new("Bot", "Answers questions")).unwrap();
        assert!(artifact
            .agent_file
            .content
            .contains("system = \"Answers questions\""));

        let artifact = synth()
            .build(&Requirement::new("Bot", "desc").with_prompt("Be brief."))
            .unwrap();
        assert!(artifact.agent_file.content.contains("system = \"Be brief.\""));
    }

    #[test]
    fn test_quotes_in_free_text_are_escaped() {
        let req = Requirement::new("Bot", r#"Says "hello""#).with_prompt("line one\nline two");
        let artifact = synth().build(&req).unwrap();

        assert!(artifact
            .pyproject_file
            .content
            .contains(r#"description = "Says \"hello\"""#));
        assert!(artifact
            .agent_file
            .content
            .contains(r#"system = "line one\nline two""#));
    }

    #[test]
    fn test_invalid_requirement_is_rejected_before_rendering() {
        let err = synth().build(&Requirement::new("", "desc")).unwrap_err();
        assert!(matches!(err, ForgeError::ValidationError(_)));
    }

    #[test]
    fn test_env_is_placeholder_only() {
        let artifact = synth().build(&Requirement::new("Bot", "desc")).unwrap();
        assert_eq!(artifact.env_file.name, ".env");
        assert!(artifact.env_file.content.contains("MODEL_API_KEY=<your-model-api-key>"));
    }

    #[test]
    fn test_missing_template_parameter_is_render_error() {
        let synth = synth();
        let context = Context::new();
        let err = synth.render(templates::README, &context).unwrap_err();
        assert!(matches!(err, ForgeError::Render(_)));
    }

    #[test]
    fn test_display_prefixes_file_name() {
        let file = GeneratedFile::new("README.md", "# bot\n");
        assert_eq!(file.to_string(), "--> README.md\n# bot\n");
    }
}
