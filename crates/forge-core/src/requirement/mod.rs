//! Requirement parsing, normalization and validation.

pub mod model;

use std::collections::HashSet;
use std::path::Path;

use crate::error::{ForgeError, ForgeResult};
use model::{McpServer, Requirement, ValidatedRequirement};

/// Parse a requirement document from JSON.
///
/// Malformed JSON is reported as a validation error, since the document is
/// user input that never reached synthesis.
pub fn from_json(json: &str) -> ForgeResult<Requirement> {
    serde_json::from_str(json)
        .map_err(|e| ForgeError::validation(format!("malformed requirement document: {}", e)))
}

/// Read and parse a requirement document from disk.
pub fn load(path: &Path) -> ForgeResult<Requirement> {
    let json = std::fs::read_to_string(path)?;
    from_json(&json)
}

/// Normalize a free-text name into a lowercase identifier.
///
/// Whitespace runs collapse to a single underscore.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Validate a requirement and resolve its defaults.
pub fn validate(req: &Requirement) -> ForgeResult<ValidatedRequirement> {
    let name = normalize_name(&req.name);
    if name.is_empty() {
        return Err(ForgeError::validation("requirement name is required"));
    }
    // The name becomes a module, a file name and a package name.
    if !is_identifier(&name) || is_python_keyword(&name) {
        return Err(ForgeError::validation(format!(
            "requirement name '{}' must normalize to an identifier that is not a Python keyword (got '{}')",
            req.name.trim(),
            name
        )));
    }

    let description = req.description.trim();
    if description.is_empty() {
        return Err(ForgeError::validation("requirement description is required"));
    }

    let prompt = match req.prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => description.to_string(),
    };

    let mcp_servers = req.mcp_servers.clone().unwrap_or_default();
    validate_mcp_servers(&mcp_servers)?;

    let plugins = req.plugins.clone().unwrap_or_default();
    validate_plugins(&plugins)?;

    Ok(ValidatedRequirement {
        name,
        display_name: req.name.trim().to_string(),
        description: description.to_string(),
        prompt,
        mcp_servers,
        plugins,
    })
}

fn validate_mcp_servers(servers: &[McpServer]) -> ForgeResult<()> {
    let mut seen = HashSet::new();
    for (i, server) in servers.iter().enumerate() {
        if !is_identifier(&server.name) {
            return Err(ForgeError::validation(format!(
                "mcp_servers[{}]: name '{}' must be an identifier",
                i, server.name
            )));
        }
        if server.url.trim().is_empty() {
            return Err(ForgeError::validation(format!(
                "mcp_servers[{}] ('{}'): url is required",
                i, server.name
            )));
        }
        if !seen.insert(server.name.as_str()) {
            return Err(ForgeError::validation(format!(
                "mcp server '{}' is declared more than once",
                server.name
            )));
        }
    }
    Ok(())
}

fn validate_plugins(plugins: &[String]) -> ForgeResult<()> {
    let mut seen = HashSet::new();
    for plugin in plugins {
        if !is_identifier(plugin) || is_python_keyword(plugin) {
            return Err(ForgeError::validation(format!(
                "plugin '{}' must be an identifier that is not a Python keyword",
                plugin
            )));
        }
        if !seen.insert(plugin.as_str()) {
            return Err(ForgeError::validation(format!(
                "plugin '{}' is listed more than once",
                plugin
            )));
        }
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

fn is_python_keyword(s: &str) -> bool {
    PYTHON_KEYWORDS.contains(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("My Agent"), "my_agent");
        assert_eq!(normalize_name("  Demo \t  Bot\n"), "demo_bot");
        assert_eq!(normalize_name("single"), "single");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let req = from_json(r#"{"description": "no name here"}"#).unwrap();
        let err = validate(&req).unwrap_err();
        assert!(matches!(err, ForgeError::ValidationError(_)));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let req = Requirement::new("  \t ", "desc");
        assert!(matches!(validate(&req), Err(ForgeError::ValidationError(_))));
    }

    #[test]
    fn test_missing_description_is_rejected() {
        let req = Requirement::new("Bot", "");
        assert!(matches!(validate(&req), Err(ForgeError::ValidationError(_))));
    }

    #[test]
    fn test_path_separator_in_name_is_rejected() {
        let req = Requirement::new("../evil", "desc");
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_name_must_normalize_to_identifier() {
        for name in ["Demo-Bot", "3D Bot", "Bot\"x", "class", "From"] {
            let req = Requirement::new(name, "desc");
            assert!(
                matches!(validate(&req), Err(ForgeError::ValidationError(_))),
                "{} should be rejected",
                name
            );
        }

        let v = validate(&Requirement::new("Bot 3D", "desc")).unwrap();
        assert_eq!(v.name, "bot_3d");
    }

    #[test]
    fn test_keyword_plugin_is_rejected() {
        let req = Requirement::new("Bot", "desc").with_plugin("import");
        assert!(matches!(validate(&req), Err(ForgeError::ValidationError(_))));
    }

    #[test]
    fn test_malformed_json_is_validation_error() {
        let err = from_json("{not json").unwrap_err();
        assert!(matches!(err, ForgeError::ValidationError(_)));
    }

    #[test]
    fn test_prompt_defaults_to_description() {
        let v = validate(&Requirement::new("Bot", "Answers questions")).unwrap();
        assert_eq!(v.prompt, "Answers questions");

        let v = validate(&Requirement::new("Bot", "desc").with_prompt("   ")).unwrap();
        assert_eq!(v.prompt, "desc");

        let v = validate(&Requirement::new("Bot", "desc").with_prompt("Be terse.")).unwrap();
        assert_eq!(v.prompt, "Be terse.");
    }

    #[test]
    fn test_null_lists_are_empty() {
        let req = from_json(
            r#"{"name": "Demo Bot", "description": "test", "mcp_servers": null, "plugins": null}"#,
        )
        .unwrap();
        let v = validate(&req).unwrap();
        assert_eq!(v.name, "demo_bot");
        assert_eq!(v.display_name, "Demo Bot");
        assert!(v.mcp_servers.is_empty());
        assert!(v.plugins.is_empty());
    }

    #[test]
    fn test_lists_preserve_input_order() {
        let req = from_json(
            r#"{
                "name": "Ops",
                "description": "ops helper",
                "mcp_servers": [
                    {"name": "search", "url": "http://localhost:9001/sse"},
                    {"name": "github", "url": "http://localhost:9002/sse"}
                ],
                "plugins": ["telegram", "a2a"]
            }"#,
        )
        .unwrap();
        let v = validate(&req).unwrap();
        let names: Vec<_> = v.mcp_servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["search", "github"]);
        assert_eq!(v.plugins, vec!["telegram", "a2a"]);
    }

    #[test]
    fn test_duplicate_plugin_is_rejected() {
        let req = Requirement::new("Bot", "desc")
            .with_plugin("telegram")
            .with_plugin("telegram");
        assert!(matches!(validate(&req), Err(ForgeError::ValidationError(_))));
    }

    #[test]
    fn test_non_identifier_plugin_is_rejected() {
        let req = Requirement::new("Bot", "desc").with_plugin("tele gram");
        assert!(validate(&req).is_err());
        let req = Requirement::new("Bot", "desc").with_plugin("1st");
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_mcp_server_rules() {
        let no_url = Requirement::new("Bot", "desc").with_mcp_server(McpServer::new("search", " "));
        assert!(validate(&no_url).is_err());

        let bad_name = Requirement::new("Bot", "desc")
            .with_mcp_server(McpServer::new("my-search", "http://x/sse"));
        assert!(validate(&bad_name).is_err());

        let dup = Requirement::new("Bot", "desc")
            .with_mcp_server(McpServer::new("search", "http://a/sse"))
            .with_mcp_server(McpServer::new("search", "http://b/sse"));
        assert!(validate(&dup).is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("character.json");
        std::fs::write(&path, r#"{"name": "File Bot", "description": "from disk"}"#).unwrap();

        let req = load(&path).unwrap();
        assert_eq!(req.name, "File Bot");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ForgeError::Io(_)));
    }
}
