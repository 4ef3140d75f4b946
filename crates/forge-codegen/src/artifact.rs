//! The generated project: a fixed set of files plus an optional entry point.

use serde::Serialize;

pub const MANIFEST_FILE: &str = "pyproject.toml";
pub const INIT_FILE: &str = "__init__.py";
pub const ENTRY_POINT_FILE: &str = "__main__.py";
pub const ENV_FILE: &str = ".env";
pub const README_FILE: &str = "README.md";

/// One generated file, named relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

impl std::fmt::Display for GeneratedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "--> {}\n{}", self.name, self.content)
    }
}

/// Complete result of one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// `<name>.py`
    pub agent_file: GeneratedFile,
    pub pyproject_file: GeneratedFile,
    pub init_file: GeneratedFile,
    /// Present only when the requirement lists plugins.
    pub main_file: Option<GeneratedFile>,
    pub env_file: GeneratedFile,
    pub readme_file: GeneratedFile,
}

impl Artifact {
    /// All files in a fixed order: agent, manifest, marker, entry point
    /// (if any), environment, readme.
    pub fn files(&self) -> Vec<&GeneratedFile> {
        let mut files = vec![&self.agent_file, &self.pyproject_file, &self.init_file];
        if let Some(ref main) = self.main_file {
            files.push(main);
        }
        files.push(&self.env_file);
        files.push(&self.readme_file);
        files
    }

    pub fn len(&self) -> usize {
        if self.main_file.is_some() {
            6
        } else {
            5
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look a file up by its relative name.
    pub fn get(&self, name: &str) -> Option<&GeneratedFile> {
        self.files().into_iter().find(|f| f.name == name)
    }
}
