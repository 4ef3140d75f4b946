//! # Forge Codegen
//!
//! Synthesizes runnable agent projects from a requirement.
//!
//! Produces the agent module, manifest, package marker, environment
//! template, readme and, when plugins are requested, an entry point that
//! wires the agent into its front-end services.

pub mod artifact;
pub mod builder;
pub mod consistency;
pub mod persist;
pub mod templates;

pub use artifact::{Artifact, GeneratedFile};
pub use builder::{build, Synthesizer};
pub use consistency::verify_consistency;
pub use persist::write_artifact;
