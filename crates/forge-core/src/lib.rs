//! Forge Core Library
//!
//! Requirement model, service lifecycle orchestration and the agent
//! contract shared by the generator and the front-end services.

pub mod agent;
pub mod application;
pub mod error;
pub mod requirement;
pub mod service;
pub mod signal;

pub use agent::{Agent, AgentError, ModelAgent, ModelConfig};
pub use application::{AppState, Application, ServiceFailure, StopReport};
pub use error::{ForgeError, ForgeResult};
pub use requirement::model::{McpServer, Requirement, ValidatedRequirement};
pub use service::{Service, ServiceError, ServiceResult, ServiceState};
pub use signal::shutdown_signal;
