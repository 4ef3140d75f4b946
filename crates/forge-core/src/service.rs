//! The front-end service contract.
//!
//! Every pluggable front-end (HTTP server, chat bot poller, ...) implements
//! [`Service`]. The [`Application`](crate::application::Application) drives
//! services through their two-phase lifecycle.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Lifecycle state of a single service, as tracked by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl ServiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by a service while starting or stopping.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type ServiceResult = Result<(), ServiceError>;

/// A long-lived front-end with a start/stop lifecycle.
///
/// `start` must return once serving has been handed off to a background
/// task; it must not block for the lifetime of the service. `stop` must be
/// safe to call when `start` was never called or failed, and calling it a
/// second time is a no-op.
#[async_trait]
pub trait Service: Send {
    /// Short name used in logs and error reports.
    fn name(&self) -> &str;

    /// Begin serving.
    async fn start(&mut self) -> ServiceResult;

    /// Request shutdown and wait until resources are released.
    async fn stop(&mut self) -> ServiceResult;
}
