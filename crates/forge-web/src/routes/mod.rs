//! Route handlers.

pub mod card;
pub mod rpc;

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
