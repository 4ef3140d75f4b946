//! The A2A server as a lifecycle-managed service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use forge_core::{Agent, Service, ServiceError, ServiceResult};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::create_router;
use crate::state::AppState;

/// How long `stop` waits for in-flight requests before aborting the server.
const STOP_GRACE: Duration = Duration::from_secs(10);

/// Listener settings for the A2A server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A2aConfig {
    pub host: String,
    pub port: u16,
    /// URL advertised in the agent card; defaults to the bound address.
    pub public_url: Option<String>,
}

impl Default for A2aConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            public_url: None,
        }
    }
}

struct RunningServer {
    cancel: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
}

/// Serves one agent over HTTP until stopped.
pub struct A2aService {
    agent: Arc<dyn Agent>,
    config: A2aConfig,
    running: Option<RunningServer>,
    local_addr: Option<SocketAddr>,
}

impl A2aService {
    pub fn new(agent: Arc<dyn Agent>, config: A2aConfig) -> Self {
        Self {
            agent,
            config,
            running: None,
            local_addr: None,
        }
    }

    /// Address the listener is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

#[async_trait]
impl Service for A2aService {
    fn name(&self) -> &str {
        "a2a"
    }

    async fn start(&mut self) -> ServiceResult {
        if self.running.is_some() {
            return Ok(());
        }

        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let url = self
            .config
            .public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", addr));

        let router = create_router(AppState::new(Arc::clone(&self.agent), url.clone()));
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        });

        info!(agent = self.agent.name(), %url, "A2A server listening");
        self.local_addr = Some(addr);
        self.running = Some(RunningServer { cancel, handle });
        Ok(())
    }

    async fn stop(&mut self) -> ServiceResult {
        let Some(RunningServer { cancel, mut handle }) = self.running.take() else {
            return Ok(());
        };

        cancel.cancel();
        let result = match tokio::time::timeout(STOP_GRACE, &mut handle).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(ServiceError::Io(e)),
            Ok(Err(e)) => Err(ServiceError::Task(e.to_string())),
            Err(_) => {
                warn!("A2A server did not drain in time; aborting");
                handle.abort();
                Err(ServiceError::Task("graceful shutdown timed out".to_string()))
            }
        };

        self.local_addr = None;
        info!("A2A server stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::AgentError;
    use serde_json::{json, Value};

    struct EchoAgent;

    #[async_trait]
    impl Agent for EchoAgent {
        fn name(&self) -> &str {
            "echo_bot"
        }

        fn description(&self) -> &str {
            "Repeats what you say"
        }

        async fn chat(&self, session_id: &str, message: &str) -> Result<String, AgentError> {
            if message == "fail" {
                return Err(AgentError::EmptyResponse);
            }
            Ok(format!("[{}] {}", session_id, message))
        }
    }

    fn service() -> A2aService {
        A2aService::new(
            Arc::new(EchoAgent),
            A2aConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                public_url: None,
            },
        )
    }

    async fn rpc(addr: SocketAddr, body: Value) -> Value {
        reqwest::Client::new()
            .post(format!("http://{}/", addr))
            .json(&body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_serves_agent_card() {
        let mut svc = service();
        svc.start().await.unwrap();
        let addr = svc.local_addr().unwrap();

        let card: Value = reqwest::get(format!("http://{}/.well-known/agent.json", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(card["name"], "echo_bot");
        assert_eq!(card["description"], "Repeats what you say");
        assert_eq!(card["url"], format!("http://{}", addr));
        assert_eq!(card["defaultInputModes"][0], "text/plain");
        svc.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_message_send_round_trip() {
        let mut svc = service();
        svc.start().await.unwrap();
        let addr = svc.local_addr().unwrap();

        let response = rpc(
            addr,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "message/send",
                "params": {
                    "message": {
                        "role": "user",
                        "parts": [{"kind": "text", "text": "hello"}],
                        "messageId": "m1",
                        "contextId": "ctx-1",
                        "kind": "message"
                    }
                }
            }),
        )
        .await;

        assert_eq!(response["id"], 7);
        assert_eq!(response["result"]["role"], "agent");
        assert_eq!(response["result"]["contextId"], "ctx-1");
        assert_eq!(response["result"]["parts"][0]["text"], "[ctx-1] hello");
        svc.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_rpc_errors() {
        let mut svc = service();
        svc.start().await.unwrap();
        let addr = svc.local_addr().unwrap();

        let unknown = rpc(addr, json!({"jsonrpc": "2.0", "id": 1, "method": "tasks/get"})).await;
        assert_eq!(unknown["error"]["code"], -32601);

        let no_params = rpc(addr, json!({"jsonrpc": "2.0", "id": 2, "method": "message/send"})).await;
        assert_eq!(no_params["error"]["code"], -32602);

        let agent_failure = rpc(
            addr,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "message/send",
                "params": {"message": {"role": "user", "parts": [{"kind": "text", "text": "fail"}]}}
            }),
        )
        .await;
        assert_eq!(agent_failure["error"]["code"], -32603);

        let parse_error: Value = reqwest::Client::new()
            .post(format!("http://{}/", addr))
            .body("{not json")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(parse_error["error"]["code"], -32700);

        svc.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_and_twice() {
        let mut svc = service();
        svc.stop().await.unwrap();

        svc.start().await.unwrap();
        svc.stop().await.unwrap();
        svc.stop().await.unwrap();
        assert!(svc.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_stop_releases_port() {
        let mut svc = service();
        svc.start().await.unwrap();
        let addr = svc.local_addr().unwrap();
        svc.stop().await.unwrap();

        let rebound = TcpListener::bind(addr).await;
        assert!(rebound.is_ok());
    }

    #[tokio::test]
    async fn test_bind_failure_fails_start() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let mut svc = A2aService::new(
            Arc::new(EchoAgent),
            A2aConfig {
                port,
                ..A2aConfig::default()
            },
        );

        let err = svc.start().await.unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)));
        svc.stop().await.unwrap();
    }
}
