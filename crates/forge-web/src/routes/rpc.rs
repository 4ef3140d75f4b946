//! JSON-RPC endpoint for A2A messages.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::state::AppState;

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC request structure.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl JsonRpcResponse {
    fn from_result(id: Option<Value>, result: Result<Value, JsonRpcError>) -> Self {
        let (result, error) = match result {
            Ok(r) => (Some(r), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result,
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A2A message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: String,
    pub parts: Vec<Part>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub context_id: Option<String>,
    #[serde(default = "message_kind")]
    pub kind: String,
}

fn message_kind() -> String {
    "message".to_string()
}

#[derive(Debug, Deserialize)]
struct MessageSendParams {
    message: Message,
}

/// Handle a JSON-RPC call. The body is taken raw so that malformed JSON
/// still gets a JSON-RPC parse error.
pub async fn handle(State(state): State<AppState>, body: String) -> Json<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => {
            return Json(JsonRpcResponse::from_result(
                None,
                Err(JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e))),
            ));
        }
    };

    if request.jsonrpc != "2.0" {
        return Json(JsonRpcResponse::from_result(
            request.id,
            Err(JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\"")),
        ));
    }

    debug!(method = %request.method, "A2A request");
    let result = match request.method.as_str() {
        "message/send" => message_send(&state, request.params).await,
        _ => Err(JsonRpcError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        )),
    };

    Json(JsonRpcResponse::from_result(request.id, result))
}

async fn message_send(state: &AppState, params: Option<Value>) -> Result<Value, JsonRpcError> {
    let params: MessageSendParams = params
        .ok_or_else(|| JsonRpcError::new(INVALID_PARAMS, "Missing params"))
        .and_then(|p| {
            serde_json::from_value(p)
                .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))
        })?;

    let text = params
        .message
        .parts
        .iter()
        .filter(|p| p.kind == "text")
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n");
    if text.trim().is_empty() {
        return Err(JsonRpcError::new(INVALID_PARAMS, "Message has no text parts"));
    }

    let context_id = params
        .message
        .context_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let reply = state.agent.chat(&context_id, &text).await.map_err(|e| {
        warn!(context_id = %context_id, error = %e, "Agent exchange failed");
        JsonRpcError::new(INTERNAL_ERROR, e.to_string())
    })?;

    let response = Message {
        role: "agent".to_string(),
        parts: vec![Part {
            kind: "text".to_string(),
            text: Some(reply),
        }],
        message_id: Some(uuid::Uuid::new_v4().to_string()),
        context_id: Some(context_id),
        kind: message_kind(),
    };

    serde_json::to_value(response).map_err(|e| JsonRpcError::new(INTERNAL_ERROR, e.to_string()))
}
