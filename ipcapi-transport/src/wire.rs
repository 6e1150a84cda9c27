use ipcapi_core::{HandlerResult, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Success { value: Value },
    Error { error: RpcError },
}

impl From<HandlerResult> for Outcome {
    fn from(result: HandlerResult) -> Self {
        match result {
            Ok(value) => Outcome::Success { value },
            Err(error) => Outcome::Error { error },
        }
    }
}

impl From<Outcome> for HandlerResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success { value } => Ok(value),
            Outcome::Error { error } => Err(error),
        }
    }
}

/// One frame on a JSON-lines connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WireMessage {
    Request {
        id: u64,
        channel: String,
        #[serde(default)]
        payload: Value,
    },
    Response {
        id: u64,
        #[serde(flatten)]
        outcome: Outcome,
    },
}

impl WireMessage {
    pub fn id(&self) -> u64 {
        match self {
            WireMessage::Request { id, .. } | WireMessage::Response { id, .. } => *id,
        }
    }
}
