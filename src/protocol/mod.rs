// Wire protocol shared by every service
// One newline-terminated JSON object per request and per response

pub mod model;
pub mod requests;

pub use model::*;
pub use requests::*;

use crate::error::{ErrorKind, MarketError, MarketResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default)]
    pub result: Value,
}

impl Response {
    /// Successful response carrying a serialized payload
    pub fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(result) => Self {
                status: Status::Ok,
                error_kind: None,
                error_message: None,
                result,
            },
            Err(e) => Self::error(&MarketError::from(e)),
        }
    }

    pub fn error(err: &MarketError) -> Self {
        Self {
            status: Status::Error,
            error_kind: Some(err.kind()),
            error_message: Some(err.to_string()),
            result: Value::Null,
        }
    }

    /// Error response whose message is labelled with the failing operation
    pub fn labelled_error(operation: &str, err: &MarketError) -> Self {
        Self {
            status: Status::Error,
            error_kind: Some(err.kind()),
            error_message: Some(format!("{}: {}", operation, err)),
            result: Value::Null,
        }
    }

    pub fn from_result<T: Serialize>(result: MarketResult<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(&payload),
            Err(err) => Self::error(&err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Decode the payload, or turn an error response back into a [`MarketError`]
    pub fn into_result<T: DeserializeOwned>(self) -> MarketResult<T> {
        match self.status {
            Status::Ok => Ok(serde_json::from_value(self.result)?),
            Status::Error => Err(MarketError::remote(
                self.error_kind.unwrap_or(ErrorKind::ProtocolError),
                self.error_message.unwrap_or_default(),
            )),
        }
    }
}
