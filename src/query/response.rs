use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};
use crate::core::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    /// DDL success, no payload
    SuccessEmpty,
    /// Exactly one payload fragment
    SuccessJson,
    /// One fragment per row or list entry
    SuccessStream,
    BadQuery,
    RuntimeError,
}

impl StatusCode {
    pub fn code(&self) -> u32 {
        match self {
            StatusCode::SuccessEmpty => 0,
            StatusCode::SuccessJson => 1,
            StatusCode::SuccessStream => 3,
            StatusCode::BadQuery => 102,
            StatusCode::RuntimeError => 103,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(StatusCode::SuccessEmpty),
            1 => Some(StatusCode::SuccessJson),
            3 => Some(StatusCode::SuccessStream),
            102 => Some(StatusCode::BadQuery),
            103 => Some(StatusCode::RuntimeError),
            _ => None,
        }
    }
}

/// Result envelope returned for every query.
/// `payload` holds JSON text fragments, `token` echoes the query's token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: StatusCode,
    pub payload: Vec<String>,
    pub error_message: Option<String>,
    pub token: i64,
}

impl Response {
    pub fn empty(token: i64) -> Self {
        Response {
            status: StatusCode::SuccessEmpty,
            payload: Vec::new(),
            error_message: None,
            token,
        }
    }

    pub fn single(token: i64, value: &Value) -> Self {
        Response {
            status: StatusCode::SuccessJson,
            payload: vec![value.to_json_string()],
            error_message: None,
            token,
        }
    }

    pub fn stream(token: i64, values: &[Value]) -> Self {
        Response {
            status: StatusCode::SuccessStream,
            payload: values.iter().map(Value::to_json_string).collect(),
            error_message: None,
            token,
        }
    }

    pub fn error(token: i64, error: &Error) -> Self {
        let status = StatusCode::from_code(error.status()).unwrap_or(StatusCode::RuntimeError);
        Response {
            status,
            payload: Vec::new(),
            error_message: Some(error.context.clone()),
            token,
        }
    }

    pub fn status_code(&self) -> u32 {
        self.status.code()
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            StatusCode::SuccessEmpty | StatusCode::SuccessJson | StatusCode::SuccessStream
        )
    }

    /// Parse the payload fragments back into values
    pub fn values(&self) -> Result<Vec<Value>> {
        self.payload
            .iter()
            .map(|fragment| {
                let json: serde_json::Value = serde_json::from_str(fragment)?;
                Ok(Value::from(json))
            })
            .collect()
    }
}
