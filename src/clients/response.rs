//! The envelope outer layers serialize for every registry call.

use crate::framework::{ErrorCode, ServiceError, State};
use serde::Serialize;

/// `{ "error_code": ..., "message": ..., "data": ... }`.
///
/// `data` is present only for successful reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceResponse {
    pub error_code: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<State>,
}

impl ServiceResponse {
    pub fn success(data: Option<State>) -> Self {
        Self {
            error_code: ErrorCode::Success.as_u8(),
            message: ErrorCode::Success.message().to_string(),
            data,
        }
    }

    pub fn failure(error: &ServiceError) -> Self {
        Self {
            error_code: error.code().as_u8(),
            message: error.to_string(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code == ErrorCode::Success.as_u8()
    }
}

impl From<Result<State, ServiceError>> for ServiceResponse {
    fn from(result: Result<State, ServiceError>) -> Self {
        match result {
            Ok(data) => Self::success(Some(data)),
            Err(e) => Self::failure(&e),
        }
    }
}

impl From<Result<(), ServiceError>> for ServiceResponse {
    fn from(result: Result<(), ServiceError>) -> Self {
        match result {
            Ok(()) => Self::success(None),
            Err(e) => Self::failure(&e),
        }
    }
}
