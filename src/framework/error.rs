//! # Service Errors
//!
//! Every failure the core can surface, plus the stable numeric codes an outer
//! transport layer uses to serialize them. Keeping the taxonomy in one place
//! means a registry call can never fail with an unclassified error.

use serde::Serialize;

/// Stable response codes surfaced at the boundary.
///
/// The numbering is fixed; outer layers (CLI, remote API) depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ErrorCode {
    Success = 0,
    MessageDirectionIncorrect = 1,
    ResourceDoesNotExist = 2,
    ContextDoesNotExist = 3,
    JsonEncodingError = 4,
    JsonSchemaValidationError = 5,
    ResourceCannotBeDeleted = 6,
    MethodNotImplemented = 7,
    MethodNotSupportedOnObject = 8,
    IllegalState = 9,
    UnrecognisedState = 10,
    MalformedDataObject = 11,
    ResourceException = 12,
}

impl ErrorCode {
    /// Numeric value of the code.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Fixed human-readable text for the code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::MessageDirectionIncorrect => "The message direction is incorrect",
            ErrorCode::ResourceDoesNotExist => "Resource path does not exist",
            ErrorCode::ContextDoesNotExist => "The requested context does not exist",
            ErrorCode::JsonEncodingError => "The request could not be encoded or decoded",
            ErrorCode::JsonSchemaValidationError => "The request failed schema validation",
            ErrorCode::ResourceCannotBeDeleted => "The requested resource cannot be deleted",
            ErrorCode::MethodNotImplemented => {
                "The requested method is not implemented on this object"
            }
            ErrorCode::MethodNotSupportedOnObject => {
                "The requested method is not supported on this object"
            }
            ErrorCode::IllegalState => "The state requested is illegal in the current state",
            ErrorCode::UnrecognisedState => "The state requested is not a recognised allowed state",
            ErrorCode::MalformedDataObject => {
                "The supplied data object is not valid for this resource"
            }
            ErrorCode::ResourceException => "Resource specific exception raised",
        }
    }
}

/// Errors raised by the registries, the actor plumbing and resource handlers.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ServiceError {
    #[error("Resource path conflict - {0} already exists")]
    ResourcePathConflict(String),
    #[error("Resource path does not exist: {0}")]
    ResourceDoesNotExist(String),
    #[error("The requested resource cannot be deleted: {0}")]
    ResourceCannotBeDeleted(String),
    #[error("The requested method is not implemented on this object: {0}")]
    MethodNotImplemented(&'static str),
    #[error("The requested method is not supported on this object: {0}")]
    MethodNotSupportedOnObject(String),
    #[error("State {requested} is illegal in current state {current}")]
    IllegalState { current: String, requested: String },
    #[error("State {0} is not a recognised allowed state")]
    UnrecognisedState(String),
    #[error("Malformed data object: {0}")]
    MalformedDataObject(String),
    #[error("Resource exception: {0}")]
    ResourceException(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
}

impl ServiceError {
    /// The stable code this error is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::ResourceDoesNotExist(_) => ErrorCode::ResourceDoesNotExist,
            ServiceError::ResourceCannotBeDeleted(_) => ErrorCode::ResourceCannotBeDeleted,
            ServiceError::MethodNotImplemented(_) => ErrorCode::MethodNotImplemented,
            ServiceError::MethodNotSupportedOnObject(_) => ErrorCode::MethodNotSupportedOnObject,
            ServiceError::IllegalState { .. } => ErrorCode::IllegalState,
            ServiceError::UnrecognisedState(_) => ErrorCode::UnrecognisedState,
            ServiceError::MalformedDataObject(_) => ErrorCode::MalformedDataObject,
            ServiceError::ResourcePathConflict(_)
            | ServiceError::ResourceException(_)
            | ServiceError::ActorClosed
            | ServiceError::ActorDropped => ErrorCode::ResourceException,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::Success.as_u8(), 0);
        assert_eq!(ErrorCode::ResourceDoesNotExist.as_u8(), 2);
        assert_eq!(ErrorCode::ResourceCannotBeDeleted.as_u8(), 6);
        assert_eq!(ErrorCode::IllegalState.as_u8(), 9);
        assert_eq!(ErrorCode::ResourceException.as_u8(), 12);
    }

    #[test]
    fn every_error_is_classified() {
        let conflict = ServiceError::ResourcePathConflict("/a".into());
        assert_eq!(conflict.code(), ErrorCode::ResourceException);
        assert_eq!(ServiceError::ActorClosed.code(), ErrorCode::ResourceException);

        let illegal = ServiceError::IllegalState {
            current: "READY".into(),
            requested: "STOPPED".into(),
        };
        assert_eq!(illegal.code(), ErrorCode::IllegalState);
        assert_eq!(
            illegal.to_string(),
            "State STOPPED is illegal in current state READY"
        );
    }
}
