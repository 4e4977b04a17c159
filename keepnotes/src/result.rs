//! The envelope carrying the state of an asynchronous call.
use std::fmt::Display;

/// Outcome of a call to the note API.
///
/// A producer publishes [`ApiResult::Loading`] when a call starts and then exactly one terminal
/// value, either [`ApiResult::Success`] or [`ApiResult::Error`].
/// Errors carry a human-readable message only; the kind of failure is not exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResult<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> ApiResult<T> {
    /// Payload of a successful call.
    ///
    /// Returns `None` for `Loading` and `Error`.
    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResult::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Message of a failed call.
    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResult::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ApiResult::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ApiResult::Error(_))
    }

    /// Whether the call has completed, successfully or not.
    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> ApiResult<U> {
        match self {
            ApiResult::Loading => ApiResult::Loading,
            ApiResult::Success(data) => ApiResult::Success(op(data)),
            ApiResult::Error(message) => ApiResult::Error(message),
        }
    }

    /// Convert a terminal value into a [`Result`].
    ///
    /// Returns `None` while the call is still loading.
    pub fn into_result(self) -> Option<Result<T, String>> {
        match self {
            ApiResult::Loading => None,
            ApiResult::Success(data) => Some(Ok(data)),
            ApiResult::Error(message) => Some(Err(message)),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for ApiResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => ApiResult::Success(data),
            Err(e) => ApiResult::Error(e.to_string()),
        }
    }
}
