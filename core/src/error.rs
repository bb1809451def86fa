//! Error types for the Trello API client.
//!
//! # Design
//! `NotFound`, `Unauthorized` and `RateLimited` get dedicated variants because
//! callers branch on them. All other unexpected statuses land in `HttpError`
//! with the raw status code. Every status-derived variant keeps the response
//! body.

/// Errors returned by `TrelloClient` build and parse methods.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404. The requested object does not exist.
    #[error("resource not found: {body}")]
    NotFound { body: String },

    /// The server returned 401, usually `invalid key` or `invalid token`.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },

    /// The server returned 429. Never retried by this crate.
    #[error("rate limited{}: {body}", retry_hint(.retry_after))]
    RateLimited {
        retry_after: Option<u64>,
        body: String,
    },

    /// Any other status that is not the one the operation expects.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An object id did not match the 24-digit hex format.
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    /// A field name used as a path segment contained illegal characters.
    #[error("invalid field name: {0:?}")]
    InvalidField(String),

    /// An argument was rejected before any request was built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

impl ApiError {
    /// Status code of the response that produced this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body of a status-derived error.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { body }
            | ApiError::Unauthorized { body }
            | ApiError::RateLimited { body, .. }
            | ApiError::HttpError { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_mentions_retry_only_when_known() {
        let err = ApiError::RateLimited {
            retry_after: Some(10),
            body: "API_TOKEN_LIMIT_EXCEEDED".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rate limited (retry after 10s): API_TOKEN_LIMIT_EXCEEDED"
        );

        let err = ApiError::RateLimited {
            retry_after: None,
            body: "API_TOKEN_LIMIT_EXCEEDED".to_string(),
        };
        assert_eq!(err.to_string(), "rate limited: API_TOKEN_LIMIT_EXCEEDED");
    }

    #[test]
    fn not_found_shows_body() {
        let err = ApiError::NotFound {
            body: "The requested resource was not found.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "resource not found: The requested resource was not found."
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("The requested resource was not found."));
    }
}
