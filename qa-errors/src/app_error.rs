use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflicting update: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limited, retry in {0}s")]
    RateLimited(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidInput(_) => "invalid_input",
            Self::RateLimited(_) => "rate_limited",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether repeating the whole operation from a fresh read may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::RateLimited(_))
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::Unauthenticated => "Please sign in to continue.",
            Self::Forbidden(_) => "You don't have permission to do that.",
            Self::NotFound(_) => "That question or answer no longer exists.",
            Self::Conflict(_) => "Someone else changed this at the same time. Please try again.",
            Self::InvalidInput(msg) => msg,
            Self::RateLimited(_) => "You're doing that too often. Slow down a little.",
            Self::Internal(_) => "Something went wrong on our side. Please try again later.",
        }
    }
}

#[cfg(feature = "http")]
mod http_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        code: &'static str,
        message: String,
        retryable: bool,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Conflict(_) => StatusCode::CONFLICT,
                AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            let body = ErrorResponse {
                code: self.code(),
                message: self.user_message().to_string(),
                retryable: self.is_retryable(),
            };
            (status, Json(body)).into_response()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_status_codes() {
            assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                AppError::Forbidden("x".into()).status_code(),
                StatusCode::FORBIDDEN
            );
            assert_eq!(
                AppError::NotFound("x".into()).status_code(),
                StatusCode::NOT_FOUND
            );
            assert_eq!(
                AppError::Conflict("x".into()).status_code(),
                StatusCode::CONFLICT
            );
            assert_eq!(
                AppError::RateLimited(3).status_code(),
                StatusCode::TOO_MANY_REQUESTS
            );
        }

        #[test]
        fn test_into_response_keeps_status() {
            let response = AppError::Conflict("stale".into()).into_response();
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(AppError::Conflict("stale".into()).is_retryable());
        assert!(AppError::RateLimited(10).is_retryable());
        assert!(!AppError::Forbidden("not author".into()).is_retryable());
        assert!(!AppError::NotFound("answer".into()).is_retryable());
        assert!(!AppError::Unauthenticated.is_retryable());
    }

    #[test]
    fn test_permission_and_missing_are_distinct() {
        let forbidden = AppError::Forbidden("not author".into());
        let missing = AppError::NotFound("answer".into());
        assert_ne!(forbidden.code(), missing.code());
        assert_ne!(forbidden.user_message(), missing.user_message());
    }

    #[test]
    fn test_invalid_input_message_passthrough() {
        let err = AppError::InvalidInput("Answer must be at least 10 characters".into());
        assert_eq!(err.user_message(), "Answer must be at least 10 characters");
    }
}
