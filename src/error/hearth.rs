use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hearth_schema::{ApiErrorBody, ApiErrorObject};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum HearthError {
    #[error("No AI providers configured")]
    NoProvidersConfigured,

    #[error("All AI providers have reached their daily limits")]
    AllProvidersExhausted,

    #[error("All available providers failed to respond ({attempts} attempted)")]
    AllProvidersFailed { attempts: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl From<JsonRejection> for HearthError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(e) => HearthError::InvalidJson(e.body_text()),
            other => HearthError::InvalidRequest(other.body_text()),
        }
    }
}

impl IntoResponse for HearthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            HearthError::InvalidRequest(detail) => {
                tracing::warn!(detail = %detail, "Request rejected");
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REQUEST",
                    detail.clone(),
                )
            }

            HearthError::InvalidJson(detail) => {
                tracing::warn!(detail = %detail, "Request rejected");
                (
                    StatusCode::BAD_REQUEST,
                    "INVALID_JSON",
                    "invalid JSON".to_string(),
                )
            }

            HearthError::NoProvidersConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NO_PROVIDERS",
                self.to_string(),
            ),

            HearthError::AllProvidersExhausted => (
                StatusCode::SERVICE_UNAVAILABLE,
                "PROVIDERS_EXHAUSTED",
                self.to_string(),
            ),

            HearthError::AllProvidersFailed { attempts } => {
                tracing::warn!(attempts, "Every candidate provider failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROVIDERS_FAILED",
                    "All available providers failed to respond".to_string(),
                )
            }

            HearthError::ReqwestError(_)
            | HearthError::JsonError(_)
            | HearthError::IoError(_)
            | HearthError::UrlError(_)
            | HearthError::RactorError(_) => {
                tracing::error!(error = %self, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = ApiErrorBody {
            inner: ApiErrorObject {
                code: code.to_string(),
                message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_failures_map_to_distinct_statuses() {
        let cases = [
            (
                HearthError::NoProvidersConfigured,
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                HearthError::AllProvidersExhausted,
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                HearthError::AllProvidersFailed { attempts: 2 },
                StatusCode::BAD_GATEWAY,
            ),
            (
                HearthError::InvalidRequest("empty".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                HearthError::RactorError("gone".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
