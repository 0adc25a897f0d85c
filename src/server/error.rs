use crate::Error;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Maps crate errors onto HTTP responses for the route handlers.
#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

// Malformed bodies and query strings answer with the same `{"detail": ...}`
// shape as every other failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::InvalidRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(Error::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self.0 {
            Error::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::AiProvider(msg) => (StatusCode::BAD_GATEWAY, format!("OpenAI error: {}", msg)),
            Error::Http(e) => (StatusCode::BAD_GATEWAY, format!("OpenAI error: {}", e)),
            Error::StoreUnavailable(msg) => {
                tracing::error!("history store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "History store unavailable".to_string(),
                )
            }
            other => {
                tracing::error!("internal error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: Error) -> StatusCode {
        ApiError(e).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(Error::InvalidRequest("Prompt empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::AiProvider("rate limited".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(Error::StoreUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(Error::Config("missing key".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
