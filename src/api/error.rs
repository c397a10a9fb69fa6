use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::AnnotationError;

/// Handler error; renders as the plain-text failure message the delta
/// notifier and operators see.
#[derive(Debug)]
pub struct AppError(pub AnnotationError);

impl From<AnnotationError> for AppError {
    fn from(err: AnnotationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        } else {
            tracing::warn!("request rejected: {}", self.0);
        }
        let body = match status {
            StatusCode::BAD_REQUEST => self.0.to_string(),
            _ => format!("Oops something went wrong: {}", self.0),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failure_is_bad_gateway() {
        let resp = AppError(AnnotationError::Sparql {
            status: 500,
            body: "virtuoso".into(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn malformed_store_rows_are_upstream_failures() {
        use http_body_util::BodyExt;

        let resp = AppError(AnnotationError::MalformedBinding {
            row: 2,
            field: "variableLabel",
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).starts_with("Oops something went wrong: "));
    }

    #[test]
    fn invalid_input_is_bad_request() {
        let resp = AppError::from(AnnotationError::InvalidInput("no".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
