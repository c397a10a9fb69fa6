//! Route handlers.
//!
//! POST /delta      : incremental update from delta-notifier change sets
//! POST /update-all : full rebuild
//! POST /clear      : retract every derived artifact
//! GET  /health     : liveness

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::AppError;
use crate::delta::ChangeSet;
use crate::engine::{AnnotationEngine, ChangeAck, RebuildOutcome};
use crate::error::AnnotationError;

pub async fn delta(
    State(engine): State<AnnotationEngine>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let changes = parse_changes(&body)?;
    let status = match engine.apply_change(&changes).await? {
        ChangeAck::EmptyDelta => StatusCode::BAD_REQUEST,
        ChangeAck::NoTemplates => StatusCode::NOT_FOUND,
        // Propagation keeps running after the notifier's connection is released.
        ChangeAck::Accepted { .. } => StatusCode::ACCEPTED,
    };
    Ok(status)
}

/// A missing body and `[]` are both treated as an empty delta.
fn parse_changes(body: &[u8]) -> Result<Vec<ChangeSet>, AnnotationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body)
        .map_err(|e| AnnotationError::InvalidInput(format!("invalid delta body: {e}")))
}

pub async fn update_all(
    State(engine): State<AnnotationEngine>,
) -> Result<impl IntoResponse, AppError> {
    let response = match engine.rebuild_all().await? {
        RebuildOutcome::NothingFound => (StatusCode::NOT_FOUND, "No templates found"),
        RebuildOutcome::Rebuilt { .. } => (StatusCode::OK, "Done"),
    };
    Ok(response)
}

pub async fn clear(State(engine): State<AnnotationEngine>) -> Result<&'static str, AppError> {
    engine.clear_all().await?;
    Ok("Done")
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_empty_delta() {
        assert!(parse_changes(b"").unwrap().is_empty());
        assert!(parse_changes(b" \n").unwrap().is_empty());
        assert!(parse_changes(b"[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_invalid_input() {
        let err = parse_changes(b"{not json").unwrap_err();
        assert!(matches!(err, AnnotationError::InvalidInput(_)));
    }

    #[test]
    fn change_sets_parse() {
        let body = br#"[{"inserts":[{"subject":{"type":"uri","value":"http://x/t/a"}}],"deletes":[]}]"#;
        let changes = parse_changes(body).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].inserts[0].subject.value, "http://x/t/a");
    }
}
