//! Error type shared by every layer of the annotator.
//!
//! Upstream failures (SPARQL transport, decoding) are propagated untouched to
//! the entry point that triggered them; nothing in here retries.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnnotationError>;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed binding at row {row}: missing `{field}`")]
    MalformedBinding { row: usize, field: &'static str },

    #[error("configuration: {0}")]
    Config(String),

    #[error("sparql transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sparql endpoint returned {status}: {body}")]
    Sparql { status: u16, body: String },

    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AnnotationError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::MalformedBinding { .. } => 502,
            Self::Config(_) => 500,
            Self::Http(_) => 502,
            Self::Sparql { .. } => 502,
            Self::Decode(_) => 502,
            Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_invalid_input() {
        assert_eq!(AnnotationError::InvalidInput("x".into()).http_status(), 400);
    }

    #[test]
    fn http_status_malformed_binding() {
        let err = AnnotationError::MalformedBinding {
            row: 3,
            field: "uri",
        };
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn http_status_upstream() {
        let err = AnnotationError::Sparql {
            status: 503,
            body: "down".into(),
        };
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn http_status_internal() {
        let err = AnnotationError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn display_malformed_binding() {
        let err = AnnotationError::MalformedBinding {
            row: 0,
            field: "variableLabel",
        };
        assert_eq!(
            err.to_string(),
            "malformed binding at row 0: missing `variableLabel`"
        );
    }

    #[test]
    fn display_sparql() {
        let err = AnnotationError::Sparql {
            status: 500,
            body: "Virtuoso 37000 Error".into(),
        };
        assert_eq!(
            err.to_string(),
            "sparql endpoint returned 500: Virtuoso 37000 Error"
        );
    }
}
