use normalizer::SchemaError;
use thiserror::Error;

/// The failures a request can observe. All of them are recoverable at the request boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("{what} not found")]
    NotFound { what: String, searched: Vec<String> },

    #[error("Artifact '{artifact}' does not match a known report schema: {reason}")]
    SchemaMismatch { artifact: String, reason: String },

    #[error("Artifact '{artifact}' is malformed: {reason}")]
    MalformedArtifact { artifact: String, reason: String },
}

impl QueryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into(), searched: Vec::new() }
    }

    /// Stable machine-readable tag for API consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::MalformedArtifact { .. } => "malformed_artifact",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<SchemaError> for QueryError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Mismatch { artifact, reason } => Self::SchemaMismatch { artifact, reason },
        }
    }
}
