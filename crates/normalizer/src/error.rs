use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Artifact '{artifact}' matches no known report schema: {reason}")]
    Mismatch { artifact: String, reason: String },
}
