use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown horizon '{0}' (expected one of: live, 30min, 1hour)")]
    UnknownHorizon(String),

    #[error("Invalid artifact key '{0}'")]
    InvalidArtifactKey(String),

    #[error("Unknown visualization payload type '{0}' (expected data, plotly or static)")]
    UnknownPayloadType(String),
}
