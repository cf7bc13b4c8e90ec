use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact '{path}' could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact '{path}' is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No '{relative}' directory found in any candidate location")]
    DirectoryNotFound { relative: PathBuf, searched: Vec<PathBuf> },

    #[error("{0} not found")]
    NotFound(String),
}
