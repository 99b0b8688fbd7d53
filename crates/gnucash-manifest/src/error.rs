use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("manifest lists no headers")]
    NoHeaders,
    #[error("header listed twice: {0}")]
    DuplicateHeader(String),
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
    #[error("empty pattern in {0}")]
    EmptyPattern(&'static str),
    #[error("type is both allowlisted and blocklisted: {0}")]
    ConflictingType(String),
    #[error("headers not found in include path: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),
}
