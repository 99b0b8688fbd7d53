use thiserror::Error;

use gnucash_manifest::ManifestError;

use crate::{config::ConfigError, date::DateError, guid::GuidError, numeric::NumericError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Numeric(#[from] NumericError),
    #[error(transparent)]
    Guid(#[from] GuidError),
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("string contains an interior NUL byte: {0:?}")]
    InvalidString(String),
    #[error("{0} returned null")]
    NullPointer(&'static str),
    #[error("backend error {code} while opening {uri}")]
    Backend { code: i64, uri: String },
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("account type {0} has no kind")]
    UnknownAccountType(i32),
    #[error("{0}")]
    Other(String),
}

impl From<std::ffi::NulError> for Error {
    fn from(e: std::ffi::NulError) -> Self {
        let bytes = e.into_vec();
        Error::InvalidString(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
