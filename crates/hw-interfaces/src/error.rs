use thiserror::Error;

pub type Result<T, E = HwError> = core::result::Result<T, E>;

/// Why a raw identifier was rejected by [`crate::ObjectId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("object identifier is empty")]
    Empty,
    #[error("object identifier too short: {0:?} (need more than 13 chars)")]
    TooShort(String),
}

#[derive(Debug, Error)]
pub enum HwError {
    #[error("object store lock poisoned")]
    StorePoisoned,
    #[error("metrics error: {0}")]
    Metrics(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for HwError {
    fn from(e: serde_json::Error) -> Self {
        HwError::Decode(e.to_string())
    }
}
