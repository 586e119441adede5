//! Error type shared by every fallible entry point in the crate.
//!
//! The protocol itself never fails once its inputs are accepted: empty qubit
//! streams and empty sifted sets degrade to empty results. Errors only come
//! from parameter validation and from the export layer touching the disk.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QgError>;

#[derive(Error, Debug)]
pub enum QgError {
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QgError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
