//! Error types for retarget.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`TransferError`].
pub type Result<T> = std::result::Result<T, TransferError>;

/// Errors that can occur during a blend shape transfer.
#[derive(Error, Debug)]
pub enum TransferError {
    /// A reference does not resolve to usable polygonal geometry.
    ///
    /// Raised for meshes with zero vertices or zero faces, faces that
    /// reference out-of-range or duplicate vertices, and scene references
    /// that fail to resolve at all.
    #[error("invalid geometry: {details}")]
    InvalidGeometry {
        /// Description of the offending geometry or reference.
        details: String,
    },

    /// Two meshes expected to share topology have differing vertex counts.
    #[error("topology mismatch: expected {expected} vertices, found {found}")]
    TopologyMismatch {
        /// The vertex count of the reference mesh.
        expected: usize,
        /// The vertex count actually encountered.
        found: usize,
    },

    /// An operation was invoked before its prerequisites were satisfied.
    #[error("invalid session state: {details}")]
    InvalidState {
        /// Which prerequisite is missing.
        details: &'static str,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl TransferError {
    /// Create an invalid geometry error.
    pub fn invalid_geometry<D: std::fmt::Display>(details: D) -> Self {
        TransferError::InvalidGeometry {
            details: details.to_string(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        TransferError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
