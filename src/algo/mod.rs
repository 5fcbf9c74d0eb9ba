//! Transfer pipeline algorithms.
//!
//! This module contains the stages the transfer engine composes:
//!
//! - **Correspondence**: closest-point mapping between two meshes
//! - **Deltas**: per-vertex displacement extraction and application
//! - **Classification**: static-vertex detection below a threshold
//! - **Smoothing**: Laplacian relaxation of the transferred delta field
//!
//! Each stage is a pure function over immutable snapshots; the
//! [`TransferSession`](crate::transfer::TransferSession) drives them
//! end-to-end.

pub mod classify;
pub mod correspondence;
pub mod delta;
pub mod smooth;

pub use classify::{classify_static, StaticVertices};
pub use correspondence::{resolve, CorrespondenceMap, ResolveOptions, SurfaceAnchor};
pub use delta::DeltaSet;
pub use smooth::{smooth_deltas, SmoothOptions};
