//! # Retarget
//!
//! A library for transferring blend shapes between differently-topologized
//! meshes.
//!
//! A blend shape sculpted on one mesh cannot be copied vertex-for-vertex
//! onto a mesh with different topology. Retarget establishes a spatial
//! correspondence between the two surfaces instead: every target vertex is
//! anchored to its closest point on the source surface, the sculpted
//! per-vertex displacements are sampled at those anchors, sub-threshold
//! noise introduced by the approximation is pinned to zero, and the
//! surviving displacement field is relaxed before being added onto the
//! target.
//!
//! ## Pipeline
//!
//! 1. **Snapshot** ([`mesh`]): immutable captures of scene geometry with
//!    derived triangulation and cached adjacency
//! 2. **Correspondence** ([`algo::correspondence`]): closest-point anchors
//!    with barycentric weights (nearest-vertex fallback for degenerate
//!    triangles)
//! 3. **Deltas** ([`algo::delta`]): deformed-minus-base displacement sets
//! 4. **Classification** ([`algo::classify`]): static-vertex suppression
//!    below a threshold
//! 5. **Smoothing** ([`algo::smooth`]): Laplacian relaxation of the
//!    transferred field
//! 6. **Session** ([`transfer`]): source/target designation and end-to-end
//!    orchestration
//!
//! ## Quick Start
//!
//! ```
//! use retarget::prelude::*;
//! use nalgebra::Point3;
//!
//! // Host geometry behind the scene abstraction
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let base = Mesh::new(positions.clone(), vec![vec![0, 1, 2]]).unwrap();
//! let smile: Vec<_> = positions
//!     .iter()
//!     .map(|p| Point3::new(p.x, p.y, p.z + 0.5))
//!     .collect();
//!
//! let mut scene = MemoryScene::new();
//! scene.insert_mesh("face", base.clone());
//! scene.insert_variant("face", "smile", base.with_positions(smile).unwrap());
//! scene.insert_mesh("hero_face", base);
//!
//! // Designate, validate, transfer
//! let mut session = TransferSession::new();
//! session.set_source(&scene, "face").unwrap();
//! session.set_target(&scene, "hero_face").unwrap();
//! assert!(session.is_valid_with_blend_shape());
//!
//! let options = TransferOptions::default().with_iterations(2);
//! let results = session.execute_from_blend_shape(&options).unwrap();
//! assert_eq!(results[0].name, "smile");
//! ```
//!
//! The engine is pure: it resolves references through a
//! [`SceneSource`](scene::SceneSource), computes over its own snapshots,
//! and returns named deformed meshes for the host to apply. It never
//! mutates scene state, so a failed or discarded call has no side effects.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod scene;
pub mod transfer;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use retarget::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{
        classify_static, resolve, smooth_deltas, CorrespondenceMap, DeltaSet, ResolveOptions,
        SmoothOptions, StaticVertices, SurfaceAnchor,
    };
    pub use crate::error::{Result, TransferError};
    pub use crate::mesh::{Adjacency, FaceId, Mesh, Triangle, VertexId};
    pub use crate::scene::{MemoryScene, SceneSource};
    pub use crate::transfer::{TransferOptions, TransferResult, TransferSession};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
