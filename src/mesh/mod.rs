//! Core mesh data structures.
//!
//! This module provides the immutable [`Mesh`] snapshot used throughout the
//! transfer pipeline, along with type-safe element indices.
//!
//! # Overview
//!
//! A [`Mesh`] is a read-only capture of scene geometry: vertex positions,
//! polygonal faces, and a fan triangulation derived at construction for
//! surface queries. Vertex adjacency is derived lazily and cached per
//! snapshot. Transformations never mutate a snapshot; they derive new ones
//! (see [`Mesh::with_positions`]).
//!
//! # Construction
//!
//! ```
//! use retarget::mesh::Mesh;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![vec![0, 1, 2]];
//!
//! let mesh = Mesh::new(positions, faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 3);
//! ```

mod index;
mod model;

pub use index::{FaceId, VertexId};
pub use model::{Adjacency, Mesh, Triangle};
