#![warn(missing_docs)]

//! Binary glTF (GLB) output for the cadmonkey codec.
//!
//! Two stages live here:
//!
//! - [`partition`] splits a [`Polyhedron`](cadmonkey_mesh::Polyhedron) into
//!   one [`GeometryGroup`] per color, re-indexing each group's vertices
//!   densely in first-use order.
//! - [`assemble`] turns those groups into a self-contained GLB v2 asset with
//!   one material per group and two fixed directional lights.
//!
//! # Example
//!
//! ```
//! use cadmonkey_glb::{assemble, partition, AssetOptions};
//! use cadmonkey_mesh::{compute_vertex_normals, Color, Face, Polyhedron, Vertex};
//!
//! let mesh = Polyhedron::new(
//!     vec![
//!         Vertex::new(0.0, 0.0, 0.0),
//!         Vertex::new(1.0, 0.0, 0.0),
//!         Vertex::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![Face::new([0, 1, 2], 0)],
//!     vec![Color::default()],
//! );
//! let groups = partition(&mesh, &compute_vertex_normals(&mesh)).unwrap();
//! let glb = assemble(&groups, &AssetOptions::default()).unwrap();
//! assert_eq!(&glb[..4], b"glTF");
//! ```

mod assemble;
mod document;
mod error;
mod partition;

pub use assemble::{assemble, AssetOptions, GLB_MIME_TYPE};
pub use error::GlbError;
pub use partition::{partition, GeometryGroup};
