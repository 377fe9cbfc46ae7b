#![warn(missing_docs)]

//! Indexed triangle mesh model for the cadmonkey geometry codec.
//!
//! A [`Polyhedron`] is what the OFF reader produces from the geometry
//! kernel's output: a vertex list, colored triangles that reference vertices
//! by index, and the palette those colors index into. Everything downstream
//! (normals, material groups, GLB assembly) is a pure function of it.
//!
//! # Example
//!
//! ```
//! use cadmonkey_mesh::{compute_vertex_normals, Color, Face, Palette, Polyhedron, Vertex};
//!
//! let mut palette = Palette::new();
//! let red = palette.intern(Color::new(1.0, 0.0, 0.0, 1.0));
//! let mesh = Polyhedron::new(
//!     vec![
//!         Vertex::new(0.0, 0.0, 0.0),
//!         Vertex::new(1.0, 0.0, 0.0),
//!         Vertex::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![Face::new([0, 1, 2], red)],
//!     palette.into_colors(),
//! );
//! mesh.validate().unwrap();
//! assert_eq!(compute_vertex_normals(&mesh)[0], [0.0, 0.0, 1.0]);
//! ```

mod color;
mod normals;

pub use color::{Color, Palette, DEFAULT_FACE_COLOR};
pub use normals::{compute_vertex_normals, compute_vertex_normals_par};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Violations of the [`Polyhedron`] index invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A face references a vertex past the end of the vertex list.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        /// Position of the face in [`Polyhedron::faces`].
        face: usize,
        /// The offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face references a color past the end of the palette.
    #[error("face {face} references color {index}, but the palette has {color_count} colors")]
    ColorIndexOutOfRange {
        /// Position of the face in [`Polyhedron::faces`].
        face: usize,
        /// The offending palette index.
        index: u32,
        /// Number of palette entries.
        color_count: usize,
    },

    /// A vertex has a NaN or infinite coordinate.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// Position of the vertex in [`Polyhedron::vertices`].
        vertex: usize,
    },
}

/// A mesh vertex position (single precision, matching the GLB wire format).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Vertex {
    /// Create a new vertex.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The coordinates as an array.
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// A triangle: three vertex indices plus one palette index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Vertex indices, counter-clockwise for an outward normal.
    pub vertices: [u32; 3],
    /// Index into [`Polyhedron::colors`].
    pub color: u32,
}

impl Face {
    /// Create a new face.
    pub fn new(vertices: [u32; 3], color: u32) -> Self {
        Self { vertices, color }
    }
}

/// An indexed, colored triangle mesh.
///
/// Built once per parse and never mutated afterwards. The index invariants
/// are checked by [`Polyhedron::validate`]; the OFF reader only ever returns
/// meshes that pass it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyhedron {
    /// Vertex positions.
    pub vertices: Vec<Vertex>,
    /// Colored triangles.
    pub faces: Vec<Face>,
    /// Palette of distinct colors referenced by [`Face::color`].
    pub colors: Vec<Color>,
}

impl Polyhedron {
    /// Create a polyhedron from its parts. Call [`Polyhedron::validate`] if
    /// the parts did not come from a trusted source.
    pub fn new(vertices: Vec<Vertex>, faces: Vec<Face>, colors: Vec<Color>) -> Self {
        Self {
            vertices,
            faces,
            colors,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.faces.len()
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Check that every coordinate is finite and every face references an
    /// existing vertex and color.
    pub fn validate(&self) -> Result<(), MeshError> {
        if let Some(vertex) = self
            .vertices
            .iter()
            .position(|v| !v.to_array().iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex { vertex });
        }
        let vertex_count = self.vertices.len();
        let color_count = self.colors.len();
        for (i, face) in self.faces.iter().enumerate() {
            if let Some(&index) = face
                .vertices
                .iter()
                .find(|&&v| v as usize >= vertex_count)
            {
                return Err(MeshError::VertexIndexOutOfRange {
                    face: i,
                    index,
                    vertex_count,
                });
            }
            if face.color as usize >= color_count {
                return Err(MeshError::ColorIndexOutOfRange {
                    face: i,
                    index: face.color,
                    color_count,
                });
            }
        }
        Ok(())
    }

    /// Axis-aligned bounding box `(min, max)` over all vertices, or `None`
    /// if there are no vertices.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        bounding_box(self.vertices.iter().map(|v| v.to_array()))
    }
}

/// Per-axis `(min, max)` of `points`, or `None` if there are none.
pub fn bounding_box(
    points: impl IntoIterator<Item = [f32; 3]>,
) -> Option<([f32; 3], [f32; 3])> {
    let mut points = points.into_iter();
    let first = points.next()?;
    Some(points.fold((first, first), |(mut min, mut max), p| {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
        (min, max)
    }))
}
