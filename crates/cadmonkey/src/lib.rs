#![warn(missing_docs)]

//! cadmonkey: OpenSCAD OFF to binary glTF.
//!
//! Takes the triangulated OFF text the geometry kernel writes for a compiled
//! model and produces one self-contained GLB asset that any glTF viewer can
//! display. Faces are grouped into one material per color, vertex normals
//! are area weighted, and two directional lights are baked into the scene.
//!
//! # Example
//!
//! ```
//! let off = "OFF 3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2 255 0 0\n";
//! let glb = cadmonkey::encode(off).unwrap();
//! assert_eq!(&glb[..4], b"glTF");
//! ```

mod error;
mod options;

pub use cadmonkey_glb::GLB_MIME_TYPE;
pub use cadmonkey_mesh::{Color, Polyhedron};
pub use error::CodecError;
pub use options::EncodeOptions;

use cadmonkey_glb::{assemble, partition};
use cadmonkey_mesh::{compute_vertex_normals, compute_vertex_normals_par};
use tracing::{debug, debug_span};

/// Encode OFF text as a GLB asset with default options.
pub fn encode(text: &str) -> Result<Vec<u8>, CodecError> {
    encode_with(text, &EncodeOptions::default())
}

/// Encode OFF text as a GLB asset.
///
/// `options` are checked with [`EncodeOptions::validate`] first. Returns the
/// first error hit by any stage; no partial asset is produced.
pub fn encode_with(text: &str, options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
    let _span = debug_span!("encode", input_bytes = text.len()).entered();

    options.validate()?;
    let mesh = options.reader().parse(text)?;
    encode_mesh(&mesh, options)
}

/// Encode an in-memory polyhedron as a GLB asset.
///
/// The polyhedron is validated first. `palette` and `default_color` in
/// `options` only affect OFF parsing and are ignored here.
pub fn encode_polyhedron(mesh: &Polyhedron, options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
    let _span = debug_span!("encode_polyhedron").entered();

    options.validate()?;
    mesh.validate()?;
    encode_mesh(mesh, options)
}

fn encode_mesh(mesh: &Polyhedron, options: &EncodeOptions) -> Result<Vec<u8>, CodecError> {
    let normals = if options.parallel_normals {
        compute_vertex_normals_par(mesh)
    } else {
        compute_vertex_normals(mesh)
    };
    let groups = partition(mesh, &normals)?;
    let glb = assemble(&groups, &options.asset())?;
    debug!(
        vertices = mesh.num_vertices(),
        triangles = mesh.num_triangles(),
        bounds = ?mesh.bounds(),
        groups = groups.len(),
        glb_bytes = glb.len(),
        "encoded mesh"
    );
    Ok(glb)
}
