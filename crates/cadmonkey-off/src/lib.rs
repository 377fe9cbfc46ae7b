#![warn(missing_docs)]

//! OFF (Object File Format) reading and writing for the cadmonkey codec.
//!
//! The geometry kernel emits its compiled solid as a triangulated OFF
//! document. [`parse_off`] turns that text into a validated
//! [`Polyhedron`](cadmonkey_mesh::Polyhedron); [`write_off`] goes the other
//! way for the "download as OFF" export.
//!
//! # Example
//!
//! ```
//! use cadmonkey_off::{parse_off, write_off};
//!
//! let mesh = parse_off("OFF 3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap();
//! assert_eq!(mesh.num_triangles(), 1);
//! assert!(write_off(&mesh).starts_with("OFF 3 1 0\n"));
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ParseError, Section};
pub use reader::{parse_off, OffReader};
pub use writer::write_off;
