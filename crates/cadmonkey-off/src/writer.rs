//! OFF document writer.

use std::fmt;

use cadmonkey_mesh::Polyhedron;

/// Write `mesh` as an OFF document in the layout OpenSCAD exports: counts on
/// the marker line, one vertex per line, and each face followed by its
/// inline RGBA color.
///
/// Coordinates and channels use the shortest decimal form that reads back to
/// the same `f32`, so [`crate::parse_off`] reproduces the mesh exactly when
/// its palette is in first-use order.
///
/// A face whose color index is outside `mesh.colors` is written without a
/// color and reads back with the reader's default color. Run
/// [`Polyhedron::validate`] first to rule that out.
pub fn write_off(mesh: &Polyhedron) -> String {
    OffDocument(mesh).to_string()
}

struct OffDocument<'a>(&'a Polyhedron);

impl fmt::Display for OffDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mesh = self.0;
        writeln!(f, "OFF {} {} 0", mesh.vertices.len(), mesh.faces.len())?;
        for v in &mesh.vertices {
            writeln!(f, "{} {} {}", v.x, v.y, v.z)?;
        }
        for face in &mesh.faces {
            let [a, b, c] = face.vertices;
            write!(f, "3 {a} {b} {c}")?;
            if let Some(color) = mesh.colors.get(face.color as usize) {
                write!(f, " {} {} {} {}", color.r, color.g, color.b, color.a)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_off;
    use cadmonkey_mesh::{Color, Face, Vertex};

    #[test]
    fn test_write_layout() {
        let mesh = Polyhedron::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.5, 0.0, 0.0),
                Vertex::new(0.0, -2.0, 0.25),
            ],
            vec![Face::new([0, 1, 2], 0)],
            vec![Color::new(1.0, 0.5, 0.0, 1.0)],
        );
        assert_eq!(
            write_off(&mesh),
            "OFF 3 1 0\n0 0 0\n1.5 0 0\n0 -2 0.25\n3 0 1 2 1 0.5 0 1\n"
        );
    }

    #[test]
    fn test_written_document_parses_back() {
        let mesh = Polyhedron::new(
            vec![
                Vertex::new(0.1, 0.2, 0.3),
                Vertex::new(1.0 / 3.0, 0.0, 1e-7),
                Vertex::new(-7.25, 1e6, 0.0),
                Vertex::new(2.0, 2.0, 2.0),
            ],
            vec![
                Face::new([0, 1, 2], 0),
                Face::new([0, 2, 3], 1),
                Face::new([1, 2, 3], 0),
            ],
            vec![
                Color::new(0.2, 0.4, 0.6, 1.0),
                Color::new(1.0 / 255.0, 0.0, 1.0, 0.25),
            ],
        );
        assert_eq!(parse_off(&write_off(&mesh)).unwrap(), mesh);
    }

    #[test]
    fn test_unknown_color_written_bare() {
        let mesh = Polyhedron::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0),
                Vertex::new(0.0, 1.0, 0.0),
            ],
            vec![Face::new([0, 1, 2], 3)],
            Vec::new(),
        );
        assert!(mesh.validate().is_err());
        let text = write_off(&mesh);
        assert!(text.ends_with("\n3 0 1 2\n"));
        assert_eq!(
            parse_off(&text).unwrap().colors,
            vec![cadmonkey_mesh::DEFAULT_FACE_COLOR]
        );
    }

    #[test]
    fn test_write_empty() {
        let text = write_off(&Polyhedron::default());
        assert_eq!(text, "OFF 0 0 0\n");
        assert!(parse_off(&text).unwrap().is_empty());
    }
}
