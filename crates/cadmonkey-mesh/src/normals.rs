//! Per-vertex normal synthesis by area-weighted face normal accumulation.
//!
//! Each face contributes the unnormalized cross product of its two edges
//! (length proportional to twice its area) to each of its three vertices.
//! The per-vertex sums are normalized at the end. A vertex that no face
//! touches keeps a zero normal; GLB consumers fall back to their own
//! default for it.
//!
//! Products, sums and the final length are taken in `f64`. The square of a
//! cross product of any two finite `f32` edges stays finite and nonzero in
//! `f64`, so every coordinate scale the OFF reader accepts yields unit
//! normals.

use rayon::prelude::*;

use crate::{Face, Polyhedron};

/// Compute one normal per vertex, aligned with [`Polyhedron::vertices`].
///
/// # Panics
///
/// Panics if a face references a vertex past the end of the vertex list.
/// Meshes returned by the OFF reader, or that pass
/// [`Polyhedron::validate`], never do.
pub fn compute_vertex_normals(mesh: &Polyhedron) -> Vec<[f32; 3]> {
    let mut sums = vec![[0.0f64; 3]; mesh.vertices.len()];
    for face in &mesh.faces {
        let n = face_normal(mesh, face);
        for &v in &face.vertices {
            accumulate(&mut sums[v as usize], n);
        }
    }
    sums.into_iter().map(normalize).collect()
}

/// Parallel variant of [`compute_vertex_normals`].
///
/// Face normals are computed in parallel, then every vertex gathers its
/// faces' contributions through a vertex-to-face adjacency list. Each vertex
/// sums in face order, exactly like the sequential loop, so the result is
/// bitwise identical to [`compute_vertex_normals`].
///
/// # Panics
///
/// Same as [`compute_vertex_normals`].
pub fn compute_vertex_normals_par(mesh: &Polyhedron) -> Vec<[f32; 3]> {
    let face_normals: Vec<[f64; 3]> = mesh
        .faces
        .par_iter()
        .map(|face| face_normal(mesh, face))
        .collect();

    let (offsets, incident) = vertex_faces(mesh);

    (0..mesh.vertices.len())
        .into_par_iter()
        .map(|v| {
            let mut sum = [0.0f64; 3];
            for &f in &incident[offsets[v]..offsets[v + 1]] {
                accumulate(&mut sum, face_normals[f as usize]);
            }
            normalize(sum)
        })
        .collect()
}

/// Compressed vertex -> face adjacency. Faces of vertex `v` are
/// `incident[offsets[v]..offsets[v + 1]]`, in ascending face order; a face
/// that repeats a vertex is listed once per occurrence.
fn vertex_faces(mesh: &Polyhedron) -> (Vec<usize>, Vec<u32>) {
    let mut offsets = vec![0usize; mesh.vertices.len() + 1];
    for face in &mesh.faces {
        for &v in &face.vertices {
            offsets[v as usize + 1] += 1;
        }
    }
    for i in 1..offsets.len() {
        offsets[i] += offsets[i - 1];
    }

    let mut cursor = offsets.clone();
    let mut incident = vec![0u32; mesh.faces.len() * 3];
    for (f, face) in mesh.faces.iter().enumerate() {
        for &v in &face.vertices {
            let slot = &mut cursor[v as usize];
            incident[*slot] = f as u32;
            *slot += 1;
        }
    }
    (offsets, incident)
}

/// Unnormalized face normal `(v1 - v0) x (v2 - v0)`.
fn face_normal(mesh: &Polyhedron, face: &Face) -> [f64; 3] {
    let [v0, v1, v2] = face
        .vertices
        .map(|i| mesh.vertices[i as usize].to_array().map(f64::from));

    let (ax, ay, az) = (v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]);
    let (bx, by, bz) = (v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]);

    [ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx]
}

fn accumulate(sum: &mut [f64; 3], n: [f64; 3]) {
    sum[0] += n[0];
    sum[1] += n[1];
    sum[2] += n[2];
}

fn normalize(n: [f64; 3]) -> [f32; 3] {
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    // zero-length sums stay zero
    if len > 0.0 {
        n.map(|c| (c / len) as f32)
    } else {
        [0.0; 3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Vertex, DEFAULT_FACE_COLOR};
    use approx::assert_relative_eq;

    fn length(n: [f32; 3]) -> f32 {
        (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt()
    }

    /// Unit cube, 8 corners, 12 outward-facing triangles.
    fn cube() -> Polyhedron {
        let vertices = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(1.0, 1.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
            Vertex::new(0.0, 0.0, 1.0),
            Vertex::new(1.0, 0.0, 1.0),
            Vertex::new(1.0, 1.0, 1.0),
            Vertex::new(0.0, 1.0, 1.0),
        ];
        let tris: [[u32; 3]; 12] = [
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [1, 2, 6],
            [1, 6, 5],
            [0, 4, 7],
            [0, 7, 3],
        ];
        let faces = tris.iter().map(|&t| Face::new(t, 0)).collect();
        Polyhedron::new(vertices, faces, vec![DEFAULT_FACE_COLOR])
    }

    #[test]
    fn test_single_triangle_normal() {
        let mesh = Polyhedron::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(4.0, 0.0, 0.0),
                Vertex::new(0.0, 4.0, 0.0),
            ],
            vec![Face::new([0, 1, 2], 0)],
            vec![DEFAULT_FACE_COLOR],
        );
        let normals = compute_vertex_normals(&mesh);
        assert_eq!(normals.len(), 3);
        for n in normals {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_winding_flips_normal() {
        let mesh = Polyhedron::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0),
                Vertex::new(0.0, 1.0, 0.0),
            ],
            vec![Face::new([0, 2, 1], 0)],
            vec![DEFAULT_FACE_COLOR],
        );
        assert_eq!(compute_vertex_normals(&mesh)[0], [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_cube_corner_normals_point_outward() {
        let mesh = cube();
        let normals = compute_vertex_normals(&mesh);
        for (v, n) in mesh.vertices.iter().zip(&normals) {
            assert_relative_eq!(length(*n), 1.0, epsilon = 1e-4);
            // corner normals point away from the cube center
            let out = [v.x - 0.5, v.y - 0.5, v.z - 0.5];
            let dot = out[0] * n[0] + out[1] * n[1] + out[2] * n[2];
            assert!(dot > 0.0, "normal {n:?} at {v:?} points inward");
        }
    }

    #[test]
    fn test_area_weighting() {
        // Vertex 0 is shared by a large triangle in the XY plane and a small
        // one in the XZ plane; the large one dominates.
        let mesh = Polyhedron::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(10.0, 0.0, 0.0),
                Vertex::new(0.0, 10.0, 0.0),
                Vertex::new(0.0, 0.0, 1.0),
                Vertex::new(1.0, 0.0, 0.0),
            ],
            vec![Face::new([0, 1, 2], 0), Face::new([0, 3, 4], 0)],
            vec![DEFAULT_FACE_COLOR],
        );
        let n = compute_vertex_normals(&mesh)[0];
        assert!(n[2] > 0.99, "expected mostly +Z, got {n:?}");
        assert!(n[1] > 0.0 && n[1] < 0.02);
    }

    #[test]
    fn test_unreferenced_vertex_gets_zero_normal() {
        let mut mesh = cube();
        mesh.vertices.push(Vertex::new(5.0, 5.0, 5.0));
        let normals = compute_vertex_normals(&mesh);
        assert_eq!(normals[8], [0.0, 0.0, 0.0]);
        assert!(normals.iter().take(8).all(|n| n.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_degenerate_face_does_not_produce_nan() {
        let mesh = Polyhedron::new(
            vec![Vertex::new(1.0, 1.0, 1.0), Vertex::new(1.0, 1.0, 1.0)],
            vec![Face::new([0, 1, 1], 0)],
            vec![DEFAULT_FACE_COLOR],
        );
        for n in compute_vertex_normals(&mesh) {
            assert_eq!(n, [0.0, 0.0, 0.0]);
        }
    }

    fn right_triangle(size: f32) -> Polyhedron {
        Polyhedron::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(size, 0.0, 0.0),
                Vertex::new(0.0, size, 0.0),
            ],
            vec![Face::new([0, 1, 2], 0)],
            vec![DEFAULT_FACE_COLOR],
        )
    }

    #[test]
    fn test_extreme_scales_give_unit_normals() {
        for size in [1e10, 1e20, 1e-12, 1e-30, f32::MAX / 2.0] {
            let mesh = right_triangle(size);
            for n in compute_vertex_normals(&mesh) {
                assert_eq!(n, [0.0, 0.0, 1.0], "size {size}");
            }
            assert_eq!(
                compute_vertex_normals_par(&mesh),
                compute_vertex_normals(&mesh)
            );
        }
    }

    #[test]
    fn test_large_skewed_faces_stay_unit() {
        let mesh = Polyhedron::new(
            vec![
                Vertex::new(-3e19, 1e19, 2e18),
                Vertex::new(4e19, -2e19, 5e19),
                Vertex::new(1e19, 6e19, -7e19),
            ],
            vec![Face::new([0, 1, 2], 0)],
            vec![DEFAULT_FACE_COLOR],
        );
        for n in compute_vertex_normals(&mesh) {
            assert!(n.iter().all(|c| c.is_finite()));
            assert_relative_eq!(length(n), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_empty_mesh() {
        assert!(compute_vertex_normals(&Polyhedron::default()).is_empty());
        assert!(compute_vertex_normals_par(&Polyhedron::default()).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential_bitwise() {
        let mut mesh = cube();
        // a skewed copy so sums are not all exact
        let offset = mesh.vertices.len() as u32;
        let skewed: Vec<_> = mesh
            .vertices
            .iter()
            .map(|v| Vertex::new(v.x * 1.3 + 0.1, v.y * 0.7 + v.x * 0.21, v.z * 2.9 - 0.3))
            .collect();
        mesh.vertices.extend(skewed);
        let extra: Vec<_> = mesh
            .faces
            .iter()
            .map(|f| Face::new(f.vertices.map(|i| i + offset), 0))
            .collect();
        mesh.faces.extend(extra);
        mesh.faces.push(Face::new([0, 0, 9], 0));

        let seq = compute_vertex_normals(&mesh);
        let par = compute_vertex_normals_par(&mesh);
        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.map(f32::to_bits), b.map(f32::to_bits));
        }
    }
}
