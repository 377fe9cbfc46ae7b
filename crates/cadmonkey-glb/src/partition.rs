//! Splitting a mesh into per-material geometry groups.
//!
//! A GLB primitive's index buffer may only address that primitive's own
//! attribute accessors, so each color gets a dense copy of just the vertices
//! its faces use. Vertices shared across colors are duplicated across groups,
//! never within one.

use std::collections::HashMap;

use cadmonkey_mesh::{bounding_box, Color, Face, Polyhedron};
use tracing::{debug, error};

use crate::error::GlbError;

/// A self-contained vertex/index/normal buffer set for one palette color.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryGroup {
    /// Palette index the group was built from.
    pub color_index: u32,
    /// The palette color at `color_index`.
    pub color: Color,
    /// Dense vertex positions, in first-use order.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, aligned with `positions`.
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices into `positions`, three per face, in face order.
    pub indices: Vec<u32>,
}

impl GeometryGroup {
    /// Number of vertices in the group.
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the group.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Per-axis `(min, max)` of the positions, or `None` if there are none.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        bounding_box(self.positions.iter().copied())
    }
}

/// Group faces by palette index and re-index each group densely.
///
/// Groups come out in the order their color is first used by a face, which
/// keeps the assembled asset byte-for-byte reproducible. Palette entries no
/// face uses produce no group; a mesh without faces produces none at all.
pub fn partition(
    mesh: &Polyhedron,
    normals: &[[f32; 3]],
) -> Result<Vec<GeometryGroup>, GlbError> {
    if normals.len() != mesh.vertices.len() {
        let err = GlbError::NormalCountMismatch {
            vertices: mesh.vertices.len(),
            normals: normals.len(),
        };
        error!(%err, "normals are not aligned with vertices");
        return Err(err);
    }

    let mut slots: HashMap<u32, usize> = HashMap::new();
    let mut buckets: Vec<(u32, Vec<&Face>)> = Vec::new();
    for face in &mesh.faces {
        let slot = *slots.entry(face.color).or_insert_with(|| {
            buckets.push((face.color, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(face);
    }

    let groups = buckets
        .into_iter()
        .enumerate()
        .map(|(group, (color_index, faces))| {
            build_group(mesh, normals, group, color_index, &faces)
        })
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| error!(%err, "mesh failed to partition"))?;

    debug!(
        faces = mesh.num_triangles(),
        groups = groups.len(),
        "partitioned mesh by color"
    );
    Ok(groups)
}

fn build_group(
    mesh: &Polyhedron,
    normals: &[[f32; 3]],
    group: usize,
    color_index: u32,
    faces: &[&Face],
) -> Result<GeometryGroup, GlbError> {
    let color = mesh.colors.get(color_index as usize).copied().ok_or_else(|| {
        GlbError::invariant(
            group,
            format!(
                "color index {color_index} outside palette of {}",
                mesh.colors.len()
            ),
        )
    })?;

    let mut arena = LocalVertices::new(mesh, normals, group);
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for face in faces {
        for &global in &face.vertices {
            indices.push(arena.local_index(global)?);
        }
    }

    Ok(GeometryGroup {
        color_index,
        color,
        positions: arena.positions,
        normals: arena.normals,
        indices,
    })
}

/// Growable vertex buffer plus a global -> local index map for one group.
struct LocalVertices<'a> {
    mesh: &'a Polyhedron,
    source_normals: &'a [[f32; 3]],
    group: usize,
    remap: HashMap<u32, u32>,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
}

impl<'a> LocalVertices<'a> {
    fn new(mesh: &'a Polyhedron, source_normals: &'a [[f32; 3]], group: usize) -> Self {
        Self {
            mesh,
            source_normals,
            group,
            remap: HashMap::new(),
            positions: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Local index for `global`, appending the vertex on first use.
    fn local_index(&mut self, global: u32) -> Result<u32, GlbError> {
        if let Some(&local) = self.remap.get(&global) {
            return Ok(local);
        }
        let vertex = self.mesh.vertices.get(global as usize).ok_or_else(|| {
            GlbError::invariant(
                self.group,
                format!(
                    "vertex index {global} outside mesh of {} vertices",
                    self.mesh.vertices.len()
                ),
            )
        })?;
        let local = self.positions.len() as u32;
        self.positions.push(vertex.to_array());
        self.normals.push(self.source_normals[global as usize]);
        self.remap.insert(global, local);
        Ok(local)
    }
}
