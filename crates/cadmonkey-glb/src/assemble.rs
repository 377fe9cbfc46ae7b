//! GLB assembly: scene graph, packed binary buffer and container framing.

use std::borrow::Cow;

use gltf::binary::{Glb, Header};
use tracing::{debug, error};

use crate::document::{
    Accessor, Asset, Attributes, Buffer, BufferView, Document, Light, LightList, Material, Mesh,
    Node, NodeExtensions, NodeLight, PbrMetallicRoughness, Primitive, RootExtensions, Scene,
    COMPONENT_FLOAT, COMPONENT_UNSIGNED_INT, KHR_LIGHTS_PUNCTUAL, MODE_TRIANGLES,
    TARGET_ARRAY_BUFFER, TARGET_ELEMENT_ARRAY_BUFFER,
};
use crate::error::GlbError;
use crate::partition::GeometryGroup;

/// MIME type of the assembled asset.
pub const GLB_MIME_TYPE: &str = "model/gltf-binary";

const GLB_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Rotations (x, y, z, w) of the two fixed directional lights.
const LIGHT_ROTATIONS: [[f32; 4]; 2] = [
    [-0.325_057_6, -0.325_057_6, 0.0, 0.888_073_9],
    [0.627_963_1, 0.627_963_1, 0.0, 0.459_700_9],
];

/// Settings for the emitted scene.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetOptions {
    /// Value of `asset.generator`.
    pub generator: String,
    /// Name of the mesh and of the node holding it.
    pub mesh_name: String,
    /// Render both sides of every triangle.
    pub double_sided: bool,
    /// Roughness factor for every material; `None` leaves the glTF default.
    pub roughness: Option<f32>,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            generator: concat!("cadmonkey ", env!("CARGO_PKG_VERSION")).to_string(),
            mesh_name: "model".to_string(),
            double_sided: true,
            roughness: None,
        }
    }
}

/// Assemble geometry groups into a GLB asset.
///
/// Each group becomes one material and one triangle primitive of a single
/// mesh. Two directional lights are added so the asset is lit the same way
/// in any viewer. An empty group list yields a valid asset that holds only
/// the lights. The output is a pure function of the inputs.
pub fn assemble(groups: &[GeometryGroup], options: &AssetOptions) -> Result<Vec<u8>, GlbError> {
    for (i, group) in groups.iter().enumerate() {
        check_group(i, group).inspect_err(|err| error!(%err, "inconsistent geometry group"))?;
    }

    let mut builder = SceneBuilder::new(options);
    let primitives = groups
        .iter()
        .enumerate()
        .map(|(i, group)| builder.add_group(i, group, options))
        .collect::<Vec<_>>();
    let (document, bin) = builder.finish(primitives, options);

    let json = serde_json::to_vec(&document)?;
    let glb = write_container(json, bin)?;
    debug!(
        groups = groups.len(),
        bytes = glb.len(),
        "assembled GLB asset"
    );
    Ok(glb)
}

fn check_group(i: usize, group: &GeometryGroup) -> Result<(), GlbError> {
    if group.positions.len() != group.normals.len() {
        return Err(GlbError::invariant(
            i,
            format!(
                "{} positions but {} normals",
                group.positions.len(),
                group.normals.len()
            ),
        ));
    }
    if group.indices.is_empty() || group.indices.len() % 3 != 0 {
        return Err(GlbError::invariant(
            i,
            format!(
                "index count {} is not a positive multiple of 3",
                group.indices.len()
            ),
        ));
    }
    if let Some(&index) = group
        .indices
        .iter()
        .find(|&&index| index as usize >= group.positions.len())
    {
        return Err(GlbError::invariant(
            i,
            format!(
                "index {index} outside {} positions",
                group.positions.len()
            ),
        ));
    }
    Ok(())
}

/// Accumulates the JSON document and the BIN chunk side by side.
struct SceneBuilder {
    document: Document,
    bin: Vec<u8>,
}

impl SceneBuilder {
    fn new(options: &AssetOptions) -> Self {
        let lights = LIGHT_ROTATIONS
            .iter()
            .map(|_| Light {
                kind: "directional",
                color: [1.0, 1.0, 1.0],
                intensity: 1.0,
            })
            .collect();
        let nodes = LIGHT_ROTATIONS
            .iter()
            .enumerate()
            .map(|(i, &rotation)| Node {
                name: format!("light_{i}"),
                mesh: None,
                rotation: Some(rotation),
                extensions: Some(NodeExtensions {
                    lights_punctual: NodeLight { light: i as u32 },
                }),
            })
            .collect();

        Self {
            document: Document {
                asset: Asset {
                    version: "2.0",
                    generator: options.generator.clone(),
                },
                extensions_used: vec![KHR_LIGHTS_PUNCTUAL],
                extensions: RootExtensions {
                    lights_punctual: LightList { lights },
                },
                scene: 0,
                scenes: Vec::new(),
                nodes,
                meshes: Vec::new(),
                materials: Vec::new(),
                accessors: Vec::new(),
                buffer_views: Vec::new(),
                buffers: Vec::new(),
            },
            bin: Vec::new(),
        }
    }

    /// Add the material, accessors and BIN data for one group. Data is packed
    /// as positions, indices, normals.
    fn add_group(&mut self, i: usize, group: &GeometryGroup, options: &AssetOptions) -> Primitive {
        let color = group.color;
        let material = self.document.materials.len() as u32;
        self.document.materials.push(Material {
            name: format!("color_{}", group.color_index),
            pbr_metallic_roughness: PbrMetallicRoughness {
                base_color_factor: color.to_array(),
                metallic_factor: 0.0,
                roughness_factor: options.roughness,
            },
            alpha_mode: if color.is_translucent() {
                "BLEND"
            } else {
                "OPAQUE"
            },
            double_sided: options.double_sided,
        });

        let (min, max) = match group.bounds() {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
        let position = self.push_accessor(
            vec3_bytes(&group.positions),
            group.positions.len(),
            COMPONENT_FLOAT,
            "VEC3",
            TARGET_ARRAY_BUFFER,
            (min, max),
        );
        let indices = self.push_accessor(
            group.indices.iter().flat_map(|i| i.to_le_bytes()).collect(),
            group.indices.len(),
            COMPONENT_UNSIGNED_INT,
            "SCALAR",
            TARGET_ELEMENT_ARRAY_BUFFER,
            (None, None),
        );
        let normal = self.push_accessor(
            vec3_bytes(&group.normals),
            group.normals.len(),
            COMPONENT_FLOAT,
            "VEC3",
            TARGET_ARRAY_BUFFER,
            (None, None),
        );

        debug!(
            group = i,
            vertices = group.num_vertices(),
            triangles = group.num_triangles(),
            "packed geometry group"
        );
        Primitive {
            attributes: Attributes { position, normal },
            indices,
            material,
            mode: MODE_TRIANGLES,
        }
    }

    /// Append `data` to the BIN chunk behind a new buffer view and accessor.
    fn push_accessor(
        &mut self,
        data: Vec<u8>,
        count: usize,
        component_type: u32,
        kind: &'static str,
        target: u32,
        (min, max): (Option<[f32; 3]>, Option<[f32; 3]>),
    ) -> u32 {
        // every component is 4 bytes wide, so views stay 4-byte aligned
        let view = self.document.buffer_views.len() as u32;
        self.document.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset: self.bin.len(),
            byte_length: data.len(),
            target,
        });
        self.bin.extend_from_slice(&data);

        let accessor = self.document.accessors.len() as u32;
        self.document.accessors.push(Accessor {
            buffer_view: view,
            component_type,
            count,
            kind,
            min,
            max,
        });
        accessor
    }

    fn finish(mut self, primitives: Vec<Primitive>, options: &AssetOptions) -> (Document, Vec<u8>) {
        let mesh = if primitives.is_empty() {
            None
        } else {
            self.document.meshes.push(Mesh {
                name: options.mesh_name.clone(),
                primitives,
            });
            Some(0)
        };
        self.document.nodes.push(Node {
            name: options.mesh_name.clone(),
            mesh,
            rotation: None,
            extensions: None,
        });
        self.document.scenes.push(Scene {
            nodes: (0..self.document.nodes.len() as u32).collect(),
        });
        if !self.bin.is_empty() {
            self.document.buffers.push(Buffer {
                byte_length: self.bin.len(),
            });
        }
        (self.document, self.bin)
    }
}

fn vec3_bytes(values: &[[f32; 3]]) -> Vec<u8> {
    values
        .iter()
        .flatten()
        .flat_map(|c| c.to_le_bytes())
        .collect()
}

/// Frame the JSON and BIN chunks as a GLB v2 container. Both chunks are
/// padded to 4 bytes: JSON with spaces, BIN with zeros. An empty BIN chunk
/// is omitted.
fn write_container(mut json: Vec<u8>, mut bin: Vec<u8>) -> Result<Vec<u8>, GlbError> {
    pad_to_four(&mut json, b' ');
    pad_to_four(&mut bin, 0);

    let mut length = GLB_HEADER_LEN + CHUNK_HEADER_LEN + json.len();
    if !bin.is_empty() {
        length += CHUNK_HEADER_LEN + bin.len();
    }
    let header_length = u32::try_from(length).map_err(|_| GlbError::TooLarge(length))?;

    let glb = Glb {
        header: Header {
            magic: *b"glTF",
            version: 2,
            length: header_length,
        },
        json: Cow::Owned(json),
        bin: (!bin.is_empty()).then_some(Cow::Owned(bin)),
    };
    let mut out = Vec::with_capacity(length);
    glb.to_writer(&mut out)?;
    Ok(out)
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    let padded = bytes.len().next_multiple_of(4);
    bytes.resize(padded, fill);
}
