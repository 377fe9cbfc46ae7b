use cadmonkey_glb::GlbError;
use cadmonkey_mesh::MeshError;
use cadmonkey_off::ParseError;
use thiserror::Error;

/// Errors returned by the encoder.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The OFF text is malformed.
    #[error("OFF parse error: {0}")]
    Parse(#[from] ParseError),
    /// A caller-built polyhedron references missing vertices or colors.
    #[error("invalid polyhedron: {0}")]
    Mesh(#[from] MeshError),
    /// Grouping or GLB assembly failed.
    #[error("GLB assembly error: {0}")]
    Assembly(#[from] GlbError),
    /// An encoder option is outside its valid range.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        /// Name of the offending option.
        option: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Encoder options could not be loaded.
    #[error("invalid encoder options: {0}")]
    Config(#[from] toml::de::Error),
}
