//! Error types for OFF parsing.

use std::fmt;

use thiserror::Error;

/// Which block of the document ran short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The vertex block.
    Vertices,
    /// The face block.
    Faces,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Vertices => f.write_str("vertex"),
            Section::Faces => f.write_str("face"),
        }
    }
}

/// Errors that can occur while reading an OFF document.
///
/// Every variant carries the 1-based line number it was detected on. For
/// problems found at end of input, that is the line after the last one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The document has no non-blank lines.
    #[error("line {line}: missing OFF header")]
    MissingHeader {
        /// Line number.
        line: usize,
    },

    /// The first line is not the `OFF` marker.
    #[error("line {line}: expected OFF header, found {found:?}")]
    InvalidHeader {
        /// Line number.
        line: usize,
        /// The line that was found instead.
        found: String,
    },

    /// The counts line is not three non-negative integers.
    #[error("line {line}: expected `vertices faces edges` counts, found {found:?}")]
    InvalidCounts {
        /// Line number.
        line: usize,
        /// The offending line content.
        found: String,
    },

    /// The document ended before the declared number of lines.
    #[error("line {line}: expected {declared} {section} lines, found {found}")]
    UnexpectedEof {
        /// Line number (one past the last line).
        line: usize,
        /// Block that ran short.
        section: Section,
        /// Count declared in the header.
        declared: usize,
        /// Lines actually present.
        found: usize,
    },

    /// A token that should be a number is not one.
    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber {
        /// Line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A vertex line does not have exactly three coordinates.
    #[error("line {line}: expected 3 vertex coordinates, found {tokens}")]
    MalformedVertex {
        /// Line number.
        line: usize,
        /// Number of tokens on the line.
        tokens: usize,
    },

    /// A face line has the wrong shape.
    #[error("line {line}: malformed face: {message}")]
    MalformedFace {
        /// Line number.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A face is not a triangle.
    #[error("line {line}: face has {vertices} vertices, only triangles are supported")]
    NonTriangularFace {
        /// Line number.
        line: usize,
        /// Declared vertex count of the face.
        vertices: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("line {line}: vertex index {index} out of range (vertex count {vertex_count})")]
    VertexIndexOutOfRange {
        /// Line number.
        line: usize,
        /// The offending index.
        index: u64,
        /// Declared vertex count.
        vertex_count: usize,
    },

    /// A face references a palette entry that does not exist.
    #[error("line {line}: color index {index} out of range (palette has {palette_len} colors)")]
    ColorIndexOutOfRange {
        /// Line number.
        line: usize,
        /// The offending index.
        index: u64,
        /// Palette size when the face was read.
        palette_len: usize,
    },

    /// An inline color channel is outside its valid range.
    #[error("line {line}: invalid color channel {token:?}")]
    InvalidColor {
        /// Line number.
        line: usize,
        /// The offending token.
        token: String,
    },
}

impl ParseError {
    /// The 1-based line number the error was detected on.
    pub fn line(&self) -> usize {
        match *self {
            ParseError::MissingHeader { line }
            | ParseError::InvalidHeader { line, .. }
            | ParseError::InvalidCounts { line, .. }
            | ParseError::UnexpectedEof { line, .. }
            | ParseError::InvalidNumber { line, .. }
            | ParseError::MalformedVertex { line, .. }
            | ParseError::MalformedFace { line, .. }
            | ParseError::NonTriangularFace { line, .. }
            | ParseError::VertexIndexOutOfRange { line, .. }
            | ParseError::ColorIndexOutOfRange { line, .. }
            | ParseError::InvalidColor { line, .. } => line,
        }
    }

    pub(crate) fn invalid_number(line: usize, token: &str) -> Self {
        Self::InvalidNumber {
            line,
            token: token.to_string(),
        }
    }

    pub(crate) fn malformed_face(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedFace {
            line,
            message: message.into(),
        }
    }
}
