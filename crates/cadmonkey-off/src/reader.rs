//! OFF document reader.
//!
//! Accepts the triangulated OFF that OpenSCAD's `--export-format=off`
//! produces:
//!
//! ```text
//! OFF 4 2 0          <- marker, counts may also sit on the next line
//! 0 0 0              <- vertex lines: x y z
//! 1 0 0
//! 1 1 0
//! 0 1 0
//! 3 0 1 2 255 0 0 255    <- face lines: 3 i0 i1 i2 [color]
//! 3 0 2 3
//! ```
//!
//! The optional face color is a palette index, an RGB triple or an RGBA
//! tuple. Channels are `[0, 1]` floats, or `0..=255` integers when every
//! channel is an integer and at least one exceeds 1. Blank lines and `#`
//! comments are skipped.

use cadmonkey_mesh::{Color, Face, Palette, Polyhedron, Vertex, DEFAULT_FACE_COLOR};
use tracing::{debug, trace};

use crate::error::{ParseError, Section};

/// Parse an OFF document with no seed palette and the default face color.
pub fn parse_off(text: &str) -> Result<Polyhedron, ParseError> {
    OffReader::new().parse(text)
}

/// Configurable OFF reader.
#[derive(Debug, Clone)]
pub struct OffReader {
    palette: Vec<Color>,
    default_color: Color,
}

impl Default for OffReader {
    fn default() -> Self {
        Self {
            palette: Vec::new(),
            default_color: DEFAULT_FACE_COLOR,
        }
    }
}

impl OffReader {
    /// Create a reader with an empty seed palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the palette that single-index face colors resolve against.
    ///
    /// Seed colors keep their indices. Inline colors are interned after
    /// them in first-seen order, and an index may also name one of those.
    pub fn with_palette(mut self, colors: impl Into<Vec<Color>>) -> Self {
        self.palette = colors.into();
        self
    }

    /// Color assigned to faces that carry none.
    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    /// Parse `text` into a [`Polyhedron`]. Nothing is returned on failure.
    pub fn parse(&self, text: &str) -> Result<Polyhedron, ParseError> {
        let mut lines = ContentLines::new(text);

        let (header_line, header) = lines.next().ok_or(ParseError::MissingHeader {
            line: lines.eof_line(),
        })?;
        let mut header_tokens = header.split_whitespace();
        if header_tokens.next() != Some("OFF") {
            return Err(ParseError::InvalidHeader {
                line: header_line,
                found: header.to_string(),
            });
        }

        // OpenSCAD writes `OFF V F E` on a single line.
        let inline_counts: Vec<&str> = header_tokens.collect();
        let (counts_line, counts) = if inline_counts.is_empty() {
            let (line, content) = lines.next().ok_or(ParseError::InvalidCounts {
                line: lines.eof_line(),
                found: String::new(),
            })?;
            (line, content.split_whitespace().collect())
        } else {
            (header_line, inline_counts)
        };
        let (vertex_count, face_count) = parse_counts(counts_line, &counts)?;

        let mut vertices = Vec::with_capacity(vertex_count.min(text.len()));
        for found in 0..vertex_count {
            let (line, content) = lines.next().ok_or(ParseError::UnexpectedEof {
                line: lines.eof_line(),
                section: Section::Vertices,
                declared: vertex_count,
                found,
            })?;
            vertices.push(parse_vertex(line, content)?);
        }

        let mut palette = Palette::from_colors(self.palette.clone());
        let mut faces = Vec::with_capacity(face_count.min(text.len()));
        for found in 0..face_count {
            let (line, content) = lines.next().ok_or(ParseError::UnexpectedEof {
                line: lines.eof_line(),
                section: Section::Faces,
                declared: face_count,
                found,
            })?;
            faces.push(self.parse_face(line, content, vertex_count, &mut palette)?);
        }

        let trailing = lines.count();
        if trailing > 0 {
            trace!(trailing, "ignoring lines after the face block");
        }

        let mesh = Polyhedron::new(vertices, faces, palette.into_colors());
        debug!(
            vertices = mesh.num_vertices(),
            faces = mesh.num_triangles(),
            colors = mesh.colors.len(),
            "parsed OFF document"
        );
        Ok(mesh)
    }

    fn parse_face(
        &self,
        line: usize,
        content: &str,
        vertex_count: usize,
        palette: &mut Palette,
    ) -> Result<Face, ParseError> {
        let tokens: Vec<&str> = content.split_whitespace().collect();
        let (&first, rest) = tokens
            .split_first()
            .ok_or_else(|| ParseError::malformed_face(line, "empty face line"))?;

        let arity: usize = first
            .parse()
            .map_err(|_| ParseError::invalid_number(line, first))?;
        if arity != 3 {
            return Err(ParseError::NonTriangularFace {
                line,
                vertices: arity,
            });
        }
        if rest.len() < 3 {
            return Err(ParseError::malformed_face(
                line,
                format!("expected 3 vertex indices, found {}", rest.len()),
            ));
        }

        let mut vertices = [0u32; 3];
        for (slot, &token) in vertices.iter_mut().zip(&rest[..3]) {
            let index: u64 = token
                .parse()
                .map_err(|_| ParseError::invalid_number(line, token))?;
            if index >= vertex_count as u64 {
                return Err(ParseError::VertexIndexOutOfRange {
                    line,
                    index,
                    vertex_count,
                });
            }
            *slot = index as u32;
        }

        let color = match &rest[3..] {
            [] => palette.intern(self.default_color),
            [token] => {
                let index: u64 = token
                    .parse()
                    .map_err(|_| ParseError::invalid_number(line, token))?;
                match u32::try_from(index) {
                    Ok(index) if palette.get(index).is_some() => index,
                    _ => {
                        return Err(ParseError::ColorIndexOutOfRange {
                            line,
                            index,
                            palette_len: palette.len(),
                        })
                    }
                }
            }
            channels @ ([_, _, _] | [_, _, _, _]) => palette.intern(parse_color(line, channels)?),
            other => {
                return Err(ParseError::malformed_face(
                    line,
                    format!("expected 0, 1, 3 or 4 color values, found {}", other.len()),
                ))
            }
        };

        Ok(Face::new(vertices, color))
    }
}

/// Non-blank, non-comment lines with their 1-based physical line numbers.
struct ContentLines<'a> {
    inner: std::str::Lines<'a>,
    line: usize,
}

impl<'a> ContentLines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines(),
            line: 0,
        }
    }

    /// Line number reported for errors found at end of input.
    fn eof_line(&self) -> usize {
        self.line + 1
    }
}

impl<'a> Iterator for ContentLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.inner.next()?;
            self.line += 1;
            let content = raw.split_once('#').map_or(raw, |(before, _)| before).trim();
            if !content.is_empty() {
                return Some((self.line, content));
            }
        }
    }
}

fn parse_counts(line: usize, tokens: &[&str]) -> Result<(usize, usize), ParseError> {
    let invalid = || ParseError::InvalidCounts {
        line,
        found: tokens.join(" "),
    };
    let [v, f, e] = tokens else {
        return Err(invalid());
    };
    let vertex_count: usize = v.parse().map_err(|_| invalid())?;
    let face_count: usize = f.parse().map_err(|_| invalid())?;
    e.parse::<usize>().map_err(|_| invalid())?;
    // face indices are stored as u32
    if vertex_count > u32::MAX as usize {
        return Err(invalid());
    }
    Ok((vertex_count, face_count))
}

fn parse_vertex(line: usize, content: &str) -> Result<Vertex, ParseError> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    let &[x, y, z] = tokens.as_slice() else {
        return Err(ParseError::MalformedVertex {
            line,
            tokens: tokens.len(),
        });
    };
    let coord = |token: &str| -> Result<f32, ParseError> {
        token
            .parse::<f32>()
            .ok()
            .filter(|c| c.is_finite())
            .ok_or_else(|| ParseError::invalid_number(line, token))
    };
    Ok(Vertex::new(coord(x)?, coord(y)?, coord(z)?))
}

fn parse_color(line: usize, tokens: &[&str]) -> Result<Color, ParseError> {
    let invalid = |token: &str| ParseError::InvalidColor {
        line,
        token: token.to_string(),
    };

    let bytes: Option<Vec<u32>> = tokens.iter().map(|t| t.parse().ok()).collect();
    if let Some(bytes) = bytes.filter(|bytes| bytes.iter().any(|&b| b > 1)) {
        let channels = tokens
            .iter()
            .zip(bytes)
            .map(|(&token, b)| u8::try_from(b).map_err(|_| invalid(token)))
            .collect::<Result<Vec<u8>, _>>()?;
        let alpha = channels.get(3).copied().unwrap_or(u8::MAX);
        return Ok(Color::from_rgba8(channels[0], channels[1], channels[2], alpha));
    }

    let channels = tokens
        .iter()
        .map(|&token| {
            let c: f32 = token
                .parse()
                .map_err(|_| ParseError::invalid_number(line, token))?;
            if (0.0..=1.0).contains(&c) {
                Ok(c)
            } else {
                Err(invalid(token))
            }
        })
        .collect::<Result<Vec<f32>, _>>()?;
    let alpha = channels.get(3).copied().unwrap_or(1.0);
    Ok(Color::new(channels[0], channels[1], channels[2], alpha))
}
