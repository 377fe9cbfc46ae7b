//! Encoder settings.

use cadmonkey_glb::AssetOptions;
use cadmonkey_mesh::{Color, DEFAULT_FACE_COLOR};
use cadmonkey_off::OffReader;
use serde::Deserialize;

use crate::CodecError;

/// Settings for [`encode_with`](crate::encode_with).
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```
/// use cadmonkey::EncodeOptions;
///
/// let options = EncodeOptions::from_toml_str(
///     r#"
///     double_sided = false
///     roughness = 0.6
///     palette = [{ r = 1.0, g = 0.0, b = 0.0, a = 1.0 }]
///     "#,
/// )
/// .unwrap();
/// assert!(!options.double_sided);
/// assert_eq!(options.palette.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeOptions {
    /// Color of faces that carry no color of their own.
    pub default_color: Color,
    /// Colors that single-index face colors resolve against.
    pub palette: Vec<Color>,
    /// Render both sides of every triangle.
    pub double_sided: bool,
    /// Roughness factor written to every material.
    pub roughness: Option<f32>,
    /// Value of the asset's `generator` field.
    pub generator: String,
    /// Name of the emitted mesh.
    pub mesh_name: String,
    /// Compute vertex normals on the rayon thread pool.
    pub parallel_normals: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        let asset = AssetOptions::default();
        Self {
            default_color: DEFAULT_FACE_COLOR,
            palette: Vec::new(),
            double_sided: asset.double_sided,
            roughness: asset.roughness,
            generator: asset.generator,
            mesh_name: asset.mesh_name,
            parallel_normals: false,
        }
    }
}

impl EncodeOptions {
    /// Load options from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, CodecError> {
        let options: Self = toml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the values that end up in the asset: every color channel must
    /// lie in `[0, 1]`, and so must `roughness`.
    pub fn validate(&self) -> Result<(), CodecError> {
        let invalid = |option: String, reason: String| CodecError::InvalidOption { option, reason };

        if !self.default_color.is_normalized() {
            return Err(invalid(
                "default_color".to_string(),
                format!("channels {:?} must lie in [0, 1]", self.default_color.to_array()),
            ));
        }
        if let Some((i, color)) = self
            .palette
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_normalized())
        {
            return Err(invalid(
                format!("palette[{i}]"),
                format!("channels {:?} must lie in [0, 1]", color.to_array()),
            ));
        }
        if let Some(roughness) = self.roughness.filter(|r| !(0.0..=1.0).contains(r)) {
            return Err(invalid(
                "roughness".to_string(),
                format!("{roughness} must lie in [0, 1]"),
            ));
        }
        Ok(())
    }

    pub(crate) fn reader(&self) -> OffReader {
        OffReader::new()
            .with_palette(self.palette.clone())
            .with_default_color(self.default_color)
    }

    pub(crate) fn asset(&self) -> AssetOptions {
        AssetOptions {
            generator: self.generator.clone(),
            mesh_name: self.mesh_name.clone(),
            double_sided: self.double_sided,
            roughness: self.roughness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            EncodeOptions::from_toml_str("").unwrap(),
            EncodeOptions::default()
        );
    }

    #[test]
    fn test_defaults() {
        let options = EncodeOptions::default();
        assert!(options.double_sided);
        assert!(!options.parallel_normals);
        assert_eq!(options.roughness, None);
        assert_eq!(options.default_color, DEFAULT_FACE_COLOR);
        assert!(options.generator.starts_with("cadmonkey"));
    }

    #[test]
    fn test_full_toml() {
        let options = EncodeOptions::from_toml_str(
            r#"
            default_color = { r = 0.5, g = 0.5, b = 0.5, a = 1.0 }
            palette = [
                { r = 1.0, g = 0.0, b = 0.0, a = 1.0 },
                { r = 0.0, g = 0.0, b = 1.0, a = 0.5 },
            ]
            double_sided = false
            roughness = 0.25
            generator = "customizer"
            mesh_name = "widget"
            parallel_normals = true
            "#,
        )
        .unwrap();
        assert_eq!(options.default_color, Color::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(options.palette[1], Color::new(0.0, 0.0, 1.0, 0.5));
        assert!(!options.double_sided);
        assert_eq!(options.roughness, Some(0.25));
        assert_eq!(options.generator, "customizer");
        assert_eq!(options.mesh_name, "widget");
        assert!(options.parallel_normals);

        let asset = options.asset();
        assert_eq!(asset.mesh_name, "widget");
        assert!(!asset.double_sided);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EncodeOptions::from_toml_str("double_sides = true").unwrap_err();
        assert!(matches!(err, CodecError::Config(_)));
    }

    #[test]
    fn test_nan_roughness_rejected() {
        let err = EncodeOptions::from_toml_str("roughness = nan").unwrap_err();
        assert!(
            matches!(&err, CodecError::InvalidOption { option, .. } if option == "roughness"),
            "{err}"
        );
        assert!(EncodeOptions::from_toml_str("roughness = 1.5").is_err());
        assert!(EncodeOptions::from_toml_str("roughness = 0.0").is_ok());
    }

    #[test]
    fn test_out_of_range_colors_rejected() {
        let err = EncodeOptions::from_toml_str(
            "default_color = { r = 7.0, g = -2.0, b = 0.0, a = 1.0 }",
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            CodecError::InvalidOption { option, .. } if option == "default_color"
        ));

        let options = EncodeOptions {
            palette: vec![DEFAULT_FACE_COLOR, Color::new(0.0, 0.0, 1.0, 2.0)],
            ..EncodeOptions::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("palette[1]"), "{err}");
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(EncodeOptions::from_toml_str("roughness = \"shiny\"").is_err());
    }
}
