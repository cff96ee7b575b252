use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use renderers::RendererKind;

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("failed to read preset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse preset: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    UnknownRenderer(String),
}

/// On-disk preset: a renderer selection plus parameter overrides.
///
/// ```toml
/// renderer = "aurora"
///
/// [params]
/// speed = 0.3
/// glow = 1.2
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub renderer: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

impl Preset {
    pub fn from_toml_str(input: &str) -> Result<Self, PresetError> {
        let preset: Preset = toml::from_str(input)?;
        if let Some(name) = &preset.renderer {
            // Surface bad names at load time, not at engine bring-up.
            RendererKind::from_str(name)
                .map_err(|err| PresetError::UnknownRenderer(err.to_string()))?;
        }
        Ok(preset)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The renderer named by the preset, if any. Validated during load.
    pub fn renderer_kind(&self) -> Option<RendererKind> {
        self.renderer
            .as_deref()
            .and_then(|name| RendererKind::from_str(name).ok())
    }

    /// Parameter overrides in a form the engine accepts.
    pub fn overrides(&self) -> Vec<(String, f32)> {
        self.params
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_renderer_and_params() {
        let preset = Preset::from_toml_str(
            r#"
renderer = "plasma"

[params]
speed = 0.3
contrast = 1.5
"#,
        )
        .unwrap();

        assert_eq!(preset.renderer_kind(), Some(RendererKind::Plasma));
        let overrides = preset.overrides();
        assert!(overrides.contains(&("speed".to_string(), 0.3)));
        assert!(overrides.contains(&("contrast".to_string(), 1.5)));
    }

    #[test]
    fn renderer_is_optional() {
        let preset = Preset::from_toml_str("[params]\nspeed = 2.0\n").unwrap();
        assert_eq!(preset.renderer_kind(), None);
        assert_eq!(preset.overrides(), vec![("speed".to_string(), 2.0)]);
    }

    #[test]
    fn unknown_renderer_fails_at_load_time() {
        let err = Preset::from_toml_str("renderer = \"lava\"\n").unwrap_err();
        assert!(matches!(err, PresetError::UnknownRenderer(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Preset::from_toml_str("renderer = [").unwrap_err();
        assert!(matches!(err, PresetError::Parse(_)));
    }
}
