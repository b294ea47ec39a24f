//! Centralized viewer options with TOML preset support.
//!
//! Palette constants, display toggles and frame sequencing settings live
//! here. Options serialize to/from TOML so a data set can ship its own
//! preset next to the frame directories.

mod colors;
mod display;
mod frames;

use std::path::Path;

pub use colors::ColorOptions;
pub use display::DisplayOptions;
pub use frames::FrameOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MatchVizError;

const PRESET_EXT: &str = "toml";

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[display]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Palette constants.
    #[schemars(skip)]
    pub colors: ColorOptions,
    /// Display toggles and offset.
    pub display: DisplayOptions,
    /// Frame sequencing.
    pub frames: FrameOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<(), MatchVizError> {
        let problems: Vec<String> = self
            .colors
            .problems()
            .into_iter()
            .chain(self.display.problems())
            .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(MatchVizError::OptionsParse(problems.join("; ")))
        }
    }

    /// Parse and validate TOML text. Missing fields use defaults.
    pub fn from_toml(text: &str) -> Result<Self, MatchVizError> {
        let options: Self = toml::from_str(text)
            .map_err(|e| MatchVizError::OptionsParse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Load and validate options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, MatchVizError> {
        let options = Self::from_toml(&std::fs::read_to_string(path)?)?;
        log::debug!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Load the preset `name` from `dir`.
    pub fn load_preset(dir: &Path, name: &str) -> Result<Self, MatchVizError> {
        Self::load(&dir.join(format!("{name}.{PRESET_EXT}")))
    }

    /// Validate, then write pretty-printed TOML, creating parent
    /// directories.
    pub fn save(&self, path: &Path) -> Result<(), MatchVizError> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| MatchVizError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Preset names (`*.toml` stems) in `dir`, sorted. An unreadable
    /// directory has no presets.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == PRESET_EXT))
            .filter_map(|p| p.file_stem()?.to_str().map(str::to_owned))
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TransformName;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[frames]
baseline_frame_id = 3
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.frames.baseline_frame_id, 3);
        assert_eq!(opts.frames.transform, TransformName::Opt);
        assert_eq!(opts.display.offset, [0.0, 0.0, 10.0]);
        assert_eq!(opts.colors.palette_size, 18);
    }

    #[test]
    fn transform_name_uses_file_spelling() {
        let toml_str = r#"
[frames]
transform = "T_init_w_b"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.frames.transform, TransformName::Init);
    }

    #[test]
    fn save_load_and_list_presets() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = Options::default();
        opts.display.offset = [1.0, 2.0, 3.0];
        opts.colors.match_line = [0.0, 1.0, 1.0];

        opts.save(&dir.path().join("presets/wide.toml")).unwrap();
        Options::default()
            .save(&dir.path().join("presets/default.toml"))
            .unwrap();
        std::fs::write(dir.path().join("presets/notes.txt"), "x").unwrap();

        let loaded =
            Options::load(&dir.path().join("presets/wide.toml")).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(
            Options::list_presets(&dir.path().join("presets")),
            vec!["default".to_owned(), "wide".to_owned()]
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = Options::from_toml(
            "[colors]\npalette_size = 0\nsaturation = 1.5\n\
             [display]\naxis_length = -1.0\n",
        )
        .unwrap_err();
        let MatchVizError::OptionsParse(msg) = err else {
            panic!("expected an options error");
        };
        assert!(msg.contains("colors.palette_size"));
        assert!(msg.contains("colors.saturation"));
        assert!(msg.contains("display.axis_length"));
        assert!(!msg.contains("colors.value"));

        let mut opts = Options::default();
        opts.colors.unmatched = [2.0, 0.0, 0.0];
        let dir = tempfile::tempdir().unwrap();
        assert!(opts.save(&dir.path().join("bad.toml")).is_err());
        assert!(!dir.path().join("bad.toml").exists());
    }

    #[test]
    fn presets_load_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = Options::default();
        opts.frames.baseline_frame_id = 7;
        opts.save(&dir.path().join("late.toml")).unwrap();
        assert_eq!(Options::load_preset(dir.path(), "late").unwrap(), opts);
        assert!(matches!(
            Options::load_preset(dir.path(), "missing"),
            Err(MatchVizError::Io(_))
        ));
        assert!(Options::list_presets(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[display\noffset = 1").unwrap();
        assert!(matches!(
            Options::load(&path),
            Err(MatchVizError::OptionsParse(_))
        ));
    }

    #[test]
    fn axis_length_has_a_floor() {
        let display = DisplayOptions::default();
        assert_eq!(display.axis_length_for(0.0), 12.0);
        assert_eq!(display.axis_length_for(10.0), 12.0);
        assert!((display.axis_length_for(100.0) - 15.0).abs() < 1e-9);
        assert!((display.axis_length_for(200.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("display"));
        assert!(props.contains_key("frames"));
        assert!(!props.contains_key("colors"));

        let frames = &props["frames"]["properties"];
        assert!(frames.get("baseline_frame_id").is_some());
        assert!(frames.get("transform").is_none());
    }
}
