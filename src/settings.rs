use crate::canvas::{DEFAULT_CONNECT_THRESHOLD, LabelPolicy};
use eframe::egui::{self, Color32};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no `--settings` path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "block-flow.json";

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("cannot read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Common slider metadata so bounds live in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

pub const BLOCK_WIDTH_RANGE: SliderRange =
    SliderRange::new(60.0, 400.0, 5.0);
pub const BLOCK_HEIGHT_RANGE: SliderRange =
    SliderRange::new(24.0, 200.0, 2.0);
pub const LABEL_FONT_RANGE: SliderRange =
    SliderRange::new(8.0, 32.0, 1.0);
pub const BACKGROUND_GAP_RANGE: SliderRange =
    SliderRange::new(4.0, 64.0, 1.0);
pub const CONNECT_THRESHOLD_RANGE: SliderRange =
    SliderRange::new(0.0, 20.0, 0.5);

/// `[r, g, b]`
pub type Rgb = [u8; 3];

pub fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockVisualSettings {
    pub width: f32,
    pub height: f32,
    pub label_font_size: f32,
    pub fill: Rgb,
    pub label: Rgb,
    pub border: Rgb,
    pub selected_border: Rgb,
}

impl Default for BlockVisualSettings {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 40.0,
            label_font_size: 14.0,
            fill: [0xff, 0x9e, 0xc6],
            label: [0xff, 0xeb, 0x3b],
            border: [0x9c, 0x4a, 0x6e],
            selected_border: [0xb4, 0x32, 0x3c],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapSettings {
    pub visible: bool,
    pub node_color: Rgb,
    pub mask_color: Rgb,
}

impl Default for MinimapSettings {
    fn default() -> Self {
        Self {
            visible: true,
            node_color: [0xff, 0x9e, 0xc6],
            mask_color: [0xfc, 0xe4, 0xec],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    pub gap: f32,
    pub dot_color: Rgb,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            gap: 16.0,
            dot_color: [0xaa, 0xaa, 0xaa],
        }
    }
}

/// Everything the editor lets the user tune. Missing keys in a settings
/// file take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub block: BlockVisualSettings,
    pub background: BackgroundSettings,
    pub minimap: MinimapSettings,
    pub show_controls: bool,
    pub label_policy: LabelPolicy,
    pub connect_threshold: f32,
    pub fit_view_on_start: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            block: BlockVisualSettings::default(),
            background: BackgroundSettings::default(),
            minimap: MinimapSettings::default(),
            show_controls: true,
            label_policy: LabelPolicy::default(),
            connect_threshold: DEFAULT_CONNECT_THRESHOLD,
            fit_view_on_start: true,
        }
    }
}

impl EditorSettings {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(text).map(Self::clamped)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| {
            SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, or from [`DEFAULT_SETTINGS_FILE`] when it exists.
    /// Any failure falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !fallback.exists() {
                    return Self::default();
                }
                fallback
            }
        };
        match Self::load(&path) {
            Ok(settings) => {
                info!("loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Bring every numeric field inside its slider range.
    pub fn clamped(mut self) -> Self {
        self.block.width = BLOCK_WIDTH_RANGE.clamp(self.block.width);
        self.block.height = BLOCK_HEIGHT_RANGE.clamp(self.block.height);
        self.block.label_font_size =
            LABEL_FONT_RANGE.clamp(self.block.label_font_size);
        self.background.gap = BACKGROUND_GAP_RANGE.clamp(self.background.gap);
        self.connect_threshold =
            CONNECT_THRESHOLD_RANGE.clamp(self.connect_threshold);
        self
    }
}

fn slider(ui: &mut egui::Ui, value: &mut f32, range: SliderRange, text: &str) {
    ui.add(
        egui::Slider::new(value, range.min..=range.max)
            .step_by(range.step as f64)
            .text(text),
    );
}

/// What the settings window asks for this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEdit {
    Changed(EditorSettings),
    Save,
}

pub fn show_settings_window(
    ctx: &egui::Context,
    open: &mut bool,
    current: &EditorSettings,
) -> Option<SettingsEdit> {
    let mut edited = current.clone();
    let mut save = false;
    egui::Window::new("Settings")
        .open(open)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Blocks");
            slider(ui, &mut edited.block.width, BLOCK_WIDTH_RANGE, "Width");
            slider(ui, &mut edited.block.height, BLOCK_HEIGHT_RANGE, "Height");
            slider(
                ui,
                &mut edited.block.label_font_size,
                LABEL_FONT_RANGE,
                "Label size",
            );
            ui.horizontal(|ui| {
                ui.label("Fill");
                ui.color_edit_button_srgb(&mut edited.block.fill);
                ui.label("Label");
                ui.color_edit_button_srgb(&mut edited.block.label);
            });

            ui.separator();
            ui.heading("Canvas");
            slider(
                ui,
                &mut edited.background.gap,
                BACKGROUND_GAP_RANGE,
                "Background gap",
            );
            ui.checkbox(&mut edited.minimap.visible, "Minimap");
            ui.checkbox(&mut edited.show_controls, "Zoom controls");

            ui.separator();
            ui.heading("Editing");
            ui.horizontal(|ui| {
                ui.label("Dropped block label");
                ui.radio_value(
                    &mut edited.label_policy,
                    LabelPolicy::Dragged,
                    "From palette",
                );
                ui.radio_value(
                    &mut edited.label_policy,
                    LabelPolicy::Synthetic,
                    "Block id",
                );
            });
            slider(
                ui,
                &mut edited.connect_threshold,
                CONNECT_THRESHOLD_RANGE,
                "Connect drag threshold",
            );

            ui.separator();
            save = ui.button("Save").clicked();
        });
    if edited != *current {
        Some(SettingsEdit::Changed(edited))
    } else if save {
        Some(SettingsEdit::Save)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_block_styling() {
        let s = EditorSettings::default();
        assert_eq!(s.block.width, 150.0);
        assert_eq!(s.block.height, 40.0);
        assert_eq!(color(s.block.fill), Color32::from_rgb(255, 158, 198));
        assert_eq!(s.background.gap, 16.0);
        assert_eq!(s.minimap.mask_color, [0xfc, 0xe4, 0xec]);
        assert_eq!(s.label_policy, LabelPolicy::Dragged);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s = EditorSettings::from_json(
            r#"{ "label_policy": "Synthetic", "block": { "width": 200.0 } }"#,
        )
        .unwrap();
        assert_eq!(s.label_policy, LabelPolicy::Synthetic);
        assert_eq!(s.block.width, 200.0);
        assert_eq!(s.block.height, 40.0);
        assert!(s.minimap.visible);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let s = EditorSettings::from_json(
            r#"{ "background": { "gap": 1000.0 }, "connect_threshold": -3.0 }"#,
        )
        .unwrap();
        assert_eq!(s.background.gap, BACKGROUND_GAP_RANGE.max);
        assert_eq!(s.connect_threshold, 0.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(EditorSettings::from_json("{ not json").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EditorSettings::load(Path::new(
            "/nonexistent/block-flow-settings.json",
        ))
        .unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn saved_settings_load_back() {
        let path = std::env::temp_dir().join(format!(
            "block-flow-settings-{}.json",
            std::process::id()
        ));
        let mut s = EditorSettings::default();
        s.label_policy = LabelPolicy::Synthetic;
        s.background.gap = 24.0;
        s.save(&path).unwrap();
        let loaded = EditorSettings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn load_or_default_falls_back() {
        let s = EditorSettings::load_or_default(Some(Path::new(
            "/nonexistent/block-flow-settings.json",
        )));
        assert_eq!(s, EditorSettings::default());
    }
}
