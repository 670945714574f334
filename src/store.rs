use crate::canvas::CanvasController;
use crate::diagram::{Diagram, initial_diagram};
use crate::palette::{BlockTemplate, default_templates};
use crate::settings::{DEFAULT_SETTINGS_FILE, EditorSettings, SettingsError};
use std::path::{Path, PathBuf};

/// Everything the editor knows. Mutated only through `actions::update`
/// and `effects::run`.
#[derive(Debug)]
pub struct Store {
    pub diagram: Diagram,
    pub canvas: CanvasController,
    pub settings: EditorSettings,
    pub settings_path: PathBuf,
    pub templates: Vec<BlockTemplate>,
    /// Message shown in a dismissable window.
    pub notice: Option<String>,
    pub show_settings: bool,
    pub fit_requested: bool,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(EditorSettings::default(), PathBuf::from(DEFAULT_SETTINGS_FILE))
    }
}

impl Store {
    pub fn new(settings: EditorSettings, settings_path: PathBuf) -> Self {
        let diagram = initial_diagram();
        let mut canvas = CanvasController::new(diagram.nodes().len())
            .with_label_policy(settings.label_policy);
        canvas.set_connect_threshold(settings.connect_threshold);
        Self {
            diagram,
            canvas,
            fit_requested: settings.fit_view_on_start,
            settings,
            settings_path,
            templates: default_templates(),
            notice: None,
            show_settings: false,
        }
    }

    /// Swap in new settings and push the parts the controller uses.
    pub fn apply_settings(&mut self, settings: EditorSettings) {
        let settings = settings.clamped();
        self.canvas.set_label_policy(settings.label_policy);
        self.canvas.set_connect_threshold(settings.connect_threshold);
        self.settings = settings;
    }

    pub fn save_settings(&self, path: &Path) -> Result<(), SettingsError> {
        self.settings.save(path)
    }
}
