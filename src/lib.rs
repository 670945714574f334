pub mod actions;
pub mod app;
pub mod block_shape;
pub mod canvas;
pub mod changes;
pub mod context_menu;
pub mod diagram;
pub mod effects;
pub mod layout_pinned;
pub mod model;
pub mod overlays;
pub mod palette;
pub mod projection;
pub mod render;
pub mod settings;
pub mod state;
pub mod store;
pub mod versioned;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

use app::BlockFlowApp;
use settings::EditorSettings;
use std::path::PathBuf;
use store::Store;

/// Build the app with default settings.
pub fn create_app(cc: &eframe::CreationContext<'_>) -> BlockFlowApp {
    create_app_with(
        cc,
        EditorSettings::default(),
        PathBuf::from(settings::DEFAULT_SETTINGS_FILE),
    )
}

pub fn create_app_with(
    cc: &eframe::CreationContext<'_>,
    settings: EditorSettings,
    settings_path: PathBuf,
) -> BlockFlowApp {
    cc.egui_ctx.set_visuals(eframe::egui::Visuals::light());
    BlockFlowApp::new(Store::new(settings, settings_path))
}
