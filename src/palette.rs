use eframe::egui::{self, Color32, CornerRadius, Stroke};
use std::collections::BTreeMap;

/// Drag channel key under which a block label travels from the palette to
/// the canvas.
pub const BLOCK_FORMAT: &str = "application/x-block-flow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropEffect {
    #[default]
    None,
    Copy,
    Move,
}

/// Payload carried through `egui::DragAndDrop` while a palette entry is
/// being dragged: string entries keyed by format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTransfer {
    entries: BTreeMap<String, String>,
    pub effect_allowed: DropEffect,
}

impl DataTransfer {
    pub fn set_data(&mut self, format: &str, value: impl Into<String>) {
        self.entries.insert(format.to_owned(), value.into());
    }

    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.entries.get(format).map(String::as_str)
    }

    pub fn allows(&self, effect: DropEffect) -> bool {
        self.effect_allowed == effect
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockTemplate {
    pub title: String,
    pub label: String,
}

pub fn default_templates() -> Vec<BlockTemplate> {
    vec![BlockTemplate {
        title: "Block Template".to_owned(),
        label: "New Block".to_owned(),
    }]
}

/// Fill the drag channel for a palette entry.
pub fn on_block_drag_start(transfer: &mut DataTransfer, label: &str) {
    transfer.set_data(BLOCK_FORMAT, label);
    transfer.effect_allowed = DropEffect::Move;
}

/// Render the sidebar. Each template becomes a drag source whose payload
/// is prepared by [`on_block_drag_start`].
pub fn show_palette(
    ui: &mut egui::Ui,
    templates: &[BlockTemplate],
    accent: Color32,
) {
    ui.heading("Available Blocks");
    ui.label("Drag blocks to the canvas");
    ui.separator();

    for (i, template) in templates.iter().enumerate() {
        let mut transfer = DataTransfer::default();
        on_block_drag_start(&mut transfer, &template.label);

        let id = egui::Id::new(("palette_block", i));
        ui.dnd_drag_source(id, transfer, |ui| {
            egui::Frame::new()
                .fill(accent)
                .stroke(Stroke::new(1.0, Color32::from_rgb(120, 60, 90)))
                .corner_radius(CornerRadius::same(4))
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(
                        egui::RichText::new(&template.title)
                            .color(Color32::BLACK),
                    );
                });
        });
        ui.add_space(6.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_start_fills_channel_and_allows_move() {
        let mut t = DataTransfer::default();
        on_block_drag_start(&mut t, "New Block");
        assert_eq!(t.get_data(BLOCK_FORMAT), Some("New Block"));
        assert!(t.allows(DropEffect::Move));
        assert!(!t.allows(DropEffect::Copy));
    }

    #[test]
    fn other_formats_are_absent() {
        let mut t = DataTransfer::default();
        on_block_drag_start(&mut t, "x");
        assert_eq!(t.get_data("text/plain"), None);
    }

    #[test]
    fn defaults_offer_one_template() {
        let templates = default_templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].label, "New Block");
    }
}
