use crate::actions::Action;
use crate::block_shape::{BlockVisuals, set_block_visuals};
use crate::canvas::PointerSample;
use crate::context_menu::{MenuState, show_context_menu};
use crate::overlays::{
    MinimapStyle, apply_control, background_shapes, bounding_rect,
    fit_viewport, show_controls, show_minimap,
};
use crate::palette::{DataTransfer, show_palette};
use crate::render::{
    DiagramView, DisplaySync, apply_viewport, viewport_from_metadata,
};
use crate::settings::{SettingsEdit, color, show_settings_window};
use crate::state::State;
use crate::store::Store;
use eframe::egui::{self, Color32, Key, Rect, Shape, Stroke, vec2};
use egui_graphs::events::Event;
use egui_graphs::{SettingsInteraction, SettingsNavigation, SettingsStyle};
use std::cell::RefCell;
use std::rc::Rc;

const PALETTE_WIDTH: f32 = 200.0;
const CONNECT_PREVIEW_STROKE_WIDTH: f32 = 2.0;
const CONNECT_PREVIEW_COLOR: Color32 = Color32::from_rgb(100, 100, 255);

pub struct BlockFlowApp {
    state: State,
    display: DisplaySync,
    events: Rc<RefCell<Vec<Event>>>,
}

impl BlockFlowApp {
    pub fn new(store: Store) -> Self {
        let block = &store.settings.block;
        set_block_visuals(BlockVisuals::from(block));
        let display = DisplaySync::new(vec2(block.width, block.height));
        Self {
            state: State::new(store),
            display,
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn block_rects(&self) -> Vec<Rect> {
        let block = &self.state.store.settings.block;
        let size = vec2(block.width, block.height);
        self.state
            .store
            .diagram
            .nodes()
            .iter()
            .map(|n| Rect::from_min_size(n.position, size))
            .collect()
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("View", |ui| {
                    if ui.button("Settings").clicked() {
                        ui.close();
                        self.state.dispatch(Action::SetShowSettings {
                            show: true,
                        });
                    }
                    if ui.button("Fit view").clicked() {
                        ui.close();
                        self.state.dispatch(Action::RequestFitView);
                    }
                });
            });
        });
    }

    fn palette_panel(&mut self, ctx: &egui::Context) {
        let accent = color(self.state.store.settings.block.fill);
        egui::SidePanel::left("palette")
            .exact_width(PALETTE_WIDTH)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(8.0))
            .show(ctx, |ui| {
                show_palette(ui, &self.state.store.templates, accent);
                ui.with_layout(
                    egui::Layout::bottom_up(egui::Align::LEFT),
                    |ui| {
                        ui.label("Delete removes selected items");
                        ui.label("Right-click a block for its menu");
                        ui.label("Hold Ctrl and drag between blocks to connect");
                        ui.separator();
                    },
                );
            });
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let settings = self.state.store.settings.clone();
        self.display
            .set_block_size(vec2(settings.block.width, settings.block.height));
        self.display.sync(&self.state.store.diagram);

        let ctrl = ui.input(|i| i.modifiers.ctrl);
        let interactions = SettingsInteraction::new()
            .with_dragging_enabled(!ctrl)
            .with_node_clicking_enabled(true)
            .with_node_selection_enabled(true)
            .with_edge_clicking_enabled(true)
            .with_edge_selection_enabled(true);
        let navigation = SettingsNavigation::new()
            .with_zoom_and_pan_enabled(true)
            .with_fit_to_screen_enabled(false);
        let style = SettingsStyle::new().with_labels_always(true);

        // Reserved so the dots end up underneath the graph.
        let background = ui.painter().add(Shape::Noop);
        let response = ui.add(
            &mut DiagramView::new(self.display.graph_mut())
                .with_interactions(&interactions)
                .with_navigations(&navigation)
                .with_styles(&style)
                .with_event_sink(&self.events),
        );
        let canvas = response.rect;
        let mut viewport = viewport_from_metadata(ui);

        if self.state.store.fit_requested {
            viewport = fit_viewport(bounding_rect(&self.block_rects()), canvas.size());
            apply_viewport(ui, viewport);
            self.state.dispatch(Action::ClearFitRequest);
        }

        ui.painter().set(
            background,
            background_shapes(
                canvas,
                &viewport,
                settings.background.gap,
                color(settings.background.dot_color),
            ),
        );

        // Render-layer changes
        let events: Vec<Event> = self.events.borrow_mut().drain(..).collect();
        let (node_changes, edge_changes) =
            self.display.changes_from_events(events);
        if !node_changes.is_empty() {
            self.state.dispatch(Action::ApplyNodeChanges {
                changes: node_changes,
            });
        }
        if !edge_changes.is_empty() {
            self.state.dispatch(Action::ApplyEdgeChanges {
                changes: edge_changes,
            });
        }

        // Palette drops
        if let Some(payload) = response.dnd_hover_payload::<DataTransfer>() {
            self.state.dispatch(Action::DragOver {
                transfer: (*payload).clone(),
            });
        }
        if let Some(payload) = response.dnd_release_payload::<DataTransfer>()
            && let Some(pointer) = ui.input(|i| i.pointer.interact_pos())
        {
            self.state.dispatch(Action::DropBlock {
                transfer: (*payload).clone(),
                pointer,
                canvas_min: canvas.min,
                viewport,
            });
        }

        // Context menu and pane clicks
        let hovered = self.display.hovered_node();
        let (secondary, primary, pointer) = ui.input(|i| {
            (
                i.pointer.secondary_clicked(),
                i.pointer.primary_clicked(),
                i.pointer.latest_pos(),
            )
        });
        if response.contains_pointer() {
            if secondary
                && let Some(node) = hovered.clone()
                && let Some(pointer) = pointer
            {
                self.state.dispatch(Action::OpenContextMenu { node, pointer });
            }
            if primary && hovered.is_none() {
                self.state.dispatch(Action::PaneClick);
            }
        }

        // Connect gesture
        if ctrl {
            let sample = ui.input(|i| PointerSample {
                pressed: i.pointer.primary_pressed(),
                down: i.pointer.primary_down(),
                released: i.pointer.primary_released(),
                pos: i.pointer.hover_pos(),
            });
            let step = self
                .state
                .store
                .canvas
                .track_connect(&sample, hovered.as_ref());
            if let Some((from, to)) = step.preview {
                ui.painter().line_segment(
                    [from, to],
                    Stroke::new(
                        CONNECT_PREVIEW_STROKE_WIDTH,
                        CONNECT_PREVIEW_COLOR,
                    ),
                );
            }
            if let Some((source, target)) = step.completed {
                self.state.dispatch(Action::Connect { source, target });
            }
        } else {
            self.state.store.canvas.cancel_connect();
        }

        // Overlays
        let blocks = self.block_rects();
        if settings.minimap.visible {
            let style = MinimapStyle {
                node_color: color(settings.minimap.node_color),
                mask_color: color(settings.minimap.mask_color),
            };
            if let Some(moved) =
                show_minimap(ui, canvas, &viewport, &blocks, &style)
            {
                apply_viewport(ui, moved);
            }
        }
        if settings.show_controls
            && let Some(control) = show_controls(ui.ctx(), canvas)
        {
            let next = apply_control(control, &viewport, &blocks, canvas.size());
            apply_viewport(ui, next);
        }
    }

    fn keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (delete, escape) = ctx.input(|i| {
            (
                i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace),
                i.key_pressed(Key::Escape),
            )
        });
        if delete {
            self.state.dispatch(Action::DeleteSelected);
        }
        if escape {
            self.state.dispatch(Action::CloseContextMenu);
        }
    }

    fn windows(&mut self, ctx: &egui::Context) {
        if let MenuState::Open(menu) = self.state.store.canvas.menu()
            && let Some(command) = show_context_menu(ctx, menu)
        {
            self.state.dispatch(Action::MenuCommand { command });
        }

        if self.state.store.show_settings {
            let mut open = true;
            match show_settings_window(ctx, &mut open, &self.state.store.settings)
            {
                Some(SettingsEdit::Changed(settings)) => {
                    self.state.dispatch(Action::UpdateSettings { settings });
                }
                Some(SettingsEdit::Save) => {
                    let path = self.state.store.settings_path.clone();
                    self.state.dispatch(Action::SaveSettings { path });
                }
                None => {}
            }
            if !open {
                self.state.dispatch(Action::SetShowSettings { show: false });
            }
        }

        if let Some(notice) = self.state.store.notice.clone() {
            egui::Window::new("Notice")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&notice);
                    if ui.button("OK").clicked() {
                        self.state.dispatch(Action::DismissNotice);
                    }
                });
        }
    }
}

impl eframe::App for BlockFlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.dispatch(Action::BeginFrame);

        let pressed_at = ctx.input(|i| {
            i.pointer
                .any_pressed()
                .then(|| i.pointer.interact_pos())
                .flatten()
        });
        if let Some(pos) = pressed_at {
            self.state.dispatch(Action::PointerDown { pos });
        }

        self.menu_bar(ctx);
        self.palette_panel(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(Color32::WHITE))
            .show(ctx, |ui| self.canvas(ui));
        self.keyboard(ctx);
        self.windows(ctx);

        self.state.flush();
        set_block_visuals(BlockVisuals::from(&self.state.store.settings.block));
    }
}
