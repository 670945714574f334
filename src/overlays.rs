use crate::projection::{Projection, Viewport};
use eframe::egui::{
    self, Color32, CornerRadius, Pos2, Rect, Sense, Shape, Stroke, StrokeKind,
    Vec2, pos2, vec2,
};

const MIN_DOT_SPACING: f32 = 4.0;
const DOT_RADIUS: f32 = 1.0;
const MINIMAP_SIZE: Vec2 = Vec2::new(200.0, 150.0);
const OVERLAY_MARGIN: f32 = 10.0;
const ZOOM_STEP: f32 = 1.2;
const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 4.0;
const FIT_PADDING: f32 = 0.1;

// ------------------------------------------------------------------
// Background
// ------------------------------------------------------------------

/// Screen positions of the background dots visible in `canvas`. Dots sit
/// on multiples of `gap` in diagram space. Nothing is drawn when the
/// zoomed spacing gets too dense.
pub fn dot_positions(canvas: Rect, viewport: &Viewport, gap: f32) -> Vec<Pos2> {
    if gap <= 0.0 || gap * viewport.zoom < MIN_DOT_SPACING {
        return Vec::new();
    }
    let visible = viewport.visible_rect(canvas.size());
    let first_x = (visible.min.x / gap).ceil() as i64;
    let last_x = (visible.max.x / gap).floor() as i64;
    let first_y = (visible.min.y / gap).ceil() as i64;
    let last_y = (visible.max.y / gap).floor() as i64;

    let mut dots = Vec::new();
    for iy in first_y..=last_y {
        for ix in first_x..=last_x {
            let model = pos2(ix as f32 * gap, iy as f32 * gap);
            dots.push(canvas.min + viewport.unproject(model).to_vec2());
        }
    }
    dots
}

pub fn background_shapes(
    canvas: Rect,
    viewport: &Viewport,
    gap: f32,
    color: Color32,
) -> Shape {
    let radius = (DOT_RADIUS * viewport.zoom).max(0.5);
    Shape::Vec(
        dot_positions(canvas, viewport, gap)
            .into_iter()
            .map(|p| Shape::circle_filled(p, radius, color))
            .collect(),
    )
}

// ------------------------------------------------------------------
// Minimap
// ------------------------------------------------------------------

/// Maps diagram space into the minimap frame, preserving aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapTransform {
    bounds: Rect,
    frame: Rect,
    scale: f32,
}

impl MinimapTransform {
    pub fn new(bounds: Rect, frame: Rect) -> Self {
        let w = bounds.width().max(1.0);
        let h = bounds.height().max(1.0);
        let scale = (frame.width() / w).min(frame.height() / h);
        Self {
            bounds,
            frame,
            scale,
        }
    }

    fn offset(&self) -> Vec2 {
        (self.frame.size() - self.bounds.size() * self.scale) / 2.0
    }

    pub fn to_minimap(&self, model: Pos2) -> Pos2 {
        self.frame.min + self.offset() + (model - self.bounds.min) * self.scale
    }

    pub fn to_model(&self, minimap: Pos2) -> Pos2 {
        self.bounds.min + (minimap - self.frame.min - self.offset()) / self.scale
    }

    pub fn rect_to_minimap(&self, model: Rect) -> Rect {
        Rect::from_min_max(self.to_minimap(model.min), self.to_minimap(model.max))
    }
}

pub struct MinimapStyle {
    pub node_color: Color32,
    pub mask_color: Color32,
}

/// Draw the minimap in the bottom-right corner of `canvas`. Clicking or
/// dragging inside it returns a viewport centred on that point.
pub fn show_minimap(
    ui: &mut egui::Ui,
    canvas: Rect,
    viewport: &Viewport,
    blocks: &[Rect],
    style: &MinimapStyle,
) -> Option<Viewport> {
    let frame = Rect::from_min_size(
        canvas.max - MINIMAP_SIZE - Vec2::splat(OVERLAY_MARGIN),
        MINIMAP_SIZE,
    );
    let visible = viewport.visible_rect(canvas.size());
    let bounds = blocks
        .iter()
        .fold(visible, |acc, r| acc.union(*r))
        .expand(20.0);
    let map = MinimapTransform::new(bounds, frame);

    let response = ui.interact(frame, ui.id().with("minimap"), Sense::click_and_drag());
    let painter = ui.painter_at(frame);
    painter.rect_filled(frame, CornerRadius::same(2), style.mask_color);
    painter.rect_filled(
        map.rect_to_minimap(visible),
        CornerRadius::ZERO,
        Color32::WHITE,
    );
    for block in blocks {
        painter.rect_filled(
            map.rect_to_minimap(*block),
            CornerRadius::same(1),
            style.node_color,
        );
    }
    painter.rect_stroke(
        frame,
        CornerRadius::same(2),
        Stroke::new(1.0, Color32::from_gray(160)),
        StrokeKind::Inside,
    );

    let pointer = response.interact_pointer_pos()?;
    if !(response.clicked() || response.dragged()) {
        return None;
    }
    Some(center_on(map.to_model(pointer), viewport.zoom, canvas.size()))
}

// ------------------------------------------------------------------
// Controls
// ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewControl {
    ZoomIn,
    ZoomOut,
    Fit,
}

/// Zoom/fit buttons in the bottom-left corner of `canvas`.
pub fn show_controls(
    ctx: &egui::Context,
    canvas: Rect,
) -> Option<ViewControl> {
    let mut picked = None;
    egui::Area::new(egui::Id::new("canvas_view_controls"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos2(
            canvas.min.x + OVERLAY_MARGIN,
            canvas.max.y - 90.0 - OVERLAY_MARGIN,
        ))
        .show(ctx, |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.vertical(|ui| {
                    if ui.button("+").on_hover_text("Zoom in").clicked() {
                        picked = Some(ViewControl::ZoomIn);
                    }
                    if ui.button("−").on_hover_text("Zoom out").clicked() {
                        picked = Some(ViewControl::ZoomOut);
                    }
                    if ui.button("⛶").on_hover_text("Fit view").clicked() {
                        picked = Some(ViewControl::Fit);
                    }
                });
            });
        });
    picked
}

/// Viewport showing `model` at the centre of a canvas of `size`.
pub fn center_on(model: Pos2, zoom: f32, size: Vec2) -> Viewport {
    Viewport::new(size / 2.0 - model.to_vec2() * zoom, zoom)
}

/// Scale by `factor` keeping the canvas centre fixed.
pub fn zoom_about_center(viewport: &Viewport, factor: f32, size: Vec2) -> Viewport {
    let center = viewport.project((size / 2.0).to_pos2());
    let zoom = (viewport.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    center_on(center, zoom, size)
}

/// Viewport that shows all of `bounds` with some padding.
pub fn fit_viewport(bounds: Rect, size: Vec2) -> Viewport {
    if !bounds.is_positive() {
        return center_on(bounds.center(), 1.0, size);
    }
    let padded = bounds.size() * (1.0 + FIT_PADDING);
    let zoom = (size.x / padded.x)
        .min(size.y / padded.y)
        .clamp(MIN_ZOOM, MAX_ZOOM);
    center_on(bounds.center(), zoom, size)
}

pub fn apply_control(
    control: ViewControl,
    viewport: &Viewport,
    blocks: &[Rect],
    size: Vec2,
) -> Viewport {
    match control {
        ViewControl::ZoomIn => zoom_about_center(viewport, ZOOM_STEP, size),
        ViewControl::ZoomOut => {
            zoom_about_center(viewport, 1.0 / ZOOM_STEP, size)
        }
        ViewControl::Fit => fit_viewport(bounding_rect(blocks), size),
    }
}

pub fn bounding_rect(blocks: &[Rect]) -> Rect {
    blocks
        .iter()
        .copied()
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::from_min_size(Pos2::ZERO, vec2(1.0, 1.0)))
}
