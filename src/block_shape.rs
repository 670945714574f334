use crate::model::{Node, NodeKind};
use crate::settings::{BlockVisualSettings, color};
use eframe::egui::{
    Color32, CornerRadius, FontFamily, FontId, Pos2, Rect, Shape,
    Stroke, StrokeKind, Vec2,
    epaint::{CircleShape, TextShape},
};
use egui_graphs::{DisplayNode, DrawContext, NodeProps};
use once_cell::sync::Lazy;
use petgraph::{EdgeType, stable_graph::IndexType};
use std::sync::{PoisonError, RwLock};

const HANDLE_RADIUS: f32 = 4.0;
const CORNER_RADIUS: u8 = 6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockVisuals {
    pub size: Vec2,
    pub label_font: f32,
    pub fill: Color32,
    pub label: Color32,
    pub border: Color32,
    pub selected_border: Color32,
}

impl From<&BlockVisualSettings> for BlockVisuals {
    fn from(s: &BlockVisualSettings) -> Self {
        Self {
            size: Vec2::new(s.width, s.height),
            label_font: s.label_font_size,
            fill: color(s.fill),
            label: color(s.label),
            border: color(s.border),
            selected_border: color(s.selected_border),
        }
    }
}

impl Default for BlockVisuals {
    fn default() -> Self {
        Self::from(&BlockVisualSettings::default())
    }
}

static STYLED_BLOCK_VISUALS: Lazy<RwLock<BlockVisuals>> =
    Lazy::new(|| RwLock::new(BlockVisuals::default()));

/// Replace the visuals every styled block is drawn with.
pub fn set_block_visuals(visuals: BlockVisuals) {
    let mut guard = STYLED_BLOCK_VISUALS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *guard = visuals;
}

pub fn block_visuals() -> BlockVisuals {
    *STYLED_BLOCK_VISUALS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Visuals registered for a node kind.
fn visuals_for(kind: NodeKind) -> BlockVisuals {
    match kind {
        NodeKind::StyledBlock => block_visuals(),
    }
}

/// Rounded block with a centred label, a target handle on top and a
/// source handle at the bottom. Positions are block centres in canvas
/// coordinates.
#[derive(Clone, Debug)]
pub struct BlockShape {
    pos: Pos2,
    selected: bool,
    dragged: bool,
    hovered: bool,
    label_text: String,
    kind: NodeKind,
    visuals: BlockVisuals,
}

impl From<NodeProps<Node>> for BlockShape {
    fn from(props: NodeProps<Node>) -> Self {
        let kind = props.payload.kind;
        Self {
            pos: props.location(),
            selected: props.selected,
            dragged: props.dragged,
            hovered: props.hovered,
            label_text: props.label,
            kind,
            visuals: visuals_for(kind),
        }
    }
}

impl<E: Clone, Ty: EdgeType, Ix: IndexType> DisplayNode<Node, E, Ty, Ix>
    for BlockShape
{
    fn closest_boundary_point(&self, dir: Vec2) -> Pos2 {
        // Edges leave through the handle facing the other block.
        let half = self.visuals.size / 2.0;
        if dir.y >= 0.0 {
            self.pos + Vec2::new(0.0, half.y)
        } else {
            self.pos - Vec2::new(0.0, half.y)
        }
    }

    fn shapes(&mut self, ctx: &DrawContext) -> Vec<Shape> {
        self.visuals = visuals_for(self.kind);
        let rect = self.canvas_rect();
        let screen = Rect::from_min_max(
            ctx.meta.canvas_to_screen_pos(rect.min),
            ctx.meta.canvas_to_screen_pos(rect.max),
        );
        let stroke = self.border_stroke();
        let corner = CornerRadius::same(CORNER_RADIUS);

        let mut res = Vec::with_capacity(5);
        res.push(Shape::rect_filled(screen, corner, self.visuals.fill));
        res.push(Shape::rect_stroke(
            screen,
            corner,
            stroke,
            StrokeKind::Inside,
        ));

        let handle_radius = ctx.meta.canvas_to_screen_size(HANDLE_RADIUS);
        for center in [screen.center_top(), screen.center_bottom()] {
            res.push(
                CircleShape {
                    center,
                    radius: handle_radius,
                    fill: Color32::from_gray(40),
                    stroke: Stroke::new(1.0, Color32::WHITE),
                }
                .into(),
            );
        }

        let font =
            ctx.meta.canvas_to_screen_size(self.visuals.label_font);
        let galley = ctx.ctx.fonts_mut(|f| {
            f.layout_no_wrap(
                self.label_text.clone(),
                FontId::new(font, FontFamily::Proportional),
                self.visuals.label,
            )
        });
        let label_pos = screen.center() - galley.size() / 2.0;
        res.push(
            TextShape::new(label_pos, galley, self.visuals.label).into(),
        );
        res
    }

    fn update(&mut self, state: &NodeProps<Node>) {
        self.pos = state.location();
        self.selected = state.selected;
        self.dragged = state.dragged;
        self.hovered = state.hovered;
        self.label_text = state.label.clone();
        self.kind = state.payload.kind;
        self.visuals = visuals_for(self.kind);
    }

    fn is_inside(&self, pos: Pos2) -> bool {
        self.canvas_rect().contains(pos)
    }
}

impl BlockShape {
    fn canvas_rect(&self) -> Rect {
        Rect::from_center_size(self.pos, self.visuals.size)
    }

    fn border_stroke(&self) -> Stroke {
        if self.selected {
            Stroke::new(3.0, self.visuals.selected_border)
        } else if self.hovered || self.dragged {
            Stroke::new(2.0, self.visuals.border.gamma_multiply(1.4))
        } else {
            Stroke::new(1.0, self.visuals.border)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};
    use petgraph::{Directed, graph::DefaultIx};

    fn shape_at(center: Pos2) -> BlockShape {
        BlockShape {
            pos: center,
            selected: false,
            dragged: false,
            hovered: false,
            label_text: "Block 1".to_owned(),
            kind: NodeKind::StyledBlock,
            visuals: BlockVisuals {
                size: vec2(150.0, 40.0),
                ..BlockVisuals::default()
            },
        }
    }

    fn inside(shape: &BlockShape, pos: Pos2) -> bool {
        <BlockShape as DisplayNode<Node, (), Directed, DefaultIx>>::is_inside(
            shape, pos,
        )
    }

    fn boundary(shape: &BlockShape, dir: Vec2) -> Pos2 {
        <BlockShape as DisplayNode<Node, (), Directed, DefaultIx>>::closest_boundary_point(
            shape, dir,
        )
    }

    #[test]
    fn hit_test_covers_the_whole_block() {
        let s = shape_at(pos2(325.0, 70.0));
        assert!(inside(&s, pos2(251.0, 51.0)));
        assert!(inside(&s, pos2(399.0, 89.0)));
        assert!(!inside(&s, pos2(325.0, 95.0)));
    }

    #[test]
    fn edges_attach_to_handles() {
        let s = shape_at(pos2(0.0, 0.0));
        assert_eq!(boundary(&s, vec2(0.3, 1.0)), pos2(0.0, 20.0));
        assert_eq!(boundary(&s, vec2(-0.3, -1.0)), pos2(0.0, -20.0));
    }

    #[test]
    fn visuals_follow_settings() {
        let mut settings = BlockVisualSettings::default();
        settings.width = 200.0;
        settings.fill = [1, 2, 3];
        let v = BlockVisuals::from(&settings);
        assert_eq!(v.size, vec2(200.0, 40.0));
        assert_eq!(v.fill, Color32::from_rgb(1, 2, 3));
    }
}
