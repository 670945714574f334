use eframe::egui::{Pos2, Rect, Vec2};

/// Maps a point given in canvas-widget pixels (relative to the widget's
/// top-left corner) to diagram coordinates.
pub trait Projection {
    fn project(&self, local: Pos2) -> Pos2;

    /// Inverse of [`Projection::project`].
    fn unproject(&self, model: Pos2) -> Pos2;
}

/// Pan/zoom transform of the canvas. `pan` is the widget-local pixel
/// position of the diagram origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Viewport {
    pub const IDENTITY: Self = Self {
        pan: Vec2::ZERO,
        zoom: 1.0,
    };

    pub fn new(pan: Vec2, zoom: f32) -> Self {
        Self { pan, zoom }
    }

    /// Diagram-space rectangle visible through a canvas of `size`.
    pub fn visible_rect(&self, size: Vec2) -> Rect {
        Rect::from_min_max(
            self.project(Pos2::ZERO),
            self.project(size.to_pos2()),
        )
    }
}

impl Projection for Viewport {
    fn project(&self, local: Pos2) -> Pos2 {
        let zoom = if self.zoom.abs() < f32::EPSILON {
            1.0
        } else {
            self.zoom
        };
        ((local.to_vec2() - self.pan) / zoom).to_pos2()
    }

    fn unproject(&self, model: Pos2) -> Pos2 {
        (model.to_vec2() * self.zoom + self.pan).to_pos2()
    }
}

/// Translate a pointer position in viewport (window) pixels into diagram
/// coordinates: subtract the canvas top-left first, then project.
pub fn pointer_to_model(
    pointer: Pos2,
    canvas_min: Pos2,
    projection: &impl Projection,
) -> Pos2 {
    projection.project((pointer - canvas_min).to_pos2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn identity_subtracts_canvas_offset_only() {
        let p = pointer_to_model(
            pos2(120.0, 80.0),
            pos2(20.0, 10.0),
            &Viewport::IDENTITY,
        );
        assert_eq!(p, pos2(100.0, 70.0));
    }

    #[test]
    fn pan_and_zoom_are_inverted() {
        let vp = Viewport::new(vec2(50.0, -20.0), 2.0);
        let model = vp.project(pos2(150.0, 80.0));
        assert_eq!(model, pos2(50.0, 50.0));
        assert_eq!(vp.unproject(model), pos2(150.0, 80.0));
    }

    #[test]
    fn visible_rect_scales_with_zoom() {
        let vp = Viewport::new(Vec2::ZERO, 2.0);
        let r = vp.visible_rect(vec2(100.0, 60.0));
        assert_eq!(r, Rect::from_min_max(Pos2::ZERO, pos2(50.0, 30.0)));
    }
}
