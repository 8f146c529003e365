use glam::Vec2;
use playstage_common::{Color, Rect, TextureHandle};

/// The output-surface abstraction consumed by the renderer bridge.
///
/// Implementations hold an active viewport rectangle (in output pixel
/// space) and an anisotropic scale. Draw calls take coordinates in the
/// caller's space; the surface applies the active viewport and scale.
pub trait DrawSurface {
    fn viewport(&self) -> Rect;
    fn set_viewport(&mut self, viewport: Rect);

    fn scale(&self) -> Vec2;
    fn set_scale(&mut self, scale: Vec2);

    /// Fill a rectangle with a solid color, honoring the active state.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a cached texture into `dst`, rotated by `angle` degrees about
    /// its center, honoring the active state.
    fn draw_texture(&mut self, texture: TextureHandle, dst: Rect, angle: f32);

    /// Present everything drawn since the last present.
    fn present(&mut self);
}

/// One recorded surface operation, capturing the active state at call time.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    FillRect {
        rect: Rect,
        color: Color,
        viewport: Rect,
        scale: Vec2,
    },
    DrawTexture {
        texture: TextureHandle,
        dst: Rect,
        angle: f32,
        viewport: Rect,
        scale: Vec2,
    },
    Present,
}

/// A surface that records every operation instead of rasterizing.
///
/// Backs the headless render check in the CLI and the bridge tests; the
/// recorded viewport/scale per op is what proves the substitution behaved.
#[derive(Debug)]
pub struct RecordingSurface {
    viewport: Rect,
    scale: Vec2,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    /// A recording surface sized like an output target of `w` x `h` pixels.
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            viewport: Rect::new(0.0, 0.0, w, h),
            scale: Vec2::ONE,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    fn scale(&self) -> Vec2 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(SurfaceOp::FillRect {
            rect,
            color,
            viewport: self.viewport,
            scale: self.scale,
        });
    }

    fn draw_texture(&mut self, texture: TextureHandle, dst: Rect, angle: f32) {
        self.ops.push(SurfaceOp::DrawTexture {
            texture,
            dst,
            angle,
            viewport: self.viewport,
            scale: self.scale,
        });
    }

    fn present(&mut self) {
        self.ops.push(SurfaceOp::Present);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_active_state_with_each_op() {
        let mut s = RecordingSurface::new(640.0, 480.0);
        s.set_viewport(Rect::new(10.0, 10.0, 100.0, 50.0));
        s.set_scale(Vec2::new(0.5, 0.25));
        s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::rgb(1, 2, 3));

        match &s.ops()[0] {
            SurfaceOp::FillRect { viewport, scale, .. } => {
                assert_eq!(*viewport, Rect::new(10.0, 10.0, 100.0, 50.0));
                assert_eq!(*scale, Vec2::new(0.5, 0.25));
            }
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn starts_with_identity_scale_and_full_viewport() {
        let s = RecordingSurface::new(800.0, 600.0);
        assert_eq!(s.viewport(), Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(s.scale(), Vec2::ONE);
    }
}
