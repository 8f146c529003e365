use crate::surface::DrawSurface;
use glam::Vec2;
use playstage_common::{Color, EntityId, Rect, WorldBounds};
use playstage_kernel::World;

/// Scoped viewport/scale substitution.
///
/// On entry the current viewport and scale are saved and replaced with the
/// target rectangle and the world-to-target ratio. Drop restores the saved
/// state, so restoration runs on every exit path, including early returns
/// and panics.
pub struct ViewportScope<'a, S: DrawSurface + ?Sized> {
    surface: &'a mut S,
    saved_viewport: Rect,
    saved_scale: Vec2,
}

impl<'a, S: DrawSurface + ?Sized> ViewportScope<'a, S> {
    /// Substitute `target` as the active viewport, scaled so the full world
    /// extent maps onto it.
    pub fn enter(surface: &'a mut S, target: Rect, world: WorldBounds) -> Self {
        let saved_viewport = surface.viewport();
        let saved_scale = surface.scale();
        surface.set_viewport(target);
        surface.set_scale(Vec2::new(
            target.w / world.width,
            target.h / world.height,
        ));
        Self {
            surface,
            saved_viewport,
            saved_scale,
        }
    }

    pub fn surface(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> Drop for ViewportScope<'_, S> {
    fn drop(&mut self) {
        self.surface.set_viewport(self.saved_viewport);
        self.surface.set_scale(self.saved_scale);
    }
}

/// Draws the entire world into caller-specified target rectangles.
///
/// The same routine serves the full-window draw and any number of shrunk
/// editor-panel draws; nothing below the viewport substitution branches on
/// the destination.
#[derive(Debug, Clone, Copy)]
pub struct SceneRenderer {
    bounds: WorldBounds,
}

impl SceneRenderer {
    pub const BACKGROUND: Color = Color::rgb(20, 20, 20);
    pub const PLACEHOLDER: Color = Color::rgb(255, 0, 255);
    pub const HIGHLIGHT: Color = Color::rgba(255, 255, 0, 120);
    pub const HIGHLIGHT_MARGIN: f32 = 4.0;

    pub fn new(bounds: WorldBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Draw background, entities, and the selection highlight into `target`.
    ///
    /// All coordinates below the scope are world-space; the substituted
    /// viewport/scale state performs the mapping. A zero-area target is a
    /// no-op and leaves the surface untouched.
    pub fn draw_world_into<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        world: &World,
        selection: Option<EntityId>,
        target: Rect,
    ) {
        if target.is_empty() {
            return;
        }

        let mut scope = ViewportScope::enter(surface, target, self.bounds);
        let surface = scope.surface();

        surface.fill_rect(self.bounds.as_rect(), Self::BACKGROUND);

        for id in world.all() {
            let Some(t) = world.transform(id) else {
                continue;
            };
            let textured = world.sprite(id).and_then(|s| Some((s.texture?, s.scale)));
            match textured {
                Some((texture, scale)) => {
                    let dst = Rect::new(
                        t.position.x,
                        t.position.y,
                        t.size.x * scale,
                        t.size.y * scale,
                    );
                    surface.draw_texture(texture, dst, t.angle);
                }
                None => surface.fill_rect(t.aabb(), Self::PLACEHOLDER),
            }
        }

        if let Some(selected) = selection {
            if let Some(t) = world.transform(selected) {
                surface.fill_rect(t.aabb().inflate(Self::HIGHLIGHT_MARGIN), Self::HIGHLIGHT);
            }
        }
    }
}
