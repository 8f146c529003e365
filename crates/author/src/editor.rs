use glam::Vec2;
use playstage_common::{EntityId, Rect, WorldBounds};
use playstage_kernel::World;

/// The most recent rectangle the renderer bridge drew the world into,
/// together with the world extent it was scaled from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView {
    pub rect: Rect,
    pub bounds: WorldBounds,
}

impl PanelView {
    /// Map an output-space point back into world space, inverting the
    /// bridge's world-to-target scaling. `None` for a zero-area rectangle.
    pub fn screen_to_world(&self, screen: Vec2) -> Option<Vec2> {
        if self.rect.is_empty() {
            return None;
        }
        Some(Vec2::new(
            (screen.x - self.rect.x) * self.bounds.width / self.rect.w,
            (screen.y - self.rect.y) * self.bounds.height / self.rect.h,
        ))
    }
}

/// Pointer-driven editing over the last-drawn panel rectangle.
///
/// Holds a non-owning selection reference; all lookups re-check liveness
/// against the world, and destroy paths clear the selection atomically.
#[derive(Debug, Default)]
pub struct EditorSurface {
    selection: Option<EntityId>,
    panel: Option<PanelView>,
    dragging: bool,
}

impl EditorSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rectangle the bridge just drew into. Gestures arriving
    /// before the next draw are interpreted against this view.
    pub fn set_panel(&mut self, rect: Rect, bounds: WorldBounds) {
        self.panel = Some(PanelView { rect, bounds });
    }

    pub fn panel(&self) -> Option<&PanelView> {
        self.panel.as_ref()
    }

    pub fn selection(&self) -> Option<EntityId> {
        self.selection
    }

    pub fn select(&mut self, id: EntityId) {
        self.selection = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.dragging = false;
    }

    /// Drop a selection whose entity is no longer alive. Called at the top
    /// of every frame so no later stage can observe a dead id.
    pub fn prune_dead(&mut self, world: &World) {
        if let Some(id) = self.selection {
            if !world.contains(id) {
                self.selection = None;
                self.dragging = false;
            }
        }
    }

    /// Begin a gesture. Presses outside the panel rectangle are ignored.
    ///
    /// With an empty selection this hit-tests all entities in ascending id
    /// order and selects the first whose AABB contains the mapped point; no
    /// match leaves the selection empty. With a selection, the press merely
    /// arms the drag.
    pub fn pointer_pressed(&mut self, world: &World, screen: Vec2) {
        let Some(panel) = self.panel else {
            return;
        };
        if !panel.rect.contains(screen) {
            return;
        }
        self.dragging = true;

        if self.selection.is_some() {
            return;
        }
        let Some(point) = panel.screen_to_world(screen) else {
            return;
        };
        for id in world.all() {
            if let Some(t) = world.transform(id) {
                if t.aabb().contains(point) {
                    self.selection = Some(id);
                    tracing::debug!(%id, "entity selected");
                    break;
                }
            }
        }
    }

    /// Continue a gesture: the selected entity's center tracks the mapped
    /// world point exactly. No bounds clamp is applied here.
    pub fn pointer_dragged(&mut self, world: &mut World, screen: Vec2) {
        if !self.dragging {
            return;
        }
        let Some(panel) = self.panel else {
            return;
        };
        let Some(point) = panel.screen_to_world(screen) else {
            return;
        };
        if let Some(id) = self.selection {
            if let Some(t) = world.transform_mut(id) {
                t.set_center(point);
            }
        }
    }

    /// End the gesture.
    pub fn pointer_released(&mut self) {
        self.dragging = false;
    }

    /// Destroy the selected entity, clearing the selection atomically with
    /// the destroy call. Returns the destroyed id, if any.
    pub fn delete_selected(&mut self, world: &mut World) -> Option<EntityId> {
        let id = self.selection.take()?;
        self.dragging = false;
        world.destroy(id);
        tracing::debug!(%id, "selected entity deleted");
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playstage_common::Transform;

    const BOUNDS: WorldBounds = WorldBounds {
        width: 800.0,
        height: 600.0,
    };

    fn world_with_entity(pos: Vec2, size: Vec2) -> (World, EntityId) {
        let mut world = World::new();
        let id = world.create();
        world.attach_transform(id, Transform::new(pos, size));
        (world, id)
    }

    fn half_panel_editor() -> EditorSurface {
        // Scale factor 2 in both axes.
        let mut editor = EditorSurface::new();
        editor.set_panel(Rect::new(0.0, 0.0, 400.0, 300.0), BOUNDS);
        editor
    }

    #[test]
    fn corner_mapping_inverts_scaling() {
        let editor = half_panel_editor();
        let panel = editor.panel().unwrap();
        assert_eq!(
            panel.screen_to_world(Vec2::new(0.0, 0.0)),
            Some(Vec2::new(0.0, 0.0))
        );
        assert_eq!(
            panel.screen_to_world(Vec2::new(400.0, 300.0)),
            Some(Vec2::new(800.0, 600.0))
        );
    }

    #[test]
    fn offset_panel_mapping() {
        let mut editor = EditorSurface::new();
        editor.set_panel(Rect::new(100.0, 50.0, 200.0, 150.0), BOUNDS);
        let panel = editor.panel().unwrap();
        assert_eq!(
            panel.screen_to_world(Vec2::new(100.0, 50.0)),
            Some(Vec2::new(0.0, 0.0))
        );
        assert_eq!(
            panel.screen_to_world(Vec2::new(300.0, 200.0)),
            Some(Vec2::new(800.0, 600.0))
        );
    }

    #[test]
    fn zero_area_panel_maps_nothing() {
        let mut editor = EditorSurface::new();
        editor.set_panel(Rect::new(0.0, 0.0, 0.0, 300.0), BOUNDS);
        assert_eq!(
            editor.panel().unwrap().screen_to_world(Vec2::new(10.0, 10.0)),
            None
        );
    }

    #[test]
    fn drag_tracks_mapped_point_exactly() {
        let (mut world, id) = world_with_entity(Vec2::new(10.0, 10.0), Vec2::new(64.0, 64.0));
        let mut editor = half_panel_editor();
        editor.select(id);

        editor.pointer_pressed(&world, Vec2::new(100.0, 100.0));
        editor.pointer_dragged(&mut world, Vec2::new(150.0, 130.0));

        // Screen (150, 130) maps to world (300, 260); the center tracks it.
        let t = world.transform(id).unwrap();
        assert_eq!(t.center(), Vec2::new(300.0, 260.0));
        assert_eq!(t.position, Vec2::new(268.0, 228.0));
    }

    #[test]
    fn drag_applies_no_bounds_clamp() {
        let (mut world, id) = world_with_entity(Vec2::new(10.0, 10.0), Vec2::new(64.0, 64.0));
        let mut editor = half_panel_editor();
        editor.select(id);

        editor.pointer_pressed(&world, Vec2::new(100.0, 100.0));
        editor.pointer_dragged(&mut world, Vec2::new(399.0, 299.0));
        // Mapped point is near the world's far corner; the AABB may hang
        // past the boundary since physics owns clamping.
        let t = world.transform(id).unwrap();
        assert!(t.position.x + t.size.x > BOUNDS.width);
    }

    #[test]
    fn press_selects_first_hit_in_id_order() {
        let mut world = World::new();
        let a = world.create();
        world.attach_transform(a, Transform::new(Vec2::new(90.0, 90.0), Vec2::new(40.0, 40.0)));
        let b = world.create();
        world.attach_transform(b, Transform::new(Vec2::new(80.0, 80.0), Vec2::new(60.0, 60.0)));

        let mut editor = half_panel_editor();
        // Screen (50, 50) maps to world (100, 100), inside both AABBs.
        editor.pointer_pressed(&world, Vec2::new(50.0, 50.0));
        assert_eq!(editor.selection(), Some(a));
    }

    #[test]
    fn press_with_no_hit_leaves_selection_empty() {
        let (world, _) = world_with_entity(Vec2::new(700.0, 500.0), Vec2::new(10.0, 10.0));
        let mut editor = half_panel_editor();
        editor.pointer_pressed(&world, Vec2::new(10.0, 10.0));
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn press_outside_panel_is_ignored() {
        let (world, _) = world_with_entity(Vec2::new(100.0, 100.0), Vec2::new(64.0, 64.0));
        let mut editor = half_panel_editor();
        editor.pointer_pressed(&world, Vec2::new(500.0, 400.0));
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn drag_without_press_does_nothing() {
        let (mut world, id) = world_with_entity(Vec2::new(10.0, 10.0), Vec2::new(64.0, 64.0));
        let mut editor = half_panel_editor();
        editor.select(id);
        editor.pointer_dragged(&mut world, Vec2::new(200.0, 200.0));
        assert_eq!(world.transform(id).unwrap().position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn delete_clears_selection_atomically() {
        let (mut world, id) = world_with_entity(Vec2::new(10.0, 10.0), Vec2::new(64.0, 64.0));
        let mut editor = half_panel_editor();
        editor.select(id);

        assert_eq!(editor.delete_selected(&mut world), Some(id));
        assert_eq!(editor.selection(), None);
        assert!(!world.contains(id));
        // A second delete has nothing to act on.
        assert_eq!(editor.delete_selected(&mut world), None);
    }

    #[test]
    fn prune_drops_dead_selection_before_the_next_frame() {
        let (mut world, id) = world_with_entity(Vec2::new(10.0, 10.0), Vec2::new(64.0, 64.0));
        let mut editor = half_panel_editor();
        editor.select(id);

        world.destroy(id);
        editor.prune_dead(&world);
        assert_eq!(editor.selection(), None);
    }

    #[test]
    fn selection_survives_prune_while_alive() {
        let (world, id) = world_with_entity(Vec2::new(10.0, 10.0), Vec2::new(64.0, 64.0));
        let mut editor = half_panel_editor();
        editor.select(id);
        editor.prune_dead(&world);
        assert_eq!(editor.selection(), Some(id));
    }
}
