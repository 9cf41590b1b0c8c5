//! # Rendering System
//!
//! Backend-neutral half of drawing: the system tracks which drawables exist,
//! derives the camera view for a frame and produces one [`DrawCommand`] per
//! visible drawable. Whatever backend consumes the commands owns the actual
//! draw calls.

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::Isometry3;

use crate::ecs::component::ComponentType;
use crate::ecs::components::{CameraComponent, DrawShape, DrawableComponent, Rgba, TransformComponent};
use crate::ecs::{ComponentHandle, ComponentRegistry, EcsError, EcsResult, Entity};
use crate::foundation::collections::ComponentKey;
use crate::foundation::math::{Mat4, Point3, Vec3};

/// Where the camera is and what it looks at, in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Eye position
    pub position: Vec3,
    /// Point one unit ahead of the eye
    pub target: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
}

impl CameraView {
    /// Right-handed view matrix for this camera
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Isometry3::look_at_rh(&Point3::from(self.position), &Point3::from(self.target), &self.up)
            .to_homogeneous()
    }
}

/// One drawable ready for a backend
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Entity that owns the drawable
    pub entity: Entity,
    /// Shape to draw
    pub shape: DrawShape,
    /// Shape extents
    pub size: Vec3,
    /// Fill color
    pub color: Rgba,
    /// Offset from the entity origin in local space
    pub origin: Vec3,
    /// Transposed world matrix of the owning transform
    pub world_matrix: Mat4,
}

type VisibleSet = Rc<RefCell<Vec<(Entity, ComponentKey)>>>;

/// System that turns drawables into draw commands
pub struct RenderSystem {
    visible: VisibleSet,
}

impl RenderSystem {
    /// Create the system and start tracking drawables in `registry`
    ///
    /// Drawables that already exist are picked up in entity order.
    pub fn new(registry: &mut ComponentRegistry) -> Self {
        let seeded = registry
            .component_handles::<DrawableComponent>()
            .into_iter()
            .map(|(entity, handle)| (entity, handle.key()))
            .collect();
        let visible: VisibleSet = Rc::new(RefCell::new(seeded));

        let added = Rc::clone(&visible);
        registry.add_add_observer(DrawableComponent::KIND, move |event| {
            added.borrow_mut().push((event.entity, event.key));
        });
        let removed = Rc::clone(&visible);
        registry.add_remove_observer(DrawableComponent::KIND, move |event| {
            removed.borrow_mut().retain(|(_, key)| *key != event.key);
        });

        Self { visible }
    }

    /// Number of drawables currently tracked
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.borrow().len()
    }

    /// Camera view for the frame
    ///
    /// The camera entity gets a default camera and transform if it lacks
    /// either one.
    pub fn begin(&self, registry: &mut ComponentRegistry, camera: Entity) -> EcsResult<CameraView> {
        let camera_handle = registry.must_get_component::<CameraComponent>(camera)?;
        let fov_y = registry
            .get(camera_handle)
            .map_or_else(|| CameraComponent::default().fov_y, |camera| camera.fov_y);
        let transform = registry.must_get_component::<TransformComponent>(camera)?;

        let position = registry.world_position(transform).ok_or(EcsError::StaleHandle)?;
        let target = registry.world_target(transform).ok_or(EcsError::StaleHandle)?;
        let up = registry.world_up(transform).ok_or(EcsError::StaleHandle)?;
        Ok(CameraView {
            position,
            target,
            up,
            fov_y,
        })
    }

    /// Draw commands for every active drawable with a transform, in the
    /// order the drawables were added
    pub fn collect_draw_list(&self, registry: &mut ComponentRegistry) -> Vec<DrawCommand> {
        let visible = self.visible.borrow().clone();
        let mut commands = Vec::with_capacity(visible.len());
        for (entity, key) in visible {
            if !registry.is_active(key) {
                continue;
            }
            let Some(drawable) = registry
                .get(ComponentHandle::<DrawableComponent>::new(key))
                .cloned()
            else {
                continue;
            };
            let Some(transform) = registry.component_handle::<TransformComponent>(entity) else {
                log::trace!("Drawable on {entity} has no transform");
                continue;
            };
            let Some(world_matrix) = registry.gl_world_matrix(transform) else {
                continue;
            };
            commands.push(DrawCommand {
                entity,
                shape: drawable.shape,
                size: drawable.size,
                color: drawable.color,
                origin: drawable.origin,
                world_matrix,
            });
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_visible_set_follows_observers() {
        let mut registry = ComponentRegistry::new();
        let first = registry.create_entity();
        registry
            .insert_component(first, DrawableComponent::new(DrawShape::Box, Vec3::new(1.0, 1.0, 1.0), Rgba::RED))
            .unwrap();

        let system = RenderSystem::new(&mut registry);
        assert_eq!(system.visible_count(), 1);

        let second = registry.add_component::<DrawableComponent>(first).unwrap();
        assert_eq!(system.visible_count(), 2);
        registry.remove_component(second);
        assert_eq!(system.visible_count(), 1);
    }

    #[test]
    fn test_draw_list_skips_inactive_and_unplaced_drawables() {
        let mut registry = ComponentRegistry::new();
        let system = RenderSystem::new(&mut registry);

        let placed = registry.create_entity();
        registry
            .insert_component(placed, TransformComponent::at(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        registry.add_component::<DrawableComponent>(placed).unwrap();

        let unplaced = registry.create_entity();
        registry.add_component::<DrawableComponent>(unplaced).unwrap();

        let hidden = registry.create_entity();
        registry.add_component::<TransformComponent>(hidden).unwrap();
        let hidden_drawable = registry.add_component::<DrawableComponent>(hidden).unwrap();
        registry.set_active(hidden_drawable.key(), false);

        let commands = system.collect_draw_list(&mut registry);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].entity, placed);
        // GL layout: translation sits in the bottom row
        assert_relative_eq!(commands[0].world_matrix[(3, 0)], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_begin_adds_missing_camera_parts() {
        let mut registry = ComponentRegistry::new();
        let system = RenderSystem::new(&mut registry);
        let camera = registry.create_entity();

        let view = system.begin(&mut registry, camera).unwrap();
        assert_relative_eq!(view.fov_y, 45.0);
        assert_relative_eq!(view.position, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(view.target, Vec3::y(), epsilon = 1e-5);
        assert_relative_eq!(view.up, Vec3::z(), epsilon = 1e-5);
        assert!(registry.get_component::<CameraComponent>(camera).is_some());
        assert!(registry.get_component::<TransformComponent>(camera).is_some());
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let view = CameraView {
            position: Vec3::new(0.0, -5.0, 0.0),
            target: Vec3::new(0.0, -4.0, 0.0),
            up: Vec3::z(),
            fov_y: 45.0,
        };
        let eye = view.view_matrix() * Vec3::new(0.0, -5.0, 0.0).push(1.0);
        assert_relative_eq!(eye.xyz(), Vec3::zeros(), epsilon = 1e-5);
    }
}
