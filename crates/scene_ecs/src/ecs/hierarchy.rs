//! Transform hierarchy
//!
//! Parent/child links between transforms are arena handles, so evaluating a
//! world matrix or walking a subtree goes through the registry.
//!
//! A world matrix is `parent_world * local`. It is rebuilt lazily: edits made
//! through [`TransformMut`] mark the node and all its descendants dirty, and
//! the next [`ComponentRegistry::world_matrix`] call rebuilds only the dirty
//! part of the chain.

use crate::ecs::components::transform::{TransformComponent, TransformHandle};
use crate::ecs::{ComponentRegistry, EcsError, EcsResult, Entity};
use crate::foundation::math::{utils::normalize_or, Mat4, Mat4Ext, Vec3};

impl ComponentRegistry {
    /// Editing view over one transform; `None` for a stale handle
    pub fn transform_mut(&mut self, handle: TransformHandle) -> Option<TransformMut<'_>> {
        self.get(handle)?;
        Some(TransformMut {
            registry: self,
            handle,
        })
    }

    /// Editing view over the transform of `entity`
    pub fn entity_transform_mut(&mut self, entity: Entity) -> Option<TransformMut<'_>> {
        let handle = self.component_handle::<TransformComponent>(entity)?;
        self.transform_mut(handle)
    }

    pub(crate) fn mark_subtree_dirty(&mut self, root: TransformHandle) {
        let mut pending = vec![root];
        while let Some(handle) = pending.pop() {
            if let Some(transform) = self.get_mut(handle) {
                transform.dirty = true;
                pending.extend(transform.children.iter().copied());
            }
        }
    }

    /// Whether the node or any of its ancestors changed since the last rebuild
    #[must_use]
    pub fn is_transform_dirty(&self, handle: TransformHandle) -> bool {
        let mut cursor = Some(handle);
        while let Some(current) = cursor {
            let Some(transform) = self.get(current) else {
                break;
            };
            if transform.dirty {
                return true;
            }
            cursor = transform.parent;
        }
        false
    }

    /// World matrix of a transform, rebuilding the dirty part of its chain
    pub fn world_matrix(&mut self, handle: TransformHandle) -> Option<Mat4> {
        if !self.is_transform_dirty(handle) {
            return self.get(handle).map(|transform| *transform.cached_world_matrix());
        }
        let parent = self.get(handle)?.parent;
        let parent_world = parent
            .and_then(|parent| self.world_matrix(parent))
            .unwrap_or_else(Mat4::identity);
        let transform = self.get_mut(handle)?;
        transform.refresh_world(&parent_world);
        log::trace!("Rebuilt world matrix (count {})", transform.recompute_count());
        Some(*transform.cached_world_matrix())
    }

    /// Transposed world matrix, the layout GL-style uniform uploads expect
    pub fn gl_world_matrix(&mut self, handle: TransformHandle) -> Option<Mat4> {
        self.world_matrix(handle)?;
        self.get(handle).map(|transform| *transform.gl_world_matrix())
    }

    /// World-space position of the transform's origin
    pub fn world_position(&mut self, handle: TransformHandle) -> Option<Vec3> {
        Some(self.world_matrix(handle)?.apply_point(&Vec3::zeros()))
    }

    /// World-space point one unit along the transform's forward axis
    pub fn world_target(&mut self, handle: TransformHandle) -> Option<Vec3> {
        Some(self.world_matrix(handle)?.apply_point(&Vec3::y()))
    }

    /// World-space up direction
    pub fn world_up(&mut self, handle: TransformHandle) -> Option<Vec3> {
        let up = self.world_matrix(handle)?.apply_vector(&Vec3::z());
        Some(normalize_or(&up, Vec3::z()))
    }

    /// Express a world-space point in the transform's local frame
    pub fn to_local_pos(&mut self, handle: TransformHandle, world_position: Vec3) -> Option<Vec3> {
        let inverse = self.world_matrix(handle)?.try_inverse()?;
        Some(inverse.apply_point(&world_position))
    }

    /// Turn a transform toward a world-space point
    pub fn look_at_world(&mut self, handle: TransformHandle, target: Vec3, up: Vec3) -> EcsResult<()> {
        let parent = self.get(handle).ok_or(EcsError::StaleHandle)?.parent;
        let (target, up) = match parent.and_then(|parent| self.world_matrix(parent)) {
            Some(parent_world) => {
                let inverse = parent_world.try_inverse().unwrap_or_else(Mat4::identity);
                (inverse.apply_point(&target), inverse.apply_vector(&up))
            }
            None => (target, up),
        };
        if let Some(transform) = self.get_mut(handle) {
            transform.look_at(target, up);
        }
        self.mark_subtree_dirty(handle);
        Ok(())
    }

    /// Attach `child` under `parent`, detaching it from any previous parent
    ///
    /// The child keeps its local values, so its world placement now follows
    /// the new parent.
    pub fn add_child(&mut self, parent: TransformHandle, child: TransformHandle) -> EcsResult<()> {
        let parent_entity = self.transform_entity(parent)?;
        let child_entity = self.transform_entity(child)?;

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(EcsError::HierarchyCycle {
                    parent: parent_entity,
                    child: child_entity,
                });
            }
            cursor = self.get(current).and_then(TransformComponent::parent);
        }

        let previous = self.get(child).and_then(TransformComponent::parent);
        if previous == Some(parent) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.remove_child(previous, child);
        }
        if let Some(transform) = self.get_mut(parent) {
            transform.children.push(child);
        }
        if let Some(transform) = self.get_mut(child) {
            transform.parent = Some(parent);
        }
        self.mark_subtree_dirty(child);
        log::debug!("Attached {child_entity} under {parent_entity}");
        Ok(())
    }

    /// Unlink `child` from `parent`; `false` if it was not a child
    ///
    /// Local values are kept, so the child's world placement changes. Use
    /// [`ComponentRegistry::detach`] to keep it in place.
    pub fn remove_child(&mut self, parent: TransformHandle, child: TransformHandle) -> bool {
        let Some(transform) = self.get_mut(parent) else {
            return false;
        };
        let before = transform.children.len();
        transform.children.retain(|c| *c != child);
        if transform.children.len() == before {
            return false;
        }
        if let Some(transform) = self.get_mut(child) {
            if transform.parent == Some(parent) {
                transform.parent = None;
            }
        }
        self.mark_subtree_dirty(child);
        true
    }

    /// Unlink a transform from its parent without moving it in world space
    ///
    /// Returns `Ok(false)` when it had no parent.
    pub fn detach(&mut self, child: TransformHandle) -> EcsResult<bool> {
        let Some(parent) = self.get(child).ok_or(EcsError::StaleHandle)?.parent else {
            return Ok(false);
        };
        let world = self.world_matrix(child).ok_or(EcsError::StaleHandle)?;
        let position = world.apply_point(&Vec3::zeros());
        let forward = normalize_or(&world.apply_vector(&Vec3::y()), Vec3::y());
        let up = normalize_or(&world.apply_vector(&Vec3::z()), Vec3::z());

        if let Some(transform) = self.get_mut(child) {
            transform.set_position(position);
            transform.set_orientation(forward, up);
        }
        self.remove_child(parent, child);
        Ok(true)
    }

    /// Destroy a transform's subtree, children first
    ///
    /// Every node's entity goes through [`ComponentRegistry::remove_entity`],
    /// so all of its components are torn down with their hooks and observers.
    /// Returns the number of components removed.
    pub fn destroy_with_children(&mut self, handle: TransformHandle) -> usize {
        let Some(transform) = self.get(handle) else {
            return 0;
        };
        let children = transform.children.clone();
        let parent = transform.parent;

        let mut removed = 0;
        for child in children {
            removed += self.destroy_with_children(child);
        }
        if let Some(parent) = parent {
            self.remove_child(parent, handle);
        }
        if let Some(entity) = self.entity_of(handle.key()) {
            removed += self.remove_entity(entity);
        }
        removed
    }

    fn transform_entity(&self, handle: TransformHandle) -> EcsResult<Entity> {
        self.get(handle).ok_or(EcsError::StaleHandle)?;
        self.entity_of(handle.key()).ok_or(EcsError::StaleHandle)
    }
}

/// Mutable view over one transform
///
/// Every edit marks the transform and all of its descendants dirty. Edits
/// chain:
///
/// ```rust
/// use scene_ecs::prelude::*;
///
/// let mut registry = ComponentRegistry::new();
/// let handle = registry.spawn::<TransformComponent>().unwrap();
/// let mut transform = registry.transform_mut(handle).unwrap();
/// transform.set_position(1.0, 2.0, 3.0).rotate_heading(90.0);
/// let position = transform.world_position().unwrap();
/// assert!((position - Vec3::new(1.0, 2.0, 3.0)).norm() < 1e-5);
/// ```
pub struct TransformMut<'a> {
    registry: &'a mut ComponentRegistry,
    handle: TransformHandle,
}

impl TransformMut<'_> {
    /// Handle of the transform being edited
    #[must_use]
    pub const fn handle(&self) -> TransformHandle {
        self.handle
    }

    /// Read the current state
    #[must_use]
    pub fn get(&self) -> Option<&TransformComponent> {
        self.registry.get(self.handle)
    }

    fn edit(&mut self, apply: impl FnOnce(&mut TransformComponent)) -> &mut Self {
        if let Some(transform) = self.registry.get_mut(self.handle) {
            apply(transform);
        }
        self.registry.mark_subtree_dirty(self.handle);
        self
    }

    /// Set the local position
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.edit(|t| t.set_position(Vec3::new(x, y, z)))
    }

    /// Set the local position from a vector
    pub fn set_position_vec(&mut self, position: Vec3) -> &mut Self {
        self.edit(|t| t.set_position(position))
    }

    /// Set forward and up; up is re-orthogonalized against forward
    pub fn set_orientation(&mut self, forward: Vec3, up: Vec3) -> &mut Self {
        self.edit(|t| t.set_orientation(forward, up))
    }

    /// Move along local up
    pub fn move_up(&mut self, distance: f32) -> &mut Self {
        self.edit(|t| t.translate(t.up() * distance))
    }

    /// Move against local up
    pub fn move_down(&mut self, distance: f32) -> &mut Self {
        self.edit(|t| t.translate(-t.up() * distance))
    }

    /// Move along local forward
    pub fn move_forward(&mut self, distance: f32) -> &mut Self {
        self.edit(|t| t.translate(t.forward() * distance))
    }

    /// Move against local forward
    pub fn move_backwards(&mut self, distance: f32) -> &mut Self {
        self.edit(|t| t.translate(-t.forward() * distance))
    }

    /// Move along local left
    pub fn move_left(&mut self, distance: f32) -> &mut Self {
        self.edit(|t| t.translate(t.left() * distance))
    }

    /// Move along local right
    pub fn move_right(&mut self, distance: f32) -> &mut Self {
        self.edit(|t| t.translate(t.right() * distance))
    }

    /// Rotate forward about local up
    pub fn rotate_yaw(&mut self, degrees: f32) -> &mut Self {
        self.edit(|t| t.rotate_yaw(degrees))
    }

    /// Rotate forward and up about local left; the angle is wrapped into [0, 360)
    pub fn rotate_pitch(&mut self, degrees: f32) -> &mut Self {
        self.edit(|t| t.rotate_pitch(degrees))
    }

    /// Rotate up about local forward
    pub fn rotate_roll(&mut self, degrees: f32) -> &mut Self {
        self.edit(|t| t.rotate_roll(degrees))
    }

    /// Rotate forward and up about world Z
    pub fn rotate_heading(&mut self, degrees: f32) -> &mut Self {
        self.edit(|t| t.rotate_heading(degrees))
    }

    /// Face a point given in parent space
    pub fn look_at(&mut self, target: Vec3, up: Vec3) -> &mut Self {
        self.edit(|t| t.look_at(target, up))
    }

    /// World matrix, rebuilt if needed
    pub fn world_matrix(&mut self) -> Option<Mat4> {
        self.registry.world_matrix(self.handle)
    }

    /// Transposed world matrix
    pub fn gl_world_matrix(&mut self) -> Option<Mat4> {
        self.registry.gl_world_matrix(self.handle)
    }

    /// World-space position
    pub fn world_position(&mut self) -> Option<Vec3> {
        self.registry.world_position(self.handle)
    }

    /// World-space point one unit ahead
    pub fn world_target(&mut self) -> Option<Vec3> {
        self.registry.world_target(self.handle)
    }

    /// World-space point in this transform's local frame
    pub fn to_local_pos(&mut self, world_position: Vec3) -> Option<Vec3> {
        self.registry.to_local_pos(self.handle, world_position)
    }

    /// Attach `child` under this transform
    pub fn add_child(&mut self, child: TransformHandle) -> EcsResult<()> {
        self.registry.add_child(self.handle, child)
    }

    /// Unlink `child` from this transform
    pub fn remove_child(&mut self, child: TransformHandle) -> bool {
        self.registry.remove_child(self.handle, child)
    }

    /// Unlink from the parent, keeping the world placement
    pub fn detach(&mut self) -> EcsResult<bool> {
        self.registry.detach(self.handle)
    }

    /// Destroy this transform's subtree and entities
    pub fn destroy_with_children(self) -> usize {
        self.registry.destroy_with_children(self.handle)
    }
}
