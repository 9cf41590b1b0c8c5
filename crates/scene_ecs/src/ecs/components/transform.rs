//! Transform component
//!
//! Local placement of an entity in its parent's space: a position plus an
//! orthonormal forward/up pair (Z-up, forward defaults to +Y). The world
//! matrix is cached and only rebuilt after something in the chain changed;
//! see [`crate::ecs::hierarchy`] for evaluation and parenting.
//!
//! Local edits are crate-visible only. Outside code edits transforms through
//! [`crate::ecs::hierarchy::TransformMut`], which also invalidates every
//! descendant.

use nalgebra::Isometry3;

use crate::ecs::component::{Component, ComponentContext, ComponentHandle, ComponentKind, ComponentType};
use crate::foundation::math::{
    constants::HALF_PI,
    utils::{normalize_degrees, normalize_or, rotate_about},
    Mat4, Mat4Ext, Point3, Vec3,
};

/// Handle to a transform in the registry arena
pub type TransformHandle = ComponentHandle<TransformComponent>;

/// Spatial node of the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    position: Vec3,
    forward: Vec3,
    up: Vec3,
    pub(crate) dirty: bool,
    world_matrix: Mat4,
    gl_world_matrix: Mat4,
    pub(crate) parent: Option<TransformHandle>,
    pub(crate) children: Vec<TransformHandle>,
    recompute_count: u64,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            forward: Vec3::y(),
            up: Vec3::z(),
            dirty: true,
            world_matrix: Mat4::identity(),
            gl_world_matrix: Mat4::identity(),
            parent: None,
            children: Vec::new(),
            recompute_count: 0,
        }
    }
}

impl Component for TransformComponent {
    fn on_create(&mut self, ctx: &mut ComponentContext<'_>) {
        // a stored copy of a linked transform starts out as a root
        if self.parent.take().is_some() || !self.children.is_empty() {
            log::debug!("Dropped hierarchy links of transform copied onto {}", ctx.entity());
        }
        self.children.clear();
        self.dirty = true;
    }

    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {
        let me = TransformHandle::new(ctx.key());
        let registry = ctx.registry();
        if let Some(parent) = self.parent.take() {
            if let Some(parent) = registry.get_mut(parent) {
                parent.children.retain(|child| *child != me);
            }
        }
        for child in self.children.drain(..) {
            if let Some(transform) = registry.get_mut(child) {
                if transform.parent == Some(me) {
                    transform.parent = None;
                }
            }
            registry.mark_subtree_dirty(child);
        }
    }
}

impl ComponentType for TransformComponent {
    const KIND: ComponentKind = ComponentKind::new("TransformComponent");
    const UNIQUE_PER_ENTITY: bool = true;
}

impl TransformComponent {
    /// Transform at `position` with the default orientation
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Replace the orientation; `up` is re-orthogonalized against `forward`
    #[must_use]
    pub fn with_orientation(mut self, forward: Vec3, up: Vec3) -> Self {
        self.set_orientation(forward, up);
        self
    }

    /// Local position
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Local forward direction (unit length)
    #[must_use]
    pub const fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Local up direction (unit length)
    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    /// Local left direction, `up × forward`
    #[must_use]
    pub fn left(&self) -> Vec3 {
        self.up.cross(&self.forward)
    }

    /// Local right direction, `forward × up`
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward.cross(&self.up)
    }

    /// Parent transform, if attached
    #[must_use]
    pub const fn parent(&self) -> Option<TransformHandle> {
        self.parent
    }

    /// Child transforms in attach order
    #[must_use]
    pub fn children(&self) -> &[TransformHandle] {
        &self.children
    }

    /// Whether this node itself changed since its world matrix was built
    ///
    /// Ancestors are not consulted; see `ComponentRegistry::is_transform_dirty`.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the world matrix has been rebuilt
    #[must_use]
    pub const fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Last computed world matrix, possibly stale
    #[must_use]
    pub const fn cached_world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Local-to-parent matrix
    ///
    /// Local +Y maps to forward, local +Z to up and local +X to right.
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        let view = Isometry3::look_at_rh(&Point3::origin(), &Point3::from(self.forward), &self.up);
        let orientation = view.inverse().to_homogeneous() * Mat4::rotation_x(-HALF_PI);
        Mat4::new_translation(&self.position) * orientation
    }

    pub(crate) fn refresh_world(&mut self, parent_world: &Mat4) {
        self.world_matrix = parent_world * self.local_matrix();
        self.gl_world_matrix = self.world_matrix.transpose();
        self.dirty = false;
        self.recompute_count += 1;
    }

    pub(crate) const fn gl_world_matrix(&self) -> &Mat4 {
        &self.gl_world_matrix
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    pub(crate) fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.dirty = true;
    }

    pub(crate) fn set_orientation(&mut self, forward: Vec3, up: Vec3) {
        let forward = normalize_or(&forward, self.forward);
        let up = normalize_or(&(up - forward * forward.dot(&up)), self.up);
        self.forward = forward;
        self.up = up;
        self.dirty = true;
    }

    /// Turn about the local up axis
    pub(crate) fn rotate_yaw(&mut self, degrees: f32) {
        self.forward = normalize_or(&rotate_about(&self.forward, &self.up, degrees), self.forward);
        self.dirty = true;
    }

    /// Tilt about the local left axis
    pub(crate) fn rotate_pitch(&mut self, degrees: f32) {
        let degrees = normalize_degrees(degrees);
        let left = self.left();
        self.up = normalize_or(&rotate_about(&self.up, &left, degrees), self.up);
        self.forward = normalize_or(&rotate_about(&self.forward, &left, degrees), self.forward);
        self.dirty = true;
    }

    /// Bank about the local forward axis
    pub(crate) fn rotate_roll(&mut self, degrees: f32) {
        self.up = normalize_or(&rotate_about(&self.up, &self.forward, degrees), self.up);
        self.dirty = true;
    }

    /// Turn about the world Z axis
    pub(crate) fn rotate_heading(&mut self, degrees: f32) {
        let z = Vec3::z();
        self.up = normalize_or(&rotate_about(&self.up, &z, degrees), self.up);
        self.forward = normalize_or(&rotate_about(&self.forward, &z, degrees), self.forward);
        self.dirty = true;
    }

    /// Face `target` (in parent space), keeping `up` as close as possible
    pub(crate) fn look_at(&mut self, target: Vec3, up: Vec3) {
        if let Some(forward) = (target - self.position).try_normalize(f32::EPSILON) {
            self.set_orientation(forward, up);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_default_orientation() {
        let transform = TransformComponent::default();
        assert_eq!(transform.forward(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(transform.up(), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(transform.right(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(transform.left(), Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
        assert!(transform.is_dirty());
    }

    #[test]
    fn test_default_local_matrix_is_identity() {
        let transform = TransformComponent::default();
        assert_relative_eq!(transform.local_matrix(), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_local_axes_map_to_basis() {
        let mut transform = TransformComponent::at(Vec3::new(4.0, 5.0, 6.0));
        transform.rotate_heading(90.0);
        transform.rotate_roll(30.0);
        let local = transform.local_matrix();
        assert_relative_eq!(local.apply_vector(&Vec3::y()), transform.forward(), epsilon = EPSILON);
        assert_relative_eq!(local.apply_vector(&Vec3::z()), transform.up(), epsilon = EPSILON);
        assert_relative_eq!(local.apply_vector(&Vec3::x()), transform.right(), epsilon = EPSILON);
        assert_relative_eq!(local.apply_point(&Vec3::zeros()), Vec3::new(4.0, 5.0, 6.0), epsilon = EPSILON);
    }

    #[test]
    fn test_set_position_is_exact() {
        let mut transform = TransformComponent::default();
        transform.set_position(Vec3::new(1.5, -2.25, 3.0));
        assert_eq!(transform.position(), Vec3::new(1.5, -2.25, 3.0));
    }

    #[test]
    fn test_heading_round_trip() {
        let mut transform = TransformComponent::default();
        transform.rotate_heading(90.0);
        assert_relative_eq!(transform.forward(), Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
        transform.rotate_heading(-90.0);
        assert_relative_eq!(transform.forward(), Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(transform.up(), Vec3::new(0.0, 0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_yaw_turns_forward_about_up() {
        let mut transform = TransformComponent::default();
        transform.rotate_yaw(-90.0);
        assert_relative_eq!(transform.forward(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(transform.up(), Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_pitch_normalizes_negative_angles() {
        let mut a = TransformComponent::default();
        let mut b = TransformComponent::default();
        a.rotate_pitch(-30.0);
        b.rotate_pitch(330.0);
        assert_relative_eq!(a.forward(), b.forward(), epsilon = EPSILON);
        assert_relative_eq!(a.up(), b.up(), epsilon = EPSILON);
        assert_relative_eq!(a.forward().dot(&a.up()), 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_roll_keeps_forward() {
        let mut transform = TransformComponent::default();
        transform.rotate_roll(90.0);
        assert_relative_eq!(transform.forward(), Vec3::y(), epsilon = EPSILON);
        assert_relative_eq!(transform.up(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_moves_follow_basis() {
        let mut transform = TransformComponent::default();
        transform.translate(transform.forward() * 2.0);
        transform.translate(transform.right() * 3.0);
        transform.translate(transform.up() * -1.0);
        assert_relative_eq!(transform.position(), Vec3::new(3.0, 2.0, -1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_orthogonalizes_up() {
        let mut transform = TransformComponent::default();
        transform.look_at(Vec3::new(0.0, 10.0, 10.0), Vec3::z());
        let expected = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert_relative_eq!(transform.forward(), expected, epsilon = EPSILON);
        assert_relative_eq!(transform.forward().dot(&transform.up()), 0.0, epsilon = EPSILON);
        assert_relative_eq!(transform.up().norm(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_own_position_is_ignored() {
        let mut transform = TransformComponent::at(Vec3::new(1.0, 1.0, 1.0));
        transform.look_at(Vec3::new(1.0, 1.0, 1.0), Vec3::z());
        assert_eq!(transform.forward(), Vec3::y());
    }
}
