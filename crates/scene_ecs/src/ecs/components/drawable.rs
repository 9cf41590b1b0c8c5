//! Drawable component
//!
//! Describes a primitive shape drawn in the owning entity's local frame. The
//! render system turns these into backend-neutral draw commands.

use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentKind, ComponentType};
use crate::ecs::components::color::Rgba;
use crate::foundation::math::Vec3;

/// Primitive shapes a drawable can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawShape {
    /// Axis-aligned box of `size`
    #[default]
    Box,
    /// Sphere whose radius is the largest size component
    Sphere,
    /// Cylinder: top radius `x`, bottom radius `y`, height `z`
    Cylinder,
    /// Two-sided plane of `x` by `y`
    Plane,
}

/// Shape, size and color of a visible entity
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableComponent {
    /// Shape extents
    pub size: Vec3,
    /// Fill color
    pub color: Rgba,
    /// Shape to draw
    pub shape: DrawShape,
    /// Offset of the shape from the entity origin
    pub origin: Vec3,
}

impl Default for DrawableComponent {
    fn default() -> Self {
        Self {
            size: Vec3::new(1.0, 1.0, 1.0),
            color: Rgba::WHITE,
            shape: DrawShape::Box,
            origin: Vec3::zeros(),
        }
    }
}

impl Component for DrawableComponent {}

impl ComponentType for DrawableComponent {
    const KIND: ComponentKind = ComponentKind::new("DrawableComponent");
}

impl DrawableComponent {
    /// Drawable of `shape` with `size` and `color`
    #[must_use]
    pub fn new(shape: DrawShape, size: Vec3, color: Rgba) -> Self {
        Self {
            size,
            color,
            shape,
            origin: Vec3::zeros(),
        }
    }

    /// Sphere radius derived from the size
    #[must_use]
    pub fn sphere_radius(&self) -> f32 {
        self.size.x.max(self.size.y).max(self.size.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_radius_uses_largest_extent() {
        let drawable = DrawableComponent::new(DrawShape::Sphere, Vec3::new(0.5, 2.0, 1.0), Rgba::RED);
        assert!((drawable.sphere_radius() - 2.0).abs() < f32::EPSILON);
    }
}
