//! Camera component

use crate::ecs::component::{Component, ComponentKind, ComponentType};

/// Perspective camera settings; placement comes from the entity's transform
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Vertical field of view in degrees
    pub fov_y: f32,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self { fov_y: 45.0 }
    }
}

impl Component for CameraComponent {}

impl ComponentType for CameraComponent {
    const KIND: ComponentKind = ComponentKind::new("CameraComponent");
    const UNIQUE_PER_ENTITY: bool = true;
}
