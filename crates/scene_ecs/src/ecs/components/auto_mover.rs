//! Auto mover component
//!
//! Drives its entity's transform at constant linear and angular speeds.

use crate::ecs::component::{Component, ComponentContext, ComponentKind, ComponentType};
use crate::ecs::components::transform::TransformComponent;
use crate::foundation::math::Vec3;

/// Constant-speed motion applied every update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutoMoverComponent {
    /// Units per second along (right, forward, up)
    pub linear_speed: Vec3,
    /// Degrees per second of (pitch, yaw or heading, roll)
    pub angular_speed: Vec3,
    /// Turn about world Z instead of local up
    pub use_heading: bool,
}

impl Component for AutoMoverComponent {
    fn wants_update(&self) -> bool {
        true
    }

    fn on_update(&mut self, ctx: &mut ComponentContext<'_>) {
        let delta = ctx.delta_time();
        let entity = ctx.entity();
        let registry = ctx.registry();
        let handle = match registry.must_get_component::<TransformComponent>(entity) {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("Auto mover on {entity} has no transform: {err}");
                return;
            }
        };
        let Some(mut transform) = registry.transform_mut(handle) else {
            return;
        };

        transform.rotate_pitch(self.angular_speed.x * delta);
        if self.use_heading {
            transform.rotate_heading(self.angular_speed.y * delta);
        } else {
            transform.rotate_yaw(self.angular_speed.y * delta);
        }
        transform
            .rotate_roll(self.angular_speed.z * delta)
            .move_right(self.linear_speed.x * delta)
            .move_forward(self.linear_speed.y * delta)
            .move_up(self.linear_speed.z * delta);
    }
}

impl ComponentType for AutoMoverComponent {
    const KIND: ComponentKind = ComponentKind::new("AutoMoverComponent");
}

impl AutoMoverComponent {
    /// Mover with the given speeds, turning about local up
    #[must_use]
    pub fn new(linear_speed: Vec3, angular_speed: Vec3) -> Self {
        Self {
            linear_speed,
            angular_speed,
            use_heading: false,
        }
    }

    /// Turn about world Z instead
    #[must_use]
    pub fn with_heading(mut self) -> Self {
        self.use_heading = true;
        self
    }
}
