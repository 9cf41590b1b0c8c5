//! Flight data component

use crate::config::FlightConfig;
use crate::ecs::component::{Component, ComponentKind, ComponentType};
use crate::foundation::math::Vec2;

/// Per-entity tuning and state for free-flight control
#[derive(Debug, Clone, PartialEq)]
pub struct FlightDataComponent {
    /// Mouse position seen on the previous control update
    pub last_mouse_position: Option<Vec2>,
    /// Units per second
    pub speed: f32,
    /// Degrees per second
    pub rotation_speed: f32,
    /// Only mouse-look while the look button is held
    pub use_mouse_button: bool,
    /// Turn about world Z instead of local up
    pub use_heading: bool,
}

impl Default for FlightDataComponent {
    fn default() -> Self {
        Self::from_config(&FlightConfig::default())
    }
}

impl Component for FlightDataComponent {}

impl ComponentType for FlightDataComponent {
    const KIND: ComponentKind = ComponentKind::new("FlightDataComponent");
    const UNIQUE_PER_ENTITY: bool = true;
}

impl FlightDataComponent {
    /// Flight data with speeds taken from configuration
    #[must_use]
    pub fn from_config(config: &FlightConfig) -> Self {
        Self {
            last_mouse_position: None,
            speed: config.speed,
            rotation_speed: config.rotation_speed,
            use_mouse_button: true,
            use_heading: true,
        }
    }
}
