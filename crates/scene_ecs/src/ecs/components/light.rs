//! Light component
//!
//! Position and direction come from the entity's transform and the color
//! from its color component; the lighting system assigns the shader slot.

use crate::ecs::component::{Component, ComponentKind, ComponentType};

/// Types of lights supported by the lighting system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    /// Parallel rays along the transform's forward axis
    Directional,
    /// Radiates in all directions from the transform's origin
    #[default]
    Point,
}

impl LightType {
    /// Value the lighting shader expects for this type
    #[must_use]
    pub const fn shader_value(self) -> i32 {
        match self {
            Self::Directional => 0,
            Self::Point => 1,
        }
    }
}

/// A dynamic light
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightComponent {
    /// The type of light
    pub light_type: LightType,
    /// Whether the light contributes to shading
    pub enabled: bool,
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            enabled: true,
        }
    }
}

impl Component for LightComponent {}

impl ComponentType for LightComponent {
    const KIND: ComponentKind = ComponentKind::new("LightComponent");
}

impl LightComponent {
    /// Enabled light of `light_type`
    #[must_use]
    pub const fn new(light_type: LightType) -> Self {
        Self {
            light_type,
            enabled: true,
        }
    }
}
