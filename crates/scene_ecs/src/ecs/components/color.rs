//! Color component

use serde::{Deserialize, Serialize};

use crate::ecs::component::{Component, ComponentKind, ComponentType};
use crate::foundation::math::constants::BYTE_TO_FLOAT;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Rgba {
    /// Opaque white
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Light gray
    pub const GRAY: Self = Self::new(130, 130, 130, 255);
    /// Red
    pub const RED: Self = Self::new(230, 41, 55, 255);
    /// Yellow
    pub const YELLOW: Self = Self::new(253, 249, 0, 255);
    /// Purple
    pub const PURPLE: Self = Self::new(200, 122, 255, 255);
    /// Sky blue
    pub const SKY_BLUE: Self = Self::new(102, 191, 255, 255);

    /// Build a color from its channels
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels scaled into `[0, 1]`
    #[must_use]
    pub fn to_normalized(self) -> [f32; 4] {
        [
            f32::from(self.r) * BYTE_TO_FLOAT,
            f32::from(self.g) * BYTE_TO_FLOAT,
            f32::from(self.b) * BYTE_TO_FLOAT,
            f32::from(self.a) * BYTE_TO_FLOAT,
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Color of an entity, kept alongside its normalized form for uploads
#[derive(Debug, Clone, PartialEq)]
pub struct ColorComponent {
    color: Rgba,
    gl_color: [f32; 4],
}

impl Default for ColorComponent {
    fn default() -> Self {
        Self::new(Rgba::WHITE)
    }
}

impl Component for ColorComponent {}

impl ComponentType for ColorComponent {
    const KIND: ComponentKind = ComponentKind::new("ColorComponent");
    const UNIQUE_PER_ENTITY: bool = true;
}

impl ColorComponent {
    /// Component holding `color`
    #[must_use]
    pub fn new(color: Rgba) -> Self {
        Self {
            color,
            gl_color: color.to_normalized(),
        }
    }

    /// Replace the color
    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
        self.gl_color = color.to_normalized();
    }

    /// Current color
    #[must_use]
    pub const fn color(&self) -> Rgba {
        self.color
    }

    /// Current color as normalized RGBA floats
    #[must_use]
    pub const fn gl_color(&self) -> [f32; 4] {
        self.gl_color
    }
}
