//! ECS Systems module
//!
//! Consumers of the registry that run once per frame outside the update list.

pub mod free_flight;
pub mod lighting;
pub mod rendering_system;

pub use free_flight::{FlightInput, FreeFlightController};
pub use lighting::{LightFrame, LightSlots, LightUniform, LightUniformNames, LightingSystem};
pub use rendering_system::{CameraView, DrawCommand, RenderSystem};
