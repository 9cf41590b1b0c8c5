//! ECS Components module
//!
//! The transform is the spatial backbone; every other component here either
//! drives a transform or describes how its entity is drawn or lit.

pub mod auto_mover;
pub mod camera;
pub mod color;
pub mod drawable;
pub mod flight_data;
pub mod light;
pub mod look_at;
pub mod transform;

pub use auto_mover::AutoMoverComponent;
pub use camera::CameraComponent;
pub use color::{ColorComponent, Rgba};
pub use drawable::{DrawShape, DrawableComponent};
pub use flight_data::FlightDataComponent;
pub use light::{LightComponent, LightType};
pub use look_at::LookAtComponent;
pub use transform::{TransformComponent, TransformHandle};
