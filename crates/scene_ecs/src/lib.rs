//! # Scene ECS
//!
//! A small scene runtime: a component registry with lifecycle hooks and
//! observers, and a parent/child transform hierarchy whose world matrices are
//! cached and rebuilt only when something in the chain changed.
//!
//! ## Features
//!
//! - **Component Registry**: typed handles into a slot arena, per-kind tables
//! - **Lifecycle Hooks**: create, update and destroy hooks with registry access
//! - **Transform Hierarchy**: lazy world matrices with descendant invalidation
//! - **Collaborators**: draw lists, camera views, light slots, free flight
//! - **Configuration**: TOML or RON scene settings
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_ecs::prelude::*;
//!
//! let mut registry = ComponentRegistry::new();
//! let parent = registry.spawn::<TransformComponent>().unwrap();
//! let child = registry.spawn::<TransformComponent>().unwrap();
//!
//! registry.transform_mut(parent).unwrap().set_position(1.0, 2.0, 3.0);
//! registry.add_child(parent, child).unwrap();
//!
//! let position = registry.world_position(child).unwrap();
//! assert!((position - Vec3::new(1.0, 2.0, 3.0)).norm() < 1e-5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        ecs::{
            components::{
                AutoMoverComponent, CameraComponent, ColorComponent, DrawShape, DrawableComponent,
                FlightDataComponent, LightComponent, LightType, LookAtComponent, Rgba, TransformComponent,
                TransformHandle,
            },
            systems::{FlightInput, FreeFlightController, LightingSystem, RenderSystem},
            Component, ComponentContext, ComponentHandle, ComponentKind, ComponentRegistry, ComponentType,
            EcsError, EcsResult, Entity, TransformMut,
        },
        foundation::{
            math::{Mat4, Vec2, Vec3},
            time::FrameTimer,
        },
    };
}
