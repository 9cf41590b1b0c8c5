//! Entity-Component-System implementation
//!
//! Entities are plain ids. Components live in a registry arena, grouped into
//! one table per kind and bucketed by entity. Transforms form a parent/child
//! hierarchy with lazily cached world matrices.

pub mod component;
pub mod components;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod registry;
pub mod systems;
pub mod table;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Component, ComponentContext, ComponentHandle, ComponentKind, ComponentType};
pub use entity::{Entity, EntityAllocator};
pub use error::{EcsError, EcsResult};
pub use hierarchy::TransformMut;
pub use registry::ComponentRegistry;
pub use table::{ComponentEvent, ComponentTable, Observer};
