//! Errors raised by structural misuse of the registry and hierarchy

use crate::ecs::{ComponentKind, Entity};

/// ECS error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The kind allows one instance per entity and the entity already has it
    #[error("{entity} already has a {kind} component")]
    DuplicateComponent {
        /// Kind that was requested
        kind: ComponentKind,
        /// Entity that already holds one
        entity: Entity,
    },

    /// Two different Rust types declared the same kind tag
    #[error("component kind {0} is declared by more than one type")]
    KindCollision(ComponentKind),

    /// The handle no longer resolves to a live component
    #[error("stale component handle")]
    StaleHandle,

    /// Parenting would make a transform its own ancestor
    #[error("attaching {child} under {parent} would create a cycle")]
    HierarchyCycle {
        /// Entity of the would-be parent
        parent: Entity,
        /// Entity of the would-be child
        child: Entity,
    },

    /// A fixed-size resource ran out of room
    #[error("{resource} capacity of {capacity} exceeded")]
    CapacityExceeded {
        /// Name of the exhausted resource
        resource: &'static str,
        /// Number of slots it has
        capacity: usize,
    },

    /// `update` was called from inside a component hook
    #[error("update called while an update pass is already running")]
    ReentrantUpdate,
}

/// Result alias for ECS operations
pub type EcsResult<T> = Result<T, EcsError>;
