//! Component traits, kind tags and the context handed to lifecycle hooks

use std::any::Any;
use std::fmt;

use crate::ecs::{ComponentRegistry, Entity};
use crate::foundation::collections::{ComponentKey, TypedHandle};

/// Typed handle to a component owned by the registry
pub type ComponentHandle<T> = TypedHandle<T>;

/// Stable identifier of a component kind
///
/// Each component type declares its tag as a constant, so kinds are the same
/// on every run and never depend on where anything lives in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(&'static str);

impl ComponentKind {
    /// Declare a kind from its name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Name of the kind
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Downcasting support for component trait objects
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior shared by every component
///
/// All hooks default to doing nothing. `wants_update` is asked once, right
/// after `on_create`, and decides for good whether the component joins the
/// per-frame update list.
pub trait Component: AsAny {
    /// Called once after the component is stored for its entity
    fn on_create(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Whether the registry should call `on_update` every frame
    fn wants_update(&self) -> bool {
        false
    }

    /// Called once per frame while subscribed and active
    fn on_update(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called once when the component is erased
    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}
}

/// A concrete component type the registry can construct and look up
pub trait ComponentType: Component + Default {
    /// Kind tag for this type
    const KIND: ComponentKind;

    /// Limit entities to a single instance of this kind
    const UNIQUE_PER_ENTITY: bool = false;
}

/// What a lifecycle hook can see
///
/// The hook's own component is checked out of the registry while the hook
/// runs, so looking it up through `registry()` finds nothing; everything else
/// is reachable.
pub struct ComponentContext<'a> {
    registry: &'a mut ComponentRegistry,
    entity: Entity,
    key: ComponentKey,
    delta_time: f32,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(
        registry: &'a mut ComponentRegistry,
        entity: Entity,
        key: ComponentKey,
        delta_time: f32,
    ) -> Self {
        Self {
            registry,
            entity,
            key,
            delta_time,
        }
    }

    /// The registry that owns the component
    pub fn registry(&mut self) -> &mut ComponentRegistry {
        &mut *self.registry
    }

    /// Entity the component belongs to
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Arena key of the component
    #[must_use]
    pub const fn key(&self) -> ComponentKey {
        self.key
    }

    /// Seconds since the previous update pass
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }
}
