//! Arena keys and typed handles for component storage

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Untyped key of a component slot in the registry arena
    pub struct ComponentKey;
}

/// Handle-based map keyed by component slots
pub type HandleMap<T> = SlotMap<ComponentKey, T>;

/// Typed handle for type-safe component references
///
/// Handles are non-owning: the registry owns every component and a handle
/// to an erased component simply stops resolving.
pub struct TypedHandle<T> {
    key: ComponentKey,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TypedHandle<T> {
    /// Create a new typed handle from a key
    #[must_use]
    pub const fn new(key: ComponentKey) -> Self {
        Self {
            key,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying key
    #[must_use]
    pub const fn key(&self) -> ComponentKey {
        self.key
    }
}

impl<T> Clone for TypedHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedHandle<T> {}

impl<T> PartialEq for TypedHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for TypedHandle<T> {}

impl<T> Hash for TypedHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> fmt::Debug for TypedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedHandle").field(&self.key).finish()
    }
}

impl<T> From<TypedHandle<T>> for ComponentKey {
    fn from(handle: TypedHandle<T>) -> Self {
        handle.key
    }
}
