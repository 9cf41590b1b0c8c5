//! Per-kind component tables and their observers

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::ecs::{ComponentKind, Entity};
use crate::foundation::collections::ComponentKey;

/// Notification passed to add/remove observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentEvent {
    /// Kind of the component
    pub kind: ComponentKind,
    /// Entity that owns it
    pub entity: Entity,
    /// Arena key of the component
    pub key: ComponentKey,
}

/// Callback run synchronously when a component of a kind is added or removed
pub type Observer = Box<dyn FnMut(&ComponentEvent)>;

/// All components of one kind, bucketed by entity
///
/// Buckets keep insertion order. A key lives in exactly one bucket, once, and
/// empty buckets are dropped.
#[derive(Default)]
pub struct ComponentTable {
    type_id: Option<TypeId>,
    buckets: HashMap<Entity, Vec<ComponentKey>>,
    add_observers: Vec<Observer>,
    remove_observers: Vec<Observer>,
}

impl ComponentTable {
    /// Components of this kind owned by `entity`, oldest first
    #[must_use]
    pub fn bucket(&self, entity: Entity) -> &[ComponentKey] {
        self.buckets.get(&entity).map_or(&[][..], Vec::as_slice)
    }

    /// Iterate `(entity, keys)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &[ComponentKey])> + '_ {
        self.buckets
            .iter()
            .map(|(entity, keys)| (*entity, keys.as_slice()))
    }

    /// Number of entities with at least one component of this kind
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of components of this kind
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Bind the table to a concrete type; `false` if another type owns it
    pub(crate) fn claim(&mut self, type_id: TypeId) -> bool {
        *self.type_id.get_or_insert(type_id) == type_id
    }

    /// Whether the table is bound to `type_id`
    pub(crate) fn holds(&self, type_id: TypeId) -> bool {
        self.type_id == Some(type_id)
    }

    pub(crate) fn insert(&mut self, entity: Entity, key: ComponentKey) {
        let bucket = self.buckets.entry(entity).or_default();
        if !bucket.contains(&key) {
            bucket.push(key);
        }
    }

    pub(crate) fn remove(&mut self, entity: Entity, key: ComponentKey) -> bool {
        let Some(bucket) = self.buckets.get_mut(&entity) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|k| *k != key);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            self.buckets.remove(&entity);
        }
        removed
    }

    pub(crate) fn add_add_observer(&mut self, observer: Observer) {
        self.add_observers.push(observer);
    }

    pub(crate) fn add_remove_observer(&mut self, observer: Observer) {
        self.remove_observers.push(observer);
    }

    pub(crate) fn notify_added(&mut self, event: &ComponentEvent) {
        for observer in &mut self.add_observers {
            observer(event);
        }
    }

    pub(crate) fn notify_removed(&mut self, event: &ComponentEvent) {
        for observer in &mut self.remove_observers {
            observer(event);
        }
    }
}

impl fmt::Debug for ComponentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTable")
            .field("entities", &self.buckets.len())
            .field("components", &self.component_count())
            .field("add_observers", &self.add_observers.len())
            .field("remove_observers", &self.remove_observers.len())
            .finish()
    }
}
