//! Component registry
//!
//! The registry owns every component instance in a slot arena, indexes them
//! per kind and per entity, runs the lifecycle hooks, notifies observers and
//! dispatches the per-frame update list.
//!
//! ## Lifecycle
//!
//! Adding a component stores it, runs `on_create`, fires the kind's add
//! observers and, if the component asked for it, appends it to the update
//! list. Erasing runs `on_destroy`, drops it from the update list and fires
//! the remove observers. Each hook fires exactly once per instance.
//!
//! ## Mutation during hooks
//!
//! A hook's component is checked out of the arena while the hook runs.
//! `update` walks a snapshot of the update list, so components added during a
//! pass are first dispatched on the next frame and components removed during
//! a pass are skipped. Removing a component that is currently checked out is
//! queued and applied as soon as its hook returns.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::config::RegistryConfig;
use crate::ecs::component::{Component, ComponentContext, ComponentHandle, ComponentKind, ComponentType};
use crate::ecs::table::{ComponentEvent, ComponentTable};
use crate::ecs::{EcsError, EcsResult, Entity, EntityAllocator};
use crate::foundation::collections::{ComponentKey, HandleMap};

struct ComponentSlot {
    entity: Entity,
    kind: ComponentKind,
    active: bool,
    subscribed: bool,
    /// `None` while a hook of this component is running
    component: Option<Box<dyn Component>>,
}

/// Owner of all components and the per-frame update list
pub struct ComponentRegistry {
    entities: EntityAllocator,
    slots: HandleMap<ComponentSlot>,
    tables: HashMap<ComponentKind, ComponentTable>,
    update_list: Vec<ComponentKey>,
    deferred_removals: Vec<ComponentKey>,
    updating: bool,
    delta_time: f32,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Create an empty registry with default sizing
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RegistryConfig::default())
    }

    /// Create an empty registry sized from configuration
    #[must_use]
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            entities: EntityAllocator::new(),
            slots: HandleMap::with_capacity_and_key(config.initial_capacity),
            tables: HashMap::new(),
            update_list: Vec::new(),
            deferred_removals: Vec::new(),
            updating: false,
            delta_time: 0.0,
        }
    }

    // ---- entities ----

    /// Allocate a fresh entity id
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create_entity()
    }

    /// Return an entity id without touching its components
    pub fn release_entity(&mut self, entity: Entity) -> bool {
        self.entities.release_entity(entity)
    }

    /// The entity allocator
    #[must_use]
    pub const fn entities(&self) -> &EntityAllocator {
        &self.entities
    }

    // ---- adding ----

    /// Construct a default `T` for `entity`
    ///
    /// Fails before constructing anything if the kind is unique and the
    /// entity already has one, or if another type owns the kind tag.
    pub fn add_component<T: ComponentType>(&mut self, entity: Entity) -> EcsResult<ComponentHandle<T>> {
        self.check_insert::<T>(entity)?;
        Ok(self.store(entity, T::default()))
    }

    /// Store a caller-built `T` for `entity`
    pub fn insert_component<T: ComponentType>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> EcsResult<ComponentHandle<T>> {
        self.check_insert::<T>(entity)?;
        Ok(self.store(entity, component))
    }

    /// Construct a default `T` on a newly allocated entity
    pub fn spawn<T: ComponentType>(&mut self) -> EcsResult<ComponentHandle<T>> {
        self.claim_kind::<T>()?;
        let entity = self.create_entity();
        Ok(self.store(entity, T::default()))
    }

    /// Construct a default `T` next to `owner`, or on a new entity
    pub fn add_component_to_owner<T: ComponentType, U>(
        &mut self,
        owner: Option<ComponentHandle<U>>,
    ) -> EcsResult<ComponentHandle<T>> {
        match owner {
            Some(owner) => {
                let entity = self.entity_of(owner.key()).ok_or(EcsError::StaleHandle)?;
                self.add_component(entity)
            }
            None => self.spawn(),
        }
    }

    fn claim_kind<T: ComponentType>(&mut self) -> EcsResult<&mut ComponentTable> {
        let table = self.tables.entry(T::KIND).or_default();
        if table.claim(TypeId::of::<T>()) {
            Ok(table)
        } else {
            Err(EcsError::KindCollision(T::KIND))
        }
    }

    fn check_insert<T: ComponentType>(&mut self, entity: Entity) -> EcsResult<()> {
        let table = self.claim_kind::<T>()?;
        if T::UNIQUE_PER_ENTITY && !table.bucket(entity).is_empty() {
            return Err(EcsError::DuplicateComponent {
                kind: T::KIND,
                entity,
            });
        }
        Ok(())
    }

    fn store<T: ComponentType>(&mut self, entity: Entity, component: T) -> ComponentHandle<T> {
        self.entities.reserve(entity);
        let key = self.slots.insert(ComponentSlot {
            entity,
            kind: T::KIND,
            active: true,
            subscribed: false,
            component: None,
        });
        self.tables.entry(T::KIND).or_default().insert(entity, key);

        let mut component: Box<dyn Component> = Box::new(component);
        let delta_time = self.delta_time;
        component.on_create(&mut ComponentContext::new(self, entity, key, delta_time));
        let subscribed = component.wants_update();

        if let Some(slot) = self.slots.get_mut(key) {
            slot.component = Some(component);
            slot.subscribed = subscribed;
        }
        let event = ComponentEvent {
            kind: T::KIND,
            entity,
            key,
        };
        if let Some(table) = self.tables.get_mut(&T::KIND) {
            table.notify_added(&event);
        }
        if subscribed {
            self.update_list.push(key);
        }
        log::trace!("Added {} to {entity} (update: {subscribed})", T::KIND);

        self.flush_deferred_removals();
        ComponentHandle::new(key)
    }

    // ---- lookup ----

    /// Resolve a handle
    #[must_use]
    pub fn get<T: ComponentType>(&self, handle: ComponentHandle<T>) -> Option<&T> {
        let component = self.slots.get(handle.key())?.component.as_deref()?;
        component.as_any().downcast_ref::<T>()
    }

    /// Resolve a handle mutably
    pub fn get_mut<T: ComponentType>(&mut self, handle: ComponentHandle<T>) -> Option<&mut T> {
        let component = self.slots.get_mut(handle.key())?.component.as_deref_mut()?;
        component.as_any_mut().downcast_mut::<T>()
    }

    /// Handle of the first `T` registered for `entity`
    #[must_use]
    pub fn component_handle<T: ComponentType>(&self, entity: Entity) -> Option<ComponentHandle<T>> {
        let table = self.tables.get(&T::KIND)?;
        if !table.holds(TypeId::of::<T>()) {
            return None;
        }
        table.bucket(entity).first().copied().map(ComponentHandle::new)
    }

    /// First `T` registered for `entity`
    #[must_use]
    pub fn get_component<T: ComponentType>(&self, entity: Entity) -> Option<&T> {
        self.get(self.component_handle::<T>(entity)?)
    }

    /// First `T` registered for `entity`, mutably
    pub fn get_component_mut<T: ComponentType>(&mut self, entity: Entity) -> Option<&mut T> {
        let handle = self.component_handle::<T>(entity)?;
        self.get_mut(handle)
    }

    /// First `T` on the entity that owns `owner`
    #[must_use]
    pub fn get_sibling<T: ComponentType>(&self, owner: ComponentKey) -> Option<&T> {
        self.get_component(self.entity_of(owner)?)
    }

    /// Keys of every component of `kind` on `entity`, oldest first
    ///
    /// Returns an empty slice when there are none.
    #[must_use]
    pub fn component_keys(&self, kind: ComponentKind, entity: Entity) -> &[ComponentKey] {
        self.tables
            .get(&kind)
            .map_or(&[][..], |table| table.bucket(entity))
    }

    /// Every `T` on `entity`, oldest first
    pub fn find_components<T: ComponentType>(&self, entity: Entity) -> impl Iterator<Item = &T> + '_ {
        self.component_keys(T::KIND, entity)
            .iter()
            .filter_map(move |key| self.get(ComponentHandle::<T>::new(*key)))
    }

    /// Handles of every `T` on `entity`, oldest first
    #[must_use]
    pub fn find_component_handles<T: ComponentType>(&self, entity: Entity) -> Vec<ComponentHandle<T>> {
        self.component_keys(T::KIND, entity)
            .iter()
            .copied()
            .map(ComponentHandle::new)
            .collect()
    }

    /// Existing `T` for `entity`, or a newly added default one
    pub fn must_get_component<T: ComponentType>(&mut self, entity: Entity) -> EcsResult<ComponentHandle<T>> {
        match self.component_handle::<T>(entity) {
            Some(handle) => Ok(handle),
            None => self.add_component(entity),
        }
    }

    /// Existing or new `T` on the entity that owns `owner`
    pub fn must_get_sibling<T: ComponentType>(&mut self, owner: ComponentKey) -> EcsResult<ComponentHandle<T>> {
        let entity = self.entity_of(owner).ok_or(EcsError::StaleHandle)?;
        self.must_get_component(entity)
    }

    // ---- removal ----

    /// Erase one component; `false` if it was already gone
    ///
    /// A component whose own hook is running is unindexed at once, but its
    /// `on_destroy` and remove observers wait until that hook returns. It
    /// still counts as removed.
    pub fn remove_component<T: ComponentType>(&mut self, handle: ComponentHandle<T>) -> bool {
        if self.kind_of(handle.key()) != Some(T::KIND) {
            return false;
        }
        self.erase(handle.key())
    }

    /// Erase a component of any kind by key
    pub fn remove(&mut self, key: ComponentKey) -> bool {
        self.erase(key)
    }

    /// Erase every `T` on `entity`
    ///
    /// The count includes removals queued behind a running hook.
    pub fn remove_components<T: ComponentType>(&mut self, entity: Entity) -> usize {
        let keys = self.component_keys(T::KIND, entity).to_vec();
        keys.into_iter().filter(|key| self.erase(*key)).count()
    }

    /// Erase every component of `entity` across all kinds and release its id
    ///
    /// The id can be handed out again right away, even while removals queued
    /// behind a running hook are still pending.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        let mut keys: Vec<(ComponentKind, ComponentKey)> = self.components_of(entity).collect();
        keys.sort_by_key(|(kind, _)| *kind);
        let removed = keys.into_iter().filter(|(_, key)| self.erase(*key)).count();
        self.entities.release_entity(entity);
        log::debug!("Removed {entity} ({removed} components)");
        removed
    }

    /// Erase every component and release every entity id
    pub fn clear(&mut self) {
        let mut entities: Vec<Entity> = self.slots.values().map(|slot| slot.entity).collect();
        entities.sort_unstable();
        entities.dedup();
        for entity in entities {
            self.remove_entity(entity);
        }
        self.entities.clear();
    }

    fn erase(&mut self, key: ComponentKey) -> bool {
        match self.slots.get(key) {
            None => return false,
            Some(slot) if slot.component.is_none() => {
                if self.deferred_removals.contains(&key) {
                    return false;
                }
                let (entity, kind) = (slot.entity, slot.kind);
                log::trace!("Deferring removal of {kind} on {entity}");
                // unindex now so a reused entity id never sees the dying component
                if let Some(table) = self.tables.get_mut(&kind) {
                    table.remove(entity, key);
                }
                self.update_list.retain(|k| *k != key);
                self.deferred_removals.push(key);
                return true;
            }
            Some(_) => {}
        }
        let Some(slot) = self.slots.remove(key) else {
            return false;
        };
        let ComponentSlot {
            entity,
            kind,
            subscribed,
            component,
            ..
        } = slot;

        if let Some(table) = self.tables.get_mut(&kind) {
            table.remove(entity, key);
        }
        if subscribed {
            self.update_list.retain(|k| *k != key);
        }
        if let Some(mut component) = component {
            let delta_time = self.delta_time;
            component.on_destroy(&mut ComponentContext::new(self, entity, key, delta_time));
        }
        let event = ComponentEvent { kind, entity, key };
        if let Some(table) = self.tables.get_mut(&kind) {
            table.notify_removed(&event);
        }
        log::trace!("Removed {kind} from {entity}");
        true
    }

    fn flush_deferred_removals(&mut self) {
        if self.deferred_removals.is_empty() {
            return;
        }
        for key in std::mem::take(&mut self.deferred_removals) {
            // still checked out keys go straight back on the queue
            self.erase(key);
        }
    }

    // ---- observers ----

    /// Run `observer` after every component of `kind` is added
    pub fn add_add_observer(&mut self, kind: ComponentKind, observer: impl FnMut(&ComponentEvent) + 'static) {
        self.tables
            .entry(kind)
            .or_default()
            .add_add_observer(Box::new(observer));
    }

    /// Run `observer` after every component of `kind` is erased
    pub fn add_remove_observer(&mut self, kind: ComponentKind, observer: impl FnMut(&ComponentEvent) + 'static) {
        self.tables
            .entry(kind)
            .or_default()
            .add_remove_observer(Box::new(observer));
    }

    // ---- update ----

    /// Dispatch `on_update` to every subscribed, active component
    ///
    /// Returns how many components were updated.
    pub fn update(&mut self, delta_time: f32) -> EcsResult<usize> {
        if self.updating {
            return Err(EcsError::ReentrantUpdate);
        }
        self.updating = true;
        self.delta_time = delta_time;

        let snapshot = self.update_list.clone();
        let mut dispatched = 0;
        for key in snapshot {
            let Some((entity, mut component)) = self.check_out_for_update(key) else {
                continue;
            };
            component.on_update(&mut ComponentContext::new(self, entity, key, delta_time));
            if let Some(slot) = self.slots.get_mut(key) {
                slot.component = Some(component);
            }
            dispatched += 1;
            self.flush_deferred_removals();
        }

        self.updating = false;
        Ok(dispatched)
    }

    fn check_out_for_update(&mut self, key: ComponentKey) -> Option<(Entity, Box<dyn Component>)> {
        let slot = self.slots.get_mut(key)?;
        if !slot.active {
            return None;
        }
        Some((slot.entity, slot.component.take()?))
    }

    // ---- iteration ----

    /// Lazily visit every `T` in the registry
    pub fn iter_components<T: ComponentType>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.tables
            .get(&T::KIND)
            .into_iter()
            .flat_map(ComponentTable::iter)
            .flat_map(move |(entity, keys)| {
                keys.iter().filter_map(move |key| {
                    self.get(ComponentHandle::<T>::new(*key))
                        .map(|component| (entity, component))
                })
            })
    }

    /// Visit every `T` in the registry
    pub fn for_each_component<T: ComponentType>(&self, mut visit: impl FnMut(Entity, &T)) {
        for (entity, component) in self.iter_components::<T>() {
            visit(entity, component);
        }
    }

    /// Visit every `T` in the registry mutably
    pub fn for_each_component_mut<T: ComponentType>(&mut self, mut visit: impl FnMut(Entity, &mut T)) {
        for (entity, handle) in self.component_handles::<T>() {
            if let Some(component) = self.get_mut(handle) {
                visit(entity, component);
            }
        }
    }

    /// Snapshot of every `T` handle, ordered by entity then insertion
    #[must_use]
    pub fn component_handles<T: ComponentType>(&self) -> Vec<(Entity, ComponentHandle<T>)> {
        let mut handles: Vec<(Entity, ComponentHandle<T>)> = self
            .tables
            .get(&T::KIND)
            .into_iter()
            .flat_map(ComponentTable::iter)
            .flat_map(|(entity, keys)| keys.iter().map(move |key| (entity, ComponentHandle::new(*key))))
            .collect();
        // stable sort keeps each bucket's insertion order
        handles.sort_by_key(|(entity, _)| *entity);
        handles
    }

    /// Every `(kind, key)` owned by `entity`
    pub fn components_of(&self, entity: Entity) -> impl Iterator<Item = (ComponentKind, ComponentKey)> + '_ {
        self.tables.iter().flat_map(move |(kind, table)| {
            table.bucket(entity).iter().map(move |key| (*kind, *key))
        })
    }

    /// Visit every component of `entity` by kind and key
    pub fn for_each_component_in_entity(&self, entity: Entity, mut visit: impl FnMut(ComponentKind, ComponentKey)) {
        for (kind, key) in self.components_of(entity) {
            visit(kind, key);
        }
    }

    // ---- per-component state ----

    /// Entity that owns the component
    #[must_use]
    pub fn entity_of(&self, key: ComponentKey) -> Option<Entity> {
        self.slots.get(key).map(|slot| slot.entity)
    }

    /// Kind of the component
    #[must_use]
    pub fn kind_of(&self, key: ComponentKey) -> Option<ComponentKind> {
        self.slots.get(key).map(|slot| slot.kind)
    }

    /// Whether the key still refers to a live component
    #[must_use]
    pub fn contains(&self, key: ComponentKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Gate update and draw participation; `false` if the key is stale
    pub fn set_active(&mut self, key: ComponentKey, active: bool) -> bool {
        self.slots.get_mut(key).map_or(false, |slot| {
            slot.active = active;
            true
        })
    }

    /// Whether the component takes part in updates and drawing
    #[must_use]
    pub fn is_active(&self, key: ComponentKey) -> bool {
        self.slots.get(key).map_or(false, |slot| slot.active)
    }

    /// Whether the component is on the update list
    #[must_use]
    pub fn is_subscribed(&self, key: ComponentKey) -> bool {
        self.slots.get(key).map_or(false, |slot| slot.subscribed)
    }

    /// Components receiving `on_update`, in dispatch order
    #[must_use]
    pub fn update_list(&self) -> &[ComponentKey] {
        &self.update_list
    }

    /// Number of live components
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    /// Table for a kind, if any component or observer of it was registered
    #[must_use]
    pub fn table(&self, kind: ComponentKind) -> Option<&ComponentTable> {
        self.tables.get(&kind)
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("entities", &self.entities.len())
            .field("components", &self.slots.len())
            .field("kinds", &self.tables.len())
            .field("update_list", &self.update_list.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct Probe {
        name: &'static str,
        journal: Option<Journal>,
        wants_update: bool,
        updates: u32,
    }

    impl Probe {
        fn new(name: &'static str, journal: &Journal, wants_update: bool) -> Self {
            Self {
                name,
                journal: Some(Rc::clone(journal)),
                wants_update,
                updates: 0,
            }
        }

        fn log(&self, event: &str) {
            if let Some(journal) = &self.journal {
                journal.borrow_mut().push(format!("{}:{event}", self.name));
            }
        }
    }

    impl Component for Probe {
        fn on_create(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.log("create");
        }

        fn wants_update(&self) -> bool {
            self.wants_update
        }

        fn on_update(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.updates += 1;
            self.log("update");
        }

        fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.log("destroy");
        }
    }

    impl ComponentType for Probe {
        const KIND: ComponentKind = ComponentKind::new("Probe");
    }

    #[derive(Default)]
    struct Solo;

    impl Component for Solo {}

    impl ComponentType for Solo {
        const KIND: ComponentKind = ComponentKind::new("Solo");
        const UNIQUE_PER_ENTITY: bool = true;
    }

    #[derive(Default)]
    struct Impostor;

    impl Component for Impostor {}

    impl ComponentType for Impostor {
        const KIND: ComponentKind = ComponentKind::new("Probe");
    }

    fn journal() -> Journal {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.borrow().clone()
    }

    #[test]
    fn test_add_then_get_returns_same_instance() {
        let mut registry = ComponentRegistry::new();
        let entity = registry.create_entity();
        let handle = registry.add_component::<Probe>(entity).unwrap();
        assert_eq!(registry.component_handle::<Probe>(entity), Some(handle));
        assert!(std::ptr::eq(
            registry.get_component::<Probe>(entity).unwrap(),
            registry.get(handle).unwrap()
        ));
        assert_eq!(registry.entity_of(handle.key()), Some(entity));
    }

    #[test]
    fn test_find_components_in_insertion_order() {
        let mut registry = ComponentRegistry::new();
        let log = journal();
        let entity = registry.create_entity();
        registry.insert_component(entity, Probe::new("a", &log, false)).unwrap();
        registry.insert_component(entity, Probe::new("b", &log, false)).unwrap();

        let names: Vec<&str> = registry.find_components::<Probe>(entity).map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.get_component::<Probe>(entity).unwrap().name, "a");

        let other = registry.create_entity();
        assert_eq!(registry.find_components::<Probe>(other).count(), 0);
        assert!(registry.component_keys(Probe::KIND, other).is_empty());
    }

    #[test]
    fn test_lifecycle_hooks_fire_once() {
        let mut registry = ComponentRegistry::new();
        let log = journal();
        let entity = registry.create_entity();
        let handle = registry.insert_component(entity, Probe::new("p", &log, true)).unwrap();

        registry.update(0.016).unwrap();
        assert!(registry.remove_component(handle));
        assert!(!registry.remove_component(handle));
        registry.update(0.016).unwrap();

        assert_eq!(entries(&log), vec!["p:create", "p:update", "p:destroy"]);
        assert!(registry.get(handle).is_none());
        assert!(registry.update_list().is_empty());
    }

    #[test]
    fn test_update_dispatches_in_subscription_order_and_skips_inactive() {
        let mut registry = ComponentRegistry::new();
        let log = journal();
        let e = registry.create_entity();
        let first = registry.insert_component(e, Probe::new("first", &log, true)).unwrap();
        registry.insert_component(e, Probe::new("quiet", &log, false)).unwrap();
        registry.insert_component(e, Probe::new("second", &log, true)).unwrap();
        log.borrow_mut().clear();

        assert_eq!(registry.update(0.1).unwrap(), 2);
        assert_eq!(entries(&log), vec!["first:update", "second:update"]);

        log.borrow_mut().clear();
        assert!(registry.set_active(first.key(), false));
        assert_eq!(registry.update(0.1).unwrap(), 1);
        assert_eq!(entries(&log), vec!["second:update"]);
        assert!(registry.is_subscribed(first.key()));

        registry.set_active(first.key(), true);
        registry.update(0.1).unwrap();
        assert_eq!(registry.get(first).unwrap().updates, 2);
    }

    #[test]
    fn test_observers_fire_in_registration_order() {
        let mut registry = ComponentRegistry::new();
        let log = journal();
        for tag in ["one", "two"] {
            let log = Rc::clone(&log);
            registry.add_add_observer(Probe::KIND, move |_| log.borrow_mut().push(format!("add-{tag}")));
        }
        let removed = Rc::clone(&log);
        registry.add_remove_observer(Probe::KIND, move |event| {
            removed.borrow_mut().push(format!("remove-{}", event.entity.id()));
        });

        let entity = registry.create_entity();
        let handle = registry.insert_component(entity, Probe::new("p", &log, false)).unwrap();
        registry.remove_component(handle);

        assert_eq!(
            entries(&log),
            vec!["p:create", "add-one", "add-two", "p:destroy", "remove-0"]
        );
    }

    #[test]
    fn test_unique_kind_rejects_duplicate_without_constructing() {
        let mut registry = ComponentRegistry::new();
        let entity = registry.create_entity();
        let first = registry.add_component::<Solo>(entity).unwrap();
        let err = registry.add_component::<Solo>(entity).unwrap_err();
        assert_eq!(
            err,
            EcsError::DuplicateComponent {
                kind: Solo::KIND,
                entity
            }
        );
        assert_eq!(registry.component_count(), 1);
        assert_eq!(registry.must_get_component::<Solo>(entity).unwrap(), first);
    }

    #[test]
    fn test_kind_collision_is_reported() {
        let mut registry = ComponentRegistry::new();
        let entity = registry.create_entity();
        registry.add_component::<Probe>(entity).unwrap();
        assert_eq!(
            registry.add_component::<Impostor>(entity).unwrap_err(),
            EcsError::KindCollision(Probe::KIND)
        );
        assert!(registry.get_component::<Impostor>(entity).is_none());
    }

    #[test]
    fn test_must_get_creates_once() {
        let mut registry = ComponentRegistry::new();
        let entity = registry.create_entity();
        let a = registry.must_get_component::<Probe>(entity).unwrap();
        let b = registry.must_get_component::<Probe>(entity).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.find_components::<Probe>(entity).count(), 1);
    }

    #[test]
    fn test_spawn_and_owner_binding() {
        let mut registry = ComponentRegistry::new();
        let probe = registry.spawn::<Probe>().unwrap();
        let entity = registry.entity_of(probe.key()).unwrap();
        let solo = registry.add_component_to_owner::<Solo, Probe>(Some(probe)).unwrap();
        assert_eq!(registry.entity_of(solo.key()), Some(entity));
        assert!(registry.get_sibling::<Solo>(probe.key()).is_some());

        let fresh = registry.add_component_to_owner::<Solo, Probe>(None).unwrap();
        assert_ne!(registry.entity_of(fresh.key()), Some(entity));
    }

    #[test]
    fn test_remove_components_drops_bucket() {
        let mut registry = ComponentRegistry::new();
        let log = journal();
        let entity = registry.create_entity();
        registry.insert_component(entity, Probe::new("a", &log, true)).unwrap();
        registry.insert_component(entity, Probe::new("b", &log, true)).unwrap();
        registry.add_component::<Solo>(entity).unwrap();

        assert_eq!(registry.remove_components::<Probe>(entity), 2);
        assert_eq!(registry.table(Probe::KIND).unwrap().entity_count(), 0);
        assert!(registry.update_list().is_empty());
        assert!(registry.get_component::<Solo>(entity).is_some());
    }

    #[test]
    fn test_remove_entity_tears_down_everything() {
        let mut registry = ComponentRegistry::new();
        let log = journal();
        let entity = registry.create_entity();
        registry.insert_component(entity, Probe::new("p", &log, true)).unwrap();
        registry.add_component::<Solo>(entity).unwrap();

        assert_eq!(registry.remove_entity(entity), 2);
        assert_eq!(registry.components_of(entity).count(), 0);
        assert!(registry.update_list().is_empty());
        assert!(!registry.entities().is_alive(entity));
        assert_eq!(entries(&log), vec!["p:create", "p:destroy"]);
    }

    #[test]
    fn test_for_each_component_in_entity_sees_every_kind() {
        let mut registry = ComponentRegistry::new();
        let entity = registry.create_entity();
        registry.add_component::<Probe>(entity).unwrap();
        registry.add_component::<Probe>(entity).unwrap();
        registry.add_component::<Solo>(entity).unwrap();

        let mut kinds = Vec::new();
        registry.for_each_component_in_entity(entity, |kind, _| kinds.push(kind.name()));
        kinds.sort_unstable();
        assert_eq!(kinds, vec!["Probe", "Probe", "Solo"]);
    }

    #[test]
    fn test_iter_components_spans_entities() {
        let mut registry = ComponentRegistry::new();
        for _ in 0..3 {
            registry.spawn::<Probe>().unwrap();
        }
        registry.spawn::<Solo>().unwrap();
        assert_eq!(registry.iter_components::<Probe>().count(), 3);

        registry.for_each_component_mut::<Probe>(|_, probe| probe.updates = 7);
        let mut total = 0;
        registry.for_each_component::<Probe>(|_, probe| total += probe.updates);
        assert_eq!(total, 21);
    }

    #[test]
    fn test_components_on_arbitrary_ids_reserve_them() {
        let mut registry = ComponentRegistry::new();
        registry.add_component::<Probe>(Entity::from_raw(0)).unwrap();
        assert_eq!(registry.create_entity().id(), 1);
    }

    #[test]
    fn test_clear_destroys_everything() {
        let mut registry = ComponentRegistry::new();
        let log = journal();
        let a = registry.create_entity();
        let b = registry.create_entity();
        registry.insert_component(a, Probe::new("a", &log, true)).unwrap();
        registry.insert_component(b, Probe::new("b", &log, false)).unwrap();
        registry.clear();
        assert_eq!(registry.component_count(), 0);
        assert!(registry.entities().is_empty());
        assert_eq!(log.borrow().iter().filter(|e| e.ends_with("destroy")).count(), 2);
    }
}
