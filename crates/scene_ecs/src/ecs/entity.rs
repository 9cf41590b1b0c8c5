//! Entity identifiers and the allocator that hands them out

use std::collections::HashSet;
use std::fmt;

/// Entity identifier
///
/// Entities carry no data of their own. An entity exists while its id is
/// live in the allocator and/or while any component is registered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    id: u64,
}

impl Entity {
    /// Wrap a raw id
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self { id }
    }

    /// Get the entity ID
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}

/// Hands out the lowest free entity id
///
/// Every id below `cursor` is live, so allocation only ever scans forward
/// from the cursor. Releasing an id below the cursor pulls the cursor back.
#[derive(Debug, Default, Clone)]
pub struct EntityAllocator {
    live: HashSet<u64>,
    cursor: u64,
}

impl EntityAllocator {
    /// Create an empty allocator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the smallest id that is not currently live
    pub fn create_entity(&mut self) -> Entity {
        while self.live.contains(&self.cursor) {
            self.cursor += 1;
        }
        let id = self.cursor;
        self.live.insert(id);
        self.cursor += 1;
        Entity::from_raw(id)
    }

    /// Return an id to the pool
    ///
    /// Components are not touched; use the registry's `remove_entity` for a
    /// cascading teardown. Releasing an id that is not live does nothing.
    pub fn release_entity(&mut self, entity: Entity) -> bool {
        if !self.live.remove(&entity.id) {
            return false;
        }
        self.cursor = self.cursor.min(entity.id);
        true
    }

    /// Mark an externally chosen id as live
    ///
    /// Returns `false` if it already was.
    pub fn reserve(&mut self, entity: Entity) -> bool {
        self.live.insert(entity.id)
    }

    /// Whether the id is currently live
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live.contains(&entity.id)
    }

    /// Number of live ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no id is live
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Iterate the live ids in no particular order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.iter().copied().map(Entity::from_raw)
    }

    /// Visit every live id
    pub fn for_each(&self, visit: impl FnMut(Entity)) {
        self.iter().for_each(visit);
    }

    /// Release every id
    pub fn clear(&mut self) {
        self.live.clear();
        self.cursor = 0;
    }
}
