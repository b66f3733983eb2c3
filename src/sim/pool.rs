//! Owning entity pools
//!
//! Entries live in a dense, insertion-ordered vector so update and draw passes
//! walk contiguous memory oldest-first. A slot map hands out generational keys
//! that stay valid until the entry is swept, after which lookups fail instead
//! of reaching a recycled entity.

use slotmap::{Key, SlotMap};

/// Entities that can be flagged for removal
pub trait Poolable {
    /// False once the entity is waiting to be reaped
    fn is_live(&self) -> bool;
}

#[derive(Debug, Clone)]
struct Entry<K, T> {
    key: K,
    spawn_index: u64,
    value: T,
}

/// Insertion-ordered pool with generational handles
#[derive(Debug, Clone)]
pub struct Pool<K: Key, T> {
    label: &'static str,
    slots: SlotMap<K, usize>,
    entries: Vec<Entry<K, T>>,
    last_index: u64,
    capacity: usize,
}

impl<K: Key, T: Poolable> Pool<K, T> {
    pub fn new(label: &'static str, capacity: usize) -> Self {
        Self {
            label,
            slots: SlotMap::with_key(),
            entries: Vec::new(),
            last_index: 0,
            capacity,
        }
    }

    /// Append a new entity to the tail.
    ///
    /// Returns `None` when the pool is full or storage cannot be reserved; the
    /// spawn is dropped and the caller carries on without it.
    pub fn spawn(&mut self, value: T) -> Option<K> {
        if self.entries.len() >= self.capacity {
            log::warn!("[{}] pool full ({}), spawn dropped", self.label, self.capacity);
            return None;
        }
        if self.entries.try_reserve(1).is_err() {
            log::warn!("[{}] allocation failed, spawn dropped", self.label);
            return None;
        }
        self.last_index += 1;
        let key = self.slots.insert(self.entries.len());
        self.entries.push(Entry {
            key,
            spawn_index: self.last_index,
            value,
        });
        Some(key)
    }

    /// Remove every entity whose liveness flag is down.
    ///
    /// One forward pass; survivors keep their relative order. Returns the
    /// number of reaped entities.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        let slots = &mut self.slots;
        self.entries.retain(|entry| {
            let keep = entry.value.is_live();
            if !keep {
                slots.remove(entry.key);
            }
            keep
        });
        let reaped = before - self.entries.len();
        if reaped > 0 {
            for (dense, entry) in self.entries.iter().enumerate() {
                if let Some(slot) = self.slots.get_mut(entry.key) {
                    *slot = dense;
                }
            }
            log::debug!("[{}] in pool: {}", self.label, self.entries.len());
        }
        reaped
    }
}

impl<K: Key, T> Pool<K, T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Spawn index handed to the most recent entity (0 before the first spawn)
    pub fn last_spawn_index(&self) -> u64 {
        self.last_index
    }

    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    pub fn get(&self, key: K) -> Option<&T> {
        let dense = *self.slots.get(key)?;
        self.entries.get(dense).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let dense = *self.slots.get(key)?;
        self.entries.get_mut(dense).map(|e| &mut e.value)
    }

    pub fn spawn_index(&self, key: K) -> Option<u64> {
        let dense = *self.slots.get(key)?;
        self.entries.get(dense).map(|e| e.spawn_index)
    }

    /// Oldest-first traversal
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|e| &mut e.value)
    }

    pub fn iter_keyed(&self) -> impl Iterator<Item = (K, &T)> {
        self.entries.iter().map(|e| (e.key, &e.value))
    }

    /// Drop everything; spawn indices keep increasing
    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    slotmap::new_key_type! {
        struct TestKey;
    }

    #[derive(Debug, Clone)]
    struct Thing {
        id: u32,
        live: bool,
    }

    impl Poolable for Thing {
        fn is_live(&self) -> bool {
            self.live
        }
    }

    fn thing(id: u32) -> Thing {
        Thing { id, live: true }
    }

    #[test]
    fn test_spawn_appends_in_order() {
        let mut pool: Pool<TestKey, Thing> = Pool::new("test", 16);
        for id in 0..5 {
            pool.spawn(thing(id)).unwrap();
        }
        let ids: Vec<u32> = pool.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.last_spawn_index(), 5);
    }

    #[test]
    fn test_sweep_removes_dead_and_keeps_order() {
        let mut pool: Pool<TestKey, Thing> = Pool::new("test", 16);
        let keys: Vec<TestKey> = (0..6).map(|id| pool.spawn(thing(id)).unwrap()).collect();
        pool.get_mut(keys[1]).unwrap().live = false;
        pool.get_mut(keys[4]).unwrap().live = false;

        assert_eq!(pool.sweep(), 2);
        let ids: Vec<u32> = pool.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 2, 3, 5]);
        assert_eq!(pool.len(), 4);

        // Surviving keys still resolve after compaction
        assert_eq!(pool.get(keys[5]).unwrap().id, 5);
        assert_eq!(pool.get(keys[2]).unwrap().id, 2);
    }

    #[test]
    fn test_stale_key_fails_after_sweep() {
        let mut pool: Pool<TestKey, Thing> = Pool::new("test", 16);
        let dead = pool.spawn(thing(1)).unwrap();
        pool.get_mut(dead).unwrap().live = false;
        pool.sweep();
        let fresh = pool.spawn(thing(2)).unwrap();
        assert!(pool.get(dead).is_none());
        assert!(!pool.contains(dead));
        assert_eq!(pool.get(fresh).unwrap().id, 2);
    }

    #[test]
    fn test_full_pool_drops_spawn() {
        let mut pool: Pool<TestKey, Thing> = Pool::new("test", 2);
        assert!(pool.spawn(thing(0)).is_some());
        assert!(pool.spawn(thing(1)).is_some());
        assert!(pool.spawn(thing(2)).is_none());
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.last_spawn_index(), 2);
    }

    #[test]
    fn test_spawn_index_increases_across_clear() {
        let mut pool: Pool<TestKey, Thing> = Pool::new("test", 8);
        let a = pool.spawn(thing(0)).unwrap();
        assert_eq!(pool.spawn_index(a), Some(1));
        pool.clear();
        let b = pool.spawn(thing(1)).unwrap();
        assert_eq!(pool.spawn_index(b), Some(2));
    }

    proptest! {
        #[test]
        fn prop_sweep_keeps_exactly_the_live(flags in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut pool: Pool<TestKey, Thing> = Pool::new("test", 128);
            let keys: Vec<TestKey> = (0..flags.len() as u32).map(|id| pool.spawn(thing(id)).unwrap()).collect();
            for (key, &live) in keys.iter().zip(&flags) {
                pool.get_mut(*key).unwrap().live = live;
            }
            pool.sweep();

            let expected: Vec<u32> = flags.iter().enumerate().filter(|(_, l)| **l).map(|(i, _)| i as u32).collect();
            let actual: Vec<u32> = pool.iter().map(|t| t.id).collect();
            prop_assert_eq!(&actual, &expected);
            prop_assert_eq!(pool.len(), expected.len());
            for (key, &live) in keys.iter().zip(&flags) {
                prop_assert_eq!(pool.contains(*key), live);
            }
        }
    }
}
