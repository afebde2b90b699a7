//! Bounded Set-Associative Table.
//!
//! A generic tagged table with a fixed number of sets and ways and a pluggable
//! replacement policy. The prefetcher instantiates it twice: once keyed by
//! instruction address for the history table, once keyed by line address for
//! the redundant prefetch filter.
//!
//! The table exposes the four primitive operations hardware tables are built
//! from, and leaves *what to do* with a victim to the caller:
//! - `find`: tag match within the key's set.
//! - `find_victim`: an invalid way if one exists, otherwise the policy's choice.
//! - `insert`: (re)tag a slot and report the fill to the policy.
//! - `touch`: report a use to the policy.

/// Replacement policy implementations (FIFO, LRU, MRU, PLRU, Random).
pub mod policies;

use std::fmt;

use self::policies::ReplacementPolicy;
use crate::common::ConfigError;
use crate::config::ReplacementPolicy as PolicyType;

/// A key that can be stored in an [`AssocTable`].
pub trait TableKey: Copy + Eq + fmt::Debug {
    /// Bits used to select the set; the table reduces them modulo the set count.
    fn set_hash(&self) -> u64;
}

/// Location of one way in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotId {
    set: usize,
    way: usize,
}

impl SlotId {
    /// The set index.
    pub const fn set(self) -> usize {
        self.set
    }

    /// The way index within the set.
    pub const fn way(self) -> usize {
        self.way
    }
}

/// One way: a tag (absent when invalid) and its payload.
struct Slot<K, V> {
    key: Option<K>,
    value: V,
}

/// Set-associative table of `V` payloads tagged by `K`.
pub struct AssocTable<K, V> {
    name: &'static str,
    slots: Vec<Slot<K, V>>,
    num_sets: usize,
    ways: usize,
    policy: Box<dyn ReplacementPolicy>,
}

impl<K: TableKey, V: Default> AssocTable<K, V> {
    /// Creates a table using the configured replacement policy.
    ///
    /// # Arguments
    ///
    /// * `name` - Name used in error messages and logs.
    /// * `entries` - Total number of ways across all sets.
    /// * `ways` - Associativity.
    /// * `policy` - Replacement policy selector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] or [`ConfigError::UnevenSets`] when the
    /// shape cannot form whole sets.
    pub fn new(
        name: &'static str,
        entries: usize,
        ways: usize,
        policy: PolicyType,
    ) -> Result<Self, ConfigError> {
        let num_sets = Self::check_shape(name, entries, ways)?;
        Self::with_policy(name, entries, ways, policies::build(policy, num_sets, ways))
    }

    /// Creates a table with a caller-supplied policy instance.
    ///
    /// # Errors
    ///
    /// Same shape checks as [`AssocTable::new`].
    pub fn with_policy(
        name: &'static str,
        entries: usize,
        ways: usize,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Result<Self, ConfigError> {
        let num_sets = Self::check_shape(name, entries, ways)?;
        let mut slots = Vec::with_capacity(entries);
        slots.resize_with(entries, || Slot {
            key: None,
            value: V::default(),
        });
        Ok(Self {
            name,
            slots,
            num_sets,
            ways,
            policy,
        })
    }

    fn check_shape(name: &'static str, entries: usize, ways: usize) -> Result<usize, ConfigError> {
        if entries == 0 || ways == 0 {
            return Err(ConfigError::ZeroCapacity {
                table: name,
                entries,
                ways,
            });
        }
        if entries % ways != 0 {
            return Err(ConfigError::UnevenSets {
                table: name,
                entries,
                ways,
            });
        }
        Ok(entries / ways)
    }

    /// Set index for `key`.
    #[inline]
    pub fn set_of(&self, key: &K) -> usize {
        (key.set_hash() % self.num_sets as u64) as usize
    }

    #[inline]
    const fn index(&self, slot: SlotId) -> usize {
        slot.set * self.ways + slot.way
    }

    /// Looks up `key` in its set.
    pub fn find(&self, key: &K) -> Option<SlotId> {
        let set = self.set_of(key);
        let base = set * self.ways;
        self.slots[base..base + self.ways]
            .iter()
            .position(|slot| slot.key.as_ref() == Some(key))
            .map(|way| SlotId { set, way })
    }

    /// Picks the way that `key` would be installed into.
    ///
    /// The first invalid way of the set is preferred; when the set is full the
    /// replacement policy decides. The slot is not modified.
    pub fn find_victim(&mut self, key: &K) -> SlotId {
        let set = self.set_of(key);
        let base = set * self.ways;
        let way = self.slots[base..base + self.ways]
            .iter()
            .position(|slot| slot.key.is_none())
            .unwrap_or_else(|| self.policy.victim(set));
        SlotId { set, way }
    }

    /// Tags `slot` with `key` and reports the fill to the replacement policy.
    ///
    /// The payload is left as is; callers reset it when the slot changes owner.
    pub fn insert(&mut self, key: K, slot: SlotId) {
        debug_assert_eq!(slot.set, self.set_of(&key), "{}: key inserted into foreign set", self.name);
        let idx = self.index(slot);
        self.slots[idx].key = Some(key);
        self.policy.insert(slot.set, slot.way);
    }

    /// Reports a use of `slot` to the replacement policy.
    pub fn touch(&mut self, slot: SlotId) {
        self.policy.touch(slot.set, slot.way);
    }

    /// Clears the tag of `slot` and resets its payload.
    pub fn invalidate(&mut self, slot: SlotId) {
        let idx = self.index(slot);
        self.slots[idx] = Slot {
            key: None,
            value: V::default(),
        };
    }

    /// Tag currently held by `slot`, if valid.
    pub fn key(&self, slot: SlotId) -> Option<K> {
        self.slots[self.index(slot)].key
    }

    /// Payload of `slot`.
    pub fn get(&self, slot: SlotId) -> &V {
        &self.slots[self.index(slot)].value
    }

    /// Mutable payload of `slot`.
    pub fn get_mut(&mut self, slot: SlotId) -> &mut V {
        let idx = self.index(slot);
        &mut self.slots[idx].value
    }

    /// Iterates over valid entries.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.key.map(|key| (key, &slot.value)))
    }

    /// Number of valid entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.key.is_some()).count()
    }

    /// Returns `true` when no entry is valid.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.key.is_none())
    }

    /// Total number of ways.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.num_sets
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.ways
    }
}

impl<K, V> fmt::Debug for AssocTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssocTable")
            .field("name", &self.name)
            .field("sets", &self.num_sets)
            .field("ways", &self.ways)
            .finish_non_exhaustive()
    }
}
