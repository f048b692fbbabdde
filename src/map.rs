// Copyright (c) 2025-present, timetree
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    fat_node::{FatNode, Payload},
    resolve::resolve,
    version_tree::VersionTree,
    Error, Version, ROOT_VERSION,
};
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::collections::{hash_map::Entry, HashMap};
use std::hash::Hash;

/// Per-version map metadata.
#[derive(Clone, Copy, Debug, Default)]
struct MapInfo {
    len: usize,
}

/// A fully persistent hash map
///
/// Every mutation mints a new version and leaves all prior versions
/// observable. Versions form a tree: mutating an old version branches off
/// a sibling line of history instead of rewriting it.
///
/// The key index is a single ordinary hash map shared across all
/// versions; persistence lives entirely in the per-key fat nodes. A key
/// written only on a foreign branch resolves to absent here.
///
/// Reads take the version to observe; mutations take the version to
/// branch from and return the freshly minted version.
///
/// # Example usage
///
/// ```
/// use timetree::PersistentMap;
///
/// let (mut map, v0) = PersistentMap::new();
///
/// let v1 = map.insert(v0, "a", "0")?;
/// let v2 = map.insert(v1, "b", "1")?;
///
/// // Branch off v1: v2 and v3 are siblings
/// let v3 = map.insert(v1, "c", "1")?;
///
/// assert_eq!(Some(&"1"), map.get(v2, &"b")?);
/// assert_eq!(None, map.get(v3, &"b")?);
/// assert_eq!(Some(&"1"), map.get(v3, &"c")?);
///
/// // Old versions never change
/// assert_eq!(None, map.get(v1, &"b")?);
/// assert_eq!(1, map.len(v1)?);
/// #
/// # Ok::<(), timetree::Error>(())
/// ```
///
/// Not thread safe.
pub struct PersistentMap<K, V> {
    versions: VersionTree<MapInfo>,
    slots: FxHashMap<K, FatNode<V>>,
}

impl<K: Hash + Eq, V> PersistentMap<K, V> {
    /// Creates an empty map, returning it together with the root version.
    #[must_use]
    pub fn new() -> (Self, Version) {
        Self::with_capacity(0)
    }

    /// Creates an empty map with preallocated key-index capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Version) {
        let map = Self {
            versions: VersionTree::new(),
            slots: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        };
        (map, ROOT_VERSION)
    }

    /// Returns the value visible for `key` at `version`.
    ///
    /// `Ok(None)` means the key holds no value at that version - never
    /// written on this branch, or deleted.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn get(&self, version: Version, key: &K) -> crate::Result<Option<&V>> {
        let history = self.versions.history(version)?;

        let Some(slot) = self.slots.get(key) else {
            return Ok(None);
        };

        Ok(resolve(slot, version, &history).and_then(Payload::as_value))
    }

    /// Returns `true` if `key` holds a value at `version`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn contains_key(&self, version: Version, key: &K) -> crate::Result<bool> {
        Ok(self.get(version, key)?.is_some())
    }

    /// Sets `key` to `value`, branching off `version`.
    ///
    /// Returns the minted version. The map size grows by one exactly when
    /// `key` was not visible at `version` - a brand new key, a key being
    /// reintroduced over a tombstone, or a key written only on a foreign
    /// branch.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn insert(&mut self, version: Version, key: K, value: V) -> crate::Result<Version> {
        // Size accounting needs the parent's view of the key, so probe
        // before minting
        let was_visible = self.get(version, &key)?.is_some();
        let len = self.versions.info(version)?.len;

        let new_version = self.versions.create_child(version)?;

        match self.slots.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().insert(Payload::Value(value), new_version);
            }
            Entry::Vacant(slot) => {
                slot.insert(FatNode::with_value(value, new_version));
            }
        }

        let len = if was_visible { len } else { len + 1 };
        self.versions.set_info(new_version, MapInfo { len })?;

        log::trace!("map: inserted at {version} -> {new_version}, len {len}");

        Ok(new_version)
    }

    /// Deletes `key`, branching off `version`.
    ///
    /// The key's fat node receives a tombstone; prior versions keep
    /// seeing the old value.
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if `key` holds no value at `version`, and
    /// `VersionNotFound` if `version` was never handed out. Both checks
    /// happen before a new version is minted.
    pub fn remove(&mut self, version: Version, key: &K) -> crate::Result<Version> {
        if self.get(version, key)?.is_none() {
            return Err(Error::KeyNotFound);
        }

        let len = self.versions.info(version)?.len;

        let Some(slot) = self.slots.get_mut(key) else {
            // Visibility above implies the slot exists
            return Err(Error::KeyNotFound);
        };

        let new_version = self.versions.create_child(version)?;
        slot.insert(Payload::Tombstone, new_version);
        self.versions.set_info(new_version, MapInfo { len: len - 1 })?;

        log::trace!("map: removed at {version} -> {new_version}");

        Ok(new_version)
    }

    /// Returns the number of keys visible at `version`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn len(&self, version: Version) -> crate::Result<usize> {
        Ok(self.versions.info(version)?.len)
    }

    /// Returns `true` if no key is visible at `version`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn is_empty(&self, version: Version) -> crate::Result<bool> {
        Ok(self.len(version)? == 0)
    }

    /// Iterates over the entries visible at `version`, in arbitrary order.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn iter(
        &self,
        version: Version,
    ) -> crate::Result<impl Iterator<Item = (&K, &V)> + '_> {
        let history = self.versions.history(version)?;

        Ok(self.slots.iter().filter_map(move |(key, slot)| {
            resolve(slot, version, &history)
                .and_then(Payload::as_value)
                .map(|value| (key, value))
        }))
    }

    /// Dumps the entries visible at `version` into a standard [`HashMap`].
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn to_hashmap(&self, version: Version) -> crate::Result<HashMap<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        Ok(self
            .iter(version)?
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    /// Returns the highest version handed out so far.
    #[must_use]
    pub fn current_version(&self) -> Version {
        self.versions.current()
    }
}
