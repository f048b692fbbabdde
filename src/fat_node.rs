// Copyright (c) 2025-present, timetree
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{binary_search::partition_point, Version};

/// Payload of a single fat-node entry (live value or tombstone)
///
/// A tombstone marks the slot as logically deleted at the version the
/// entry was written. Using an explicit variant keeps "deleted" apart
/// from any legitimately stored value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload<T> {
    /// A value written at some version
    Value(T),

    /// Logical deletion marker
    Tombstone,
}

impl<T> Payload<T> {
    /// Returns `true` if this payload marks a deletion.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone)
    }

    /// Returns the contained value, if this payload is not a tombstone.
    #[must_use]
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Tombstone => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Entry<T> {
    version: Version,
    payload: Payload<T>,
}

/// Append-only log of `(version, payload)` entries for one logical slot
///
/// A fat node records every value its slot ever held, tagged with the
/// absolute version that wrote it. Entries are strictly increasing by
/// version, which the version counter guarantees since slots are only
/// ever written with freshly minted versions. Lookups are binary
/// searches over the version column.
///
/// A fat node alone cannot answer "what is visible at version V" - the
/// query version may lie on a branch that never wrote this slot. That
/// reconciliation is [`resolve`](crate::resolve)'s job.
#[derive(Clone, Debug, Default)]
pub struct FatNode<T> {
    entries: Vec<Entry<T>>,
}

impl<T> FatNode<T> {
    /// Creates an empty fat node (no version has written the slot yet).
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a fat node holding a single live entry.
    #[must_use]
    pub fn with_value(value: T, version: Version) -> Self {
        Self {
            entries: vec![Entry {
                version,
                payload: Payload::Value(value),
            }],
        }
    }

    /// Appends an entry for a freshly minted version.
    ///
    /// # Panics
    ///
    /// Panics if `version` is not strictly greater than the last recorded
    /// version.
    pub fn insert(&mut self, payload: Payload<T>, version: Version) {
        assert!(
            self.latest_version().map_or(true, |last| version > last),
            "fat node entries must be appended in increasing version order",
        );
        self.entries.push(Entry { version, payload });
    }

    /// Returns the payload written exactly at `version`, if any.
    #[must_use]
    pub fn find_exact(&self, version: Version) -> Option<&Payload<T>> {
        let idx = partition_point(&self.entries, |entry| entry.version < version);

        self.entries
            .get(idx)
            .filter(|entry| entry.version == version)
            .map(|entry| &entry.payload)
    }

    /// Returns the entry with the greatest version at or before `version`.
    ///
    /// Note that this ignores branching: the returned entry may have been
    /// written on a branch the queried version never inherited. Use
    /// [`resolve`](crate::resolve) for branch-aware visibility.
    #[must_use]
    pub fn find_at_or_before(&self, version: Version) -> Option<(Version, &Payload<T>)> {
        let idx = partition_point(&self.entries, |entry| entry.version <= version);

        idx.checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .map(|entry| (entry.version, &entry.payload))
    }

    /// Returns the most recently written version, if any entry exists.
    #[must_use]
    pub fn latest_version(&self) -> Option<Version> {
        self.entries.last().map(|entry| entry.version)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no version has written the slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
