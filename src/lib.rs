// Copyright (c) 2025-present, timetree
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Fully persistent containers with branching version histories.
//!
//! ##### NOTE
//!
//! > Persistence here means *immutable history*, not durability: nothing
//! > is written to disk, and unreachable versions are never collected.
//! > To reclaim memory, dump the version you care about into a native
//! > container and drop the persistent one.
//!
//! ##### About
//!
//! This crate exports three containers - [`PersistentMap`],
//! [`PersistentVec`] and [`PersistentList`] - where every mutation mints
//! a new immutable logical version while all prior versions remain
//! observable. Versions form a *tree*, not a chain: any existing version
//! may serve as the parent of a new mutation, so branching histories
//! coexist in a single structure. A version is an opaque `u64` handle.
//!
//! All three containers sit on the same substrate, which is exported for
//! building other persistent shapes:
//!
//! - a [`VersionTree`] recording the parent/child relation among versions,
//! - [`FatNode`]s - per-slot append-only logs of `(version, payload)`
//!   entries,
//! - and [`resolve`], which reconciles a fat node's absolute-version
//!   entries against the branch history of the observing version.
//!
//! All operations are single-threaded; nothing here is thread safe.
//!
//! # Example usage
//!
//! ```
//! use timetree::PersistentMap;
//!
//! let (mut map, v0) = PersistentMap::new();
//!
//! // Every mutation mints a new version
//! let v1 = map.insert(v0, "a", "0")?;
//! let v2 = map.insert(v1, "b", "1")?;
//!
//! // Mutating v1 again branches: v2 and v3 are siblings
//! let v3 = map.insert(v1, "c", "1")?;
//!
//! assert_eq!(Some(&"1"), map.get(v2, &"b")?);
//! assert_eq!(None, map.get(v2, &"c")?);
//! assert_eq!(Some(&"1"), map.get(v3, &"c")?);
//! assert_eq!(None, map.get(v3, &"b")?);
//!
//! // Every snapshot stays observable forever
//! assert_eq!(None, map.get(v0, &"a")?);
//! assert_eq!(Some(&"0"), map.get(v3, &"a")?);
//! #
//! # Ok::<(), timetree::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]

mod binary_search;
mod error;
mod fat_node;
mod list;
mod map;
mod resolve;
mod vec;
mod version;
mod version_tree;

pub use {
    error::{Error, Result},
    fat_node::{FatNode, Payload},
    list::PersistentList,
    map::PersistentMap,
    resolve::resolve,
    vec::PersistentVec,
    version::{Version, ROOT_VERSION},
    version_tree::VersionTree,
};

/// A [`PersistentMap`] storing values of any type.
///
/// Downcasting is the caller's business:
///
/// ```
/// use timetree::AnyMap;
///
/// let (mut map, v0) = AnyMap::new();
///
/// let v1 = map.insert(v0, "answer", Box::new(42_u32) as Box<dyn std::any::Any>)?;
/// let v2 = map.insert(v1, "greeting", Box::new("hi".to_string()) as Box<dyn std::any::Any>)?;
///
/// let answer = map.get(v2, &"answer")?.and_then(|any| any.downcast_ref::<u32>());
/// assert_eq!(Some(&42), answer);
/// #
/// # Ok::<(), timetree::Error>(())
/// ```
pub type AnyMap<K> = PersistentMap<K, Box<dyn std::any::Any>>;

/// A [`PersistentVec`] storing values of any type.
pub type AnyVec = PersistentVec<Box<dyn std::any::Any>>;

/// A [`PersistentList`] storing values of any type.
pub type AnyList = PersistentList<Box<dyn std::any::Any>>;
