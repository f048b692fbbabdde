// Copyright (c) 2025-present, timetree
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    fat_node::{FatNode, Payload},
    resolve::resolve,
    version_tree::VersionTree,
    Error, Version, ROOT_VERSION,
};
use std::ops::Range;

/// Per-version window into the physical cell array.
///
/// `start` is what makes [`PersistentVec::slice`] O(1): a subwindow is
/// just a new `(len, start)` pair, index translation happens on reads.
#[derive(Clone, Copy, Debug, Default)]
struct VecInfo {
    len: usize,
    start: usize,
}

/// A fully persistent, indexable sequence
///
/// Every mutation mints a new version and leaves all prior versions
/// observable. Physically this is a dense array of fat nodes that only
/// ever grows; each version sees a `(start, len)` window into it, and a
/// physical cell can carry different values on different branches.
///
/// # Example usage
///
/// ```
/// use timetree::PersistentVec;
///
/// let (mut vec, v0) = PersistentVec::new();
///
/// let v1 = vec.push(v0, "a")?;
/// let v2 = vec.push(v1, "b")?;
///
/// // Branch off v1
/// let v3 = vec.push(v1, "c")?;
///
/// assert_eq!(vec!["a", "b"], vec.to_vec(v2)?);
/// assert_eq!(vec!["a", "c"], vec.to_vec(v3)?);
///
/// // Zero-copy subwindow
/// let v4 = vec.slice(v2, 1..2)?;
/// assert_eq!(vec!["b"], vec.to_vec(v4)?);
/// #
/// # Ok::<(), timetree::Error>(())
/// ```
///
/// Not thread safe.
pub struct PersistentVec<T> {
    versions: VersionTree<VecInfo>,
    cells: Vec<FatNode<T>>,
}

impl<T> PersistentVec<T> {
    /// Creates an empty vector, returning it together with the root version.
    #[must_use]
    pub fn new() -> (Self, Version) {
        Self::with_capacity(0)
    }

    /// Creates an empty vector with preallocated cell capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Version) {
        let vec = Self {
            versions: VersionTree::new(),
            cells: Vec::with_capacity(capacity),
        };
        (vec, ROOT_VERSION)
    }

    /// Returns the value at `index` as visible at `version`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` is not inside the version's
    /// window (the root version has an empty window), and
    /// `VersionNotFound` for a bad handle.
    pub fn get(&self, version: Version, index: usize) -> crate::Result<&T> {
        let info = *self.versions.info(version)?;

        if index >= info.len {
            return Err(Error::IndexOutOfRange);
        }

        let history = self.versions.history(version)?;

        let cell = self
            .cells
            .get(info.start + index)
            .ok_or(Error::IndexOutOfRange)?;

        // A miss inside the window means the cell was only ever written
        // on foreign branches
        resolve(cell, version, &history)
            .and_then(Payload::as_value)
            .ok_or(Error::IndexOutOfRange)
    }

    /// Appends `value`, branching off `version`.
    ///
    /// If the window end falls inside the physical array, the existing
    /// cell is reused and the value recorded against the new version;
    /// otherwise a fresh cell is pushed. Cells are shared across branches
    /// on purpose.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn push(&mut self, version: Version, value: T) -> crate::Result<Version> {
        let info = *self.versions.info(version)?;
        let new_version = self.versions.create_child(version)?;

        let slot = info.start + info.len;
        if let Some(cell) = self.cells.get_mut(slot) {
            cell.insert(Payload::Value(value), new_version);
        } else {
            debug_assert_eq!(self.cells.len(), slot);
            self.cells.push(FatNode::with_value(value, new_version));
        }

        self.versions.set_info(
            new_version,
            VecInfo {
                len: info.len + 1,
                start: info.start,
            },
        )?;

        log::trace!("vec: pushed at {version} -> {new_version}, slot {slot}");

        Ok(new_version)
    }

    /// Overwrites the value at `index`, branching off `version`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` is not inside the version's
    /// window (the root version has an empty window), and
    /// `VersionNotFound` for a bad handle. All checks happen before a new
    /// version is minted.
    pub fn set(&mut self, version: Version, index: usize, value: T) -> crate::Result<Version> {
        let info = *self.versions.info(version)?;

        if index >= info.len {
            return Err(Error::IndexOutOfRange);
        }

        let new_version = self.versions.create_child(version)?;

        if let Some(cell) = self.cells.get_mut(info.start + index) {
            cell.insert(Payload::Value(value), new_version);
        }

        self.versions.set_info(new_version, info)?;

        Ok(new_version)
    }

    /// Creates a zero-copy subwindow `range` of `version`.
    ///
    /// No fat node is written; the minted version simply observes a
    /// narrower `(start, len)` window. Appending to the subwindow may
    /// reuse physical cells populated by other branches.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if the range is inverted or reaches past
    /// the version's length, and `VersionNotFound` for a bad handle.
    pub fn slice(&mut self, version: Version, range: Range<usize>) -> crate::Result<Version> {
        let info = *self.versions.info(version)?;

        if range.start > range.end || range.end > info.len {
            return Err(Error::IndexOutOfRange);
        }

        let new_version = self.versions.create_child(version)?;
        self.versions.set_info(
            new_version,
            VecInfo {
                len: range.end - range.start,
                start: info.start + range.start,
            },
        )?;

        log::trace!("vec: sliced {version} -> {new_version} ({range:?})");

        Ok(new_version)
    }

    /// Returns the length of the window visible at `version`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn len(&self, version: Version) -> crate::Result<usize> {
        Ok(self.versions.info(version)?.len)
    }

    /// Returns `true` if the window visible at `version` is empty.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn is_empty(&self, version: Version) -> crate::Result<bool> {
        Ok(self.len(version)? == 0)
    }

    /// Iterates over the values visible at `version`, front to back.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out; each
    /// item reports `IndexOutOfRange` if its cell is not visible on this
    /// branch.
    pub fn iter(
        &self,
        version: Version,
    ) -> crate::Result<impl Iterator<Item = crate::Result<&T>> + '_> {
        let info = *self.versions.info(version)?;
        let history = self.versions.history(version)?;

        Ok((info.start..info.start + info.len).map(move |slot| {
            let cell = self.cells.get(slot).ok_or(Error::IndexOutOfRange)?;
            resolve(cell, version, &history)
                .and_then(Payload::as_value)
                .ok_or(Error::IndexOutOfRange)
        }))
    }

    /// Dumps the window visible at `version` into a standard [`Vec`].
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out, and
    /// `IndexOutOfRange` if any cell is not visible on this branch.
    pub fn to_vec(&self, version: Version) -> crate::Result<Vec<T>>
    where
        T: Clone,
    {
        self.iter(version)?
            .map(|item| item.cloned())
            .collect()
    }

    /// Returns the highest version handed out so far.
    #[must_use]
    pub fn current_version(&self) -> Version {
        self.versions.current()
    }
}

#[cfg(test)]
mod tests {
    use super::PersistentVec;
    use crate::Error;
    use test_log::test;

    #[test]
    fn vec_push_get_linear() {
        let (mut vec, v0) = PersistentVec::new();

        let v1 = vec.push(v0, "a").unwrap();
        let v2 = vec.push(v1, "b").unwrap();

        assert_eq!("a", *vec.get(v2, 0).unwrap());
        assert_eq!("b", *vec.get(v2, 1).unwrap());
        assert_eq!(1, vec.len(v1).unwrap());
        assert_eq!(2, vec.len(v2).unwrap());
    }

    #[test]
    fn vec_set_keeps_old_versions() {
        let (mut vec, v0) = PersistentVec::new();

        let v1 = vec.push(v0, 10).unwrap();
        let v2 = vec.set(v1, 0, 20).unwrap();

        assert_eq!(10, *vec.get(v1, 0).unwrap());
        assert_eq!(20, *vec.get(v2, 0).unwrap());
    }

    #[test]
    fn vec_bounds() {
        let (mut vec, v0) = PersistentVec::new();

        // The root window is empty
        assert_eq!(Err(Error::IndexOutOfRange), vec.get(v0, 0));
        assert_eq!(Err(Error::IndexOutOfRange), vec.set(v0, 0, 1));

        let v1 = vec.push(v0, 1).unwrap();
        assert_eq!(Err(Error::IndexOutOfRange), vec.get(v1, 1));
        assert_eq!(Err(Error::IndexOutOfRange), vec.set(v1, 1, 2));

        // Failed mutations must not mint versions
        assert_eq!(v1, vec.current_version());
    }

    #[test]
    fn vec_slice_bounds() {
        let (mut vec, v0) = PersistentVec::new();
        let v1 = vec.push(v0, 1).unwrap();
        let v2 = vec.push(v1, 2).unwrap();

        assert_eq!(Err(Error::IndexOutOfRange), vec.slice(v2, 2..1));
        assert_eq!(Err(Error::IndexOutOfRange), vec.slice(v2, 0..3));

        // An empty window is fine
        let v3 = vec.slice(v2, 2..2).unwrap();
        assert_eq!(0, vec.len(v3).unwrap());
        assert!(vec.to_vec(v3).unwrap().is_empty());
    }

    #[test]
    fn vec_unknown_version() {
        let (mut vec, _) = PersistentVec::new();

        assert_eq!(Err(Error::VersionNotFound(3)), vec.push(3, 1));
        assert_eq!(Err(Error::VersionNotFound(3)), vec.get(3, 0));
        assert_eq!(Err(Error::VersionNotFound(3)), vec.len(3));
        assert_eq!(Err(Error::VersionNotFound(3)), vec.slice(3, 0..0));
    }

    #[test]
    fn vec_iter_matches_gets() {
        let (mut vec, v0) = PersistentVec::new();
        let v1 = vec.push(v0, "x").unwrap();
        let v2 = vec.push(v1, "y").unwrap();

        let collected: Vec<_> = vec
            .iter(v2)
            .unwrap()
            .map(|item| *item.unwrap())
            .collect();
        assert_eq!(vec!["x", "y"], collected);
    }
}
