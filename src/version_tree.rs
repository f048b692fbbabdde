// Copyright (c) 2025-present, timetree
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{version::VersionCounter, Error, Version, ROOT_VERSION};

#[derive(Debug)]
struct VersionNode<I> {
    parent: Option<Version>,
    children: Vec<Version>,
    info: I,
}

/// Records the parent/child relation among all versions of one container
///
/// Persistence needs a tree, not a chain: two mutations taking the same
/// parent produce sibling versions, each the start of its own descendant
/// line, and neither sees the other's changes.
///
/// Versions are dense - the version number doubles as the index into the
/// node array - so every handle check is a bounds check. Version 0 is the
/// root and always exists, carrying the empty-container metadata.
///
/// `I` is the container-specific per-version metadata (sizes, window
/// offsets, list endpoints). A freshly minted version starts out with
/// `I::default()` until the mutation fills it in via
/// [`VersionTree::set_info`].
#[derive(Debug)]
pub struct VersionTree<I> {
    nodes: Vec<VersionNode<I>>,
    counter: VersionCounter,
}

impl<I: Default> VersionTree<I> {
    /// Creates a tree holding only the root version 0.
    #[must_use]
    pub fn new() -> Self {
        let mut counter = VersionCounter::default();
        let root = counter.next();
        debug_assert_eq!(ROOT_VERSION, root);

        Self {
            nodes: vec![VersionNode {
                parent: None,
                children: Vec::new(),
                info: I::default(),
            }],
            counter,
        }
    }

    /// Mints a fresh version and links it under `parent`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `parent` was never handed out. The
    /// check happens before minting, so a failed call leaves the tree
    /// untouched.
    pub fn create_child(&mut self, parent: Version) -> crate::Result<Version> {
        self.node(parent)?;

        let version = self.counter.next();
        debug_assert_eq!(self.nodes.len() as u64, version);

        self.nodes.push(VersionNode {
            parent: Some(parent),
            children: Vec::new(),
            info: I::default(),
        });

        // Cannot fail, the parent was validated above
        if let Ok(node) = self.node_mut(parent) {
            node.children.push(version);
        }

        log::trace!("minted version {version} under {parent}");

        Ok(version)
    }

    /// Returns the metadata attached to `version`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn info(&self, version: Version) -> crate::Result<&I> {
        self.node(version).map(|node| &node.info)
    }

    /// Attaches metadata to `version`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn set_info(&mut self, version: Version, info: I) -> crate::Result<()> {
        self.node_mut(version)?.info = info;
        Ok(())
    }

    /// Returns the root-to-`version` path, starting at version 0.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn history(&self, version: Version) -> crate::Result<Vec<Version>> {
        let mut node = self.node(version)?;
        let mut path = vec![version];

        while let Some(parent) = node.parent {
            path.push(parent);
            node = self.node(parent)?;
        }

        path.reverse();
        Ok(path)
    }

    /// Returns the direct children of `version`, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn children(&self, version: Version) -> crate::Result<&[Version]> {
        self.node(version).map(|node| node.children.as_slice())
    }

    /// Returns the parent of `version` (`None` for the root).
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if `version` was never handed out.
    pub fn parent(&self, version: Version) -> crate::Result<Option<Version>> {
        self.node(version).map(|node| node.parent)
    }

    /// Returns the highest version handed out so far.
    #[must_use]
    pub fn current(&self) -> Version {
        self.counter.current()
    }

    /// Returns the number of versions in the tree (root included).
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, version: Version) -> crate::Result<&VersionNode<I>> {
        usize::try_from(version)
            .ok()
            .and_then(|idx| self.nodes.get(idx))
            .ok_or(Error::VersionNotFound(version))
    }

    fn node_mut(&mut self, version: Version) -> crate::Result<&mut VersionNode<I>> {
        usize::try_from(version)
            .ok()
            .and_then(|idx| self.nodes.get_mut(idx))
            .ok_or(Error::VersionNotFound(version))
    }
}

impl<I: Default> Default for VersionTree<I> {
    fn default() -> Self {
        Self::new()
    }
}
