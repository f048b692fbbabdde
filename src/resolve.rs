// Copyright (c) 2025-present, timetree
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    fat_node::{FatNode, Payload},
    Version,
};

/// Returns the payload visible at `version` for the slot backed by `node`.
///
/// A fat node records the absolute versions at which its slot was
/// written, but `version` may lie on a branch that never touched the
/// slot. The visible payload is the one written by the deepest ancestor
/// of `version` (including `version` itself) that wrote the slot.
///
/// `history` must be the root-to-`version` path as produced by
/// [`VersionTree::history`](crate::VersionTree::history).
///
/// Tombstones are returned as-is; translating a tombstone into "absent"
/// is the container's business, since only the container knows whether
/// absence is an error or a flag.
///
/// Looking at `node` alone - say, its greatest entry at or before
/// `version` - would be wrong here: that entry may have been written on a
/// sibling branch the queried version never inherited. Only versions on
/// the root-to-`version` path count.
#[must_use]
pub fn resolve<'a, T>(
    node: &'a FatNode<T>,
    version: Version,
    history: &[Version],
) -> Option<&'a Payload<T>> {
    debug_assert_eq!(
        Some(&version),
        history.last(),
        "history must end with the queried version",
    );

    if let Some(payload) = node.find_exact(version) {
        return Some(payload);
    }

    // The only remaining ancestor is the root, which writes nothing.
    if history.len() <= 2 {
        return None;
    }

    // Walk the interior ancestors deepest-first. The root at history[0]
    // holds no entries and the queried version was probed above.
    history
        .get(1..history.len() - 1)?
        .iter()
        .rev()
        .find_map(|&ancestor| node.find_exact(ancestor))
}

#[cfg(test)]
mod tests {
    use super::resolve;
    use crate::fat_node::{FatNode, Payload};
    use test_log::test;

    #[test]
    fn resolve_exact_hit() {
        let mut node = FatNode::with_value("a", 1);
        node.insert(Payload::Value("b"), 3);

        assert_eq!(
            Some(&Payload::Value("b")),
            resolve(&node, 3, &[0, 1, 2, 3]),
        );
    }

    #[test]
    fn resolve_inherits_from_ancestor() {
        let node = FatNode::with_value("a", 1);

        assert_eq!(Some(&Payload::Value("a")), resolve(&node, 3, &[0, 1, 3]));
        assert_eq!(Some(&Payload::Value("a")), resolve(&node, 5, &[0, 1, 3, 5]));
    }

    #[test]
    fn resolve_ignores_sibling_branch() {
        // Slot written at version 2 only; versions 2 and 3 are siblings
        // under version 1, so version 3 must not see the write.
        let node = FatNode::with_value("a", 2);

        assert_eq!(Some(&Payload::Value("a")), resolve(&node, 2, &[0, 1, 2]));
        assert_eq!(None, resolve(&node, 3, &[0, 1, 3]));
    }

    #[test]
    fn resolve_nothing_at_root() {
        let node = FatNode::with_value("a", 1);
        assert_eq!(None, resolve(&node, 0, &[0]));
    }

    #[test]
    fn resolve_returns_raw_tombstone() {
        let mut node = FatNode::with_value("a", 1);
        node.insert(Payload::Tombstone, 2);

        assert_eq!(Some(&Payload::Tombstone), resolve(&node, 4, &[0, 1, 2, 4]));
    }

    #[test]
    fn resolve_empty_slot() {
        let node = FatNode::<&str>::new();
        assert_eq!(None, resolve(&node, 4, &[0, 1, 2, 4]));
    }
}
