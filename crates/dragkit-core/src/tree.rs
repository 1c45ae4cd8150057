#![forbid(unsafe_code)]

//! Host tree: the ordered, mutable node structure the engine reorders.
//!
//! The tree is an arena of nodes with parent/child links. Child order is
//! the presentation order; mutations take effect immediately, so the tree
//! is always the source of truth for what the rendering layer should draw.
//!
//! # Invariants
//!
//! 1. A node has at most one parent; attaching a node detaches it from its
//!    previous parent first.
//! 2. `children` never contains duplicates and never contains the parent
//!    itself or any of its ancestors.
//! 3. Relative insertion (`insert_before` / `insert_after`) either commits
//!    the move or leaves the tree untouched. There is no partial state.
//!
//! # Failure Modes
//!
//! - Queries against an unknown node id return `None` / empty slices.
//! - Relative insertion against an anchor that is not a child of the given
//!   parent returns `false` without mutating anything.

use ahash::AHashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity of a node in the host tree.
///
/// Ids are never reused within a tree, so a stale id after `remove` simply
/// resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(u64);

impl NodeId {
    /// The raw id value, for logging and diagnostics.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Rendered size of a node, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extent {
    /// Width in layout units.
    pub width: u16,
    /// Height in layout units.
    pub height: u16,
}

impl Extent {
    /// Create a new extent.
    #[inline]
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Check if the extent has zero area.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    text: String,
    extent: Extent,
}

/// An arena of nodes with ordered children.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: AHashMap<NodeId, Node>,
    next_id: u64,
}

impl NodeTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new detached node.
    pub fn create(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::default());
        id
    }

    /// Check whether a node exists in the tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Ordered children of a node. Unknown ids yield an empty slice.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Zero-based position of `child` within `parent`'s children.
    #[must_use]
    pub fn position_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Add a class token to a node.
    pub fn add_class(&mut self, id: NodeId, class: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            let class = class.into();
            if !node.classes.contains(&class) {
                node.classes.push(class);
            }
        }
    }

    /// Check whether a node carries a class token.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Set a node's own text content.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = text.into();
        }
    }

    /// Concatenated text of a node and its descendants, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.nodes.get(&id) {
            out.push_str(&node.text);
            for &child in &node.children {
                self.collect_text(child, out);
            }
        }
    }

    /// Set a node's rendered extent.
    pub fn set_extent(&mut self, id: NodeId, extent: Extent) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.extent = extent;
        }
    }

    /// Rendered extent of a node. Unknown ids yield a zero extent.
    #[must_use]
    pub fn extent_of(&self, id: NodeId) -> Extent {
        self.nodes.get(&id).map_or(Extent::default(), |n| n.extent)
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Detaches `child` from its previous parent first. Returns `false`
    /// (without mutating) if either node is unknown or the attachment
    /// would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_attach(parent, child) {
            return false;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        true
    }

    /// Move `child` to sit immediately before `anchor` within `parent`.
    ///
    /// Returns `false` without mutating if `anchor` is not a child of
    /// `parent`, if `child == anchor`, or if the attachment is invalid.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, anchor: NodeId) -> bool {
        self.insert_relative(parent, child, anchor, 0)
    }

    /// Move `child` to sit immediately after `anchor` within `parent`.
    ///
    /// Same failure behavior as [`insert_before`](Self::insert_before).
    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, anchor: NodeId) -> bool {
        self.insert_relative(parent, child, anchor, 1)
    }

    fn insert_relative(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: NodeId,
        offset: usize,
    ) -> bool {
        if child == anchor || !self.can_attach(parent, child) {
            return false;
        }
        if self.position_of(parent, anchor).is_none() {
            return false;
        }
        // Detach first: if child precedes anchor under the same parent the
        // anchor index shifts, so resolve it after the detach.
        self.detach(child);
        let Some(index) = self.position_of(parent, anchor) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.insert(index + offset, child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        true
    }

    /// Detach a node from its parent, keeping it (and its subtree) alive.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|&c| c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    /// Remove a node and its entire subtree from the tree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
    }

    /// Attachment is legal when both nodes exist and `child` is not
    /// `parent` or one of its ancestors.
    fn can_attach(&self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return false;
            }
            cursor = self.parent(node);
        }
        true
    }
}

/// A class-token matcher over tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Selector {
    class: String,
}

impl Selector {
    /// Match nodes carrying the given class token.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self { class: name.into() }
    }

    /// The class token this selector matches.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Check whether a single node matches.
    #[must_use]
    pub fn matches(&self, tree: &NodeTree, id: NodeId) -> bool {
        tree.has_class(id, &self.class)
    }

    /// Matching descendants of `root`, in document order. `root` itself is
    /// never included. A selector that matches nothing yields an empty
    /// result, never an error.
    #[must_use]
    pub fn query(&self, tree: &NodeTree, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.query_into(tree, root, &mut out);
        out
    }

    fn query_into(&self, tree: &NodeTree, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in tree.children(id) {
            if self.matches(tree, child) {
                out.push(child);
            }
            self.query_into(tree, child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_items(n: usize) -> (NodeTree, NodeId, Vec<NodeId>) {
        let mut tree = NodeTree::new();
        let root = tree.create();
        let items = (0..n)
            .map(|i| {
                let item = tree.create();
                tree.add_class(item, "entry");
                tree.set_text(item, format!("item-{i}"));
                tree.append_child(root, item);
                item
            })
            .collect();
        (tree, root, items)
    }

    #[test]
    fn append_preserves_order() {
        let (tree, root, items) = tree_with_items(4);
        assert_eq!(tree.children(root), items.as_slice());
        for (i, &item) in items.iter().enumerate() {
            assert_eq!(tree.position_of(root, item), Some(i));
            assert_eq!(tree.parent(item), Some(root));
        }
    }

    #[test]
    fn reappend_moves_to_end() {
        let (mut tree, root, items) = tree_with_items(3);
        assert!(tree.append_child(root, items[0]));
        assert_eq!(tree.children(root), &[items[1], items[2], items[0]]);
    }

    #[test]
    fn insert_before_same_parent() {
        let (mut tree, root, items) = tree_with_items(4);
        // Move D before B: [A, D, B, C]
        assert!(tree.insert_before(root, items[3], items[1]));
        assert_eq!(
            tree.children(root),
            &[items[0], items[3], items[1], items[2]]
        );
    }

    #[test]
    fn insert_after_same_parent_forward() {
        let (mut tree, root, items) = tree_with_items(4);
        // Move A after C: [B, C, A, D]. A precedes the anchor, so the
        // anchor index shifts during the move.
        assert!(tree.insert_after(root, items[0], items[2]));
        assert_eq!(
            tree.children(root),
            &[items[1], items[2], items[0], items[3]]
        );
    }

    #[test]
    fn insert_relative_to_missing_anchor_is_untouched() {
        let (mut tree, root, items) = tree_with_items(3);
        let stranger = tree.create();
        assert!(!tree.insert_before(root, items[0], stranger));
        assert!(!tree.insert_after(root, items[0], stranger));
        assert_eq!(tree.children(root), items.as_slice());
    }

    #[test]
    fn insert_relative_to_self_is_untouched() {
        let (mut tree, root, items) = tree_with_items(3);
        assert!(!tree.insert_before(root, items[1], items[1]));
        assert_eq!(tree.children(root), items.as_slice());
    }

    #[test]
    fn detach_keeps_subtree_alive() {
        let (mut tree, root, items) = tree_with_items(2);
        let grandchild = tree.create();
        tree.append_child(items[0], grandchild);

        tree.detach(items[0]);
        assert_eq!(tree.parent(items[0]), None);
        assert_eq!(tree.children(root), &[items[1]]);
        assert!(tree.contains(grandchild));
        assert_eq!(tree.children(items[0]), &[grandchild]);
    }

    #[test]
    fn remove_drops_subtree() {
        let (mut tree, root, items) = tree_with_items(2);
        let grandchild = tree.create();
        tree.append_child(items[0], grandchild);

        tree.remove(items[0]);
        assert!(!tree.contains(items[0]));
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.children(root), &[items[1]]);
    }

    #[test]
    fn cycle_attachment_rejected() {
        let mut tree = NodeTree::new();
        let a = tree.create();
        let b = tree.create();
        let c = tree.create();
        tree.append_child(a, b);
        tree.append_child(b, c);

        assert!(!tree.append_child(c, a));
        assert!(!tree.append_child(a, a));
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn text_content_document_order() {
        let mut tree = NodeTree::new();
        let root = tree.create();
        tree.set_text(root, "Senior Engineer");
        let child = tree.create();
        tree.set_text(child, " at Initech");
        tree.append_child(root, child);

        assert_eq!(tree.text_content(root), "Senior Engineer at Initech");
    }

    #[test]
    fn query_matches_only_selected_children() {
        // 3 matching and 2 non-matching children: exactly 3 results.
        let (mut tree, root, _) = tree_with_items(3);
        for _ in 0..2 {
            let other = tree.create();
            tree.add_class(other, "section-heading");
            tree.append_child(root, other);
        }

        let found = Selector::class("entry").query(&tree, root);
        assert_eq!(found.len(), 3);
        for id in &found {
            assert!(tree.has_class(*id, "entry"));
        }
    }

    #[test]
    fn query_descends_into_subtrees() {
        let (mut tree, root, items) = tree_with_items(1);
        let nested = tree.create();
        tree.add_class(nested, "entry");
        tree.append_child(items[0], nested);

        let found = Selector::class("entry").query(&tree, root);
        assert_eq!(found, vec![items[0], nested]);
    }

    #[test]
    fn query_nothing_matches_is_empty() {
        let (tree, root, _) = tree_with_items(3);
        assert!(Selector::class("missing").query(&tree, root).is_empty());
    }

    #[test]
    fn unknown_ids_resolve_to_nothing() {
        let (mut tree, root, items) = tree_with_items(1);
        tree.remove(items[0]);
        assert_eq!(tree.position_of(root, items[0]), None);
        assert_eq!(tree.children(items[0]), &[] as &[NodeId]);
        assert_eq!(tree.extent_of(items[0]), Extent::default());
        assert_eq!(tree.text_content(items[0]), "");
    }

    #[test]
    fn ids_are_not_reused() {
        let mut tree = NodeTree::new();
        let a = tree.create();
        tree.remove(a);
        let b = tree.create();
        assert_ne!(a, b);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Move {
            Before(usize, usize),
            After(usize, usize),
            Append(usize),
        }

        fn move_strategy(n: usize) -> impl Strategy<Value = Move> {
            prop_oneof![
                ((0..n), (0..n)).prop_map(|(c, a)| Move::Before(c, a)),
                ((0..n), (0..n)).prop_map(|(c, a)| Move::After(c, a)),
                (0..n).prop_map(Move::Append),
            ]
        }

        proptest! {
            #[test]
            fn moves_keep_children_a_permutation(
                moves in proptest::collection::vec(move_strategy(5), 0..30)
            ) {
                let (mut tree, root, items) = tree_with_items(5);
                let mut sorted = items.clone();
                sorted.sort_unstable();

                for mv in moves {
                    match mv {
                        Move::Before(c, a) => {
                            tree.insert_before(root, items[c], items[a]);
                        }
                        Move::After(c, a) => {
                            tree.insert_after(root, items[c], items[a]);
                        }
                        Move::Append(c) => {
                            tree.append_child(root, items[c]);
                        }
                    }
                    let mut current = tree.children(root).to_vec();
                    current.sort_unstable();
                    prop_assert_eq!(&current, &sorted);
                    for &item in &items {
                        prop_assert_eq!(tree.parent(item), Some(root));
                    }
                }
            }
        }
    }

    #[test]
    fn extent_roundtrip() {
        let mut tree = NodeTree::new();
        let node = tree.create();
        tree.set_extent(node, Extent::new(40, 3));
        assert_eq!(tree.extent_of(node), Extent::new(40, 3));
        assert!(!Extent::new(40, 3).is_empty());
        assert!(Extent::new(0, 3).is_empty());
    }
}
