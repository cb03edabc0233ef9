//! An unbalanced binary search tree keyed by `Ord` keys.
//!
//! This is the ordered map the AVL tree is layered on. It owns every node,
//! performs plain binary search insertion and removal, and exposes the link
//! surgery (`swap_nodes`, `splice_out`, `replace_child`) the balancing code
//! reuses.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use log::{debug, trace};

use crate::bst_iter::{Iter, IterMut};
use crate::bst_node::{
    balanced_height, child_of, dismantle, entry, entry_mut, leftmost, position_of,
    predecessor_node, rightmost, set_child, subtree_height, successor_node, take_children, Node,
    NodeRef, Side,
};
use crate::error::KeyError;

/// A binary search tree map without self-balancing.
pub struct BinarySearchTree<K, V> {
    pub(super) root: Option<NodeRef<K, V>>,
    length: usize,
}

/// Outcome of [`BinarySearchTree::insert_leaf`].
pub(super) enum Placement<K, V> {
    /// The key was present; its previous value is returned.
    Replaced(V),
    /// A new leaf was linked into the tree.
    Inserted(NodeRef<K, V>),
}

impl<K, V> BinarySearchTree<K, V> {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        BinarySearchTree {
            root: None,
            length: 0,
        }
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        dismantle(self.root.take());
        self.length = 0;
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        let node = leftmost(self.root.clone()?);
        // SAFETY: the node is owned by `self`, which is borrowed for the result.
        unsafe { Some(entry(&node)) }
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        let node = rightmost(self.root.clone()?);
        // SAFETY: as in `first`.
        unsafe { Some(entry(&node)) }
    }

    /// Height of the tree: 0 when empty, 1 for a single node.
    pub fn height(&self) -> usize {
        subtree_height(self.root.as_ref())
    }

    /// Checks from the actual subtree heights that no node has subtrees whose
    /// heights differ by more than one.
    pub fn is_balanced(&self) -> bool {
        balanced_height(self.root.as_ref()).is_some()
    }

    /// Returns an in-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.clone(), self.length)
    }

    /// Returns an in-order iterator with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(self.root.clone(), self.length)
    }

    /// Points `position` (a parent and one of its slots, or the root when
    /// `None`) at `child`, fixing up the child's parent link.
    pub(super) fn replace_child(
        &mut self,
        position: Option<(&NodeRef<K, V>, Side)>,
        child: Option<NodeRef<K, V>>,
    ) {
        match position {
            Some((parent, side)) => set_child(parent, side, child),
            None => {
                if let Some(ref c) = child {
                    c.borrow_mut().parent = Weak::new();
                }
                self.root = child;
            }
        }
    }

    /// Exchanges the tree positions of `a` and `b`: parent, left and right
    /// links all move, while the keys and values stay with their nodes.
    ///
    /// Only order-preserving when the two nodes are adjacent in key order.
    pub(super) fn swap_nodes(&mut self, a: &NodeRef<K, V>, b: &NodeRef<K, V>) {
        if Rc::ptr_eq(a, b) {
            return;
        }
        // When one node is the parent of the other, make `a` the upper one.
        let b_is_parent = matches!(position_of(a), Some((ref p, _)) if Rc::ptr_eq(p, b));
        let (a, b) = if b_is_parent { (b, a) } else { (a, b) };

        let a_pos = position_of(a);
        let b_pos = position_of(b);
        let (a_left, a_right) = take_children(a);
        let (b_left, b_right) = take_children(b);

        self.replace_child(a_pos.as_ref().map(|(p, s)| (p, *s)), Some(b.clone()));
        match b_pos {
            Some((ref p, side)) if Rc::ptr_eq(p, a) => {
                let (left, right) = match side {
                    Side::Left => (Some(a.clone()), a_right),
                    Side::Right => (a_left, Some(a.clone())),
                };
                set_child(b, Side::Left, left);
                set_child(b, Side::Right, right);
            }
            _ => {
                set_child(b, Side::Left, a_left);
                set_child(b, Side::Right, a_right);
                self.replace_child(b_pos.as_ref().map(|(p, s)| (p, *s)), Some(a.clone()));
            }
        }
        set_child(a, Side::Left, b_left);
        set_child(a, Side::Right, b_right);
        trace!("swapped node positions");
    }

    /// Unlinks a node with at most one child, moving that child into its
    /// place. Returns the node's former parent and slot, and its value.
    pub(super) fn splice_out(&mut self, node: NodeRef<K, V>) -> (Option<(NodeRef<K, V>, Side)>, V) {
        let position = position_of(&node);
        let (left, right) = take_children(&node);
        debug_assert!(
            left.is_none() || right.is_none(),
            "spliced node must have at most one child"
        );
        self.replace_child(position.as_ref().map(|(p, s)| (p, *s)), left.or(right));
        self.length -= 1;

        let value = match Rc::try_unwrap(node) {
            Ok(cell) => cell.into_inner().value,
            Err(_) => panic!("removed node is still referenced"),
        };
        debug!("removed node, {} entries left", self.length);
        (position, value)
    }
}

impl<K, V> Default for BinarySearchTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for BinarySearchTree<K, V> {
    fn drop(&mut self) {
        dismantle(self.root.take());
    }
}

impl<K, V> BinarySearchTree<K, V>
where
    K: Ord,
{
    /// Finds the node holding `key`.
    pub(super) fn find_node<Q: ?Sized + Ord>(&self, key: &Q) -> Result<NodeRef<K, V>, KeyError>
    where
        K: Borrow<Q>,
    {
        let mut current = self.root.clone();
        while let Some(node_ref) = current {
            let ordering = key.cmp(RefCell::borrow(&node_ref).key.borrow());
            current = match ordering {
                Ordering::Less => child_of(&node_ref, Side::Left),
                Ordering::Greater => child_of(&node_ref, Side::Right),
                Ordering::Equal => return Ok(node_ref),
            };
        }
        Err(KeyError::NotFound)
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q: ?Sized + Ord>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        let node = self.find_node(key).ok()?;
        // SAFETY: the node is owned by `self`, which is borrowed for the result.
        unsafe { Some(entry(&node).1) }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q: ?Sized + Ord>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
    {
        let node = self.find_node(key).ok()?;
        // SAFETY: `self` is borrowed mutably for the result.
        unsafe { Some(entry_mut(&node).1) }
    }

    /// Returns true if the tree contains the key.
    pub fn contains_key<Q: ?Sized + Ord>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.find_node(key).is_ok()
    }

    /// Returns the entry ordered immediately before `key`.
    ///
    /// Fails with [`KeyError::NotFound`] if `key` itself is not in the tree.
    pub fn predecessor<Q: ?Sized + Ord>(&self, key: &Q) -> Result<Option<(&K, &V)>, KeyError>
    where
        K: Borrow<Q>,
    {
        let node = self.find_node(key)?;
        // SAFETY: the node is owned by `self`, which is borrowed for the result.
        Ok(predecessor_node(&node).map(|n| unsafe { entry(&n) }))
    }

    /// Returns the entry ordered immediately after `key`.
    ///
    /// Fails with [`KeyError::NotFound`] if `key` itself is not in the tree.
    pub fn successor<Q: ?Sized + Ord>(&self, key: &Q) -> Result<Option<(&K, &V)>, KeyError>
    where
        K: Borrow<Q>,
    {
        let node = self.find_node(key)?;
        // SAFETY: as in `predecessor`.
        Ok(successor_node(&node).map(|n| unsafe { entry(&n) }))
    }

    /// Overwrites the value of an existing key, or links a new leaf where the
    /// search for `key` fell off the tree.
    pub(super) fn insert_leaf(&mut self, key: K, value: V) -> Placement<K, V> {
        let mut parent = None;
        let mut current = self.root.clone();
        while let Some(node_ref) = current {
            let ordering = key.cmp(&RefCell::borrow(&node_ref).key);
            let side = match ordering {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    let old = mem::replace(&mut node_ref.borrow_mut().value, value);
                    return Placement::Replaced(old);
                }
            };
            current = child_of(&node_ref, side);
            parent = Some((node_ref, side));
        }

        let node = Node::new(key, value);
        self.replace_child(parent.as_ref().map(|(p, s)| (p, *s)), Some(node.clone()));
        self.length += 1;
        debug!("inserted leaf, {} entries", self.length);
        Placement::Inserted(node)
    }

    /// Inserts a key-value pair without rebalancing.
    /// Returns the old value if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.insert_leaf(key, value) {
            Placement::Replaced(old) => Some(old),
            Placement::Inserted(_) => None,
        }
    }

    /// Removes a key without rebalancing, returning its value if it was present.
    ///
    /// A node with two children first trades places with its in-order
    /// predecessor so the node actually unlinked has at most one child.
    pub fn remove<Q: ?Sized + Ord>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
    {
        let node = self.find_node(key).ok()?;
        if RefCell::borrow(&node).has_two_children() {
            if let Some(pred) = predecessor_node(&node) {
                self.swap_nodes(&node, &pred);
            }
        }
        let (_, value) = self.splice_out(node);
        Some(value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BinarySearchTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a BinarySearchTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut BinarySearchTree<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
