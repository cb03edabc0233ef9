//! An AVL tree map.
//!
//! [`AvlTree`] layers height balancing over the plain
//! [`BinarySearchTree`]: every node stores a balance factor (right height
//! minus left height), and each structural insert or remove walks back up
//! the tree adjusting those factors and rotating wherever one reaches ±2.
//! The tree is single-threaded; wrap it in a lock to share it.
#![warn(missing_docs)]

use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt;
use std::mem;

use log::trace;

pub mod bst;
mod bst_iter;
mod bst_node;
pub mod equal_paths;
mod error;

pub use bst::BinarySearchTree;
pub use bst_iter::{Iter, IterMut};
pub use equal_paths::{equal_paths, TreeNode};
pub use error::KeyError;

use bst::Placement;
use bst_node::{left_of, position_of, predecessor_node, right_of, set_child, NodeRef, Side};

/// A self-balancing binary search tree map.
pub struct AvlTree<K, V> {
    tree: BinarySearchTree<K, V>,
}

impl<K, V> AvlTree<K, V> {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        AvlTree {
            tree: BinarySearchTree::new(),
        }
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first()
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last()
    }

    /// Height of the tree: 0 when empty, 1 for a single node.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Recomputes subtree heights and checks the AVL bound at every node.
    pub fn is_balanced(&self) -> bool {
        self.tree.is_balanced()
    }

    /// Returns an in-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.tree.iter()
    }

    /// Returns an in-order iterator with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.tree.iter_mut()
    }

    /// Promotes the right child of `node` into its place.
    fn rotate_left(&mut self, node: &NodeRef<K, V>) -> NodeRef<K, V> {
        let pivot = right_of(node).expect("rotate_left needs a right child");
        let position = position_of(node);
        let inner = pivot.borrow_mut().left.take();
        set_child(node, Side::Right, inner);
        set_child(&pivot, Side::Left, Some(node.clone()));
        self.tree
            .replace_child(position.as_ref().map(|(p, s)| (p, *s)), Some(pivot.clone()));

        {
            let mut n = node.borrow_mut();
            let mut p = pivot.borrow_mut();
            n.balance = n.balance - 1 - p.balance.max(0);
            p.balance = p.balance - 1 + n.balance.min(0);
            trace!("rotated left, balances now {} / {}", p.balance, n.balance);
        }
        pivot
    }

    /// Promotes the left child of `node` into its place.
    fn rotate_right(&mut self, node: &NodeRef<K, V>) -> NodeRef<K, V> {
        let pivot = left_of(node).expect("rotate_right needs a left child");
        let position = position_of(node);
        let inner = pivot.borrow_mut().right.take();
        set_child(node, Side::Left, inner);
        set_child(&pivot, Side::Right, Some(node.clone()));
        self.tree
            .replace_child(position.as_ref().map(|(p, s)| (p, *s)), Some(pivot.clone()));

        {
            let mut n = node.borrow_mut();
            let mut p = pivot.borrow_mut();
            n.balance = n.balance + 1 - p.balance.min(0);
            p.balance = p.balance + 1 + n.balance.max(0);
            trace!("rotated right, balances now {} / {}", p.balance, n.balance);
        }
        pivot
    }

    /// Repairs a node whose balance factor is ±2 with a single or double
    /// rotation and returns the new top of the subtree.
    fn rebalance(&mut self, node: &NodeRef<K, V>) -> NodeRef<K, V> {
        let balance = RefCell::borrow(node).balance;
        debug_assert!(balance.abs() == 2, "rebalance on balance {}", balance);
        if balance < 0 {
            let heavy = left_of(node).expect("left-heavy node has a left child");
            let zig_zag = RefCell::borrow(&heavy).balance > 0;
            if zig_zag {
                self.rotate_left(&heavy);
            }
            self.rotate_right(node)
        } else {
            let heavy = right_of(node).expect("right-heavy node has a right child");
            let zig_zag = RefCell::borrow(&heavy).balance < 0;
            if zig_zag {
                self.rotate_right(&heavy);
            }
            self.rotate_left(node)
        }
    }

    /// Swaps the positions of two nodes together with their balance factors,
    /// so each position keeps the balance that describes it.
    fn node_swap(&mut self, a: &NodeRef<K, V>, b: &NodeRef<K, V>) {
        self.tree.swap_nodes(a, b);
        let mut x = a.borrow_mut();
        let mut y = b.borrow_mut();
        mem::swap(&mut x.balance, &mut y.balance);
    }

    fn rebalance_after_insert(&mut self, node: NodeRef<K, V>) {
        let mut child = node;
        while let Some((parent, side)) = position_of(&child) {
            let balance = {
                let mut p = parent.borrow_mut();
                p.balance += side.weight();
                p.balance
            };
            match balance {
                // The shorter side caught up; the height above is unchanged.
                0 => return,
                -1 | 1 => child = parent,
                _ => {
                    self.rebalance(&parent);
                    return;
                }
            }
        }
    }

    fn rebalance_after_remove(&mut self, parent: NodeRef<K, V>, side: Side) {
        let mut next = Some((parent, side));
        while let Some((node, side)) = next {
            let balance = {
                let mut n = node.borrow_mut();
                n.balance -= side.weight();
                n.balance
            };
            let top = match balance {
                -1 | 1 => return,
                0 => node,
                _ => {
                    let top = self.rebalance(&node);
                    // A single rotation over an evenly balanced child keeps the height.
                    if RefCell::borrow(&top).balance != 0 {
                        return;
                    }
                    top
                }
            };
            next = position_of(&top);
        }
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AvlTree<K, V>
where
    K: Ord,
{
    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q: ?Sized + Ord>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
    {
        self.tree.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q: ?Sized + Ord>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
    {
        self.tree.get_mut(key)
    }

    /// Returns true if the tree contains the key.
    pub fn contains_key<Q: ?Sized + Ord>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.tree.contains_key(key)
    }

    /// Returns the entry ordered immediately before `key`.
    pub fn predecessor<Q: ?Sized + Ord>(&self, key: &Q) -> Result<Option<(&K, &V)>, KeyError>
    where
        K: Borrow<Q>,
    {
        self.tree.predecessor(key)
    }

    /// Returns the entry ordered immediately after `key`.
    pub fn successor<Q: ?Sized + Ord>(&self, key: &Q) -> Result<Option<(&K, &V)>, KeyError>
    where
        K: Borrow<Q>,
    {
        self.tree.successor(key)
    }

    /// Returns the balance factor stored for `key`'s node.
    pub fn balance_of<Q: ?Sized + Ord>(&self, key: &Q) -> Result<i8, KeyError>
    where
        K: Borrow<Q>,
    {
        let node = self.tree.find_node(key)?;
        let balance = RefCell::borrow(&node).balance;
        Ok(balance)
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// An existing key only has its value replaced, and the old value is
    /// returned; the shape and the balance factors stay as they were.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.insert_leaf(key, value) {
            Placement::Replaced(old) => Some(old),
            Placement::Inserted(node) => {
                self.rebalance_after_insert(node);
                None
            }
        }
    }

    /// Removes a key from the tree, returning the value if it was present.
    pub fn remove<Q: ?Sized + Ord>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
    {
        let node = self.tree.find_node(key).ok()?;
        if RefCell::borrow(&node).has_two_children() {
            if let Some(pred) = predecessor_node(&node) {
                self.node_swap(&node, &pred);
            }
        }
        let (position, value) = self.tree.splice_out(node);
        if let Some((parent, side)) = position {
            self.rebalance_after_remove(parent, side);
        }
        Some(value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut AvlTree<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
