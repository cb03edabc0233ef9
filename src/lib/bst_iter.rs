use crate::bst_node::{entry, entry_mut, left_of, right_of, NodeRef};
use std::marker::PhantomData;

/// In-order iterator over the entries of a tree.
pub struct Iter<'a, K, V> {
    // Nodes whose left subtree has been visited but which are not yet yielded.
    stack: Vec<NodeRef<K, V>>,
    remaining: usize,
    marker: PhantomData<&'a V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(root: Option<NodeRef<K, V>>, length: usize) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: length,
            marker: PhantomData,
        };
        if let Some(r) = root {
            iter.push_leftmost(r);
        }
        iter
    }

    fn push_leftmost(&mut self, node_ref: NodeRef<K, V>) {
        let mut current = Some(node_ref);
        while let Some(node) = current {
            current = left_of(&node);
            self.stack.push(node);
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = right_of(&node) {
            self.push_leftmost(right);
        }
        self.remaining -= 1;
        // SAFETY: the iterator borrows the tree for 'a, so the node outlives it.
        unsafe { Some(entry(&node)) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for Iter<'a, K, V> {}

/// In-order iterator over the entries of a tree with mutable values.
pub struct IterMut<'a, K, V> {
    stack: Vec<NodeRef<K, V>>,
    remaining: usize,
    marker: PhantomData<&'a mut V>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(super) fn new(root: Option<NodeRef<K, V>>, length: usize) -> Self {
        let mut iter = IterMut {
            stack: Vec::new(),
            remaining: length,
            marker: PhantomData,
        };
        if let Some(r) = root {
            iter.push_leftmost(r);
        }
        iter
    }

    fn push_leftmost(&mut self, node_ref: NodeRef<K, V>) {
        let mut current = Some(node_ref);
        while let Some(node) = current {
            current = left_of(&node);
            self.stack.push(node);
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Finish reading the node's links before its value is handed out;
        // yielded nodes are never touched again.
        let right = right_of(&node);
        if let Some(right) = right {
            self.push_leftmost(right);
        }
        self.remaining -= 1;
        // SAFETY: the tree is borrowed mutably for 'a and every node is yielded once.
        unsafe { Some(entry_mut(&node)) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for IterMut<'a, K, V> {}
