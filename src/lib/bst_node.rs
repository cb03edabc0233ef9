use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub(super) type NodeRef<K, V> = Rc<RefCell<Node<K, V>>>;

/// Which child slot of a parent a node hangs off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

impl Side {
    /// Change of the parent's balance factor when this side grows by one level.
    pub(super) fn weight(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

// Children are owning links; the parent link is a back-reference only.
pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    /// Height of the right subtree minus height of the left subtree.
    pub(super) balance: i8,
    pub(super) parent: Weak<RefCell<Node<K, V>>>,
    pub(super) left: Option<NodeRef<K, V>>,
    pub(super) right: Option<NodeRef<K, V>>,
}

impl<K, V> Node<K, V> {
    pub(super) fn new(key: K, value: V) -> NodeRef<K, V> {
        Rc::new(RefCell::new(Node {
            key,
            value,
            balance: 0,
            parent: Weak::new(),
            left: None,
            right: None,
        }))
    }

    pub(super) fn has_two_children(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    fn slot(&mut self, side: Side) -> &mut Option<NodeRef<K, V>> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

pub(super) fn parent_of<K, V>(node: &NodeRef<K, V>) -> Option<NodeRef<K, V>> {
    RefCell::borrow(node).parent.upgrade()
}

pub(super) fn child_of<K, V>(node: &NodeRef<K, V>, side: Side) -> Option<NodeRef<K, V>> {
    let node = RefCell::borrow(node);
    match side {
        Side::Left => node.left.clone(),
        Side::Right => node.right.clone(),
    }
}

pub(super) fn left_of<K, V>(node: &NodeRef<K, V>) -> Option<NodeRef<K, V>> {
    child_of(node, Side::Left)
}

pub(super) fn right_of<K, V>(node: &NodeRef<K, V>) -> Option<NodeRef<K, V>> {
    child_of(node, Side::Right)
}

/// Returns the parent of `node` together with the slot `node` occupies in it,
/// or `None` for the root.
pub(super) fn position_of<K, V>(node: &NodeRef<K, V>) -> Option<(NodeRef<K, V>, Side)> {
    let parent = parent_of(node)?;
    let side = match RefCell::borrow(&parent).left {
        Some(ref left) if Rc::ptr_eq(left, node) => Side::Left,
        _ => Side::Right,
    };
    Some((parent, side))
}

/// Stores `child` in the `side` slot of `node` and points the child back at `node`.
pub(super) fn set_child<K, V>(node: &NodeRef<K, V>, side: Side, child: Option<NodeRef<K, V>>) {
    if let Some(ref c) = child {
        c.borrow_mut().parent = Rc::downgrade(node);
    }
    *node.borrow_mut().slot(side) = child;
}

pub(super) fn take_children<K, V>(
    node: &NodeRef<K, V>,
) -> (Option<NodeRef<K, V>>, Option<NodeRef<K, V>>) {
    let mut node = node.borrow_mut();
    (node.left.take(), node.right.take())
}

pub(super) fn leftmost<K, V>(mut node: NodeRef<K, V>) -> NodeRef<K, V> {
    while let Some(left) = left_of(&node) {
        node = left;
    }
    node
}

pub(super) fn rightmost<K, V>(mut node: NodeRef<K, V>) -> NodeRef<K, V> {
    while let Some(right) = right_of(&node) {
        node = right;
    }
    node
}

/// In-order predecessor: the rightmost node of the left subtree, or else the
/// nearest ancestor reached from its right side.
pub(super) fn predecessor_node<K, V>(node: &NodeRef<K, V>) -> Option<NodeRef<K, V>> {
    if let Some(left) = left_of(node) {
        return Some(rightmost(left));
    }
    let mut current = node.clone();
    while let Some((parent, side)) = position_of(&current) {
        if side == Side::Right {
            return Some(parent);
        }
        current = parent;
    }
    None
}

pub(super) fn successor_node<K, V>(node: &NodeRef<K, V>) -> Option<NodeRef<K, V>> {
    if let Some(right) = right_of(node) {
        return Some(leftmost(right));
    }
    let mut current = node.clone();
    while let Some((parent, side)) = position_of(&current) {
        if side == Side::Left {
            return Some(parent);
        }
        current = parent;
    }
    None
}

/// Hands out references into a node owned by a tree.
///
/// # Safety
///
/// The caller must bind `'a` to a borrow of the tree that owns `node`, and no
/// `RefMut` of the node may be alive while the references are in use.
pub(super) unsafe fn entry<'a, K, V>(node: &NodeRef<K, V>) -> (&'a K, &'a V) {
    let ptr = node.as_ptr();
    (&(*ptr).key, &(*ptr).value)
}

/// Mutable counterpart of [`entry`].
///
/// # Safety
///
/// As for [`entry`], and the caller must hold the owning tree mutably and not
/// hand out the same node twice.
pub(super) unsafe fn entry_mut<'a, K, V>(node: &NodeRef<K, V>) -> (&'a K, &'a mut V) {
    let ptr = node.as_ptr();
    (&(*ptr).key, &mut (*ptr).value)
}

/// Height of the subtree rooted at `node`, recomputed from the links one
/// level at a time so degenerate chains do not exhaust the stack.
pub(super) fn subtree_height<K, V>(node: Option<&NodeRef<K, V>>) -> usize {
    let mut level: Vec<NodeRef<K, V>> = node.cloned().into_iter().collect();
    let mut height = 0;
    while !level.is_empty() {
        height += 1;
        let mut next = Vec::new();
        for n in &level {
            let n = RefCell::borrow(n);
            next.extend(n.left.iter().cloned());
            next.extend(n.right.iter().cloned());
        }
        level = next;
    }
    height
}

enum Visit<K, V> {
    Enter(Option<NodeRef<K, V>>),
    Exit,
}

/// Height of the subtree rooted at `node` if no node below it has subtrees
/// whose heights differ by more than one, `None` otherwise.
pub(super) fn balanced_height<K, V>(node: Option<&NodeRef<K, V>>) -> Option<usize> {
    // Post-order with an explicit stack; finished subtrees leave their height
    // on `heights`, left before right.
    let mut visits = vec![Visit::Enter(node.cloned())];
    let mut heights: Vec<usize> = Vec::new();
    while let Some(visit) = visits.pop() {
        match visit {
            Visit::Enter(None) => heights.push(0),
            Visit::Enter(Some(n)) => {
                let (left, right) = {
                    let n = RefCell::borrow(&n);
                    (n.left.clone(), n.right.clone())
                };
                visits.push(Visit::Exit);
                visits.push(Visit::Enter(right));
                visits.push(Visit::Enter(left));
            }
            Visit::Exit => {
                let r = heights.pop()?;
                let l = heights.pop()?;
                if l.abs_diff(r) > 1 {
                    return None;
                }
                heights.push(1 + l.max(r));
            }
        }
    }
    heights.pop()
}

/// Tears down the subtree under `root` without recursing once per level.
pub(super) fn dismantle<K, V>(root: Option<NodeRef<K, V>>) {
    let mut pending: Vec<NodeRef<K, V>> = root.into_iter().collect();
    while let Some(node) = pending.pop() {
        let (left, right) = take_children(&node);
        pending.extend(left);
        pending.extend(right);
    }
}
