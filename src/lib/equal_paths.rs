//! Depth comparison for arbitrary binary trees.
//!
//! Unrelated to the AVL machinery: works on any owned binary tree built from
//! [`TreeNode`]s.

/// A node of a plain owned binary tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode<T> {
    /// The payload carried by the node.
    pub value: T,
    /// Left subtree.
    pub left: Option<Box<TreeNode<T>>>,
    /// Right subtree.
    pub right: Option<Box<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    /// Creates a node without children.
    pub fn leaf(value: T) -> Self {
        TreeNode {
            value,
            left: None,
            right: None,
        }
    }

    /// Sets the left subtree.
    pub fn with_left(mut self, node: TreeNode<T>) -> Self {
        self.left = Some(Box::new(node));
        self
    }

    /// Sets the right subtree.
    pub fn with_right(mut self, node: TreeNode<T>) -> Self {
        self.right = Some(Box::new(node));
        self
    }
}

/// Height of a subtree by post-order traversal; an empty subtree has height 0.
pub fn subtree_height<T>(node: Option<&TreeNode<T>>) -> usize {
    match node {
        None => 0,
        Some(n) => {
            let l = subtree_height(n.left.as_deref());
            let r = subtree_height(n.right.as_deref());
            1 + l.max(r)
        }
    }
}

/// Returns true when the deepest leaf under the left child and the deepest
/// leaf under the right child of `root` differ in depth by at most one.
///
/// The root is taken by reference, so a missing root cannot be passed.
pub fn equal_paths<T>(root: &TreeNode<T>) -> bool {
    let l = subtree_height(root.left.as_deref());
    let r = subtree_height(root.right.as_deref());
    l.abs_diff(r) <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_node() {
        assert!(equal_paths(&TreeNode::leaf(1)));
    }

    #[test]
    fn test_left_child_only() {
        let root = TreeNode::leaf(1).with_left(TreeNode::leaf(2));
        assert_eq!(subtree_height(root.left.as_deref()), 1);
        assert_eq!(subtree_height(root.right.as_deref()), 0);
        assert!(equal_paths(&root));
    }

    #[test]
    fn test_left_chain_of_two() {
        let root = TreeNode::leaf(1).with_left(TreeNode::leaf(2).with_left(TreeNode::leaf(3)));
        assert!(!equal_paths(&root));
    }

    #[test]
    fn test_only_top_level_heights_are_compared() {
        // The left subtree is itself lopsided, but both sides reach depth 3.
        let left = TreeNode::leaf(2).with_right(TreeNode::leaf(4).with_left(TreeNode::leaf(5)));
        let right = TreeNode::leaf(3).with_left(TreeNode::leaf(6).with_right(TreeNode::leaf(7)));
        let root = TreeNode::leaf(1).with_left(left).with_right(right);
        assert_eq!(subtree_height(Some(&root)), 4);
        assert!(equal_paths(&root));
    }

    #[test]
    fn test_deep_right_against_shallow_left() {
        let right = TreeNode::leaf(3).with_right(TreeNode::leaf(4).with_right(TreeNode::leaf(5)));
        let root = TreeNode::leaf(1).with_left(TreeNode::leaf(2)).with_right(right);
        assert!(!equal_paths(&root));
    }
}
