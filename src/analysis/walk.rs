//! Pre-order traversal helpers over tree-sitter nodes.

use tree_sitter::{Node, TreeCursor};

/// Pre-order walk of the subtree under `root`.
///
/// When a `stop` node is given, the walk yields it and ends there. The walk
/// never leaves the subtree it was started on.
pub struct SubtreeWalk<'tree> {
    cursor: TreeCursor<'tree>,
    stop: Option<Node<'tree>>,
    done: bool,
}

impl<'tree> SubtreeWalk<'tree> {
    pub fn new(root: Node<'tree>, stop: Option<Node<'tree>>) -> Self {
        Self {
            cursor: root.walk(),
            stop,
            done: false,
        }
    }

    fn advance(&mut self) {
        if self.cursor.goto_first_child() {
            return;
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return;
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return;
            }
        }
    }
}

impl<'tree> Iterator for SubtreeWalk<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if self.stop == Some(node) {
            self.done = true;
        } else {
            self.advance();
        }
        Some(node)
    }
}

/// Strict ancestors of `node`, nearest first.
pub fn ancestors(node: Node<'_>) -> impl Iterator<Item = Node<'_>> {
    std::iter::successors(node.parent(), |n| n.parent())
}
