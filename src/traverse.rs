//! Depth-first enumeration of a tree.
//!
//! The ordering contract is fixed and archive encoders rely on it: within
//! one directory, every file child is yielded first (in insertion order),
//! then each subdirectory is yielded immediately followed by its own full
//! traversal, before the next sibling subdirectory. Two passes over an
//! unmutated tree yield identical sequences.

use crate::entry::Entry;
use crate::tree::{NodeId, Tree};

/// Iterator over the descendants of a directory, in the fixed depth-first,
/// files-before-subdirectories order. Obtained from
/// [`Tree::traverse`](crate::Tree::traverse) or
/// [`DirRef::traverse`](crate::DirRef::traverse); the starting directory is
/// not part of the sequence.
pub struct Traverse<'a> {
    tree: &'a Tree,
    stack: Vec<std::vec::IntoIter<NodeId>>,
}

impl<'a> Traverse<'a> {
    pub(crate) fn new(tree: &'a Tree, start: NodeId) -> Traverse<'a> {
        Traverse {
            tree,
            stack: vec![ordered_children(tree, start).into_iter()],
        }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Entry<'a>> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame.next() {
                Some(id) => {
                    if self.tree.node(id).is_dir() {
                        self.stack.push(ordered_children(self.tree, id).into_iter());
                    }
                    return Some(Entry::new(self.tree, id));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = Entry<'a>;
    type IntoIter = Traverse<'a>;

    fn into_iter(self) -> Traverse<'a> {
        self.traverse()
    }
}

/// One directory's children in yield order: files first, then
/// subdirectories, each group in insertion order.
fn ordered_children(tree: &Tree, dir: NodeId) -> Vec<NodeId> {
    let children = tree.children(dir);
    let mut ordered: Vec<NodeId> = Vec::with_capacity(children.len());
    ordered.extend(children.values().copied().filter(|&id| !tree.node(id).is_dir()));
    ordered.extend(children.values().copied().filter(|&id| tree.node(id).is_dir()));
    ordered
}
