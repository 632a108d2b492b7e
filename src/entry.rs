//! Borrowed views of tree nodes.
//!
//! Traversal never exposes arena internals; it yields [`Entry`] values, a
//! closed sum of [`FileRef`] and [`DirRef`]. The views are `Copy` handles
//! tied to the tree's lifetime and carry everything an archive encoder
//! needs: name, mode, rendered path, parent, and (for files) `read`.

use crate::error::Error;
use crate::traverse::Traverse;
use crate::tree::{NodeId, NodeKind, Tree};

/// One node of a [`Tree`]: either a file or a directory.
#[derive(Clone, Copy)]
pub enum Entry<'a> {
    File(FileRef<'a>),
    Directory(DirRef<'a>),
}

impl<'a> Entry<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId) -> Entry<'a> {
        if tree.node(id).is_dir() {
            Entry::Directory(DirRef { tree, id })
        } else {
            Entry::File(FileRef { tree, id })
        }
    }

    /// The entry's own name, without any path prefix.
    pub fn name(&self) -> &'a str {
        match self {
            Entry::File(file) => file.name(),
            Entry::Directory(dir) => dir.name(),
        }
    }

    /// The entry's permission mode.
    pub fn mode(&self) -> u32 {
        match self {
            Entry::File(file) => file.mode(),
            Entry::Directory(dir) => dir.mode(),
        }
    }

    /// The entry's slash-joined path from the tree root.
    pub fn path(&self) -> String {
        match self {
            Entry::File(file) => file.path(),
            Entry::Directory(dir) => dir.path(),
        }
    }

    /// The directory that owns this entry, or `None` for the tree root.
    pub fn parent(&self) -> Option<DirRef<'a>> {
        match self {
            Entry::File(file) => file.parent(),
            Entry::Directory(dir) => dir.parent(),
        }
    }

    pub fn as_file(&self) -> Option<FileRef<'a>> {
        match self {
            Entry::File(file) => Some(*file),
            Entry::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<DirRef<'a>> {
        match self {
            Entry::Directory(dir) => Some(*dir),
            Entry::File(_) => None,
        }
    }
}

/// A borrowed view of a file node.
#[derive(Clone, Copy)]
pub struct FileRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> FileRef<'a> {
    pub fn name(&self) -> &'a str {
        &self.tree.node(self.id).name
    }

    pub fn mode(&self) -> u32 {
        self.tree.node(self.id).mode
    }

    pub fn path(&self) -> String {
        self.tree.path_of(self.id)
    }

    pub fn parent(&self) -> Option<DirRef<'a>> {
        self.tree.node(self.id).parent.map(|id| DirRef { tree: self.tree, id })
    }

    /// Invokes the file's content producer and returns the bytes it yields.
    ///
    /// The producer runs on every call; two reads may return different bytes
    /// if the producer consults external state. A producer failure surfaces
    /// as [`Error::Content`].
    pub fn read(&self) -> Result<Vec<u8>, Error> {
        match &self.tree.node(self.id).kind {
            NodeKind::File { content } => content.produce().map_err(|source| Error::Content {
                path: self.path(),
                source,
            }),
            NodeKind::Directory { .. } => unreachable!("FileRef over a directory node"),
        }
    }
}

/// A borrowed view of a directory node.
#[derive(Clone, Copy)]
pub struct DirRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> DirRef<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId) -> DirRef<'a> {
        DirRef { tree, id }
    }

    pub fn name(&self) -> &'a str {
        &self.tree.node(self.id).name
    }

    pub fn mode(&self) -> u32 {
        self.tree.node(self.id).mode
    }

    pub fn path(&self) -> String {
        self.tree.path_of(self.id)
    }

    pub fn parent(&self) -> Option<DirRef<'a>> {
        self.tree.node(self.id).parent.map(|id| DirRef { tree: self.tree, id })
    }

    /// The directory's direct children, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'a>> + '_ {
        let tree = self.tree;
        self.tree.children(self.id).values().map(move |&id| Entry::new(tree, id))
    }

    /// The file children, in insertion order.
    pub fn files(&self) -> impl Iterator<Item = FileRef<'a>> + '_ {
        self.entries().filter_map(|entry| entry.as_file())
    }

    /// The directory children, in insertion order.
    pub fn directories(&self) -> impl Iterator<Item = DirRef<'a>> + '_ {
        self.entries().filter_map(|entry| entry.as_directory())
    }

    /// Looks up a direct child by name.
    pub fn get(&self, name: &str) -> Option<Entry<'a>> {
        let tree = self.tree;
        self.tree.children(self.id).get(name).map(|&id| Entry::new(tree, id))
    }

    /// Depth-first, files-first traversal of this directory's descendants.
    /// The directory itself is not yielded.
    pub fn traverse(&self) -> Traverse<'a> {
        Traverse::new(self.tree, self.id)
    }
}
