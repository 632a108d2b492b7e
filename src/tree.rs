//! # Virtual Directory Tree
//!
//! This module implements the in-memory tree that the rest of the crate
//! flattens into archives. All nodes live in an arena owned by [`Tree`];
//! parent links are arena indices, so duplicating a subtree during a union
//! re-binds every parent by construction and no two trees ever share a node.
//!
//! Trees are built through slash-delimited paths: every segment but the last
//! reuses an existing child directory or creates one, and the last segment
//! creates the requested entry, replacing a same-named entry of the same
//! kind. The walk never resets a directory that already has contents.

use hashlink::LinkedHashMap;

use crate::content::Content;
use crate::entry::DirRef;
use crate::error::Error;
use crate::traverse::Traverse;

/// Mode given to directories created without an explicit mode, including
/// every intermediate directory materialized during a path walk.
pub const DEFAULT_DIR_MODE: u32 = 0o40755;

/// Mode given to files created without an explicit mode.
pub const DEFAULT_FILE_MODE: u32 = 0o100644;

/// Index of a node within its owning [`Tree`]'s arena. Ids are only
/// meaningful to the tree that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) mode: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

#[derive(Debug)]
pub(crate) enum NodeKind {
    File {
        content: Content,
    },
    Directory {
        /// Child name to node id, in insertion order. Replacing a name keeps
        /// its position and strands the displaced child's subtree in the
        /// arena, unreachable until the tree is dropped.
        children: LinkedHashMap<String, NodeId>,
    },
}

impl Node {
    fn directory(name: &str, mode: u32, parent: Option<NodeId>) -> Node {
        Node {
            name: name.to_string(),
            mode,
            parent,
            kind: NodeKind::Directory {
                children: LinkedHashMap::new(),
            },
        }
    }

    fn file(name: &str, mode: u32, content: Content, parent: Option<NodeId>) -> Node {
        Node {
            name: name.to_string(),
            mode,
            parent,
            kind: NodeKind::File { content },
        }
    }

    pub(crate) fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }
}

/// An in-memory tree of files and directories, rooted at a single directory.
///
/// The root is usually the current-directory stand-in `"."` (see
/// [`Tree::new`]); it is never yielded by traversal and a `"."` root
/// contributes no prefix to descendant paths.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Creates an empty tree rooted at `"."`. Entries added to it render
    /// bare relative paths such as `a/b`.
    pub fn new() -> Tree {
        Tree::rooted(".", DEFAULT_DIR_MODE)
    }

    /// Creates an empty tree whose root directory carries an arbitrary name
    /// and mode. The root itself is not part of the traversal, but a name
    /// other than `"."` prefixes every descendant path.
    pub fn rooted(name: &str, mode: u32) -> Tree {
        let root = Node::directory(name, mode, None);
        Tree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Creates a tree whose entire contents live inside a single top-level
    /// directory `base`, and hands a cursor over that directory to `build`.
    ///
    /// This is the shape archive consumers usually want: extracting the
    /// result produces one directory rather than loose files.
    pub fn with_base<F>(base: &str, mode: u32, build: F) -> Result<Tree, Error>
    where
        F: FnOnce(&mut DirMut<'_>) -> Result<(), Error>,
    {
        let mut tree = Tree::new();
        tree.dir_mode_with(base, mode, build)?;
        Ok(tree)
    }

    /// A borrowed view of the root directory.
    pub fn root(&self) -> DirRef<'_> {
        DirRef::new(self, self.root)
    }

    /// A builder cursor over the root directory.
    pub fn root_mut(&mut self) -> DirMut<'_> {
        let root = self.root;
        DirMut { tree: self, id: root }
    }

    /// Creates (or replaces) the directory named by `path`, materializing
    /// intermediate directories as needed, and returns a cursor over it.
    /// See [`DirMut::dir`].
    pub fn dir(&mut self, path: &str) -> Result<DirMut<'_>, Error> {
        self.dir_mode(path, DEFAULT_DIR_MODE)
    }

    /// Like [`Tree::dir`], with an explicit mode for the innermost directory.
    pub fn dir_mode(&mut self, path: &str, mode: u32) -> Result<DirMut<'_>, Error> {
        let root = self.root;
        let id = self.make_dir(root, path, mode)?;
        Ok(DirMut { tree: self, id })
    }

    /// Like [`Tree::dir`], and additionally runs `build` against the
    /// innermost directory so nested entries can be added in one expression.
    pub fn dir_with<F>(&mut self, path: &str, build: F) -> Result<NodeId, Error>
    where
        F: FnOnce(&mut DirMut<'_>) -> Result<(), Error>,
    {
        self.dir_mode_with(path, DEFAULT_DIR_MODE, build)
    }

    /// Like [`Tree::dir_with`], with an explicit mode.
    pub fn dir_mode_with<F>(&mut self, path: &str, mode: u32, build: F) -> Result<NodeId, Error>
    where
        F: FnOnce(&mut DirMut<'_>) -> Result<(), Error>,
    {
        let mut dir = self.dir_mode(path, mode)?;
        build(&mut dir)?;
        Ok(dir.id)
    }

    /// Creates (or replaces) the file named by `path` with the default mode.
    /// See [`DirMut::file`].
    pub fn file(&mut self, path: &str, content: impl Into<Content>) -> Result<NodeId, Error> {
        self.file_mode(path, DEFAULT_FILE_MODE, content)
    }

    /// Like [`Tree::file`], with an explicit mode.
    pub fn file_mode(
        &mut self,
        path: &str,
        mode: u32,
        content: impl Into<Content>,
    ) -> Result<NodeId, Error> {
        let root = self.root;
        self.make_file(root, path, mode, content.into())
    }

    /// Computes the union of this tree with `other` as a new tree, leaving
    /// both inputs untouched.
    ///
    /// The result starts as a deep copy of `self`. Files owned by `other`
    /// then replace same-named files at the same position (`other` wins),
    /// while same-named directories are merged recursively rather than
    /// replaced. A file on one side colliding with a directory on the other
    /// is a [`Error::MergeConflict`].
    ///
    /// The output shares no nodes with either input: mutating `self` or
    /// `other` afterwards cannot be observed through the result, and vice
    /// versa. The result's root keeps this tree's root name and mode.
    pub fn merge(&self, other: &Tree) -> Result<Tree, Error> {
        let root = self.node(self.root);
        let mut out = Tree::rooted(&root.name, root.mode);
        let out_root = out.root;
        for &child in self.children(self.root).values() {
            Tree::copy_subtree(self, child, &mut out, out_root);
        }
        Tree::graft(other, other.root, &mut out, out_root)?;
        Ok(out)
    }

    /// Iterates over every entry below the root, depth-first, files before
    /// subdirectories at each level. The root itself is not yielded.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse::new(self, self.root)
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Children of a directory node. Callers guarantee `id` is a directory;
    /// builder walks never hand out file ids as parents.
    pub(crate) fn children(&self, id: NodeId) -> &LinkedHashMap<String, NodeId> {
        match &self.nodes[id.0].kind {
            NodeKind::Directory { children } => children,
            NodeKind::File { .. } => unreachable!("node {id:?} is not a directory"),
        }
    }

    fn children_mut(&mut self, id: NodeId) -> &mut LinkedHashMap<String, NodeId> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Directory { children } => children,
            NodeKind::File { .. } => unreachable!("node {id:?} is not a directory"),
        }
    }

    /// Renders the slash-joined path of a node. A root named `"."` renders
    /// as `"."` on its own and is skipped when prefixing descendants.
    pub(crate) fn path_of(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.parent {
            None => node.name.clone(),
            Some(parent) => {
                let prefix = self.path_of(parent);
                if prefix == "." {
                    node.name.clone()
                } else {
                    format!("{prefix}/{}", node.name)
                }
            }
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Resolves one intermediate segment: reuse an existing child directory,
    /// or create an empty one with the default mode. Existing contents are
    /// always kept.
    fn ensure_dir(&mut self, parent: NodeId, name: &str, full_path: &str) -> Result<NodeId, Error> {
        match self.children(parent).get(name).copied() {
            Some(existing) if self.node(existing).is_dir() => Ok(existing),
            Some(_) => Err(Error::invalid_path(
                full_path,
                format!("{name:?} is a file, not a directory"),
            )),
            None => {
                let id = self.alloc(Node::directory(name, DEFAULT_DIR_MODE, Some(parent)));
                self.children_mut(parent).replace(name.to_string(), id);
                Ok(id)
            }
        }
    }

    fn resolve_parent(&mut self, at: NodeId, segments: &[&str], full_path: &str) -> Result<NodeId, Error> {
        let mut current = at;
        for segment in segments {
            current = self.ensure_dir(current, segment, full_path)?;
        }
        Ok(current)
    }

    fn make_dir(&mut self, at: NodeId, path: &str, mode: u32) -> Result<NodeId, Error> {
        let segments = split_path(path)?;
        let (last, walk) = match segments.split_last() {
            Some(parts) => parts,
            None => return Err(Error::invalid_path(path, "empty path")),
        };
        let parent = self.resolve_parent(at, walk, path)?;
        if let Some(existing) = self.children(parent).get(*last).copied() {
            if !self.node(existing).is_dir() {
                return Err(Error::invalid_path(
                    path,
                    format!("{last:?} already exists as a file"),
                ));
            }
        }
        let id = self.alloc(Node::directory(last, mode, Some(parent)));
        self.children_mut(parent).replace(last.to_string(), id);
        Ok(id)
    }

    fn make_file(
        &mut self,
        at: NodeId,
        path: &str,
        mode: u32,
        content: Content,
    ) -> Result<NodeId, Error> {
        let segments = split_path(path)?;
        let (last, walk) = match segments.split_last() {
            Some(parts) => parts,
            None => return Err(Error::invalid_path(path, "empty path")),
        };
        let parent = self.resolve_parent(at, walk, path)?;
        if let Some(existing) = self.children(parent).get(*last).copied() {
            if self.node(existing).is_dir() {
                return Err(Error::invalid_path(
                    path,
                    format!("{last:?} already exists as a directory"),
                ));
            }
        }
        let id = self.alloc(Node::file(last, mode, content, Some(parent)));
        self.children_mut(parent).replace(last.to_string(), id);
        Ok(id)
    }

    /// Copies the node `src` (and, for directories, its whole subtree) out
    /// of `src_tree` into `out` as a child of `dst_parent`.
    fn copy_subtree(src_tree: &Tree, src: NodeId, out: &mut Tree, dst_parent: NodeId) {
        let node = src_tree.node(src);
        match &node.kind {
            NodeKind::File { content } => {
                let id = out.alloc(Node::file(&node.name, node.mode, content.clone(), Some(dst_parent)));
                out.children_mut(dst_parent).replace(node.name.clone(), id);
            }
            NodeKind::Directory { children } => {
                let id = out.alloc(Node::directory(&node.name, node.mode, Some(dst_parent)));
                out.children_mut(dst_parent).replace(node.name.clone(), id);
                for &child in children.values() {
                    Tree::copy_subtree(src_tree, child, out, id);
                }
            }
        }
    }

    /// Merges the children of `src` (a directory in `src_tree`) into the
    /// directory `dst` of `out`: files replace, directories recurse.
    fn graft(src_tree: &Tree, src: NodeId, out: &mut Tree, dst: NodeId) -> Result<(), Error> {
        for (name, &child) in src_tree.children(src) {
            if src_tree.node(child).is_dir() {
                continue;
            }
            match out.children(dst).get(name).copied() {
                Some(existing) if out.node(existing).is_dir() => {
                    return Err(Error::MergeConflict {
                        path: out.path_of(existing),
                    });
                }
                _ => Tree::copy_subtree(src_tree, child, out, dst),
            }
        }
        for (name, &child) in src_tree.children(src) {
            if !src_tree.node(child).is_dir() {
                continue;
            }
            match out.children(dst).get(name).copied() {
                None => Tree::copy_subtree(src_tree, child, out, dst),
                Some(existing) if out.node(existing).is_dir() => {
                    Tree::graft(src_tree, child, out, existing)?;
                }
                Some(existing) => {
                    return Err(Error::MergeConflict {
                        path: out.path_of(existing),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Tree {
        Tree::new()
    }
}

/// A mutable cursor over one directory of a [`Tree`], exposing the same
/// path-based builder operations as the tree root. Paths are resolved
/// relative to the cursor's directory.
pub struct DirMut<'t> {
    tree: &'t mut Tree,
    id: NodeId,
}

impl<'t> DirMut<'t> {
    /// The id of the directory this cursor points at.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The directory's name.
    pub fn name(&self) -> &str {
        &self.tree.node(self.id).name
    }

    /// The directory's rendered path.
    pub fn path(&self) -> String {
        self.tree.path_of(self.id)
    }

    /// A borrowed view of this directory.
    pub fn as_ref(&self) -> DirRef<'_> {
        DirRef::new(self.tree, self.id)
    }

    /// Creates (or replaces) the directory named by `path` below this one.
    ///
    /// Every segment but the last reuses an existing subdirectory or creates
    /// an empty one with the default mode; directories revisited this way
    /// keep whatever they already contain. The last segment becomes a fresh
    /// directory with the given mode, replacing a same-named directory and
    /// discarding its contents. A file anywhere along the path is an
    /// [`Error::InvalidPath`].
    pub fn dir(&mut self, path: &str) -> Result<DirMut<'_>, Error> {
        self.dir_mode(path, DEFAULT_DIR_MODE)
    }

    /// Like [`DirMut::dir`], with an explicit mode for the innermost
    /// directory.
    pub fn dir_mode(&mut self, path: &str, mode: u32) -> Result<DirMut<'_>, Error> {
        let id = self.tree.make_dir(self.id, path, mode)?;
        Ok(DirMut { tree: &mut *self.tree, id })
    }

    /// Like [`DirMut::dir`], and additionally runs `build` against the new
    /// innermost directory.
    pub fn dir_with<F>(&mut self, path: &str, build: F) -> Result<NodeId, Error>
    where
        F: FnOnce(&mut DirMut<'_>) -> Result<(), Error>,
    {
        self.dir_mode_with(path, DEFAULT_DIR_MODE, build)
    }

    /// Like [`DirMut::dir_with`], with an explicit mode.
    pub fn dir_mode_with<F>(&mut self, path: &str, mode: u32, build: F) -> Result<NodeId, Error>
    where
        F: FnOnce(&mut DirMut<'_>) -> Result<(), Error>,
    {
        let mut dir = self.dir_mode(path, mode)?;
        build(&mut dir)?;
        Ok(dir.id)
    }

    /// Creates (or replaces) the file named by `path` below this directory.
    ///
    /// Intermediate segments follow the same reuse-or-create walk as
    /// [`DirMut::dir`]. Re-adding a file at the same path replaces it; the
    /// newest file is authoritative. A directory already occupying the final
    /// name is an [`Error::InvalidPath`].
    pub fn file(&mut self, path: &str, content: impl Into<Content>) -> Result<NodeId, Error> {
        self.file_mode(path, DEFAULT_FILE_MODE, content)
    }

    /// Like [`DirMut::file`], with an explicit mode.
    pub fn file_mode(
        &mut self,
        path: &str,
        mode: u32,
        content: impl Into<Content>,
    ) -> Result<NodeId, Error> {
        self.tree.make_file(self.id, path, mode, content.into())
    }
}

/// Splits a builder path into its slash-delimited segments. Every segment
/// must be non-empty, which rejects leading, trailing and doubled
/// separators as well as the empty path.
fn split_path(path: &str) -> Result<Vec<&str>, Error> {
    if path.is_empty() {
        return Err(Error::invalid_path(path, "empty path"));
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::invalid_path(path, "empty segment"));
    }
    Ok(segments)
}
