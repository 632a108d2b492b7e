//! # Plumage
//!
//! This crate builds an in-memory tree of file and directory nodes through
//! a path-based builder, then packs that tree into a real archive — a
//! gzipped tarball or a zip — without touching the filesystem until the
//! final write. It is meant for tools that synthesize an archive's layout
//! programmatically, such as scaffolding generators.
//!
//! ## Key Modules
//!
//! - [`tree`]: the virtual directory tree, its path-based builder, and the
//!   union operator for combining two trees.
//! - [`entry`]: borrowed views of tree nodes, as yielded by traversal.
//! - [`traverse`]: the fixed depth-first, files-first enumeration order.
//! - [`content`]: deferred file content, produced at pack time.
//! - [`package`]: the [`PackageAdapter`] contract plus the tar.gz and zip
//!   encoders.
//!
//! ## Example
//!
//! ```
//! use plumage::package::GzippedTarball;
//! use plumage::Tree;
//!
//! let mut tree = Tree::new();
//! tree.file("pkg/README", "# hello\n")?;
//! tree.dir("pkg/src")?;
//!
//! let bytes = tree.pack(GzippedTarball::new())?;
//! assert!(!bytes.is_empty());
//! # Ok::<(), plumage::Error>(())
//! ```
//!
//! An existing directory can be loaded with [`Tree::from_path`]; its files
//! are read from disk when the tree is packed, not when it is loaded.

pub mod content;
pub mod entry;
pub mod error;
pub mod package;
pub mod traverse;
pub mod tree;

mod import;

pub use content::Content;
pub use entry::{DirRef, Entry, FileRef};
pub use error::Error;
pub use package::PackageAdapter;
pub use traverse::Traverse;
pub use tree::{DirMut, NodeId, Tree, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
