//! # Archive Packing
//!
//! This module turns a [`Tree`] into a concrete archive. The core side of
//! the contract is small: a full depth-first traversal, dispatched entry by
//! entry to a [`PackageAdapter`]. The adapter side owns everything about the
//! container byte layout; two adapters ship with the crate, one per
//! container format.
//!
//! - [`tarball::GzippedTarball`]: a gzip-compressed tar stream.
//! - [`zip::Zip`]: a zip archive.

use tracing::trace;

use crate::entry::{DirRef, Entry, FileRef};
use crate::error::Error;
use crate::tree::Tree;

pub mod tarball;
pub mod zip;

pub use self::tarball::GzippedTarball;
pub use self::zip::Zip;

/// An archive encoder fed by [`pack`].
///
/// Implementations receive entries in the tree's fixed traversal order:
/// depth-first, files before subdirectories at each level, every directory
/// immediately followed by its own contents. A parent directory is always
/// announced before anything inside it.
pub trait PackageAdapter {
    /// The finished archive representation, typically its bytes.
    type Output;

    /// Registers a directory. Directories carry a path and a mode, no
    /// payload.
    fn add_directory(&mut self, dir: &DirRef<'_>) -> Result<(), Error>;

    /// Registers a file. Implementations call [`FileRef::read`] exactly once
    /// per invocation, which runs the file's content producer.
    fn add_file(&mut self, file: &FileRef<'_>) -> Result<(), Error>;

    /// Finalizes the container and yields it.
    fn finish(self) -> Result<Self::Output, Error>;
}

/// Drives a full traversal of `tree` through `adapter` and returns whatever
/// the adapter produced.
///
/// The first failing entry aborts the pack; there is no partial-success
/// result. Producer failures and adapter failures propagate unchanged.
pub fn pack<A: PackageAdapter>(tree: &Tree, mut adapter: A) -> Result<A::Output, Error> {
    for entry in tree.traverse() {
        match entry {
            Entry::File(file) => {
                trace!(path = %file.path(), "adding file");
                adapter.add_file(&file)?;
            }
            Entry::Directory(dir) => {
                trace!(path = %dir.path(), "adding directory");
                adapter.add_directory(&dir)?;
            }
        }
    }
    adapter.finish()
}

impl Tree {
    /// Packs this tree through the given adapter. Equivalent to
    /// [`pack(self, adapter)`](pack).
    pub fn pack<A: PackageAdapter>(&self, adapter: A) -> Result<A::Output, Error> {
        pack(self, adapter)
    }
}
