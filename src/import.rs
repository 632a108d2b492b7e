//! Loading an existing on-disk directory into a [`Tree`].

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::content::Content;
use crate::error::Error;
use crate::tree::Tree;

impl Tree {
    /// Builds a tree from the directory at `path`.
    ///
    /// The directory's contents are wrapped in a base directory named after
    /// the final path component (`"."` is resolved to the canonical
    /// directory name first), so extracting an archive packed from the
    /// result produces a single directory. Entries are inserted sorted by
    /// file name, host permission bits become node modes, and each file
    /// carries a producer that reads it from disk when the tree is packed —
    /// not now. Symlinks and other special files are skipped.
    ///
    /// The returned tree is ordinary: further `dir`/`file` calls may extend
    /// it before packing.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Tree, Error> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|_| Error::Import {
            path: path.to_path_buf(),
        })?;
        if !meta.is_dir() {
            return Err(Error::Import {
                path: path.to_path_buf(),
            });
        }

        let base = base_name(path)?;
        let mut tree = Tree::new();
        let mut entries = 0usize;
        {
            let mut root = tree.dir_mode(&base, node_mode(&meta))?;
            for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                let relative = match entry.path().strip_prefix(path) {
                    Ok(relative) if !relative.as_os_str().is_empty() => relative,
                    _ => continue,
                };
                let relative = relative
                    .iter()
                    .map(|part| part.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");

                let meta = entry.metadata().map_err(io::Error::from)?;
                if entry.file_type().is_dir() {
                    root.dir_mode(&relative, node_mode(&meta))?;
                } else if entry.file_type().is_file() {
                    let source = entry.path().to_path_buf();
                    root.file_mode(
                        &relative,
                        node_mode(&meta),
                        Content::from_fn(move || fs::read(&source)),
                    )?;
                } else {
                    continue;
                }
                entries += 1;
            }
        }

        debug!(path = %path.display(), entries, "imported directory into tree");
        Ok(tree)
    }
}

/// The name of the base directory wrapping the imported contents: the final
/// path component, falling back to the canonical path for `"."` and
/// friends.
fn base_name(path: &Path) -> Result<String, Error> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = path.canonicalize()?;
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Import {
            path: path.to_path_buf(),
        })
}

#[cfg(unix)]
fn node_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn node_mode(meta: &fs::Metadata) -> u32 {
    if meta.is_dir() {
        crate::tree::DEFAULT_DIR_MODE
    } else {
        crate::tree::DEFAULT_FILE_MODE
    }
}
