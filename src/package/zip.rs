//! Zip encoding.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use super::PackageAdapter;
use crate::entry::{DirRef, FileRef};
use crate::error::Error;

/// Packs a tree into an in-memory zip archive.
///
/// Directory entries get the conventional trailing slash; unix permission
/// bits are carried over from each node's mode.
pub struct Zip {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl Zip {
    /// Opens an empty zip archive.
    pub fn new() -> Zip {
        Zip {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }
}

impl Default for Zip {
    fn default() -> Zip {
        Zip::new()
    }
}

impl PackageAdapter for Zip {
    type Output = Vec<u8>;

    fn add_directory(&mut self, dir: &DirRef<'_>) -> Result<(), Error> {
        let options = FileOptions::default().unix_permissions(dir.mode() & 0o7777);
        self.writer.add_directory(dir.path(), options)?;
        Ok(())
    }

    fn add_file(&mut self, file: &FileRef<'_>) -> Result<(), Error> {
        let options = FileOptions::default().unix_permissions(file.mode() & 0o7777);
        self.writer.start_file(file.path(), options)?;
        self.writer.write_all(&file.read()?)?;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, Error> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}
