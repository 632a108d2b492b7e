//! Gzip-compressed tarball encoding.

use std::io;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};

use super::PackageAdapter;
use crate::entry::{DirRef, FileRef};
use crate::error::Error;

/// Packs a tree into an in-memory `.tar.gz` byte vector.
///
/// Entry order in the tarball is the tree's traversal order, so equal trees
/// produce byte-identical archives (gzip does not record a timestamp here).
pub struct GzippedTarball {
    builder: Builder<GzEncoder<Vec<u8>>>,
}

impl GzippedTarball {
    /// Opens an empty tarball with the default compression level.
    pub fn new() -> GzippedTarball {
        GzippedTarball::with_compression(Compression::default())
    }

    pub fn with_compression(level: Compression) -> GzippedTarball {
        let encoder = GzEncoder::new(Vec::new(), level);
        GzippedTarball {
            builder: Builder::new(encoder),
        }
    }
}

impl Default for GzippedTarball {
    fn default() -> GzippedTarball {
        GzippedTarball::new()
    }
}

impl PackageAdapter for GzippedTarball {
    type Output = Vec<u8>;

    fn add_directory(&mut self, dir: &DirRef<'_>) -> Result<(), Error> {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::dir());
        header.set_mode(dir.mode() & 0o7777);
        header.set_size(0);
        self.builder.append_data(&mut header, dir.path(), io::empty())?;
        Ok(())
    }

    fn add_file(&mut self, file: &FileRef<'_>) -> Result<(), Error> {
        let bytes = file.read()?;
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::file());
        header.set_mode(file.mode() & 0o7777);
        header.set_size(bytes.len() as u64);
        self.builder.append_data(&mut header, file.path(), bytes.as_slice())?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        // into_inner writes the tar trailer before handing back the encoder
        let encoder = self.builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}
