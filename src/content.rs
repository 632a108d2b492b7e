//! Deferred file content.
//!
//! A [`Content`] is a producer, not a buffer: the closure behind it runs
//! every time the file is read, so packing a tree is what triggers any I/O
//! the producer performs. Nothing is cached between reads.

use std::fmt;
use std::io;
use std::sync::Arc;

/// A re-invocable producer of a file's bytes.
///
/// Cloning a `Content` is cheap and shares the underlying producer. The
/// producer itself is immutable; replacing a file's content means inserting
/// a new `Content` through the builder, never mutating an existing one.
#[derive(Clone)]
pub struct Content(Arc<dyn Fn() -> io::Result<Vec<u8>> + Send + Sync>);

impl Content {
    /// A producer that yields an empty byte sequence. This is what a file
    /// created without explicit content carries.
    pub fn empty() -> Content {
        Content(Arc::new(|| Ok(Vec::new())))
    }

    /// Wraps an arbitrary closure. The closure runs on every read, which
    /// makes it the right place for deferred I/O such as reading a source
    /// file at pack time.
    pub fn from_fn<F>(producer: F) -> Content
    where
        F: Fn() -> io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        Content(Arc::new(producer))
    }

    pub(crate) fn produce(&self) -> io::Result<Vec<u8>> {
        (self.0)()
    }
}

impl Default for Content {
    fn default() -> Content {
        Content::empty()
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Content(..)")
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Content {
        Content::from_fn(move || Ok(bytes.clone()))
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Content {
        Content::from(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Content {
    fn from(bytes: &[u8; N]) -> Content {
        Content::from(bytes.to_vec())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Content {
        Content::from(text.into_bytes())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Content {
        Content::from(text.as_bytes().to_vec())
    }
}
