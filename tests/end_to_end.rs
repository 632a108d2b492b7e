//! End-to-end round trips through the gzipped tarball encoder, plus direct
//! checks of the adapter dispatch contract.

use std::io::{Cursor, Read};

use flate2::read::GzDecoder;
use plumage::package::GzippedTarball;
use plumage::{DirRef, Error, FileRef, PackageAdapter, Tree, DEFAULT_DIR_MODE};

/// A decoded tarball entry: path, directory flag, mode bits, content.
type TarEntry = (String, bool, u32, String);

fn read_tarball(bytes: &[u8]) -> Result<Vec<TarEntry>, Box<dyn std::error::Error>> {
    let decoder = GzDecoder::new(Cursor::new(bytes));
    let mut archive = tar::Archive::new(decoder);
    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_string_lossy().into_owned();
        let is_dir = entry.header().entry_type().is_dir();
        let mode = entry.header().mode()?;
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        entries.push((path, is_dir, mode, content));
    }
    Ok(entries)
}

fn cookbook_tree() -> Result<Tree, Error> {
    Tree::with_base("redis", DEFAULT_DIR_MODE, |redis| {
        redis.dir_with("cookbooks", |cookbooks| {
            cookbooks.dir_with("redis", |redis| {
                redis.file("README", "README contents")?;
                redis.file("CHANGELOG", "CHANGELOG contents")?;
                redis.file("metadata.rb", "metadata.rb contents")?;
                redis.dir_with("recipes", |recipes| {
                    recipes.file("default.rb", "default.rb contents")?;
                    Ok(())
                })?;
                redis.dir_with("templates", |templates| {
                    templates.dir("default")?;
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })
}

#[test]
fn test_tarball_round_trip_with_base_directory() -> Result<(), Box<dyn std::error::Error>> {
    let tree = cookbook_tree()?;
    let bytes = tree.pack(GzippedTarball::new())?;
    let entries = read_tarball(&bytes)?;

    let paths: Vec<&str> = entries.iter().map(|(path, ..)| path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "redis",
            "redis/cookbooks",
            "redis/cookbooks/redis",
            "redis/cookbooks/redis/README",
            "redis/cookbooks/redis/CHANGELOG",
            "redis/cookbooks/redis/metadata.rb",
            "redis/cookbooks/redis/recipes",
            "redis/cookbooks/redis/recipes/default.rb",
            "redis/cookbooks/redis/templates",
            "redis/cookbooks/redis/templates/default",
        ]
    );

    let contents: Vec<&str> = entries
        .iter()
        .filter(|(_, is_dir, ..)| !is_dir)
        .map(|(.., content)| content.as_str())
        .collect();
    assert_eq!(
        contents,
        [
            "README contents",
            "CHANGELOG contents",
            "metadata.rb contents",
            "default.rb contents",
        ]
    );

    for (path, is_dir, mode, _) in &entries {
        let expected = if *is_dir { 0o755 } else { 0o644 };
        assert_eq!(*mode, expected, "unexpected mode for {path}");
    }
    Ok(())
}

#[test]
fn test_tarball_round_trip_without_base_directory() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = Tree::new();
    tree.dir_with("cookbooks/redis", |redis| {
        redis.file("README", "README contents")?;
        redis.dir_with("recipes", |recipes| {
            recipes.file("default.rb", "default.rb contents")?;
            Ok(())
        })?;
        Ok(())
    })?;

    let bytes = tree.pack(GzippedTarball::new())?;
    let entries = read_tarball(&bytes)?;

    let paths: Vec<&str> = entries.iter().map(|(path, ..)| path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "cookbooks",
            "cookbooks/redis",
            "cookbooks/redis/README",
            "cookbooks/redis/recipes",
            "cookbooks/redis/recipes/default.rb",
        ]
    );
    Ok(())
}

#[test]
fn test_packing_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let tree = cookbook_tree()?;
    let first = tree.pack(GzippedTarball::new())?;
    let second = tree.pack(GzippedTarball::new())?;
    assert_eq!(first, second);
    Ok(())
}

/// Records the adapter calls it receives, in order.
#[derive(Default)]
struct Recording {
    events: Vec<String>,
}

impl PackageAdapter for Recording {
    type Output = Vec<String>;

    fn add_directory(&mut self, dir: &DirRef<'_>) -> Result<(), Error> {
        self.events.push(format!("dir {}", dir.path()));
        Ok(())
    }

    fn add_file(&mut self, file: &FileRef<'_>) -> Result<(), Error> {
        let content = String::from_utf8(file.read()?).expect("non-utf8 test content");
        self.events.push(format!("file {} [{content}]", file.path()));
        Ok(())
    }

    fn finish(self) -> Result<Vec<String>, Error> {
        Ok(self.events)
    }
}

#[test]
fn test_adapter_receives_entries_in_traversal_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = Tree::new();
    tree.file("pkg/README", "hi")?;
    tree.dir("pkg/src")?;

    let events = tree.pack(Recording::default())?;
    assert_eq!(events, ["dir pkg", "file pkg/README [hi]", "dir pkg/src"]);
    Ok(())
}

/// Fails every file registration.
struct FailingAdapter;

impl PackageAdapter for FailingAdapter {
    type Output = ();

    fn add_directory(&mut self, _dir: &DirRef<'_>) -> Result<(), Error> {
        Ok(())
    }

    fn add_file(&mut self, _file: &FileRef<'_>) -> Result<(), Error> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "encoder broke").into())
    }

    fn finish(self) -> Result<(), Error> {
        Ok(())
    }
}

#[test]
fn test_adapter_failure_aborts_the_pack() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = Tree::new();
    tree.file("pkg/README", "hi")?;

    assert!(matches!(tree.pack(FailingAdapter), Err(Error::Io(_))));
    Ok(())
}

#[test]
fn test_content_producer_failure_aborts_the_pack() -> Result<(), Box<dyn std::error::Error>> {
    use plumage::Content;

    let mut tree = Tree::new();
    tree.file("pkg/ok", "fine")?;
    tree.file(
        "pkg/broken",
        Content::from_fn(|| Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))),
    )?;

    let err = tree.pack(GzippedTarball::new()).unwrap_err();
    match err {
        Error::Content { path, .. } => assert_eq!(path, "pkg/broken"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
