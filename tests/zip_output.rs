//! End-to-end round trips through the zip encoder.

use std::io::{Cursor, Read};

use plumage::package::Zip;
use plumage::{Error, Tree, DEFAULT_DIR_MODE};

/// A decoded zip entry: name, directory flag, permission bits, content.
type ZipEntry = (String, bool, Option<u32>, String);

fn read_zip(bytes: Vec<u8>) -> Result<Vec<ZipEntry>, Box<dyn std::error::Error>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let is_dir = entry.is_dir();
        let mode = entry.unix_mode().map(|mode| mode & 0o777);
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        entries.push((name, is_dir, mode, content));
    }
    Ok(entries)
}

fn cookbook_tree() -> Result<Tree, Error> {
    Tree::with_base("redis", DEFAULT_DIR_MODE, |redis| {
        redis.dir_with("cookbooks/redis", |redis| {
            redis.file("README", "README contents")?;
            redis.file("CHANGELOG", "CHANGELOG contents")?;
            redis.dir_with("recipes", |recipes| {
                recipes.file("default.rb", "default.rb contents")?;
                Ok(())
            })?;
            Ok(())
        })?;
        Ok(())
    })
}

#[test]
fn test_zip_round_trip_with_base_directory() -> Result<(), Box<dyn std::error::Error>> {
    let tree = cookbook_tree()?;
    let bytes = tree.pack(Zip::new())?;
    let entries = read_zip(bytes)?;

    let names: Vec<&str> = entries.iter().map(|(name, ..)| name.as_str()).collect();
    assert_eq!(
        names,
        [
            "redis/",
            "redis/cookbooks/",
            "redis/cookbooks/redis/",
            "redis/cookbooks/redis/README",
            "redis/cookbooks/redis/CHANGELOG",
            "redis/cookbooks/redis/recipes/",
            "redis/cookbooks/redis/recipes/default.rb",
        ]
    );

    let contents: Vec<&str> = entries
        .iter()
        .filter(|(_, is_dir, ..)| !is_dir)
        .map(|(.., content)| content.as_str())
        .collect();
    assert_eq!(
        contents,
        ["README contents", "CHANGELOG contents", "default.rb contents"]
    );
    Ok(())
}

#[test]
fn test_zip_round_trip_without_base_directory() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = Tree::new();
    tree.file("cookbooks/redis/README", "README contents")?;
    tree.dir("cookbooks/redis/templates/default")?;

    let bytes = tree.pack(Zip::new())?;
    let entries = read_zip(bytes)?;

    let names: Vec<&str> = entries.iter().map(|(name, ..)| name.as_str()).collect();
    assert_eq!(
        names,
        [
            "cookbooks/",
            "cookbooks/redis/",
            "cookbooks/redis/README",
            "cookbooks/redis/templates/",
            "cookbooks/redis/templates/default/",
        ]
    );
    Ok(())
}

#[test]
fn test_zip_carries_permission_bits() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = Tree::new();
    tree.file_mode("pkg/bin/run", 0o100755, "#!/bin/sh\n")?;
    tree.dir_mode("pkg/private", 0o40700)?;

    let bytes = tree.pack(Zip::new())?;
    let entries = read_zip(bytes)?;

    for (name, _, mode, _) in &entries {
        let expected = match name.as_str() {
            "pkg/bin/run" => 0o755,
            "pkg/private/" => 0o700,
            _ => 0o755,
        };
        assert_eq!(*mode, Some(expected), "unexpected mode for {name}");
    }
    Ok(())
}

#[test]
fn test_merged_trees_pack_like_hand_built_ones() -> Result<(), Box<dyn std::error::Error>> {
    let mut left = Tree::new();
    left.file("app/config.toml", "left = true\n")?;
    left.file("app/keep", "kept")?;

    let mut right = Tree::new();
    right.file("app/config.toml", "right = true\n")?;
    right.dir("app/assets")?;

    let merged = left.merge(&right)?;
    let entries = read_zip(merged.pack(Zip::new())?)?;

    let names: Vec<&str> = entries.iter().map(|(name, ..)| name.as_str()).collect();
    assert_eq!(
        names,
        ["app/", "app/config.toml", "app/keep", "app/assets/"]
    );

    let config = entries
        .iter()
        .find(|(name, ..)| name == "app/config.toml")
        .map(|(.., content)| content.as_str());
    assert_eq!(config, Some("right = true\n"));
    Ok(())
}
