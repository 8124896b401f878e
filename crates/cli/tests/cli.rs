//! End-to-end tests for the mdport binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn mdport() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("mdport"))
}

#[test]
fn code_mode_rewrites_documents_in_place() {
    let dir = TempDir::new().unwrap();
    let post = dir.path().join("post.md");
    fs::write(&post, "<pre class=\"lang: rust\">let x = 1;</pre>").unwrap();

    mdport()
        .args(["convert", dir.path().to_str().unwrap(), "code"])
        .assert()
        .success();

    let content = fs::read_to_string(&post).unwrap();
    assert!(content.contains("```rust {linenos=table}"));
    assert!(!content.contains("<pre"));
}

#[test]
fn code_mode_honors_title_level_flag() {
    let dir = TempDir::new().unwrap();
    let post = dir.path().join("post.md");
    fs::write(&post, "<pre title=\"Snippet\">x</pre>").unwrap();

    mdport()
        .args([
            "convert",
            dir.path().to_str().unwrap(),
            "code",
            "--title-level",
            "2",
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&post).unwrap();
    assert!(content.starts_with("## Snippet\n"));
}

#[test]
fn code_mode_walks_subdirectories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("2019/05")).unwrap();
    let nested = dir.path().join("2019/05/post.md");
    fs::write(&nested, "<pre>deep</pre>").unwrap();

    mdport()
        .args(["convert", dir.path().to_str().unwrap(), "code"])
        .assert()
        .success();

    assert!(fs::read_to_string(&nested).unwrap().contains("```base"));
}

#[test]
fn img_mode_rewrites_and_copies_assets() {
    let source = TempDir::new().unwrap();
    fs::write(source.path().join("banner.jpg"), b"jpg-bytes").unwrap();

    let dir = TempDir::new().unwrap();
    let post = dir.path().join("post.md");
    fs::write(
        &post,
        "<div class=\"wp-caption x\"><img src=\"http://old.site/banner.jpg\"/>\
         <p class=\"wp-caption-text\">Cap</p></div>",
    )
    .unwrap();

    mdport()
        .args([
            "convert",
            dir.path().to_str().unwrap(),
            "img",
            "http://old.site",
            source.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    let content = fs::read_to_string(&post).unwrap();
    assert_eq!(
        content,
        "{{<figure src=\"banner.jpg\" title=\"Cap\" alt=\"Cap\" >}}"
    );
    assert_eq!(fs::read(dir.path().join("banner.jpg")).unwrap(), b"jpg-bytes");
}

#[test]
fn img_mode_rejects_missing_source_root() {
    let dir = TempDir::new().unwrap();

    mdport()
        .args([
            "convert",
            dir.path().to_str().unwrap(),
            "img",
            "http://old.site",
            "/definitely/not/a/dir",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source root is not a directory"));
}

#[test]
fn img_mode_aborts_on_missing_asset() {
    let source = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("post.md"),
        "before [<img src=\"http://old.site/nope.jpg\"/>][1] after",
    )
    .unwrap();

    mdport()
        .args([
            "convert",
            dir.path().to_str().unwrap(),
            "img",
            "http://old.site",
            source.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Asset not found"));
}

#[test]
fn missing_target_directory_fails() {
    mdport()
        .args(["convert", "/definitely/not/a/dir", "code"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("target directory does not exist"));
}

#[test]
fn restructure_moves_documents_into_bundles() {
    let dir = TempDir::new().unwrap();
    let post = dir.path().join("my-first-post.md");
    fs::write(&post, "# Hi\n").unwrap();

    mdport()
        .args(["restructure", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let moved = dir.path().join("my-first-post/index.md");
    assert!(!post.exists());
    assert_eq!(fs::read_to_string(moved).unwrap(), "# Hi\n");
}
