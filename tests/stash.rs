mod common;

use assert_fs::TempDir;
use common::command::{
    AUTHOR_DATE, cat_object, commit_headers, head_commit_id, init_repository_dir,
    run_gitx_as_author, stdout_of,
};
use common::file::{FileSpec, read_file, write_file};
use predicates::prelude::*;
use rstest::rstest;
use std::path::Path;

fn stash(dir: &Path) -> assert_cmd::Command {
    run_gitx_as_author(dir, &["stash"], AUTHOR_DATE)
}

fn read_stash(dir: &Path) -> Option<String> {
    std::fs::read_to_string(dir.join(".gitx/refs/stash"))
        .ok()
        .map(|content| content.trim().to_string())
}

#[rstest]
fn stash_records_the_working_tree(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let head = head_commit_id(dir).ok_or("no HEAD commit")?;

    write_file(FileSpec::new(dir.join("1.txt"), "edited".to_string()));
    write_file(FileSpec::new(dir.join("new.txt"), "untracked".to_string()));

    stash(dir).assert().success().stdout(predicate::str::is_match(
        r"^Saved working directory state [0-9a-f]{7}\n$",
    )?);

    let stash_id = read_stash(dir).ok_or("no stash ref")?;
    assert_eq!(commit_headers(dir, &stash_id, "parent"), vec![head.clone()]);

    let commit = cat_object(dir, &stash_id);
    assert!(
        commit.ends_with(&format!("\n\nWIP on main: {} Initial commit\n", &head[..7])),
        "{commit}"
    );

    let tree = commit_headers(dir, &stash_id, "tree").remove(0);
    let listing = cat_object(dir, &tree);
    assert!(listing.contains("\tnew.txt\n"), "{listing}");
    assert!(listing.contains("\ta/b/3.txt\n"), "{listing}");

    // everything else stays put
    assert_eq!(head_commit_id(dir), Some(head));
    assert_eq!(read_file(&dir.join("1.txt")), "edited");
    assert_eq!(read_file(&dir.join("new.txt")), "untracked");
    assert!(!dir.join(".gitx/refs/heads/stash").exists());

    Ok(())
}

#[rstest]
fn stashed_blob_holds_the_edit(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("1.txt"), "edited".to_string()));
    stash(dir).assert().success();

    let stash_id = read_stash(dir).ok_or("no stash ref")?;
    let tree = commit_headers(dir, &stash_id, "tree").remove(0);
    let blob = cat_object(dir, &tree)
        .lines()
        .find_map(|line| line.strip_suffix("\t1.txt"))
        .and_then(|header| header.split(' ').nth(2))
        .ok_or("1.txt missing from stash tree")?
        .to_string();

    assert_eq!(cat_object(dir, &blob), "edited");

    Ok(())
}

#[rstest]
fn clean_working_tree_has_nothing_to_save(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    stash(dir)
        .assert()
        .success()
        .stdout("No local changes to save\n");
    assert_eq!(read_stash(dir), None);

    Ok(())
}

#[rstest]
fn newer_stash_replaces_the_ref(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();

    write_file(FileSpec::new(dir.join("1.txt"), "first".to_string()));
    stash(dir).assert().success();
    let first = read_stash(dir).ok_or("no stash ref")?;

    write_file(FileSpec::new(dir.join("1.txt"), "second".to_string()));
    let output = stdout_of(&mut stash(dir));
    let second = read_stash(dir).ok_or("no stash ref")?;

    assert_ne!(first, second);
    assert!(output.contains(&second[..7]));

    Ok(())
}
