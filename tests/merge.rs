mod common;

use assert_fs::TempDir;
use common::command::{
    commit_headers, gitx_commit, head_commit_id, init_repository_dir, object_file_count,
    read_branch, run_gitx_as_author, run_gitx_command, AUTHOR_DATE,
};
use common::file::{FileSpec, read_file, write_file};
use predicates::prelude::*;
use rstest::rstest;
use std::path::Path;

fn commit_file(dir: &Path, path: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(path), content.to_string()));
    run_gitx_command(dir, &["add", path]).assert().success();
    gitx_commit(dir, message).assert().success();
}

fn merge(dir: &Path, args: &[&str]) -> assert_cmd::Command {
    let mut full_args = vec!["merge"];
    full_args.extend_from_slice(args);
    run_gitx_as_author(dir, &full_args, AUTHOR_DATE)
}

/// `feature` branches off the initial commit, then both sides get one commit
fn diverge(dir: &Path, main_change: (&str, &str), feature_change: (&str, &str)) {
    run_gitx_command(dir, &["branch", "feature"]).assert().success();
    commit_file(dir, main_change.0, main_change.1, "Work on main");

    run_gitx_command(dir, &["checkout", "feature"]).assert().success();
    commit_file(dir, feature_change.0, feature_change.1, "Work on feature");
    run_gitx_command(dir, &["checkout", "main"]).assert().success();
}

#[rstest]
fn clean_merge_combines_both_sides(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    diverge(dir, ("1.txt", "y\n"), ("g.txt", "from feature\n"));
    let ours = read_branch(dir, "main").ok_or("main has no commit")?;
    let theirs = read_branch(dir, "feature").ok_or("feature has no commit")?;

    merge(dir, &["feature"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^\[main [0-9a-f]{7}\] Merge branch 'feature'\n$",
        )?);

    let merge_commit = head_commit_id(dir).ok_or("no HEAD commit")?;
    assert_eq!(commit_headers(dir, &merge_commit, "parent"), vec![ours, theirs.clone()]);
    assert_eq!(read_branch(dir, "feature"), Some(theirs));

    let tree_id = commit_headers(dir, &merge_commit, "tree").remove(0);
    let tree = common::command::cat_object(dir, &tree_id);
    assert!(tree.contains("\t1.txt\n"));
    assert!(tree.contains("\tg.txt\n"));

    assert_eq!(read_file(&dir.join("1.txt")), "y\n");
    assert_eq!(read_file(&dir.join("g.txt")), "from feature\n");

    run_gitx_command(dir, &["status"])
        .assert()
        .success()
        .stdout("On branch main\nnothing to commit, working tree clean\n");

    Ok(())
}

#[rstest]
fn conflicting_edits_are_committed_with_markers(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    diverge(dir, ("1.txt", "y\n"), ("1.txt", "z\n"));

    merge(dir, &["feature"])
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("CONFLICT (content): Merge conflict in 1.txt\n")
                .and(predicate::str::contains("] Merge branch 'feature'\n"))
                .and(predicate::str::contains("Automatic merge found conflicts")),
        );

    let expected = "<<<<<<< HEAD\ny\n=======\nz\n>>>>>>> feature\n";
    assert_eq!(read_file(&dir.join("1.txt")), expected);

    let merge_commit = head_commit_id(dir).ok_or("no HEAD commit")?;
    assert_eq!(commit_headers(dir, &merge_commit, "parent").len(), 2);

    let tree_id = commit_headers(dir, &merge_commit, "tree").remove(0);
    let conflicted_blob = common::command::cat_object(dir, &tree_id)
        .lines()
        .find(|line| line.ends_with("\t1.txt"))
        .and_then(|line| line.split(['\t', ' ']).nth(2).map(str::to_string))
        .ok_or("1.txt missing from merged tree")?;
    run_gitx_command(dir, &["cat-file", "-p", &conflicted_blob])
        .assert()
        .success()
        .stdout(expected);

    Ok(())
}

#[rstest]
fn branch_flag_and_custom_message(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    diverge(dir, ("1.txt", "y\n"), ("a/2.txt", "deux\n"));

    merge(dir, &["-branch", "feature", "-m", "Bring in feature"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("] Bring in feature\n"));

    assert_eq!(read_file(&dir.join("a/2.txt")), "deux\n");

    Ok(())
}

#[rstest]
fn merging_an_ancestor_is_up_to_date(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_gitx_command(dir, &["branch", "old"]).assert().success();
    commit_file(dir, "1.txt", "y\n", "Work on main");
    let before = head_commit_id(dir);

    merge(dir, &["old"])
        .assert()
        .success()
        .stdout("Already up to date.\n");
    assert_eq!(head_commit_id(dir), before);

    merge(dir, &["main"])
        .assert()
        .success()
        .stdout("Already up to date.\n");

    Ok(())
}

#[rstest]
fn branch_ahead_of_head_still_gets_a_merge_commit(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let base = head_commit_id(dir).ok_or("no HEAD commit")?;

    run_gitx_command(dir, &["checkout", "-b", "feature"]).assert().success();
    commit_file(dir, "g.txt", "g\n", "Feature only");
    let theirs = head_commit_id(dir).ok_or("no HEAD commit")?;
    run_gitx_command(dir, &["checkout", "main"]).assert().success();

    merge(dir, &["feature"]).assert().success();

    let merge_commit = head_commit_id(dir).ok_or("no HEAD commit")?;
    assert_eq!(commit_headers(dir, &merge_commit, "parent"), vec![base, theirs.clone()]);
    assert_eq!(
        commit_headers(dir, &merge_commit, "tree"),
        commit_headers(dir, &theirs, "tree")
    );

    Ok(())
}

#[rstest]
fn unknown_branch_is_an_error(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let before = head_commit_id(dir);

    merge(dir, &["nowhere"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("branch 'nowhere' not found"));
    assert_eq!(head_commit_id(dir), before);

    Ok(())
}

#[rstest]
fn staged_changes_block_the_merge(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    diverge(dir, ("1.txt", "y\n"), ("g.txt", "g\n"));
    let before = head_commit_id(dir);

    write_file(FileSpec::new(dir.join("pending.txt"), "pending".to_string()));
    run_gitx_command(dir, &["add", "pending.txt"]).assert().success();

    merge(dir, &["feature"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("staged changes"));
    assert_eq!(head_commit_id(dir), before);

    Ok(())
}

#[rstest]
fn local_edits_block_the_merge(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    diverge(dir, ("1.txt", "y\n"), ("a/2.txt", "deux\n"));
    let before = head_commit_id(dir);
    let objects_before = object_file_count(dir);

    write_file(FileSpec::new(dir.join("a/2.txt"), "precious local work\n".to_string()));

    merge(dir, &["feature"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "would be overwritten by merge: a/2.txt",
        ));

    assert_eq!(read_file(&dir.join("a/2.txt")), "precious local work\n");
    assert_eq!(head_commit_id(dir), before);
    assert_eq!(object_file_count(dir), objects_before);

    Ok(())
}
