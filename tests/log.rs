mod common;

use assert_fs::TempDir;
use common::command::{
    gitx_commit, gitx_commit_at, head_commit_id, init_repository_dir, read_branch,
    repository_dir, run_gitx_as_author, run_gitx_command, AUTHOR_DATE,
};
use common::file::{FileSpec, write_file};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
fn medium_format_with_decorations(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = head_commit_id(dir).ok_or("no HEAD commit")?;
    run_gitx_command(dir, &["branch", "release"]).assert().success();

    write_file(FileSpec::new(dir.join("1.txt"), "uno".to_string()));
    run_gitx_command(dir, &["add", "1.txt"]).assert().success();
    gitx_commit_at(dir, "Second commit\n\nWith a body line", "2023-01-02 09:30:00 +0000")
        .assert()
        .success();
    let second = head_commit_id(dir).ok_or("no HEAD commit")?;

    let expected = format!(
        "commit {second} (HEAD -> main)
Author: fake_user <fake_email@email.com>
Date:   Mon Jan 2 09:30:00 2023 +0000

    Second commit
{blank}
    With a body line

commit {first} (release)
Author: fake_user <fake_email@email.com>
Date:   Sun Jan 1 12:00:00 2023 +0000

    Initial commit
",
        blank = "    ",
    );

    let output = common::command::stdout_of(&mut run_gitx_command(dir, &["log"]));
    assert_eq!(output, expected);

    Ok(())
}

#[rstest]
fn oneline_format(init_repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = head_commit_id(dir).ok_or("no HEAD commit")?;

    run_gitx_command(dir, &["checkout", "-b", "feature"]).assert().success();
    gitx_commit(dir, "Second commit").assert().success();
    let second = head_commit_id(dir).ok_or("no HEAD commit")?;

    run_gitx_command(dir, &["log", "--oneline"])
        .assert()
        .success()
        .stdout(format!(
            "{} (HEAD -> feature) Second commit\n{} (main) Initial commit\n",
            &second[..7],
            &first[..7]
        ));

    Ok(())
}

#[rstest]
fn merge_commits_list_their_parents(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let base = head_commit_id(dir).ok_or("no HEAD commit")?;

    run_gitx_command(dir, &["checkout", "-b", "feature"]).assert().success();
    write_file(FileSpec::new(dir.join("g.txt"), "g".to_string()));
    run_gitx_command(dir, &["add", "g.txt"]).assert().success();
    gitx_commit(dir, "Feature work").assert().success();
    let theirs = read_branch(dir, "feature").ok_or("feature has no commit")?;

    run_gitx_command(dir, &["checkout", "main"]).assert().success();
    run_gitx_as_author(dir, &["merge", "feature"], AUTHOR_DATE)
        .assert()
        .success();

    let output = common::command::stdout_of(&mut run_gitx_command(dir, &["log"]));
    let lines = output.lines().take(2).collect::<Vec<_>>();
    assert_eq!(lines[1], format!("Merge: {} {}", &base[..7], &theirs[..7]));

    // first parents only: the feature commit is not listed
    assert!(!output.contains(&format!("commit {theirs}")));
    assert!(output.contains(&format!("commit {base}")));

    Ok(())
}

#[rstest]
fn log_of_empty_repository_prints_nothing(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir.path();
    run_gitx_command(dir, &["init"]).assert().success();

    run_gitx_command(dir, &["log"]).assert().success().stdout("");

    Ok(())
}

#[rstest]
fn reflog_records_head_movements(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let first = head_commit_id(dir).ok_or("no HEAD commit")?;

    run_gitx_command(dir, &["checkout", "-b", "feature"]).assert().success();
    gitx_commit(dir, "Feature work").assert().success();
    let second = head_commit_id(dir).ok_or("no HEAD commit")?;
    run_gitx_command(dir, &["checkout", "main"]).assert().success();

    run_gitx_command(dir, &["reflog"])
        .assert()
        .success()
        .stdout(format!(
            "{first_short} HEAD@{{0}}: checkout: moving from feature to main
{second_short} HEAD@{{1}}: commit: Feature work
{first_short} HEAD@{{2}}: checkout: moving from main to feature
{first_short} HEAD@{{3}}: commit (initial): Initial commit
",
            first_short = &first[..7],
            second_short = &second[..7],
        ));

    let raw_log = std::fs::read_to_string(dir.join(".gitx/logs/HEAD"))?;
    let first_line = raw_log.lines().next().ok_or("empty reflog")?;
    assert!(first_line.starts_with(&format!("{} {first} fake_user <fake_email@email.com> ", "0".repeat(40))));
    assert!(first_line.ends_with("\tcommit (initial): Initial commit"));

    Ok(())
}
