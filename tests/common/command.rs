use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use derive_new::new;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with `1.txt`, `a/2.txt` and `a/b/3.txt` committed on `main`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_gitx_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_gitx_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    gitx_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_gitx_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("gitx").expect("Failed to find gitx binary");
    cmd.env("NO_PAGER", "1");
    cmd.env_remove("GITX_LOG");
    cmd.env_remove("GITX_AUTHOR_NAME");
    cmd.env_remove("GITX_AUTHOR_EMAIL");
    cmd.env_remove("GITX_AUTHOR_DATE");
    cmd.current_dir(dir);
    cmd.args(args);
    cmd
}

#[derive(Debug, Clone, new)]
pub struct RandomAuthor {
    pub name: String,
    pub email: String,
}

pub fn generate_random_author() -> RandomAuthor {
    use fake::Fake;
    use fake::faker::internet::en::FreeEmail;
    use fake::faker::name::en::Name;

    let name = Name().fake::<String>();
    let email = FreeEmail().fake::<String>();
    RandomAuthor::new(name, email)
}

/// Run `gitx` with a fixed author identity and date
pub fn run_gitx_as_author(dir: &Path, args: &[&str], date: &str) -> Command {
    let mut cmd = run_gitx_command(dir, args);
    cmd.envs(vec![
        ("GITX_AUTHOR_NAME", "fake_user"),
        ("GITX_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GITX_AUTHOR_DATE", date), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd
}

pub fn gitx_commit(dir: &Path, message: &str) -> Command {
    run_gitx_as_author(dir, &["commit", "-m", message], AUTHOR_DATE)
}

pub fn gitx_commit_at(dir: &Path, message: &str, date: &str) -> Command {
    run_gitx_as_author(dir, &["commit", "-m", message], date)
}

/// Stage everything and commit it
pub fn commit_all(dir: &Path, message: &str) {
    run_gitx_command(dir, &["add", "."]).assert().success();
    gitx_commit(dir, message).assert().success();
}

pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success();
    String::from_utf8(output.get_output().stdout.clone()).expect("stdout is not UTF-8")
}

/// Tip of a branch, `None` when the branch has no commits
pub fn read_branch(dir: &Path, branch: &str) -> Option<String> {
    let content = std::fs::read_to_string(dir.join(".gitx/refs/heads").join(branch))
        .unwrap_or_else(|e| panic!("Failed to read branch {}: {}", branch, e));
    let content = content.trim();

    (!content.is_empty()).then(|| content.to_string())
}

/// The commit HEAD resolves to
pub fn head_commit_id(dir: &Path) -> Option<String> {
    let head = std::fs::read_to_string(dir.join(".gitx/HEAD")).expect("Failed to read HEAD");

    match head.trim().strip_prefix("ref: refs/heads/") {
        Some(branch) => read_branch(dir, branch),
        None => Some(head.trim().to_string()),
    }
}

/// Pretty-printed object content
pub fn cat_object(dir: &Path, oid: &str) -> String {
    stdout_of(&mut run_gitx_command(dir, &["cat-file", "-p", oid]))
}

/// Value of one header line (`tree`, `parent`) of a commit, in order
pub fn commit_headers(dir: &Path, commit_id: &str, header: &str) -> Vec<String> {
    let prefix = format!("{header} ");

    cat_object(dir, commit_id)
        .lines()
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

pub fn object_file_count(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir.join(".gitx/objects"))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}
