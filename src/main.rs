use anyhow::Result;
use clap::{Parser, Subcommand};
use gitx::areas::repository::Repository;
use gitx::artifacts::core::{PagerWriter, should_page};
use gitx::commands::plumbing::cat_file::CatFileMode;
use gitx::commands::porcelain::log::LogOptions;
use minus::Pager;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "GITX_LOG";

/// Long options that may also be spelled with a single dash, e.g. `-message`
const SINGLE_DASH_LONG_OPTIONS: [&str; 2] = ["message", "branch"];

/// Options whose value is the next argument
const VALUE_OPTIONS: [&str; 5] = ["-m", "--message", "--branch", "-d", "--delete"];

#[derive(Parser)]
#[command(
    name = "gitx",
    version = "0.1.0",
    about = "A small content-addressable version control engine",
    long_about = "gitx snapshots file trees into content-addressed objects, \
    links them into a commit graph through named branches, \
    and combines divergent histories with a three-way merge.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates a .gitx directory in the current directory or at the specified path. \
        Running it again on an existing repository is harmless."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "config",
        about = "Get or set a configuration key",
        long_about = "This command prints the value of a section.name key, or stores a new value when one is given."
    )]
    Config {
        #[arg(index = 1, help = "The key, e.g. user.name")]
        key: String,
        #[arg(index = 2, help = "The value to store")]
        value: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stores the content of the given files as blobs and stages them. \
        Directories are expanded recursively."
    )]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the last commit's files overlaid with the staged files \
        as a new commit and advances the current branch."
    )]
    Commit {
        #[arg(short, long, allow_hyphen_values = true, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show the working tree status",
        long_about = "This command lists staged changes, unstaged changes and untracked files."
    )]
    Status,
    #[command(
        name = "log",
        about = "Show commit history",
        long_about = "This command walks first parents from HEAD, newest first."
    )]
    Log {
        #[arg(long, help = "Print one line per commit")]
        oneline: bool,
    },
    #[command(
        name = "branch",
        about = "List, create or delete branches",
        long_about = "Without arguments this command lists branches and marks the current one. \
        With a name it creates a branch at HEAD or at the given start point."
    )]
    Branch {
        #[arg(short, long, value_name = "BRANCH", help = "Delete a branch")]
        delete: Option<String>,
        #[arg(index = 1, conflicts_with = "delete", help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(index = 2, requires = "name", help = "Revision the new branch starts at")]
        start_point: Option<String>,
    },
    #[command(
        name = "checkout",
        about = "Switch branches or detach HEAD",
        long_about = "This command points HEAD at a branch, or at a commit id in detached mode. \
        Working tree files are not touched."
    )]
    Checkout {
        #[arg(short = 'b', help = "Create the branch before switching to it")]
        create: bool,
        #[arg(index = 1, help = "Branch name or commit id")]
        target: String,
    },
    #[command(
        name = "merge",
        about = "Merge another branch into the current one",
        long_about = "This command finds the merge base, merges each file three ways \
        and records a merge commit. Conflicted files are committed with conflict markers."
    )]
    Merge {
        #[arg(long = "branch", value_name = "BRANCH", help = "The branch to merge")]
        branch: Option<String>,
        #[arg(index = 1, conflicts_with = "branch", required_unless_present = "branch")]
        target: Option<String>,
        #[arg(short, long, allow_hyphen_values = true, help = "The merge commit message")]
        message: Option<String>,
    },
    #[command(
        name = "reflog",
        about = "Show where HEAD has been",
        long_about = "This command prints every recorded move of HEAD, newest first."
    )]
    Reflog,
    #[command(
        name = "stash",
        about = "Save the working tree without touching it",
        long_about = "This command stores every working tree file and records them as a commit under refs/stash. \
        HEAD, the staging area and the files themselves stay as they are."
    )]
    Stash,
    #[command(
        name = "cat-file",
        about = "Print the content or kind of an object",
        long_about = "This command prints an object in the repository. \
        It requires the id of the object to be specified."
    )]
    CatFile {
        #[arg(short = 'p', conflicts_with = "kind", help = "Pretty-print the object")]
        pretty: bool,
        #[arg(short = 't', help = "Print the object kind")]
        kind: bool,
        #[arg(index = 1, help = "The object id")]
        object: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as a blob and optionally write it to the object database",
        long_about = "This command prints the blob id of a file and can write the blob to the object database."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "write-tree",
        about = "Store the tree of the next commit",
        long_about = "This command stores the last commit's files overlaid with the staged files as a tree and prints its id."
    )]
    WriteTree,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args()));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let pwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { path } => {
            let path = path.unwrap_or_else(|| pwd.clone());
            Repository::new(&path, Box::new(std::io::stdout()))?.init()?
        }
        Commands::Config { key, value } => open(&pwd)?.config_command(&key, value.as_deref())?,
        Commands::Add { paths } => open(&pwd)?.add(&paths)?,
        Commands::Commit { message } => open(&pwd)?.commit(&message)?,
        Commands::Status => open(&pwd)?.status()?,
        Commands::Log { oneline } => {
            paged(&pwd, |repository| repository.log(&LogOptions { oneline }))?
        }
        Commands::Branch {
            delete,
            name,
            start_point,
        } => {
            let repository = open(&pwd)?;
            match (delete, name) {
                (Some(branch), _) => repository.delete_branch(&branch)?,
                (None, Some(name)) => repository.create_branch(&name, start_point.as_deref())?,
                (None, None) => repository.list_branches()?,
            }
        }
        Commands::Checkout { create, target } => open(&pwd)?.checkout(&target, create)?,
        Commands::Merge {
            branch,
            target,
            message,
        } => {
            let branch = branch
                .or(target)
                .ok_or_else(|| anyhow::anyhow!("no branch to merge"))?;
            open(&pwd)?.merge(&branch, message.as_deref())?
        }
        Commands::Reflog => paged(&pwd, Repository::reflog)?,
        Commands::Stash => open(&pwd)?.stash()?,
        Commands::CatFile { kind, object, .. } => {
            let mode = if kind {
                CatFileMode::Type
            } else {
                CatFileMode::Pretty
            };
            open(&pwd)?.cat_file(&object, mode)?
        }
        Commands::HashObject { write, file } => open(&pwd)?.hash_object(&file, write)?,
        Commands::WriteTree => open(&pwd)?.write_tree()?,
    }

    Ok(())
}

fn open(pwd: &Path) -> Result<Repository> {
    Ok(Repository::discover(pwd, Box::new(std::io::stdout()))?)
}

/// Run a command with its output routed through the pager on terminals
fn paged(pwd: &Path, command: impl FnOnce(&Repository) -> Result<()>) -> Result<()> {
    if !should_page() {
        return command(&open(pwd)?);
    }

    let pager = Pager::new();
    let repository = Repository::discover(pwd, Box::new(PagerWriter::new(pager.clone())))?;
    command(&repository)?;
    minus::page_all(pager)?;

    Ok(())
}

/// Rewrite `-message` style options to `--message`
///
/// Option values and everything after `--` are passed through untouched.
fn normalize_args(args: impl Iterator<Item = String>) -> Vec<String> {
    let mut normalized = Vec::new();
    let mut takes_value = false;
    let mut options_ended = false;

    for arg in args {
        if takes_value || options_ended {
            takes_value = false;
            normalized.push(arg);
            continue;
        }

        options_ended = arg == "--";
        let arg = to_long_option(arg);
        takes_value = VALUE_OPTIONS.contains(&arg.as_str());
        normalized.push(arg);
    }

    normalized
}

fn to_long_option(arg: String) -> String {
    let name = arg.strip_prefix('-').unwrap_or_default();
    let option = name.split_once('=').map_or(name, |(option, _)| option);

    if !name.starts_with('-') && SINGLE_DASH_LONG_OPTIONS.contains(&option) {
        format!("-{arg}")
    } else {
        arg
    }
}
