use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use pushguard::branch::BranchNameValidator;
use pushguard::git::GitRepository;
use pushguard::message::MessageValidator;
use pushguard::mood::{CommandOracle, MoodOracle, VerbList};
use pushguard::report::Reporter;
use pushguard::{Config, PushChecker, RefUpdate, Verdict};

/// Gate pushes on branch naming, commit message style and lint.
///
/// Without a subcommand this runs as a pre-receive hook: ref updates are read
/// from stdin, the report goes to stderr, and the exit status accepts (0) or
/// rejects (1) the push.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to <git-dir>/pushguard.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Repository path (defaults to the repository git runs the hook in)
    #[arg(long, global = true, value_name = "PATH")]
    repo: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check one commit message file (usable as a commit-msg hook)
    Message {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Check one branch name
    Branch { name: String },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let verdict = match &args.command {
        None => run_hook(&args)?,
        Some(Commands::Message { file }) => run_message(&args, file)?,
        Some(Commands::Branch { name }) => run_branch(&args, name)?,
    };

    Ok(ExitCode::from(verdict.exit_code()))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PUSHGUARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// pre-receive: check every ref update git hands us on stdin
fn run_hook(args: &Args) -> Result<Verdict> {
    let repo = match &args.repo {
        Some(path) => GitRepository::open(path),
        None => GitRepository::open_from_env(),
    }
    .context("Failed to open git repository")?;

    let config = Config::load(args.config.as_deref(), Some(repo.git_dir()))?;
    let updates = RefUpdate::read_all(io::stdin().lock())?;
    tracing::debug!(updates = updates.len(), "read push input");

    let oracle = build_oracle(&config);
    let checker = PushChecker::new(&config, &repo, oracle.as_ref());
    let mut reporter = Reporter::new(io::stderr(), config.report_title.clone());

    checker
        .run(&updates, &mut reporter)
        .context("Failed to write report")
}

fn run_message(args: &Args, file: &Path) -> Result<Verdict> {
    let config = load_standalone_config(args)?;
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let oracle = build_oracle(&config);
    let validator = MessageValidator::new(&config.policy.message, oracle.as_ref());
    let label = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let mut reporter = Reporter::new(io::stderr(), config.report_title.clone());
    reporter.begin()?;
    reporter.progress(format_args!("Checking message in {}...", file.display()));
    let verdict = Verdict::from(validator.check(&label, &text));
    reporter.finish(&verdict)?;
    Ok(verdict)
}

fn run_branch(args: &Args, name: &str) -> Result<Verdict> {
    let config = load_standalone_config(args)?;
    let validator = BranchNameValidator::new(&config.policy.branch);

    let mut reporter = Reporter::new(io::stderr(), config.report_title.clone());
    reporter.begin()?;
    reporter.progress(format_args!("Checking branch name {name}..."));
    let verdict = Verdict::from(validator.check(name));
    reporter.finish(&verdict)?;
    Ok(verdict)
}

/// Configuration for the subcommands, which do not need an open repository.
fn load_standalone_config(args: &Args) -> Result<Config> {
    let git_dir = match &args.repo {
        Some(path) => Some(GitRepository::open(path)?.git_dir().to_path_buf()),
        None => std::env::var_os("GIT_DIR").map(PathBuf::from),
    };
    Config::load(args.config.as_deref(), git_dir.as_deref())
}

fn build_oracle(config: &Config) -> Box<dyn MoodOracle> {
    match &config.imperative_words {
        Some(words) => Box::new(VerbList::new(words)),
        None => Box::new(CommandOracle::new(config.mood_command.clone())),
    }
}
