mod app;
mod cli;
mod config;
mod error;
mod git;
mod logger;
mod navigator;
mod output;
mod search;
mod views;

use std::io::Write;

use clap::Parser;
use tracing::{error, info};

use app::App;
use cli::Args;
use config::{Config, GIT_ENV};
use error::{Error, Result};
use git::{BlameRunner, CancelToken, Repository};
use navigator::Navigator;

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        error!(error = %e, "fatal");
        let message = match &e {
            Error::Git(git_err) if git_err.code() == git2::ErrorCode::NotFound => {
                "Not a git repository.".to_string()
            }
            _ => e.to_string(),
        };
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?
        .with_git_override(std::env::var(GIT_ENV).ok(), args.git.clone());

    if let Err(e) = logger::init(&config.log_file) {
        eprintln!("warning: logging disabled: {}", e);
    }
    info!(version = env!("CARGO_PKG_VERSION"), file = %args.file.display(), "starting");

    let file = args
        .file
        .canonicalize()
        .map_err(|e| Error::Startup(format!("{}: {}", args.file.display(), e)))?;
    if !file.is_file() {
        return Err(Error::Startup(format!("{} is not a regular file", args.file.display())));
    }

    let dir = file
        .parent()
        .ok_or_else(|| Error::Startup(format!("{} has no parent directory", file.display())))?;
    let repo = Repository::discover(dir)?;
    let path = repo.relative_path(&file)?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| Error::Startup(format!("failed to install signal handler: {}", e)))?;

    let mut runner = BlameRunner::new(config.git_binary.clone(), repo.path(), cancel.clone());
    runner.ensure_available()?;
    let navigator = Navigator::open(&mut runner, args.rev.as_deref(), &path)?;

    if !args.is_interactive() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if args.json {
            output::print_json(&mut out, navigator.blame(), &path, args.rev.as_deref())?;
        } else {
            let now = chrono::Utc::now().timestamp();
            output::print_plain(&mut out, navigator.blame(), config.summary_width, now)?;
        }
        out.flush()?;
        return Ok(());
    }

    let remote_name = config.default_remote.clone();
    let remote_lookup: app::RemoteLookup = Box::new(move || repo.remote_info(&remote_name));
    let mut app = App::new(navigator, Box::new(runner), remote_lookup, config, cancel);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}
