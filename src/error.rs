use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("{0}")]
    Startup(String),
    #[error("git blame command failed: {0}")]
    Invocation(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    NavigationRejected(Rejection),
    #[error("Cannot construct link for remote {0}")]
    UnsupportedRemote(String),
    #[error("Pattern not found: {0}")]
    NotFound(String),
    #[error("Cannot produce a remote link for the selected line because it's not committed")]
    NotCommitted,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Cancelled")]
    Cancelled,
}

impl Error {
    /// Recoverable errors are shown in the status bar and never end the session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Startup(_) | Error::Config(_) | Error::Cancelled
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected format of line {0:?} in git blame output")]
    UnexpectedLine(String),
    #[error("invalid {field} value {value:?} in git blame output")]
    InvalidNumber { field: &'static str, value: String },
    #[error("malformed previous entry {0:?} in git blame output")]
    MalformedPrevious(String),
    #[error("line {0} has no attribution in git blame output")]
    MissingLine(usize),
    #[error("failed to read git blame output: {0}")]
    Read(std::io::Error),
}

/// Why a history step was refused. These are guided no-ops, not faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    RootCommit { short_id: String },
    AlreadyLatest,
    NoSelection,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::RootCommit { short_id } => write!(
                f,
                "Can't go back because {} is the commit that added this file.",
                short_id
            ),
            Rejection::AlreadyLatest => write!(f, "You are on the latest revision of this file."),
            Rejection::NoSelection => write!(f, "The file has no lines to blame."),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
