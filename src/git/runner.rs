use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::blame::{self, Blame};
use crate::error::{Error, ParseError, Result};
use crate::navigator::BlameSource;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Process-wide cancellation flag, set from the signal handler or the Ctrl-C key.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs `git blame --porcelain` and hands the buffered output to the parser.
pub struct BlameRunner {
    git_binary: String,
    repo_root: PathBuf,
    cancel: CancelToken,
}

struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl BlameRunner {
    pub fn new(git_binary: impl Into<String>, repo_root: impl Into<PathBuf>, cancel: CancelToken) -> Self {
        Self {
            git_binary: git_binary.into(),
            repo_root: repo_root.into(),
            cancel,
        }
    }

    /// Fails at startup when the configured git executable cannot be run.
    pub fn ensure_available(&self) -> Result<()> {
        let mut cmd = Command::new(&self.git_binary);
        cmd.arg("--version");
        match self.capture(cmd) {
            Ok(out) if out.status.success() => Ok(()),
            Ok(_) | Err(Error::Invocation(_)) => Err(Error::Startup(format!(
                "unable to run '{}'; is git installed?",
                self.git_binary
            ))),
            Err(e) => Err(e),
        }
    }

    /// Blames `path` (relative to the repository root) at `revision`, or the working tree.
    pub fn run_blame(&self, revision: Option<&str>, path: &str) -> Result<Blame> {
        let mut cmd = Command::new(&self.git_binary);
        cmd.arg("-C")
            .arg(&self.repo_root)
            .args(["blame", "--porcelain"]);
        if let Some(rev) = revision {
            cmd.arg(rev);
        }
        cmd.arg("--").arg(path);
        debug!(?cmd, "running git blame");

        let out = self.capture(cmd)?;
        if !out.status.success() {
            let message = String::from_utf8_lossy(&out.stderr).trim().to_string();
            warn!(status = %out.status, %message, "git blame failed");
            return Err(Error::Invocation(message));
        }

        let blame = blame::parse(out.stdout.as_slice())?;
        debug!(
            lines = blame.len(),
            commits = blame.chunks().len(),
            "parsed blame"
        );
        Ok(blame)
    }

    fn capture(&self, mut cmd: Command) -> Result<Captured> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            Error::Invocation(format!("failed to run {}: {}", self.git_binary, e))
        })?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = loop {
            if self.cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                let _ = stdout.join();
                let _ = stderr.join();
                return Err(Error::Cancelled);
            }
            match child.try_wait()? {
                Some(status) => break status,
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        Ok(Captured {
            status,
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
        })
    }
}

impl BlameSource for BlameRunner {
    fn load(&mut self, revision: Option<&str>, path: &str) -> Result<Blame> {
        self.run_blame(revision, path)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| Error::Invocation("output reader thread panicked".to_string()))?
        .map_err(|e| Error::Parse(ParseError::Read(e)))
}
