use std::path::{Component, Path, PathBuf};

use git2::Repository as Git2Repository;
use tracing::debug;

use super::remote::RemoteInfo;
use crate::error::{Error, Result};

pub struct Repository {
    repo: Git2Repository,
    path: PathBuf,
}

impl Repository {
    /// Finds the repository containing `start`, walking up parent directories.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let repo = Git2Repository::discover(start.as_ref())?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::Startup("bare repositories have no files to blame".to_string()))?;
        let path = workdir.canonicalize()?;
        debug!(path = %path.display(), "discovered repository");
        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `file` relative to the working tree root, `/`-separated as git expects.
    pub fn relative_path(&self, file: &Path) -> Result<String> {
        let file = file.canonicalize()?;
        let relative = file.strip_prefix(&self.path).map_err(|_| {
            Error::Startup(format!(
                "{} is outside the repository at {}",
                file.display(),
                self.path.display()
            ))
        })?;

        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();
        Ok(parts.join("/"))
    }

    pub fn remote_url(&self, name: &str) -> Result<String> {
        let remote = self.repo.find_remote(name)?;
        remote
            .url()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::UnsupportedRemote(format!("{} (non UTF-8 url)", name)))
    }

    pub fn remote_info(&self, name: &str) -> Result<RemoteInfo> {
        let url = self.remote_url(name)?;
        RemoteInfo::parse(&url)
    }
}
