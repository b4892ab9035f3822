use crate::error::{Error, Result};

const GITHUB_HOST: &str = "github.com";

/// Host and `owner/repo` path of a remote, enough to build web permalinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub host: String,
    pub repo: String,
}

impl RemoteInfo {
    /// Accepts `user@host:owner/repo[.git]` and `scheme://[user@]host[:port]/owner/repo[.git]`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let address = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let (host, repo) = if let Some((_, rest)) = address.split_once("://") {
            let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
            let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
            let host = host.split_once(':').map_or(host, |(h, _)| h);
            (host, path)
        } else if let Some((user_host, path)) = address.split_once(':') {
            let host = user_host.rsplit_once('@').map_or(user_host, |(_, h)| h);
            (host, path)
        } else {
            return Err(Error::UnsupportedRemote(trimmed.to_string()));
        };

        let host = host.trim_matches('/');
        let repo = repo.trim_matches('/');
        if host.is_empty() || repo.is_empty() {
            return Err(Error::UnsupportedRemote(trimmed.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Permalink to one line of `path` at `commit_id`. `line_number` is 1-based.
    pub fn line_link(&self, commit_id: &str, path: &str, line_number: usize) -> Result<String> {
        self.ensure_supported()?;
        Ok(format!(
            "https://{}/{}/blob/{}/{}#L{}",
            GITHUB_HOST, self.repo, commit_id, path, line_number
        ))
    }

    pub fn commit_link(&self, commit_id: &str) -> Result<String> {
        self.ensure_supported()?;
        Ok(format!(
            "https://{}/{}/commit/{}",
            GITHUB_HOST, self.repo, commit_id
        ))
    }

    fn ensure_supported(&self) -> Result<()> {
        if self.host == GITHUB_HOST {
            Ok(())
        } else {
            Err(Error::UnsupportedRemote(self.host.clone()))
        }
    }
}
