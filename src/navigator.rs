//! History navigation over successive blames of one file.
//!
//! A [`Navigator`] is a plain value: the revision being shown, the selected
//! line, the trail of revisions to come back to, and the current [`Blame`].
//! [`Navigator::descend`] and [`Navigator::ascend`] only commit a new state
//! once the [`BlameSource`] has produced a complete snapshot, so a failed
//! `git blame` never leaves the session half-moved.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Rejection, Result};
use crate::git::{short_id, Blame, Chunk};

/// Anything that can produce a blame for `path` at `revision` (`None` = working tree).
pub trait BlameSource {
    fn load(&mut self, revision: Option<&str>, path: &str) -> Result<Blame>;
}

/// Checkpoint pushed when stepping into an older revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub commit_id: Option<String>,
    pub cursor: usize,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigator {
    current_commit: Option<String>,
    /// Path the current blame was produced for; changes across renames.
    path: String,
    cursor: usize,
    history: Vec<HistoryItem>,
    blame: Blame,
}

impl Navigator {
    pub fn new(current_commit: Option<String>, path: impl Into<String>, blame: Blame) -> Self {
        Self {
            current_commit,
            path: path.into(),
            cursor: 0,
            history: Vec::new(),
            blame,
        }
    }

    /// Initial load of `path` at `revision`.
    pub fn open<S: BlameSource + ?Sized>(
        source: &mut S,
        revision: Option<&str>,
        path: &str,
    ) -> Result<Self> {
        let blame = source.load(revision, path)?;
        info!(path, revision = revision.unwrap_or("working tree"), lines = blame.len(), "opened");
        Ok(Self::new(revision.map(|r| r.to_string()), path, blame))
    }

    pub fn current_commit(&self) -> Option<&str> {
        self.current_commit.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn blame(&self) -> &Blame {
        &self.blame
    }

    pub fn selected_chunk(&self) -> Option<&Chunk> {
        self.blame.chunk_at(self.cursor)
    }

    pub fn can_descend(&self) -> bool {
        self.selected_chunk()
            .map(|c| c.previous.is_some())
            .unwrap_or(false)
    }

    pub fn can_ascend(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn select(&mut self, index: usize) {
        self.cursor = index.min(self.blame.last_index());
    }

    pub fn move_by(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as usize)
        };
        self.select(target);
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(self.blame.last_index());
    }

    /// Re-blames the file at the revision before the selected line's commit.
    pub fn descend<S: BlameSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let chunk = self
            .selected_chunk()
            .ok_or(Error::NavigationRejected(Rejection::NoSelection))?;
        let Some(previous) = chunk.previous.clone() else {
            return Err(Error::NavigationRejected(Rejection::RootCommit {
                short_id: chunk.short_id().to_string(),
            }));
        };
        let filename = chunk.filename.clone();

        let blame = source.load(Some(&previous.commit_id), &previous.filename)?;

        self.history.push(HistoryItem {
            commit_id: self.current_commit.take(),
            cursor: self.cursor,
            filename,
        });
        info!(
            commit = short_id(&previous.commit_id),
            path = %previous.filename,
            depth = self.history.len(),
            "descended"
        );
        self.current_commit = Some(previous.commit_id);
        self.path = previous.filename;
        self.blame = blame;
        self.select(self.cursor);
        Ok(())
    }

    /// Goes back to the revision the last [`Navigator::descend`] came from.
    ///
    /// The checkpoint is consumed even when re-blaming it fails.
    pub fn ascend<S: BlameSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let item = self
            .history
            .pop()
            .ok_or(Error::NavigationRejected(Rejection::AlreadyLatest))?;

        let blame = source.load(item.commit_id.as_deref(), &item.filename)?;

        info!(
            commit = item.commit_id.as_deref().map(short_id).unwrap_or("working tree"),
            path = %item.filename,
            depth = self.history.len(),
            "ascended"
        );
        self.current_commit = item.commit_id;
        self.path = item.filename;
        self.blame = blame;
        self.select(item.cursor);
        Ok(())
    }
}
