use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Cyclic substring search over the lines of the current blame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Search {
    term: Option<String>,
    last_anchor: Option<usize>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Stores `term` and scans from `cursor`. `None` when the trimmed term is empty.
    pub fn search(
        &mut self,
        term: &str,
        direction: Direction,
        lines: &[String],
        cursor: usize,
    ) -> Option<Result<usize>> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        self.term = Some(term.to_string());
        Some(self.scan(direction, lines, cursor))
    }

    /// Repeats the stored search from `cursor`. `None` when nothing was searched yet.
    pub fn repeat(
        &mut self,
        direction: Direction,
        lines: &[String],
        cursor: usize,
    ) -> Option<Result<usize>> {
        self.term.as_ref()?;
        Some(self.scan(direction, lines, cursor))
    }

    fn scan(&mut self, direction: Direction, lines: &[String], cursor: usize) -> Result<usize> {
        let term = self.term.clone().unwrap_or_default();
        match find(lines, &term, cursor, direction) {
            Some(index) => {
                debug!(%term, from = cursor, to = index, "search hit");
                self.last_anchor = Some(index);
                Ok(index)
            }
            None => Err(Error::NotFound(term)),
        }
    }
}

/// Index of the first line after (or before) `anchor` containing `term`, wrapping
/// around the ends. The anchor line itself is never a candidate.
pub fn find(lines: &[String], term: &str, anchor: usize, direction: Direction) -> Option<usize> {
    let len = lines.len();
    if len == 0 {
        return None;
    }
    let anchor = anchor % len;
    (1..len)
        .map(|step| match direction {
            Direction::Forward => (anchor + step) % len,
            Direction::Backward => (anchor + len - step) % len,
        })
        .find(|&i| lines[i].contains(term))
}
