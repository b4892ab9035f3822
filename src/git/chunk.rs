use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Commit id git reports for lines that are not committed yet.
pub const NOT_COMMITTED_ID: &str = "0000000000000000000000000000000000000000";

const SHORT_ID_LEN: usize = 7;
const ID_LEN: usize = 40;

/// Attribution record shared by every line a single commit last touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub commit_id: String,
    /// `None` when this commit introduced the lines (the root for them).
    pub previous: Option<PreviousRevision>,
    pub filename: String,
    pub author: String,
    pub author_mail: String,
    pub author_time: i64,
    pub summary: String,
}

/// The revision and path a line had right before this chunk's commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousRevision {
    pub commit_id: String,
    pub filename: String,
}

impl PreviousRevision {
    /// Parses the value of a `previous` entry: a 40-char id, a space, then the path.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::MalformedPrevious(value.to_string());
        let commit_id = value.get(..ID_LEN).ok_or_else(malformed)?;
        if value.as_bytes().get(ID_LEN) != Some(&b' ') {
            return Err(malformed());
        }
        let filename = &value[ID_LEN + 1..];
        if filename.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            commit_id: commit_id.to_string(),
            filename: unquote_path(filename).into_owned(),
        })
    }
}

/// Undoes git's C-style quoting of paths (`core.quotePath`): `"caf\303\251.txt"`
/// becomes `café.txt`. Unquoted paths come back borrowed.
pub fn unquote_path(path: &str) -> Cow<'_, str> {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return Cow::Borrowed(path);
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        rest = tail;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let Some((&esc, tail)) = rest.split_first() else {
            bytes.push(b'\\');
            break;
        };
        rest = tail;
        match esc {
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'n' => bytes.push(b'\n'),
            b'r' => bytes.push(b'\r'),
            b't' => bytes.push(b'\t'),
            b'v' => bytes.push(0x0b),
            b'0'..=b'3' => {
                let digits = rest
                    .iter()
                    .take(2)
                    .take_while(|d| (b'0'..=b'7').contains(d))
                    .count();
                if digits == 2 {
                    let value = (esc - b'0') * 64 + (rest[0] - b'0') * 8 + (rest[1] - b'0');
                    bytes.push(value);
                    rest = &rest[2..];
                } else {
                    bytes.push(esc);
                }
            }
            other => bytes.push(other),
        }
    }
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

impl Chunk {
    pub fn new(commit_id: &str) -> Self {
        Self {
            commit_id: commit_id.to_string(),
            ..Self::default()
        }
    }

    pub fn is_committed(&self) -> bool {
        self.commit_id != NOT_COMMITTED_ID
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.commit_id)
    }

    /// Author date in UTC, e.g. `2021/03/04 17:09 UTC`.
    pub fn date(&self) -> String {
        chrono::DateTime::from_timestamp(self.author_time, 0)
            .map(|dt| dt.format("%Y/%m/%d %H:%M UTC").to_string())
            .unwrap_or_default()
    }

    /// Compact age relative to `now` (seconds since epoch): `< 1h`, `5h`, `3d`, `2m`, `1y`.
    pub fn relative_age(&self, now: i64) -> String {
        let diff = now - self.author_time;

        if diff < 3600 {
            "< 1h".to_string()
        } else if diff < 3600 * 24 {
            format!("{}h", diff / 3600)
        } else if diff < 3600 * 24 * 30 {
            format!("{}d", diff / 3600 / 24)
        } else if diff < 3600 * 24 * 30 * 12 {
            format!("{}m", diff / 3600 / 24 / 30)
        } else {
            format!("{}y", diff / 3600 / 24 / 30 / 12)
        }
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    fn chunk_at(author_time: i64) -> Chunk {
        Chunk {
            author_time,
            ..Chunk::new("0123456789abcdef0123456789abcdef01234567")
        }
    }

    #[test]
    fn test_relative_age_buckets() {
        let now = 1_700_000_000;
        assert_eq!(chunk_at(now - 59).relative_age(now), "< 1h");
        assert_eq!(chunk_at(now - 5 * HOUR).relative_age(now), "5h");
        assert_eq!(chunk_at(now - 3 * DAY).relative_age(now), "3d");
        assert_eq!(chunk_at(now - 65 * DAY).relative_age(now), "2m");
        assert_eq!(chunk_at(now - 400 * DAY).relative_age(now), "1y");
    }

    #[test]
    fn test_date_is_utc() {
        assert_eq!(chunk_at(0).date(), "1970/01/01 00:00 UTC");
        assert_eq!(chunk_at(1_614_877_740).date(), "2021/03/04 17:09 UTC");
    }

    #[test]
    fn test_short_id_and_committed() {
        let chunk = chunk_at(0);
        assert_eq!(chunk.short_id(), "0123456");
        assert!(chunk.is_committed());
        assert!(!Chunk::new(NOT_COMMITTED_ID).is_committed());
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_previous_splits_at_fixed_offset() {
        let value = "89abcdef0123456789abcdef0123456789abcdef src/old name.rs";
        let previous = PreviousRevision::parse(value).unwrap();
        assert_eq!(previous.commit_id, "89abcdef0123456789abcdef0123456789abcdef");
        assert_eq!(previous.filename, "src/old name.rs");
    }

    #[test]
    fn test_previous_rejects_short_values() {
        assert!(matches!(
            PreviousRevision::parse("89abcdef"),
            Err(ParseError::MalformedPrevious(_))
        ));
        assert!(matches!(
            PreviousRevision::parse("89abcdef0123456789abcdef0123456789abcdef"),
            Err(ParseError::MalformedPrevious(_))
        ));
    }

    #[test]
    fn test_unquote_path() {
        assert_eq!(unquote_path("src/main.rs"), "src/main.rs");
        assert_eq!(unquote_path("\"caf\\303\\251.txt\""), "caf\u{e9}.txt");
        assert_eq!(unquote_path("\"a\\\"b\\\\c\\td\""), "a\"b\\c\td");
        assert_eq!(unquote_path("\"\""), "");
    }

    #[test]
    fn test_previous_with_quoted_path() {
        let value = "89abcdef0123456789abcdef0123456789abcdef \"dir/na\\303\\257ve.rs\"";
        let previous = PreviousRevision::parse(value).unwrap();
        assert_eq!(previous.filename, "dir/na\u{ef}ve.rs");
    }
}
