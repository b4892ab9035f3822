use std::collections::HashMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use super::chunk::{unquote_path, Chunk, PreviousRevision};
use crate::error::ParseError;

/// One parsed `git blame --porcelain` run: the file's lines and who owns each one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBlame")]
pub struct Blame {
    lines: Vec<String>,
    chunks: Vec<Chunk>,
    /// `owners[i]` indexes into `chunks` for line `i`.
    owners: Vec<usize>,
}

impl Blame {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Distinct chunks, one per commit id, in order of first appearance.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk_at(&self, index: usize) -> Option<&Chunk> {
        self.chunk_index_at(index).and_then(|i| self.chunks.get(i))
    }

    pub fn chunk_index_at(&self, index: usize) -> Option<usize> {
        self.owners.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Chunk)> {
        self.lines
            .iter()
            .zip(self.owners.iter())
            .map(|(line, &owner)| (line.as_str(), &self.chunks[owner]))
    }
}

#[derive(Deserialize)]
struct RawBlame {
    lines: Vec<String>,
    chunks: Vec<Chunk>,
    owners: Vec<usize>,
}

impl TryFrom<RawBlame> for Blame {
    type Error = String;

    fn try_from(raw: RawBlame) -> Result<Self, Self::Error> {
        if raw.owners.len() != raw.lines.len() {
            return Err(format!(
                "{} lines but {} owners",
                raw.lines.len(),
                raw.owners.len()
            ));
        }
        if let Some(owner) = raw.owners.iter().find(|&&o| o >= raw.chunks.len()) {
            return Err(format!(
                "owner {} out of range for {} chunks",
                owner,
                raw.chunks.len()
            ));
        }
        Ok(Self {
            lines: raw.lines,
            chunks: raw.chunks,
            owners: raw.owners,
        })
    }
}

/// A porcelain line, classified once before the state machine looks at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `<id> <orig> <final> <size>`: opens a group.
    ChunkHeader {
        commit_id: &'a str,
        final_line: usize,
        group_size: usize,
    },
    /// `<id> <orig> <final>`: next line of the current group.
    SecondaryHeader { commit_id: &'a str, final_line: usize },
    /// Tab-prefixed file content, marker stripped.
    Content(&'a str),
    Metadata { key: &'a str, value: &'a str },
}

impl<'a> LineKind<'a> {
    pub fn classify(line: &'a str) -> Result<Self, ParseError> {
        if let Some(text) = line.strip_prefix('\t') {
            return Ok(LineKind::Content(text));
        }

        let fields: Vec<&str> = line.split(' ').collect();
        let is_header = matches!(fields.len(), 3 | 4)
            && is_commit_id(fields[0])
            && fields[1..].iter().all(|f| is_number(f));

        if !is_header {
            let (key, value) = line.split_once(' ').unwrap_or((line, ""));
            return Ok(LineKind::Metadata { key, value });
        }

        let final_line = parse_number("final line", fields[2])?;
        if final_line == 0 {
            return Err(ParseError::UnexpectedLine(line.to_string()));
        }

        match fields.get(3) {
            Some(size) => Ok(LineKind::ChunkHeader {
                commit_id: fields[0],
                final_line,
                group_size: parse_number("group size", size)?,
            }),
            None => Ok(LineKind::SecondaryHeader {
                commit_id: fields[0],
                final_line,
            }),
        }
    }
}

fn is_commit_id(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number(field: &'static str, value: &str) -> Result<usize, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Parses porcelain blame output. Either the whole stream parses or nothing is returned.
pub fn parse<R: BufRead>(mut reader: R) -> Result<Blame, ParseError> {
    let mut parser = Parser::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(ParseError::Read)?;
        if n == 0 {
            break;
        }
        let raw = String::from_utf8_lossy(&buf);
        let line: &str = &raw;
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        parser.feed(line)?;
    }

    parser.finish()
}

struct Group {
    chunk: usize,
    remaining: usize,
    /// 1-based line number the next content line lands on.
    final_line: usize,
    /// Metadata for this commit was already read in an earlier group.
    populated: bool,
}

/// Lines and owners are slotted by final line number, so a gap shows up as `None`.
#[derive(Default)]
struct Parser {
    lines: Vec<Option<String>>,
    owners: Vec<Option<usize>>,
    chunks: Vec<Chunk>,
    by_id: HashMap<String, usize>,
    group: Option<Group>,
    /// Sum of the sizes of every group opened so far; no final line may exceed it.
    declared: usize,
}

impl Parser {
    fn feed(&mut self, line: &str) -> Result<(), ParseError> {
        let kind = LineKind::classify(line)?;

        let Some(group) = self.group.as_mut() else {
            return self.open_group(line, kind);
        };

        match kind {
            LineKind::ChunkHeader { .. } => {
                return Err(ParseError::UnexpectedLine(line.to_string()));
            }
            LineKind::SecondaryHeader { final_line, .. } => {
                if final_line > self.declared {
                    return Err(ParseError::UnexpectedLine(line.to_string()));
                }
                group.final_line = final_line;
            }
            LineKind::Content(text) => {
                let index = group.final_line - 1;
                if index >= self.lines.len() {
                    self.lines.resize(index + 1, None);
                    self.owners.resize(index + 1, None);
                }
                if self.owners[index].is_some() {
                    return Err(ParseError::UnexpectedLine(line.to_string()));
                }
                self.lines[index] = Some(text.to_string());
                self.owners[index] = Some(group.chunk);
                group.final_line += 1;
                group.remaining -= 1;
                if group.remaining == 0 {
                    self.group = None;
                }
            }
            LineKind::Metadata { key, value } => {
                if !group.populated {
                    apply_metadata(&mut self.chunks[group.chunk], key, value)?;
                }
            }
        }

        Ok(())
    }

    fn open_group(&mut self, line: &str, kind: LineKind<'_>) -> Result<(), ParseError> {
        let LineKind::ChunkHeader {
            commit_id,
            final_line,
            group_size,
        } = kind
        else {
            return Err(ParseError::UnexpectedLine(line.to_string()));
        };
        if group_size == 0 {
            return Err(ParseError::UnexpectedLine(line.to_string()));
        }
        let declared = self
            .declared
            .checked_add(group_size)
            .ok_or_else(|| ParseError::UnexpectedLine(line.to_string()))?;
        match (final_line - 1).checked_add(group_size) {
            Some(last) if last <= declared => {}
            _ => return Err(ParseError::UnexpectedLine(line.to_string())),
        }
        self.declared = declared;

        let (chunk, populated) = match self.by_id.get(commit_id) {
            Some(&index) => (index, true),
            None => {
                let index = self.chunks.len();
                self.chunks.push(Chunk::new(commit_id));
                self.by_id.insert(commit_id.to_string(), index);
                (index, false)
            }
        };

        self.group = Some(Group {
            chunk,
            remaining: group_size,
            final_line,
            populated,
        });
        Ok(())
    }

    fn finish(self) -> Result<Blame, ParseError> {
        if let Some(group) = self.group {
            return Err(ParseError::MissingLine(group.final_line));
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        let mut owners = Vec::with_capacity(self.owners.len());
        for (i, (line, owner)) in self.lines.into_iter().zip(self.owners).enumerate() {
            match (line, owner) {
                (Some(line), Some(owner)) => {
                    lines.push(line);
                    owners.push(owner);
                }
                _ => return Err(ParseError::MissingLine(i + 1)),
            }
        }

        Ok(Blame {
            lines,
            chunks: self.chunks,
            owners,
        })
    }
}

fn apply_metadata(chunk: &mut Chunk, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "author" => chunk.author = value.to_string(),
        "author-mail" => chunk.author_mail = value.to_string(),
        "author-time" => {
            chunk.author_time = value.parse().map_err(|_| ParseError::InvalidNumber {
                field: "author-time",
                value: value.to_string(),
            })?;
        }
        "summary" => chunk.summary = value.to_string(),
        "filename" => chunk.filename = unquote_path(value).into_owned(),
        "previous" => chunk.previous = Some(PreviousRevision::parse(value)?),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn meta(author: &str, time: i64, summary: &str) -> String {
        format!(
            "author {author}\n\
             author-mail <{author}@example.com>\n\
             author-time {time}\n\
             author-tz +0000\n\
             committer {author}\n\
             committer-mail <{author}@example.com>\n\
             committer-time {time}\n\
             committer-tz +0000\n\
             summary {summary}\n"
        )
    }

    /// Commit A adds three lines, commit B then rewrites line 2.
    fn two_commit_porcelain() -> String {
        format!(
            "{A} 1 1 1\n{}boundary\nfilename file.txt\n\tline one\n\
             {B} 2 2 1\n{}previous {A} file.txt\nfilename file.txt\n\tline two changed\n\
             {A} 3 3 1\n\tline three\n",
            meta("alice", 1_600_000_000, "Add file"),
            meta("bob", 1_600_100_000, "Change line two"),
        )
    }

    fn parse_str(input: &str) -> Result<Blame, ParseError> {
        parse(input.as_bytes())
    }

    #[test]
    fn test_two_commit_example() {
        let blame = parse_str(&two_commit_porcelain()).unwrap();

        assert_eq!(blame.len(), 3);
        assert_eq!(blame.lines(), &["line one", "line two changed", "line three"]);

        let middle = blame.chunk_at(1).unwrap();
        assert_eq!(middle.commit_id, B);
        assert_eq!(
            middle.previous,
            Some(PreviousRevision {
                commit_id: A.to_string(),
                filename: "file.txt".to_string(),
            })
        );

        for index in [0, 2] {
            let chunk = blame.chunk_at(index).unwrap();
            assert_eq!(chunk.commit_id, A);
            assert_eq!(chunk.previous, None);
        }
    }

    #[test]
    fn test_repeated_commit_shares_one_chunk() {
        let blame = parse_str(&two_commit_porcelain()).unwrap();

        assert_eq!(blame.chunks().len(), 2);
        assert_eq!(blame.chunk_index_at(0), blame.chunk_index_at(2));
        let first = blame.chunk_at(0).unwrap();
        assert_eq!(first.author, "alice");
        assert_eq!(first.author_mail, "<alice@example.com>");
        assert_eq!(first.author_time, 1_600_000_000);
        assert_eq!(first.summary, "Add file");
        assert_eq!(first.filename, "file.txt");
        assert_eq!(blame.chunk_at(2), Some(first));
    }

    #[test]
    fn test_group_sizes_sum_to_line_count() {
        let input = format!(
            "{A} 1 1 2\n{}filename f\n\tone\n{A} 2 2\n\ttwo\n\
             {B} 3 3 3\n{}filename f\n\tthree\n{B} 4 4\n\tfour\n{B} 5 5\n\tfive\n",
            meta("alice", 10, "first"),
            meta("bob", 20, "second"),
        );
        let blame = parse_str(&input).unwrap();

        assert_eq!(blame.len(), 5);
        for index in 0..blame.len() {
            assert!(blame.chunk_at(index).is_some(), "line {index} unmapped");
        }
        let owners: Vec<&str> = blame.iter().map(|(_, c)| c.commit_id.as_str()).collect();
        assert_eq!(owners, vec![A, A, B, B, B]);
    }

    #[test]
    fn test_metadata_ignored_once_populated() {
        let input = format!(
            "{A} 1 1 1\n{}filename f\n\tone\n\
             {A} 2 2 1\nsummary rewritten\nfilename other\n\ttwo\n",
            meta("alice", 10, "original"),
        );
        let blame = parse_str(&input).unwrap();

        let chunk = blame.chunk_at(1).unwrap();
        assert_eq!(chunk.summary, "original");
        assert_eq!(chunk.filename, "f");
    }

    #[test]
    fn test_header_mismatch_reports_raw_line() {
        let err = parse_str("not a header\n").unwrap_err();
        match err {
            ParseError::UnexpectedLine(line) => assert_eq!(line, "not a header"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_author_time_is_fatal() {
        let input = format!("{A} 1 1 1\nauthor-time yesterday\n\tone\n");
        let err = parse_str(&input).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { field: "author-time", .. }
        ));
    }

    #[test]
    fn test_truncated_stream_is_rejected() {
        let input = format!("{A} 1 1 2\n{}\tone\n", meta("alice", 10, "first"));
        assert!(matches!(
            parse_str(&input),
            Err(ParseError::MissingLine(2))
        ));
    }

    #[test]
    fn test_content_keeps_inner_tabs_and_drops_crlf() {
        let input = format!("{A} 1 1 1\r\nsummary s\r\n\t\tindented\tvalue\r\n");
        let blame = parse_str(&input).unwrap();
        assert_eq!(blame.lines()[0], "\tindented\tvalue");
        assert_eq!(blame.chunk_at(0).unwrap().summary, "s");
    }

    #[test]
    fn test_empty_input_is_empty_blame() {
        let blame = parse_str("").unwrap();
        assert!(blame.is_empty());
        assert_eq!(blame.last_index(), 0);
        assert!(blame.chunk_at(0).is_none());
    }

    #[test]
    fn test_classify_line_kinds() {
        assert_eq!(
            LineKind::classify(&format!("{A} 4 7 2")).unwrap(),
            LineKind::ChunkHeader {
                commit_id: A,
                final_line: 7,
                group_size: 2
            }
        );
        assert_eq!(
            LineKind::classify(&format!("{A} 4 8")).unwrap(),
            LineKind::SecondaryHeader {
                commit_id: A,
                final_line: 8
            }
        );
        assert_eq!(LineKind::classify("\tfn main() {}").unwrap(), LineKind::Content("fn main() {}"));
        assert_eq!(
            LineKind::classify("summary Fix 1 2 3").unwrap(),
            LineKind::Metadata {
                key: "summary",
                value: "Fix 1 2 3"
            }
        );
        assert_eq!(
            LineKind::classify("boundary").unwrap(),
            LineKind::Metadata {
                key: "boundary",
                value: ""
            }
        );
    }

    #[test]
    fn test_classify_rejects_line_zero() {
        assert!(matches!(
            LineKind::classify(&format!("{A} 1 0 1")),
            Err(ParseError::UnexpectedLine(_))
        ));
    }

    #[test]
    fn test_blame_serializes_to_json() {
        let blame = parse_str(&two_commit_porcelain()).unwrap();
        let json = serde_json::to_string(&blame).unwrap();
        let back: Blame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, blame);
    }

    #[test]
    fn test_final_line_beyond_declared_groups_is_rejected() {
        for header in [
            format!("{A} 1 18446744073709551615 1"),
            format!("{A} 1 9999999999 1"),
            format!("{A} 1 2 1"),
        ] {
            let input = format!("{header}\nsummary s\n\tx\n");
            match parse_str(&input) {
                Err(ParseError::UnexpectedLine(line)) => assert_eq!(line, header),
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[test]
    fn test_secondary_header_beyond_declared_groups_is_rejected() {
        let input = format!("{A} 1 1 2\nsummary s\n\tone\n{A} 2 99\n\ttwo\n");
        assert!(matches!(
            parse_str(&input),
            Err(ParseError::UnexpectedLine(line)) if line == format!("{A} 2 99")
        ));
    }

    #[test]
    fn test_group_size_overflow_is_rejected() {
        let input = format!(
            "{A} 1 1 1\nsummary s\n\tone\n{B} 2 2 18446744073709551615\n\ttwo\n"
        );
        assert!(matches!(
            parse_str(&input),
            Err(ParseError::UnexpectedLine(_))
        ));
    }

    #[test]
    fn test_quoted_filenames_are_unquoted() {
        let input = format!(
            "{B} 1 1 1\nsummary s\nprevious {A} \"old \\303\\251t\\303\\251.txt\"\nfilename \"caf\\303\\251\\tmenu.txt\"\n\tx\n"
        );
        let blame = parse_str(&input).unwrap();
        let chunk = blame.chunk_at(0).unwrap();
        assert_eq!(chunk.filename, "caf\u{e9}\tmenu.txt");
        assert_eq!(chunk.previous.as_ref().unwrap().filename, "old \u{e9}t\u{e9}.txt");
    }

    #[test]
    fn test_deserialize_rejects_dangling_owner() {
        let json = r#"{"lines":["a","b"],"chunks":[],"owners":[0,0]}"#;
        assert!(serde_json::from_str::<Blame>(json).is_err());

        let json = r#"{"lines":["a"],"chunks":[],"owners":[]}"#;
        assert!(serde_json::from_str::<Blame>(json).is_err());
    }
}
