use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::git::{Blame, Chunk};
use crate::views::{expand_tabs, truncate};

const NOT_COMMITTED_SUMMARY: &str = "(not committed)";

/// Summary column text for `chunk`, shortened to `width` characters.
pub fn summary_cell(chunk: &Chunk, width: usize) -> String {
    if chunk.is_committed() {
        truncate(&chunk.summary, width).into_owned()
    } else {
        NOT_COMMITTED_SUMMARY.to_string()
    }
}

/// Writes one annotated row per line: id, summary, age, line number, content.
pub fn print_plain<W: Write>(out: &mut W, blame: &Blame, summary_width: usize, now: i64) -> Result<()> {
    let number_width = blame.len().to_string().len();
    for (i, (line, chunk)) in blame.iter().enumerate() {
        let (id, age) = if chunk.is_committed() {
            (chunk.short_id(), chunk.relative_age(now))
        } else {
            ("", String::new())
        };
        let summary = summary_cell(chunk, summary_width);
        writeln!(
            out,
            "{:7} {:<sw$} {:>4} {:>nw$} {}",
            id,
            summary,
            age,
            i + 1,
            expand_tabs(line),
            sw = summary_width,
            nw = number_width,
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    path: &'a str,
    revision: Option<&'a str>,
    lines: Vec<JsonLine<'a>>,
    commits: &'a [Chunk],
}

#[derive(Serialize)]
struct JsonLine<'a> {
    number: usize,
    commit: usize,
    content: &'a str,
}

/// Writes the blame as a JSON document with a deduplicated `commits` table.
pub fn print_json<W: Write>(out: &mut W, blame: &Blame, path: &str, revision: Option<&str>) -> Result<()> {
    let lines = blame
        .lines()
        .iter()
        .enumerate()
        .filter_map(|(i, content)| {
            blame.chunk_index_at(i).map(|commit| JsonLine {
                number: i + 1,
                commit,
                content,
            })
        })
        .collect();
    let doc = JsonOutput {
        path,
        revision,
        lines,
        commits: blame.chunks(),
    };
    serde_json::to_writer_pretty(&mut *out, &doc).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}
