use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use super::expand_tabs;
use crate::config::Theme;
use crate::git::short_id;
use crate::navigator::Navigator;
use crate::output::summary_cell;

/// Scrolling table of blamed lines. Only the scroll offset lives here; the
/// selection is the navigator's cursor.
#[derive(Debug, Default)]
pub struct BlameView {
    offset: usize,
}

impl BlameView {
    pub fn new() -> Self {
        Self::default()
    }

    fn scroll_to(&mut self, selected: usize, height: usize) {
        if height == 0 {
            return;
        }
        if selected < self.offset {
            self.offset = selected;
        } else if selected >= self.offset + height {
            self.offset = selected + 1 - height;
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        navigator: &Navigator,
        theme: &Theme,
        search_term: Option<&str>,
        summary_width: usize,
        now: i64,
    ) {
        let revision = navigator
            .current_commit()
            .map(short_id)
            .unwrap_or("working tree");
        let depth = navigator.history().len();
        let title = if depth > 0 {
            format!(" {} @ {} [{} back] ", navigator.path(), revision, depth)
        } else {
            format!(" {} @ {} ", navigator.path(), revision)
        };

        let mut hints = Vec::new();
        if navigator.can_descend() {
            hints.push("h older".to_string());
        }
        if navigator.can_ascend() {
            hints.push("l newer".to_string());
        }
        if let Some(term) = search_term {
            hints.push(format!("/{}", term));
        }

        let mut block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border));
        if !hints.is_empty() {
            block = block.title_top(Line::from(format!(" {} ", hints.join(" | "))).right_aligned());
        }
        let inner = block.inner(area);

        let blame = navigator.blame();
        if blame.is_empty() {
            let empty = Paragraph::new(Span::styled("(empty file)", Style::default().fg(theme.muted)))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let height = inner.height as usize;
        let selected = navigator.cursor();
        self.scroll_to(selected, height);

        let number_width = column_width(blame.len().to_string().len());
        let rows: Vec<Row> = blame
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(height)
            .map(|(i, (line, chunk))| {
                let (id, age) = if chunk.is_committed() {
                    (chunk.short_id().to_string(), chunk.relative_age(now))
                } else {
                    (String::new(), String::new())
                };
                let row = Row::new(vec![
                    Cell::from(Span::styled(id, Style::default().fg(theme.commit_id))),
                    Cell::from(summary_cell(chunk, summary_width)),
                    Cell::from(Span::styled(age, Style::default().fg(theme.age))),
                    Cell::from(Span::styled(
                        format!("{:>width$}", i + 1, width = number_width as usize),
                        Style::default().fg(theme.line_number),
                    )),
                    Cell::from(expand_tabs(line).into_owned()),
                ]);
                if i == selected {
                    row.style(
                        Style::default()
                            .fg(theme.selection_text)
                            .bg(theme.selection)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    row.style(Style::default().fg(theme.foreground))
                }
            })
            .collect();

        let widths = [
            Constraint::Length(7),
            Constraint::Length(column_width(summary_width)),
            Constraint::Length(4),
            Constraint::Length(number_width),
            Constraint::Min(0),
        ];
        let table = Table::new(rows, widths).column_spacing(1).block(block);
        f.render_widget(table, area);
    }
}

fn column_width(width: usize) -> u16 {
    u16::try_from(width).unwrap_or(u16::MAX)
}
