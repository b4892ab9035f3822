use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::config::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Search,
    Command,
}

impl Prompt {
    pub fn symbol(self) -> char {
        match self {
            Prompt::Search => '/',
            Prompt::Command => ':',
        }
    }
}

/// What the bottom bar shows when no input is being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Labelled fields describing the selected line.
    Details(Vec<(&'static str, String)>),
    Info(String),
    Error(String),
}

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    theme: &Theme,
    input: Option<(Prompt, &str)>,
    status: &Status,
) {
    if let Some((prompt, text)) = input {
        let line = Line::from(vec![
            Span::styled(prompt.symbol().to_string(), Style::default().fg(theme.label)),
            Span::styled(text.to_string(), Style::default().fg(theme.foreground)),
        ]);
        f.render_widget(Paragraph::new(line), area);
        f.set_cursor_position((cursor_column(area, text), area.y));
        return;
    }

    let line = match status {
        Status::Details(fields) => {
            let label = Style::default()
                .fg(theme.selection_text)
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD);
            let mut spans = vec![Span::raw(" ")];
            for (name, value) in fields {
                spans.push(Span::styled(*name, label));
                spans.push(Span::styled(format!(" {} ", value), Style::default().fg(theme.foreground)));
            }
            Line::from(spans)
        }
        Status::Info(text) => Line::from(Span::styled(
            format!(" {}", text),
            Style::default().fg(theme.foreground),
        )),
        Status::Error(text) => Line::from(Span::styled(
            format!(" {}", text),
            Style::default().fg(theme.error_fg).bg(theme.error_bg),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Terminal column of the input cursor, clamped to the last cell of `area`.
fn cursor_column(area: Rect, text: &str) -> u16 {
    let typed = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    x.min(area.right().saturating_sub(1))
}
