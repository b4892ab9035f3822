use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub selection: Color,
    pub selection_text: Color,
    pub commit_id: Color,
    pub age: Color,
    pub line_number: Color,
    pub label: Color,
    pub error_fg: Color,
    pub error_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            foreground: Color::Rgb(205, 214, 244),     // #cdd6f4
            muted: Color::Rgb(108, 112, 134),          // #6c7086
            border: Color::Rgb(69, 71, 90),            // #45475a
            selection: Color::Rgb(49, 50, 68),         // #313244
            selection_text: Color::Rgb(205, 214, 244), // #cdd6f4
            commit_id: Color::Rgb(249, 226, 175),      // #f9e2af
            age: Color::Rgb(137, 220, 235),            // #89dceb
            line_number: Color::Rgb(127, 132, 156),    // #7f849c
            label: Color::Rgb(137, 180, 250),          // #89b4fa
            error_fg: Color::Rgb(30, 30, 46),          // #1e1e2e
            error_bg: Color::Rgb(243, 139, 168),       // #f38ba8
        }
    }

    pub fn light() -> Self {
        Self {
            foreground: Color::Rgb(76, 79, 105),       // #4c4f69
            muted: Color::Rgb(156, 160, 176),          // #9ca0b0
            border: Color::Rgb(188, 192, 204),         // #bcc0cc
            selection: Color::Rgb(204, 208, 218),      // #ccd0da
            selection_text: Color::Rgb(76, 79, 105),   // #4c4f69
            commit_id: Color::Rgb(223, 142, 29),       // #df8e1d
            age: Color::Rgb(4, 165, 229),              // #04a5e5
            line_number: Color::Rgb(140, 143, 161),    // #8c8fa1
            label: Color::Rgb(30, 102, 245),           // #1e66f5
            error_fg: Color::Rgb(239, 241, 245),       // #eff1f5
            error_bg: Color::Rgb(210, 15, 57),         // #d20f39
        }
    }
}
