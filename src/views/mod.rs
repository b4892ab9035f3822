mod blame;
mod status;

pub use blame::BlameView;
pub use status::{render_status_bar, Prompt, Status};

use std::borrow::Cow;

const TAB: &str = "    ";

/// Shortens `s` to at most `width` characters, ending with `...` when cut.
pub fn truncate(s: &str, width: usize) -> Cow<'_, str> {
    if s.chars().count() <= width {
        return Cow::Borrowed(s);
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", kept))
}

pub fn expand_tabs(s: &str) -> Cow<'_, str> {
    if s.contains('\t') {
        Cow::Owned(s.replace('\t', TAB))
    } else {
        Cow::Borrowed(s)
    }
}
