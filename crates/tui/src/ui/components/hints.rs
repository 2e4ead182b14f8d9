use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: String,
}

impl KeyHint {
    pub fn new(key: &'static str, action: impl Into<String>) -> Self {
        Self {
            key,
            action: action.into(),
        }
    }
}

/// Converts a list of key hints into styled spans for rendering.
pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_are_separated() {
        let spans = hints_to_spans(
            &[KeyHint::new("Tab", "next"), KeyHint::new("Esc", "back")],
            &Theme::default(),
        );
        let text: String = spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(text, "Tab next  Esc back");
    }
}
