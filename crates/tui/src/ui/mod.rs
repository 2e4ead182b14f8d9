pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    app::AppState,
    i18n::t,
    payment::view::{FieldId, PaymentView},
};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

use components::hints::{KeyHint, hints_to_spans};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    let theme = Theme::default();
    let view = state.view();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    screens::payment::render(frame, layout[0], state, &view);
    render_bottom_bar(frame, layout[1], state, &view, &theme);

    let locale = state.locale();
    components::picker::render(frame, area, &state.customers, locale, &theme);
    components::picker::render(frame, area, &state.invoices, locale, &theme);
    components::picker::render(frame, area, &state.methods, locale, &theme);
    components::picker::render(frame, area, &state.notes, locale, &theme);
    if let (Some(menu), Some(selected)) = (&view.menu, state.menu) {
        components::menu::render(frame, area, menu, selected);
    }
    components::mail::render(frame, area, &state.mail, locale);
    if let Some(form) = &state.customer_form {
        components::customer_form::render(frame, area, form, locale);
    }
    components::alert::render(frame, area, view.alert.as_ref(), locale);
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_bottom_bar(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    view: &PaymentView,
    theme: &Theme,
) {
    let hints = context_hints(state, view);
    let mut parts = hints_to_spans(&hints, theme);
    parts.push(Span::styled("  │  ", Style::default().fg(theme.border)));
    parts.push(Span::styled("Ctrl+C", Style::default().fg(theme.accent)));
    parts.push(Span::raw(" quit"));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

/// Hints for whatever currently has the keyboard.
fn context_hints(state: &AppState, view: &PaymentView) -> Vec<KeyHint> {
    let locale = state.locale();

    if view.alert.is_some() {
        return vec![
            KeyHint::new("Enter", t("button.ok", locale)),
            KeyHint::new("Esc", t("button.cancel", locale)),
        ];
    }
    if state.customer_form.is_some() {
        return vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("Enter", t("button.save", locale)),
            KeyHint::new("Esc", t("button.cancel", locale)),
        ];
    }
    if state.mail.is_open() {
        return vec![
            KeyHint::new("Tab", "next"),
            KeyHint::new("Ctrl+S", t("button.send", locale)),
            KeyHint::new("Esc", t("button.cancel", locale)),
        ];
    }
    if state.customers.is_open() {
        return vec![
            KeyHint::new("↑↓", "select"),
            KeyHint::new("Enter", "pick"),
            KeyHint::new("Ctrl+N", t("customers.add", locale)),
            KeyHint::new("Esc", t("button.cancel", locale)),
        ];
    }
    if state.invoices.is_open() || state.methods.is_open() || state.notes.is_open() {
        return vec![
            KeyHint::new("↑↓", "select"),
            KeyHint::new("PgDn", "more"),
            KeyHint::new("Enter", "pick"),
            KeyHint::new("Esc", t("button.cancel", locale)),
        ];
    }
    if state.screen.is_loading() {
        return vec![
            KeyHint::new("Ctrl+R", "retry"),
            KeyHint::new("Esc", "back"),
        ];
    }

    let mut hints = vec![
        KeyHint::new("Tab", "next"),
        KeyHint::new("Ctrl+S", t("button.save", locale)),
    ];
    if view.menu.is_some() {
        hints.push(KeyHint::new("Ctrl+O", "menu"));
    }
    match state.focused(view) {
        Some(FieldId::Customer | FieldId::Invoice | FieldId::Method) => {
            hints.push(KeyHint::new("Enter", "choose"));
        }
        Some(FieldId::Notes) if !state.screen.note_templates().is_empty() => {
            hints.push(KeyHint::new("Ctrl+T", t("payments.insertNote", locale)));
        }
        _ => {}
    }
    hints.push(KeyHint::new("Esc", "back"));
    hints
}
