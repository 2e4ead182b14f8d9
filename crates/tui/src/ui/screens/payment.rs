use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::AppState,
    i18n::t,
    payment::view::{FieldId, FieldView, PaymentView},
    ui::{
        components::{centered_box, input_text},
        theme::Theme,
    },
};

const LABEL_WIDTH: usize = 22;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, view: &PaymentView) {
    let theme = Theme::default();

    let mut title = vec![Span::styled(
        format!(" {} ", view.title),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    )];
    if view.show_save_icon {
        title.push(Span::styled("✓ ", Style::default().fg(theme.positive)));
    }
    if view.menu.is_some() {
        title.push(Span::styled("⋮ ", Style::default().fg(theme.text_muted)));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .margin(1)
        .split(inner);

    let focused = state.focused(view);
    let mut lines = Vec::new();
    for field in &view.fields {
        if view.show_custom_fields && field.id == FieldId::Custom(0) {
            lines.push(Line::default());
            lines.push(Line::styled(
                t("customFields.title", state.locale()),
                Style::default()
                    .fg(theme.text_muted)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let is_focused = focused == Some(field.id);
        lines.push(field_line(field, is_focused, state, &theme, view.dimmed));
        if let Some(error) = &field.error {
            lines.push(Line::from(Span::styled(
                format!("{:width$}  {error}", "", width = LABEL_WIDTH),
                Style::default().fg(theme.error),
            )));
        }
    }
    frame.render_widget(Paragraph::new(lines), layout[0]);

    let submit = if view.submit_loading {
        format!("[ {} ]", t("loading", state.locale()))
    } else {
        format!("[ {} ]  Ctrl+S", view.submit_label)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(submit, Style::default().fg(theme.accent)))
            .alignment(Alignment::Right),
        layout[1],
    );

    if view.loading {
        let message = t("loading", state.locale());
        let popup = centered_box(message.chars().count() as u16 + 6, 3, area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(theme.accent)),
                ),
            popup,
        );
    }
}

fn field_line(
    field: &FieldView,
    focused: bool,
    state: &AppState,
    theme: &Theme,
    dimmed: bool,
) -> Line<'static> {
    let marker = if field.required { "*" } else { " " };
    let label = format!("{:width$}", format!("{}{marker}", field.label), width = LABEL_WIDTH);
    let label_style = if focused {
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_muted)
    };

    // The amount is typed as plain digits and shown with its currency otherwise.
    let value = if focused && field.id == FieldId::Amount {
        Some(state.amount_input.clone())
    } else {
        field.value.clone().filter(|value| !value.is_empty())
    };

    let value_span = match value {
        Some(value) => {
            let text = if focused && field.editable {
                input_text(&value, true)
            } else {
                value
            };
            let color = if dimmed || !field.editable {
                theme.dim
            } else {
                theme.text
            };
            Span::styled(text, Style::default().fg(color))
        }
        None => {
            let placeholder = field.placeholder.clone().unwrap_or_default();
            let text = if focused && field.editable && field.placeholder.is_none() {
                input_text("", true)
            } else {
                placeholder
            };
            Span::styled(text, Style::default().fg(theme.dim))
        }
    };

    Line::from(vec![
        Span::styled(label, label_style),
        Span::raw("  "),
        value_span,
    ])
}

#[cfg(test)]
mod tests {
    use chrono_tz::Europe::Rome;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::{
        i18n::Locale,
        payment::{Mode, fake::FakeBackend},
        ui,
    };

    fn screen_text(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal.draw(|frame| ui::render(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_loading_before_data() {
        let state = AppState::new(Mode::Add, Locale::En, Rome, 10);
        let text = screen_text(&state);
        assert!(text.contains("Loading..."));
        assert!(text.contains("Add Payment"));
    }

    #[tokio::test]
    async fn renders_loaded_form() {
        let backend = FakeBackend::default();
        let mut state = AppState::new(Mode::Add, Locale::En, Rome, 10);
        while let Some(task) = state.take_task() {
            state.run(task, &backend).await;
        }

        let text = screen_text(&state);

        assert!(text.contains("PAY--000002"));
        assert!(text.contains("Select Customer"));
        assert!(text.contains("Custom Fields"));
        assert!(!text.contains("Loading..."));
    }
}
