use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    i18n::{Locale, t},
    payment::{Alert, AlertKind},
    ui::{components::centered_box, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, alert: Option<&Alert>, locale: Locale) {
    let Some(alert) = alert else {
        return;
    };
    let theme = Theme::default();

    let width = (alert.message.chars().count() as u16 + 6).clamp(30, 60);
    let popup = centered_box(width, 7, area);
    frame.render_widget(Clear, popup);

    let (border, buttons) = match alert.kind {
        AlertKind::Info => (theme.accent, vec![button(&t("button.ok", locale), &theme)]),
        AlertKind::Confirm(_) => (
            theme.error,
            vec![
                button(&t("button.ok", locale), &theme),
                Span::raw("   "),
                Span::styled(
                    format!("Esc {}", t("button.cancel", locale)),
                    Style::default().fg(theme.text_muted),
                ),
            ],
        ),
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border));
    if let Some(title) = &alert.title {
        block = block.title(format!(" {title} "));
    }

    let lines = vec![
        Line::from(alert.message.as_str()),
        Line::default(),
        Line::from(buttons),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn button(label: &str, theme: &Theme) -> Span<'static> {
    Span::styled(
        format!("Enter {label}"),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    )
}
