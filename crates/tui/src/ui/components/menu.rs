use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState},
};

use crate::{
    payment::view::OverflowMenu,
    ui::{components::centered_box, theme::Theme},
};

/// Renders the overflow menu with `selected` highlighted. The destructive
/// entry is drawn in the error color.
pub fn render(frame: &mut Frame<'_>, area: Rect, menu: &OverflowMenu, selected: usize) {
    let theme = Theme::default();
    let width = menu
        .options
        .iter()
        .map(|option| option.label.chars().count() as u16)
        .max()
        .unwrap_or_default()
        + 8;
    let popup = centered_box(width, menu.options.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);

    let items = menu
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let style = if index == menu.destructive_index {
                Style::default().fg(theme.error)
            } else if index == menu.cancel_index {
                Style::default().fg(theme.text_muted)
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Line::styled(option.label.clone(), style))
        })
        .collect::<Vec<_>>();

    let mut state = ListState::default();
    state.select(Some(selected.min(menu.options.len().saturating_sub(1))));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.border)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, popup, &mut state);
}
