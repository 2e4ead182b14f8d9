use api_types::{
    customer::Customer, note::NoteTemplate, paging::ListQuery, payment::PaymentMethod,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::{
    i18n::{Locale, t},
    payment::{handles::SelectHandle, invoices::InvoiceListItem, validate::format_amount},
    ui::{
        components::{centered_rect, input_text},
        theme::Theme,
    },
};

/// Colored status label shown next to a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub fg: Color,
    pub bg: Color,
}

/// How a picker row is drawn.
pub trait PickerEntry {
    fn label(&self) -> String;

    fn detail(&self) -> Option<String> {
        None
    }

    fn badge(&self) -> Option<Badge> {
        None
    }
}

impl PickerEntry for Customer {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn detail(&self) -> Option<String> {
        self.email.clone()
    }
}

impl PickerEntry for PaymentMethod {
    fn label(&self) -> String {
        self.name.clone()
    }
}

impl PickerEntry for NoteTemplate {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn detail(&self) -> Option<String> {
        self.notes.lines().next().map(str::to_string)
    }
}

impl PickerEntry for InvoiceListItem {
    fn label(&self) -> String {
        match (&self.subtitle.title, &self.title) {
            (Some(number), Some(customer)) => format!("{number}  {customer}"),
            (Some(number), None) => number.clone(),
            (None, Some(customer)) => customer.clone(),
            (None, None) => String::new(),
        }
    }

    fn detail(&self) -> Option<String> {
        let amount = self.amount.map(|amount| match &self.currency {
            Some(currency) => currency.format_minor(amount),
            None => format_amount(amount, 2),
        });
        match (amount, &self.right_subtitle) {
            (Some(amount), Some(due)) => Some(format!("{amount}  {due}")),
            (Some(amount), None) => Some(amount),
            (None, due) => due.clone(),
        }
    }

    fn badge(&self) -> Option<Badge> {
        let text = self.subtitle.label.clone()?;
        Some(Badge {
            text,
            fg: self.subtitle.label_text.unwrap_or(Color::Reset),
            bg: self.subtitle.label_bg.unwrap_or(Color::Reset),
        })
    }
}

/// A page request queued by the picker, run by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
    pub query: ListQuery,
    pub append: bool,
}

/// Searchable selection list behind a select field.
///
/// Remote pickers ask the event loop for pages through [`Picker::take_fetch`];
/// local ones filter the items they were given.
#[derive(Debug)]
pub struct Picker<T> {
    title_key: &'static str,
    local: bool,
    page_size: u32,
    items: Vec<T>,
    query: String,
    selected: usize,
    open: bool,
    display: Option<String>,
    last_query: ListQuery,
    has_more: bool,
    pending: Option<Fetch>,
}

impl<T: PickerEntry + Clone> Picker<T> {
    pub fn remote(title_key: &'static str, page_size: u32) -> Self {
        Self::build(title_key, false, page_size)
    }

    pub fn local(title_key: &'static str) -> Self {
        Self::build(title_key, true, 0)
    }

    fn build(title_key: &'static str, local: bool, page_size: u32) -> Self {
        Self {
            title_key,
            local,
            page_size,
            items: Vec::new(),
            query: String::new(),
            selected: 0,
            open: false,
            display: None,
            last_query: ListQuery::first_page(page_size),
            has_more: false,
            pending: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    pub fn close(&mut self) {
        self.open = false;
        self.pending = None;
    }

    /// Forgets loaded rows; the next open fetches again.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = 0;
        self.has_more = false;
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = 0;
    }

    /// Stores a fetched page, appending when it continues the current list.
    pub fn receive(&mut self, fetch: &Fetch, items: Vec<T>, has_more: bool) {
        if fetch.append {
            self.items.extend(items);
        } else {
            self.items = items;
            self.selected = 0;
        }
        self.last_query = fetch.query.clone();
        self.has_more = has_more;
    }

    pub fn take_fetch(&mut self) -> Option<Fetch> {
        self.pending.take()
    }

    pub fn push_query(&mut self, ch: char) {
        self.query.push(ch);
        self.refresh();
    }

    pub fn pop_query(&mut self) {
        if self.query.pop().is_some() {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        self.selected = 0;
        if self.local {
            return;
        }
        let mut query = ListQuery::first_page(self.page_size);
        if !self.query.is_empty() {
            query.search = Some(self.query.clone());
        }
        self.pending = Some(Fetch {
            query,
            append: false,
        });
    }

    pub fn visible(&self) -> Vec<&T> {
        if !self.local || self.query.is_empty() {
            return self.items.iter().collect();
        }
        let needle = self.query.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.label().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Moves down; past the last row it queues the next page if there is one.
    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if self.selected + 1 < len {
            self.selected += 1;
        } else {
            self.next_page();
        }
    }

    pub fn next_page(&mut self) {
        if self.local || !self.has_more || self.pending.is_some() {
            return;
        }
        self.pending = Some(Fetch {
            query: self.last_query.next(),
            append: true,
        });
    }

    /// The highlighted row. Closes the picker when there is one.
    pub fn choose(&mut self) -> Option<T> {
        let chosen = self.visible().get(self.selected).map(|item| (*item).clone());
        if chosen.is_some() {
            self.close();
        }
        chosen
    }
}

impl<T: PickerEntry + Clone> SelectHandle for Picker<T> {
    fn set_display_value(&mut self, value: Option<String>) {
        self.display = value;
    }

    fn open(&mut self) {
        self.open = true;
        self.query.clear();
        self.selected = 0;
        if !self.local {
            self.pending = Some(Fetch {
                query: ListQuery::first_page(self.page_size),
                append: false,
            });
        }
    }
}

pub fn render<T: PickerEntry + Clone>(
    frame: &mut Frame<'_>,
    area: Rect,
    picker: &Picker<T>,
    locale: Locale,
    theme: &Theme,
) {
    if !picker.is_open() {
        return;
    }

    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", t(picker.title_key, locale)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let search = if picker.query().is_empty() {
        Span::styled(t("search.placeholder", locale), Style::default().fg(theme.dim))
    } else {
        Span::styled(
            input_text(picker.query(), true),
            Style::default().fg(theme.text),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(search)), layout[0]);

    let visible = picker.visible();
    if visible.is_empty() {
        let key = if picker.is_fetching() {
            "loading"
        } else {
            "search.empty"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(t(key, locale), Style::default().fg(theme.dim))),
            layout[1],
        );
        return;
    }

    let items = visible
        .iter()
        .map(|item| ListItem::new(row(*item, theme)))
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(picker.selected.min(items.len() - 1)));

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, layout[1], &mut list_state);
}

fn row<T: PickerEntry>(item: &T, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::raw(item.label())];
    if let Some(badge) = item.badge() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" {} ", badge.text),
            Style::default().fg(badge.fg).bg(badge.bg),
        ));
    }
    if let Some(detail) = item.detail() {
        spans.push(Span::styled(
            format!("  {detail}"),
            Style::default().fg(theme.text_muted),
        ));
    }
    Line::from(spans)
}
