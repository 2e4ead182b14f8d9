use api_types::customer::CustomerNew;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    i18n::{Locale, t},
    ui::{
        components::{centered_box, input_text},
        theme::Theme,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomerField {
    #[default]
    Name,
    Email,
}

/// Inline form that creates a customer and hands it back to the payment.
#[derive(Debug, Default)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub focus: CustomerField,
    pub message: Option<String>,
}

impl CustomerForm {
    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            CustomerField::Name => CustomerField::Email,
            CustomerField::Email => CustomerField::Name,
        };
    }

    pub fn field_mut(&mut self) -> &mut String {
        match self.focus {
            CustomerField::Name => &mut self.name,
            CustomerField::Email => &mut self.email,
        }
    }

    /// The request body, or `None` while the name is blank.
    pub fn request(&self) -> Option<CustomerNew> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let email = self.email.trim();
        Some(CustomerNew {
            name: name.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
        })
    }
}

pub fn render(frame: &mut Frame<'_>, area: Rect, form: &CustomerForm, locale: Locale) {
    let theme = Theme::default();
    let popup = centered_box(48, 8, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", t("customers.add", locale)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(inner);

    let input = |label: String, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text_muted)
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(theme.text_muted)),
            Span::styled(input_text(value, focused), style),
        ]))
    };

    frame.render_widget(
        input(
            t("customers.name", locale),
            &form.name,
            form.focus == CustomerField::Name,
        ),
        rows[0],
    );
    frame.render_widget(
        input(
            t("customers.email", locale),
            &form.email,
            form.focus == CustomerField::Email,
        ),
        rows[1],
    );

    if let Some(message) = &form.message {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            rows[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_not_submitted() {
        let form = CustomerForm {
            name: "   ".to_string(),
            ..CustomerForm::default()
        };
        assert!(form.request().is_none());
    }

    #[test]
    fn empty_email_is_omitted() {
        let mut form = CustomerForm::default();
        form.field_mut().push_str(" Acme ");
        let request = form.request().unwrap();
        assert_eq!(request.name, "Acme");
        assert_eq!(request.email, None);

        form.next_field();
        form.field_mut().push_str("billing@acme.test");
        assert_eq!(
            form.request().and_then(|request| request.email).as_deref(),
            Some("billing@acme.test")
        );
    }
}
