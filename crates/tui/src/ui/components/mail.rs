use api_types::payment::ReceiptMail;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::{
    i18n::{Locale, t},
    payment::handles::MailHandle,
    ui::{
        components::{centered_rect, input_text},
        theme::Theme,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailField {
    #[default]
    To,
    Subject,
    Body,
}

impl MailField {
    fn next(self) -> Self {
        match self {
            Self::To => Self::Subject,
            Self::Subject => Self::Body,
            Self::Body => Self::To,
        }
    }
}

/// Receipt composer opened from the overflow menu.
#[derive(Debug, Default)]
pub struct MailComposer {
    open: bool,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub focus: MailField,
}

impl MailComposer {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn fill(&mut self, mail: ReceiptMail) {
        self.to = mail.to;
        self.subject = mail.subject;
        self.body = mail.body;
        self.focus = MailField::To;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn field_mut(&mut self) -> &mut String {
        match self.focus {
            MailField::To => &mut self.to,
            MailField::Subject => &mut self.subject,
            MailField::Body => &mut self.body,
        }
    }

    pub fn mail(&self) -> ReceiptMail {
        ReceiptMail {
            from: None,
            to: self.to.trim().to_string(),
            subject: self.subject.clone(),
            body: self.body.clone(),
        }
    }
}

impl MailHandle for MailComposer {
    fn toggle(&mut self) {
        self.open = !self.open;
    }
}

pub fn render(frame: &mut Frame<'_>, area: Rect, composer: &MailComposer, locale: Locale) {
    if !composer.is_open() {
        return;
    }
    let theme = Theme::default();
    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", t("header.sendMailPayment", locale)))
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
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(inner);

    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.text)
        };
        Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(theme.text_muted)),
            Span::styled(input_text(value, focused), style),
        ])
    };

    frame.render_widget(
        Paragraph::new(field(
            &t("mail.to", locale),
            &composer.to,
            composer.focus == MailField::To,
        )),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(field(
            &t("mail.subject", locale),
            &composer.subject,
            composer.focus == MailField::Subject,
        )),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(field(
            &t("mail.body", locale),
            &composer.body,
            composer.focus == MailField::Body,
        ))
        .wrap(Wrap { trim: false }),
        rows[3],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Ctrl+S", Style::default().fg(theme.accent)),
            Span::raw(format!(" {}  ", t("button.send", locale))),
            Span::styled("Esc", Style::default().fg(theme.accent)),
            Span::raw(format!(" {}", t("button.cancel", locale))),
        ])),
        rows[4],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_visibility() {
        let mut composer = MailComposer::default();
        composer.toggle();
        assert!(composer.is_open());
        composer.toggle();
        assert!(!composer.is_open());
    }

    #[test]
    fn mail_trims_recipient() {
        let mut composer = MailComposer::default();
        composer.fill(ReceiptMail {
            from: None,
            to: " billing@acme.test ".to_string(),
            subject: "Receipt".to_string(),
            body: "Thanks".to_string(),
        });
        composer.next_field();
        composer.field_mut().push('!');

        let mail = composer.mail();
        assert_eq!(mail.to, "billing@acme.test");
        assert_eq!(mail.subject, "Receipt!");
    }
}
