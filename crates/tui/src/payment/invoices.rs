use api_types::{Currency, invoice::InvoiceStatus};
use ratatui::style::Color;
use serde_json::Value;

/// Second line of an invoice row: number plus a colored status badge.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSubtitle {
    pub title: Option<String>,
    pub label: Option<String>,
    pub label_bg: Option<Color>,
    pub label_text: Option<Color>,
}

/// An unpaid invoice shaped for the selection list.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceListItem {
    pub title: Option<String>,
    pub subtitle: InvoiceSubtitle,
    pub amount: Option<i64>,
    pub currency: Option<Currency>,
    pub right_subtitle: Option<String>,
    /// The record as received, handed back on selection.
    pub full_item: Value,
}

pub fn status_bg_color(status: InvoiceStatus) -> Color {
    match status {
        InvoiceStatus::Draft => Color::Rgb(248, 237, 203),
        InvoiceStatus::Sent => Color::Rgb(251, 242, 221),
        InvoiceStatus::Viewed => Color::Rgb(215, 231, 250),
        InvoiceStatus::Overdue => Color::Rgb(252, 225, 225),
        InvoiceStatus::Completed | InvoiceStatus::Paid => Color::Rgb(213, 237, 223),
        InvoiceStatus::Due | InvoiceStatus::Unpaid => Color::Rgb(248, 237, 203),
        InvoiceStatus::PartiallyPaid => Color::Rgb(215, 231, 250),
    }
}

pub fn status_text_color(status: InvoiceStatus) -> Color {
    match status {
        InvoiceStatus::Draft => Color::Rgb(116, 77, 12),
        InvoiceStatus::Sent => Color::Rgb(146, 101, 22),
        InvoiceStatus::Viewed => Color::Rgb(30, 64, 175),
        InvoiceStatus::Overdue => Color::Rgb(185, 28, 28),
        InvoiceStatus::Completed | InvoiceStatus::Paid => Color::Rgb(21, 128, 61),
        InvoiceStatus::Due | InvoiceStatus::Unpaid => Color::Rgb(116, 77, 12),
        InvoiceStatus::PartiallyPaid => Color::Rgb(30, 64, 175),
    }
}

/// Maps raw unpaid-invoice records to picker rows, preserving order.
///
/// Anything that is not a JSON array yields no rows. The currency shown on
/// every row is the one of the customer currently selected on the screen.
pub fn format_unpaid_invoices(items: &Value, currency: Option<&Currency>) -> Vec<InvoiceListItem> {
    let Some(items) = items.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            let status_raw = string_at(item, "status");
            let status = status_raw.as_deref().and_then(InvoiceStatus::parse);

            InvoiceListItem {
                title: item
                    .get("user")
                    .and_then(|user| user.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                subtitle: InvoiceSubtitle {
                    title: string_at(item, "invoice_number"),
                    label: status_raw,
                    label_bg: status.map(status_bg_color),
                    label_text: status.map(status_text_color),
                },
                amount: item.get("due_amount").and_then(Value::as_i64),
                currency: currency.cloned(),
                right_subtitle: string_at(item, "formattedDueDate"),
                full_item: item.clone(),
            }
        })
        .collect()
}

fn string_at(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
