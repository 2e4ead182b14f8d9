use std::collections::BTreeMap;

use api_types::invoice::Invoice;
use chrono::NaiveDate;
use thiserror::Error;

use super::form::{FormState, fields, payment_path};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount {amount} is greater than the due amount {due}")]
    ExceedsDue { amount: i64, due: i64 },
    #[error("amount {amount} is greater than the invoice subtotal {sub_total}")]
    ExceedsSubTotal { amount: i64, sub_total: i64 },
    #[error("amount is not a number")]
    Invalid,
    #[error("amount has more than {0} decimals")]
    TooManyDecimals(u32),
}

/// Checks an entered amount against the invoice it pays.
///
/// An invoice with nothing due (`due_amount == 0`) caps the payment at its
/// subtotal; otherwise the due amount is the cap. Missing amounts count as 0.
pub fn check_amount(amount: i64, invoice: &Invoice) -> Result<(), AmountError> {
    let due = invoice.due_amount.unwrap_or(0);
    let sub_total = invoice.sub_total.unwrap_or(0);

    if due != 0 && amount > due {
        return Err(AmountError::ExceedsDue { amount, due });
    }
    if due == 0 && amount > sub_total {
        return Err(AmountError::ExceedsSubTotal { amount, sub_total });
    }
    Ok(())
}

/// Parses a typed amount into minor units. Accepts `.` or `,` as decimal
/// separator and rejects more decimals than `precision`.
pub fn parse_amount(raw: &str, precision: u32) -> Result<i64, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Invalid);
    }
    let normalized = trimmed.replace(',', ".");
    let (whole, frac) = match normalized.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (normalized.as_str(), ""),
    };
    if frac.len() > precision as usize {
        return Err(AmountError::TooManyDecimals(precision));
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit())
        || !frac.chars().all(|ch| ch.is_ascii_digit())
        || (whole.is_empty() && frac.is_empty())
    {
        return Err(AmountError::Invalid);
    }

    let scale = 10i64.checked_pow(precision).ok_or(AmountError::Invalid)?;
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Invalid)?
    };
    let frac_digits = format!("{frac:0<width$}", width = precision as usize);
    let frac: i64 = if frac_digits.is_empty() {
        0
    } else {
        frac_digits.parse().map_err(|_| AmountError::Invalid)?
    };

    whole
        .checked_mul(scale)
        .and_then(|value| value.checked_add(frac))
        .ok_or(AmountError::Invalid)
}

/// Renders minor units back into the editable text form.
pub fn format_amount(amount_minor: i64, precision: u32) -> String {
    if precision == 0 {
        return amount_minor.to_string();
    }
    // Precisions past what an i64 can scale fall back to cents.
    let (precision, scale) = match 10i64.checked_pow(precision) {
        Some(scale) => (precision, scale),
        None => (2, 100),
    };
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    let scale = scale.unsigned_abs();
    let width = precision as usize;
    format!("{sign}{}.{:0width$}", abs / scale, abs % scale)
}

/// Field checks that run before the submit handler sees the values. The
/// number is derived from server defaults and is not checked here.
///
/// Returns translation keys keyed by the dotted path of the failing field.
pub fn required_fields(form: &FormState) -> BTreeMap<String, &'static str> {
    let mut errors = BTreeMap::new();

    for field in [fields::DATE, fields::CUSTOMER, fields::INVOICE, fields::AMOUNT] {
        let path = payment_path(field);
        let present = form
            .get_string(&path)
            .is_some_and(|value| !value.trim().is_empty());
        if !present {
            errors.insert(path, "validation.required");
        }
    }

    let date_path = payment_path(fields::DATE);
    if let Some(date) = form.get_string(&date_path) {
        let date = date.trim();
        if !date.is_empty() && NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            errors.insert(date_path, "validation.invalidDate");
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn invoice(due: Option<i64>, sub_total: Option<i64>) -> Invoice {
        Invoice {
            id: 1,
            due_amount: due,
            sub_total,
            ..Invoice::default()
        }
    }

    #[test]
    fn nothing_due_caps_at_sub_total() {
        let inv = invoice(Some(0), Some(80));
        assert!(check_amount(80, &inv).is_ok());
        assert!(check_amount(0, &inv).is_ok());
        assert_eq!(
            check_amount(81, &inv),
            Err(AmountError::ExceedsSubTotal {
                amount: 81,
                sub_total: 80
            })
        );
    }

    #[test]
    fn positive_due_caps_at_due() {
        let inv = invoice(Some(50), Some(80));
        assert!(check_amount(50, &inv).is_ok());
        assert_eq!(
            check_amount(60, &inv),
            Err(AmountError::ExceedsDue { amount: 60, due: 50 })
        );
    }

    #[test]
    fn missing_amounts_count_as_zero() {
        let inv = invoice(None, None);
        assert!(check_amount(0, &inv).is_ok());
        assert!(check_amount(1, &inv).is_err());
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(parse_amount("10", 2), Ok(1000));
        assert_eq!(parse_amount("10.5", 2), Ok(1050));
        assert_eq!(parse_amount("10,50", 2), Ok(1050));
        assert_eq!(parse_amount(" .5 ", 2), Ok(50));
        assert_eq!(parse_amount("7", 0), Ok(7));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_amount("", 2), Err(AmountError::Invalid));
        assert_eq!(parse_amount("1a", 2), Err(AmountError::Invalid));
        assert_eq!(parse_amount("-3", 2), Err(AmountError::Invalid));
        assert_eq!(parse_amount(".", 2), Err(AmountError::Invalid));
        assert_eq!(parse_amount("1.234", 2), Err(AmountError::TooManyDecimals(2)));
    }

    #[test]
    fn format_round_trips_editable_text() {
        assert_eq!(format_amount(1050, 2), "10.50");
        assert_eq!(format_amount(5, 2), "0.05");
        assert_eq!(format_amount(12, 0), "12");
    }

    #[test]
    fn oversized_precision_does_not_overflow() {
        assert_eq!(parse_amount("1", 19), Err(AmountError::Invalid));
        assert_eq!(parse_amount("1", 30), Err(AmountError::Invalid));
        assert_eq!(format_amount(150, 19), "1.50");
        assert_eq!(format_amount(-5, 40), "-0.05");
        assert_eq!(format_amount(i64::MIN, 2), "-92233720368547758.08");
    }

    #[test]
    fn required_fields_reports_missing_and_bad_date() {
        let mut form = FormState::new();
        form.set(
            "payment",
            json!({
                "payment_date": "19/10/2026",
                "payment_number": "",
                "customer_id": 3,
                "amount": null,
            }),
        );

        let errors = required_fields(&form);
        assert_eq!(
            errors.get("payment.payment_date"),
            Some(&"validation.invalidDate")
        );
        assert_eq!(errors.get("payment.amount"), Some(&"validation.required"));
        assert_eq!(
            errors.get("payment.invoice_id"),
            Some(&"validation.required")
        );
        assert!(!errors.contains_key("payment.customer_id"));
        assert!(!errors.contains_key("payment.payment_number"));
    }
}
