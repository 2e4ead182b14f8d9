use api_types::custom_field::CustomField;
use serde_json::Value;

use crate::i18n::{Locale, t};

use super::{
    Alert, PaymentAction, PaymentScreen,
    form::{CUSTOM_FIELDS, FormState, fields, payment_path},
    validate::format_amount,
};

/// Fields of the screen, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Date,
    Number,
    Customer,
    Invoice,
    Amount,
    Method,
    Notes,
    Custom(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub id: FieldId,
    pub label: String,
    pub value: Option<String>,
    pub placeholder: Option<String>,
    pub editable: bool,
    pub required: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuOption {
    pub label: String,
    /// `None` for the cancel entry.
    pub action: Option<PaymentAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverflowMenu {
    pub options: Vec<MenuOption>,
    pub destructive_index: usize,
    pub cancel_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentView {
    pub title: String,
    pub show_save_icon: bool,
    pub menu: Option<OverflowMenu>,
    pub show_mail_composer: bool,
    pub loading: bool,
    /// Content is dimmed while an external request runs.
    pub dimmed: bool,
    pub fields: Vec<FieldView>,
    pub show_custom_fields: bool,
    pub submit_label: String,
    pub submit_loading: bool,
    pub alert: Option<Alert>,
}

/// Text currently shown by the select fields. Widgets own it, so the
/// caller passes it in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectDisplays<'a> {
    pub customer: Option<&'a str>,
    pub invoice: Option<&'a str>,
    pub method: Option<&'a str>,
}

pub fn overflow_menu(locale: Locale) -> OverflowMenu {
    let mut options: Vec<MenuOption> = PaymentAction::MENU
        .into_iter()
        .map(|action| MenuOption {
            label: t(action.label_key(), locale),
            action: Some(action),
        })
        .collect();
    options.push(MenuOption {
        label: t("button.cancel", locale),
        action: None,
    });

    OverflowMenu {
        options,
        destructive_index: 1,
        cancel_index: 2,
    }
}

/// Builds the view tree of the screen. `external_loading` is set while the
/// event loop waits on a backend call.
pub fn payment_view(
    screen: &PaymentScreen,
    displays: SelectDisplays<'_>,
    external_loading: bool,
) -> PaymentView {
    let locale = screen.locale();
    let form = screen.form();
    let is_edit = screen.mode().is_edit();

    let show_custom_fields = if is_edit {
        form.payment().is_some_and(|payment| payment.contains_key("fields"))
    } else {
        screen.custom_field_definitions().is_some()
    };

    let menu = (is_edit && !screen.is_loading()).then(|| overflow_menu(locale));

    let title_key = if is_edit {
        "header.editPayment"
    } else {
        "header.addPayment"
    };

    let mut fields = vec![
        FieldView {
            id: FieldId::Date,
            label: t("payments.date", locale),
            value: form.get_string(&payment_path(fields::DATE)),
            placeholder: None,
            editable: true,
            required: true,
            error: field_error(form, fields::DATE, locale),
        },
        FieldView {
            id: FieldId::Number,
            label: t("payments.number", locale),
            value: Some(number_display(form)),
            placeholder: None,
            editable: false,
            required: true,
            error: field_error(form, fields::NUMBER, locale),
        },
        FieldView {
            id: FieldId::Customer,
            label: t("payments.customer", locale),
            value: displays.customer.map(str::to_string),
            placeholder: Some(t("payments.customerPlaceholder", locale)),
            editable: !is_edit,
            required: true,
            error: field_error(form, fields::CUSTOMER, locale),
        },
        FieldView {
            id: FieldId::Invoice,
            label: t("payments.invoice", locale),
            value: displays.invoice.map(str::to_string),
            placeholder: Some(t("payments.invoicePlaceholder", locale)),
            editable: !is_edit,
            required: true,
            error: field_error(form, fields::INVOICE, locale),
        },
        FieldView {
            id: FieldId::Amount,
            label: t("payments.amount", locale),
            value: screen
                .amount()
                .map(|amount| amount_display(screen, amount)),
            placeholder: None,
            editable: true,
            required: true,
            error: field_error(form, fields::AMOUNT, locale),
        },
        FieldView {
            id: FieldId::Method,
            label: t("payments.mode", locale),
            value: displays.method.map(str::to_string),
            placeholder: Some(t("payments.modePlaceholder", locale)),
            editable: true,
            required: false,
            error: field_error(form, fields::METHOD, locale),
        },
        FieldView {
            id: FieldId::Notes,
            label: t("payments.notes", locale),
            value: form.get_string(&payment_path(fields::NOTES)),
            placeholder: None,
            editable: true,
            required: false,
            error: None,
        },
    ];

    if show_custom_fields {
        let definitions = screen.custom_field_definitions().unwrap_or_default();
        fields.extend(
            screen
                .custom_field_entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| custom_field_view(index, entry, definitions, form)),
        );
    }

    PaymentView {
        title: t(title_key, locale),
        show_save_icon: !is_edit,
        menu,
        show_mail_composer: is_edit,
        loading: screen.is_loading() || form.is_empty() || external_loading,
        dimmed: external_loading,
        fields,
        show_custom_fields,
        submit_label: t("button.save", locale),
        submit_loading: external_loading,
        alert: screen.alert().cloned(),
    }
}

fn number_display(form: &FormState) -> String {
    let prefix = form
        .get_string(&payment_path(fields::PREFIX))
        .unwrap_or_default();
    let number = form
        .get_string(&payment_path(fields::NUMBER))
        .unwrap_or_default();
    format!("{prefix}-{number}")
}

fn amount_display(screen: &PaymentScreen, amount: i64) -> String {
    match screen.currency() {
        Some(currency) => currency.format_minor(amount),
        None => format_amount(amount, screen.amount_precision()),
    }
}

fn field_error(form: &FormState, field: &str, locale: Locale) -> Option<String> {
    form.error(&payment_path(field)).map(|key| t(key, locale))
}

fn custom_field_view(
    index: usize,
    entry: &Value,
    definitions: &[CustomField],
    form: &FormState,
) -> FieldView {
    let id = entry.get("id").and_then(Value::as_i64);
    let definition = id.and_then(|id| definitions.iter().find(|def| def.id == id));
    let path = format!("{CUSTOM_FIELDS}.{index}.value");

    FieldView {
        id: FieldId::Custom(index),
        label: definition
            .map(|def| def.label.clone())
            .unwrap_or_else(|| format!("#{}", id.unwrap_or_default())),
        value: form.get_string(&path),
        placeholder: None,
        editable: true,
        required: definition.is_some_and(|def| def.is_required),
        error: form.error(&path).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::Europe::Rome;

    use super::*;
    use crate::payment::{
        Mode,
        fake::{FakeBackend, FakeHandle},
    };

    fn field<'a>(view: &'a PaymentView, id: FieldId) -> &'a FieldView {
        view.fields
            .iter()
            .find(|field| field.id == id)
            .unwrap_or_else(|| panic!("missing field {id:?}"))
    }

    #[test]
    fn fresh_screen_shows_loading() {
        let screen = PaymentScreen::new(Mode::Add, Locale::En, Rome);
        let view = payment_view(&screen, SelectDisplays::default(), false);
        assert!(view.loading);
        assert!(view.menu.is_none());
    }

    #[tokio::test]
    async fn add_mode_view() {
        let backend = FakeBackend::default();
        let mut screen = PaymentScreen::new(Mode::Add, Locale::En, Rome);
        screen.load(&backend).await;

        let view = payment_view(&screen, SelectDisplays::default(), false);

        assert_eq!(view.title, "Add Payment");
        assert!(view.show_save_icon);
        assert!(view.menu.is_none());
        assert!(!view.show_mail_composer);
        assert!(!view.loading);
        assert!(field(&view, FieldId::Customer).editable);
        assert!(field(&view, FieldId::Invoice).editable);
        assert!(!field(&view, FieldId::Number).editable);
        assert_eq!(
            field(&view, FieldId::Number).value.as_deref(),
            Some("PAY--000002")
        );
        assert!(view.show_custom_fields);
        assert_eq!(field(&view, FieldId::Custom(0)).label, "Reference");
    }

    #[tokio::test]
    async fn edit_mode_view() {
        let backend = FakeBackend::edit_fixture();
        let mut screen = PaymentScreen::new(Mode::Edit { id: 42 }, Locale::En, Rome);
        screen.load(&backend).await;
        let displays = SelectDisplays {
            customer: Some("Acme"),
            invoice: Some("INV-000009"),
            method: None,
        };

        let view = payment_view(&screen, displays, false);

        assert_eq!(view.title, "Edit Payment");
        assert!(!view.show_save_icon);
        assert!(view.show_mail_composer);
        let menu = view.menu.as_ref().map(|menu| {
            (
                menu.options.len(),
                menu.destructive_index,
                menu.cancel_index,
                menu.options[1].action,
            )
        });
        assert_eq!(menu, Some((3, 1, 2, Some(PaymentAction::Remove))));
        assert!(!field(&view, FieldId::Customer).editable);
        assert!(!field(&view, FieldId::Invoice).editable);
        assert!(field(&view, FieldId::Amount).editable);
        assert_eq!(field(&view, FieldId::Customer).value.as_deref(), Some("Acme"));
        assert_eq!(field(&view, FieldId::Amount).value.as_deref(), Some("1.00"));
        assert!(view.show_custom_fields);
    }

    #[tokio::test]
    async fn external_loading_overlays_and_dims() {
        let backend = FakeBackend::default();
        let mut screen = PaymentScreen::new(Mode::Add, Locale::En, Rome);
        screen.load(&backend).await;

        let view = payment_view(&screen, SelectDisplays::default(), true);

        assert!(view.loading);
        assert!(view.dimmed);
        assert!(view.submit_loading);
    }

    #[tokio::test]
    async fn field_errors_are_translated() {
        let backend = FakeBackend::default();
        let mut screen = PaymentScreen::new(Mode::Add, Locale::It, Rome);
        screen.load(&backend).await;
        let mut picker = FakeHandle::default();
        screen.on_select_customer(
            api_types::customer::Customer {
                id: 7,
                name: "Acme".to_string(),
                email: None,
                currency: None,
            },
            &mut picker,
        );

        screen.submit(&backend).await;
        let view = payment_view(&screen, SelectDisplays::default(), false);

        assert_eq!(
            field(&view, FieldId::Amount).error.as_deref(),
            Some("Campo obbligatorio")
        );
        assert_eq!(
            field(&view, FieldId::Invoice).error.as_deref(),
            Some("Campo obbligatorio")
        );
        assert_eq!(field(&view, FieldId::Customer).error, None);
    }
}
