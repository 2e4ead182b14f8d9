//! The payment form screen, independent of how it is drawn.
//!
//! [`PaymentScreen`] owns the form values and the cached customer/invoice
//! picks. Every handler that talks to the data layer takes the backend as an
//! argument, and every handler that drives a widget takes its handle.

pub mod backend;
pub mod custom_fields;
pub mod form;
pub mod handles;
pub mod invoices;
pub mod validate;
pub mod view;

#[cfg(test)]
pub(crate) mod fake;

use api_types::{
    Currency,
    custom_field::CustomField,
    customer::Customer,
    invoice::{Invoice, InvoiceToRecord},
    note::NoteTemplate,
    payment::{PaymentMethod, PaymentParams, ReceiptMail, SendReceipt},
};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value, json};

use crate::i18n::{Locale, t};

use self::{
    backend::{BackendError, PaymentBackend, ReceiptStatus},
    form::{CUSTOM_FIELDS, FormState, PAYMENT, fields, payment_path},
    handles::{MailHandle, SelectHandle},
    invoices::{InvoiceListItem, format_unpaid_invoices},
    validate::DATE_FORMAT,
};

/// How the screen was opened.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Add,
    Edit { id: i64 },
    RecordAgainstInvoice { invoice: InvoiceToRecord },
}

impl Mode {
    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    RemovePayment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Confirm(ConfirmAction),
}

/// A blocking message the user has to dismiss (or confirm).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: Option<String>,
    pub message: String,
    pub kind: AlertKind,
}

impl Alert {
    fn info(message: String) -> Self {
        Self {
            title: None,
            message,
            kind: AlertKind::Info,
        }
    }
}

/// Navigation requested by a handler; carried out by the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEffect {
    None,
    GoBack,
    OpenCustomerForm,
}

/// Entries of the overflow menu shown while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    Send,
    Remove,
}

impl PaymentAction {
    pub const MENU: [PaymentAction; 2] = [PaymentAction::Send, PaymentAction::Remove];

    pub fn key(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Remove => "remove",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::MENU.into_iter().find(|action| action.key() == key)
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Self::Send => "payments.sendReceipt",
            Self::Remove => "payments.removePayment",
        }
    }
}

pub fn today(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

#[derive(Debug)]
pub struct PaymentScreen {
    mode: Mode,
    phase: Phase,
    locale: Locale,
    timezone: Tz,
    form: FormState,
    selected_customer: Option<Customer>,
    selected_invoice: Option<Invoice>,
    custom_field_definitions: Option<Vec<CustomField>>,
    note_templates: Vec<NoteTemplate>,
    alert: Option<Alert>,
    receipt_sent: bool,
}

impl PaymentScreen {
    pub fn new(mode: Mode, locale: Locale, timezone: Tz) -> Self {
        Self {
            mode,
            phase: Phase::Loading,
            locale,
            timezone,
            form: FormState::new(),
            selected_customer: None,
            selected_invoice: None,
            custom_field_definitions: None,
            note_templates: Vec::new(),
            alert: None,
            receipt_sent: false,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Loading
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        self.selected_customer.as_ref()
    }

    pub fn selected_invoice(&self) -> Option<&Invoice> {
        self.selected_invoice.as_ref()
    }

    pub fn custom_field_definitions(&self) -> Option<&[CustomField]> {
        self.custom_field_definitions.as_deref()
    }

    pub fn note_templates(&self) -> &[NoteTemplate] {
        &self.note_templates
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn receipt_sent(&self) -> bool {
        self.receipt_sent
    }

    /// Currency of the selected customer, used for every amount on screen.
    pub fn currency(&self) -> Option<&Currency> {
        self.selected_customer
            .as_ref()
            .and_then(|customer| customer.currency.as_ref())
    }

    pub fn amount_precision(&self) -> u32 {
        self.currency().map_or(2, |currency| currency.precision)
    }

    pub fn amount(&self) -> Option<i64> {
        self.form.get_i64(&payment_path(fields::AMOUNT))
    }

    // ---- initialization -------------------------------------------------

    /// Fetches what the mode needs and fills the form. The phase turns
    /// `Ready` only once data has arrived; on failure it stays `Loading` and
    /// an alert is raised, so calling `load` again retries.
    pub async fn load<B: PaymentBackend>(&mut self, backend: &B) {
        self.phase = Phase::Loading;
        tracing::info!("loading payment form: {:?}", self.mode);

        let result = match self.mode.clone() {
            Mode::Edit { id } => self.load_detail(backend, id).await,
            Mode::Add | Mode::RecordAgainstInvoice { .. } => self.load_defaults(backend).await,
        };

        match result {
            Ok(()) => {
                self.load_note_templates(backend).await;
                self.phase = Phase::Ready;
            }
            Err(err) => {
                tracing::error!("failed to load payment form: {err}");
                self.alert = Some(Alert::info(t("validation.wrong", self.locale)));
            }
        }
    }

    async fn load_defaults<B: PaymentBackend>(&mut self, backend: &B) -> Result<(), BackendError> {
        let defaults = backend.create_defaults().await?;

        let mut values = Map::new();
        values.insert(fields::PREFIX.to_string(), json!(defaults.prefix));
        values.insert(fields::NUMBER.to_string(), json!(defaults.next_number));
        values.insert(
            fields::DATE.to_string(),
            json!(today(self.timezone).format(DATE_FORMAT).to_string()),
        );

        match backend.custom_fields().await {
            Ok(definitions) => {
                self.form
                    .set(CUSTOM_FIELDS, custom_fields::initial_entries(&definitions));
                self.custom_field_definitions = Some(definitions);
            }
            Err(err) => tracing::warn!("custom fields unavailable: {err}"),
        }

        if let Mode::RecordAgainstInvoice { invoice } = &self.mode {
            let invoice = invoice.clone();
            self.seed_from_invoice(values, invoice);
            return Ok(());
        }

        self.form.set(PAYMENT, Value::Object(values));
        Ok(())
    }

    fn seed_from_invoice(&mut self, mut values: Map<String, Value>, invoice: InvoiceToRecord) {
        let customer_id = invoice.user.as_ref().map(|user| user.id);
        let due_amount = invoice.due.as_ref().and_then(|due| due.due_amount);

        values.insert(fields::CUSTOMER.to_string(), json!(customer_id));
        values.insert(fields::INVOICE.to_string(), json!(invoice.id));
        values.insert(fields::AMOUNT.to_string(), json!(due_amount));
        values.insert("user".to_string(), json!(invoice.user));
        values.insert(
            "invoice".to_string(),
            json!({ "invoice_number": invoice.number }),
        );

        self.form.set(PAYMENT, Value::Object(values));
        self.selected_customer = invoice.user;
        self.selected_invoice = invoice.due;
    }

    async fn load_detail<B: PaymentBackend>(
        &mut self,
        backend: &B,
        id: i64,
    ) -> Result<(), BackendError> {
        let detail = backend.payment_detail(id).await?;

        let mut values = detail.payment;
        values.insert(fields::PREFIX.to_string(), json!(detail.payment_prefix));
        values.insert(
            fields::NUMBER.to_string(),
            json!(detail.next_payment_number),
        );

        self.selected_customer = values
            .get("user")
            .cloned()
            .and_then(|user| serde_json::from_value(user).ok());
        self.selected_invoice = values
            .get("invoice")
            .cloned()
            .and_then(|invoice| serde_json::from_value(invoice).ok());

        if let Some(payment_fields) = values.get("fields") {
            let (definitions, entries) = custom_fields::from_payment_fields(payment_fields);
            self.form.set(CUSTOM_FIELDS, entries);
            self.custom_field_definitions = Some(definitions);
        }

        self.form.set(PAYMENT, Value::Object(values));
        Ok(())
    }

    async fn load_note_templates<B: PaymentBackend>(&mut self, backend: &B) {
        match backend.note_templates().await {
            Ok(templates) => self.note_templates = templates,
            Err(err) => tracing::warn!("note templates unavailable: {err}"),
        }
    }

    // ---- field changes --------------------------------------------------

    /// Picks a customer. The invoice belongs to the previous customer, so it
    /// is dropped along with its display and the amount.
    pub fn on_select_customer(&mut self, customer: Customer, invoice_picker: &mut impl SelectHandle) {
        self.form
            .set(&payment_path(fields::CUSTOMER), json!(customer.id));
        self.form.set(&payment_path("user"), json!(customer));
        self.selected_customer = Some(customer);
        invoice_picker.set_display_value(None);
        self.form.set(&payment_path(fields::INVOICE), Value::Null);
        self.selected_invoice = None;
        self.form.set(&payment_path(fields::AMOUNT), Value::Null);
    }

    pub fn on_select_invoice(&mut self, invoice: Invoice) {
        self.form
            .set(&payment_path(fields::INVOICE), json!(invoice.id));
        self.form
            .set(&payment_path(fields::AMOUNT), json!(invoice.due_amount));
        self.selected_invoice = Some(invoice);
    }

    /// Selects the invoice behind a picker row.
    pub fn on_select_invoice_row(&mut self, row: &InvoiceListItem) {
        match serde_json::from_value::<Invoice>(row.full_item.clone()) {
            Ok(invoice) => self.on_select_invoice(invoice),
            Err(err) => tracing::warn!("unusable invoice row: {err}"),
        }
    }

    pub fn on_select_payment_method(&mut self, method: PaymentMethod) {
        self.form
            .set(&payment_path(fields::METHOD), json!(method.id));
        self.form.set(&payment_path("payment_method"), json!(method));
    }

    /// Receives a customer from the customer-creation form.
    pub fn on_customer_created(
        &mut self,
        customer: Customer,
        customer_picker: &mut impl SelectHandle,
        invoice_picker: &mut impl SelectHandle,
    ) {
        customer_picker.set_display_value(Some(customer.name.clone()));
        self.on_select_customer(customer, invoice_picker);
    }

    /// The customer-creation form only makes sense while the customer can
    /// still change.
    pub fn navigate_to_customer(&self) -> ScreenEffect {
        if self.mode.is_edit() {
            return ScreenEffect::None;
        }
        ScreenEffect::OpenCustomerForm
    }

    pub fn set_date(&mut self, date: String) {
        self.form.set(&payment_path(fields::DATE), json!(date));
        self.form.set(fields::DATE, json!(date));
    }

    pub fn set_amount(&mut self, amount: Option<i64>) {
        self.form
            .set(&payment_path(fields::AMOUNT), json!(amount));
    }

    pub fn set_amount_error(&mut self) {
        self.form
            .set_error(&payment_path(fields::AMOUNT), "validation.invalidAmount");
    }

    pub fn set_notes(&mut self, notes: String) {
        self.form.set(&payment_path(fields::NOTES), json!(notes));
    }

    /// Appends a note template to the notes field.
    pub fn insert_note_template(&mut self, template: &NoteTemplate) {
        let current = self
            .form
            .get_string(&payment_path(fields::NOTES))
            .unwrap_or_default();
        let notes = if current.trim().is_empty() {
            template.notes.clone()
        } else {
            format!("{current}\n{}", template.notes)
        };
        self.set_notes(notes);
    }

    /// Writes the value of the custom-field entry at `index`.
    pub fn set_custom_field_value(&mut self, index: usize, value: Value) {
        self.form.set(&format!("{CUSTOM_FIELDS}.{index}.value"), value);
    }

    pub fn custom_field_entries(&self) -> &[Value] {
        self.form
            .get(CUSTOM_FIELDS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rows for the unpaid-invoice picker.
    pub fn unpaid_invoice_rows(&self, raw: &Value) -> Vec<InvoiceListItem> {
        format_unpaid_invoices(raw, self.currency())
    }

    // ---- submission -----------------------------------------------------

    /// Request body built from the current form values.
    pub fn submission_params(&self) -> PaymentParams {
        let mut payment = self.form.payment().cloned().unwrap_or_default();
        let prefix = self
            .form
            .get_string(&payment_path(fields::PREFIX))
            .unwrap_or_default();
        let number = self
            .form
            .get_string(&payment_path(fields::NUMBER))
            .unwrap_or_default();
        payment.insert(fields::NUMBER.to_string(), json!(format!("{prefix}-{number}")));

        PaymentParams {
            fields: payment,
            custom_fields: custom_fields::api_formatted(self.form.get(CUSTOM_FIELDS)),
        }
    }

    /// Validates and sends the form. Does nothing while loading; never
    /// reaches the backend when a local check fails.
    pub async fn submit<B: PaymentBackend>(&mut self, backend: &B) -> ScreenEffect {
        if self.is_loading() {
            return ScreenEffect::None;
        }

        self.form.clear_errors();
        let missing = validate::required_fields(&self.form);
        if !missing.is_empty() {
            for (path, key) in missing {
                self.form.set_error(&path, key);
            }
            return ScreenEffect::None;
        }

        let params = self.submission_params();

        if let Some(invoice) = &self.selected_invoice {
            let amount = self.amount().unwrap_or(0);
            if let Err(err) = validate::check_amount(amount, invoice) {
                tracing::debug!("payment rejected locally: {err}");
                self.alert = Some(Alert::info(t("payments.alertAmount", self.locale)));
                return ScreenEffect::None;
            }
        }

        let result = match &self.mode {
            Mode::Edit { id } => backend.update_payment(*id, &params).await,
            Mode::Add | Mode::RecordAgainstInvoice { .. } => backend.create_payment(&params).await,
        };

        match result {
            Ok(()) => {
                tracing::info!("payment saved");
                ScreenEffect::GoBack
            }
            Err(err) => {
                self.on_submission_error(&err);
                ScreenEffect::None
            }
        }
    }

    fn on_submission_error(&mut self, err: &BackendError) {
        tracing::warn!("payment submission failed: {err}");
        if err.has_field(fields::NUMBER) {
            self.form
                .set_error(&payment_path(fields::NUMBER), "validation.alreadyTaken");
            return;
        }
        self.alert = Some(Alert::info(t("validation.wrong", self.locale)));
    }

    // ---- overflow menu, alerts, receipt ---------------------------------

    /// Runs an overflow-menu action by key. Unknown keys are ignored.
    pub fn on_option_select(&mut self, key: &str, mail: &mut impl MailHandle) {
        match PaymentAction::from_key(key) {
            Some(PaymentAction::Remove) => self.remove_payment(),
            Some(PaymentAction::Send) => mail.toggle(),
            None => tracing::debug!("ignoring menu action {key:?}"),
        }
    }

    fn remove_payment(&mut self) {
        self.alert = Some(Alert {
            title: Some(t("alert.title", self.locale)),
            message: t("payments.alertDescription", self.locale),
            kind: AlertKind::Confirm(ConfirmAction::RemovePayment),
        });
    }

    /// Accepts the open alert, running its action when it has one.
    pub async fn confirm_alert<B: PaymentBackend>(&mut self, backend: &B) -> ScreenEffect {
        let Some(alert) = self.alert.take() else {
            return ScreenEffect::None;
        };
        let AlertKind::Confirm(ConfirmAction::RemovePayment) = alert.kind else {
            return ScreenEffect::None;
        };
        let Mode::Edit { id } = self.mode else {
            return ScreenEffect::None;
        };

        match backend.delete_payment(id).await {
            Ok(()) => {
                tracing::info!("payment {id} removed");
                ScreenEffect::GoBack
            }
            Err(err) => {
                tracing::warn!("failed to remove payment {id}: {err}");
                self.alert = Some(Alert::info(t("validation.wrong", self.locale)));
                ScreenEffect::None
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Initial values of the receipt composer.
    pub fn mail_defaults(&self) -> ReceiptMail {
        let to = self
            .form
            .get_string(&payment_path("user.email"))
            .or_else(|| {
                self.selected_customer
                    .as_ref()
                    .and_then(|customer| customer.email.clone())
            })
            .unwrap_or_default();
        ReceiptMail {
            from: None,
            to,
            subject: t("mail.defaultSubject", self.locale),
            body: t("mail.defaultBody", self.locale),
        }
    }

    /// Sends the receipt of the payment being edited.
    pub async fn send_email<B: PaymentBackend>(
        &mut self,
        mail: ReceiptMail,
        backend: &B,
    ) -> Option<ReceiptStatus> {
        let Mode::Edit { id } = self.mode else {
            return None;
        };

        match backend.send_receipt(&SendReceipt { mail, id }).await {
            Ok(status) => {
                tracing::info!("receipt for payment {id}: {status:?}");
                if status == ReceiptStatus::Sent {
                    self.receipt_sent = true;
                }
                Some(status)
            }
            Err(err) => {
                tracing::warn!("failed to send receipt for payment {id}: {err}");
                self.alert = Some(Alert::info(t("validation.wrong", self.locale)));
                None
            }
        }
    }

    pub fn go_back(&self) -> ScreenEffect {
        ScreenEffect::GoBack
    }
}
