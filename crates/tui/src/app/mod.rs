use std::time::Duration;

use api_types::{
    custom_field::{CustomField, CustomFieldKind},
    customer::{Customer, CustomerNew},
    note::NoteTemplate,
    payment::PaymentMethod,
};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use serde_json::{Value, json};

use crate::{
    client::Client,
    config::AppConfig,
    error::{AppError, Result},
    i18n::{Locale, t},
    payment::{
        Mode, PaymentScreen, ScreenEffect,
        backend::{PaymentBackend, ReceiptStatus},
        form::{CUSTOM_FIELDS, fields, payment_path},
        handles::SelectHandle,
        invoices::InvoiceListItem,
        validate::{format_amount, parse_amount},
        view::{FieldId, PaymentView, SelectDisplays, payment_view},
    },
    ui::{
        self,
        components::{
            customer_form::CustomerForm,
            mail::{MailComposer, MailField},
            picker::{Fetch, Picker},
        },
        keymap::{AppAction, map_key},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastState {
    pub message: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Customer,
    Invoice,
    Method,
    Note,
}

/// Work that waits on the backend. The event loop draws once with the task
/// queued, then awaits it before reading the next key.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Load,
    Submit,
    ConfirmAlert,
    SendReceipt,
    CreateCustomer(CustomerNew),
    Fetch(PickerKind, Fetch),
}

impl Task {
    fn blocks_form(&self) -> bool {
        !matches!(self, Self::Fetch(..))
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: PaymentScreen,
    pub focus: usize,
    pub amount_input: String,
    pub customers: Picker<Customer>,
    pub invoices: Picker<InvoiceListItem>,
    pub methods: Picker<PaymentMethod>,
    pub notes: Picker<NoteTemplate>,
    pub mail: MailComposer,
    pub menu: Option<usize>,
    pub customer_form: Option<CustomerForm>,
    pub toast: Option<ToastState>,
    pending: Option<Task>,
}

impl AppState {
    pub fn new(mode: Mode, locale: Locale, timezone: Tz, page_size: u32) -> Self {
        Self {
            screen: PaymentScreen::new(mode, locale, timezone),
            focus: 0,
            amount_input: String::new(),
            customers: Picker::remote("customers.title", page_size),
            invoices: Picker::remote("invoices.title", page_size),
            methods: Picker::remote("payments.mode", page_size),
            notes: Picker::local("notes.title"),
            mail: MailComposer::default(),
            menu: None,
            customer_form: None,
            toast: None,
            pending: Some(Task::Load),
        }
    }

    pub fn locale(&self) -> Locale {
        self.screen.locale()
    }

    pub fn displays(&self) -> SelectDisplays<'_> {
        SelectDisplays {
            customer: self.customers.display(),
            invoice: self.invoices.display(),
            method: self.methods.display(),
        }
    }

    /// True while a save, delete, send or load is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.as_ref().is_some_and(Task::blocks_form)
    }

    pub fn view(&self) -> PaymentView {
        payment_view(&self.screen, self.displays(), self.is_busy())
    }

    pub fn focused(&self, view: &PaymentView) -> Option<FieldId> {
        view.fields.get(self.focus).map(|field| field.id)
    }

    pub fn take_task(&mut self) -> Option<Task> {
        self.pending.take()
    }

    fn queue(&mut self, task: Task) {
        self.pending = Some(task);
    }

    fn toast(&mut self, key: &str, is_error: bool) {
        self.toast = Some(ToastState {
            message: t(key, self.locale()),
            is_error,
        });
    }

    // ---- keys -------------------------------------------------------------

    /// Applies one key. Ignored while a task is queued, so a save can never
    /// be sent twice.
    pub fn handle(&mut self, action: AppAction) -> ScreenEffect {
        if self.pending.is_some() {
            return ScreenEffect::None;
        }
        if action != AppAction::None {
            self.toast = None;
        }

        let effect = if self.screen.alert().is_some() {
            self.alert_key(action);
            ScreenEffect::None
        } else if self.customer_form.is_some() {
            self.customer_form_key(action);
            ScreenEffect::None
        } else if self.mail.is_open() {
            self.mail_key(action);
            ScreenEffect::None
        } else if let Some(selected) = self.menu {
            self.menu_key(action, selected);
            ScreenEffect::None
        } else if let Some(kind) = self.open_picker() {
            self.picker_key(kind, action)
        } else {
            self.form_key(action)
        };

        self.queue_fetches();
        self.apply(effect)
    }

    /// Handles screen-local effects and returns the rest to the caller.
    fn apply(&mut self, effect: ScreenEffect) -> ScreenEffect {
        match effect {
            ScreenEffect::OpenCustomerForm => {
                self.customers.close();
                self.customer_form = Some(CustomerForm::default());
                ScreenEffect::None
            }
            other => other,
        }
    }

    fn queue_fetches(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let fetch = [
            (PickerKind::Customer, self.customers.take_fetch()),
            (PickerKind::Invoice, self.invoices.take_fetch()),
            (PickerKind::Method, self.methods.take_fetch()),
        ]
        .into_iter()
        .find_map(|(kind, fetch)| fetch.map(|fetch| Task::Fetch(kind, fetch)));
        self.pending = fetch;
    }

    fn open_picker(&self) -> Option<PickerKind> {
        if self.customers.is_open() {
            Some(PickerKind::Customer)
        } else if self.invoices.is_open() {
            Some(PickerKind::Invoice)
        } else if self.methods.is_open() {
            Some(PickerKind::Method)
        } else if self.notes.is_open() {
            Some(PickerKind::Note)
        } else {
            None
        }
    }

    fn alert_key(&mut self, action: AppAction) {
        match action {
            AppAction::Submit => self.queue(Task::ConfirmAlert),
            AppAction::Cancel => self.screen.dismiss_alert(),
            _ => {}
        }
    }

    fn customer_form_key(&mut self, action: AppAction) {
        let locale = self.locale();
        let Some(form) = self.customer_form.as_mut() else {
            return;
        };
        match action {
            AppAction::Cancel => self.customer_form = None,
            AppAction::NextField | AppAction::PrevField | AppAction::Up | AppAction::Down => {
                form.next_field()
            }
            AppAction::Backspace => {
                form.field_mut().pop();
            }
            AppAction::Input(ch) => form.field_mut().push(ch),
            AppAction::Submit | AppAction::Save => match form.request() {
                Some(request) => self.queue(Task::CreateCustomer(request)),
                None => form.message = Some(t("validation.required", locale)),
            },
            _ => {}
        }
    }

    fn mail_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => self.mail.close(),
            AppAction::NextField | AppAction::PrevField => self.mail.next_field(),
            AppAction::Backspace => {
                self.mail.field_mut().pop();
            }
            AppAction::Input(ch) => self.mail.field_mut().push(ch),
            AppAction::Submit if self.mail.focus == MailField::Body => {
                self.mail.body.push('\n')
            }
            AppAction::Submit => self.mail.next_field(),
            AppAction::Save => self.queue(Task::SendReceipt),
            _ => {}
        }
    }

    fn menu_key(&mut self, action: AppAction, selected: usize) {
        let Some(menu) = self.view().menu else {
            self.menu = None;
            return;
        };
        match action {
            AppAction::Up => self.menu = Some(selected.saturating_sub(1)),
            AppAction::Down => {
                self.menu = Some((selected + 1).min(menu.options.len().saturating_sub(1)))
            }
            AppAction::Cancel => self.menu = None,
            AppAction::Submit => {
                self.menu = None;
                let Some(action) = menu.options.get(selected).and_then(|option| option.action)
                else {
                    return;
                };
                let was_open = self.mail.is_open();
                self.screen.on_option_select(action.key(), &mut self.mail);
                if !was_open && self.mail.is_open() {
                    self.mail.fill(self.screen.mail_defaults());
                }
            }
            _ => {}
        }
    }

    fn picker_key(&mut self, kind: PickerKind, action: AppAction) -> ScreenEffect {
        if kind == PickerKind::Customer && action == AppAction::Create {
            return self.screen.navigate_to_customer();
        }
        match kind {
            PickerKind::Customer => {
                if let Some(customer) = navigate(&mut self.customers, action) {
                    self.customers
                        .set_display_value(Some(customer.name.clone()));
                    self.screen
                        .on_select_customer(customer, &mut self.invoices);
                    self.invoices.clear();
                    self.sync_amount_input();
                }
            }
            PickerKind::Invoice => {
                if let Some(row) = navigate(&mut self.invoices, action) {
                    self.invoices.set_display_value(row.subtitle.title.clone());
                    self.screen.on_select_invoice_row(&row);
                    self.sync_amount_input();
                }
            }
            PickerKind::Method => {
                if let Some(method) = navigate(&mut self.methods, action) {
                    self.methods.set_display_value(Some(method.name.clone()));
                    self.screen.on_select_payment_method(method);
                }
            }
            PickerKind::Note => {
                if let Some(template) = navigate(&mut self.notes, action) {
                    self.screen.insert_note_template(&template);
                }
            }
        }
        ScreenEffect::None
    }

    fn form_key(&mut self, action: AppAction) -> ScreenEffect {
        match action {
            AppAction::Cancel => return self.screen.go_back(),
            AppAction::Reload => {
                if self.screen.is_loading() {
                    self.queue(Task::Load);
                }
                return ScreenEffect::None;
            }
            _ => {}
        }
        if self.screen.is_loading() {
            return ScreenEffect::None;
        }

        let view = self.view();
        let count = view.fields.len();
        let focused = self.focused(&view);
        let editable = view
            .fields
            .get(self.focus)
            .is_some_and(|field| field.editable);

        match action {
            AppAction::Save => self.queue(Task::Submit),
            AppAction::Menu => {
                if view.menu.is_some() {
                    self.menu = Some(0);
                }
            }
            AppAction::NextField | AppAction::Down => self.focus = (self.focus + 1) % count.max(1),
            AppAction::PrevField | AppAction::Up => {
                self.focus = (self.focus + count.max(1) - 1) % count.max(1)
            }
            AppAction::Template => {
                if focused == Some(FieldId::Notes) && !self.screen.note_templates().is_empty() {
                    self.notes.set_items(self.screen.note_templates().to_vec());
                    self.notes.open();
                }
            }
            AppAction::Create => {
                if focused == Some(FieldId::Customer) {
                    return self.screen.navigate_to_customer();
                }
            }
            AppAction::Submit => match focused {
                Some(FieldId::Customer) if editable => self.customers.open(),
                Some(FieldId::Invoice) if editable => self.invoices.open(),
                Some(FieldId::Method) => self.methods.open(),
                Some(FieldId::Custom(index)) if self.custom_choice(index) => {}
                _ => self.focus = (self.focus + 1) % count.max(1),
            },
            AppAction::Backspace => {
                if let Some(id) = focused {
                    self.edit_text(id, |text| {
                        text.pop();
                    });
                }
            }
            AppAction::Input(ch) => {
                if let Some(id) = focused {
                    self.edit_text(id, |text| text.push(ch));
                }
            }
            _ => {}
        }
        ScreenEffect::None
    }

    // ---- field editing ------------------------------------------------------

    fn edit_text(&mut self, id: FieldId, edit: impl FnOnce(&mut String)) {
        let form = self.screen.form();
        match id {
            FieldId::Date => {
                let mut date = form
                    .get_string(&payment_path(fields::DATE))
                    .unwrap_or_default();
                edit(&mut date);
                self.screen.set_date(date);
            }
            FieldId::Notes => {
                let mut notes = form
                    .get_string(&payment_path(fields::NOTES))
                    .unwrap_or_default();
                edit(&mut notes);
                self.screen.set_notes(notes);
            }
            FieldId::Amount => {
                edit(&mut self.amount_input);
                self.apply_amount_input();
            }
            FieldId::Custom(index) => {
                let kind = self.custom_definition(index).map(|def| def.kind);
                if matches!(kind, Some(CustomFieldKind::Switch | CustomFieldKind::Dropdown)) {
                    return;
                }
                let mut value = form
                    .get_string(&format!("{CUSTOM_FIELDS}.{index}.value"))
                    .unwrap_or_default();
                edit(&mut value);
                self.screen.set_custom_field_value(index, json!(value));
            }
            FieldId::Number | FieldId::Customer | FieldId::Invoice | FieldId::Method => {}
        }
    }

    fn apply_amount_input(&mut self) {
        let raw = self.amount_input.trim();
        if raw.is_empty() {
            self.screen.set_amount(None);
            return;
        }
        match parse_amount(raw, self.screen.amount_precision()) {
            Ok(amount) => self.screen.set_amount(Some(amount)),
            Err(err) => {
                tracing::debug!("amount input {raw:?} rejected: {err}");
                self.screen.set_amount(None);
                self.screen.set_amount_error();
            }
        }
    }

    fn sync_amount_input(&mut self) {
        let precision = self.screen.amount_precision();
        self.amount_input = self
            .screen
            .amount()
            .map(|amount| format_amount(amount, precision))
            .unwrap_or_default();
    }

    fn custom_definition(&self, index: usize) -> Option<&CustomField> {
        let id = self
            .screen
            .custom_field_entries()
            .get(index)?
            .get("id")?
            .as_i64()?;
        self.screen
            .custom_field_definitions()?
            .iter()
            .find(|def| def.id == id)
    }

    /// Toggles a switch or cycles a dropdown. False for free-text fields.
    fn custom_choice(&mut self, index: usize) -> bool {
        let Some(definition) = self.custom_definition(index).cloned() else {
            return false;
        };
        let path = format!("{CUSTOM_FIELDS}.{index}.value");
        let current = self.screen.form().get(&path).cloned().unwrap_or(Value::Null);

        let next = match definition.kind {
            CustomFieldKind::Switch => {
                let on = match &current {
                    Value::Bool(flag) => *flag,
                    Value::String(text) => text == "1" || text == "true",
                    Value::Number(number) => number.as_i64() == Some(1),
                    _ => false,
                };
                json!(!on)
            }
            CustomFieldKind::Dropdown if !definition.options.is_empty() => {
                let position = current
                    .as_str()
                    .and_then(|value| definition.options.iter().position(|opt| opt == value));
                let next = position.map_or(0, |position| (position + 1) % definition.options.len());
                json!(definition.options[next])
            }
            _ => return false,
        };
        self.screen.set_custom_field_value(index, next);
        true
    }

    // ---- tasks ----------------------------------------------------------------

    /// Runs a queued task against `backend`.
    pub async fn run<B: PaymentBackend>(&mut self, task: Task, backend: &B) -> ScreenEffect {
        match task {
            Task::Load => {
                self.screen.load(backend).await;
                self.after_load();
                ScreenEffect::None
            }
            Task::Submit => self.screen.submit(backend).await,
            Task::ConfirmAlert => self.screen.confirm_alert(backend).await,
            Task::SendReceipt => {
                let mail = self.mail.mail();
                match self.screen.send_email(mail, backend).await {
                    Some(ReceiptStatus::Sent) => {
                        self.mail.close();
                        self.toast("payments.receiptSent", false);
                    }
                    Some(ReceiptStatus::NotSent) => self.toast("validation.wrong", true),
                    None => {}
                }
                ScreenEffect::None
            }
            Task::CreateCustomer(request) => {
                match backend.create_customer(&request).await {
                    Ok(customer) => {
                        self.customer_form = None;
                        self.screen.on_customer_created(
                            customer,
                            &mut self.customers,
                            &mut self.invoices,
                        );
                        self.invoices.clear();
                        self.sync_amount_input();
                    }
                    Err(err) => {
                        tracing::warn!("failed to create customer: {err}");
                        let message = t("validation.wrong", self.locale());
                        if let Some(form) = self.customer_form.as_mut() {
                            form.message = Some(message);
                        }
                    }
                }
                ScreenEffect::None
            }
            Task::Fetch(kind, fetch) => {
                self.fetch(kind, fetch, backend).await;
                ScreenEffect::None
            }
        }
    }

    async fn fetch<B: PaymentBackend>(&mut self, kind: PickerKind, fetch: Fetch, backend: &B) {
        let result = match kind {
            PickerKind::Customer => backend.customers(&fetch.query).await.map(|page| {
                let has_more = page.has_more();
                self.customers.receive(&fetch, page.data, has_more);
            }),
            PickerKind::Invoice => {
                let customer_id = self
                    .screen
                    .form()
                    .get_i64(&payment_path(fields::CUSTOMER));
                backend
                    .unpaid_invoices(&fetch.query, customer_id)
                    .await
                    .map(|page| {
                        let rows = self.screen.unpaid_invoice_rows(&page.data);
                        self.invoices.receive(&fetch, rows, page.has_more());
                    })
            }
            PickerKind::Method => backend.payment_methods(&fetch.query).await.map(|page| {
                let has_more = page.has_more();
                self.methods.receive(&fetch, page.data, has_more);
            }),
            PickerKind::Note => Ok(()),
        };

        if let Err(err) = result {
            tracing::warn!("failed to fetch {kind:?} page: {err}");
            self.toast("validation.wrong", true);
        }
    }

    /// Mirrors freshly loaded values into the widgets.
    fn after_load(&mut self) {
        let customer = self.screen.selected_customer().map(|c| c.name.clone());
        let invoice = self
            .screen
            .selected_invoice()
            .map(|invoice| invoice.invoice_number.clone())
            .or_else(|| {
                self.screen
                    .form()
                    .get_string(&payment_path("invoice.invoice_number"))
            });
        let method = self
            .screen
            .form()
            .get_string(&payment_path("payment_method.name"));

        self.customers.set_display_value(customer);
        self.invoices.set_display_value(invoice);
        self.methods.set_display_value(method);
        self.notes.set_items(self.screen.note_templates().to_vec());
        self.sync_amount_input();
        self.focus = 0;
    }
}

/// Shared list navigation; returns the row picked with Enter.
fn navigate<T>(picker: &mut Picker<T>, action: AppAction) -> Option<T>
where
    T: ui::components::picker::PickerEntry + Clone,
{
    match action {
        AppAction::Cancel => picker.close(),
        AppAction::Up => picker.select_prev(),
        AppAction::Down => picker.select_next(),
        AppAction::NextPage => picker.next_page(),
        AppAction::Backspace => picker.pop_query(),
        AppAction::Input(ch) => picker.push_query(ch),
        AppAction::Submit => return picker.choose(),
        _ => {}
    }
    None
}

pub struct App {
    client: Client,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig, client: Client, mode: Mode) -> Result<Self> {
        let state = AppState::new(mode, config.locale, config.timezone()?, config.page_size);
        Ok(Self {
            client,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if let Some(task) = self.state.take_task() {
                let effect = self.state.run(task, &self.client).await;
                self.follow(effect);
                continue;
            }

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match map_key(key) {
            AppAction::Quit => self.should_quit = true,
            action => {
                let effect = self.state.handle(action);
                self.follow(effect);
            }
        }
    }

    fn follow(&mut self, effect: ScreenEffect) {
        match effect {
            ScreenEffect::GoBack => self.should_quit = true,
            ScreenEffect::OpenCustomerForm => {
                let effect = self.state.apply(effect);
                self.follow(effect);
            }
            ScreenEffect::None => {}
        }
    }
}
