use std::cell::RefCell;

use api_types::{
    custom_field::{CustomField, CustomFieldKind},
    customer::{Customer, CustomerNew},
    invoice::Invoice,
    note::NoteTemplate,
    paging::{ListQuery, Page, PageMeta},
    payment::{PaymentDefaults, PaymentDetail, PaymentMethod, PaymentParams, SendReceipt},
};
use serde_json::{Value, json};

use super::{
    backend::{BackendError, BackendResult, PaymentBackend, ReceiptStatus},
    handles::{MailHandle, SelectHandle},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateDefaults,
    PaymentDetail(i64),
    Create(PaymentParams),
    Update(i64, PaymentParams),
    Delete(i64),
    SendReceipt(SendReceipt),
    Customers(ListQuery),
    UnpaidInvoices(Option<i64>),
    PaymentMethods,
    CustomFields,
    NoteTemplates,
    CreateCustomer(String),
    Invoice(i64),
}

/// Records every call and answers from fixed fixtures.
#[derive(Debug)]
pub struct FakeBackend {
    pub defaults: PaymentDefaults,
    pub detail: Option<PaymentDetail>,
    pub fail_defaults: bool,
    pub save_error: Option<BackendError>,
    pub calls: RefCell<Vec<Call>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            defaults: PaymentDefaults {
                next_number: "000002".to_string(),
                prefix: "PAY-".to_string(),
            },
            detail: None,
            fail_defaults: false,
            save_error: None,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    /// A backend that serves payment 42, complete enough to be submitted.
    pub fn edit_fixture() -> Self {
        let payment = json!({
            "id": 42,
            "payment_date": "2026-10-01",
            "customer_id": 7,
            "invoice_id": 9,
            "amount": 100,
            "user": { "id": 7, "name": "Acme", "email": "billing@acme.test" },
            "invoice": { "id": 9, "invoice_number": "INV-000009", "due_amount": 400, "sub_total": 500 },
            "fields": []
        });
        Self {
            detail: Some(PaymentDetail {
                payment: payment.as_object().cloned().unwrap_or_default(),
                payment_prefix: "PAY-".to_string(),
                next_payment_number: "000010".to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn save_result(&self) -> BackendResult<()> {
        match &self.save_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn page<T>(data: T) -> Page<T> {
    Page {
        data,
        meta: PageMeta {
            current_page: 1,
            last_page: 1,
        },
    }
}

impl PaymentBackend for FakeBackend {
    async fn create_defaults(&self) -> BackendResult<PaymentDefaults> {
        self.record(Call::CreateDefaults);
        if self.fail_defaults {
            return Err(BackendError::new("server unreachable"));
        }
        Ok(self.defaults.clone())
    }

    async fn payment_detail(&self, id: i64) -> BackendResult<PaymentDetail> {
        self.record(Call::PaymentDetail(id));
        self.detail
            .clone()
            .ok_or_else(|| BackendError::new("not found"))
    }

    async fn create_payment(&self, params: &PaymentParams) -> BackendResult<()> {
        self.record(Call::Create(params.clone()));
        self.save_result()
    }

    async fn update_payment(&self, id: i64, params: &PaymentParams) -> BackendResult<()> {
        self.record(Call::Update(id, params.clone()));
        self.save_result()
    }

    async fn delete_payment(&self, id: i64) -> BackendResult<()> {
        self.record(Call::Delete(id));
        Ok(())
    }

    async fn send_receipt(&self, request: &SendReceipt) -> BackendResult<ReceiptStatus> {
        self.record(Call::SendReceipt(request.clone()));
        Ok(ReceiptStatus::Sent)
    }

    async fn customers(&self, query: &ListQuery) -> BackendResult<Page<Vec<Customer>>> {
        self.record(Call::Customers(query.clone()));
        Ok(page(vec![Customer {
            id: 7,
            name: "Acme".to_string(),
            email: None,
            currency: None,
        }]))
    }

    async fn unpaid_invoices(
        &self,
        _query: &ListQuery,
        customer_id: Option<i64>,
    ) -> BackendResult<Page<Value>> {
        self.record(Call::UnpaidInvoices(customer_id));
        Ok(page(json!([
            { "id": 9, "invoice_number": "INV-000009", "status": "UNPAID", "due_amount": 400 }
        ])))
    }

    async fn payment_methods(&self, _query: &ListQuery) -> BackendResult<Page<Vec<PaymentMethod>>> {
        self.record(Call::PaymentMethods);
        Ok(page(vec![PaymentMethod {
            id: 1,
            name: "Bank Transfer".to_string(),
        }]))
    }

    async fn custom_fields(&self) -> BackendResult<Vec<CustomField>> {
        self.record(Call::CustomFields);
        Ok(vec![CustomField {
            id: 4,
            label: "Reference".to_string(),
            kind: CustomFieldKind::Input,
            is_required: false,
            default_answer: None,
            options: vec![],
        }])
    }

    async fn note_templates(&self) -> BackendResult<Vec<NoteTemplate>> {
        self.record(Call::NoteTemplates);
        Ok(vec![NoteTemplate {
            id: 1,
            name: "Thanks".to_string(),
            notes: "Thank you for your payment.".to_string(),
        }])
    }

    async fn create_customer(&self, customer: &CustomerNew) -> BackendResult<Customer> {
        self.record(Call::CreateCustomer(customer.name.clone()));
        Ok(Customer {
            id: 99,
            name: customer.name.clone(),
            email: customer.email.clone(),
            currency: None,
        })
    }

    async fn invoice(&self, id: i64) -> BackendResult<Invoice> {
        self.record(Call::Invoice(id));
        Ok(Invoice {
            id,
            invoice_number: format!("INV-{id:06}"),
            due_amount: Some(400),
            sub_total: Some(500),
            ..Invoice::default()
        })
    }
}

/// Stand-in for picker and composer widgets.
#[derive(Debug, Default)]
pub struct FakeHandle {
    pub display: Option<String>,
    pub display_updates: usize,
    pub opened: usize,
    pub toggles: usize,
}

impl SelectHandle for FakeHandle {
    fn set_display_value(&mut self, value: Option<String>) {
        self.display = value;
        self.display_updates += 1;
    }

    fn open(&mut self) {
        self.opened += 1;
    }
}

impl MailHandle for FakeHandle {
    fn toggle(&mut self) {
        self.toggles += 1;
    }
}
