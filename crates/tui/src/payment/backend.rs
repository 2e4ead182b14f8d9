use std::collections::BTreeMap;

use api_types::{
    custom_field::CustomField,
    customer::{Customer, CustomerNew},
    invoice::Invoice,
    note::NoteTemplate,
    paging::{ListQuery, Page},
    payment::{PaymentDefaults, PaymentDetail, PaymentMethod, PaymentParams, SendReceipt},
};
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a backend call. `fields` carries server-side
/// validation messages keyed by payment field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: &str, message: impl Into<String>) -> Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
        self
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// Outcome of a send-receipt request, handed back to the screen instead of
/// being recorded in shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Sent,
    NotSent,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Everything the payment screen asks of the data layer.
#[allow(async_fn_in_trait)]
pub trait PaymentBackend {
    async fn create_defaults(&self) -> BackendResult<PaymentDefaults>;

    async fn payment_detail(&self, id: i64) -> BackendResult<PaymentDetail>;

    async fn create_payment(&self, params: &PaymentParams) -> BackendResult<()>;

    async fn update_payment(&self, id: i64, params: &PaymentParams) -> BackendResult<()>;

    async fn delete_payment(&self, id: i64) -> BackendResult<()>;

    async fn send_receipt(&self, request: &SendReceipt) -> BackendResult<ReceiptStatus>;

    async fn customers(&self, query: &ListQuery) -> BackendResult<Page<Vec<Customer>>>;

    /// Unpaid invoices of a customer. Rows stay raw; the screen reshapes
    /// them for the picker.
    async fn unpaid_invoices(
        &self,
        query: &ListQuery,
        customer_id: Option<i64>,
    ) -> BackendResult<Page<Value>>;

    async fn payment_methods(&self, query: &ListQuery) -> BackendResult<Page<Vec<PaymentMethod>>>;

    async fn custom_fields(&self) -> BackendResult<Vec<CustomField>>;

    async fn note_templates(&self) -> BackendResult<Vec<NoteTemplate>>;

    async fn create_customer(&self, customer: &CustomerNew) -> BackendResult<Customer>;

    async fn invoice(&self, id: i64) -> BackendResult<Invoice>;
}
