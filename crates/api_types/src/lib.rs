use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Currency as returned by the invoicing server, embedded in customers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: Option<i64>,
    pub code: String,
    pub symbol: Option<String>,
    /// Digits after the decimal separator (amounts travel as minor units).
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 {
    2
}

impl Currency {
    /// Formats an amount expressed in minor units (e.g. cents).
    pub fn format_minor(&self, amount_minor: i64) -> String {
        let sign = if amount_minor < 0 { "-" } else { "" };
        let abs = amount_minor.unsigned_abs();
        let symbol = self.symbol.as_deref().unwrap_or(self.code.as_str());
        if self.precision == 0 {
            return format!("{sign}{symbol}{abs}");
        }
        let (scale, width) = match 10u64.checked_pow(self.precision) {
            Some(scale) => (scale, self.precision as usize),
            None => (100, 2),
        };
        let whole = abs / scale;
        let frac = abs % scale;
        format!("{sign}{symbol}{whole}.{frac:0width$}")
    }
}

/// Paging envelope used by every list endpoint.
pub mod paging {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ListQuery {
        pub search: Option<String>,
        pub page: u32,
        pub limit: u32,
    }

    impl ListQuery {
        pub fn first_page(limit: u32) -> Self {
            Self {
                search: None,
                page: 1,
                limit,
            }
        }

        pub fn next(&self) -> Self {
            Self {
                search: self.search.clone(),
                page: self.page + 1,
                limit: self.limit,
            }
        }
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct PageMeta {
        pub current_page: u32,
        pub last_page: u32,
    }

    /// A page of results. `data` stays raw JSON for lists whose rows are
    /// re-shaped on the client (see unpaid invoices).
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Page<T> {
        pub data: T,
        #[serde(default)]
        pub meta: PageMeta,
    }

    impl<T> Page<T> {
        pub fn has_more(&self) -> bool {
            self.meta.current_page < self.meta.last_page
        }
    }
}

pub mod customer {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Customer {
        pub id: i64,
        #[serde(default)]
        pub name: String,
        pub email: Option<String>,
        pub currency: Option<Currency>,
    }

    /// Request body for creating a customer.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CustomerNew {
        pub name: String,
        pub email: Option<String>,
    }
}

pub mod invoice {
    use super::*;

    use crate::customer::Customer;

    /// Status keys as sent by the server (`"UNPAID"`, `"PARTIALLY_PAID"`, ...).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum InvoiceStatus {
        Draft,
        Sent,
        Viewed,
        Overdue,
        Completed,
        Due,
        Unpaid,
        PartiallyPaid,
        Paid,
    }

    impl InvoiceStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Draft => "DRAFT",
                Self::Sent => "SENT",
                Self::Viewed => "VIEWED",
                Self::Overdue => "OVERDUE",
                Self::Completed => "COMPLETED",
                Self::Due => "DUE",
                Self::Unpaid => "UNPAID",
                Self::PartiallyPaid => "PARTIALLY_PAID",
                Self::Paid => "PAID",
            }
        }

        pub fn parse(raw: &str) -> Option<Self> {
            serde_json::from_value(Value::String(raw.to_string())).ok()
        }
    }

    /// An invoice as listed in the unpaid-invoice picker or attached to a
    /// payment. Every amount is in minor units.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Invoice {
        pub id: i64,
        #[serde(default)]
        pub invoice_number: String,
        pub status: Option<InvoiceStatus>,
        pub due_amount: Option<i64>,
        pub sub_total: Option<i64>,
        #[serde(rename = "formattedDueDate")]
        pub formatted_due_date: Option<String>,
        pub user: Option<Customer>,
    }

    /// Invoice handed to the payment screen in record-against-invoice mode.
    ///
    /// `due` carries the outstanding amounts the payment is validated
    /// against.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct InvoiceToRecord {
        pub id: i64,
        #[serde(alias = "invoice_number")]
        pub number: String,
        pub user: Option<Customer>,
        pub due: Option<Invoice>,
    }

    impl From<Invoice> for InvoiceToRecord {
        fn from(invoice: Invoice) -> Self {
            Self {
                id: invoice.id,
                number: invoice.invoice_number.clone(),
                user: invoice.user.clone(),
                due: Some(invoice),
            }
        }
    }
}

pub mod payment {
    use super::*;

    /// Response of `GET payments/create`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PaymentDefaults {
        #[serde(rename = "nextNumber")]
        pub next_number: String,
        pub prefix: String,
    }

    /// Response of `GET payments/{id}`.
    ///
    /// `payment` is kept as a JSON object: every field it carries is written
    /// into the form and sent back on update.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PaymentDetail {
        pub payment: Map<String, Value>,
        pub payment_prefix: String,
        #[serde(rename = "nextPaymentNumber")]
        pub next_payment_number: String,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct PaymentMethod {
        pub id: i64,
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CustomFieldValue {
        pub id: i64,
        pub value: Value,
    }

    /// Body of create/update requests: the payment fields as edited, plus the
    /// re-encoded custom fields.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct PaymentParams {
        #[serde(flatten)]
        pub fields: Map<String, Value>,
        #[serde(rename = "customFields")]
        pub custom_fields: Vec<CustomFieldValue>,
    }

    /// Body of `POST payments/{id}/send`.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct ReceiptMail {
        pub from: Option<String>,
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SendReceipt {
        #[serde(flatten)]
        pub mail: ReceiptMail,
        pub id: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PaymentDelete {
        pub ids: Vec<i64>,
    }
}

pub mod custom_field {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum CustomFieldKind {
        Input,
        TextArea,
        Phone,
        Url,
        Number,
        Dropdown,
        Switch,
        Date,
        Time,
        DateTime,
    }

    /// Definition of a custom field attached to the `Payment` model.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CustomField {
        pub id: i64,
        pub label: String,
        #[serde(rename = "type")]
        pub kind: CustomFieldKind,
        #[serde(default)]
        pub is_required: bool,
        pub default_answer: Option<Value>,
        #[serde(default)]
        pub options: Vec<String>,
    }
}

pub mod note {
    use super::*;

    /// Reusable note text the user can insert into the notes field.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct NoteTemplate {
        pub id: i64,
        pub name: String,
        pub notes: String,
    }
}
