use std::collections::BTreeMap;

use api_types::{
    custom_field::CustomField,
    customer::{Customer, CustomerNew},
    invoice::Invoice,
    note::NoteTemplate,
    paging::{ListQuery, Page},
    payment::{
        PaymentDefaults, PaymentDelete, PaymentDetail, PaymentMethod, PaymentParams, SendReceipt,
    },
};
use reqwest::{RequestBuilder, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::{AppError, Result},
    payment::backend::{BackendError, BackendResult, PaymentBackend, ReceiptStatus},
};

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },
    Server(String),
    Transport(reqwest::Error),
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => BackendError::new("unauthorized"),
            ClientError::Forbidden => BackendError::new("forbidden"),
            ClientError::NotFound => BackendError::new("not found"),
            ClientError::Validation { message, errors } => BackendError {
                message,
                fields: errors,
            },
            ClientError::Server(message) => BackendError::new(message),
            ClientError::Transport(err) => BackendError::new(format!("server unreachable: {err}")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct SuccessResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    token: String,
    company: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, token: &str, company: &str) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|err| AppError::Setting {
            name: "base_url",
            reason: err.to_string(),
        })?;
        Ok(Self {
            base_url,
            token: token.to_string(),
            company: company.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid endpoint {path}: {err}")))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("company", &self.company)
            .header("Accept", "application/json")
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<T, ClientError> {
        let endpoint = self.endpoint(path)?;
        let builder = self.authorized(self.http.get(endpoint)).query(query);
        self.send(builder).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> std::result::Result<T, ClientError> {
        let res = builder.send().await.map_err(|err| {
            tracing::debug!("request failed: {err}");
            ClientError::Transport(err)
        })?;

        if res.status().is_success() {
            return res.json::<T>().await.map_err(ClientError::Transport);
        }

        let status = res.status();
        let body = res.json::<ErrorResponse>().await.unwrap_or_default();
        tracing::debug!("request rejected with {status}: {body:?}");
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| "unknown error".to_string());

        let err = match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            422 => ClientError::Validation {
                message,
                errors: body.errors,
            },
            _ => ClientError::Server(message),
        };
        Err(err)
    }

    fn list_query(query: &ListQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        params
    }
}

impl PaymentBackend for Client {
    async fn create_defaults(&self) -> BackendResult<PaymentDefaults> {
        Ok(self.get("payments/create", &[]).await?)
    }

    async fn payment_detail(&self, id: i64) -> BackendResult<PaymentDetail> {
        Ok(self.get(&format!("payments/{id}"), &[]).await?)
    }

    async fn create_payment(&self, params: &PaymentParams) -> BackendResult<()> {
        let endpoint = self.endpoint("payments")?;
        let builder = self.authorized(self.http.post(endpoint)).json(params);
        self.send::<Value>(builder).await?;
        Ok(())
    }

    async fn update_payment(&self, id: i64, params: &PaymentParams) -> BackendResult<()> {
        let endpoint = self.endpoint(&format!("payments/{id}"))?;
        let builder = self.authorized(self.http.put(endpoint)).json(params);
        self.send::<Value>(builder).await?;
        Ok(())
    }

    async fn delete_payment(&self, id: i64) -> BackendResult<()> {
        let endpoint = self.endpoint("payments/delete")?;
        let builder = self
            .authorized(self.http.post(endpoint))
            .json(&PaymentDelete { ids: vec![id] });
        self.send::<Value>(builder).await?;
        Ok(())
    }

    async fn send_receipt(&self, request: &SendReceipt) -> BackendResult<ReceiptStatus> {
        let endpoint = self.endpoint(&format!("payments/{}/send", request.id))?;
        let builder = self.authorized(self.http.post(endpoint)).json(request);
        let res: SuccessResponse = self.send(builder).await?;
        Ok(if res.success {
            ReceiptStatus::Sent
        } else {
            ReceiptStatus::NotSent
        })
    }

    async fn customers(&self, query: &ListQuery) -> BackendResult<Page<Vec<Customer>>> {
        Ok(self.get("customers", &Self::list_query(query)).await?)
    }

    async fn unpaid_invoices(
        &self,
        query: &ListQuery,
        customer_id: Option<i64>,
    ) -> BackendResult<Page<Value>> {
        let mut params = Self::list_query(query);
        params.push(("status", "UNPAID".to_string()));
        if let Some(customer_id) = customer_id {
            params.push(("customer_id", customer_id.to_string()));
        }
        Ok(self.get("invoices", &params).await?)
    }

    async fn payment_methods(&self, query: &ListQuery) -> BackendResult<Page<Vec<PaymentMethod>>> {
        Ok(self.get("payment-methods", &Self::list_query(query)).await?)
    }

    async fn custom_fields(&self) -> BackendResult<Vec<CustomField>> {
        let params = [("type", "Payment".to_string()), ("limit", "all".to_string())];
        let page: DataEnvelope<Vec<CustomField>> = self.get("custom-fields", &params).await?;
        Ok(page.data)
    }

    async fn note_templates(&self) -> BackendResult<Vec<NoteTemplate>> {
        let params = [("type", "Payment".to_string()), ("limit", "all".to_string())];
        let page: DataEnvelope<Vec<NoteTemplate>> = self.get("notes", &params).await?;
        Ok(page.data)
    }

    async fn create_customer(&self, customer: &CustomerNew) -> BackendResult<Customer> {
        let endpoint = self.endpoint("customers")?;
        let builder = self.authorized(self.http.post(endpoint)).json(customer);
        let created: DataEnvelope<Customer> = self.send(builder).await?;
        Ok(created.data)
    }

    async fn invoice(&self, id: i64) -> BackendResult<Invoice> {
        let found: DataEnvelope<Invoice> = self.get(&format!("invoices/{id}"), &[]).await?;
        Ok(found.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = Client::new("http://127.0.0.1:8000/api/v1", "t", "1").unwrap();
        assert_eq!(
            client.endpoint("payments/create").unwrap().as_str(),
            "http://127.0.0.1:8000/api/v1/payments/create"
        );
    }

    #[test]
    fn invalid_base_url_is_a_setting_error() {
        let err = Client::new("not a url", "t", "1").unwrap_err();
        assert!(matches!(err, AppError::Setting { name: "base_url", .. }));
    }

    #[test]
    fn validation_errors_keep_field_messages() {
        let mut errors = BTreeMap::new();
        errors.insert(
            "payment_number".to_string(),
            vec!["The payment number has already been taken.".to_string()],
        );
        let err: BackendError = ClientError::Validation {
            message: "The given data was invalid.".to_string(),
            errors,
        }
        .into();
        assert!(err.has_field("payment_number"));
        assert_eq!(err.message, "The given data was invalid.");
    }

    #[test]
    fn list_query_skips_empty_search() {
        let mut query = ListQuery::first_page(10);
        assert_eq!(Client::list_query(&query).len(), 2);
        query.search = Some(String::new());
        assert_eq!(Client::list_query(&query).len(), 2);
        query.search = Some("acme".to_string());
        assert!(
            Client::list_query(&query)
                .iter()
                .any(|(key, value)| *key == "search" && value == "acme")
        );
    }
}
