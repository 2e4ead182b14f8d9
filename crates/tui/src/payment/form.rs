use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Keys of the payment object inside the form.
pub mod fields {
    pub const PREFIX: &str = "prefix";
    pub const NUMBER: &str = "payment_number";
    pub const DATE: &str = "payment_date";
    pub const CUSTOMER: &str = "customer_id";
    pub const INVOICE: &str = "invoice_id";
    pub const AMOUNT: &str = "amount";
    pub const METHOD: &str = "payment_method_id";
    pub const NOTES: &str = "notes";
}

pub const PAYMENT: &str = "payment";
pub const CUSTOM_FIELDS: &str = "customFields";

/// Dotted path of a field of the payment object, e.g. `payment.amount`.
pub fn payment_path(field: &str) -> String {
    format!("{PAYMENT}.{field}")
}

/// Field values addressed by dotted paths, plus the field-level errors
/// raised against those same paths.
#[derive(Debug, Clone)]
pub struct FormState {
    values: Value,
    errors: BTreeMap<String, String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            values: Value::Object(Map::new()),
            errors: BTreeMap::new(),
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until something has been written into the form.
    pub fn is_empty(&self) -> bool {
        self.values.as_object().is_none_or(Map::is_empty)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.values, |node, segment| match node {
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => node.get(segment),
            })
    }

    /// String view of a value; numbers are rendered, `null` counts as absent.
    pub fn get_string(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.round() as i64)),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Writes `value` at `path`, creating intermediate objects. Numeric
    /// segments index into existing arrays; an index past the end makes the
    /// write a no-op. Any error raised against the path is cleared.
    pub fn set(&mut self, path: &str, value: Value) {
        let (parents, last) = match path.rsplit_once('.') {
            Some((parents, last)) => (Some(parents), last),
            None => (None, path),
        };
        let mut node = &mut self.values;
        for segment in parents.into_iter().flat_map(|parents| parents.split('.')) {
            let Some(next) = child_mut(node, segment) else {
                return;
            };
            node = next;
        }
        if let Some(slot) = child_mut(node, last) {
            *slot = value;
        }
        self.errors.remove(path);
    }

    pub fn payment(&self) -> Option<&Map<String, Value>> {
        self.get(PAYMENT).and_then(Value::as_object)
    }

    pub fn set_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.insert(path.to_string(), message.into());
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    if !node.is_object() && !node.is_array() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get_mut(index)),
        Value::Object(map) => Some(
            map.entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn set_creates_intermediate_objects() {
        let mut form = FormState::new();
        assert!(form.is_empty());

        form.set("payment.amount", json!(1200));
        assert!(!form.is_empty());
        assert_eq!(form.get_i64("payment.amount"), Some(1200));
        assert!(form.payment().is_some());
    }

    #[test]
    fn set_replaces_scalar_on_the_way() {
        let mut form = FormState::new();
        form.set("payment", json!("scalar"));
        form.set("payment.notes", json!("hello"));
        assert_eq!(form.get_string("payment.notes").as_deref(), Some("hello"));
    }

    #[test]
    fn numeric_segments_index_arrays() {
        let mut form = FormState::new();
        form.set("customFields", json!([{ "id": 1, "value": null }]));

        form.set("customFields.0.value", json!("REF"));
        form.set("customFields.5.value", json!("ignored"));

        assert_eq!(form.get_string("customFields.0.value").as_deref(), Some("REF"));
        assert_eq!(form.get_i64("customFields.0.id"), Some(1));
        assert_eq!(form.get("customFields.5"), None);
    }

    #[test]
    fn null_reads_as_absent() {
        let mut form = FormState::new();
        form.set("payment.amount", Value::Null);
        assert!(form.get("payment.amount").is_some());
        assert_eq!(form.get_i64("payment.amount"), None);
        assert_eq!(form.get_string("payment.amount"), None);
    }

    #[test]
    fn writing_a_field_clears_its_error() {
        let mut form = FormState::new();
        form.set_error("payment.payment_number", "validation.alreadyTaken");
        form.set_error("payment.amount", "validation.required");

        form.set("payment.payment_number", json!("000003"));

        assert_eq!(form.error("payment.payment_number"), None);
        assert_eq!(form.error("payment.amount"), Some("validation.required"));
    }
}
