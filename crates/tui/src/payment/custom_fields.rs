use api_types::{custom_field::CustomField, payment::CustomFieldValue};
use serde_json::{Value, json};

/// Re-encodes the custom-field entries of the form for the API.
///
/// Entries without a numeric `id` are dropped; each remaining one becomes
/// `{ id, value }` with a missing value sent as `null`.
pub fn api_formatted(entries: Option<&Value>) -> Vec<CustomFieldValue> {
    let Some(entries) = entries.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id").and_then(Value::as_i64)?;
            let value = entry.get("value").cloned().unwrap_or(Value::Null);
            Some(CustomFieldValue { id, value })
        })
        .collect()
}

/// Form entries for a new payment, seeded with each field's default answer.
pub fn initial_entries(definitions: &[CustomField]) -> Value {
    Value::Array(
        definitions
            .iter()
            .map(|field| {
                json!({
                    "id": field.id,
                    "value": field.default_answer.clone().unwrap_or(Value::Null),
                })
            })
            .collect(),
    )
}

/// Splits the `fields` entry of a fetched payment into field definitions and
/// form entries.
///
/// The server nests the definition under `custom_field` and the stored value
/// under `defaultAnswer`.
pub fn from_payment_fields(fields: &Value) -> (Vec<CustomField>, Value) {
    let Some(fields) = fields.as_array() else {
        return (Vec::new(), Value::Array(Vec::new()));
    };

    let mut definitions = Vec::new();
    let mut entries = Vec::new();
    for field in fields {
        let definition = field
            .get("custom_field")
            .cloned()
            .and_then(|raw| serde_json::from_value::<CustomField>(raw).ok());
        let id = field
            .get("custom_field_id")
            .and_then(Value::as_i64)
            .or_else(|| definition.as_ref().map(|def| def.id));
        let Some(id) = id else {
            continue;
        };
        let value = field
            .get("defaultAnswer")
            .or_else(|| field.get("default_answer"))
            .cloned()
            .unwrap_or(Value::Null);

        entries.push(json!({ "id": id, "value": value }));
        if let Some(definition) = definition {
            definitions.push(definition);
        }
    }

    (definitions, Value::Array(entries))
}

#[cfg(test)]
mod tests {
    use api_types::custom_field::CustomFieldKind;

    use super::*;

    #[test]
    fn api_formatted_drops_entries_without_id() {
        let entries = json!([
            { "id": 1, "value": "abc", "label": "Reference" },
            { "value": "orphan" },
            { "id": 2 }
        ]);

        let formatted = api_formatted(Some(&entries));

        assert_eq!(
            formatted,
            vec![
                CustomFieldValue {
                    id: 1,
                    value: json!("abc")
                },
                CustomFieldValue {
                    id: 2,
                    value: Value::Null
                },
            ]
        );
        assert!(api_formatted(None).is_empty());
        assert!(api_formatted(Some(&json!({ "id": 1 }))).is_empty());
    }

    #[test]
    fn initial_entries_use_default_answers() {
        let definitions = vec![CustomField {
            id: 4,
            label: "Reference".to_string(),
            kind: CustomFieldKind::Input,
            is_required: false,
            default_answer: Some(json!("REF")),
            options: vec![],
        }];

        assert_eq!(
            initial_entries(&definitions),
            json!([{ "id": 4, "value": "REF" }])
        );
    }

    #[test]
    fn payment_fields_split_into_definitions_and_entries() {
        let fields = json!([
            {
                "id": 100,
                "custom_field_id": 4,
                "defaultAnswer": "REF-9",
                "custom_field": { "id": 4, "label": "Reference", "type": "Input" }
            },
            { "id": 101, "defaultAnswer": "lost" }
        ]);

        let (definitions, entries) = from_payment_fields(&fields);

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].label, "Reference");
        assert_eq!(entries, json!([{ "id": 4, "value": "REF-9" }]));
    }
}
