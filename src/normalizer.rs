use serde_json::{json, Map, Value};

/// The one service category whose raw payload is narrowed before display.
pub const IDENTITY_LINKAGE_SERVICE: &str = "Mobile to Aadhaar Details";

/// Canonical field names kept for the identity-linkage category.
/// Matched against normalized keys (lowercase, separators stripped).
const ALLOWED_IDENTITY_FIELDS: [&str; 9] = [
    "region",
    "postcode",
    "phone",
    "lastname",
    "firstname",
    "email",
    "address2",
    "address",
    "docnumber",
];

/// Normalizes a field name: lowercase, with spaces, underscores and
/// hyphens stripped, so "First_Name", "first-name" and "First Name"
/// all match the same canonical entry.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|&c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_allowed(key: &str) -> bool {
    let normalized = normalize_key(key);
    ALLOWED_IDENTITY_FIELDS.iter().any(|f| *f == normalized)
}

/// A field is kept only when its value is actually present: nulls and
/// empty strings are treated as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Keeps only the allow-listed, non-empty fields of a single flat record.
pub fn pick_allowed_fields(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .filter(|(key, value)| is_allowed(key) && is_present(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Narrows a raw provider payload down to allow-listed identity fields.
///
/// The raw shape is `List -> <source name> -> Data[]` where each `Data`
/// entry is a flat record. Records with zero kept fields are dropped; the
/// surviving records are flattened into a single `{"Results": [...]}` list.
///
/// Fail-open: a payload without the expected shape, or one whose records
/// are all outside the allow-list, is returned unchanged. Callers must not
/// treat an unfiltered result as an error.
pub fn filter_identity_payload(raw: Value) -> Value {
    let Some(list) = raw.get("List").and_then(Value::as_object) else {
        return raw;
    };

    let mut results: Vec<Value> = Vec::new();

    for source in list.values() {
        let Some(records) = source.get("Data").and_then(Value::as_array) else {
            continue;
        };
        for record in records {
            if let Some(record) = record.as_object() {
                let picked = pick_allowed_fields(record);
                if !picked.is_empty() {
                    results.push(Value::Object(picked));
                }
            }
        }
    }

    if results.is_empty() {
        return raw;
    }

    json!({ "Results": results })
}
