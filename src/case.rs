//! Key casing between the API (camelCase) and PostgreSQL columns (snake_case).

use serde_json::{Map, Value};

/// "date_of_birth" -> "dateOfBirth"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// "dateOfBirth" -> "date_of_birth"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn rekey(row: Map<String, Value>, f: fn(&str) -> String) -> Map<String, Value> {
    row.into_iter().map(|(k, v)| (f(&k), v)).collect()
}

/// Request payloads and filters on their way to SQL.
pub fn keys_to_snake_case(row: Map<String, Value>) -> Map<String, Value> {
    rekey(row, to_snake_case)
}

/// Rows on their way back to clients.
pub fn keys_to_camel_case(row: Map<String, Value>) -> Map<String, Value> {
    rekey(row, to_camel_case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifiers() {
        assert_eq!(to_camel_case("medicine_id"), "medicineId");
        assert_eq!(to_camel_case("id"), "id");
        assert_eq!(to_snake_case("requiresPrescription"), "requires_prescription");
        assert_eq!(to_snake_case("name"), "name");
    }

    #[test]
    fn row_keys_round_trip() {
        let row = json!({"first_name": "Ada", "created_at": "2024-01-01"})
            .as_object()
            .cloned()
            .unwrap();
        let camel = keys_to_camel_case(row.clone());
        assert!(camel.contains_key("firstName"));
        assert!(camel.contains_key("createdAt"));
        assert_eq!(keys_to_snake_case(camel), row);
    }
}
