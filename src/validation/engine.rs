//! Rule interpreter: checks a flat record against a schema and collects field errors.

use crate::validation::formats::{coerce_number, is_boolean, is_date, is_email};
use crate::validation::rules::{
    FieldRule, FieldType, RuleFault, ValidationError, ValidationResult, ValidationSchema,
};
use serde_json::{Map, Value};

/// Validate `data` against every field of `schema`.
///
/// Returns one error per failing field; all fields are checked so the caller gets the full list.
/// The only `Err` is a custom predicate that could not run.
pub fn validate(
    schema: &ValidationSchema,
    data: &Map<String, Value>,
) -> Result<ValidationResult, RuleFault> {
    let mut errors = Vec::new();
    for (field, rule) in schema.iter() {
        if let Some(message) = check_field(field, data.get(field), rule)? {
            errors.push(ValidationError {
                field: field.to_string(),
                message: rule.message.clone().unwrap_or(message),
            });
        }
    }
    Ok(ValidationResult::from_errors(errors))
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// First failing check for one field, as a default message.
fn check_field(
    field: &str,
    value: Option<&Value>,
    rule: &FieldRule,
) -> Result<Option<String>, RuleFault> {
    if is_absent(value) {
        if rule.required {
            return Ok(Some(format!("{} is required", field)));
        }
        return Ok(None);
    }
    let Some(v) = value else {
        return Ok(None);
    };

    if let Some(field_type) = rule.field_type {
        if !type_matches(field_type, v) {
            return Ok(Some(type_message(field, field_type)));
        }
    }

    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(min) = rule.min_length {
            if len < min {
                return Ok(Some(format!("{} must be at least {} characters", field, min)));
            }
        }
        if let Some(max) = rule.max_length {
            if len > max {
                return Ok(Some(format!("{} must be at most {} characters", field, max)));
            }
        }
    }

    if rule.min.is_some() || rule.max.is_some() {
        if let Some(n) = coerce_number(v) {
            if let Some(min) = rule.min {
                if n < min {
                    return Ok(Some(format!("{} must be at least {}", field, min)));
                }
            }
            if let Some(max) = rule.max {
                if n > max {
                    return Ok(Some(format!("{} must be at most {}", field, max)));
                }
            }
        }
    }

    if let (Some(re), Some(s)) = (&rule.pattern, v.as_str()) {
        if !re.is_match(s) {
            return Ok(Some(format!("{} has an invalid format", field)));
        }
    }

    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            let listed = allowed.iter().map(display_value).collect::<Vec<_>>().join(", ");
            return Ok(Some(format!("{} must be one of: {}", field, listed)));
        }
    }

    if let Some(check) = &rule.custom {
        let ok = check(v).map_err(|reason| RuleFault {
            field: field.to_string(),
            reason,
        })?;
        if !ok {
            return Ok(Some(format!("{} is invalid", field)));
        }
    }

    Ok(None)
}

fn type_matches(field_type: FieldType, v: &Value) -> bool {
    match field_type {
        FieldType::String => v.is_string(),
        FieldType::Number => coerce_number(v).is_some(),
        FieldType::Boolean => is_boolean(v),
        FieldType::Email => v.as_str().map(is_email).unwrap_or(false),
        FieldType::Date => is_date(v),
        FieldType::Array => v.is_array(),
    }
}

fn type_message(field: &str, field_type: FieldType) -> String {
    match field_type {
        FieldType::String => format!("{} must be a string", field),
        FieldType::Number => format!("{} must be a number", field),
        FieldType::Boolean => format!("{} must be a boolean", field),
        FieldType::Email => format!("{} must be a valid email", field),
        FieldType::Date => format!("{} must be a valid date", field),
        FieldType::Array => format!("{} must be an array", field),
    }
}

/// Strict equality, except numbers compare by value (1 == 1.0).
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    fn run(schema: &ValidationSchema, v: Value) -> ValidationResult {
        validate(schema, &record(v)).expect("no rule fault")
    }

    #[test]
    fn required_field_missing_or_empty() {
        let schema = ValidationSchema::new().field("name", FieldRule::new().required());
        for input in [json!({}), json!({"name": ""}), json!({"name": null})] {
            let result = run(&schema, input);
            assert!(!result.is_valid);
            assert_eq!(result.errors.len(), 1);
            assert_eq!(result.errors[0].field, "name");
            assert_eq!(result.errors[0].message, "name is required");
        }
    }

    #[test]
    fn required_uses_custom_message() {
        let schema = ValidationSchema::new()
            .field("name", FieldRule::new().required().message("Name please"));
        let result = run(&schema, json!({}));
        assert_eq!(result.errors[0].message, "Name please");
    }

    #[test]
    fn optional_absent_field_skips_type_check() {
        let schema = ValidationSchema::new().field("age", FieldRule::of_type(FieldType::Number));
        assert!(run(&schema, json!({})).is_valid);
        assert!(run(&schema, json!({"age": ""})).is_valid);
    }

    #[test]
    fn email_type() {
        let schema = ValidationSchema::new().field("email", FieldRule::of_type(FieldType::Email));
        assert!(run(&schema, json!({"email": "a@b.com"})).is_valid);
        let bad = run(&schema, json!({"email": "not-an-email"}));
        assert!(!bad.is_valid);
        assert_eq!(bad.errors.len(), 1);
        assert_eq!(bad.errors[0].field, "email");
        assert!(!run(&schema, json!({"email": 42})).is_valid);
    }

    #[test]
    fn number_range_boundaries() {
        let schema = ValidationSchema::new()
            .field("n", FieldRule::of_type(FieldType::Number).range(1.0, 10.0));
        assert!(run(&schema, json!({"n": 1})).is_valid);
        assert!(run(&schema, json!({"n": 10})).is_valid);
        assert!(run(&schema, json!({"n": "7"})).is_valid);
        let low = run(&schema, json!({"n": 0}));
        assert_eq!(low.errors[0].message, "n must be at least 1");
        let high = run(&schema, json!({"n": 11}));
        assert_eq!(high.errors[0].message, "n must be at most 10");
    }

    #[test]
    fn number_type_rejects_non_numeric() {
        let schema = ValidationSchema::new().field("n", FieldRule::of_type(FieldType::Number));
        let result = run(&schema, json!({"n": "twelve"}));
        assert_eq!(result.errors[0].message, "n must be a number");
        assert!(!run(&schema, json!({"n": [1]})).is_valid);
    }

    #[test]
    fn range_without_type_skips_non_numeric() {
        let schema = ValidationSchema::new().field("n", FieldRule::new().min(5.0));
        assert!(run(&schema, json!({"n": "abc"})).is_valid);
        assert!(!run(&schema, json!({"n": 2})).is_valid);
    }

    #[test]
    fn enum_membership() {
        let schema = ValidationSchema::new()
            .field("role", FieldRule::new().one_of(["PATIENT", "DOCTOR", "ADMIN"]));
        assert!(run(&schema, json!({"role": "ADMIN"})).is_valid);
        let result = run(&schema, json!({"role": "SUPERADMIN"}));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].message, "role must be one of: PATIENT, DOCTOR, ADMIN");
    }

    #[test]
    fn enum_numbers_compare_by_value() {
        let schema = ValidationSchema::new().field("level", FieldRule::new().one_of([1, 2, 3]));
        assert!(run(&schema, json!({"level": 2.0})).is_valid);
        assert!(!run(&schema, json!({"level": "2"})).is_valid);
    }

    #[test]
    fn login_with_short_password() {
        let schema = ValidationSchema::new()
            .field("email", FieldRule::of_type(FieldType::Email).required())
            .field("password", FieldRule::of_type(FieldType::String).required().min_length(6));
        let result = run(&schema, json!({"email": "x@y.com", "password": "short"}));
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![ValidationError {
                field: "password".into(),
                message: "password must be at least 6 characters".into(),
            }]
        );
    }

    #[test]
    fn length_counts_characters() {
        let schema = ValidationSchema::new()
            .field("name", FieldRule::of_type(FieldType::String).max_length(4));
        assert!(run(&schema, json!({"name": "Zoë!"})).is_valid);
        assert!(!run(&schema, json!({"name": "Zoë!!"})).is_valid);
    }

    #[test]
    fn pattern_applies_to_strings_only() {
        let schema = ValidationSchema::new().field(
            "code",
            FieldRule::new().pattern(r"^[A-Z]\d{2}$").expect("valid pattern"),
        );
        assert!(run(&schema, json!({"code": "J45"})).is_valid);
        let result = run(&schema, json!({"code": "j45"}));
        assert_eq!(result.errors[0].message, "code has an invalid format");
        assert!(run(&schema, json!({"code": 45})).is_valid);
    }

    #[test]
    fn boolean_and_date_and_array_types() {
        let schema = ValidationSchema::new()
            .field("flag", FieldRule::of_type(FieldType::Boolean))
            .field("on", FieldRule::of_type(FieldType::Date))
            .field("ids", FieldRule::of_type(FieldType::Array));
        assert!(run(&schema, json!({"flag": "false", "on": "2024-01-31", "ids": []})).is_valid);
        let result = run(&schema, json!({"flag": "no", "on": "2024-13-01", "ids": "1,2"}));
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["flag", "on", "ids"]);
    }

    #[test]
    fn type_failure_stops_later_checks() {
        let schema = ValidationSchema::new().field(
            "name",
            FieldRule::of_type(FieldType::String).min_length(3).one_of(["abc"]),
        );
        let result = run(&schema, json!({"name": 5}));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "name must be a string");
    }

    #[test]
    fn collects_errors_across_fields() {
        let schema = ValidationSchema::new()
            .field("a", FieldRule::new().required())
            .field("b", FieldRule::new().required())
            .field("c", FieldRule::new().required());
        let result = run(&schema, json!({"b": "present"}));
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].field, "a");
        assert_eq!(result.errors[1].field, "c");
    }

    #[test]
    fn custom_predicate_false_and_fault() {
        let schema = ValidationSchema::new().field(
            "even",
            FieldRule::new().custom(|v| match v.as_i64() {
                Some(n) => Ok(n % 2 == 0),
                None => Err("not an integer".into()),
            }),
        );
        assert!(run(&schema, json!({"even": 4})).is_valid);
        assert_eq!(run(&schema, json!({"even": 3})).errors[0].message, "even is invalid");
        let fault = validate(&schema, &record(json!({"even": "x"}))).unwrap_err();
        assert_eq!(fault.field, "even");
    }

    #[test]
    fn message_override_applies_to_every_check() {
        let schema = ValidationSchema::new().field(
            "age",
            FieldRule::of_type(FieldType::Number).min(0.0).message("age is out of range"),
        );
        assert_eq!(run(&schema, json!({"age": "x"})).errors[0].message, "age is out of range");
        assert_eq!(run(&schema, json!({"age": -1})).errors[0].message, "age is out of range");
    }
}
