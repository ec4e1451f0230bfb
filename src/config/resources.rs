//! The MediBloc resource catalog: storage layout, request schemas and nested listings per resource.

use crate::config::table::{ColumnSpec, TableSpec};
use crate::error::ConfigError;
use crate::validation::formats::coerce_number;
use crate::validation::{FieldRule, FieldType, ValidationSchema};
use serde_json::Value;
use std::sync::Arc;

/// `GET /<parent>/:id/<path>` lists rows of the `path` resource whose `foreign_key` equals the parent id.
#[derive(Clone, Debug)]
pub struct ChildListing {
    pub path: &'static str,
    pub foreign_key: &'static str,
}

#[derive(Clone, Debug)]
pub struct ResourceDefinition {
    pub path: &'static str,
    pub table: TableSpec,
    pub create_schema: Arc<ValidationSchema>,
    /// Create schema with nothing required, for partial updates.
    pub update_schema: Arc<ValidationSchema>,
    pub children: Vec<ChildListing>,
}

impl ResourceDefinition {
    fn new(path: &'static str, table: TableSpec, create_schema: ValidationSchema) -> Self {
        let update_schema = create_schema.partial();
        Self {
            path,
            table,
            create_schema: Arc::new(create_schema),
            update_schema: Arc::new(update_schema),
            children: Vec::new(),
        }
    }

    fn child(mut self, path: &'static str, foreign_key: &'static str) -> Self {
        self.children.push(ChildListing { path, foreign_key });
        self
    }
}

const GENDERS: [&str; 3] = ["MALE", "FEMALE", "OTHER"];
const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];
const APPOINTMENT_STATUSES: [&str; 4] = ["SCHEDULED", "COMPLETED", "CANCELLED", "NO_SHOW"];
const SEVERITIES: [&str; 3] = ["MILD", "MODERATE", "SEVERE"];
const DOSAGE_FORMS: [&str; 7] = ["TABLET", "CAPSULE", "SYRUP", "INJECTION", "OINTMENT", "DROPS", "INHALER"];

const PHONE_PATTERN: &str = r"^\+?[0-9 ()-]{7,20}$";
const LICENSE_PATTERN: &str = r"^[A-Z0-9-]{5,30}$";
const ICD_PATTERN: &str = r"^[A-Z][0-9]{2}(\.[0-9A-Z]{1,4})?$";

fn pattern(resource: &'static str, field: &'static str, rule: FieldRule, re: &str) -> Result<FieldRule, ConfigError> {
    rule.pattern(re).map_err(|source| ConfigError::Pattern { resource, field, source })
}

fn name_rule(min: usize, max: usize) -> FieldRule {
    FieldRule::of_type(FieldType::String).required().length(min, max)
}

/// Integer columns round fractions on insert, so anything bound to one must be whole and fit in `bigint`.
fn whole_number(v: &Value) -> Result<bool, String> {
    Ok(coerce_number(v).is_some_and(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64))
}

fn integer(min: f64, max: f64) -> FieldRule {
    FieldRule::of_type(FieldType::Number).range(min, max).custom(whole_number)
}

fn id_ref() -> FieldRule {
    FieldRule::of_type(FieldType::Number).min(1.0).custom(whole_number)
}

fn text(max: usize) -> FieldRule {
    FieldRule::of_type(FieldType::String).max_length(max)
}

fn positive_id_list(v: &Value) -> Result<bool, String> {
    let items = v.as_array().ok_or_else(|| "expected an array".to_string())?;
    Ok(items.iter().all(|item| item.as_i64().map(|n| n > 0).unwrap_or(false)))
}

fn patients(schema: &str) -> Result<ResourceDefinition, ConfigError> {
    let table = TableSpec::new(
        schema,
        "patients",
        vec![
            ColumnSpec::required("first_name", "text"),
            ColumnSpec::required("last_name", "text"),
            ColumnSpec::required("email", "text").unique(),
            ColumnSpec::optional("phone", "text"),
            ColumnSpec::required("date_of_birth", "date"),
            ColumnSpec::optional("gender", "text"),
            ColumnSpec::optional("blood_group", "text"),
            ColumnSpec::optional("address", "text"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("firstName", name_rule(2, 50))
        .field("lastName", name_rule(2, 50))
        .field("email", FieldRule::of_type(FieldType::Email).required().max_length(254))
        .field("phone", pattern("patients", "phone", FieldRule::of_type(FieldType::String), PHONE_PATTERN)?)
        .field("dateOfBirth", FieldRule::of_type(FieldType::Date).required())
        .field("gender", FieldRule::new().one_of(GENDERS))
        .field("bloodGroup", FieldRule::new().one_of(BLOOD_GROUPS))
        .field("address", text(255));
    Ok(ResourceDefinition::new("patients", table, rules)
        .child("appointments", "patientId")
        .child("prescriptions", "patientId")
        .child("medical-records", "patientId"))
}

fn doctors(schema: &str) -> Result<ResourceDefinition, ConfigError> {
    let table = TableSpec::new(
        schema,
        "doctors",
        vec![
            ColumnSpec::required("first_name", "text"),
            ColumnSpec::required("last_name", "text"),
            ColumnSpec::required("email", "text").unique(),
            ColumnSpec::optional("phone", "text"),
            ColumnSpec::required("specialization", "text"),
            ColumnSpec::required("license_number", "text").unique(),
            ColumnSpec::optional("years_of_experience", "integer"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("firstName", name_rule(2, 50))
        .field("lastName", name_rule(2, 50))
        .field("email", FieldRule::of_type(FieldType::Email).required().max_length(254))
        .field("phone", pattern("doctors", "phone", FieldRule::of_type(FieldType::String), PHONE_PATTERN)?)
        .field("specialization", name_rule(2, 100))
        .field(
            "licenseNumber",
            pattern(
                "doctors",
                "licenseNumber",
                FieldRule::of_type(FieldType::String).required(),
                LICENSE_PATTERN,
            )?
            .message("licenseNumber must be 5-30 uppercase letters, digits or dashes"),
        )
        .field("yearsOfExperience", integer(0.0, 70.0));
    Ok(ResourceDefinition::new("doctors", table, rules)
        .child("appointments", "doctorId")
        .child("prescriptions", "doctorId"))
}

fn appointments(schema: &str) -> ResourceDefinition {
    let table = TableSpec::new(
        schema,
        "appointments",
        vec![
            ColumnSpec::required("patient_id", "bigint").references("patients"),
            ColumnSpec::required("doctor_id", "bigint").references("doctors"),
            ColumnSpec::required("scheduled_at", "timestamptz"),
            ColumnSpec::required("status", "text"),
            ColumnSpec::optional("reason", "text"),
            ColumnSpec::optional("notes", "text"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("patientId", id_ref().required())
        .field("doctorId", id_ref().required())
        .field("scheduledAt", FieldRule::of_type(FieldType::Date).required())
        .field("status", FieldRule::new().required().one_of(APPOINTMENT_STATUSES))
        .field("reason", text(500))
        .field("notes", text(2000));
    ResourceDefinition::new("appointments", table, rules)
}

fn diseases(schema: &str) -> Result<ResourceDefinition, ConfigError> {
    let table = TableSpec::new(
        schema,
        "diseases",
        vec![
            ColumnSpec::required("name", "text").unique(),
            ColumnSpec::optional("icd_code", "text"),
            ColumnSpec::optional("description", "text"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("name", name_rule(2, 100))
        .field("icdCode", pattern("diseases", "icdCode", FieldRule::of_type(FieldType::String), ICD_PATTERN)?)
        .field("description", text(1000));
    Ok(ResourceDefinition::new("diseases", table, rules).child("medical-records", "diseaseId"))
}

fn symptoms(schema: &str) -> ResourceDefinition {
    let table = TableSpec::new(
        schema,
        "symptoms",
        vec![
            ColumnSpec::required("name", "text").unique(),
            ColumnSpec::optional("description", "text"),
            ColumnSpec::optional("severity", "text"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("name", name_rule(2, 100))
        .field("description", text(1000))
        .field("severity", FieldRule::new().one_of(SEVERITIES));
    ResourceDefinition::new("symptoms", table, rules)
}

fn medicines(schema: &str) -> ResourceDefinition {
    let table = TableSpec::new(
        schema,
        "medicines",
        vec![
            ColumnSpec::required("name", "text"),
            ColumnSpec::optional("manufacturer", "text"),
            ColumnSpec::optional("dosage_form", "text"),
            ColumnSpec::optional("strength", "text"),
            ColumnSpec::optional("price", "double precision"),
            ColumnSpec::optional("requires_prescription", "boolean"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("name", name_rule(2, 100))
        .field("manufacturer", text(100))
        .field("dosageForm", FieldRule::new().one_of(DOSAGE_FORMS))
        .field("strength", text(50))
        .field("price", FieldRule::of_type(FieldType::Number).min(0.0))
        .field("requiresPrescription", FieldRule::of_type(FieldType::Boolean));
    ResourceDefinition::new("medicines", table, rules)
}

fn pharmacies(schema: &str) -> Result<ResourceDefinition, ConfigError> {
    let table = TableSpec::new(
        schema,
        "pharmacies",
        vec![
            ColumnSpec::required("name", "text"),
            ColumnSpec::required("address", "text"),
            ColumnSpec::optional("phone", "text"),
            ColumnSpec::optional("email", "text"),
            ColumnSpec::optional("license_number", "text").unique(),
        ],
    );
    let rules = ValidationSchema::new()
        .field("name", name_rule(2, 100))
        .field("address", FieldRule::of_type(FieldType::String).required().length(5, 255))
        .field("phone", pattern("pharmacies", "phone", FieldRule::of_type(FieldType::String), PHONE_PATTERN)?)
        .field("email", FieldRule::of_type(FieldType::Email))
        .field(
            "licenseNumber",
            pattern("pharmacies", "licenseNumber", FieldRule::of_type(FieldType::String), LICENSE_PATTERN)?,
        );
    Ok(ResourceDefinition::new("pharmacies", table, rules).child("prescriptions", "pharmacyId"))
}

fn prescriptions(schema: &str) -> ResourceDefinition {
    let table = TableSpec::new(
        schema,
        "prescriptions",
        vec![
            ColumnSpec::required("patient_id", "bigint").references("patients"),
            ColumnSpec::required("doctor_id", "bigint").references("doctors"),
            ColumnSpec::required("medicine_id", "bigint").references("medicines"),
            ColumnSpec::optional("pharmacy_id", "bigint").references("pharmacies"),
            ColumnSpec::required("dosage", "text"),
            ColumnSpec::required("frequency", "text"),
            ColumnSpec::optional("duration_days", "integer"),
            ColumnSpec::optional("issued_at", "date"),
            ColumnSpec::optional("notes", "text"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("patientId", id_ref().required())
        .field("doctorId", id_ref().required())
        .field("medicineId", id_ref().required())
        .field("pharmacyId", id_ref())
        .field("dosage", FieldRule::of_type(FieldType::String).required().max_length(100))
        .field("frequency", FieldRule::of_type(FieldType::String).required().max_length(100))
        .field("durationDays", integer(1.0, 365.0))
        .field("issuedAt", FieldRule::of_type(FieldType::Date))
        .field("notes", text(2000));
    ResourceDefinition::new("prescriptions", table, rules)
}

fn medical_records(schema: &str) -> ResourceDefinition {
    let table = TableSpec::new(
        schema,
        "medical_records",
        vec![
            ColumnSpec::required("patient_id", "bigint").references("patients"),
            ColumnSpec::required("doctor_id", "bigint").references("doctors"),
            ColumnSpec::optional("disease_id", "bigint").references("diseases"),
            ColumnSpec::required("diagnosis", "text"),
            ColumnSpec::optional("treatment", "text"),
            ColumnSpec::optional("symptom_ids", "jsonb"),
            ColumnSpec::required("record_date", "date"),
            ColumnSpec::optional("attachments", "jsonb"),
            ColumnSpec::optional("notes", "text"),
        ],
    );
    let rules = ValidationSchema::new()
        .field("patientId", id_ref().required())
        .field("doctorId", id_ref().required())
        .field("diseaseId", id_ref())
        .field("diagnosis", FieldRule::of_type(FieldType::String).required().length(2, 2000))
        .field("treatment", text(2000))
        .field(
            "symptomIds",
            FieldRule::of_type(FieldType::Array)
                .custom(positive_id_list)
                .message("symptomIds must be an array of symptom ids"),
        )
        .field("recordDate", FieldRule::of_type(FieldType::Date).required())
        .field("attachments", FieldRule::of_type(FieldType::Array))
        .field("notes", text(2000));
    ResourceDefinition::new("medical-records", table, rules)
}

/// Every resource, ordered so that referenced tables come before the tables referencing them.
pub fn catalog(schema_name: &str) -> Result<Vec<ResourceDefinition>, ConfigError> {
    Ok(vec![
        patients(schema_name)?,
        doctors(schema_name)?,
        diseases(schema_name)?,
        symptoms(schema_name),
        medicines(schema_name),
        pharmacies(schema_name)?,
        appointments(schema_name),
        prescriptions(schema_name),
        medical_records(schema_name),
    ])
}
