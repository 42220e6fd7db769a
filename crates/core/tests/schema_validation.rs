//! Validates serialized intent records and constraint sets against the
//! JSON schemas in schema/.

use std::path::Path;

const CORPUS: &[&str] = &[
    "User can withdraw money from account if balance >= amount",
    "User must authenticate where password_data contains \"uppercase\"",
    "System shall validate transaction if amount > 0 and amount < 10000",
    "Admin may delete \"audit log\" from storage if not (retention at_least 30 or hold == true)",
    "Service will process order if total % 2 where token is_not_set and note does_not_contain \"x\"",
    "API should export report to \"s3 bucket\" if region equals \"eu\" or region not_equals zone",
];

fn load_validator(file: &str) -> jsonschema::Validator {
    let schema_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../schema")
        .join(file);
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

#[test]
fn intent_records_match_schema() {
    let validator = load_validator("intent-record.schema.json");
    let mut failures = Vec::new();

    for line in CORPUS {
        let record = crucible_core::parse_one(line)
            .unwrap_or_else(|e| panic!("corpus line should parse: {}\n{}", line, e));
        let instance = serde_json::to_value(&record).unwrap();
        if let Err(error) = validator.validate(&instance) {
            failures.push(format!("{}: {}", line, error));
        }
    }

    assert!(
        failures.is_empty(),
        "Schema validation failed for {} of {} records:\n{}",
        failures.len(),
        CORPUS.len(),
        failures.join("\n")
    );
}

#[test]
fn constraint_set_matches_schema() {
    let validator = load_validator("constraint-set.schema.json");
    let records: Vec<_> = CORPUS
        .iter()
        .map(|line| crucible_core::parse_one(line).unwrap())
        .collect();
    let set = crucible_core::translate(&records).unwrap();
    let instance = serde_json::to_value(&set).unwrap();
    if let Err(error) = validator.validate(&instance) {
        panic!("constraint set does not match schema: {}\n{:#}", error, instance);
    }
}

#[test]
fn schema_rejects_unknown_modal() {
    let validator = load_validator("intent-record.schema.json");
    let instance = serde_json::json!({
        "subject": "User",
        "modal": "might",
        "action": { "verb": "login" }
    });
    assert!(validator.validate(&instance).is_err());
}
