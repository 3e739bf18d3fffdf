//! WebAssembly module for the Rice Quality Inspection Platform
//!
//! Provides client-side computation for:
//! - Grain batch classification (result preview before upload)
//! - Standard validation in the admin form
//! - Grain file validation before submission

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Classify a grain batch against a standard, both given as JSON
///
/// Returns the inspection summary as a JSON string.
#[wasm_bindgen]
pub fn classify_grain_batch(grains_json: &str, standard_json: &str) -> Result<String, JsValue> {
    let grains: Vec<GrainRecord> = serde_json::from_str(grains_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid grains JSON: {}", e)))?;

    let standard: Standard = serde_json::from_str(standard_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid standard JSON: {}", e)))?;

    let summary = shared::classify(&grains, &standard);

    serde_json::to_string(&summary)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize summary: {}", e)))
}

/// Check whether one grain satisfies one sub-standard rule
#[wasm_bindgen]
pub fn grain_matches_rule(grain_json: &str, rule_json: &str) -> Result<bool, JsValue> {
    let grain: GrainRecord = serde_json::from_str(grain_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid grain JSON: {}", e)))?;

    let rule: SubStandard = serde_json::from_str(rule_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid rule JSON: {}", e)))?;

    Ok(shared::matches_sub_standard(&grain, &rule))
}

/// Validate a standard's rule list from the admin form
///
/// Returns an empty string when valid, otherwise the error message.
#[wasm_bindgen]
pub fn validate_standard_rules(rules_json: &str) -> String {
    let rules: Vec<SubStandard> = match serde_json::from_str(rules_json) {
        Ok(rules) => rules,
        Err(e) => return format!("Invalid rules JSON: {}", e),
    };

    match validate_sub_standards(&rules) {
        Ok(()) => String::new(),
        Err(msg) => msg.to_string(),
    }
}

/// Validate an uploaded grain file before submission
///
/// Returns an empty string when valid, otherwise the error message.
#[wasm_bindgen]
pub fn validate_grain_file(payload_json: &str) -> String {
    let payload: InspectionPayload = match serde_json::from_str(payload_json) {
        Ok(payload) => payload,
        Err(e) => return format!("Invalid grain file: {}", e),
    };

    match validate_grain_batch(&payload.grains) {
        Ok(()) => String::new(),
        Err(msg) => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_JSON: &str = r#"{
        "id": "00000000-0000-0000-0000-000000000000",
        "name": "Thai Hom Mali",
        "createDate": "2024-09-17T00:00:00Z",
        "subStandards": [{
            "key": "full_grain",
            "name": "Full grain",
            "shapes": ["wholegrain"],
            "minLength": 7.0,
            "conditionMin": "GE",
            "maxLength": null,
            "conditionMax": "LT"
        }]
    }"#;

    #[test]
    fn classifies_a_batch_from_json() {
        let grains = r#"[
            { "length": 8.0, "weight": 0.02, "shape": "wholegrain", "type": "white" },
            { "length": 8.0, "weight": 0.02, "shape": "broken", "type": "white" }
        ]"#;

        let summary_json = classify_grain_batch(grains, STANDARD_JSON).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&summary_json).unwrap();

        assert_eq!(summary["totalSamples"], 2);
        assert_eq!(summary["classifications"][0]["percentage"], 50.0);
        assert_eq!(summary["unclassified"]["percentage"], 50.0);
    }

    #[test]
    fn rule_matching_from_json() {
        let rule = r#"{
            "key": "full_grain",
            "name": "Full grain",
            "shapes": ["wholegrain"],
            "minLength": 7.0,
            "conditionMin": "GE",
            "maxLength": null,
            "conditionMax": "LT"
        }"#;
        let long = r#"{ "length": 7.5, "weight": 0.02, "shape": "wholegrain", "type": "white" }"#;
        let short = r#"{ "length": 6.0, "weight": 0.02, "shape": "wholegrain", "type": "white" }"#;

        assert!(grain_matches_rule(long, rule).unwrap());
        assert!(!grain_matches_rule(short, rule).unwrap());
    }

    #[test]
    fn standard_validation_reports_errors() {
        assert!(!validate_standard_rules("[]").is_empty());

        let valid = r#"[{
            "key": "full_grain",
            "name": "Full grain",
            "shapes": ["wholegrain"],
            "minLength": 7.0,
            "conditionMin": "GE",
            "maxLength": null,
            "conditionMax": "LT"
        }]"#;
        assert_eq!(validate_standard_rules(valid), "");
    }

    #[test]
    fn grain_file_validation_reports_errors() {
        let empty = r#"{ "requestID": "r1", "imageURL": "u", "grains": [] }"#;
        assert!(!validate_grain_file(empty).is_empty());

        let valid = r#"{
            "requestID": "r1",
            "imageURL": "u",
            "grains": [{ "length": 6.0, "weight": 0.02, "shape": "broken", "type": "white" }]
        }"#;
        assert_eq!(validate_grain_file(valid), "");
    }
}
