//! Grain measurement models

use serde::{Deserialize, Serialize};

/// One measured kernel as reported by the imaging process
///
/// Shape and type are open sets of lowercase codes driven by lookup tables;
/// the classification engine treats both as opaque keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrainRecord {
    /// Kernel length in millimetres
    pub length: f64,
    /// Kernel weight in grams
    pub weight: f64,
    /// Morphology code, e.g. "wholegrain" or "broken"
    pub shape: String,
    /// Quality/defect code, e.g. "white", "yellow", "chalky"
    #[serde(rename = "type")]
    pub grain_type: String,
}

/// Raw measurement batch exported by the imaging process
///
/// This is the JSON document users upload when creating an inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionPayload {
    #[serde(rename = "requestID")]
    pub request_id: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub grains: Vec<GrainRecord>,
}

/// Shape codes seeded into the lookup table (new codes are added on sight)
pub const RICE_SHAPE_CODES: &[&str] = &["wholegrain", "broken"];

/// Type codes seeded into the lookup table (new codes are added on sight)
pub const RICE_TYPE_CODES: &[&str] = &[
    "white",
    "yellow",
    "red",
    "damage",
    "paddy",
    "chalky",
    "glutinous",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_imaging_export() {
        let json = r#"{
            "requestID": "req-20240917-0001",
            "imageURL": "https://storage.example.com/inspections/0001.jpg",
            "grains": [
                { "length": 7.2, "weight": 0.021, "shape": "wholegrain", "type": "white" },
                { "length": 3.1, "weight": 0.009, "shape": "broken", "type": "chalky" }
            ]
        }"#;

        let payload: InspectionPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.request_id, "req-20240917-0001");
        assert_eq!(payload.grains.len(), 2);
        assert_eq!(payload.grains[0].grain_type, "white");
        assert_eq!(payload.grains[1].shape, "broken");
    }

    #[test]
    fn grain_serializes_type_field() {
        let grain = GrainRecord {
            length: 6.8,
            weight: 0.02,
            shape: "wholegrain".to_string(),
            grain_type: "yellow".to_string(),
        };
        let json = serde_json::to_value(&grain).unwrap();
        assert_eq!(json["type"], "yellow");
        assert!(json.get("grain_type").is_none());
    }
}
