//! Grain classification engine
//!
//! Pure, stateless computation: a batch of grain measurements and a standard
//! go in, an [`InspectionSummary`] comes out. Safe to call concurrently from
//! any number of request handlers.
//!
//! Composition classes are not mutually exclusive: a grain may satisfy
//! several rules and is counted in each, so classification percentages need
//! not sum to 100. The unclassified bucket is the strict complement of
//! "matched at least one rule". Defect percentages partition the batch by
//! type code and sum to 100 up to rounding.

use crate::models::{
    ClassificationResult, Condition, DefectResult, GrainRecord, InspectionSummary, Standard,
    SubStandard, UnclassifiedResult,
};

/// Compare a kernel length against a rule threshold
pub fn evaluate_condition(value: f64, condition: Condition, threshold: f64) -> bool {
    match condition {
        Condition::Lt => value < threshold,
        Condition::Le => value <= threshold,
        Condition::Gt => value > threshold,
        Condition::Ge => value >= threshold,
    }
}

/// Does this grain satisfy this composition rule?
///
/// Shape is a hard gate; a missing length bound is always satisfied.
pub fn matches_sub_standard(grain: &GrainRecord, rule: &SubStandard) -> bool {
    if !rule.shapes.iter().any(|s| s == &grain.shape) {
        return false;
    }

    let meets_min = match rule.min_length {
        Some(threshold) => evaluate_condition(grain.length, rule.condition_min, threshold),
        None => true,
    };

    let meets_max = match rule.max_length {
        Some(threshold) => evaluate_condition(grain.length, rule.condition_max, threshold),
        None => true,
    };

    meets_min && meets_max
}

/// Classify a grain batch against a standard
///
/// An empty batch short-circuits to the zero summary so no percentage is
/// ever NaN. Rules that match nothing are omitted from `classifications`,
/// and only observed type codes appear in `defects`; `unclassified` is
/// always emitted.
pub fn classify(grains: &[GrainRecord], standard: &Standard) -> InspectionSummary {
    let total = grains.len();
    if total == 0 {
        return InspectionSummary {
            standard_name: standard.name.clone(),
            total_samples: 0,
            classifications: Vec::new(),
            unclassified: UnclassifiedResult {
                percentage: 0.0,
                grains: Vec::new(),
            },
            defects: Vec::new(),
        };
    }

    // Composition: shape/length classification per rule, declared order
    let mut classifications = Vec::new();
    for rule in &standard.sub_standards {
        let matching: Vec<GrainRecord> = grains
            .iter()
            .filter(|grain| matches_sub_standard(grain, rule))
            .cloned()
            .collect();

        if !matching.is_empty() {
            classifications.push(ClassificationResult {
                name: rule.name.clone(),
                percentage: percentage(matching.len(), total),
                length_range: length_range_label(rule),
                grains: matching,
            });
        }
    }

    let unclassified_grains: Vec<GrainRecord> = grains
        .iter()
        .filter(|grain| {
            !standard
                .sub_standards
                .iter()
                .any(|rule| matches_sub_standard(grain, rule))
        })
        .cloned()
        .collect();

    let unclassified = UnclassifiedResult {
        percentage: percentage(unclassified_grains.len(), total),
        grains: unclassified_grains,
    };

    // Defect: type classification, independent of shape and length.
    // First-seen order; type sets are small so a linear scan is fine.
    let mut type_counts: Vec<(String, usize)> = Vec::new();
    for grain in grains {
        match type_counts.iter_mut().find(|(t, _)| t == &grain.grain_type) {
            Some((_, count)) => *count += 1,
            None => type_counts.push((grain.grain_type.clone(), 1)),
        }
    }

    let defects = type_counts
        .into_iter()
        .map(|(grain_type, count)| DefectResult {
            grain_type,
            percentage: percentage(count, total),
        })
        .collect();

    InspectionSummary {
        standard_name: standard.name.clone(),
        total_samples: total,
        classifications,
        unclassified,
        defects,
    }
}

/// Share of the batch, rounded half away from zero to two decimals
fn percentage(count: usize, total: usize) -> f64 {
    round2(count as f64 / total as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render a rule's length bounds for display, e.g. "≥7 - <9"
///
/// A missing bound is left out; a rule with no bounds renders "-".
fn length_range_label(rule: &SubStandard) -> String {
    let min_op = if rule.condition_min == Condition::Ge { "≥" } else { ">" };
    let max_op = if rule.condition_max == Condition::Le { "≤" } else { "<" };
    let min = rule.min_length.map(|v| format!("{}{}", min_op, v));
    let max = rule.max_length.map(|v| format!("{}{}", max_op, v));

    match (min, max) {
        (Some(min), Some(max)) => format!("{} - {}", min, max),
        (Some(min), None) => min,
        (None, Some(max)) => max,
        (None, None) => "-".to_string(),
    }
}
