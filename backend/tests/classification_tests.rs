//! Tests for the grain classification engine
//! Verifies the composition, unclassified and defect aggregation contracts

use chrono::Utc;
use shared::{
    classify, matches_sub_standard, Condition, GrainRecord, Standard, SubStandard,
};
use uuid::Uuid;

/// Helper to create a grain record
fn grain(length: f64, shape: &str, grain_type: &str) -> GrainRecord {
    GrainRecord {
        length,
        weight: 0.02,
        shape: shape.to_string(),
        grain_type: grain_type.to_string(),
    }
}

/// Helper to create a sub-standard rule
fn rule(
    name: &str,
    shapes: &[&str],
    min: Option<(f64, Condition)>,
    max: Option<(f64, Condition)>,
) -> SubStandard {
    SubStandard {
        key: name.to_string(),
        name: name.to_string(),
        shapes: shapes.iter().map(|s| s.to_string()).collect(),
        min_length: min.map(|(v, _)| v),
        condition_min: min.map(|(_, c)| c).unwrap_or(Condition::Ge),
        max_length: max.map(|(v, _)| v),
        condition_max: max.map(|(_, c)| c).unwrap_or(Condition::Lt),
    }
}

/// Helper to create a standard from rules
fn standard(name: &str, rules: Vec<SubStandard>) -> Standard {
    Standard {
        id: Uuid::new_v4(),
        name: name.to_string(),
        create_date: Utc::now(),
        sub_standards: rules,
    }
}

// =============================================================================
// Composition Classification Tests
// =============================================================================

mod composition {
    use super::*;

    #[test]
    fn half_wholegrain_batch_splits_fifty_fifty() {
        // One rule accepting wholegrain of length >= 7; the broken half of
        // the batch matches nothing
        let std = standard(
            "Full grain only",
            vec![rule("Full", &["wholegrain"], Some((7.0, Condition::Ge)), None)],
        );

        let mut grains: Vec<GrainRecord> =
            (0..10).map(|_| grain(8.0, "wholegrain", "white")).collect();
        grains.extend((0..10).map(|_| grain(8.0, "broken", "white")));

        let summary = classify(&grains, &std);

        assert_eq!(summary.standard_name, "Full grain only");
        assert_eq!(summary.total_samples, 20);
        assert_eq!(summary.classifications.len(), 1);

        let full = &summary.classifications[0];
        assert_eq!(full.name, "Full");
        assert_eq!(full.percentage, 50.0);
        assert_eq!(full.grains.len(), 10);
        assert!(full.grains.iter().all(|g| g.shape == "wholegrain"));

        assert_eq!(summary.unclassified.percentage, 50.0);
        assert_eq!(summary.unclassified.grains.len(), 10);
        assert!(summary
            .unclassified
            .grains
            .iter()
            .all(|g| g.shape == "broken"));
    }

    #[test]
    fn rules_keep_declared_order_in_the_output() {
        let std = standard(
            "Ordered",
            vec![
                rule("Long", &["wholegrain"], Some((7.0, Condition::Ge)), None),
                rule("Short", &["wholegrain"], None, Some((7.0, Condition::Lt))),
            ],
        );
        let grains = vec![
            grain(5.0, "wholegrain", "white"),
            grain(8.0, "wholegrain", "white"),
        ];

        let summary = classify(&grains, &std);
        let names: Vec<&str> = summary
            .classifications
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Long", "Short"]);
    }

    #[test]
    fn grain_matching_two_rules_is_counted_in_both() {
        let std = standard(
            "Overlap",
            vec![
                rule("At least 6", &["wholegrain"], Some((6.0, Condition::Ge)), None),
                rule("At most 8", &["wholegrain"], None, Some((8.0, Condition::Le))),
            ],
        );
        let grains = vec![grain(7.0, "wholegrain", "white")];

        let summary = classify(&grains, &std);

        assert_eq!(summary.classifications.len(), 2);
        for class in &summary.classifications {
            assert_eq!(class.percentage, 100.0);
            assert_eq!(class.grains.len(), 1);
        }

        // Overlapping classes make the percentages sum past 100; that is
        // expected, only the unclassified bucket is a strict complement
        let sum: f64 = summary
            .classifications
            .iter()
            .map(|c| c.percentage)
            .sum();
        assert_eq!(sum, 200.0);
        assert!(summary.unclassified.grains.is_empty());
        assert_eq!(summary.unclassified.percentage, 0.0);
    }

    #[test]
    fn rules_matching_nothing_are_left_out() {
        let std = standard(
            "Sparse",
            vec![
                rule("Full", &["wholegrain"], Some((7.0, Condition::Ge)), None),
                rule("Dust", &["broken"], None, Some((0.5, Condition::Lt))),
            ],
        );
        let grains = vec![grain(7.5, "wholegrain", "white")];

        let summary = classify(&grains, &std);

        // No zero-percentage rows: a consumer cannot assume every
        // configured rule appears in the output
        assert_eq!(summary.classifications.len(), 1);
        assert_eq!(summary.classifications[0].name, "Full");
    }

    #[test]
    fn unknown_shape_codes_fall_through_to_unclassified() {
        // A standard referencing a shape no grain carries never matches;
        // the batch degrades into the unclassified bucket without error
        let std = standard(
            "Misconfigured",
            vec![rule("Ghost", &["longgrain"], None, None)],
        );
        let grains = vec![grain(7.0, "wholegrain", "white")];

        let summary = classify(&grains, &std);
        assert!(summary.classifications.is_empty());
        assert_eq!(summary.unclassified.percentage, 100.0);
    }

    #[test]
    fn length_range_labels_follow_the_conditions() {
        let std = standard(
            "Labels",
            vec![
                rule(
                    "Closed",
                    &["wholegrain"],
                    Some((7.0, Condition::Ge)),
                    Some((9.0, Condition::Lt)),
                ),
                rule("Open top", &["wholegrain"], Some((5.0, Condition::Gt)), None),
                rule("Open bottom", &["wholegrain"], None, Some((9.0, Condition::Le))),
            ],
        );
        let grains = vec![grain(8.0, "wholegrain", "white")];

        let summary = classify(&grains, &std);
        let ranges: Vec<&str> = summary
            .classifications
            .iter()
            .map(|c| c.length_range.as_str())
            .collect();
        assert_eq!(ranges, vec!["≥7 - <9", ">5", "≤9"]);
    }
}

// =============================================================================
// Boundary Condition Tests
// =============================================================================

mod boundaries {
    use super::*;

    #[test]
    fn inclusive_operators_accept_the_threshold() {
        let r = rule(
            "Inclusive",
            &["wholegrain"],
            Some((7.0, Condition::Ge)),
            Some((9.0, Condition::Le)),
        );
        assert!(matches_sub_standard(&grain(7.0, "wholegrain", "white"), &r));
        assert!(matches_sub_standard(&grain(9.0, "wholegrain", "white"), &r));
    }

    #[test]
    fn exclusive_operators_reject_the_threshold() {
        let r = rule(
            "Exclusive",
            &["wholegrain"],
            Some((7.0, Condition::Gt)),
            Some((9.0, Condition::Lt)),
        );
        assert!(!matches_sub_standard(&grain(7.0, "wholegrain", "white"), &r));
        assert!(!matches_sub_standard(&grain(9.0, "wholegrain", "white"), &r));
        assert!(matches_sub_standard(&grain(8.0, "wholegrain", "white"), &r));
    }

    #[test]
    fn shape_gate_applies_before_length() {
        let r = rule("Full", &["wholegrain"], Some((7.0, Condition::Ge)), None);
        // Length alone would match; the shape gate rejects first
        assert!(!matches_sub_standard(&grain(8.0, "broken", "white"), &r));
    }
}

// =============================================================================
// Degenerate Input Tests
// =============================================================================

mod degenerate {
    use super::*;

    #[test]
    fn empty_batch_produces_the_zero_summary() {
        let std = standard(
            "Any",
            vec![rule("Full", &["wholegrain"], Some((7.0, Condition::Ge)), None)],
        );

        let summary = classify(&[], &std);

        assert_eq!(summary.total_samples, 0);
        assert!(summary.classifications.is_empty());
        assert_eq!(summary.unclassified.percentage, 0.0);
        assert!(summary.unclassified.grains.is_empty());
        assert!(summary.defects.is_empty());

        // Nothing in the zero summary is NaN or infinite
        assert!(summary.unclassified.percentage.is_finite());
    }

    #[test]
    fn standard_without_rules_leaves_everything_unclassified() {
        let std = standard("Empty", Vec::new());
        let grains = vec![grain(7.0, "wholegrain", "white")];

        let summary = classify(&grains, &std);
        assert!(summary.classifications.is_empty());
        assert_eq!(summary.unclassified.percentage, 100.0);
        assert_eq!(summary.unclassified.grains.len(), 1);
        // Defects are independent of composition and still reported
        assert_eq!(summary.defects.len(), 1);
    }
}

// =============================================================================
// Defect Breakdown Tests
// =============================================================================

mod defects {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn two_types_split_fifty_fifty() {
        let std = standard("Any", vec![rule("All", &["wholegrain"], None, None)]);
        let mut grains: Vec<GrainRecord> =
            (0..5).map(|_| grain(7.0, "wholegrain", "yellow")).collect();
        grains.extend((0..5).map(|_| grain(7.0, "wholegrain", "white")));

        let summary = classify(&grains, &std);

        // Order-independent: compare as a set
        let defects: HashSet<(String, String)> = summary
            .defects
            .iter()
            .map(|d| (d.grain_type.clone(), format!("{:.2}", d.percentage)))
            .collect();
        let expected: HashSet<(String, String)> = [
            ("yellow".to_string(), "50.00".to_string()),
            ("white".to_string(), "50.00".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(defects, expected);
    }

    #[test]
    fn only_observed_types_are_reported() {
        let std = standard("Any", vec![rule("All", &["wholegrain"], None, None)]);
        let grains = vec![grain(7.0, "wholegrain", "chalky")];

        let summary = classify(&grains, &std);
        assert_eq!(summary.defects.len(), 1);
        assert_eq!(summary.defects[0].grain_type, "chalky");
        assert_eq!(summary.defects[0].percentage, 100.0);
    }

    #[test]
    fn defect_percentages_sum_to_one_hundred() {
        let std = standard("Any", vec![rule("All", &["wholegrain"], None, None)]);
        let grains = vec![
            grain(7.0, "wholegrain", "white"),
            grain(7.0, "wholegrain", "white"),
            grain(7.0, "wholegrain", "yellow"),
            grain(7.0, "wholegrain", "red"),
            grain(7.0, "wholegrain", "chalky"),
            grain(7.0, "wholegrain", "chalky"),
            grain(7.0, "wholegrain", "paddy"),
        ];

        let summary = classify(&grains, &std);
        let sum: f64 = summary.defects.iter().map(|d| d.percentage).sum();
        // Types partition the batch; rounding may leave up to 0.01 per type
        let epsilon = 0.01 * summary.defects.len() as f64;
        assert!((sum - 100.0).abs() <= epsilon);
    }

    #[test]
    fn defects_ignore_shape_and_length() {
        // Grains the composition rules reject still count toward defects
        let std = standard(
            "Strict",
            vec![rule("Full", &["wholegrain"], Some((7.0, Condition::Ge)), None)],
        );
        let grains = vec![
            grain(2.0, "broken", "damage"),
            grain(8.0, "wholegrain", "white"),
        ];

        let summary = classify(&grains, &std);
        assert_eq!(summary.defects.len(), 2);
        let types: HashSet<&str> = summary
            .defects
            .iter()
            .map(|d| d.grain_type.as_str())
            .collect();
        assert!(types.contains("damage"));
        assert!(types.contains("white"));
    }
}

// =============================================================================
// Property Tests
// =============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_grain() -> impl Strategy<Value = GrainRecord> {
        (
            0.1f64..15.0,
            prop::sample::select(vec!["wholegrain", "broken"]),
            prop::sample::select(vec!["white", "yellow", "red", "chalky"]),
        )
            .prop_map(|(length, shape, grain_type)| grain(length, shape, grain_type))
    }

    proptest! {
        #[test]
        fn unclassified_never_overlaps_a_class(
            grains in prop::collection::vec(arb_grain(), 0..50),
            threshold in 1.0f64..12.0,
        ) {
            let std = standard(
                "Generated",
                vec![rule("Full", &["wholegrain"], Some((threshold, Condition::Ge)), None)],
            );
            let summary = classify(&grains, &std);

            for unmatched in &summary.unclassified.grains {
                for class in &summary.classifications {
                    prop_assert!(!class.grains.contains(unmatched));
                }
            }
        }

        #[test]
        fn every_grain_is_counted_somewhere(
            grains in prop::collection::vec(arb_grain(), 1..50),
            threshold in 1.0f64..12.0,
        ) {
            let std = standard(
                "Generated",
                vec![rule("Full", &["wholegrain"], Some((threshold, Condition::Ge)), None)],
            );
            let summary = classify(&grains, &std);

            // With a single rule the classified and unclassified buckets
            // partition the batch exactly
            let classified: usize = summary
                .classifications
                .iter()
                .map(|c| c.grains.len())
                .sum();
            prop_assert_eq!(classified + summary.unclassified.grains.len(), grains.len());
        }
    }
}

// =============================================================================
// Determinism Tests
// =============================================================================

mod determinism {
    use super::*;

    #[test]
    fn classify_is_pure_and_repeatable() {
        let std = standard(
            "Thai Hom Mali",
            vec![
                rule(
                    "Full",
                    &["wholegrain"],
                    Some((7.0, Condition::Ge)),
                    Some((9.0, Condition::Lt)),
                ),
                rule("Broken", &["broken"], None, Some((4.0, Condition::Le))),
            ],
        );
        let grains = vec![
            grain(7.5, "wholegrain", "white"),
            grain(3.2, "broken", "chalky"),
            grain(6.1, "wholegrain", "yellow"),
        ];

        let first = classify(&grains, &std);
        let second = classify(&grains, &std);
        assert_eq!(first, second);
    }

    #[test]
    fn rounding_is_stable_at_two_decimals() {
        // 1 of 3 -> 33.33, 2 of 3 -> 66.67
        let std = standard(
            "Rounding",
            vec![rule("Full", &["wholegrain"], Some((7.0, Condition::Ge)), None)],
        );
        let grains = vec![
            grain(8.0, "wholegrain", "white"),
            grain(5.0, "wholegrain", "white"),
            grain(5.0, "wholegrain", "white"),
        ];

        let summary = classify(&grains, &std);
        assert_eq!(summary.classifications[0].percentage, 33.33);
        assert_eq!(summary.unclassified.percentage, 66.67);
    }
}
