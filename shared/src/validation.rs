//! Validation utilities for the Rice Quality Inspection Platform
//!
//! Standards are validated when an administrator saves them; grain batches
//! are validated at ingestion. The classification engine itself accepts any
//! stored data and degrades by leaving grains unclassified.

use rust_decimal::Decimal;

use crate::models::{GrainRecord, SamplingPoint, SubStandard};

/// Highest price (THB per kg) the inspection form accepts
pub const MAX_INSPECTION_PRICE: u32 = 100_000;

/// Validate a standard's rule list before it is stored
pub fn validate_sub_standards(rules: &[SubStandard]) -> Result<(), &'static str> {
    if rules.is_empty() {
        return Err("Standard must define at least one sub-standard");
    }

    for (i, rule) in rules.iter().enumerate() {
        if rule.key.trim().is_empty() {
            return Err("Sub-standard key is required");
        }
        if rule.name.trim().is_empty() {
            return Err("Sub-standard name is required");
        }
        if rule.shapes.is_empty() {
            return Err("Sub-standard must accept at least one shape");
        }
        if rules[..i].iter().any(|earlier| earlier.key == rule.key) {
            return Err("Sub-standard keys must be unique within a standard");
        }
        if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
            if min > max {
                return Err("Sub-standard minimum length exceeds maximum length");
            }
        }
        for bound in [rule.min_length, rule.max_length].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err("Sub-standard length bounds must be non-negative numbers");
            }
        }
    }

    Ok(())
}

/// Validate one grain measurement from the imaging export
pub fn validate_grain(grain: &GrainRecord) -> Result<(), &'static str> {
    if !grain.length.is_finite() || grain.length <= 0.0 {
        return Err("Grain length must be a positive number");
    }
    if !grain.weight.is_finite() || grain.weight < 0.0 {
        return Err("Grain weight cannot be negative");
    }
    if grain.shape.trim().is_empty() {
        return Err("Grain shape code is required");
    }
    if grain.grain_type.trim().is_empty() {
        return Err("Grain type code is required");
    }
    Ok(())
}

/// Validate a whole uploaded batch
pub fn validate_grain_batch(grains: &[GrainRecord]) -> Result<(), &'static str> {
    if grains.is_empty() {
        return Err("Grain file contains no measurements");
    }
    for grain in grains {
        validate_grain(grain)?;
    }
    Ok(())
}

/// Validate the optional inspection price (0 - 100,000 THB)
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO || price > Decimal::from(MAX_INSPECTION_PRICE) {
        return Err("Price must be between 0 and 100,000");
    }
    Ok(())
}

/// Resolve a sampling point code from the inspection form
pub fn validate_sampling_point(code: &str) -> Result<SamplingPoint, &'static str> {
    SamplingPoint::from_code(code).ok_or("Unknown sampling point")
}
