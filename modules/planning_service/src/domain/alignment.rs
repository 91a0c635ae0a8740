//! Objective alignment weight rules
//!
//! A strategic objective distributes 100% of its weight across
//! (PND objective, ODS goal) pairs. A replacement set is accepted or
//! rejected as a whole: per-item range first, then pair uniqueness, then the
//! total.

use crate::contract::{AlignmentTarget, FieldError, PlanningError};
use std::collections::HashSet;

/// Weight a complete alignment set must add up to
pub const TOTAL_WEIGHT: f64 = 100.0;

/// Absolute tolerance on the total
pub const WEIGHT_TOLERANCE: f64 = 0.01;

// Absorbs binary representation error after rounding to two decimals.
const EPSILON: f64 = 1e-9;

/// Round a weight to its two-decimal stored precision
pub fn round_weight(weight: f64) -> f64 {
    (weight * 100.0).round() / 100.0
}

/// `None` when `weight` lies in (0, 100]
pub fn weight_error(field: &str, weight: f64) -> Option<FieldError> {
    if weight.is_finite() && round_weight(weight) > 0.0 && weight <= TOTAL_WEIGHT {
        None
    } else {
        Some(FieldError::new(
            field,
            format!("must be greater than 0 and at most 100, got {weight}"),
        ))
    }
}

/// Sum of weights at stored precision
pub fn total_weight(weights: impl IntoIterator<Item = f64>) -> f64 {
    round_weight(weights.into_iter().map(round_weight).sum())
}

pub fn is_complete(total: f64) -> bool {
    (total - TOTAL_WEIGHT).abs() <= WEIGHT_TOLERANCE + EPSILON
}

/// Check a replacement set and return it with weights rounded to stored
/// precision.
pub fn validate_alignment_set(
    targets: &[AlignmentTarget],
) -> Result<Vec<AlignmentTarget>, PlanningError> {
    let errors: Vec<FieldError> = targets
        .iter()
        .enumerate()
        .filter_map(|(i, t)| weight_error(&format!("alignments[{i}].weight"), t.weight))
        .collect();
    if !errors.is_empty() {
        return Err(PlanningError::Validation { errors });
    }

    let mut seen = HashSet::with_capacity(targets.len());
    for target in targets {
        if !seen.insert((target.pnd_objective_id, target.ods_goal_id)) {
            return Err(PlanningError::conflict(format!(
                "duplicate alignment pair (pnd_objective_id={}, ods_goal_id={})",
                target.pnd_objective_id, target.ods_goal_id
            )));
        }
    }

    let total = total_weight(targets.iter().map(|t| t.weight));
    if !is_complete(total) {
        return Err(PlanningError::invalid(
            "alignments",
            format!("weights must sum to 100 (±{WEIGHT_TOLERANCE}), got {total:.2}"),
        ));
    }

    Ok(targets
        .iter()
        .map(|t| AlignmentTarget {
            weight: round_weight(t.weight),
            ..*t
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(pnd: i32, ods: i32, weight: f64) -> AlignmentTarget {
        AlignmentTarget {
            pnd_objective_id: pnd,
            ods_goal_id: ods,
            weight,
        }
    }

    #[test]
    fn accepts_complete_set() {
        let set = validate_alignment_set(&[target(1, 1, 60.0), target(2, 2, 40.0)]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].weight, 60.0);
    }

    #[test]
    fn accepts_within_tolerance() {
        assert!(validate_alignment_set(&[
            target(1, 1, 33.33),
            target(2, 2, 33.33),
            target(3, 3, 33.33),
        ])
        .is_ok());
        assert!(validate_alignment_set(&[target(1, 1, 50.0), target(2, 2, 50.01)]).is_ok());
    }

    #[test]
    fn rejects_sum_of_99_with_computed_total() {
        let err = validate_alignment_set(&[target(1, 1, 60.0), target(2, 2, 39.0)]).unwrap_err();
        match err {
            PlanningError::Validation { errors } => {
                assert_eq!(errors[0].field, "alignments");
                assert!(errors[0].message.contains("99.00"), "{}", errors[0].message);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_sum_above_tolerance() {
        assert!(validate_alignment_set(&[target(1, 1, 50.0), target(2, 2, 50.02)]).is_err());
    }

    #[test]
    fn rejects_empty_set() {
        assert!(matches!(
            validate_alignment_set(&[]),
            Err(PlanningError::Validation { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_pair_as_conflict() {
        let err = validate_alignment_set(&[target(1, 4, 50.0), target(1, 4, 50.0)]).unwrap_err();
        match err {
            PlanningError::Conflict { reason } => {
                assert!(reason.contains("pnd_objective_id=1"));
                assert!(reason.contains("ods_goal_id=4"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn same_pnd_with_different_ods_is_not_a_duplicate() {
        assert!(validate_alignment_set(&[target(1, 1, 50.0), target(1, 2, 50.0)]).is_ok());
    }

    #[test]
    fn item_range_is_checked_before_the_total() {
        let err = validate_alignment_set(&[
            target(1, 1, 0.0),
            target(2, 2, 100.0),
            target(3, 3, f64::NAN),
        ])
        .unwrap_err();
        match err {
            PlanningError::Validation { errors } => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["alignments[0].weight", "alignments[2].weight"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn weight_bounds() {
        assert!(weight_error("w", 100.0).is_none());
        assert!(weight_error("w", 0.01).is_none());
        assert!(weight_error("w", 0.0).is_some());
        assert!(weight_error("w", -5.0).is_some());
        assert!(weight_error("w", 100.001).is_some());
        assert!(weight_error("w", f64::INFINITY).is_some());
    }

    #[test]
    fn weights_are_rounded_to_two_decimals() {
        let set = validate_alignment_set(&[target(1, 1, 33.333), target(2, 2, 66.667)]).unwrap();
        assert_eq!(set[0].weight, 33.33);
        assert_eq!(set[1].weight, 66.67);
    }
}
