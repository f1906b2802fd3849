//! Built-in attribute plan modifiers

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::Dynamic;

/// Keeps the prior state value when the planned value is unknown
///
/// Intended for computed attributes such as server-assigned ids that never
/// change after creation.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "Once set, the value of this attribute in state will not change.".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let plan_value = if request.plan_value.is_unknown() && !request.state_value.is_null() {
            request.state_value
        } else {
            request.plan_value
        };

        PlanModifierResponse {
            plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

/// Forces replacement of the resource when the value changes
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "If the value of this attribute changes, Terraform will destroy and recreate the resource."
            .to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        // Creation (null prior state) and unknown plans never force replacement
        let requires_replace = !request.state_value.is_null()
            && !request.state_value.is_unknown()
            && !request.plan_value.is_unknown()
            && !values_equal(&request.state_value, &request.plan_value);

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Structural equality that treats lists as sets when both hold the same
/// elements in a different order
pub fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Number(a), Dynamic::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Dynamic::List(a), Dynamic::List(b)) => {
            a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| values_equal(x, y)))
        }
        (Dynamic::Map(a), Dynamic::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        _ => a == b,
    }
}
