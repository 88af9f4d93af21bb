//! What an overwrite of the parameter table will remove or change

use crate::diagnostics::Diagnostics;
use crate::types::{DiffEvent, ParameterSet, Value};

/// Value equality as used by the diff
///
/// Quantities compare by raw magnitude: both sides are already normalized to
/// their family's base unit on decode, and no cross-family conversion is
/// attempted.
pub struct ValueComparator;

impl ValueComparator {
    pub fn equal(a: &Value, b: &Value, diagnostics: &mut Diagnostics) -> bool {
        match (a, b) {
            (Value::Quantity { magnitude: x, .. }, Value::Quantity { magnitude: y, .. }) => x == y,
            (Value::Dimensionless(x), Value::Dimensionless(y)) => x == y,
            _ => {
                diagnostics.warn(format!(
                    "Cannot compare {} with {}, treating them as different",
                    a, b
                ));
                false
            }
        }
    }
}

/// Records of `previous` that `next` removes or changes, in `previous` order.
/// Names only present in `next` are additions and are not reported.
pub fn diff(
    previous: &ParameterSet,
    next: &ParameterSet,
    diagnostics: &mut Diagnostics,
) -> Vec<DiffEvent> {
    let mut events = Vec::new();

    for old in previous {
        match next.get(&old.name) {
            None => events.push(DiffEvent::Removed {
                name: old.name.clone(),
                value: old.value,
                description: old.description.clone(),
            }),
            Some(new) => {
                if !ValueComparator::equal(&old.value, &new.value, diagnostics) {
                    events.push(DiffEvent::Changed {
                        name: old.name.clone(),
                        old: old.value,
                        new: new.value,
                    });
                }
            }
        }
    }

    events
}
