//! Left-biased union of parameter sets

use crate::types::ParameterSet;
use std::collections::HashSet;

/// Every record of `primary`, followed by the records of `secondary` whose
/// names are not already present. On a name clash the left-most record wins.
pub fn merge(primary: &ParameterSet, secondary: &ParameterSet) -> ParameterSet {
    let mut result = primary.clone();
    let mut seen: HashSet<String> = primary.iter().map(|r| r.name.clone()).collect();

    for record in secondary {
        if seen.insert(record.name.clone()) {
            result.push(record.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParameterRecord, Value};
    use pretty_assertions::assert_eq;

    fn set(entries: &[(&str, f64)]) -> ParameterSet {
        entries
            .iter()
            .map(|(name, v)| ParameterRecord::new(*name, Value::Dimensionless(*v), ""))
            .collect()
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = set(&[("a", 1.0), ("b", 2.0)]);
        assert_eq!(merge(&a, &a), a);
    }

    #[test]
    fn test_merge_left_bias() {
        let a = set(&[("x", 1.0), ("y", 2.0)]);
        let b = set(&[("z", 9.0), ("y", 20.0), ("w", 7.0)]);

        let merged = merge(&a, &b);
        assert_eq!(merged.names(), vec!["x", "y", "z", "w"]);
        assert_eq!(merged.get("y").unwrap().value, Value::Dimensionless(2.0));
    }

    #[test]
    fn test_merge_with_empty() {
        let a = set(&[("a", 1.0)]);
        let empty = ParameterSet::new();
        assert_eq!(merge(&a, &empty), a);
        assert_eq!(merge(&empty, &a), a);
    }
}
