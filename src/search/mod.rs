//! Hyperparameter grid search primitives
//!
//! Provides ordered parameter sets, grid definitions, and exhaustive
//! cartesian-product enumeration:
//!
//! - **`ParamValue`**: tagged hyperparameter value (int, float, bool, string)
//! - **`ParamSet`**: one concrete combination, insertion order preserved
//! - **`ParamGrid`**: name -> candidate values, expanded via [`ParamGrid::combinations`]
//!
//! Grid expansion is a pure function: an empty grid yields exactly one empty
//! combination, and a grid with value lists of lengths `l1..lN` yields
//! exactly `l1 * .. * lN` combinations in grid key order.
//!
//! # Example
//!
//! ```
//! use elegir::search::{ParamGrid, ParamValue};
//!
//! let mut grid = ParamGrid::new();
//! grid.add("C", vec![ParamValue::Float(0.1), ParamValue::Float(1.0)]);
//! grid.add("max_iter", vec![ParamValue::Int(200)]);
//!
//! let combos = grid.combinations();
//! assert_eq!(combos.len(), 2);
//! assert_eq!(combos[0].get("C"), Some(&ParamValue::Float(0.1)));
//! assert_eq!(combos[1].get("C"), Some(&ParamValue::Float(1.0)));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors from parameter extraction
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("Parameter '{name}' has type {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Result alias for parameter operations
pub type Result<T> = std::result::Result<T, ParamError>;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer-valued parameter (e.g. `max_iter`)
    Int(i64),
    /// Float-valued parameter (e.g. `C`, `learning_rate`)
    Float(f64),
    /// Boolean flag (e.g. `fit_intercept`)
    Bool(bool),
    /// Categorical parameter (e.g. `max_features`)
    Str(String),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "bool",
            ParamValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v}"),
        }
    }
}

/// One concrete hyperparameter combination
///
/// Backed by a `Vec` rather than a map so that key order is stable and equal
/// to insertion order. Lookups are linear, which is fine at hyperparameter
/// counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParamSet {
    /// Create an empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing value under the same name
    /// without changing its position
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Look up a value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the set holds no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `overrides` into this set, returning a new set
    ///
    /// Precedence is explicit: an override value replaces the base value for
    /// the same name, keeping the base position; override-only names are
    /// appended in override order.
    #[must_use]
    pub fn merged_with(&self, overrides: &ParamSet) -> ParamSet {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.set(name, value.clone());
        }
        merged
    }

    /// Float accessor, accepting int values as floats
    ///
    /// Returns `default` when the name is absent.
    pub fn get_f64(&self, name: &str, default: f64) -> Result<f64> {
        match self.get(name) {
            None => Ok(default),
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            Some(other) => Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected: "float",
                actual: other.type_name(),
            }),
        }
    }

    /// Integer accessor; returns `default` when the name is absent
    pub fn get_i64(&self, name: &str, default: i64) -> Result<i64> {
        match self.get(name) {
            None => Ok(default),
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(other) => Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }

    /// Boolean accessor; returns `default` when the name is absent
    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool> {
        match self.get(name) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected: "bool",
                actual: other.type_name(),
            }),
        }
    }

    /// String accessor; returns `default` when the name is absent
    pub fn get_str<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str> {
        match self.get(name) {
            None => Ok(default),
            Some(ParamValue::Str(v)) => Ok(v.as_str()),
            Some(other) => Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }
}

impl FromIterator<(String, ParamValue)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        let mut set = ParamSet::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}

/// A hyperparameter grid: parameter name -> ordered candidate values
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    axes: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    /// Create an empty grid
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grid axis: one parameter name with its candidate values
    pub fn add(&mut self, name: impl Into<String>, values: Vec<ParamValue>) -> &mut Self {
        self.axes.push((name.into(), values));
        self
    }

    /// Number of combinations the grid expands to
    ///
    /// The product of axis lengths; `1` for an empty grid.
    #[must_use]
    pub fn combination_count(&self) -> usize {
        self.axes.iter().map(|(_, vals)| vals.len()).product()
    }

    /// Expand the grid into every combination (cartesian product)
    ///
    /// Each combination preserves the grid's key order. The last axis varies
    /// fastest. No deduplication is performed.
    #[must_use]
    pub fn combinations(&self) -> Vec<ParamSet> {
        let mut combos = vec![ParamSet::new()];
        for (name, values) in &self.axes {
            let mut expanded = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut next = combo.clone();
                    next.set(name.clone(), value.clone());
                    expanded.push(next);
                }
            }
            combos = expanded;
        }
        combos
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_yields_single_empty_combination() {
        let grid = ParamGrid::new();
        let combos = grid.combinations();
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn test_example_grid_two_combinations() {
        let mut grid = ParamGrid::new();
        grid.add("C", vec![ParamValue::Float(0.1), ParamValue::Float(1.0)]);
        grid.add("max_iter", vec![ParamValue::Int(200)]);

        let combos = grid.combinations();
        assert_eq!(combos.len(), 2);

        assert_eq!(combos[0].get("C"), Some(&ParamValue::Float(0.1)));
        assert_eq!(combos[0].get("max_iter"), Some(&ParamValue::Int(200)));
        assert_eq!(combos[1].get("C"), Some(&ParamValue::Float(1.0)));
        assert_eq!(combos[1].get("max_iter"), Some(&ParamValue::Int(200)));
    }

    #[test]
    fn test_combination_count_matches_product_of_lengths() {
        let mut grid = ParamGrid::new();
        grid.add(
            "a",
            vec![ParamValue::Int(1), ParamValue::Int(2), ParamValue::Int(3)],
        );
        grid.add("b", vec![ParamValue::Bool(true), ParamValue::Bool(false)]);
        grid.add("c", vec![ParamValue::Str("x".into())]);

        assert_eq!(grid.combination_count(), 6);
        assert_eq!(grid.combinations().len(), 6);
    }

    #[test]
    fn test_combinations_have_no_duplicates() {
        let mut grid = ParamGrid::new();
        grid.add("a", vec![ParamValue::Int(1), ParamValue::Int(2)]);
        grid.add("b", vec![ParamValue::Int(10), ParamValue::Int(20)]);

        let combos = grid.combinations();
        for i in 0..combos.len() {
            for j in (i + 1)..combos.len() {
                assert_ne!(combos[i], combos[j]);
            }
        }
    }

    #[test]
    fn test_combination_preserves_key_order() {
        let mut grid = ParamGrid::new();
        grid.add("zeta", vec![ParamValue::Int(1)]);
        grid.add("alpha", vec![ParamValue::Int(2)]);
        grid.add("mid", vec![ParamValue::Int(3)]);

        let combos = grid.combinations();
        let keys: Vec<&str> = combos[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_merge_override_wins() {
        let base: ParamSet = [
            ("solver".to_string(), ParamValue::Str("lbfgs".into())),
            ("C".to_string(), ParamValue::Float(1.0)),
        ]
        .into_iter()
        .collect();

        let mut overrides = ParamSet::new();
        overrides.set("C", ParamValue::Float(0.01));
        overrides.set("max_iter", ParamValue::Int(500));

        let merged = base.merged_with(&overrides);
        assert_eq!(merged.get("solver"), Some(&ParamValue::Str("lbfgs".into())));
        assert_eq!(merged.get("C"), Some(&ParamValue::Float(0.01)));
        assert_eq!(merged.get("max_iter"), Some(&ParamValue::Int(500)));

        let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["solver", "C", "max_iter"]);
    }

    #[test]
    fn test_merge_empty_overrides_is_identity() {
        let mut base = ParamSet::new();
        base.set("n_estimators", ParamValue::Int(100));

        let merged = base.merged_with(&ParamSet::new());
        assert_eq!(merged, base);
    }

    #[test]
    fn test_typed_getter_defaults() {
        let set = ParamSet::new();
        assert_eq!(set.get_f64("C", 1.0).unwrap(), 1.0);
        assert_eq!(set.get_i64("max_iter", 200).unwrap(), 200);
        assert!(set.get_bool("fit_intercept", true).unwrap());
        assert_eq!(set.get_str("max_features", "sqrt").unwrap(), "sqrt");
    }

    #[test]
    fn test_f64_getter_accepts_int() {
        let mut set = ParamSet::new();
        set.set("C", ParamValue::Int(10));
        assert_eq!(set.get_f64("C", 0.0).unwrap(), 10.0);
    }

    #[test]
    fn test_typed_getter_mismatch_is_descriptive() {
        let mut set = ParamSet::new();
        set.set("C", ParamValue::Str("high".into()));

        let err = set.get_f64("C", 1.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("C"));
        assert!(msg.contains("float"));
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::Int(200).to_string(), "200");
        assert_eq!(ParamValue::Float(0.1).to_string(), "0.1");
        assert_eq!(ParamValue::Bool(false).to_string(), "false");
        assert_eq!(ParamValue::Str("sqrt".into()).to_string(), "sqrt");
    }
}

// =============================================================================
// Property Tests
// =============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_axis() -> impl Strategy<Value = (String, Vec<ParamValue>)> {
        ("[a-z]{1,8}", prop::collection::vec(-100i64..100, 1..4))
            .prop_map(|(name, vals)| (name, vals.into_iter().map(ParamValue::Int).collect()))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_combination_count_is_product(axes in prop::collection::vec(arb_axis(), 0..4)) {
            let mut grid = ParamGrid::new();
            let mut expected = 1usize;
            let mut seen = std::collections::HashSet::new();
            for (name, values) in axes {
                // Duplicate axis names would collapse combinations
                if seen.insert(name.clone()) {
                    expected *= values.len();
                    grid.add(name, values);
                }
            }
            prop_assert_eq!(grid.combinations().len(), expected);
        }

        #[test]
        fn prop_every_combination_has_all_keys(axes in prop::collection::vec(arb_axis(), 1..4)) {
            let mut grid = ParamGrid::new();
            let mut names = Vec::new();
            for (name, values) in axes {
                if !names.contains(&name) {
                    names.push(name.clone());
                    grid.add(name, values);
                }
            }
            for combo in grid.combinations() {
                prop_assert_eq!(combo.len(), names.len());
                for name in &names {
                    prop_assert!(combo.get(name).is_some());
                }
            }
        }

        #[test]
        fn prop_merge_override_always_wins(base in -100i64..100, over in -100i64..100) {
            let mut b = ParamSet::new();
            b.set("k", ParamValue::Int(base));
            let mut o = ParamSet::new();
            o.set("k", ParamValue::Int(over));
            let merged = b.merged_with(&o);
            prop_assert_eq!(merged.get("k"), Some(&ParamValue::Int(over)));
        }
    }
}
