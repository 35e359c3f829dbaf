//! Variable values produced by a solver.

use std::collections::HashMap;

use crate::error::ModelError;

use super::{RoutingModel, VarId};

/// Binary variables above this value count as selected.
pub const BINARY_THRESHOLD: f64 = 0.5;

/// One value per model variable, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    /// Every variable at its lower bound.
    pub fn at_lower_bounds(model: &RoutingModel) -> Self {
        Self {
            values: model
                .layout()
                .ids()
                .map(|var| model.bounds(var).lower)
                .collect(),
        }
    }

    /// Wraps a dense value vector in layout order.
    pub fn from_values(model: &RoutingModel, values: Vec<f64>) -> Result<Self, ModelError> {
        if values.len() != model.num_variables() {
            return Err(ModelError::AssignmentSize {
                expected: model.num_variables(),
                actual: values.len(),
            });
        }
        if let Some(var) = model.layout().ids().find(|v| !values[v.index()].is_finite()) {
            return Err(ModelError::NonFiniteValue {
                name: model.var_name(var),
                value: values[var.index()],
            });
        }
        Ok(Self { values })
    }

    /// Builds an assignment from `(variable name, value)` pairs, as reported
    /// by an external solver. Variables not mentioned stay at their lower
    /// bound.
    pub fn from_named_values<I, S>(model: &RoutingModel, named: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let index: HashMap<String, VarId> = model
            .layout()
            .ids()
            .map(|var| (model.var_name(var), var))
            .collect();

        let mut assignment = Self::at_lower_bounds(model);
        for (name, value) in named {
            let name = name.as_ref();
            let var = *index
                .get(name)
                .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))?;
            if !value.is_finite() {
                return Err(ModelError::NonFiniteValue {
                    name: name.to_string(),
                    value,
                });
            }
            assignment.set(var, value);
        }
        Ok(assignment)
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    pub fn set(&mut self, var: VarId, value: f64) {
        self.values[var.index()] = value;
    }

    /// Returns `true` if a binary variable is selected.
    pub fn is_selected(&self, var: VarId) -> bool {
        self.value(var) > BINARY_THRESHOLD
    }

    /// Values in layout order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GeneratorConfig, InstanceGenerator};

    fn model() -> RoutingModel {
        let inst = InstanceGenerator::new(GeneratorConfig::easy())
            .unwrap()
            .generate(3)
            .unwrap();
        RoutingModel::build(&inst).unwrap()
    }

    #[test]
    fn test_from_values_checks_size() {
        let m = model();
        assert_eq!(
            Assignment::from_values(&m, vec![0.0; 3]),
            Err(ModelError::AssignmentSize {
                expected: m.num_variables(),
                actual: 3,
            })
        );
    }

    #[test]
    fn test_from_values_rejects_nan() {
        let m = model();
        let mut values = vec![0.0; m.num_variables()];
        values[0] = f64::NAN;
        assert!(matches!(
            Assignment::from_values(&m, values),
            Err(ModelError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_from_named_values() {
        let m = model();
        let var = m.layout().depot_choice(0, 0);
        let name = m.var_name(var);
        let a = Assignment::from_named_values(&m, [(name.as_str(), 1.0)]).unwrap();
        assert!(a.is_selected(var));
        assert_eq!(
            a.values().iter().filter(|&&v| v == 1.0).count(),
            1,
            "only the named binary is set"
        );
    }

    #[test]
    fn test_from_named_values_unknown() {
        let m = model();
        assert_eq!(
            Assignment::from_named_values(&m, [("x_nowhere", 1.0)]),
            Err(ModelError::UnknownVariable("x_nowhere".into()))
        );
    }

    #[test]
    fn test_threshold() {
        let m = model();
        let var = m.layout().arc(0, 1, 0);
        let mut a = Assignment::at_lower_bounds(&m);
        a.set(var, 0.5);
        assert!(!a.is_selected(var));
        a.set(var, 0.51);
        assert!(a.is_selected(var));
    }
}
