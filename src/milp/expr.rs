//! Linear expressions over decision variables.

use super::{Assignment, VarId};

/// A sum of `coefficient * variable` terms.
///
/// The same variable may appear more than once; [`LinearExpr::merged`]
/// folds duplicates together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables with unit coefficients.
    pub fn sum<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = VarId>,
    {
        vars.into_iter().map(|v| (v, 1.0)).collect()
    }

    /// Appends a term.
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    /// Appends a term, builder style.
    pub fn with_term(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    /// Appends every term of `other` scaled by `factor`.
    pub fn add_scaled(&mut self, other: &LinearExpr, factor: f64) {
        self.terms
            .extend(other.terms.iter().map(|&(v, c)| (v, c * factor)));
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Folds duplicate variables into one term each, ordered by id.
    /// Terms whose coefficients cancel are dropped.
    pub fn merged(mut self) -> Self {
        self.terms.sort_by_key(|&(v, _)| v);
        let mut out: Vec<(VarId, f64)> = Vec::with_capacity(self.terms.len());
        for (var, coef) in self.terms {
            match out.last_mut() {
                Some((last, acc)) if *last == var => *acc += coef,
                _ => out.push((var, coef)),
            }
        }
        out.retain(|&(_, c)| c != 0.0);
        Self { terms: out }
    }

    /// Value of the expression under an assignment.
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * assignment.value(v))
            .sum()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<T: IntoIterator<Item = (VarId, f64)>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl Extend<(VarId, f64)> for LinearExpr {
    fn extend<T: IntoIterator<Item = (VarId, f64)>>(&mut self, iter: T) {
        self.terms.extend(iter);
    }
}
