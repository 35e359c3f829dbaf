//! Dense precomputed distance table.

use crate::geometry::Point;

/// A dense n×n distance table stored in row-major order.
///
/// Rows and columns follow the canonical node order of an
/// [`Instance`](crate::models::Instance): garages, then depots, then demand
/// nodes. Built once from final coordinates and never recomputed.
///
/// # Examples
///
/// ```
/// use tanker_routing::geometry::Point;
/// use tanker_routing::distance::DistanceTable;
///
/// let points = vec![
///     Point::new(0.0, 0.0),
///     Point::new(3.0, 4.0),
///     Point::new(6.0, 8.0),
/// ];
/// let table = DistanceTable::from_points(&points);
/// assert_eq!(table.get(0, 1), 5.0);
/// assert_eq!(table.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    data: Vec<f64>,
    size: usize,
}

impl DistanceTable {
    /// Creates a table of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes all pairwise rounded Euclidean distances.
    ///
    /// Each unordered pair is computed once and mirrored, so the table is
    /// symmetric by construction.
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut table = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance_to(&points[j]);
                table.set(i, j, d);
                table.set(j, i, d);
            }
        }
        table
    }

    /// Creates a table from an explicit row-major n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a table from nested rows.
    ///
    /// Returns `None` unless every row has exactly `rows.len()` entries.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Self::from_data(size, rows.concat())
    }

    /// Returns the table as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        if self.size == 0 {
            return Vec::new();
        }
        self.data.chunks(self.size).map(<[f64]>::to_vec).collect()
    }

    /// Returns the distance from node `from` to node `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from node `from` to node `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of nodes covered by this table.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns `true` if every node is at distance zero from itself.
    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.size).all(|i| self.get(i, i) == 0.0)
    }

    /// Returns the first entry that is negative, non-finite, or asymmetric.
    pub fn first_invalid_entry(&self) -> Option<(usize, usize)> {
        for i in 0..self.size {
            if self.get(i, i) != 0.0 {
                return Some((i, i));
            }
            for j in (i + 1)..self.size {
                let d = self.get(i, j);
                if !d.is_finite() || d < 0.0 || d != self.get(j, i) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Returns the nearest node to `from` among the given candidates.
    ///
    /// Ties keep the earliest candidate. Returns `None` if `candidates` is
    /// empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}
