//! Rounded 2D points.

use rand::Rng;

/// Number of decimal digits kept for coordinates and distances.
pub const COORD_DECIMALS: i32 = 2;

/// Rounds a value to [`COORD_DECIMALS`] decimal digits.
///
/// # Examples
///
/// ```
/// use tanker_routing::geometry::round_coord;
///
/// assert_eq!(round_coord(3.14159), 3.14);
/// assert_eq!(round_coord(2.675_01), 2.68);
/// ```
pub fn round_coord(value: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS);
    (value * scale).round() / scale
}

/// A site location on the planning grid.
///
/// Both coordinates are rounded on construction. Demand nodes belonging to
/// the same physical station hold copies of one `Point`.
///
/// # Examples
///
/// ```
/// use tanker_routing::geometry::Point;
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(3.0, 4.0);
/// assert_eq!(a.distance_to(&b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a point, rounding both coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: round_coord(x),
            y: round_coord(y),
        }
    }

    /// Draws a point uniformly from `[0, width] × [0, height]`.
    pub fn random_within<R: Rng>(rng: &mut R, width: f64, height: f64) -> Self {
        Self::new(rng.random_range(0.0..=width), rng.random_range(0.0..=height))
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance to another point, rounded.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        round_coord((dx * dx + dy * dy).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_rounds() {
        let p = Point::new(1.23456, 9.87654);
        assert_eq!(p.x(), 1.23);
        assert_eq!(p.y(), 9.88);
    }

    #[test]
    fn test_distance_rounded() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 1.0);
        // sqrt(2) = 1.41421...
        assert_eq!(a.distance_to(&b), 1.41);
        assert_eq!(b.distance_to(&a), 1.41);
    }

    #[test]
    fn test_distance_to_self() {
        let p = Point::new(12.5, 40.25);
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn test_random_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = Point::random_within(&mut rng, 50.0, 20.0);
            assert!((0.0..=50.0).contains(&p.x()));
            assert!((0.0..=20.0).contains(&p.y()));
            assert_eq!(p.x(), round_coord(p.x()));
            assert_eq!(p.y(), round_coord(p.y()));
        }
    }

    #[test]
    fn test_random_within_reproducible() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(
                Point::random_within(&mut a, 100.0, 100.0),
                Point::random_within(&mut b, 100.0, 100.0)
            );
        }
    }
}
