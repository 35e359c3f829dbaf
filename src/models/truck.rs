//! Tanker truck type.

/// A tanker truck.
///
/// Each truck belongs to a home garage, identified by its index in
/// [`Instance::garages`](crate::models::Instance::garages). Capacities may
/// differ across the fleet.
///
/// # Examples
///
/// ```
/// use tanker_routing::models::Truck;
///
/// let t = Truck::new("K1", 15000).with_home_garage(1);
/// assert_eq!(t.id(), "K1");
/// assert_eq!(t.capacity(), 15000);
/// assert_eq!(t.home_garage(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Truck {
    id: String,
    capacity: i32,
    home_garage: usize,
}

impl Truck {
    /// Creates a truck with the given ID and capacity, based at garage 0.
    pub fn new(id: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: id.into(),
            capacity,
            home_garage: 0,
        }
    }

    /// Sets the home garage index.
    pub fn with_home_garage(mut self, garage: usize) -> Self {
        self.home_garage = garage;
        self
    }

    /// Truck ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Home garage index (start of every route).
    pub fn home_garage(&self) -> usize {
        self.home_garage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truck_new() {
        let t = Truck::new("K3", 20000);
        assert_eq!(t.id(), "K3");
        assert_eq!(t.capacity(), 20000);
        assert_eq!(t.home_garage(), 0);
    }
}
