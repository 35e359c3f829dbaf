//! Garages, depots and demand nodes.

use crate::geometry::Point;

use super::Product;

/// Role of a node in the routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Truck home base; routes start and end at a garage.
    Garage,
    /// Loading point holding per-product stock.
    Depot,
    /// Product-specific delivery point.
    Demand,
}

/// A garage where trucks are parked between trips.
#[derive(Debug, Clone, PartialEq)]
pub struct Garage {
    id: String,
    location: Point,
}

impl Garage {
    /// Creates a garage.
    pub fn new(id: impl Into<String>, location: Point) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }

    /// Garage ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Garage location.
    pub fn location(&self) -> Point {
        self.location
    }
}

/// A depot holding a limited stock of each product.
///
/// # Examples
///
/// ```
/// use tanker_routing::geometry::Point;
/// use tanker_routing::models::{Depot, Product};
///
/// let depot = Depot::new("D1", Point::new(10.0, 5.0))
///     .with_stock(Product::Gasoline, 9000)
///     .with_stock(Product::Diesel, 4500);
/// assert_eq!(depot.stock(Product::Gasoline), 9000);
/// assert_eq!(depot.stock(Product::Diesel), 4500);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Depot {
    id: String,
    location: Point,
    stock: [i32; Product::COUNT],
}

impl Depot {
    /// Creates a depot with no stock.
    pub fn new(id: impl Into<String>, location: Point) -> Self {
        Self {
            id: id.into(),
            location,
            stock: [0; Product::COUNT],
        }
    }

    /// Sets the stock for one product.
    pub fn with_stock(mut self, product: Product, quantity: i32) -> Self {
        self.stock[product.index()] = quantity;
        self
    }

    /// Depot ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Depot location.
    pub fn location(&self) -> Point {
        self.location
    }

    /// Available stock of a product.
    pub fn stock(&self, product: Product) -> i32 {
        self.stock[product.index()]
    }
}

/// A product-specific delivery point.
///
/// A physical station that wants both products materializes as two demand
/// nodes with the same `station` number and the same location.
///
/// # Examples
///
/// ```
/// use tanker_routing::geometry::Point;
/// use tanker_routing::models::{DemandNode, Product};
///
/// let at = Point::new(12.0, 7.5);
/// let gas = DemandNode::new(3, Product::Gasoline, 2500, at);
/// let diesel = DemandNode::new(3, Product::Diesel, 1800, at);
/// assert_eq!(gas.id(), "S3_G");
/// assert_eq!(diesel.id(), "S3_D");
/// assert_eq!(gas.location(), diesel.location());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DemandNode {
    id: String,
    station: usize,
    product: Product,
    demand: i32,
    location: Point,
}

impl DemandNode {
    /// Creates a demand node for physical station `station` (1-based).
    pub fn new(station: usize, product: Product, demand: i32, location: Point) -> Self {
        Self {
            id: format!("S{station}_{}", product.code()),
            station,
            product,
            demand,
            location,
        }
    }

    /// Overrides the generated ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Demand node ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Physical station this node belongs to.
    pub fn station(&self) -> usize {
        self.station
    }

    /// Requested product.
    pub fn product(&self) -> Product {
        self.product
    }

    /// Requested quantity.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Location, shared with sibling nodes of the same station.
    pub fn location(&self) -> Point {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depot_default_stock() {
        let d = Depot::new("D2", Point::new(0.0, 0.0));
        assert_eq!(d.id(), "D2");
        for p in Product::ALL {
            assert_eq!(d.stock(p), 0);
        }
    }

    #[test]
    fn test_demand_node_with_id() {
        let n = DemandNode::new(1, Product::Diesel, 100, Point::new(1.0, 1.0)).with_id("custom");
        assert_eq!(n.id(), "custom");
        assert_eq!(n.station(), 1);
        assert_eq!(n.product(), Product::Diesel);
        assert_eq!(n.demand(), 100);
    }

    #[test]
    fn test_garage() {
        let g = Garage::new("G1", Point::new(4.0, 2.0));
        assert_eq!(g.id(), "G1");
        assert_eq!(g.location(), Point::new(4.0, 2.0));
    }
}
