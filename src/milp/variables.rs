//! Decision variables and their dense index layout.

use crate::models::{Instance, Product};

/// Dense index of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    /// Position in the model's variable vector.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Typed composite key of a decision variable.
///
/// Node fields (`from`, `to`) are node indices in instance order. `depot`
/// and `station` are ordinals within the depot and demand-node lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VarKey {
    /// Truck traverses the directed arc `from → to`.
    Arc { from: usize, to: usize, truck: usize },
    /// Truck loads at this depot.
    DepotChoice { truck: usize, depot: usize },
    /// Truck carries this product.
    ProductChoice { truck: usize, product: Product },
    /// MTZ ordering / load accumulation at a demand node.
    Order { station: usize, truck: usize },
    /// Quantity of a product the truck draws from a depot.
    Load {
        truck: usize,
        depot: usize,
        product: Product,
    },
}

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// 0/1 decision.
    Binary,
    /// Real-valued within its bounds.
    Continuous,
}

/// Closed interval a variable must lie in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarBounds {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl VarBounds {
    /// The `[0, 1]` interval of a binary variable.
    pub const BINARY: VarBounds = VarBounds {
        lower: 0.0,
        upper: 1.0,
    };

    /// Returns `true` if `value` lies within the bounds, up to `tol`.
    pub fn contains(&self, value: f64, tol: f64) -> bool {
        value >= self.lower - tol && value <= self.upper + tol
    }
}

/// Maps every [`VarKey`] to a dense [`VarId`] and back.
///
/// Variables are laid out block by block: arcs, depot choices, product
/// choices, ordering variables, loads. Within a block the truck index
/// varies fastest for arcs and ordering variables, and the product index
/// varies fastest for loads. The layout depends only on set sizes, so two
/// builds of the same instance agree on every index.
///
/// # Examples
///
/// ```
/// use tanker_routing::milp::{VarKey, VariableLayout};
///
/// // 1 garage, 1 depot, 2 demand nodes, 3 trucks
/// let layout = VariableLayout::new(1, 1, 2, 3);
/// let id = layout.arc(0, 1, 2);
/// assert_eq!(layout.key(id), VarKey::Arc { from: 0, to: 1, truck: 2 });
/// assert_eq!(layout.len(), 4 * 4 * 3 + 3 + 6 + 6 + 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLayout {
    garages: usize,
    depots: usize,
    stations: usize,
    trucks: usize,
}

impl VariableLayout {
    /// Creates a layout from set sizes.
    pub fn new(garages: usize, depots: usize, stations: usize, trucks: usize) -> Self {
        Self {
            garages,
            depots,
            stations,
            trucks,
        }
    }

    /// Creates the layout of an instance.
    pub fn for_instance(instance: &Instance) -> Self {
        Self::new(
            instance.garages().len(),
            instance.depots().len(),
            instance.stations().len(),
            instance.fleet().len(),
        )
    }

    /// |V|.
    pub fn num_nodes(&self) -> usize {
        self.garages + self.depots + self.stations
    }

    /// |K|.
    pub fn num_trucks(&self) -> usize {
        self.trucks
    }

    /// |D|.
    pub fn num_depots(&self) -> usize {
        self.depots
    }

    /// |S|.
    pub fn num_stations(&self) -> usize {
        self.stations
    }

    fn depot_choice_base(&self) -> usize {
        let n = self.num_nodes();
        n * n * self.trucks
    }

    fn product_choice_base(&self) -> usize {
        self.depot_choice_base() + self.trucks * self.depots
    }

    fn order_base(&self) -> usize {
        self.product_choice_base() + self.trucks * Product::COUNT
    }

    fn load_base(&self) -> usize {
        self.order_base() + self.stations * self.trucks
    }

    /// Total number of variables.
    pub fn len(&self) -> usize {
        self.load_base() + self.trucks * self.depots * Product::COUNT
    }

    /// Returns `true` if the layout has no variables.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Arc-use variable x\[from, to, truck\].
    pub fn arc(&self, from: usize, to: usize, truck: usize) -> VarId {
        let n = self.num_nodes();
        debug_assert!(from < n && to < n && truck < self.trucks);
        VarId((from * n + to) * self.trucks + truck)
    }

    /// Depot-choice variable y\[truck, depot\].
    pub fn depot_choice(&self, truck: usize, depot: usize) -> VarId {
        debug_assert!(truck < self.trucks && depot < self.depots);
        VarId(self.depot_choice_base() + truck * self.depots + depot)
    }

    /// Product-choice variable z\[truck, product\].
    pub fn product_choice(&self, truck: usize, product: Product) -> VarId {
        debug_assert!(truck < self.trucks);
        VarId(self.product_choice_base() + truck * Product::COUNT + product.index())
    }

    /// Ordering variable u\[station, truck\].
    pub fn order(&self, station: usize, truck: usize) -> VarId {
        debug_assert!(station < self.stations && truck < self.trucks);
        VarId(self.order_base() + station * self.trucks + truck)
    }

    /// Load variable L\[truck, depot, product\].
    pub fn load(&self, truck: usize, depot: usize, product: Product) -> VarId {
        debug_assert!(truck < self.trucks && depot < self.depots);
        VarId(self.load_base() + (truck * self.depots + depot) * Product::COUNT + product.index())
    }

    /// Dense id of a key.
    pub fn id(&self, key: VarKey) -> VarId {
        match key {
            VarKey::Arc { from, to, truck } => self.arc(from, to, truck),
            VarKey::DepotChoice { truck, depot } => self.depot_choice(truck, depot),
            VarKey::ProductChoice { truck, product } => self.product_choice(truck, product),
            VarKey::Order { station, truck } => self.order(station, truck),
            VarKey::Load {
                truck,
                depot,
                product,
            } => self.load(truck, depot, product),
        }
    }

    /// Key of a dense id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not part of this layout.
    pub fn key(&self, id: VarId) -> VarKey {
        let i = id.0;
        assert!(i < self.len(), "variable {i} out of range");
        let n = self.num_nodes();

        if i < self.depot_choice_base() {
            let truck = i % self.trucks;
            let pair = i / self.trucks;
            return VarKey::Arc {
                from: pair / n,
                to: pair % n,
                truck,
            };
        }
        if i < self.product_choice_base() {
            let offset = i - self.depot_choice_base();
            return VarKey::DepotChoice {
                truck: offset / self.depots,
                depot: offset % self.depots,
            };
        }
        if i < self.order_base() {
            let offset = i - self.product_choice_base();
            return VarKey::ProductChoice {
                truck: offset / Product::COUNT,
                product: product_at(offset % Product::COUNT),
            };
        }
        if i < self.load_base() {
            let offset = i - self.order_base();
            return VarKey::Order {
                station: offset / self.trucks,
                truck: offset % self.trucks,
            };
        }
        let offset = i - self.load_base();
        let pair = offset / Product::COUNT;
        VarKey::Load {
            truck: pair / self.depots,
            depot: pair % self.depots,
            product: product_at(offset % Product::COUNT),
        }
    }

    /// Domain of a variable.
    pub fn kind(&self, id: VarId) -> VarKind {
        if id.0 < self.order_base() {
            VarKind::Binary
        } else {
            VarKind::Continuous
        }
    }

    /// Iterates over every variable id in layout order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.len()).map(VarId)
    }
}

fn product_at(index: usize) -> Product {
    match Product::from_index(index) {
        Some(product) => product,
        None => unreachable!("product index is reduced modulo Product::COUNT"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_round_trips() {
        let layout = VariableLayout::new(2, 2, 3, 4);
        for id in layout.ids() {
            assert_eq!(layout.id(layout.key(id)), id);
        }
    }

    #[test]
    fn test_blocks_are_contiguous() {
        let layout = VariableLayout::new(1, 2, 2, 2);
        let n = 5;
        assert_eq!(layout.arc(n - 1, n - 1, 1).index() + 1, layout.depot_choice(0, 0).index());
        assert_eq!(layout.depot_choice(1, 1).index() + 1, layout.product_choice(0, Product::Gasoline).index());
        assert_eq!(layout.product_choice(1, Product::Diesel).index() + 1, layout.order(0, 0).index());
        assert_eq!(layout.order(1, 1).index() + 1, layout.load(0, 0, Product::Gasoline).index());
        assert_eq!(layout.load(1, 1, Product::Diesel).index() + 1, layout.len());
    }

    #[test]
    fn test_kinds() {
        let layout = VariableLayout::new(1, 1, 1, 1);
        assert_eq!(layout.kind(layout.arc(0, 2, 0)), VarKind::Binary);
        assert_eq!(layout.kind(layout.depot_choice(0, 0)), VarKind::Binary);
        assert_eq!(layout.kind(layout.product_choice(0, Product::Diesel)), VarKind::Binary);
        assert_eq!(layout.kind(layout.order(0, 0)), VarKind::Continuous);
        assert_eq!(layout.kind(layout.load(0, 0, Product::Gasoline)), VarKind::Continuous);
    }

    #[test]
    fn test_empty_fleet_has_no_variables() {
        let layout = VariableLayout::new(1, 1, 3, 0);
        assert!(layout.is_empty());
        assert_eq!(layout.ids().count(), 0);
    }

    #[test]
    fn test_bounds_contains() {
        let b = VarBounds {
            lower: 2.0,
            upper: 5.0,
        };
        assert!(b.contains(2.0, 0.0));
        assert!(b.contains(5.0 + 1e-9, 1e-6));
        assert!(!b.contains(1.0, 1e-6));
        assert!(VarBounds::BINARY.contains(1.0, 0.0));
    }
}
