//! Constraint-family generators.
//!
//! Each family is produced by one method from the instance alone, so the
//! families are independent of each other. They are concatenated in
//! family order; with the `parallel` feature they are generated on the
//! rayon pool first.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::models::{Instance, Product};

use super::{
    Constraint, ConstraintFamily, LinearExpr, Sense, VarBounds, VarId, VarKey, VariableLayout,
};

type FamilyFn<'a> = fn(&ModelBuilder<'a>) -> Vec<Constraint>;

pub(super) struct ModelBuilder<'a> {
    instance: &'a Instance,
    layout: &'a VariableLayout,
}

impl<'a> ModelBuilder<'a> {
    pub(super) fn new(instance: &'a Instance, layout: &'a VariableLayout) -> Self {
        Self { instance, layout }
    }

    fn families(&self) -> [FamilyFn<'a>; 15] {
        [
            Self::no_self_loop,
            Self::garage_egress,
            Self::flow_conservation,
            Self::garage_return,
            Self::single_depot,
            Self::depot_routing,
            Self::single_product,
            Self::product_compatibility,
            Self::no_direct_garage_to_station,
            Self::depot_requires_egress,
            Self::demand_coverage,
            Self::capacity,
            Self::subtour_elimination,
            Self::stock_ceiling,
            Self::load_conservation,
        ]
    }

    /// All constraints, grouped by family in family order.
    pub(super) fn constraints(&self) -> Vec<Constraint> {
        let families = self.families();

        #[cfg(feature = "parallel")]
        let groups: Vec<Vec<Constraint>> = families[..].par_iter().map(|f| f(self)).collect();
        #[cfg(not(feature = "parallel"))]
        let groups: Vec<Vec<Constraint>> = families.iter().map(|f| f(self)).collect();

        groups.into_iter().flatten().collect()
    }

    /// Distance-weighted sum over every arc variable with distinct endpoints.
    pub(super) fn objective(&self) -> LinearExpr {
        let n = self.n();
        let mut expr = LinearExpr::new();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = self.instance.distance(i, j);
                for k in 0..self.k() {
                    expr.add_term(self.x(i, j, k), d);
                }
            }
        }
        expr
    }

    /// Bounds of every variable, in layout order.
    pub(super) fn bounds(&self) -> Vec<VarBounds> {
        self.layout
            .ids()
            .map(|id| match self.layout.key(id) {
                VarKey::Arc { .. } | VarKey::DepotChoice { .. } | VarKey::ProductChoice { .. } => {
                    VarBounds::BINARY
                }
                VarKey::Order { station, truck } => VarBounds {
                    lower: f64::from(self.instance.stations()[station].demand()),
                    upper: f64::from(self.instance.fleet()[truck].capacity()),
                },
                VarKey::Load { depot, product, .. } => VarBounds {
                    lower: 0.0,
                    upper: f64::from(self.instance.depots()[depot].stock(product)),
                },
            })
            .collect()
    }

    fn n(&self) -> usize {
        self.instance.num_nodes()
    }

    fn k(&self) -> usize {
        self.instance.fleet().len()
    }

    fn x(&self, from: usize, to: usize, truck: usize) -> VarId {
        self.layout.arc(from, to, truck)
    }

    fn node(&self, node: usize) -> &str {
        self.instance.node_id(node)
    }

    fn truck(&self, truck: usize) -> &str {
        self.instance.fleet()[truck].id()
    }

    fn home(&self, truck: usize) -> usize {
        self.instance.fleet()[truck].home_garage()
    }

    /// Σ_{j≠g_k} x\[g_k, j, k\]: whether truck `k` leaves its home garage.
    fn egress(&self, truck: usize) -> LinearExpr {
        let g = self.home(truck);
        LinearExpr::sum(
            (0..self.n())
                .filter(|&j| j != g)
                .map(|j| self.x(g, j, truck)),
        )
    }

    /// Σ_{j≠s} q_s x\[s, j, k\] over demand nodes carrying `product`, or all
    /// demand nodes when `product` is `None`.
    fn delivered(&self, truck: usize, product: Option<Product>) -> LinearExpr {
        let mut expr = LinearExpr::new();
        for (s, station) in self.instance.stations().iter().enumerate() {
            if product.is_some_and(|p| p != station.product()) {
                continue;
            }
            let node = self.instance.demand_node(s);
            let q = f64::from(station.demand());
            for j in (0..self.n()).filter(|&j| j != node) {
                expr.add_term(self.x(node, j, truck), q);
            }
        }
        expr
    }

    // (1)
    fn no_self_loop(&self) -> Vec<Constraint> {
        let mut out = Vec::with_capacity(self.n() * self.k());
        for i in 0..self.n() {
            for k in 0..self.k() {
                out.push(Constraint::new(
                    format!("no_self_loop_{}_{}", self.node(i), self.truck(k)),
                    ConstraintFamily::NoSelfLoop,
                    LinearExpr::sum([self.x(i, i, k)]),
                    Sense::Equal,
                    0.0,
                ));
            }
        }
        out
    }

    // (2)
    fn garage_egress(&self) -> Vec<Constraint> {
        (0..self.k())
            .map(|k| {
                Constraint::new(
                    format!("garage_egress_{}", self.truck(k)),
                    ConstraintFamily::GarageEgress,
                    self.egress(k),
                    Sense::LessEq,
                    1.0,
                )
            })
            .collect()
    }

    // (3) over depots and demand nodes
    fn flow_conservation(&self) -> Vec<Constraint> {
        let n = self.n();
        let first = self.instance.garages().len();
        let mut out = Vec::with_capacity((n - first) * self.k());
        for h in first..n {
            for k in 0..self.k() {
                let mut expr = LinearExpr::new();
                for i in (0..n).filter(|&i| i != h) {
                    expr.add_term(self.x(i, h, k), 1.0);
                }
                for j in (0..n).filter(|&j| j != h) {
                    expr.add_term(self.x(h, j, k), -1.0);
                }
                out.push(Constraint::new(
                    format!("flow_{}_{}", self.node(h), self.truck(k)),
                    ConstraintFamily::FlowConservation,
                    expr,
                    Sense::Equal,
                    0.0,
                ));
            }
        }
        out
    }

    // (4) arrivals at any garage equal departures from home
    fn garage_return(&self) -> Vec<Constraint> {
        (0..self.k())
            .map(|k| {
                let mut expr = LinearExpr::new();
                for g in self.instance.garage_nodes() {
                    for i in (0..self.n()).filter(|&i| i != g) {
                        expr.add_term(self.x(i, g, k), 1.0);
                    }
                }
                expr.add_scaled(&self.egress(k), -1.0);
                Constraint::new(
                    format!("garage_return_{}", self.truck(k)),
                    ConstraintFamily::GarageReturn,
                    expr.merged(),
                    Sense::Equal,
                    0.0,
                )
            })
            .collect()
    }

    // (5)
    fn single_depot(&self) -> Vec<Constraint> {
        let depots = self.instance.depots().len();
        (0..self.k())
            .map(|k| {
                Constraint::new(
                    format!("single_depot_{}", self.truck(k)),
                    ConstraintFamily::SingleDepot,
                    LinearExpr::sum((0..depots).map(|d| self.layout.depot_choice(k, d))),
                    Sense::LessEq,
                    1.0,
                )
            })
            .collect()
    }

    // (6)
    fn depot_routing(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        for d in 0..self.instance.depots().len() {
            let node = self.instance.depot_node(d);
            for k in 0..self.k() {
                let expr = LinearExpr::sum((0..self.n()).map(|j| self.x(node, j, k)))
                    .with_term(self.layout.depot_choice(k, d), -1.0);
                out.push(Constraint::new(
                    format!("depot_routing_{}_{}", self.node(node), self.truck(k)),
                    ConstraintFamily::DepotRouting,
                    expr,
                    Sense::LessEq,
                    0.0,
                ));
            }
        }
        out
    }

    // (7)
    fn single_product(&self) -> Vec<Constraint> {
        (0..self.k())
            .map(|k| {
                Constraint::new(
                    format!("single_product_{}", self.truck(k)),
                    ConstraintFamily::SingleProduct,
                    LinearExpr::sum(Product::ALL.map(|p| self.layout.product_choice(k, p))),
                    Sense::LessEq,
                    1.0,
                )
            })
            .collect()
    }

    // (8)
    fn product_compatibility(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        for (s, station) in self.instance.stations().iter().enumerate() {
            let node = self.instance.demand_node(s);
            for k in 0..self.k() {
                let expr = LinearExpr::sum((0..self.n()).map(|j| self.x(j, node, k)))
                    .with_term(self.layout.product_choice(k, station.product()), -1.0);
                out.push(Constraint::new(
                    format!("product_{}_{}", self.node(node), self.truck(k)),
                    ConstraintFamily::ProductCompatibility,
                    expr,
                    Sense::LessEq,
                    0.0,
                ));
            }
        }
        out
    }

    // (9)
    fn no_direct_garage_to_station(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        for k in 0..self.k() {
            let g = self.home(k);
            for s in self.instance.demand_nodes() {
                out.push(Constraint::new(
                    format!("no_direct_{}_{}_{}", self.node(g), self.node(s), self.truck(k)),
                    ConstraintFamily::NoDirectGarageToStation,
                    LinearExpr::sum([self.x(g, s, k)]),
                    Sense::Equal,
                    0.0,
                ));
            }
        }
        out
    }

    // (10) both halves: the truck leaves home, and its first hop is the depot
    fn depot_requires_egress(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        for k in 0..self.k() {
            let g = self.home(k);
            let egress = self.egress(k);
            for d in 0..self.instance.depots().len() {
                let node = self.instance.depot_node(d);
                let y = self.layout.depot_choice(k, d);

                let mut leaves = LinearExpr::sum([y]);
                leaves.add_scaled(&egress, -1.0);
                out.push(Constraint::new(
                    format!("depot_egress_{}_{}", self.truck(k), self.node(node)),
                    ConstraintFamily::DepotRequiresEgress,
                    leaves,
                    Sense::LessEq,
                    0.0,
                ));
                out.push(Constraint::new(
                    format!("garage_to_depot_{}_{}", self.truck(k), self.node(node)),
                    ConstraintFamily::DepotRequiresEgress,
                    LinearExpr::sum([y]).with_term(self.x(g, node, k), -1.0),
                    Sense::LessEq,
                    0.0,
                ));
            }
        }
        out
    }

    // (11)
    fn demand_coverage(&self) -> Vec<Constraint> {
        self.instance
            .demand_nodes()
            .map(|s| {
                let mut expr = LinearExpr::new();
                for k in 0..self.k() {
                    for i in (0..self.n()).filter(|&i| i != s) {
                        expr.add_term(self.x(i, s, k), 1.0);
                    }
                }
                Constraint::new(
                    format!("cover_{}", self.node(s)),
                    ConstraintFamily::DemandCoverage,
                    expr,
                    Sense::Equal,
                    1.0,
                )
            })
            .collect()
    }

    // (12)
    fn capacity(&self) -> Vec<Constraint> {
        self.instance
            .fleet()
            .iter()
            .enumerate()
            .map(|(k, truck)| {
                Constraint::new(
                    format!("capacity_{}", truck.id()),
                    ConstraintFamily::Capacity,
                    self.delivered(k, None),
                    Sense::LessEq,
                    f64::from(truck.capacity()),
                )
            })
            .collect()
    }

    // (13) MTZ over ordered pairs of distinct demand nodes
    fn subtour_elimination(&self) -> Vec<Constraint> {
        let stations = self.instance.stations();
        let mut out = Vec::new();
        for (k, truck) in self.instance.fleet().iter().enumerate() {
            let cap = f64::from(truck.capacity());
            for (a, _) in stations.iter().enumerate() {
                for (b, to) in stations.iter().enumerate() {
                    if a == b {
                        continue;
                    }
                    let from_node = self.instance.demand_node(a);
                    let to_node = self.instance.demand_node(b);
                    let expr = LinearExpr::new()
                        .with_term(self.layout.order(a, k), 1.0)
                        .with_term(self.layout.order(b, k), -1.0)
                        .with_term(self.x(from_node, to_node, k), cap);
                    out.push(Constraint::new(
                        format!(
                            "mtz_{}_{}_{}",
                            self.node(from_node),
                            self.node(to_node),
                            truck.id()
                        ),
                        ConstraintFamily::SubtourElimination,
                        expr,
                        Sense::LessEq,
                        cap - f64::from(to.demand()),
                    ));
                }
            }
        }
        out
    }

    // (14)
    fn stock_ceiling(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        for (d, depot) in self.instance.depots().iter().enumerate() {
            for product in Product::ALL {
                out.push(Constraint::new(
                    format!("stock_{}_{}", depot.id(), product),
                    ConstraintFamily::StockCeiling,
                    LinearExpr::sum((0..self.k()).map(|k| self.layout.load(k, d, product))),
                    Sense::LessEq,
                    f64::from(depot.stock(product)),
                ));
            }
        }
        out
    }

    // (15)
    fn load_conservation(&self) -> Vec<Constraint> {
        let depots = self.instance.depots().len();
        let mut out = Vec::new();
        for k in 0..self.k() {
            for product in Product::ALL {
                let mut expr =
                    LinearExpr::sum((0..depots).map(|d| self.layout.load(k, d, product)));
                expr.add_scaled(&self.delivered(k, Some(product)), -1.0);
                out.push(Constraint::new(
                    format!("load_{}_{}", self.truck(k), product),
                    ConstraintFamily::LoadConservation,
                    expr,
                    Sense::Equal,
                    0.0,
                ));
            }
        }
        out
    }
}
