//! Fuel products.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fuel product carried by a tanker.
///
/// A truck carries exactly one product per trip, and every demand node asks
/// for exactly one product.
///
/// # Examples
///
/// ```
/// use tanker_routing::models::Product;
///
/// assert_eq!(Product::ALL.len(), 2);
/// assert_eq!(Product::Diesel.index(), 1);
/// assert_eq!(Product::Gasoline.code(), 'G');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Gasoline,
    Diesel,
}

impl Product {
    /// Every product, in index order.
    pub const ALL: [Product; 2] = [Product::Gasoline, Product::Diesel];

    /// Number of products.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..Product::COUNT`.
    pub fn index(self) -> usize {
        match self {
            Product::Gasoline => 0,
            Product::Diesel => 1,
        }
    }

    /// Inverse of [`Product::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// One-letter code used in demand node ids (`S4_G`, `S4_D`).
    pub fn code(self) -> char {
        match self {
            Product::Gasoline => 'G',
            Product::Diesel => 'D',
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Gasoline => f.write_str("gasoline"),
            Product::Diesel => f.write_str("diesel"),
        }
    }
}
