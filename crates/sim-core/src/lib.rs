#![deny(warnings)]

//! Core domain models and invariants for Boardroom.
//!
//! This crate defines the persistent state entities of the quarterly
//! business simulation (the macro economy, the per-company ledger with its
//! pending orders and product improvements, the immutable decision record a
//! company submits each quarter, and the result report the resolver emits)
//! together with the static ruleset tables everything is priced against.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

pub mod decisions;
pub mod economy;
pub mod ledger;
pub mod report;
pub mod rules;

pub use decisions::{AdvertisingSpend, DecisionError, DecisionRecord};
pub use economy::Economy;
pub use ledger::{
    CompanyLedger, Improvement, ImprovementKind, Machine, MachineOrder, MaterialOrder, Vehicle,
    Workforce,
};
pub use report::ResultReport;
pub use rules::Shift;

/// One of the three manufactured products.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Product {
    One,
    Two,
    Three,
}

impl Product {
    /// All products, in stable display order.
    pub const ALL: [Product; 3] = [Product::One, Product::Two, Product::Three];

    /// Number of products.
    pub const COUNT: usize = 3;

    /// Stable zero-based index.
    pub fn index(self) -> usize {
        match self {
            Product::One => 0,
            Product::Two => 1,
            Product::Three => 2,
        }
    }

    /// Human-readable name, e.g. "Product 1".
    pub fn name(self) -> &'static str {
        match self {
            Product::One => "Product 1",
            Product::Two => "Product 2",
            Product::Three => "Product 3",
        }
    }
}

/// One of the four sales areas: three home regions plus export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    South,
    West,
    North,
    Export,
}

impl Area {
    /// All areas, in stable display order.
    pub const ALL: [Area; 4] = [Area::South, Area::West, Area::North, Area::Export];

    /// Number of areas.
    pub const COUNT: usize = 4;

    /// Stable zero-based index.
    pub fn index(self) -> usize {
        match self {
            Area::South => 0,
            Area::West => 1,
            Area::North => 2,
            Area::Export => 3,
        }
    }

    /// Whether sales here use the export price list.
    pub fn is_export(self) -> bool {
        matches!(self, Area::Export)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Area::South => "South",
            Area::West => "West",
            Area::North => "North",
            Area::Export => "Export",
        }
    }
}

/// A calendar position: quarter 1–4 within a year counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quarter {
    /// Quarter index within the year, 1–4.
    pub index: u8,
    /// Year counter, starting at 1.
    pub year: u16,
}

impl Quarter {
    /// The first quarter of year one.
    pub fn start() -> Self {
        Quarter { index: 1, year: 1 }
    }

    /// Advance in place by one quarter, rolling the year at Q4.
    pub fn advance(&mut self) {
        if self.index >= 4 {
            self.index = 1;
            self.year += 1;
        } else {
            self.index += 1;
        }
    }

    /// The quarter `n` quarters after this one.
    pub fn plus(self, n: u8) -> Self {
        let mut q = self;
        for _ in 0..n {
            q.advance();
        }
        q
    }

    /// Whether this is the fiscal year end.
    pub fn is_year_end(self) -> bool {
        self.index == 4
    }
}

impl Default for Quarter {
    fn default() -> Self {
        Quarter::start()
    }
}

/// A fixed per-product map, replacing tuple-keyed dictionaries with an
/// enum-indexed array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMap<T>([T; Product::COUNT]);

impl<T> ProductMap<T> {
    /// Build from a closure evaluated once per product.
    pub fn from_fn(mut f: impl FnMut(Product) -> T) -> Self {
        ProductMap(Product::ALL.map(&mut f))
    }

    /// Iterate `(product, &value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Product, &T)> {
        Product::ALL.iter().map(move |&p| (p, &self.0[p.index()]))
    }
}

impl<T: Copy> ProductMap<T> {
    /// A map holding the same value for every product.
    pub fn splat(value: T) -> Self {
        ProductMap([value; Product::COUNT])
    }
}

impl ProductMap<f64> {
    /// Sum over all products.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl ProductMap<u32> {
    /// Sum over all products.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&v| v as u64).sum()
    }
}

impl<T> Index<Product> for ProductMap<T> {
    type Output = T;
    fn index(&self, p: Product) -> &T {
        &self.0[p.index()]
    }
}

impl<T> IndexMut<Product> for ProductMap<T> {
    fn index_mut(&mut self, p: Product) -> &mut T {
        &mut self.0[p.index()]
    }
}

/// A fixed per-area map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaMap<T>([T; Area::COUNT]);

impl<T> AreaMap<T> {
    /// Build from a closure evaluated once per area.
    pub fn from_fn(mut f: impl FnMut(Area) -> T) -> Self {
        AreaMap(Area::ALL.map(&mut f))
    }

    /// Iterate `(area, &value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Area, &T)> {
        Area::ALL.iter().map(move |&a| (a, &self.0[a.index()]))
    }
}

impl AreaMap<u32> {
    /// Sum over all areas.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&v| v as u64).sum()
    }
}

impl<T> Index<Area> for AreaMap<T> {
    type Output = T;
    fn index(&self, a: Area) -> &T {
        &self.0[a.index()]
    }
}

impl<T> IndexMut<Area> for AreaMap<T> {
    fn index_mut(&mut self, a: Area) -> &mut T {
        &mut self.0[a.index()]
    }
}

/// A fixed (product, area) matrix: the two-key lookup structure behind
/// stocks, backlog, delivery schedules, and sales figures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellMap<T>([[T; Area::COUNT]; Product::COUNT]);

impl<T> CellMap<T> {
    /// Build from a closure evaluated once per cell.
    pub fn from_fn(mut f: impl FnMut(Product, Area) -> T) -> Self {
        CellMap(Product::ALL.map(|p| Area::ALL.map(|a| f(p, a))))
    }

    /// Iterate `(product, area, &value)` triples in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Product, Area, &T)> {
        Product::ALL.iter().flat_map(move |&p| {
            Area::ALL
                .iter()
                .map(move |&a| (p, a, &self.0[p.index()][a.index()]))
        })
    }
}

impl CellMap<u32> {
    /// Sum over every cell.
    pub fn total(&self) -> u64 {
        self.0
            .iter()
            .flat_map(|row| row.iter())
            .map(|&v| v as u64)
            .sum()
    }

    /// Sum over all areas for one product.
    pub fn product_total(&self, p: Product) -> u64 {
        self.0[p.index()].iter().map(|&v| v as u64).sum()
    }

    /// Sum over all products for one area.
    pub fn area_total(&self, a: Area) -> u64 {
        self.0.iter().map(|row| row[a.index()] as u64).sum()
    }
}

impl CellMap<f64> {
    /// Sum over every cell.
    pub fn total(&self) -> f64 {
        self.0.iter().flat_map(|row| row.iter()).sum()
    }
}

impl<T> Index<(Product, Area)> for CellMap<T> {
    type Output = T;
    fn index(&self, (p, a): (Product, Area)) -> &T {
        &self.0[p.index()][a.index()]
    }
}

impl<T> IndexMut<(Product, Area)> for CellMap<T> {
    fn index_mut(&mut self, (p, a): (Product, Area)) -> &mut T {
        &mut self.0[p.index()][a.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_rolls_year() {
        let mut q = Quarter::start();
        for _ in 0..4 {
            q.advance();
        }
        assert_eq!(q, Quarter { index: 1, year: 2 });
        assert_eq!(Quarter { index: 3, year: 1 }.plus(2), Quarter { index: 1, year: 2 });
    }

    #[test]
    fn cellmap_indexing_and_totals() {
        let mut m: CellMap<u32> = CellMap::default();
        m[(Product::One, Area::South)] = 3;
        m[(Product::Three, Area::Export)] = 4;
        assert_eq!(m.total(), 7);
        assert_eq!(m.product_total(Product::Three), 4);
        assert_eq!(m.area_total(Area::South), 3);
        assert_eq!(m[(Product::Two, Area::North)], 0);
    }

    #[test]
    fn cellmap_serde_roundtrip() {
        let m = CellMap::from_fn(|p, a| (p.index() * 10 + a.index()) as u32);
        let s = serde_json::to_string(&m).unwrap();
        let back: CellMap<u32> = serde_json::from_str(&s).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn productmap_splat_and_total() {
        let m = ProductMap::splat(2.5f64);
        assert!((m.total() - 7.5).abs() < 1e-12);
        let counts: ProductMap<u32> = ProductMap::from_fn(|p| p.index() as u32);
        assert_eq!(counts.total(), 3);
    }
}
