//! The immutable decision bundle a company submits for one quarter.

use crate::rules;
use crate::{AreaMap, CellMap, ProductMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Advertising spend for one (product, area) cell, split across the three
/// promotion channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvertisingSpend {
    pub trade_press: f64,
    pub direct_support: f64,
    pub merchandising: f64,
}

impl AdvertisingSpend {
    /// Combined spend across all three channels.
    pub fn total(&self) -> f64 {
        self.trade_press + self.direct_support + self.merchandising
    }
}

/// Structural defects in a submitted decision record. Business-rule
/// violations (over-cap counts, undersized orders) are never errors, since
/// the resolver clamps those silently, but a record that is numerically
/// malformed is rejected before any company state is touched.
#[derive(Debug, Error, PartialEq)]
pub enum DecisionError {
    /// A monetary or time field is NaN or infinite.
    #[error("non-finite value in field `{0}`")]
    NonFinite(&'static str),
    /// A monetary field is negative.
    #[error("negative amount in field `{0}`")]
    NegativeAmount(&'static str),
    /// Shift level outside 1–3.
    #[error("shift level {0} is outside 1..=3")]
    InvalidShift(u8),
    /// Supplier index outside the ruleset's supplier table.
    #[error("supplier index {0} is outside the supplier table")]
    InvalidSupplier(usize),
}

/// Everything one company decides for one quarter. Immutable once
/// submitted; the resolver reads it but never writes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Implement a pending MAJOR improvement for the product this quarter.
    pub implement_major: ProductMap<bool>,

    /// Unit prices in the three home areas.
    pub prices_home: ProductMap<f64>,
    /// Unit prices in the export area.
    pub prices_export: ProductMap<f64>,

    /// Advertising spend per (product, area), split across channels.
    pub advertising: CellMap<AdvertisingSpend>,

    /// Declared assembly minutes per unit; clamped up to the technical
    /// minimum at the point of use.
    pub assembly_minutes: ProductMap<f64>,

    /// Salespeople assigned to each area.
    pub sales_allocation: AreaMap<u32>,
    /// Quarterly salary per salesperson.
    pub sales_salary: f64,
    /// Commission as a percentage of realized revenue.
    pub sales_commission_pct: f64,
    /// Hourly assembly wage rate.
    pub assembly_wage_rate: f64,

    /// Shift level, 1–3.
    pub shift_level: u8,
    /// Management budget; floored at the statutory minimum at use.
    pub management_budget: f64,
    /// Contracted maintenance hours per machine.
    pub maintenance_hours_per_machine: f64,
    /// Dividend declared per share.
    pub dividend_per_share: f64,
    /// Credit days offered to customers.
    pub credit_days: u32,

    pub vehicles_to_buy: u32,
    pub vehicles_to_sell: u32,

    pub buy_competitor_info: bool,
    pub buy_market_shares: bool,

    /// Scheduled production deliveries per (product, area).
    pub deliveries: CellMap<u32>,

    /// Development spend per product this quarter.
    pub development_spend: ProductMap<f64>,

    pub recruit_sales: u32,
    pub dismiss_sales: u32,
    pub train_sales: u32,
    pub recruit_assembly: u32,
    pub dismiss_assembly: u32,
    pub train_assembly: u32,

    /// Material order quantity; zero means no order.
    pub material_quantity: f64,
    /// Supplier index into the ruleset table.
    pub material_supplier: usize,
    /// Delivery count for suppliers in `Multiple` mode.
    pub material_deliveries: u32,

    pub machines_to_sell: u32,
    pub machines_to_order: u32,
}

impl Default for DecisionRecord {
    fn default() -> Self {
        DecisionRecord {
            implement_major: ProductMap::splat(false),
            prices_home: ProductMap::splat(0.0),
            prices_export: ProductMap::splat(0.0),
            advertising: CellMap::default(),
            assembly_minutes: ProductMap::from_fn(rules::min_assembly_minutes),
            sales_allocation: AreaMap::default(),
            sales_salary: rules::MIN_SALES_SALARY,
            sales_commission_pct: 0.0,
            assembly_wage_rate: rules::ASSEMBLY_MIN_WAGE_RATE,
            shift_level: 1,
            management_budget: rules::MIN_MANAGEMENT_BUDGET,
            maintenance_hours_per_machine: 0.0,
            dividend_per_share: 0.0,
            credit_days: 30,
            vehicles_to_buy: 0,
            vehicles_to_sell: 0,
            buy_competitor_info: false,
            buy_market_shares: false,
            deliveries: CellMap::default(),
            development_spend: ProductMap::splat(0.0),
            recruit_sales: 0,
            dismiss_sales: 0,
            train_sales: 0,
            recruit_assembly: 0,
            dismiss_assembly: 0,
            train_assembly: 0,
            material_quantity: 0.0,
            material_supplier: 0,
            material_deliveries: 0,
            machines_to_sell: 0,
            machines_to_order: 0,
        }
    }
}

impl DecisionRecord {
    /// Reject structurally malformed records before resolution begins.
    pub fn validate(&self) -> Result<(), DecisionError> {
        if !(1..=3).contains(&self.shift_level) {
            return Err(DecisionError::InvalidShift(self.shift_level));
        }
        if self.material_supplier >= rules::SUPPLIER_COUNT {
            return Err(DecisionError::InvalidSupplier(self.material_supplier));
        }
        for (name, value) in self.monetary_fields() {
            if !value.is_finite() {
                return Err(DecisionError::NonFinite(name));
            }
            if value < 0.0 {
                return Err(DecisionError::NegativeAmount(name));
            }
        }
        Ok(())
    }

    fn monetary_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("sales_salary", self.sales_salary),
            ("sales_commission_pct", self.sales_commission_pct),
            ("assembly_wage_rate", self.assembly_wage_rate),
            ("management_budget", self.management_budget),
            ("maintenance_hours_per_machine", self.maintenance_hours_per_machine),
            ("dividend_per_share", self.dividend_per_share),
            ("material_quantity", self.material_quantity),
        ];
        for (_, &price) in self.prices_home.iter() {
            fields.push(("prices_home", price));
        }
        for (_, &price) in self.prices_export.iter() {
            fields.push(("prices_export", price));
        }
        for (_, &minutes) in self.assembly_minutes.iter() {
            fields.push(("assembly_minutes", minutes));
        }
        for (_, &spend) in self.development_spend.iter() {
            fields.push(("development_spend", spend));
        }
        for (_, _, spend) in self.advertising.iter() {
            fields.push(("advertising", spend.total()));
        }
        fields
    }

    /// Combined three-channel advertising spend for one cell.
    pub fn advertising_total(&self, p: crate::Product, a: crate::Area) -> f64 {
        self.advertising[(p, a)].total()
    }

    /// The effective price charged in an area.
    pub fn price_for(&self, p: crate::Product, a: crate::Area) -> f64 {
        if a.is_export() {
            self.prices_export[p]
        } else {
            self.prices_home[p]
        }
    }
}
