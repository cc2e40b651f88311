//! The write-once quarterly result report: the sole contract consumed by
//! any reporting layer.

use crate::{CellMap, ProductMap, Quarter};
use serde::{Deserialize, Serialize};

/// Profit and loss for the quarter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub revenue: f64,
    pub cost_of_sales: f64,
    pub gross_profit: f64,
    pub total_overheads: f64,
    pub ebitda: f64,
    pub interest_received: f64,
    pub interest_paid: f64,
    pub depreciation: f64,
    pub profit_before_tax: f64,
    pub tax: f64,
    pub net_profit: f64,
    pub dividends: f64,
    pub retained: f64,
}

/// Cost of sales split into its components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostOfSales {
    pub materials: f64,
    pub assembly_wages: f64,
    pub machinist_wages: f64,
    pub production_overheads: f64,
}

impl CostOfSales {
    pub fn total(&self) -> f64 {
        self.materials + self.assembly_wages + self.machinist_wages + self.production_overheads
    }
}

/// Operating overheads by category; the total matches
/// `IncomeStatement::total_overheads`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverheadBreakdown {
    pub advertising: f64,
    pub product_development: f64,
    /// Salaries, commission, and fixed per-salesperson expenses.
    pub sales_force: f64,
    pub personnel_department: f64,
    pub maintenance: f64,
    pub warehousing: f64,
    pub external_storage: f64,
    pub purchasing: f64,
    pub management: f64,
    pub transport: f64,
    pub guarantee_servicing: f64,
    pub information: f64,
    /// Book value of stock cleared by a MAJOR implementation.
    pub stock_write_off: f64,
}

impl OverheadBreakdown {
    pub fn total(&self) -> f64 {
        self.advertising
            + self.product_development
            + self.sales_force
            + self.personnel_department
            + self.maintenance
            + self.warehousing
            + self.external_storage
            + self.purchasing
            + self.management
            + self.transport
            + self.guarantee_servicing
            + self.information
            + self.stock_write_off
    }
}

/// Transport cost split between the owned fleet and hired days.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportDetail {
    pub vehicle_days_required: u32,
    pub own_days_used: u32,
    pub hired_days: u32,
    pub fleet_fixed_cost: f64,
    pub own_running_cost: f64,
    pub hired_cost: f64,
}

impl TransportDetail {
    pub fn total(&self) -> f64 {
        self.fleet_fixed_cost + self.own_running_cost + self.hired_cost
    }
}

/// Operational detail: units through the factory and the market.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionDetail {
    pub scheduled: CellMap<u32>,
    pub produced: CellMap<u32>,
    pub rejected: CellMap<u32>,
    pub orders_received: CellMap<u32>,
    pub sold: CellMap<u32>,
    pub closing_backlog: CellMap<u32>,
    pub closing_stock: CellMap<u32>,
    pub capacity_ratio: f64,
    pub machine_hours_available: f64,
    pub machine_hours_worked: f64,
    pub assembly_hours_available: f64,
    pub assembly_hours_worked: f64,
    pub material_opening: f64,
    pub material_delivered: f64,
    pub material_consumed: f64,
    pub material_closing: f64,
}

/// Headcount movements over the quarter for one role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadcountMovement {
    pub opening: u32,
    pub recruited: u32,
    pub trained: u32,
    pub dismissed: u32,
    pub closing: u32,
}

/// Personnel movements for the quarter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelDetail {
    pub sales: HeadcountMovement,
    pub assembly: HeadcountMovement,
    pub machinists_opening: u32,
    pub machinists_closing: u32,
}

/// Balance sheet snapshot at quarter close.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub property: f64,
    pub machines: f64,
    pub vehicles: f64,
    pub product_stocks: f64,
    pub material_stock: f64,
    pub debtors: f64,
    pub cash: f64,
    pub overdraft: f64,
    pub unsecured_loans: f64,
    pub tax_liability: f64,
    pub creditors: f64,
    pub ordinary_capital: f64,
    pub reserves: f64,
    pub net_worth: f64,
}

/// Cash flow statement for the quarter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Cash received from this quarter's sales.
    pub receipts_from_sales: f64,
    /// Opening debtors collected this quarter.
    pub debtors_collected: f64,
    /// Immediate trading payments (wages, salaries, management, own
    /// transport, production overheads).
    pub immediate_payments: f64,
    /// Matured creditor bucket paid this quarter.
    pub creditors_paid: f64,
    pub capital_receipts: f64,
    pub capital_payments: f64,
    pub interest_received: f64,
    pub tax_paid: f64,
    pub dividends_paid: f64,
    pub net_cash_flow: f64,
    pub opening_cash: f64,
    pub closing_cash: f64,
    /// Borrowing drawn at settlement to keep cash non-negative.
    pub overdraft_drawn: f64,
    pub loan_drawn: f64,
}

/// Development outcome reported per product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevOutcome {
    #[default]
    None,
    Minor,
    Major,
}

/// Product development results for the quarter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentDetail {
    pub outcomes: ProductMap<DevOutcome>,
    pub star_ratings: ProductMap<f64>,
    /// Units written off per product by MAJOR implementations.
    pub write_off_units: ProductMap<u32>,
}

/// The full quarterly result for one company: P&L, balance sheet, cash
/// flow, and operational detail. Written once by the resolver, never
/// mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultReport {
    pub company: String,
    pub period: Quarter,
    pub income: IncomeStatement,
    pub cost_of_sales: CostOfSales,
    pub overheads: OverheadBreakdown,
    pub transport: TransportDetail,
    pub production: ProductionDetail,
    pub personnel: PersonnelDetail,
    pub development: DevelopmentDetail,
    pub balance_sheet: BalanceSheet,
    pub cash_flow: CashFlow,
    pub share_price: f64,
    pub shift_level: u8,
    pub machines_installed: u32,
    pub machines_ordered: u32,
    pub strike_weeks_next: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overhead_total_sums_every_category() {
        let o = OverheadBreakdown {
            advertising: 1.0,
            product_development: 2.0,
            sales_force: 3.0,
            personnel_department: 4.0,
            maintenance: 5.0,
            warehousing: 6.0,
            external_storage: 7.0,
            purchasing: 8.0,
            management: 9.0,
            transport: 10.0,
            guarantee_servicing: 11.0,
            information: 12.0,
            stock_write_off: 13.0,
        };
        assert_eq!(o.total(), 91.0);
    }

    #[test]
    fn report_serde_roundtrip() {
        let r = ResultReport {
            company: "Alpha".to_string(),
            ..ResultReport::default()
        };
        let s = serde_json::to_string(&r).unwrap();
        let back: ResultReport = serde_json::from_str(&s).unwrap();
        assert_eq!(back, r);
    }
}
