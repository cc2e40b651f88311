//! Per-company persistent state: the ledger carried between quarters, its
//! pending orders, and the read-only financial limit queries.

use crate::rules;
use crate::{CellMap, Product, ProductMap, Quarter, Shift};
use crate::report::ResultReport;
use serde::{Deserialize, Serialize};

/// One machine on the factory floor, depreciated individually.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub age_quarters: u32,
    pub book_value: f64,
}

impl Machine {
    /// A newly installed machine at full cost.
    pub fn new() -> Self {
        Machine {
            age_quarters: 0,
            book_value: rules::MACHINE_COST,
        }
    }

    /// Age one quarter and shrink the book value by the fixed percentage
    /// of its current value; returns the depreciation charge.
    pub fn depreciate(&mut self) -> f64 {
        let charge = self.book_value * rules::MACHINE_DEPRECIATION_RATE;
        self.book_value -= charge;
        self.age_quarters += 1;
        charge
    }
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new()
    }
}

/// One delivery vehicle; its value derives entirely from age.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub age_quarters: u32,
}

impl Vehicle {
    /// Depreciated value: cost times (1 − rate) compounded by age.
    pub fn value(self) -> f64 {
        rules::VEHICLE_COST * (1.0 - rules::VEHICLE_DEPRECIATION_RATE).powi(self.age_quarters as i32)
    }

    /// The value lost if the vehicle ages one more quarter.
    pub fn quarterly_depreciation(self) -> f64 {
        self.value() * rules::VEHICLE_DEPRECIATION_RATE
    }
}

/// A material order placed with a supplier, delivered two quarters after
/// ordering at the price locked in at order time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialOrder {
    pub quantity: f64,
    pub supplier: usize,
    /// Declared delivery count, meaningful only for `Multiple` mode.
    pub deliveries: u32,
    pub placed: Quarter,
    pub due: Quarter,
    /// Material price per 1000 units in effect when the order was placed.
    pub price_per_1000: f64,
    pub delivered: bool,
}

/// A machine order: installed two quarters after ordering, usable one
/// quarter after that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineOrder {
    pub quantity: u32,
    pub placed: Quarter,
    pub installation_due: Quarter,
    pub available: Quarter,
    pub installed: bool,
}

/// A reported product-development outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImprovementKind {
    /// Requires explicit implementation; writes off existing stock.
    Major,
    /// Applied automatically when reported.
    Minor,
}

/// A development improvement logged against a product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub product: Product,
    pub kind: ImprovementKind,
    pub reported: Quarter,
    pub implemented: bool,
}

/// Headcounts by role, plus the delay buckets personnel moves pass
/// through. Machinist headcount is never stored: it is always derived from
/// the machine count and shift level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workforce {
    pub salespeople: u32,
    pub assembly_workers: u32,
    /// Activate at the start of next quarter (second leg of the
    /// two-quarter recruitment/training delay).
    pub sales_arriving_next: u32,
    pub assembly_arriving_next: u32,
    /// Queued this quarter; promoted to `*_arriving_next` at the next
    /// settlement (first leg of the delay).
    pub sales_arriving_later: u32,
    pub assembly_arriving_later: u32,
    /// Dismissals queued this quarter, leaving at the start of next.
    pub sales_leaving: u32,
    pub assembly_leaving: u32,
}

/// Cash position, borrowings, and accruals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Finances {
    pub cash: f64,
    pub overdraft: f64,
    pub unsecured_loan: f64,
    pub reserves: f64,
    pub tax_liability: f64,
    /// Taxable profit accumulated over the current fiscal year; reset
    /// after the Q4 assessment.
    pub taxable_profit_ytd: f64,
    pub debtors: f64,
    /// Creditor bucket falling due at the next settlement.
    pub creditors_due_next: f64,
    /// Creditor bucket falling due at the settlement after next.
    pub creditors_due_later: f64,
}

impl Finances {
    /// Total creditors balance across both timing buckets.
    pub fn creditors(&self) -> f64 {
        self.creditors_due_next + self.creditors_due_later
    }
}

/// Complete persistent state of one competing company. Mutated only by the
/// quarterly resolver; every read-only query here must stay recomputable
/// at any point mid-quarter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyLedger {
    pub name: String,

    pub shares_outstanding: f64,
    pub share_price: f64,

    /// Property never depreciates.
    pub property_value: f64,
    pub machines: Vec<Machine>,
    pub machine_orders: Vec<MachineOrder>,
    /// Fraction of rated machine hours actually achievable, maintained
    /// through contracted maintenance. In (0, 1].
    pub machine_efficiency: f64,
    pub vehicles: Vec<Vehicle>,

    pub material_stock: f64,
    pub material_orders: Vec<MaterialOrder>,
    pub stocks: CellMap<u32>,
    pub backlog: CellMap<u32>,

    pub workforce: Workforce,
    pub sales_salary: f64,
    pub sales_commission_rate: f64,
    pub assembly_wage_rate: f64,

    pub finances: Finances,

    pub improvements: Vec<Improvement>,
    pub star_ratings: ProductMap<f64>,
    pub dev_accumulated: ProductMap<f64>,
    pub dev_active: ProductMap<bool>,

    /// Shift pattern last run, used to derive machinist headcount between
    /// quarters.
    pub shift: Shift,
    /// Assembly strike weeks notified for the coming quarter.
    pub strike_weeks: u32,

    /// The most recent quarterly report, kept for display only.
    pub last_report: Option<ResultReport>,
}

impl CompanyLedger {
    /// A company at simulation start.
    pub fn new(name: impl Into<String>) -> Self {
        CompanyLedger {
            name: name.into(),
            shares_outstanding: 1_000_000.0,
            share_price: 1.0,
            property_value: 500_000.0,
            machines: vec![Machine::new(); 10],
            machine_orders: Vec::new(),
            machine_efficiency: 1.0,
            vehicles: vec![Vehicle::default(); 5],
            material_stock: 5_000.0,
            material_orders: Vec::new(),
            stocks: CellMap::default(),
            backlog: CellMap::default(),
            workforce: Workforce {
                salespeople: 10,
                assembly_workers: 40,
                ..Workforce::default()
            },
            sales_salary: rules::MIN_SALES_SALARY,
            sales_commission_rate: 0.0,
            assembly_wage_rate: rules::ASSEMBLY_MIN_WAGE_RATE,
            finances: Finances {
                cash: 200_000.0,
                ..Finances::default()
            },
            improvements: Vec::new(),
            star_ratings: ProductMap::splat(3.0),
            dev_accumulated: ProductMap::splat(0.0),
            dev_active: ProductMap::splat(false),
            shift: Shift::Single,
            strike_weeks: 0,
            last_report: None,
        }
    }

    /// Machinists currently on payroll, derived from crewing the machines
    /// at the given shift level.
    pub fn machinists(&self, shift: Shift) -> u32 {
        self.machines.len() as u32 * shift.machinists_per_machine()
    }

    /// Sum of individual machine book values.
    pub fn machine_value(&self) -> f64 {
        self.machines.iter().map(|m| m.book_value).sum()
    }

    /// Sum of depreciated vehicle values.
    pub fn vehicle_value(&self) -> f64 {
        self.vehicles.iter().map(|v| v.value()).sum()
    }

    /// Finished stock at standard valuation.
    pub fn product_stock_value(&self) -> f64 {
        self.stocks
            .iter()
            .map(|(p, _, &qty)| qty as f64 * rules::stock_valuation(p))
            .sum()
    }

    /// Raw material stock at half the prevailing price.
    pub fn material_stock_value(&self, material_price_per_1000: f64) -> f64 {
        self.material_stock * (material_price_per_1000 / 1000.0) * rules::MATERIAL_VALUATION_FRACTION
    }

    /// Net worth: all assets less all liabilities.
    pub fn net_worth(&self, material_price_per_1000: f64) -> f64 {
        let f = &self.finances;
        let assets = f.cash
            + self.property_value
            + self.machine_value()
            + self.vehicle_value()
            + self.product_stock_value()
            + self.material_stock_value(material_price_per_1000)
            + f.debtors;
        let liabilities = f.overdraft + f.unsecured_loan + f.tax_liability + f.creditors();
        assets - liabilities
    }

    /// Secured borrowing ceiling: full weight on cash and finished stock,
    /// half weight on plant, vehicles, materials and debtors, quarter
    /// weight on property, less tax and creditors in full. Never negative.
    pub fn overdraft_limit(&self, material_price_per_1000: f64) -> f64 {
        let f = &self.finances;
        let limit = f.cash
            + self.product_stock_value()
            + 0.5 * (self.machine_value()
                + self.vehicle_value()
                + self.material_stock_value(material_price_per_1000)
                + f.debtors)
            + 0.25 * self.property_value
            - (f.tax_liability + f.creditors());
        limit.max(0.0)
    }

    /// Borrowing capacity still available for new commitments: the
    /// overdraft ceiling less existing borrowings and the fixed deposit
    /// reserved per machine on order but not yet installed. Never
    /// negative.
    pub fn creditworthiness(&self, material_price_per_1000: f64) -> f64 {
        let reserved: f64 = self
            .machine_orders
            .iter()
            .filter(|mo| !mo.installed)
            .map(|mo| mo.quantity as f64 * rules::MACHINE_DEPOSIT)
            .sum();
        (self.overdraft_limit(material_price_per_1000)
            - self.finances.overdraft
            - self.finances.unsecured_loan
            - reserved)
            .max(0.0)
    }

    /// Whether an unimplemented MAJOR improvement is already pending for
    /// the product.
    pub fn has_pending_major(&self, product: Product) -> bool {
        self.improvements
            .iter()
            .any(|imp| imp.product == product && imp.kind == ImprovementKind::Major && !imp.implemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Area;

    #[test]
    fn starting_ledger_is_solvent() {
        let c = CompanyLedger::new("Alpha");
        let nw = c.net_worth(rules::BASE_MATERIAL_PRICE);
        // Cash + property + 10 fresh machines + 5 fresh vehicles + materials.
        assert!(nw > 2_500_000.0);
        assert_eq!(c.machinists(Shift::Single), 40);
        assert_eq!(c.machinists(Shift::Triple), 120);
    }

    #[test]
    fn machine_depreciation_compounds_and_never_zeroes() {
        let mut m = Machine::new();
        let mut last = m.book_value;
        for _ in 0..200 {
            let charge = m.depreciate();
            assert!(charge > 0.0);
            assert!(m.book_value < last);
            assert!(m.book_value > 0.0);
            last = m.book_value;
        }
        assert_eq!(m.age_quarters, 200);
    }

    #[test]
    fn vehicle_value_declines_with_age() {
        let young = Vehicle { age_quarters: 0 };
        let old = Vehicle { age_quarters: 8 };
        assert_eq!(young.value(), rules::VEHICLE_COST);
        assert!(old.value() < young.value());
        assert!(old.value() > 0.0);
    }

    #[test]
    fn creditworthiness_reserves_deposits_for_pending_machines() {
        let mut c = CompanyLedger::new("Alpha");
        let base = c.creditworthiness(rules::BASE_MATERIAL_PRICE);
        c.machine_orders.push(MachineOrder {
            quantity: 2,
            placed: Quarter::start(),
            installation_due: Quarter::start().plus(2),
            available: Quarter::start().plus(3),
            installed: false,
        });
        let reserved = c.creditworthiness(rules::BASE_MATERIAL_PRICE);
        assert!((base - reserved - 2.0 * rules::MACHINE_DEPOSIT).abs() < 1e-6);
        // Installed orders release the reservation.
        c.machine_orders[0].installed = true;
        assert!((c.creditworthiness(rules::BASE_MATERIAL_PRICE) - base).abs() < 1e-6);
    }

    #[test]
    fn overdraft_limit_floors_at_zero() {
        let mut c = CompanyLedger::new("Alpha");
        c.finances.cash = 0.0;
        c.finances.tax_liability = 10_000_000.0;
        assert_eq!(c.overdraft_limit(rules::BASE_MATERIAL_PRICE), 0.0);
    }

    #[test]
    fn pending_major_lookup() {
        let mut c = CompanyLedger::new("Alpha");
        assert!(!c.has_pending_major(Product::One));
        c.improvements.push(Improvement {
            product: Product::One,
            kind: ImprovementKind::Major,
            reported: Quarter::start(),
            implemented: false,
        });
        assert!(c.has_pending_major(Product::One));
        assert!(!c.has_pending_major(Product::Two));
        c.improvements[0].implemented = true;
        assert!(!c.has_pending_major(Product::One));
    }

    #[test]
    fn stock_value_uses_standard_valuations() {
        let mut c = CompanyLedger::new("Alpha");
        c.stocks[(Product::One, Area::South)] = 10;
        c.stocks[(Product::Three, Area::Export)] = 5;
        assert_eq!(c.product_stock_value(), 10.0 * 80.0 + 5.0 * 200.0);
    }
}
