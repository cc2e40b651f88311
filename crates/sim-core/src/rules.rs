//! Static ruleset: the immutable parameter tables every other component
//! prices against. Pure data and lookup functions, no state.

use crate::{Area, Product};
use serde::{Deserialize, Serialize};

// Market statistics.

/// Population and outlet counts for one sales area.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MarketStatistics {
    pub managerial: u64,
    pub supervisory: u64,
    pub other: u64,
    pub total: u64,
    pub outlets: u32,
}

/// Market statistics per area.
pub fn market_statistics(area: Area) -> MarketStatistics {
    match area {
        Area::South => MarketStatistics {
            managerial: 1_000_000,
            supervisory: 2_000_000,
            other: 4_000_000,
            total: 7_000_000,
            outlets: 3_000,
        },
        Area::West => MarketStatistics {
            managerial: 1_000_000,
            supervisory: 1_000_000,
            other: 2_000_000,
            total: 4_000_000,
            outlets: 2_000,
        },
        Area::North => MarketStatistics {
            managerial: 1_000_000,
            supervisory: 3_000_000,
            other: 9_000_000,
            total: 13_000_000,
            outlets: 4_000,
        },
        Area::Export => MarketStatistics {
            managerial: 10_000_000,
            supervisory: 15_000_000,
            other: 55_000_000,
            total: 80_000_000,
            outlets: 20_000,
        },
    }
}

// Marketing costs.

/// Fixed quarterly expense per salesperson, on top of salary.
pub const SALESPERSON_EXPENSES: f64 = 3_000.0;
/// Quarterly fee for the competitor information report.
pub const COMPETITOR_INFO_COST: f64 = 5_000.0;
/// Quarterly fee for the market shares report.
pub const MARKET_SHARES_INFO_COST: f64 = 5_000.0;

// Manufacturing parameters.

/// Technical minimum machining minutes per unit.
pub fn min_machining_minutes(p: Product) -> f64 {
    match p {
        Product::One => 60.0,
        Product::Two => 75.0,
        Product::Three => 120.0,
    }
}

/// Technical minimum assembly minutes per unit; declared assembly time may
/// exceed this but never go below it.
pub fn min_assembly_minutes(p: Product) -> f64 {
    match p {
        Product::One => 100.0,
        Product::Two => 150.0,
        Product::Three => 300.0,
    }
}

/// Raw material units consumed per finished unit.
pub fn material_per_unit(p: Product) -> f64 {
    match p {
        Product::One => 1.0,
        Product::Two => 2.0,
        Product::Three => 3.0,
    }
}

// Maintenance.

/// Hourly rate for contracted maintenance.
pub const CONTRACTED_MAINTENANCE_RATE: f64 = 60.0;
/// Hourly rate for uncontracted (emergency) maintenance.
pub const UNCONTRACTED_MAINTENANCE_RATE: f64 = 120.0;

// Shift working.

/// Shift pattern the factory runs on: single, double, or triple shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    Single,
    Double,
    Triple,
}

impl Shift {
    /// Clamp a raw decision level into the valid 1–3 range.
    pub fn from_level(level: u8) -> Shift {
        match level {
            0 | 1 => Shift::Single,
            2 => Shift::Double,
            _ => Shift::Triple,
        }
    }

    /// Shift level as an integer, 1–3.
    pub fn level(self) -> u8 {
        match self {
            Shift::Single => 1,
            Shift::Double => 2,
            Shift::Triple => 3,
        }
    }

    /// Maximum hours available per machine per quarter.
    pub fn machine_hours(self) -> f64 {
        match self {
            Shift::Single => 576.0,
            Shift::Double => 1_068.0,
            Shift::Triple => 1_602.0,
        }
    }

    /// Machinists required to crew one machine.
    pub fn machinists_per_machine(self) -> u32 {
        match self {
            Shift::Single => 4,
            Shift::Double => 8,
            Shift::Triple => 12,
        }
    }

    /// Maximum hours per production worker per quarter: basic week plus
    /// Saturday and Sunday working.
    pub fn worker_hours(self) -> f64 {
        let (basic, saturday, sunday) = self.worker_hours_split();
        basic + saturday + sunday
    }

    /// Basic/Saturday/Sunday components of the quarterly worker hours.
    pub fn worker_hours_split(self) -> (f64, f64, f64) {
        match self {
            Shift::Single => (420.0, 84.0, 72.0),
            Shift::Double => (420.0, 42.0, 72.0),
            Shift::Triple => (420.0, 42.0, 72.0),
        }
    }

    /// Machinist pay premium over the assembly wage rate.
    pub fn machinist_premium(self) -> f64 {
        match self {
            Shift::Single => 0.0,
            Shift::Double => 1.0 / 3.0,
            Shift::Triple => 2.0 / 3.0,
        }
    }
}

impl Default for Shift {
    fn default() -> Self {
        Shift::Single
    }
}

// Rejected product valuation and guarantee servicing.

/// Scrap value recovered per rejected unit.
pub fn scrap_value(p: Product) -> f64 {
    match p {
        Product::One => 20.0,
        Product::Two => 40.0,
        Product::Three => 60.0,
    }
}

/// Guarantee servicing charge per rejected unit reaching customers.
pub fn servicing_charge(p: Product) -> f64 {
    match p {
        Product::One => 60.0,
        Product::Two => 120.0,
        Product::Three => 200.0,
    }
}

// Production costs.

/// Supervision cost per shift level run.
pub const SUPERVISION_COST_PER_SHIFT: f64 = 10_000.0;
/// Fixed production overhead per machine per quarter.
pub const PRODUCTION_OVERHEAD_PER_MACHINE: f64 = 2_000.0;
/// Running cost per machine-hour worked.
pub const MACHINE_RUNNING_COST_PER_HOUR: f64 = 7.0;
/// Production planning cost per scheduled unit.
pub const PRODUCTION_PLANNING_COST_PER_UNIT: f64 = 1.0;

// Transport.

/// Units of a product one standard vehicle carries.
pub fn vehicle_capacity(p: Product) -> u32 {
    match p {
        Product::One => 40,
        Product::Two => 40,
        Product::Three => 20,
    }
}

/// Round-trip journey days to an area.
pub fn journey_days(area: Area) -> u32 {
    match area {
        Area::South => 1,
        Area::West => 2,
        Area::North => 4,
        Area::Export => 6,
    }
}

/// Fixed quarterly cost per owned vehicle.
pub const FLEET_FIXED_COST_PER_VEHICLE: f64 = 7_000.0;
/// Running cost per day for an owned vehicle.
pub const OWN_VEHICLE_RUNNING_COST_PER_DAY: f64 = 50.0;
/// Hire cost per day for an external vehicle.
pub const HIRED_VEHICLE_COST_PER_DAY: f64 = 200.0;
/// Working days one owned vehicle supplies per quarter.
pub const MAX_VEHICLE_DAYS_PER_QUARTER: u32 = 60;

// Warehousing and purchasing.

/// Material units the factory warehouse holds before overflow.
pub const FACTORY_STORAGE_CAPACITY: f64 = 2_000.0;
/// Fixed quarterly warehouse cost.
pub const FIXED_QUARTERLY_WAREHOUSE_COST: f64 = 3_750.0;
/// Fixed quarterly purchasing administration cost.
pub const FIXED_QUARTERLY_ADMIN_COST: f64 = 3_250.0;
/// Administration cost per material order placed.
pub const COST_PER_ORDER: f64 = 750.0;
/// External storage cost per overflow material unit.
pub const VARIABLE_EXTERNAL_STORAGE_COST: f64 = 1.5;
/// Storage cost per finished unit held per quarter.
pub const PRODUCT_STORAGE_COST: f64 = 2.0;

// Material suppliers.

/// How a supplier spreads an order's quantity across the delivery quarter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Whole quantity arrives in one lump.
    Immediate,
    /// Quantity split evenly over the buyer's declared delivery count.
    Multiple,
    /// Fixed weekly deliveries, twelve per quarter.
    Weekly,
}

/// One supplier's terms of trade.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SupplierTerms {
    pub discount: f64,
    pub delivery_charge: f64,
    pub min_order: f64,
    pub mode: DeliveryMode,
}

/// Number of suppliers available.
pub const SUPPLIER_COUNT: usize = 4;

/// Weekly-mode deliveries per quarter.
pub const WEEKLY_DELIVERIES_PER_QUARTER: u32 = 12;

/// Terms of trade for supplier 0–3. Higher discounts demand larger minimum
/// orders.
pub fn supplier_terms(supplier: usize) -> SupplierTerms {
    match supplier {
        0 => SupplierTerms {
            discount: 0.0,
            delivery_charge: 0.0,
            min_order: 1.0,
            mode: DeliveryMode::Immediate,
        },
        1 => SupplierTerms {
            discount: 0.10,
            delivery_charge: 200.0,
            min_order: 1.0,
            mode: DeliveryMode::Multiple,
        },
        2 => SupplierTerms {
            discount: 0.15,
            delivery_charge: 300.0,
            min_order: 10_000.0,
            mode: DeliveryMode::Multiple,
        },
        _ => SupplierTerms {
            discount: 0.30,
            delivery_charge: 100.0,
            min_order: 50_000.0,
            mode: DeliveryMode::Weekly,
        },
    }
}

// Personnel department.

/// Workforce categories managed through the personnel department.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Salesperson,
    AssemblyWorker,
    Machinist,
}

impl Role {
    /// One-off cost per person recruited.
    pub fn recruitment_cost(self) -> f64 {
        match self {
            Role::Salesperson => 1_500.0,
            Role::AssemblyWorker => 1_200.0,
            Role::Machinist => 750.0,
        }
    }

    /// One-off cost per person dismissed.
    pub fn dismissal_cost(self) -> f64 {
        match self {
            Role::Salesperson => 5_000.0,
            Role::AssemblyWorker => 3_000.0,
            Role::Machinist => 1_500.0,
        }
    }

    /// One-off cost per person put through training.
    pub fn training_cost(self) -> f64 {
        match self {
            Role::Salesperson => 6_000.0,
            Role::AssemblyWorker => 4_500.0,
            Role::Machinist => 0.0,
        }
    }
}

/// Most trainees accepted per category per quarter.
pub const MAX_TRAINEES_PER_CATEGORY: u32 = 9;

// Minimum pay.

/// Statutory minimum assembly wage per hour.
pub const ASSEMBLY_MIN_WAGE_RATE: f64 = 8.5;
/// Statutory minimum salesperson salary per quarter.
pub const MIN_SALES_SALARY: f64 = 2_000.0;
/// Statutory minimum management budget per quarter.
pub const MIN_MANAGEMENT_BUDGET: f64 = 40_000.0;
/// Assembly hours lost per strike week.
pub const STRIKE_HOURS_PER_WEEK_DIVISOR: f64 = 12.0;

// Fixed assets.

/// Purchase cost of one machine.
pub const MACHINE_COST: f64 = 200_000.0;
/// Deposit per machine, committed against creditworthiness at order time.
pub const MACHINE_DEPOSIT: f64 = 100_000.0;
/// Purchase cost of one vehicle.
pub const VEHICLE_COST: f64 = 15_000.0;
/// Machine book value decline per quarter, on current value.
pub const MACHINE_DEPRECIATION_RATE: f64 = 0.025;
/// Vehicle value decline per quarter, on original cost compounded by age.
pub const VEHICLE_DEPRECIATION_RATE: f64 = 0.0625;

// Financial parameters.

/// Corporation tax rate per annum.
pub const TAX_RATE: f64 = 0.30;
/// Deposit interest spread below the central-bank rate, in points.
pub const DEPOSIT_RATE_SPREAD: f64 = -2.0;
/// Overdraft interest spread above the central-bank rate, in points.
pub const OVERDRAFT_RATE_SPREAD: f64 = 4.0;
/// Unsecured loan interest spread above the central-bank rate, in points.
pub const LOAN_RATE_SPREAD: f64 = 10.0;
/// Issue value per ordinary share, reported as capital on the balance sheet.
pub const SHARE_ISSUE_VALUE: f64 = 2.0;

// Stock valuations.

/// Standard balance-sheet valuation per finished unit.
pub fn stock_valuation(p: Product) -> f64 {
    match p {
        Product::One => 80.0,
        Product::Two => 120.0,
        Product::Three => 200.0,
    }
}

/// Raw material stock is valued at this fraction of the last quarter's
/// material price.
pub const MATERIAL_VALUATION_FRACTION: f64 = 0.5;

// Payment timing.

/// Cost categories whose payment is deferred to creditors rather than made
/// in the quarter the cost arises. Anything not listed here pays
/// immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostCategory {
    Advertising,
    GuaranteeServicing,
    HiredTransport,
    ProductDevelopment,
    PersonnelDepartment,
    Maintenance,
    WarehousingPurchasing,
    ExternalStorage,
    BusinessIntelligence,
    MaterialsPurchased,
    MachinesPurchased,
    Interest,
}

/// Fractions of a cost falling due next quarter and the quarter after next.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentTiming {
    pub next_quarter: f64,
    pub quarter_after_next: f64,
}

/// When each deferred cost category is actually paid.
pub fn payment_timing(category: CostCategory) -> PaymentTiming {
    use CostCategory::*;
    match category {
        Advertising | GuaranteeServicing | HiredTransport | ExternalStorage
        | BusinessIntelligence | MaterialsPurchased => PaymentTiming {
            next_quarter: 0.0,
            quarter_after_next: 1.0,
        },
        ProductDevelopment | PersonnelDepartment | WarehousingPurchasing | Interest => {
            PaymentTiming {
                next_quarter: 1.0,
                quarter_after_next: 0.0,
            }
        }
        Maintenance => PaymentTiming {
            next_quarter: 0.0,
            quarter_after_next: 1.0,
        },
        // 50% deposit next quarter, 50% on installation.
        MachinesPurchased => PaymentTiming {
            next_quarter: 0.5,
            quarter_after_next: 0.5,
        },
    }
}

/// Fraction of revenue received as cash within the quarter; the remainder
/// becomes debtors, collected the following quarter.
pub const REVENUE_CASH_FRACTION: f64 = 0.7;

// Customer credit discounts.

/// Early-settlement discount offered to customers, by credit days granted.
pub fn credit_discount(credit_days: u32) -> f64 {
    match credit_days {
        0..=7 => 0.10,
        8..=15 => 0.075,
        16..=29 => 0.05,
        _ => 0.0,
    }
}

// Product development.

/// Cumulative spend beyond which a MAJOR improvement may be reported.
pub const DEV_MAJOR_THRESHOLD: f64 = 100_000.0;
/// Per-quarter probability of a MAJOR report once over threshold.
pub const DEV_MAJOR_PROBABILITY: f64 = 0.15;
/// Cumulative spend beyond which a MINOR improvement may be reported.
pub const DEV_MINOR_THRESHOLD: f64 = 30_000.0;
/// Per-quarter probability of a MINOR report once over threshold.
pub const DEV_MINOR_PROBABILITY: f64 = 0.30;
/// Per-quarter probability of star decay for an abandoned project.
pub const DEV_DECAY_PROBABILITY: f64 = 0.10;
/// Star rating delta from a MINOR improvement (and from decay, negated).
pub const STAR_MINOR_STEP: f64 = 0.1;
/// Star rating boost when a MAJOR improvement is implemented.
pub const STAR_MAJOR_STEP: f64 = 0.5;
/// Star rating bounds.
pub const STAR_MIN: f64 = 1.0;
pub const STAR_MAX: f64 = 5.0;

// Base economic values.

/// Index value the GDP series starts from.
pub const BASE_GDP: f64 = 100.0;
/// Unemployment percentage the series starts from.
pub const BASE_UNEMPLOYMENT: f64 = 6.0;
/// Central-bank rate the series starts from, in points.
pub const BASE_CB_RATE: f64 = 3.0;
/// Material price per 1000 units the series starts from.
pub const BASE_MATERIAL_PRICE: f64 = 100.0;
