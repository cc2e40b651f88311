#![deny(warnings)]

//! Heuristic decision policy for companies without a human at the desk.
//!
//! The policy is stateless: it reads the company ledger and the ruleset,
//! rolls a few dice, and emits a structurally valid decision record. It
//! carries no memory between quarters.

use rand::seq::SliceRandom;
use rand::Rng;
use sim_core::rules;
use sim_core::{
    AdvertisingSpend, Area, AreaMap, CellMap, CompanyLedger, DecisionRecord, ProductMap,
};
use tracing::debug;

/// Relative salesforce weighting across areas: heavier coverage for the
/// larger markets.
fn area_weight(area: Area) -> f64 {
    match area {
        Area::South => 1.0,
        Area::West => 0.7,
        Area::North => 1.3,
        Area::Export => 1.2,
    }
}

/// Produce a full quarter's decisions for an AI-run company.
pub fn auto_decisions<R: Rng>(company: &CompanyLedger, rng: &mut R) -> DecisionRecord {
    let prices_home =
        ProductMap::from_fn(|p| sim_econ::reference_price(p) + rng.gen_range(-10..=10) as f64);
    let prices_export = ProductMap::from_fn(|p| prices_home[p] * 1.1);

    let assembly_minutes =
        ProductMap::from_fn(|p| rules::min_assembly_minutes(p) * rng.gen_range(1.0..=1.4));

    let advertising = CellMap::from_fn(|_, _| {
        let budget = *[0.0, 5_000.0, 10_000.0, 20_000.0].choose(rng).unwrap();
        AdvertisingSpend {
            trade_press: budget / 3.0,
            direct_support: budget / 3.0,
            merchandising: budget / 3.0,
        }
    });

    let development_spend =
        ProductMap::from_fn(|_| *[0.0, 5_000.0, 10_000.0].choose(rng).unwrap());

    let deliveries = CellMap::from_fn(|_, _| rng.gen_range(200..=1_500));

    let mut record = DecisionRecord {
        prices_home,
        prices_export,
        assembly_minutes,
        advertising,
        development_spend,
        deliveries,
        sales_allocation: allocate_salesforce(company.workforce.salespeople, rng),
        credit_days: *[30, 45, 60].choose(rng).unwrap(),
        shift_level: rng.gen_range(1..=3),
        maintenance_hours_per_machine: *[20.0, 40.0, 60.0].choose(rng).unwrap(),
        dividend_per_share: *[0.0, 0.02, 0.04].choose(rng).unwrap(),
        management_budget: *[40_000.0, 50_000.0, 60_000.0].choose(rng).unwrap(),
        recruit_sales: rng.gen_range(0..=2),
        recruit_assembly: *[0, 2, 4].choose(rng).unwrap(),
        train_assembly: *[0, 2, 4].choose(rng).unwrap(),
        material_quantity: *[4_000.0, 6_000.0, 8_000.0].choose(rng).unwrap(),
        material_supplier: 0,
        material_deliveries: 1,
        ..DecisionRecord::default()
    };

    // Implement any pending major improvement as soon as it is reported.
    record.implement_major = ProductMap::from_fn(|p| company.has_pending_major(p));

    debug!(company = %company.name, "generated policy decisions");
    record
}

/// Spread the salesforce across areas by fixed weights, handing out any
/// rounding remainder at random.
fn allocate_salesforce<R: Rng>(total: u32, rng: &mut R) -> AreaMap<u32> {
    let weight_sum: f64 = Area::ALL.iter().map(|&a| area_weight(a)).sum();
    let mut allocation =
        AreaMap::from_fn(|a| (total as f64 * area_weight(a) / weight_sum) as u32);
    while allocation.total() < total as u64 {
        let area = *Area::ALL.choose(rng).unwrap();
        allocation[area] += 1;
    }
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sim_core::{Product, Quarter};

    #[test]
    fn generated_decisions_are_structurally_valid() {
        let company = CompanyLedger::new("Bot");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let record = auto_decisions(&company, &mut rng);
            assert_eq!(record.validate(), Ok(()));
        }
    }

    #[test]
    fn salesforce_allocation_matches_headcount() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for total in [0u32, 1, 7, 10, 53] {
            let allocation = allocate_salesforce(total, &mut rng);
            assert_eq!(allocation.total(), total as u64);
        }
    }

    #[test]
    fn policy_implements_pending_majors() {
        let mut company = CompanyLedger::new("Bot");
        company.improvements.push(sim_core::Improvement {
            product: Product::Two,
            kind: sim_core::ImprovementKind::Major,
            reported: Quarter::start(),
            implemented: false,
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let record = auto_decisions(&company, &mut rng);
        assert!(record.implement_major[Product::Two]);
        assert!(!record.implement_major[Product::One]);
    }

    #[test]
    fn assembly_time_respects_technical_minimum() {
        let company = CompanyLedger::new("Bot");
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let record = auto_decisions(&company, &mut rng);
        for (p, &minutes) in record.assembly_minutes.iter() {
            assert!(minutes >= rules::min_assembly_minutes(p));
        }
    }
}
