#![deny(warnings)]

//! Economic models for Boardroom: demand attractiveness, competitive
//! market sharing, interest spreads, and the probabilistic rate formulas
//! used by the quarterly resolver.
//!
//! Everything here is a pure function over snapshots. The resolver rolls
//! the dice; this crate only supplies the odds and the curves.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::rules;
use sim_core::{Area, Product};
use tracing::trace;

/// A company's market-facing position for one (product, area) cell,
/// snapshotted from its decision record and prior-quarter ledger before
/// any company resolves. Demand competition reads only these snapshots,
/// never a mid-resolution ledger.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketStanding {
    pub price: f64,
    /// Combined three-channel advertising spend for the cell.
    pub advertising: f64,
    /// Declared assembly minutes for the product.
    pub assembly_minutes: f64,
    pub star_rating: f64,
    /// Cumulative development spend on the product.
    pub dev_accumulated: f64,
    /// Salespeople allocated to the area.
    pub salespeople: u32,
    pub credit_days: u32,
    /// Open backlog in the cell at quarter start.
    pub backlog: u32,
    /// On-hand stock in the cell at quarter start.
    pub stock: u32,
}

/// Reference price customers anchor against, per product.
pub fn reference_price(p: Product) -> f64 {
    100.0 + 20.0 * p.index() as f64
}

/// Composite multiplicative desirability of one company's offer in one
/// cell. Each factor is independent; the clamps on the quality, delivery
/// and availability factors keep any single lever from dominating.
pub fn attractiveness(p: Product, s: &MarketStanding) -> f64 {
    let price_factor = (-0.015 * (s.price - reference_price(p))).exp();
    let adv_factor = 1.0 + 0.0003 * s.advertising.max(0.0).sqrt();
    let q = s.assembly_minutes / rules::min_assembly_minutes(p);
    let quality_factor = (0.7 + 0.7 * q).min(1.4);
    let star_factor = 0.8 + (s.star_rating / 5.0) * 0.4;
    let dev_factor = 1.0 + 0.0001 * s.dev_accumulated.max(0.0).ln_1p();
    let sales_factor = 1.0 + 0.02 * s.salespeople as f64;
    let credit_factor = 1.0 + (s.credit_days as f64 - 30.0) / 200.0;
    let delivery_factor = (1.0 - s.backlog as f64 / 4_000.0).max(0.6);
    let availability_factor = (0.9 + s.stock as f64 / 2_000.0).min(1.1);

    let score = price_factor
        * adv_factor
        * quality_factor
        * star_factor
        * dev_factor
        * sales_factor
        * credit_factor
        * delivery_factor
        * availability_factor;
    trace!(product = p.name(), score, "attractiveness");
    score
}

/// Base demand for one cell before any company-specific factor: market
/// population relative to the smallest home area, a Q4 seasonal uplift,
/// and the GDP index.
pub fn base_demand(area: Area, quarter_index: u8, gdp: f64) -> f64 {
    let population_factor = rules::market_statistics(area).total as f64
        / rules::market_statistics(Area::South).total as f64;
    let seasonal_factor = if quarter_index == 4 { 1.10 } else { 1.0 };
    let gdp_factor = gdp / rules::BASE_GDP;
    1_000.0 * population_factor * seasonal_factor * gdp_factor
}

/// Share floor and ceiling in competitive mode. A tunable heuristic, not
/// a market law: the clamp stops one company sweeping a cell outright.
pub const SHARE_FLOOR: f64 = 0.05;
pub const SHARE_CEILING: f64 = 0.95;

/// A company's share of a contested cell: its attractiveness over the sum
/// of all companies', clamped to [`SHARE_FLOOR`, `SHARE_CEILING`]. With
/// zero total attractiveness every company gets an equal split.
pub fn market_share(own: f64, total: f64, company_count: usize) -> f64 {
    if total > 0.0 {
        (own / total).clamp(SHARE_FLOOR, SHARE_CEILING)
    } else {
        1.0 / company_count.max(1) as f64
    }
}

// Interest rates, quoted per annum in percentage points.

/// Rate earned on positive cash balances; never negative.
pub fn deposit_rate(cb_rate: f64) -> f64 {
    ((cb_rate + rules::DEPOSIT_RATE_SPREAD) / 100.0).max(0.0)
}

/// Rate charged on the overdraft balance.
pub fn overdraft_rate(cb_rate: f64) -> f64 {
    (cb_rate + rules::OVERDRAFT_RATE_SPREAD) / 100.0
}

/// Rate charged on unsecured loans.
pub fn loan_rate(cb_rate: f64) -> f64 {
    (cb_rate + rules::LOAN_RATE_SPREAD) / 100.0
}

/// Reject rate for production: declaring more assembly time than the
/// technical minimum buys quality; the floor keeps rejects nonzero.
pub fn reject_rate(declared_minutes: f64, min_minutes: f64) -> f64 {
    let q = declared_minutes / min_minutes;
    (0.10 / q.max(0.8)).max(0.01)
}

/// Recruitment success rate for salespeople: base chance plus terms in
/// unemployment and salary competitiveness, capped at 90%.
pub fn sales_recruitment_rate(unemployment: f64, salary: f64) -> f64 {
    let unemployment_factor = unemployment / rules::BASE_UNEMPLOYMENT;
    let pay_factor = salary / rules::MIN_SALES_SALARY;
    (0.3 + 0.3 * unemployment_factor + 0.2 * pay_factor).min(0.9)
}

/// Recruitment success rate for assembly workers.
pub fn assembly_recruitment_rate(unemployment: f64, wage_rate: f64) -> f64 {
    let unemployment_factor = unemployment / rules::BASE_UNEMPLOYMENT;
    let pay_factor = wage_rate / rules::ASSEMBLY_MIN_WAGE_RATE;
    (0.4 + 0.3 * unemployment_factor + 0.2 * pay_factor).min(0.9)
}

/// Realize a probabilistic headcount: expected value with stochastic
/// rounding, never exceeding the requested count.
pub fn recruitment_outcome<R: Rng>(requested: u32, success_rate: f64, rng: &mut R) -> u32 {
    if requested == 0 {
        return 0;
    }
    let drawn = (requested as f64 * success_rate + rng.gen::<f64>()).floor() as u32;
    drawn.min(requested)
}

/// Machine effectiveness from contracted maintenance hours per machine.
/// Under ~20 hours degrades the fleet; beyond that improves it, capped.
pub fn maintenance_factor(hours_per_machine: f64) -> f64 {
    (0.9 + hours_per_machine / 200.0).min(1.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn standing(price: f64) -> MarketStanding {
        MarketStanding {
            price,
            advertising: 0.0,
            assembly_minutes: rules::min_assembly_minutes(Product::One),
            star_rating: 3.0,
            dev_accumulated: 0.0,
            salespeople: 0,
            credit_days: 30,
            backlog: 0,
            stock: 0,
        }
    }

    #[test]
    fn cheaper_offers_are_more_attractive() {
        let low = attractiveness(Product::One, &standing(80.0));
        let high = attractiveness(Product::One, &standing(120.0));
        assert!(low > high);
    }

    #[test]
    fn advertising_has_diminishing_returns() {
        let none = standing(100.0);
        let some = MarketStanding {
            advertising: 10_000.0,
            ..none
        };
        let more = MarketStanding {
            advertising: 20_000.0,
            ..none
        };
        let first_step = attractiveness(Product::One, &some) - attractiveness(Product::One, &none);
        let second_step = attractiveness(Product::One, &more) - attractiveness(Product::One, &some);
        assert!(first_step > second_step);
        assert!(second_step > 0.0);
    }

    #[test]
    fn backlog_hurts_and_stock_helps() {
        let base = standing(100.0);
        let backlogged = MarketStanding {
            backlog: 2_000,
            ..base
        };
        let stocked = MarketStanding { stock: 500, ..base };
        assert!(attractiveness(Product::One, &backlogged) < attractiveness(Product::One, &base));
        assert!(attractiveness(Product::One, &stocked) > attractiveness(Product::One, &base));
    }

    #[test]
    fn base_demand_scales_with_area_and_season() {
        let south_q1 = base_demand(Area::South, 1, rules::BASE_GDP);
        let export_q1 = base_demand(Area::Export, 1, rules::BASE_GDP);
        let south_q4 = base_demand(Area::South, 4, rules::BASE_GDP);
        assert!((south_q1 - 1_000.0).abs() < 1e-9);
        assert!(export_q1 > 10.0 * south_q1);
        assert!((south_q4 / south_q1 - 1.10).abs() < 1e-9);
    }

    #[test]
    fn share_clamps_and_zero_total_splits_evenly() {
        assert_eq!(market_share(1.0, 1.0, 4), SHARE_CEILING);
        assert_eq!(market_share(0.0001, 100.0, 4), SHARE_FLOOR);
        assert_eq!(market_share(0.0, 0.0, 4), 0.25);
        let s = market_share(1.0, 3.0, 3);
        assert!((s - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn deposit_rate_never_negative() {
        assert_eq!(deposit_rate(0.25), 0.0);
        assert!((deposit_rate(5.0) - 0.03).abs() < 1e-12);
        assert!((overdraft_rate(3.0) - 0.07).abs() < 1e-12);
        assert!((loan_rate(3.0) - 0.13).abs() < 1e-12);
    }

    #[test]
    fn reject_rate_falls_with_declared_time() {
        let min = rules::min_assembly_minutes(Product::Two);
        let tight = reject_rate(min, min);
        let generous = reject_rate(min * 1.4, min);
        assert!(tight > generous);
        assert!(generous >= 0.01);
        // Floor binds for extravagant assembly time.
        assert_eq!(reject_rate(min * 100.0, min), 0.01);
    }

    #[test]
    fn recruitment_outcome_is_capped_and_deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let got = recruitment_outcome(5, 0.9, &mut rng);
            assert!(got <= 5);
        }
        assert_eq!(recruitment_outcome(0, 1.0, &mut rng), 0);
        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(
            recruitment_outcome(7, 0.5, &mut a),
            recruitment_outcome(7, 0.5, &mut b)
        );
    }

    proptest! {
        #[test]
        fn recruitment_rates_capped_at_ninety_percent(
            unemployment in 2.0f64..15.0,
            pay in 0.0f64..1_000_000.0,
        ) {
            prop_assert!(sales_recruitment_rate(unemployment, pay) <= 0.9);
            prop_assert!(assembly_recruitment_rate(unemployment, pay) <= 0.9);
        }

        #[test]
        fn share_stays_in_bounds(own in 0.0f64..1e6, other in 0.0f64..1e6) {
            let s = market_share(own, own + other, 2);
            prop_assert!((SHARE_FLOOR..=SHARE_CEILING).contains(&s));
        }

        #[test]
        fn attractiveness_is_positive(
            price in 1.0f64..500.0,
            adv in 0.0f64..100_000.0,
            stars in 1.0f64..5.0,
        ) {
            let s = MarketStanding {
                price,
                advertising: adv,
                star_rating: stars,
                ..standing(price)
            };
            prop_assert!(attractiveness(Product::Three, &s) > 0.0);
        }
    }
}
