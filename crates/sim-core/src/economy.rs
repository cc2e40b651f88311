//! Process-wide macro-economic state, advanced once per quarter.

use crate::rules;
use crate::Quarter;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Macro indicators shared by every company. The central-bank rate and
/// material price set by [`Economy::advance`] apply to the *next* quarter;
/// a quarter's resolution always reads the values in effect before the
/// call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    /// Current calendar position.
    pub now: Quarter,
    /// GDP index, floored at 80.
    pub gdp: f64,
    /// Unemployment percentage, clamped to [2, 15].
    pub unemployment: f64,
    /// Central-bank rate in points, floored at 0.25.
    pub cb_rate: f64,
    /// Material price per 1000 units, floored at 60.
    pub material_price: f64,
}

impl Economy {
    /// Floors and caps the indicator series never escape.
    pub const GDP_FLOOR: f64 = 80.0;
    pub const UNEMPLOYMENT_MIN: f64 = 2.0;
    pub const UNEMPLOYMENT_MAX: f64 = 15.0;
    pub const CB_RATE_FLOOR: f64 = 0.25;
    pub const MATERIAL_PRICE_FLOOR: f64 = 60.0;

    /// Advance to the next quarter, drawing this quarter's stochastic
    /// shocks. Faster GDP growth nudges unemployment down; the bank rate
    /// chases a target implied by the GDP gap; the material price drifts
    /// with the rate gap plus idiosyncratic noise.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) {
        self.now.advance();

        let shock = Normal::new(0.0, 1.5).unwrap().sample(rng);
        self.gdp = (self.gdp * (1.0 + shock / 100.0)).max(Self::GDP_FLOOR);

        let u_shock = Normal::new(0.0, 0.3).unwrap().sample(rng);
        self.unemployment = (self.unemployment + u_shock - shock / 40.0)
            .clamp(Self::UNEMPLOYMENT_MIN, Self::UNEMPLOYMENT_MAX);

        let rate_target = 2.5 + (self.gdp - rules::BASE_GDP) / 40.0;
        self.cb_rate = (0.75 * self.cb_rate + 0.25 * rate_target).max(Self::CB_RATE_FLOOR);

        let price_noise = Normal::new(0.0, 0.01).unwrap().sample(rng);
        self.material_price = (self.material_price
            * (1.0 + (self.cb_rate - 2.5) / 200.0 + price_noise))
            .max(Self::MATERIAL_PRICE_FLOOR);
    }
}

impl Default for Economy {
    fn default() -> Self {
        Economy {
            now: Quarter::start(),
            gdp: rules::BASE_GDP,
            unemployment: rules::BASE_UNEMPLOYMENT,
            cb_rate: rules::BASE_CB_RATE,
            material_price: rules::BASE_MATERIAL_PRICE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn advance_rolls_calendar() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut econ = Economy::default();
        for _ in 0..4 {
            econ.advance(&mut rng);
        }
        assert_eq!(econ.now, Quarter { index: 1, year: 2 });
    }

    #[test]
    fn indicators_stay_bounded_over_a_thousand_quarters() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut econ = Economy::default();
        for _ in 0..1_000 {
            econ.advance(&mut rng);
            assert!(econ.gdp >= Economy::GDP_FLOOR);
            assert!(econ.unemployment >= Economy::UNEMPLOYMENT_MIN);
            assert!(econ.unemployment <= Economy::UNEMPLOYMENT_MAX);
            assert!(econ.cb_rate >= Economy::CB_RATE_FLOOR);
            assert!(econ.material_price >= Economy::MATERIAL_PRICE_FLOOR);
        }
    }

    proptest! {
        #[test]
        fn bounds_hold_for_any_seed(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut econ = Economy::default();
            for _ in 0..40 {
                econ.advance(&mut rng);
            }
            prop_assert!(econ.gdp >= Economy::GDP_FLOOR);
            prop_assert!((Economy::UNEMPLOYMENT_MIN..=Economy::UNEMPLOYMENT_MAX)
                .contains(&econ.unemployment));
            prop_assert!(econ.cb_rate >= Economy::CB_RATE_FLOOR);
            prop_assert!(econ.material_price >= Economy::MATERIAL_PRICE_FLOOR);
        }

        #[test]
        fn advance_is_deterministic_per_seed(seed in any::<u64>()) {
            let mut a = Economy::default();
            let mut b = Economy::default();
            let mut rng_a = ChaCha8Rng::seed_from_u64(seed);
            let mut rng_b = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..8 {
                a.advance(&mut rng_a);
                b.advance(&mut rng_b);
            }
            prop_assert_eq!(a, b);
        }
    }
}
