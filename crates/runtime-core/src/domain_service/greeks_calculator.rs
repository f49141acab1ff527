//! Black-Scholes Greeks, theoretical price, and implied volatility.
//!
//! Pure computation, no side effects: every method takes its inputs by
//! value and returns a result value object.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::value_objects::{GreeksError, GreeksInput, GreeksResult, IvError, IvResult, OptionType};

fn standard_normal() -> Normal {
    Normal::new(0.0, 1.0).expect("N(0, 1) is always a valid normal distribution")
}

fn norm_cdf(x: f64) -> f64 {
    standard_normal().cdf(x)
}

fn norm_pdf(x: f64) -> f64 {
    standard_normal().pdf(x)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GreeksCalculator;

impl GreeksCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_greeks(&self, params: GreeksInput) -> GreeksResult {
        let (s, k, t, r, sigma) = (
            params.spot_price,
            params.strike_price,
            params.time_to_expiry,
            params.risk_free_rate,
            params.volatility,
        );

        if s <= 0.0 || k <= 0.0 {
            return GreeksResult::err(GreeksError::NonPositivePrice);
        }
        if t < 0.0 {
            return GreeksResult::err(GreeksError::NegativeTimeToExpiry);
        }
        if sigma <= 0.0 {
            return GreeksResult::err(GreeksError::NonPositiveVolatility);
        }

        if t == 0.0 {
            let delta = match params.option_type {
                OptionType::Call => if s > k { 1.0 } else { 0.0 },
                OptionType::Put => if s < k { -1.0 } else { 0.0 },
            };
            return GreeksResult::ok(delta, 0.0, 0.0, 0.0);
        }

        let sqrt_t = t.sqrt();
        let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
        let d2 = d1 - sigma * sqrt_t;

        if !d1.is_finite() || !d2.is_finite() {
            return GreeksResult::err(GreeksError::NumericOverflow);
        }

        let pdf_d1 = norm_pdf(d1);
        let cdf_d1 = norm_cdf(d1);
        let cdf_d2 = norm_cdf(d2);

        let gamma = pdf_d1 / (s * sigma * sqrt_t);
        let vega = s * pdf_d1 * sqrt_t / 100.0;

        let (delta, theta) = match params.option_type {
            OptionType::Call => {
                let theta = (-s * pdf_d1 * sigma / (2.0 * sqrt_t) - r * k * (-r * t).exp() * cdf_d2) / 365.0;
                (cdf_d1, theta)
            }
            OptionType::Put => {
                let theta =
                    (-s * pdf_d1 * sigma / (2.0 * sqrt_t) + r * k * (-r * t).exp() * norm_cdf(-d2)) / 365.0;
                (cdf_d1 - 1.0, theta)
            }
        };

        if !gamma.is_finite() || !vega.is_finite() || !theta.is_finite() {
            return GreeksResult::err(GreeksError::NumericOverflow);
        }

        GreeksResult::ok(delta, gamma, theta, vega)
    }

    pub fn bs_price(&self, params: GreeksInput) -> f64 {
        let (s, k, t, r, sigma) = (
            params.spot_price,
            params.strike_price,
            params.time_to_expiry,
            params.risk_free_rate,
            params.volatility,
        );

        if t == 0.0 {
            return match params.option_type {
                OptionType::Call => (s - k).max(0.0),
                OptionType::Put => (k - s).max(0.0),
            };
        }

        let sqrt_t = t.sqrt();
        let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
        let d2 = d1 - sigma * sqrt_t;

        match params.option_type {
            OptionType::Call => s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2),
            OptionType::Put => k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1),
        }
    }

    /// Newton-Raphson search with bisection fallback whenever the Newton
    /// step would leave the current `[sigma_low, sigma_high]` bracket.
    #[allow(clippy::too_many_arguments)]
    pub fn calculate_implied_volatility(
        &self,
        market_price: f64,
        spot_price: f64,
        strike_price: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        option_type: OptionType,
        max_iterations: u32,
        tolerance: f64,
    ) -> IvResult {
        if market_price <= 0.0 {
            return IvResult::err(IvError::NonPositiveMarketPrice, 0);
        }

        let intrinsic = match option_type {
            OptionType::Call => {
                (spot_price - strike_price * (-risk_free_rate * time_to_expiry).exp()).max(0.0)
            }
            OptionType::Put => {
                (strike_price * (-risk_free_rate * time_to_expiry).exp() - spot_price).max(0.0)
            }
        };

        if market_price < intrinsic - tolerance {
            return IvResult::err(IvError::BelowIntrinsicValue, 0);
        }

        let mut sigma = 0.5;
        let mut sigma_low = 0.001;
        let mut sigma_high = 10.0;

        for i in 0..max_iterations {
            let params = GreeksInput {
                spot_price,
                strike_price,
                time_to_expiry,
                risk_free_rate,
                volatility: sigma,
                option_type,
            };
            let price = self.bs_price(params);
            let greeks = self.calculate_greeks(params);

            let diff = price - market_price;
            if diff.abs() < tolerance {
                return IvResult::ok(sigma, i + 1);
            }

            if diff > 0.0 {
                sigma_high = sigma;
            } else {
                sigma_low = sigma;
            }

            let vega_raw = if greeks.success { greeks.vega * 100.0 } else { 0.0 };
            if vega_raw.abs() > 1e-10 {
                let new_sigma = sigma - diff / vega_raw;
                sigma = if sigma_low < new_sigma && new_sigma < sigma_high {
                    new_sigma
                } else {
                    (sigma_low + sigma_high) / 2.0
                };
            } else {
                sigma = (sigma_low + sigma_high) / 2.0;
            }
        }

        IvResult::err(IvError::NotConverged, max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atm_call() -> GreeksInput {
        GreeksInput {
            spot_price: 100.0,
            strike_price: 100.0,
            time_to_expiry: 0.25,
            risk_free_rate: 0.03,
            volatility: 0.2,
            option_type: OptionType::Call,
        }
    }

    #[test]
    fn atm_call_delta_is_near_half() {
        let calc = GreeksCalculator::new();
        let result = calc.calculate_greeks(atm_call());
        assert!(result.success);
        assert!((result.delta - 0.57).abs() < 0.05);
        assert!(result.gamma > 0.0);
        assert!(result.vega > 0.0);
    }

    #[test]
    fn put_call_parity_holds_approximately() {
        let calc = GreeksCalculator::new();
        let call_price = calc.bs_price(atm_call());
        let mut put_input = atm_call();
        put_input.option_type = OptionType::Put;
        let put_price = calc.bs_price(put_input);

        let s = atm_call().spot_price;
        let k = atm_call().strike_price;
        let r = atm_call().risk_free_rate;
        let t = atm_call().time_to_expiry;
        let parity_rhs = s - k * (-r * t).exp();
        assert!((call_price - put_price - parity_rhs).abs() < 1e-6);
    }

    #[test]
    fn zero_or_negative_inputs_reject() {
        let calc = GreeksCalculator::new();
        let mut bad = atm_call();
        bad.spot_price = 0.0;
        assert_eq!(calc.calculate_greeks(bad).error, Some(GreeksError::NonPositivePrice));

        let mut bad = atm_call();
        bad.volatility = -0.1;
        assert_eq!(calc.calculate_greeks(bad).error, Some(GreeksError::NonPositiveVolatility));
    }

    #[test]
    fn implied_volatility_recovers_known_sigma() {
        let calc = GreeksCalculator::new();
        let input = atm_call();
        let price = calc.bs_price(input);

        let iv = calc.calculate_implied_volatility(
            price,
            input.spot_price,
            input.strike_price,
            input.time_to_expiry,
            input.risk_free_rate,
            input.option_type,
            100,
            0.01,
        );

        assert!(iv.success);
        assert!((iv.implied_volatility - input.volatility).abs() < 0.01);
    }

    #[test]
    fn implied_volatility_rejects_below_intrinsic() {
        let calc = GreeksCalculator::new();
        let iv = calc.calculate_implied_volatility(0.01, 100.0, 80.0, 0.25, 0.03, OptionType::Call, 100, 0.01);
        assert!(!iv.success);
        assert_eq!(iv.error, Some(IvError::BelowIntrinsicValue));
    }

    #[test]
    fn expiry_boundary_delta_is_binary() {
        let calc = GreeksCalculator::new();
        let mut input = atm_call();
        input.time_to_expiry = 0.0;
        input.spot_price = 110.0;
        let result = calc.calculate_greeks(input);
        assert_eq!(result.delta, 1.0);
        assert_eq!(result.gamma, 0.0);
    }
}
