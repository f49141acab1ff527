//! Builds a strike/expiry implied-volatility surface from market quotes and
//! answers bilinear-interpolated queries against it.

use std::collections::HashMap;

use chrono::Utc;
use ordered_float::OrderedFloat;

use crate::error::{Result, RuntimeError};
use crate::value_objects::{TermStructure, VolQueryResult, VolQuote, VolSmile, VolSurfaceSnapshot};

#[derive(Debug, Clone, Copy, Default)]
pub struct VolSurfaceBuilder;

impl VolSurfaceBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds a surface from quotes, dropping any with `implied_vol <= 0`.
    /// Needs at least two distinct strikes and two distinct expiries.
    pub fn build_surface(&self, quotes: &[VolQuote]) -> Result<VolSurfaceSnapshot> {
        let valid: Vec<&VolQuote> = quotes.iter().filter(|q| q.implied_vol > 0.0).collect();

        let mut strike_set: Vec<f64> = valid.iter().map(|q| q.strike).collect();
        strike_set.sort_by_key(|&s| OrderedFloat(s));
        strike_set.dedup_by_key(|s| OrderedFloat(*s));

        let mut expiry_set: Vec<f64> = valid.iter().map(|q| q.time_to_expiry).collect();
        expiry_set.sort_by_key(|&e| OrderedFloat(e));
        expiry_set.dedup_by_key(|e| OrderedFloat(*e));

        if strike_set.len() < 2 || expiry_set.len() < 2 {
            return Err(RuntimeError::VolSurface(format!(
                "not enough quotes to build a surface: {} strikes, {} expiries (need at least 2 each)",
                strike_set.len(),
                expiry_set.len()
            )));
        }

        let mut lookup: HashMap<(OrderedFloat<f64>, OrderedFloat<f64>), f64> = HashMap::new();
        for q in &valid {
            lookup.insert((OrderedFloat(q.time_to_expiry), OrderedFloat(q.strike)), q.implied_vol);
        }

        let vol_matrix: Vec<Vec<f64>> = expiry_set
            .iter()
            .map(|&exp| {
                strike_set
                    .iter()
                    .map(|&stk| lookup.get(&(OrderedFloat(exp), OrderedFloat(stk))).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        Ok(VolSurfaceSnapshot {
            strikes: strike_set,
            expiries: expiry_set,
            vol_matrix,
            timestamp: Utc::now(),
        })
    }

    /// Bilinear-interpolated implied vol lookup, clamped to the surface's
    /// strike/expiry range (with a small epsilon tolerance at the edges).
    pub fn query_vol(&self, snapshot: &VolSurfaceSnapshot, strike: f64, time_to_expiry: f64) -> VolQueryResult {
        let strikes = &snapshot.strikes;
        let expiries = &snapshot.expiries;

        if strikes.is_empty() || expiries.is_empty() {
            return VolQueryResult::err("surface is empty");
        }

        const EPS: f64 = 1e-9;
        if strike < strikes[0] - EPS || strike > *strikes.last().unwrap() + EPS {
            return VolQueryResult::err(format!(
                "strike {strike} out of range [{}, {}]",
                strikes[0],
                strikes.last().unwrap()
            ));
        }
        if time_to_expiry < expiries[0] - EPS || time_to_expiry > *expiries.last().unwrap() + EPS {
            return VolQueryResult::err(format!(
                "time_to_expiry {time_to_expiry} out of range [{}, {}]",
                expiries[0],
                expiries.last().unwrap()
            ));
        }

        let strike = strike.clamp(strikes[0], *strikes.last().unwrap());
        let time_to_expiry = time_to_expiry.clamp(expiries[0], *expiries.last().unwrap());

        let si = (bisect_right(strikes, strike) - 1).min(strikes.len().saturating_sub(2));
        let ei = (bisect_right(expiries, time_to_expiry) - 1).min(expiries.len().saturating_sub(2));

        let (s0, s1) = (strikes[si], strikes[si + 1]);
        let (e0, e1) = (expiries[ei], expiries[ei + 1]);

        let ts = if s1 == s0 { 0.0 } else { (strike - s0) / (s1 - s0) };
        let te = if e1 == e0 { 0.0 } else { (time_to_expiry - e0) / (e1 - e0) };

        let v00 = snapshot.vol_matrix[ei][si];
        let v01 = snapshot.vol_matrix[ei][si + 1];
        let v10 = snapshot.vol_matrix[ei + 1][si];
        let v11 = snapshot.vol_matrix[ei + 1][si + 1];

        let vol = v00 * (1.0 - ts) * (1.0 - te) + v01 * ts * (1.0 - te) + v10 * (1.0 - ts) * te + v11 * ts * te;

        VolQueryResult::ok(vol)
    }

    pub fn extract_smile(&self, snapshot: &VolSurfaceSnapshot, time_to_expiry: f64) -> VolSmile {
        let vols = snapshot
            .strikes
            .iter()
            .map(|&strike| {
                let result = self.query_vol(snapshot, strike, time_to_expiry);
                if result.success { result.implied_vol } else { 0.0 }
            })
            .collect();

        VolSmile { time_to_expiry, strikes: snapshot.strikes.clone(), vols }
    }

    pub fn extract_term_structure(&self, snapshot: &VolSurfaceSnapshot, strike: f64) -> TermStructure {
        let vols = snapshot
            .expiries
            .iter()
            .map(|&expiry| {
                let result = self.query_vol(snapshot, strike, expiry);
                if result.success { result.implied_vol } else { 0.0 }
            })
            .collect();

        TermStructure { strike, expiries: snapshot.expiries.clone(), vols }
    }
}

/// Index of the first element strictly greater than `target`, matching
/// Python's `bisect.bisect_right` on a sorted slice.
fn bisect_right(sorted: &[f64], target: f64) -> usize {
    sorted.partition_point(|&x| x <= target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quotes() -> Vec<VolQuote> {
        vec![
            VolQuote { strike: 3800.0, time_to_expiry: 0.1, implied_vol: 0.22 },
            VolQuote { strike: 4000.0, time_to_expiry: 0.1, implied_vol: 0.20 },
            VolQuote { strike: 3800.0, time_to_expiry: 0.3, implied_vol: 0.24 },
            VolQuote { strike: 4000.0, time_to_expiry: 0.3, implied_vol: 0.21 },
        ]
    }

    #[test]
    fn build_surface_rejects_sparse_quotes() {
        let builder = VolSurfaceBuilder::new();
        let quotes = vec![VolQuote { strike: 4000.0, time_to_expiry: 0.1, implied_vol: 0.2 }];
        assert!(builder.build_surface(&quotes).is_err());
    }

    #[test]
    fn query_interpolates_center_of_grid() {
        let builder = VolSurfaceBuilder::new();
        let surface = builder.build_surface(&sample_quotes()).unwrap();
        let result = builder.query_vol(&surface, 3900.0, 0.2);
        assert!(result.success);
        assert!((result.implied_vol - 0.2175).abs() < 1e-9);
    }

    #[test]
    fn query_out_of_range_fails() {
        let builder = VolSurfaceBuilder::new();
        let surface = builder.build_surface(&sample_quotes()).unwrap();
        let result = builder.query_vol(&surface, 5000.0, 0.2);
        assert!(!result.success);
    }

    #[test]
    fn smile_and_term_structure_have_matching_lengths() {
        let builder = VolSurfaceBuilder::new();
        let surface = builder.build_surface(&sample_quotes()).unwrap();
        let smile = builder.extract_smile(&surface, 0.2);
        assert_eq!(smile.vols.len(), surface.strikes.len());
        let term = builder.extract_term_structure(&surface, 3900.0);
        assert_eq!(term.vols.len(), surface.expiries.len());
    }
}
