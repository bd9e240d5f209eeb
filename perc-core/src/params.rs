//! Sweep parameters and their validation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PercolationError, Result};
use crate::lattice::check_probability;

/// Slack applied when deciding whether the last step still lands on `p_max`.
const STEP_TOLERANCE: f64 = 1e-9;

/// Most swept p values a single sweep may have.
pub const MAX_SWEEP_POINTS: usize = 1_000_000;

/// Parameters of a Monte Carlo sweep over the occupation probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    /// Lattice side L.
    pub l: usize,
    /// Trials per swept p.
    pub trials: usize,
    pub p_min: f64,
    pub p_max: f64,
    pub dp: f64,
}

impl SweepParams {
    /// Build from a `{L, T, p0, pk, dp}` mapping, as produced by a parameter file loader.
    pub fn from_mapping(map: &HashMap<String, f64>) -> Result<SweepParams> {
        let params = SweepParams {
            l: positive_integer(map, "L")?,
            trials: positive_integer(map, "T")?,
            p_min: required(map, "p0")?,
            p_max: required(map, "pk")?,
            dp: required(map, "dp")?,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.l == 0 {
            return Err(PercolationError::invalid("L", 0.0));
        }
        if self.trials == 0 {
            return Err(PercolationError::invalid("T", 0.0));
        }
        // also rejects NaN
        if !(self.dp > 0.0) || !self.dp.is_finite() {
            return Err(PercolationError::invalid("dp", self.dp));
        }
        check_probability("p0", self.p_min)?;
        check_probability("pk", self.p_max)?;
        if self.p_min > self.p_max {
            return Err(PercolationError::invalid("p0", self.p_min));
        }
        if self.steps() >= MAX_SWEEP_POINTS as f64 {
            return Err(PercolationError::invalid("dp", self.dp));
        }
        Ok(())
    }

    /// Whole `dp` steps between `p_min` and `p_max`, kept in floating point.
    fn steps(&self) -> f64 {
        ((self.p_max - self.p_min) / self.dp + STEP_TOLERANCE).floor()
    }

    /// Number of swept values: `p_min, p_min + dp, ...` up to and including `p_max`.
    /// Never exceeds [`MAX_SWEEP_POINTS`], even for parameters that fail validation.
    pub fn point_count(&self) -> usize {
        let steps = self.steps().clamp(0.0, (MAX_SWEEP_POINTS - 1) as f64) as usize;
        steps.checked_add(1).unwrap_or(MAX_SWEEP_POINTS)
    }

    /// The swept p value at `index`, clamped so rounding never steps past `p_max`.
    pub fn p_at(&self, index: usize) -> f64 {
        (self.p_min + index as f64 * self.dp).min(self.p_max)
    }

    pub fn p_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.point_count()).map(|i| self.p_at(i))
    }
}

fn required(map: &HashMap<String, f64>, key: &'static str) -> Result<f64> {
    map.get(key)
        .copied()
        .ok_or(PercolationError::invalid(key, f64::NAN))
}

fn positive_integer(map: &HashMap<String, f64>, key: &'static str) -> Result<usize> {
    let v = required(map, key)?;
    if v.is_finite() && v >= 1.0 && v.fract() == 0.0 && v <= usize::MAX as f64 {
        Ok(v as usize)
    } else {
        Err(PercolationError::invalid(key, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn base() -> SweepParams {
        SweepParams { l: 10, trials: 5, p_min: 0.0, p_max: 1.0, dp: 0.1 }
    }

    #[test]
    fn test_from_mapping() {
        let p = SweepParams::from_mapping(&mapping(&[
            ("L", 50.0),
            ("T", 100.0),
            ("p0", 0.2),
            ("pk", 0.8),
            ("dp", 0.05),
        ]))
        .unwrap();
        assert_eq!(p.l, 50);
        assert_eq!(p.trials, 100);
        assert_eq!(p.point_count(), 13);
    }

    #[test]
    fn test_from_mapping_rejects_negative_and_fractional_sizes() {
        let mut m = mapping(&[("L", -1.0), ("T", 10.0), ("p0", 0.1), ("pk", 0.2), ("dp", 0.1)]);
        assert_eq!(
            SweepParams::from_mapping(&m),
            Err(PercolationError::InvalidParameter { field: "L", value: -1.0 })
        );
        m.insert("L".into(), 2.5);
        assert!(matches!(
            SweepParams::from_mapping(&m),
            Err(PercolationError::InvalidParameter { field: "L", .. })
        ));
        m.insert("L".into(), 4.0);
        m.insert("T".into(), 0.0);
        assert!(matches!(
            SweepParams::from_mapping(&m),
            Err(PercolationError::InvalidParameter { field: "T", .. })
        ));
    }

    #[test]
    fn test_from_mapping_missing_key() {
        let m = mapping(&[("L", 4.0), ("T", 10.0), ("p0", 0.1), ("pk", 0.2)]);
        assert!(matches!(
            SweepParams::from_mapping(&m),
            Err(PercolationError::InvalidParameter { field: "dp", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_each_bad_field() {
        let cases = [
            (SweepParams { l: 0, ..base() }, "L"),
            (SweepParams { trials: 0, ..base() }, "T"),
            (SweepParams { dp: 0.0, ..base() }, "dp"),
            (SweepParams { dp: -0.1, ..base() }, "dp"),
            (SweepParams { dp: f64::NAN, ..base() }, "dp"),
            (SweepParams { p_min: -0.1, ..base() }, "p0"),
            (SweepParams { p_max: 1.2, ..base() }, "pk"),
            (SweepParams { p_min: 0.6, p_max: 0.4, ..base() }, "p0"),
        ];
        for (params, field) in cases {
            match params.validate() {
                Err(PercolationError::InvalidParameter { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected InvalidParameter({field}), got {other:?}"),
            }
        }
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_sweep_includes_upper_bound_despite_rounding() {
        // 0.1 steps do not sum exactly to 1.0 in binary floating point
        let p = base();
        assert_eq!(p.point_count(), 11);
        let last = p.p_values().last().unwrap();
        assert!((last - 1.0).abs() < 1e-12);
        assert!(p.p_values().all(|v| v <= 1.0));
    }

    #[test]
    fn test_single_point_sweep() {
        let p = SweepParams { p_min: 0.5, p_max: 0.5, dp: 0.1, ..base() };
        assert_eq!(p.p_values().collect::<Vec<_>>(), vec![0.5]);
        let wide = SweepParams { p_min: 0.2, p_max: 0.3, dp: 0.5, ..base() };
        assert_eq!(wide.point_count(), 1);
    }

    #[test]
    fn test_tiny_step_is_rejected() {
        let p = SweepParams { l: 4, trials: 1, p_min: 0.0, p_max: 1.0, dp: 1e-300 };
        assert!(matches!(
            p.validate(),
            Err(PercolationError::InvalidParameter { field: "dp", .. })
        ));
        assert_eq!(p.point_count(), MAX_SWEEP_POINTS);

        let at_limit = SweepParams { dp: 1.0 / MAX_SWEEP_POINTS as f64, ..p.clone() };
        assert!(at_limit.validate().is_err());
        let below_limit = SweepParams { dp: 1e-5, ..p };
        assert!(below_limit.validate().is_ok());
        assert_eq!(below_limit.point_count(), 100_001);
    }

    #[test]
    fn test_step_not_dividing_range_stops_below_max() {
        let p = SweepParams { p_min: 0.0, p_max: 0.25, dp: 0.1, ..base() };
        let values: Vec<f64> = p.p_values().collect();
        assert_eq!(values.len(), 3);
        assert!((values[2] - 0.2).abs() < 1e-12);
    }
}
