//! Net effective capacity (CEN) of a plant from its AC power series.
//!
//! The AC samples are sorted into a duration curve; the CEN is the power
//! reached at a given percentile of that curve, reported next to the peak.
//!
//! ```
//! use pvplant_core::capacity::{net_effective_capacity, PowerUnit};
//!
//! let report = net_effective_capacity(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0, 6, PowerUnit::Megawatts)?;
//! assert_eq!(report.max, 5e-6);
//! assert_eq!(report.cen, 3e-6);
//! # Ok::<(), pvplant_core::PlantError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlantError, PlantResult};
use crate::units::round_to;

/// Unit the statistic is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerUnit {
    #[serde(rename = "kW")]
    Kilowatts,
    #[default]
    #[serde(rename = "MW")]
    Megawatts,
}

impl PowerUnit {
    /// Watts per unit.
    pub fn factor(&self) -> f64 {
        match self {
            PowerUnit::Kilowatts => 1e3,
            PowerUnit::Megawatts => 1e6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUnit::Kilowatts => "kW",
            PowerUnit::Megawatts => "MW",
        }
    }
}

impl std::fmt::Display for PowerUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point of the duration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationPoint {
    pub power_w: f64,
    /// Fraction of samples at or below `power_w`, in [0, 1]
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenReport {
    pub max: f64,
    pub cen: f64,
    pub perc: f64,
    pub unit: PowerUnit,
    pub samples: usize,
}

fn sorted_samples(samples: &[f64]) -> PlantResult<Vec<f64>> {
    if samples.len() < 2 {
        return Err(PlantError::InvalidSample(format!(
            "need at least 2 AC power samples, got {}",
            samples.len()
        )));
    }
    if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
        return Err(PlantError::InvalidSample(format!(
            "sample {idx} is not finite ({})",
            samples[idx]
        )));
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Ascending duration curve; rank `i` of `n` has probability `i / (n - 1)`.
pub fn duration_curve(samples: &[f64]) -> PlantResult<Vec<DurationPoint>> {
    let sorted = sorted_samples(samples)?;
    let last = (sorted.len() - 1) as f64;
    Ok(sorted
        .into_iter()
        .enumerate()
        .map(|(i, power_w)| DurationPoint {
            power_w,
            probability: i as f64 / last,
        })
        .collect())
}

/// Linear interpolation between closest ranks of an ascending slice.
fn percentile_of_sorted(sorted: &[f64], perc: f64) -> f64 {
    let rank = perc / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Peak and `perc`-th percentile of the AC power samples [W].
pub fn net_effective_capacity(
    samples: &[f64],
    perc: f64,
    decimals: u32,
    unit: PowerUnit,
) -> PlantResult<CenReport> {
    if !(0.0..=100.0).contains(&perc) {
        return Err(PlantError::Configuration(format!(
            "percentile must be within [0, 100], got {perc}"
        )));
    }
    let sorted = sorted_samples(samples)?;
    let peak = sorted[sorted.len() - 1];
    let at_percentile = percentile_of_sorted(&sorted, perc);
    debug!(
        samples = sorted.len(),
        peak_w = peak,
        percentile_w = at_percentile,
        "computed duration curve statistic"
    );

    Ok(CenReport {
        max: round_to(peak / unit.factor(), decimals),
        cen: round_to(at_percentile / unit.factor(), decimals),
        perc,
        unit,
        samples: sorted.len(),
    })
}
