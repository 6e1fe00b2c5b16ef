use std::path::Path;

use anyhow::{Context, Result};
use pvplant_core::{duration_curve, net_effective_capacity, PowerUnit};
use pvplant_io::{read_ac_series, write_duration_curve};
use tracing::info;

pub fn handle(
    input: &Path,
    column: &str,
    perc: f64,
    decimals: u32,
    unit: PowerUnit,
    curve: Option<&Path>,
) -> Result<()> {
    info!("Computing CEN from {}", input.display());
    let samples = read_ac_series(input, column)
        .with_context(|| format!("reading AC series from {}", input.display()))?;
    let report = net_effective_capacity(&samples, perc, decimals, unit)?;

    println!("Pac Max. = {} {}", report.max, report.unit);
    println!("CEN ({} %) = {} {}", report.perc, report.cen, report.unit);

    if let Some(path) = curve {
        write_duration_curve(path, &duration_curve(&samples)?)
            .with_context(|| format!("writing duration curve to {}", path.display()))?;
        info!("Duration curve written to {}", path.display());
    }
    Ok(())
}
