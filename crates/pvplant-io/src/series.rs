//! AC power series input and duration-curve output.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use pvplant_core::{DurationPoint, PlantError, PlantResult};
use tracing::debug;

pub const DEFAULT_AC_COLUMN: &str = "ac";

/// Read the `column` of a CSV file as AC power samples [W].
///
/// Blank cells are skipped; any other non-numeric cell is an error.
pub fn read_ac_series(path: impl AsRef<Path>, column: &str) -> PlantResult<Vec<f64>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let samples = parse_ac_series(file, column)?;
    debug!(path = %path.display(), column, samples = samples.len(), "read AC series");
    Ok(samples)
}

pub fn parse_ac_series<R: Read>(reader: R, column: &str) -> PlantResult<Vec<f64>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers().map_err(parse_error)?.clone();
    let idx = headers.iter().position(|h| h == column).ok_or_else(|| {
        PlantError::Configuration(format!(
            "column '{column}' not found; available: {}",
            headers.iter().collect::<Vec<_>>().join(", ")
        ))
    })?;

    let mut samples = Vec::new();
    for (line, row) in csv_reader.records().enumerate() {
        let row = row.map_err(parse_error)?;
        let cell = row.get(idx).unwrap_or("");
        if cell.is_empty() {
            continue;
        }
        let value = cell.parse::<f64>().map_err(|_| {
            PlantError::Parse(format!(
                "row {}: '{cell}' in column '{column}' is not a number",
                line + 2
            ))
        })?;
        samples.push(value);
    }
    Ok(samples)
}

/// Write the duration curve as `power_w,probability` rows.
pub fn write_duration_curve(path: impl AsRef<Path>, curve: &[DurationPoint]) -> PlantResult<()> {
    let file = File::create(path.as_ref())?;
    write_duration_curve_to(file, curve)
}

pub fn write_duration_curve_to<W: Write>(writer: W, curve: &[DurationPoint]) -> PlantResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in curve {
        wtr.serialize(point).map_err(parse_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn parse_error(err: csv::Error) -> PlantError {
    PlantError::Parse(format!("CSV: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvplant_core::duration_curve;
    use tempfile::tempdir;

    const SERIES: &str = "\
timestamp,ac,dc
2021-01-01 06:00,0.0,0.0
2021-01-01 07:00,1250.5,1300.0
2021-01-01 08:00,,
2021-01-01 09:00, 4000 ,4150.2
";

    #[test]
    fn test_reads_named_column_skipping_blanks() {
        let samples = parse_ac_series(SERIES.as_bytes(), "ac").unwrap();
        assert_eq!(samples, vec![0.0, 1250.5, 4000.0]);
        let dc = parse_ac_series(SERIES.as_bytes(), "dc").unwrap();
        assert_eq!(dc.len(), 3);
    }

    #[test]
    fn test_missing_column() {
        let err = parse_ac_series(SERIES.as_bytes(), "p_ac").unwrap_err();
        assert!(matches!(err, PlantError::Configuration(_)));
        assert!(err.to_string().contains("timestamp, ac, dc"));
    }

    #[test]
    fn test_non_numeric_cell() {
        let bad = "ac\n100\nn/a\n";
        let err = parse_ac_series(bad.as_bytes(), "ac").unwrap_err();
        assert!(matches!(err, PlantError::Parse(_)));
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_duration_curve_csv() {
        let curve = duration_curve(&[3.0, 1.0, 2.0]).unwrap();
        let mut out = Vec::new();
        write_duration_curve_to(&mut out, &curve).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "power_w,probability\n1.0,0.0\n2.0,0.5\n3.0,1.0\n");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ac.csv");
        std::fs::write(&input, SERIES).unwrap();
        let samples = read_ac_series(&input, DEFAULT_AC_COLUMN).unwrap();

        let output = dir.path().join("curve.csv");
        write_duration_curve(&output, &duration_curve(&samples).unwrap()).unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 4);
    }
}
