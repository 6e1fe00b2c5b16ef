//! PVsyst `.PAN` (module) and `.OND` (inverter) export parsers.
//!
//! Both formats are indented `Key=Value` lines arranged in named blocks:
//!
//! ```text
//! PVObject_=pvGInverter
//!   PVObject_Commercial=pvCommercial
//!     Model=SC 2500-EV
//!   End of PVObject pvCommercial
//!   Converter=TConverter
//!     PNomConv=2500.000
//!     PNomDC=2550.000
//!     EfficEuro=98.40
//!   End of TConverter
//! End of PVObject pvGInverter
//! ```
//!
//! A `Key=Name` line opens a block when a matching `End of Name` or
//! `End of PVObject Name` line exists. The tree is flattened: every key is
//! reachable by its bare name (first occurrence wins) and as `Block.Key`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use pvplant_core::{
    InverterSchema, InverterSource, ModuleSchema, ModuleSource, PlantError, PlantResult,
    RawRecord,
};
use serde_json::{Number, Value};
use tracing::debug;

/// Flatten the contents of a PVsyst export into a key-value record.
pub fn parse_pvsyst_string(content: &str) -> PlantResult<RawRecord> {
    let block_names: HashSet<&str> = content
        .lines()
        .filter_map(|line| block_end(line.trim()))
        .collect();

    let mut record = RawRecord::new();
    let mut stack: Vec<&str> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = block_end(line) {
            if let Some(pos) = stack.iter().rposition(|open| *open == name) {
                stack.truncate(pos);
            }
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            continue;
        }
        if block_names.contains(value) {
            stack.push(value);
            continue;
        }

        let value = field_value(value);
        if let Some(parent) = stack.last() {
            record
                .entry(format!("{parent}.{key}"))
                .or_insert_with(|| value.clone());
        }
        record.entry(key.to_string()).or_insert(value);
    }

    if record.is_empty() {
        return Err(PlantError::Lookup(
            "no Key=Value fields found in PVsyst file".into(),
        ));
    }
    Ok(record)
}

/// Module record from `.PAN` content.
pub fn parse_pan_string(content: &str) -> PlantResult<ModuleSource> {
    let record = parse_pvsyst_string(content)?;
    ModuleSource::from_record(ModuleSchema::Pan, &record)
}

/// Inverter record from `.OND` content; the model name comes from `pvCommercial`.
pub fn parse_ond_string(content: &str) -> PlantResult<InverterSource> {
    let mut record = parse_pvsyst_string(content)?;
    if let Some(model) = record.get("pvCommercial.Model").cloned() {
        record.insert("Model".to_string(), model);
    }
    InverterSource::from_record(InverterSchema::Ond, &record)
}

pub fn parse_pan(path: impl AsRef<Path>) -> PlantResult<ModuleSource> {
    let content = read_export(path.as_ref())?;
    parse_pan_string(&content)
}

pub fn parse_ond(path: impl AsRef<Path>) -> PlantResult<InverterSource> {
    let content = read_export(path.as_ref())?;
    parse_ond_string(&content)
}

fn read_export(path: &Path) -> PlantResult<String> {
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read PVsyst export");
    // Exports are often Windows-1252; only ASCII keys and numbers matter here.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn block_end(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("End of ")?;
    let name = rest.strip_prefix("PVObject ").unwrap_or(rest).trim();
    (!name.is_empty()).then_some(name)
}

fn field_value(raw: &str) -> Value {
    match raw.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => Value::String(raw.to_string()),
    }
}
