//! SAM equipment library reader.
//!
//! The System Advisor Model ships its module and inverter libraries as CSV
//! files: a header row with the field names, a fixed number of metadata rows
//! (units and SAM variable names), then one row per device with the device
//! name in the first column.
//!
//! ```text
//! Name,Vac,Pso,Paco,Pdco,Vdco,C0,C1,C2,C3,Pnt,...
//! Units,V,W,W,W,V,1/W,1/V,1/V,1/V,W,...
//! [0],inv_snl_ac_voltage,inv_snl_pso,inv_snl_paco,...
//! ABB: MICRO-0.25-I-OUTD-US-208 [208V],208,2.089,250,259.5,40.24,...
//! ```
//!
//! Device names are normalized the same way the simulation tooling indexes
//! them, so `ABB: MICRO-0.25-I-OUTD-US-208 [208V]` is looked up as
//! `ABB__MICRO_0_25_I_OUTD_US_208__208V_`.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use pvplant_core::{InverterSchema, ModuleSchema, PlantError, PlantResult, RawRecord};
use serde_json::{Number, Value};
use tracing::debug;

/// Metadata rows between the header and the first device in SAM exports.
pub const DEFAULT_METADATA_ROWS: usize = 2;

/// The four SAM equipment libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamDatabase {
    CecModules,
    SandiaModules,
    CecInverters,
    SandiaInverters,
}

impl SamDatabase {
    pub const ALL: &'static [SamDatabase] = &[
        SamDatabase::CecModules,
        SamDatabase::SandiaModules,
        SamDatabase::CecInverters,
        SamDatabase::SandiaInverters,
    ];

    /// Library name as used by the simulation tooling.
    pub fn as_str(&self) -> &'static str {
        match self {
            SamDatabase::CecModules => "CECMod",
            SamDatabase::SandiaModules => "SandiaMod",
            SamDatabase::CecInverters => "CECInverter",
            SamDatabase::SandiaInverters => "SandiaInverter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|db| db.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    pub fn is_inverter(&self) -> bool {
        matches!(self, SamDatabase::CecInverters | SamDatabase::SandiaInverters)
    }

    /// Separator between manufacturer and model in normalized names.
    pub fn manufacturer_separator(&self) -> &'static str {
        if self.is_inverter() {
            "__"
        } else {
            "_"
        }
    }

    pub fn inverter_schema(&self) -> Option<InverterSchema> {
        InverterSchema::from_database(self.as_str())
    }

    pub fn module_schema(&self) -> Option<ModuleSchema> {
        if self.is_inverter() {
            None
        } else {
            ModuleSchema::from_database(self.as_str())
        }
    }
}

impl std::fmt::Display for SamDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a device name: each of `` -.()[]:+/", `` becomes `_`.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            ' ' | '-' | '.' | '(' | ')' | '[' | ']' | ':' | '+' | '/' | '"' | ',' => '_',
            other => other,
        })
        .collect()
}

/// Normalize a field name: spaces become `_`.
pub fn normalize_column(raw: &str) -> String {
    raw.trim().replace(' ', "_")
}

/// An in-memory SAM equipment library.
#[derive(Debug, Clone)]
pub struct SamLibrary {
    database: SamDatabase,
    names: Vec<String>,
    records: HashMap<String, RawRecord>,
}

impl SamLibrary {
    /// Load `<dir>/<database>.csv`.
    pub fn open(dir: &Path, database: SamDatabase) -> PlantResult<Self> {
        Self::load(&library_path(dir, database), database, DEFAULT_METADATA_ROWS)
    }

    pub fn load(path: &Path, database: SamDatabase, metadata_rows: usize) -> PlantResult<Self> {
        let file = File::open(path).map_err(|e| {
            PlantError::Lookup(format!(
                "cannot open {} library at {}: {e}",
                database,
                path.display()
            ))
        })?;
        let library = Self::from_reader(file, database, metadata_rows)?;
        debug!(
            database = database.as_str(),
            path = %path.display(),
            devices = library.len(),
            "loaded SAM library"
        );
        Ok(library)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        database: SamDatabase,
        metadata_rows: usize,
    ) -> PlantResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| csv_error(database, e))?
            .iter()
            .map(normalize_column)
            .collect();
        if headers.is_empty() {
            return Err(PlantError::Parse(format!("{database} library has no header row")));
        }

        let mut names = Vec::new();
        let mut records = HashMap::new();
        for row in csv_reader.records().skip(metadata_rows) {
            let row = row.map_err(|e| csv_error(database, e))?;
            let Some(raw_name) = row.get(0) else {
                continue;
            };
            if raw_name.trim().is_empty() {
                continue;
            }
            let name = normalize_name(raw_name.trim());
            if records.contains_key(&name) {
                continue;
            }

            let mut record = RawRecord::new();
            record.insert(headers[0].clone(), Value::String(raw_name.trim().to_string()));
            for (column, cell) in headers.iter().zip(row.iter()).skip(1) {
                record.insert(column.clone(), cell_value(cell));
            }
            names.push(name.clone());
            records.insert(name, record);
        }

        Ok(Self {
            database,
            names,
            records,
        })
    }

    pub fn database(&self) -> SamDatabase {
        self.database
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Normalized device names in file order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Raw record of a device by its normalized name.
    pub fn get(&self, name: &str) -> PlantResult<&RawRecord> {
        self.records.get(name).ok_or_else(|| {
            PlantError::Lookup(format!("'{name}' not found in the {} library", self.database))
        })
    }

    /// Distinct manufacturers, sorted.
    pub fn manufacturers(&self) -> Vec<String> {
        let separator = self.database.manufacturer_separator();
        self.names
            .iter()
            .map(|name| match name.find(separator) {
                Some(idx) => name[..idx].to_string(),
                None => name.clone(),
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Device names containing `pattern`, in file order.
    pub fn search(&self, pattern: &str) -> Vec<&str> {
        self.names
            .iter()
            .filter(|name| name.contains(pattern))
            .map(String::as_str)
            .collect()
    }
}

pub fn library_path(dir: &Path, database: SamDatabase) -> PathBuf {
    dir.join(database.file_name())
}

fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    match cell.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => Value::String(cell.to_string()),
    }
}

fn csv_error(database: SamDatabase, err: csv::Error) -> PlantError {
    PlantError::Parse(format!("{database} library: {err}"))
}
