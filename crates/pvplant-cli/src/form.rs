//! TOML plant form and equipment resolution.
//!
//! The form is the command-line replacement for the interactive
//! configuration screen. Equipment is selected by source:
//!
//! ```toml
//! name = "medellin"
//! num_arrays = 2
//! racking = "open_rack"
//!
//! [location]
//! latitude = 6.25
//! longitude = -75.56
//! altitude = 1495
//!
//! [surface]
//! type = "grass"
//!
//! [inverter]
//! source = "database"
//! database = "CECInverter"
//! name = "ABB: PVI-3.0-OUTD-S-US [240V]"
//!
//! [module]
//! source = "pvsyst"
//! path = "CS6U-350M.PAN"
//!
//! [mount]
//! mode = "fixed"
//! tilt = "10, 15"
//! azimuth = "180, 180"
//!
//! [electrical]
//! modules_per_string = "10, 10"
//! strings_per_inverter = "1, 1"
//! num_inverter = 1
//! ```
//!
//! Relative vendor-file paths are resolved against the form's directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use pvplant_core::{
    AcModel, Bifacial, ElectricalInput, FormState, InverterSchema, InverterSource, Location,
    Losses, ModuleSchema, ModuleSource, MountInput, Racking, RawRecord,
};
use pvplant_io::pvfree::{PvfreeClient, PvfreeDatabase};
use pvplant_io::sam::{library_path, normalize_name, SamDatabase, SamLibrary};
use pvplant_io::{parse_ond, parse_pan};
use serde::Deserialize;
use tracing::info;

use crate::settings::Settings;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormFile {
    #[serde(default)]
    pub name: Option<String>,
    pub num_arrays: u32,
    #[serde(default)]
    pub racking: Option<Racking>,
    pub location: LocationInput,
    #[serde(default)]
    pub surface: SurfaceInput,
    pub inverter: InverterSelection,
    pub module: ModuleSelection,
    #[serde(default)]
    pub bifacial: Bifacial,
    pub mount: MountInput,
    pub electrical: ElectricalInput,
    #[serde(default)]
    pub losses: LossesInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationInput {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(default)]
    pub tz: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurfaceInput {
    pub albedo: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Loss percentages; omitted values come from the settings defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LossesInput {
    pub loss: Option<f64>,
    pub kpc: Option<f64>,
    pub kt: Option<f64>,
    pub kin: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum InverterSelection {
    /// A row of a SAM inverter library
    Database { database: String, name: String },
    /// A PVsyst `.OND` file
    Pvsyst { path: PathBuf },
    /// Parameters entered by hand for the chosen AC model
    Manual {
        ac_model: AcModel,
        parameters: RawRecord,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ModuleSelection {
    /// A row of a SAM module library
    Database { database: String, name: String },
    /// A pvfree record, `database` is `cecmodule` or `pvmodule`
    Pvfree { database: String, id: u64 },
    /// A PVsyst `.PAN` file
    Pvsyst { path: PathBuf },
    /// Canonical parameters entered by hand
    Manual { parameters: RawRecord },
}

impl FormFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading form {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing form {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve equipment selections and fill defaults.
    ///
    /// `base_dir` anchors relative vendor-file paths.
    pub fn into_form_state(self, settings: &Settings, base_dir: &Path) -> Result<FormState> {
        let inverter = resolve_inverter(&self.inverter, settings, base_dir)
            .context("resolving inverter")?;
        let module =
            resolve_module(&self.module, settings, base_dir).context("resolving module")?;

        let defaults = &settings.defaults;
        Ok(FormState {
            location: Location {
                latitude: self.location.latitude,
                longitude: self.location.longitude,
                altitude: self.location.altitude,
                tz: self.location.tz.unwrap_or_else(|| defaults.tz.clone()),
            },
            surface_albedo: self.surface.albedo,
            surface_type: self.surface.kind,
            inverter,
            module,
            bifacial: self.bifacial,
            num_arrays: self.num_arrays,
            mount: self.mount,
            racking: self.racking,
            electrical: self.electrical,
            losses: Losses {
                loss: self.losses.loss.unwrap_or(defaults.loss),
                kpc: self.losses.kpc.unwrap_or(defaults.kpc),
                kt: self.losses.kt.unwrap_or(defaults.kt),
                kin: self.losses.kin.unwrap_or(defaults.kin),
            },
            name: self.name,
        })
    }
}

pub fn parse_database(name: &str) -> Result<SamDatabase> {
    SamDatabase::from_name(name).ok_or_else(|| {
        anyhow!("unknown SAM library '{name}', expected CECMod, SandiaMod, CECInverter or SandiaInverter")
    })
}

pub fn open_library(settings: &Settings, database: SamDatabase) -> Result<SamLibrary> {
    let path = library_path(&settings.data.sam_dir, database);
    Ok(SamLibrary::load(&path, database, settings.data.sam_metadata_rows)?)
}

/// Record by exact normalized name, or by the name as printed by the manufacturer.
pub fn library_record<'a>(library: &'a SamLibrary, name: &str) -> Result<&'a RawRecord> {
    match library.get(name) {
        Ok(record) => Ok(record),
        Err(_) => Ok(library.get(&normalize_name(name.trim()))?),
    }
}

fn resolve_inverter(
    selection: &InverterSelection,
    settings: &Settings,
    base_dir: &Path,
) -> Result<InverterSource> {
    match selection {
        InverterSelection::Database { database, name } => {
            let database = parse_database(database)?;
            let schema = database
                .inverter_schema()
                .ok_or_else(|| anyhow!("{database} is a module library, not an inverter library"))?;
            let library = open_library(settings, database)?;
            let record = library_record(&library, name)?;
            info!(database = database.as_str(), inverter = %name, "Selected inverter");
            Ok(InverterSource::from_record(schema, record)?)
        }
        InverterSelection::Pvsyst { path } => {
            let path = base_dir.join(path);
            info!(path = %path.display(), "Loading inverter from OND file");
            parse_ond(&path).with_context(|| format!("reading OND file {}", path.display()))
        }
        InverterSelection::Manual {
            ac_model,
            parameters,
        } => {
            let schema = match ac_model {
                AcModel::Sandia => InverterSchema::ManualSandia,
                AcModel::Pvwatts => InverterSchema::ManualPvwatts,
            };
            Ok(InverterSource::from_record(schema, parameters)?)
        }
    }
}

fn resolve_module(
    selection: &ModuleSelection,
    settings: &Settings,
    base_dir: &Path,
) -> Result<ModuleSource> {
    match selection {
        ModuleSelection::Database { database, name } => {
            let database = parse_database(database)?;
            let Some(schema) = database.module_schema() else {
                bail!("{database} is an inverter library, not a module library");
            };
            let library = open_library(settings, database)?;
            let record = library_record(&library, name)?;
            info!(database = database.as_str(), module = %name, "Selected module");
            Ok(ModuleSource::from_record(schema, record)?)
        }
        ModuleSelection::Pvfree { database, id } => {
            let database = PvfreeDatabase::from_name(database).ok_or_else(|| {
                anyhow!("unknown pvfree database '{database}', expected cecmodule or pvmodule")
            })?;
            let client = PvfreeClient::new(
                &settings.lookup.pvfree_url,
                Duration::from_secs(settings.lookup.timeout_secs),
            );
            let record = client.fetch_module(database, *id)?;
            Ok(ModuleSource::from_record(database.schema(), &record)?)
        }
        ModuleSelection::Pvsyst { path } => {
            let path = base_dir.join(path);
            info!(path = %path.display(), "Loading module from PAN file");
            parse_pan(&path).with_context(|| format!("reading PAN file {}", path.display()))
        }
        ModuleSelection::Manual { parameters } => {
            Ok(ModuleSource::from_record(ModuleSchema::Manual, parameters)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvplant_core::{assemble, PlantError};

    const MANUAL_FORM: &str = r#"
        num_arrays = 1

        [location]
        latitude = 10.96
        longitude = -74.78
        altitude = 18

        [surface]
        albedo = 0.25

        [inverter]
        source = "manual"
        ac_model = "pvwatts"
        parameters = { Pdco = 5000, eta_inv_nom = 0.96 }

        [module]
        source = "manual"

        [module.parameters]
        T_NOCT = 45
        Technology = "Mono-c-Si"
        N_s = 60
        I_sc_ref = 9.2
        V_oc_ref = 38.5
        I_mp_ref = 8.7
        V_mp_ref = 31.4
        alpha_sc = 0.05
        beta_oc = -0.3
        gamma_r = -0.4
        STC = 273.2

        [mount]
        mode = "single_axis"
        axis_tilt = 0
        axis_azimuth = 180
        max_angle = 60

        [electrical]
        modules_per_string = 14
        strings_per_inverter = 1
        num_inverter = 2

        [losses]
        kt = 1.0
    "#;

    #[test]
    fn test_manual_form_resolves() {
        let form = FormFile::parse(MANUAL_FORM).unwrap();
        let state = form
            .into_form_state(&Settings::default(), Path::new("."))
            .unwrap();
        assert_eq!(state.location.tz, "America/Bogota");
        assert_eq!(state.losses.loss, 14.6);
        assert_eq!(state.losses.kt, 1.0);

        let config = assemble(&state).unwrap();
        assert!(config.with_tracker);
        assert_eq!(config.max_angle, Some(vec![60.0]));
        assert_eq!(config.modules_per_string, vec![14]);
        assert_eq!(config.ac_model, AcModel::Pvwatts);
        assert_eq!(config.surface_albedo, 0.25);
    }

    #[test]
    fn test_settings_defaults_fill_form() {
        let mut settings = Settings::default();
        settings.defaults.loss = 10.0;
        settings.defaults.tz = "UTC".into();
        let state = FormFile::parse(MANUAL_FORM)
            .unwrap()
            .into_form_state(&settings, Path::new("."))
            .unwrap();
        assert_eq!(state.losses.loss, 10.0);
        assert_eq!(state.location.tz, "UTC");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let form = format!("bogus = 1\n{MANUAL_FORM}");
        assert!(FormFile::parse(&form).is_err());
    }

    #[test]
    fn test_missing_manual_parameter() {
        let form = MANUAL_FORM.replace("parameters = { Pdco = 5000, eta_inv_nom = 0.96 }", "parameters = { Pdco = 5000 }");
        let err = FormFile::parse(&form)
            .unwrap()
            .into_form_state(&Settings::default(), Path::new("."))
            .unwrap_err();
        let root = err.downcast_ref::<PlantError>();
        assert!(matches!(root, Some(PlantError::Configuration(_))));
    }

    #[test]
    fn test_library_kind_mismatch() {
        let form = MANUAL_FORM.replace(
            "source = \"manual\"\n        ac_model = \"pvwatts\"\n        parameters = { Pdco = 5000, eta_inv_nom = 0.96 }",
            "source = \"database\"\n        database = \"CECMod\"\n        name = \"x\"",
        );
        let err = FormFile::parse(&form)
            .unwrap()
            .into_form_state(&Settings::default(), Path::new("."))
            .unwrap_err();
        assert!(format!("{err:#}").contains("not an inverter library"));
    }

    #[test]
    fn test_database_names() {
        assert_eq!(parse_database("CECInverter").unwrap(), SamDatabase::CecInverters);
        assert!(parse_database("inverters").is_err());
    }
}
