//! Plant configuration record and its assembly from form state.
//!
//! [`assemble`] is the single entry point: it takes an immutable
//! [`FormState`], validates every section and returns the flat
//! [`PlantConfiguration`] consumed by the simulation tooling, or the first
//! validation error encountered.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlantError, PlantResult};
use crate::geometry::{
    ElectricalInput, ElectricalLayout, ModuleType, MountGeometry, MountInput, Racking,
};
use crate::inverter::{AcModel, InverterParameters, InverterSource};
use crate::module::{ModuleParameters, ModuleSource};
use crate::surface::resolve_albedo;

pub const DEFAULT_TIMEZONE: &str = "America/Bogota";

/// Stem of the configuration file name.
pub const CONFIG_FILE_STEM: &str = "system_config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level
    pub altitude: f64,
    #[serde(default = "default_timezone")]
    pub tz: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Location {
    fn validate(&self) -> PlantResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(PlantError::Configuration(format!(
                "latitude must be within [-90, 90], got {}",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(PlantError::Configuration(format!(
                "longitude must be within [-180, 180], got {}",
                self.longitude
            )));
        }
        if !self.altitude.is_finite() {
            return Err(PlantError::Configuration("altitude is not finite".into()));
        }
        if self.tz.trim().is_empty() {
            return Err(PlantError::Configuration("tz must not be empty".into()));
        }
        Ok(())
    }
}

/// Bifacial options. Dimensions are ignored unless `enabled`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bifacial {
    pub enabled: bool,
    pub bifaciality: f64,
    pub row_height: f64,
    pub row_width: f64,
}

impl Bifacial {
    /// `(bifaciality, row_height, row_width)` as written to the record.
    fn resolve(&self) -> PlantResult<(f64, f64, f64)> {
        if !self.enabled {
            return Ok((0.0, 0.0, 0.0));
        }
        if !(0.0..=1.0).contains(&self.bifaciality) {
            return Err(PlantError::Configuration(format!(
                "bifaciality must be within [0, 1], got {}",
                self.bifaciality
            )));
        }
        for (field, value) in [("row_height", self.row_height), ("row_width", self.row_width)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlantError::Configuration(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok((self.bifaciality, self.row_height, self.row_width))
    }
}

/// Loss percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Losses {
    /// System losses
    pub loss: f64,
    /// Transmission line losses up to the common coupling point
    pub kpc: f64,
    /// Transformer losses
    pub kt: f64,
    /// Inverter interconnection losses
    pub kin: f64,
}

impl Default for Losses {
    fn default() -> Self {
        Self {
            loss: 14.6,
            kpc: 0.0,
            kt: 0.0,
            kin: 0.0,
        }
    }
}

impl Losses {
    fn validate(&self) -> PlantResult<()> {
        for (field, value) in [
            ("loss", self.loss),
            ("kpc", self.kpc),
            ("kt", self.kt),
            ("kin", self.kin),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(PlantError::Configuration(format!(
                    "{field} must be a percentage within [0, 100], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything entered on the configuration form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub location: Location,
    pub surface_albedo: Option<f64>,
    pub surface_type: Option<String>,
    pub inverter: InverterSource,
    pub module: ModuleSource,
    pub bifacial: Bifacial,
    pub num_arrays: u32,
    pub mount: MountInput,
    pub racking: Option<Racking>,
    pub electrical: ElectricalInput,
    pub losses: Losses,
    pub name: Option<String>,
}

/// The persisted plant configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantConfiguration {
    pub latitude: f64,
    pub longitude: f64,
    pub tz: String,
    pub altitude: f64,
    pub surface_albedo: f64,
    pub inverter: InverterParameters,
    pub ac_model: AcModel,
    pub module: ModuleParameters,
    pub bifacial: bool,
    pub bifaciality: f64,
    pub row_height: f64,
    pub row_width: f64,
    pub with_tracker: bool,
    pub surface_azimuth: Option<Vec<f64>>,
    pub surface_tilt: Option<Vec<f64>>,
    pub axis_tilt: Option<Vec<f64>>,
    pub axis_azimuth: Option<Vec<f64>>,
    pub max_angle: Option<Vec<f64>>,
    pub module_type: Option<ModuleType>,
    pub racking_model: Option<Racking>,
    pub num_arrays: u32,
    pub modules_per_string: Vec<u32>,
    pub strings_per_inverter: Vec<u32>,
    pub num_inverter: u32,
    pub loss: f64,
    pub kpc: f64,
    pub kt: f64,
    pub kin: f64,
    pub name: String,
}

impl PlantConfiguration {
    /// File name this record is written under.
    pub fn file_name(&self) -> PlantResult<String> {
        config_file_name(&self.name)
    }

    /// Nameplate DC capacity: module STC power times installed modules.
    pub fn dc_capacity_watts(&self) -> f64 {
        let per_inverter: f64 = self
            .modules_per_string
            .iter()
            .zip(&self.strings_per_inverter)
            .map(|(m, s)| f64::from(*m) * f64::from(*s))
            .sum();
        per_inverter * f64::from(self.num_inverter) * self.module.stc.value()
    }
}

/// `system_config.json`, or `system_config_<name>.json` for a named plant.
pub fn config_file_name(name: &str) -> PlantResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(format!("{CONFIG_FILE_STEM}.json"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(PlantError::Configuration(format!(
            "plant name '{name}' cannot be used in a file name"
        )));
    }
    Ok(format!("{CONFIG_FILE_STEM}_{name}.json"))
}

/// Validate the form and build the configuration record.
pub fn assemble(form: &FormState) -> PlantResult<PlantConfiguration> {
    info!(num_arrays = form.num_arrays, "Assembling plant configuration");

    form.location.validate()?;
    let surface_albedo = resolve_albedo(form.surface_albedo, form.surface_type.as_deref())?;

    let inverter = form.inverter.normalize()?;
    let module = form.module.normalize()?;

    let (bifaciality, row_height, row_width) = form.bifacial.resolve()?;
    let mount = MountGeometry::assemble(&form.mount, form.num_arrays)?;
    let electrical = ElectricalLayout::assemble(&form.electrical, form.num_arrays)?;
    form.losses.validate()?;

    let name = form.name.as_deref().unwrap_or("").trim().to_string();
    config_file_name(&name)?;

    debug!(
        with_tracker = mount.with_tracker,
        total_modules = electrical.total_modules(),
        ac_model = inverter.ac_model().as_str(),
        "assembled plant geometry"
    );

    Ok(PlantConfiguration {
        latitude: form.location.latitude,
        longitude: form.location.longitude,
        tz: form.location.tz.clone(),
        altitude: form.location.altitude,
        surface_albedo,
        ac_model: inverter.ac_model(),
        inverter,
        module,
        bifacial: form.bifacial.enabled,
        bifaciality,
        row_height,
        row_width,
        with_tracker: mount.with_tracker,
        surface_azimuth: mount.surface_azimuth,
        surface_tilt: mount.surface_tilt,
        axis_tilt: mount.axis_tilt,
        axis_azimuth: mount.axis_azimuth,
        max_angle: mount.max_angle,
        module_type: form.racking.map(|r| r.module_type()),
        racking_model: form.racking,
        num_arrays: form.num_arrays,
        modules_per_string: electrical.modules_per_string,
        strings_per_inverter: electrical.strings_per_inverter,
        num_inverter: electrical.num_inverter,
        loss: form.losses.loss,
        kpc: form.losses.kpc,
        kt: form.losses.kt,
        kin: form.losses.kin,
        name,
    })
}
