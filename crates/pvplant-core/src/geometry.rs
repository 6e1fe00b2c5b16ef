//! Per-subarray geometry and electrical layout.
//!
//! Each subarray-dependent quantity is entered either as a single number
//! (one subarray) or as comma-delimited text with one element per subarray,
//! e.g. `"20, 25, 30"`. The lists are validated against the declared
//! subarray count before anything else uses them.

use serde::{Deserialize, Serialize};

use crate::error::{PlantError, PlantResult};
use crate::record::whole_count;

/// A per-subarray value as entered on the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Scalar(f64),
    Delimited(String),
}

impl ListInput {
    /// Expand into exactly `count` numbers.
    pub fn resolve(&self, count: u32, field: &str) -> PlantResult<Vec<f64>> {
        check_subarray_count(count)?;
        match self {
            ListInput::Scalar(value) => {
                if count != 1 {
                    return Err(PlantError::Configuration(format!(
                        "{field}: a single value only describes 1 subarray, got {count}; \
                         enter {count} comma-separated values"
                    )));
                }
                if !value.is_finite() {
                    return Err(PlantError::Configuration(format!(
                        "{field}: value is not finite"
                    )));
                }
                Ok(vec![*value])
            }
            ListInput::Delimited(text) => parse_delimited(text, count, field),
        }
    }

    /// Expand into exactly `count` whole numbers.
    pub fn resolve_counts(&self, count: u32, field: &str) -> PlantResult<Vec<u32>> {
        self.resolve(count, field)?
            .into_iter()
            .map(|value| {
                whole_count(value).ok_or_else(|| {
                    PlantError::Configuration(format!(
                        "{field}: expected a whole non-negative number, got {value}"
                    ))
                })
            })
            .collect()
    }
}

impl From<f64> for ListInput {
    fn from(value: f64) -> Self {
        ListInput::Scalar(value)
    }
}

impl From<&str> for ListInput {
    fn from(text: &str) -> Self {
        ListInput::Delimited(text.to_string())
    }
}

/// Parse comma-delimited numbers and check there are exactly `expected` of them.
pub fn parse_delimited(text: &str, expected: u32, field: &str) -> PlantResult<Vec<f64>> {
    let values = text
        .split(',')
        .enumerate()
        .map(|(idx, element)| {
            let element = element.trim();
            if element.is_empty() {
                return Err(PlantError::Configuration(format!(
                    "{field}: element {} is empty in '{text}'",
                    idx + 1
                )));
            }
            match element.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(PlantError::Configuration(format!(
                    "{field}: '{element}' is not a number"
                ))),
            }
        })
        .collect::<PlantResult<Vec<f64>>>()?;

    if values.len() != expected as usize {
        return Err(PlantError::Configuration(format!(
            "{field}: expected {expected} values for {expected} subarrays, got {}",
            values.len()
        )));
    }
    Ok(values)
}

fn check_subarray_count(count: u32) -> PlantResult<()> {
    if count == 0 {
        return Err(PlantError::Configuration(
            "number of subarrays must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Racking arrangement, which fixes the module construction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Racking {
    OpenRack,
    CloseMount,
    InsulatedBack,
}

impl Racking {
    pub const ALL: &'static [Racking] =
        &[Racking::OpenRack, Racking::CloseMount, Racking::InsulatedBack];

    pub fn as_str(&self) -> &'static str {
        match self {
            Racking::OpenRack => "open_rack",
            Racking::CloseMount => "close_mount",
            Racking::InsulatedBack => "insulated_back",
        }
    }

    pub fn module_type(&self) -> ModuleType {
        match self {
            Racking::OpenRack | Racking::CloseMount => ModuleType::GlassGlass,
            Racking::InsulatedBack => ModuleType::GlassPolymer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    GlassGlass,
    GlassPolymer,
}

/// Mount description as entered on the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MountInput {
    Fixed {
        tilt: ListInput,
        azimuth: ListInput,
    },
    SingleAxis {
        axis_tilt: ListInput,
        axis_azimuth: ListInput,
        max_angle: ListInput,
    },
}

/// Resolved per-subarray mount geometry. Exactly one mode is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountGeometry {
    pub with_tracker: bool,
    pub surface_tilt: Option<Vec<f64>>,
    pub surface_azimuth: Option<Vec<f64>>,
    pub axis_tilt: Option<Vec<f64>>,
    pub axis_azimuth: Option<Vec<f64>>,
    pub max_angle: Option<Vec<f64>>,
}

impl MountGeometry {
    pub fn assemble(input: &MountInput, num_arrays: u32) -> PlantResult<Self> {
        Ok(match input {
            MountInput::Fixed { tilt, azimuth } => MountGeometry {
                with_tracker: false,
                surface_tilt: Some(tilt.resolve(num_arrays, "surface_tilt")?),
                surface_azimuth: Some(azimuth.resolve(num_arrays, "surface_azimuth")?),
                axis_tilt: None,
                axis_azimuth: None,
                max_angle: None,
            },
            MountInput::SingleAxis {
                axis_tilt,
                axis_azimuth,
                max_angle,
            } => MountGeometry {
                with_tracker: true,
                surface_tilt: None,
                surface_azimuth: None,
                axis_tilt: Some(axis_tilt.resolve(num_arrays, "axis_tilt")?),
                axis_azimuth: Some(axis_azimuth.resolve(num_arrays, "axis_azimuth")?),
                max_angle: Some(max_angle.resolve(num_arrays, "max_angle")?),
            },
        })
    }
}

/// Electrical layout as entered on the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalInput {
    pub modules_per_string: ListInput,
    pub strings_per_inverter: ListInput,
    pub num_inverter: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalLayout {
    pub modules_per_string: Vec<u32>,
    pub strings_per_inverter: Vec<u32>,
    pub num_inverter: u32,
}

impl ElectricalLayout {
    pub fn assemble(input: &ElectricalInput, num_arrays: u32) -> PlantResult<Self> {
        if input.num_inverter == 0 {
            return Err(PlantError::Configuration(
                "num_inverter must be at least 1".into(),
            ));
        }
        Ok(ElectricalLayout {
            modules_per_string: input
                .modules_per_string
                .resolve_counts(num_arrays, "modules_per_string")?,
            strings_per_inverter: input
                .strings_per_inverter
                .resolve_counts(num_arrays, "strings_per_inverter")?,
            num_inverter: input.num_inverter,
        })
    }

    /// Modules installed across all subarrays and inverters.
    pub fn total_modules(&self) -> u64 {
        let per_inverter: u64 = self
            .modules_per_string
            .iter()
            .zip(&self.strings_per_inverter)
            .map(|(m, s)| u64::from(*m) * u64::from(*s))
            .sum();
        per_inverter * u64::from(self.num_inverter)
    }
}
