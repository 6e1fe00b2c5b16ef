//! Inverter parameter sets and their normalization.
//!
//! Two AC-conversion models are supported downstream:
//!
//! - **sandia**: the empirical Sandia inverter model, nine named coefficients
//!   (`Paco`, `Pdco`, `Vdco`, `Pso`, `C0`..`C3`, `Pnt`)
//! - **pvwatts**: the nameplate-efficiency model (`Pdco`, `eta_inv_nom`)
//!
//! Every source schema maps onto exactly one of them, and the normalized
//! output always carries the [`AcModel`] tag.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlantError, PlantResult};
use crate::record::{self, RawRecord};
use crate::units::{Kilowatts, Volts, Watts};

/// AC-conversion model applied to the inverter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcModel {
    Sandia,
    Pvwatts,
}

impl AcModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcModel::Sandia => "sandia",
            AcModel::Pvwatts => "pvwatts",
        }
    }
}

/// Sandia inverter model coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandiaCoefficients {
    /// Maximum AC output power
    #[serde(rename = "Paco")]
    pub paco: Watts,
    /// DC power at which `Paco` is reached
    #[serde(rename = "Pdco")]
    pub pdco: Watts,
    /// DC voltage at which `Paco` is reached
    #[serde(rename = "Vdco")]
    pub vdco: Volts,
    /// DC power required to start the inversion process
    #[serde(rename = "Pso")]
    pub pso: Watts,
    /// Curvature of the AC/DC power relation at reference voltage [1/W]
    #[serde(rename = "C0")]
    pub c0: f64,
    /// Variation of `Pdco` with DC voltage [1/V]
    #[serde(rename = "C1")]
    pub c1: f64,
    /// Variation of `Pso` with DC voltage [1/V]
    #[serde(rename = "C2")]
    pub c2: f64,
    /// Variation of `C0` with DC voltage [1/V]
    #[serde(rename = "C3")]
    pub c3: f64,
    /// AC power consumed at night
    #[serde(rename = "Pnt")]
    pub pnt: Watts,
}

impl SandiaCoefficients {
    /// Extract the nine coefficients from a database row; extra columns are ignored.
    pub fn from_record(record: &RawRecord, schema: &str) -> PlantResult<Self> {
        Ok(Self {
            paco: Watts(record::number(record, schema, "Paco")?),
            pdco: Watts(record::number(record, schema, "Pdco")?),
            vdco: Volts(record::number(record, schema, "Vdco")?),
            pso: Watts(record::number(record, schema, "Pso")?),
            c0: record::number(record, schema, "C0")?,
            c1: record::number(record, schema, "C1")?,
            c2: record::number(record, schema, "C2")?,
            c3: record::number(record, schema, "C3")?,
            pnt: Watts(record::number(record, schema, "Pnt")?),
        })
    }
}

/// PVWatts nameplate-efficiency parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvwattsParameters {
    /// Nominal DC input power
    #[serde(rename = "Pdco")]
    pub pdco: Watts,
    /// Nominal efficiency as a fraction
    pub eta_inv_nom: f64,
}

/// PVsyst `.OND` converter data relevant to the AC model.
#[derive(Debug, Clone, PartialEq)]
pub struct OndInverter {
    pub model: String,
    /// Nominal AC power (`PNomConv`)
    pub pnom_conv: Kilowatts,
    /// Nominal DC power (`PNomDC`)
    pub pnom_dc: Kilowatts,
    /// European weighted efficiency in percent (`EfficEuro`)
    pub effic_euro: f64,
}

impl OndInverter {
    pub fn from_record(record: &RawRecord) -> PlantResult<Self> {
        let schema = InverterSchema::Ond.as_str();
        Ok(Self {
            model: record::text(record, schema, "Model").unwrap_or_default(),
            pnom_conv: Kilowatts(record::number(record, schema, "PNomConv")?),
            pnom_dc: Kilowatts(record::conversion_input(record, schema, "PNomDC")?),
            effic_euro: record::conversion_input(record, schema, "EfficEuro")?,
        })
    }
}

/// Normalized inverter parameters, serialized as the bare parameter object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InverterParameters {
    Sandia(SandiaCoefficients),
    Pvwatts(PvwattsParameters),
}

impl InverterParameters {
    pub fn ac_model(&self) -> AcModel {
        match self {
            InverterParameters::Sandia(_) => AcModel::Sandia,
            InverterParameters::Pvwatts(_) => AcModel::Pvwatts,
        }
    }

    /// Nominal DC input power, common to both models.
    pub fn pdco(&self) -> Watts {
        match self {
            InverterParameters::Sandia(p) => p.pdco,
            InverterParameters::Pvwatts(p) => p.pdco,
        }
    }
}

/// Schema tag of a raw inverter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InverterSchema {
    /// SAM `CECInverter` database row
    CecInverter,
    /// SAM `SandiaInverter` database row
    SandiaInverter,
    /// PVsyst `.OND` export
    Ond,
    /// Hand-entered Sandia coefficients
    ManualSandia,
    /// Hand-entered PVWatts parameters
    ManualPvwatts,
}

impl InverterSchema {
    pub const ALL: &'static [InverterSchema] = &[
        InverterSchema::CecInverter,
        InverterSchema::SandiaInverter,
        InverterSchema::Ond,
        InverterSchema::ManualSandia,
        InverterSchema::ManualPvwatts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InverterSchema::CecInverter => "cec_inverter",
            InverterSchema::SandiaInverter => "sandia_inverter",
            InverterSchema::Ond => "ond",
            InverterSchema::ManualSandia => "manual_sandia",
            InverterSchema::ManualPvwatts => "manual_pvwatts",
        }
    }

    /// Schema of a SAM inverter database, by its library name.
    pub fn from_database(name: &str) -> Option<Self> {
        match name {
            "CECInverter" => Some(InverterSchema::CecInverter),
            "SandiaInverter" => Some(InverterSchema::SandiaInverter),
            _ => None,
        }
    }
}

/// An inverter record in the shape of its source.
#[derive(Debug, Clone, PartialEq)]
pub enum InverterSource {
    CecInverter(SandiaCoefficients),
    SandiaInverter(SandiaCoefficients),
    Ond(OndInverter),
    ManualSandia(SandiaCoefficients),
    ManualPvwatts(PvwattsParameters),
}

impl InverterSource {
    /// Interpret a raw key-value record according to its schema tag.
    pub fn from_record(schema: InverterSchema, record: &RawRecord) -> PlantResult<Self> {
        let tag = schema.as_str();
        Ok(match schema {
            InverterSchema::CecInverter => {
                InverterSource::CecInverter(SandiaCoefficients::from_record(record, tag)?)
            }
            InverterSchema::SandiaInverter => {
                InverterSource::SandiaInverter(SandiaCoefficients::from_record(record, tag)?)
            }
            InverterSchema::ManualSandia => {
                InverterSource::ManualSandia(SandiaCoefficients::from_record(record, tag)?)
            }
            InverterSchema::Ond => InverterSource::Ond(OndInverter::from_record(record)?),
            InverterSchema::ManualPvwatts => InverterSource::ManualPvwatts(PvwattsParameters {
                pdco: Watts(record::number(record, tag, "Pdco")?),
                eta_inv_nom: record::number(record, tag, "eta_inv_nom")?,
            }),
        })
    }

    pub fn schema(&self) -> InverterSchema {
        match self {
            InverterSource::CecInverter(_) => InverterSchema::CecInverter,
            InverterSource::SandiaInverter(_) => InverterSchema::SandiaInverter,
            InverterSource::Ond(_) => InverterSchema::Ond,
            InverterSource::ManualSandia(_) => InverterSchema::ManualSandia,
            InverterSource::ManualPvwatts(_) => InverterSchema::ManualPvwatts,
        }
    }

    /// Map the source record onto the parameter set of its AC model.
    pub fn normalize(&self) -> PlantResult<InverterParameters> {
        let params = match self {
            InverterSource::CecInverter(c)
            | InverterSource::SandiaInverter(c)
            | InverterSource::ManualSandia(c) => InverterParameters::Sandia(c.clone()),
            InverterSource::ManualPvwatts(p) => {
                check_efficiency(p.eta_inv_nom)?;
                InverterParameters::Pvwatts(p.clone())
            }
            InverterSource::Ond(ond) => {
                if !ond.pnom_dc.is_finite() || !ond.effic_euro.is_finite() {
                    return Err(PlantError::UnitConversion(format!(
                        "OND '{}' has non-finite PNomDC or EfficEuro",
                        ond.model
                    )));
                }
                let eta_inv_nom = ond.effic_euro / 100.0;
                check_efficiency(eta_inv_nom)?;
                InverterParameters::Pvwatts(PvwattsParameters {
                    pdco: ond.pnom_dc.to_watts(),
                    eta_inv_nom,
                })
            }
        };
        debug!(
            schema = self.schema().as_str(),
            ac_model = params.ac_model().as_str(),
            pdco = params.pdco().value(),
            "normalized inverter"
        );
        Ok(params)
    }
}

fn check_efficiency(eta: f64) -> PlantResult<()> {
    if eta.is_finite() && eta > 0.0 && eta <= 1.0 {
        Ok(())
    } else {
        Err(PlantError::Configuration(format!(
            "nominal inverter efficiency must be in (0, 1], got {eta}"
        )))
    }
}
