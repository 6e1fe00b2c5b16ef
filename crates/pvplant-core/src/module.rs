//! PV module parameters and their normalization.
//!
//! Module data comes in three schemas besides manual entry:
//!
//! | Schema | Origin | Temperature coefficients |
//! |--------|--------|--------------------------|
//! | `cec_module` | SAM `CECMod`, pvfree `cecmodule` | absolute, A/°C and V/°C |
//! | `sandia_module` | SAM `SandiaMod`, pvfree `pvmodule` | `Aisc` 1/°C, `Bvoco` V/°C |
//! | `pan` | PVsyst `.PAN` export | mA/°C, mV/°C, %/°C |
//!
//! All of them map onto [`ModuleParameters`], whose temperature coefficients
//! are relative (%/°C) and whose technology is a canonical [`Technology`] tag.
//!
//! The Sandia mapping follows King et al., *Photovoltaic Array Performance
//! Model* (SAND2004-3535), pp. 16-17: NOCT is not part of the model and
//! defaults to 45 °C, and no power temperature coefficient is reported.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlantError, PlantResult};
use crate::record::{self, RawRecord};
use crate::technology::Technology;
use crate::units::{Amperes, Celsius, PercentPerDegree, Volts, Watts};

/// NOCT assumed for Sandia records, which do not carry one.
pub const SANDIA_DEFAULT_NOCT: Celsius = Celsius(45.0);

/// Offset from the PVsyst reference temperature to the NOCT used downstream.
///
/// PAN files carry no NOCT. `TRef` is the STC cell temperature, so it is
/// shifted by this offset rather than written through as the NOCT.
pub const PAN_NOCT_OFFSET: f64 = 20.0;

/// Canonical module parameter set written to the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleParameters {
    #[serde(rename = "T_NOCT")]
    pub t_noct: Celsius,
    #[serde(rename = "Technology")]
    pub technology: Option<Technology>,
    /// Cells in series
    #[serde(rename = "N_s")]
    pub n_s: u32,
    #[serde(rename = "I_sc_ref")]
    pub i_sc_ref: Amperes,
    #[serde(rename = "V_oc_ref")]
    pub v_oc_ref: Volts,
    #[serde(rename = "I_mp_ref")]
    pub i_mp_ref: Amperes,
    #[serde(rename = "V_mp_ref")]
    pub v_mp_ref: Volts,
    pub alpha_sc: PercentPerDegree,
    pub beta_oc: PercentPerDegree,
    pub gamma_r: PercentPerDegree,
    /// Nominal power at STC
    #[serde(rename = "STC")]
    pub stc: Watts,
}

/// CEC module row. Temperature coefficients are absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct CecModule {
    pub t_noct: f64,
    pub technology: String,
    pub n_s: u32,
    pub i_sc_ref: f64,
    pub v_oc_ref: f64,
    pub i_mp_ref: f64,
    pub v_mp_ref: f64,
    /// A/°C
    pub alpha_sc: f64,
    /// V/°C
    pub beta_oc: f64,
    /// %/°C
    pub gamma_r: f64,
    pub stc: f64,
}

/// Sandia module row.
#[derive(Debug, Clone, PartialEq)]
pub struct SandiaModule {
    pub material: String,
    pub cells_in_series: u32,
    pub isco: f64,
    pub voco: f64,
    pub impo: f64,
    pub vmpo: f64,
    /// Normalized short-circuit current coefficient, 1/°C
    pub aisc: f64,
    /// Open-circuit voltage coefficient, V/°C
    pub bvoco: f64,
}

/// PVsyst `.PAN` module data.
#[derive(Debug, Clone, PartialEq)]
pub struct PanModule {
    pub technol: String,
    pub n_cel_s: u32,
    pub isc: f64,
    pub voc: f64,
    pub imp: f64,
    pub vmp: f64,
    /// mA/°C
    pub mu_isc: f64,
    /// mV/°C
    pub mu_voc_spec: f64,
    /// %/°C
    pub mu_pmp_req: f64,
    pub pnom: f64,
    /// Reference temperature, °C
    pub t_ref: f64,
}

/// Hand-entered module data: canonical units, free-text technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualModule {
    #[serde(rename = "T_NOCT")]
    pub t_noct: f64,
    #[serde(rename = "Technology")]
    pub technology: String,
    #[serde(rename = "N_s")]
    pub n_s: u32,
    #[serde(rename = "I_sc_ref")]
    pub i_sc_ref: f64,
    #[serde(rename = "V_oc_ref")]
    pub v_oc_ref: f64,
    #[serde(rename = "I_mp_ref")]
    pub i_mp_ref: f64,
    #[serde(rename = "V_mp_ref")]
    pub v_mp_ref: f64,
    pub alpha_sc: f64,
    pub beta_oc: f64,
    pub gamma_r: f64,
    #[serde(rename = "STC")]
    pub stc: f64,
}

/// Schema tag of a raw module record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleSchema {
    CecModule,
    SandiaModule,
    Pan,
    Manual,
}

impl ModuleSchema {
    pub const ALL: &'static [ModuleSchema] = &[
        ModuleSchema::CecModule,
        ModuleSchema::SandiaModule,
        ModuleSchema::Pan,
        ModuleSchema::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleSchema::CecModule => "cec_module",
            ModuleSchema::SandiaModule => "sandia_module",
            ModuleSchema::Pan => "pan",
            ModuleSchema::Manual => "manual",
        }
    }

    /// Schema of a SAM module database or pvfree collection, by name.
    pub fn from_database(name: &str) -> Option<Self> {
        match name {
            "CECMod" | "cecmodule" => Some(ModuleSchema::CecModule),
            "SandiaMod" | "pvmodule" => Some(ModuleSchema::SandiaModule),
            _ => None,
        }
    }
}

/// A module record in the shape of its source.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleSource {
    Cec(CecModule),
    Sandia(SandiaModule),
    Pan(PanModule),
    Manual(ManualModule),
}

impl ModuleSource {
    /// Interpret a raw key-value record according to its schema tag.
    pub fn from_record(schema: ModuleSchema, record: &RawRecord) -> PlantResult<Self> {
        let tag = schema.as_str();
        Ok(match schema {
            ModuleSchema::CecModule => ModuleSource::Cec(CecModule {
                t_noct: record::number(record, tag, "T_NOCT")?,
                technology: record::optional_text(record, "Technology"),
                n_s: record::count(record, tag, "N_s")?,
                i_sc_ref: record::conversion_input(record, tag, "I_sc_ref")?,
                v_oc_ref: record::conversion_input(record, tag, "V_oc_ref")?,
                i_mp_ref: record::number(record, tag, "I_mp_ref")?,
                v_mp_ref: record::number(record, tag, "V_mp_ref")?,
                alpha_sc: record::conversion_input(record, tag, "alpha_sc")?,
                beta_oc: record::conversion_input(record, tag, "beta_oc")?,
                gamma_r: record::number(record, tag, "gamma_r")?,
                stc: record::number(record, tag, "STC")?,
            }),
            ModuleSchema::SandiaModule => ModuleSource::Sandia(SandiaModule {
                material: record::optional_text(record, "Material"),
                cells_in_series: record::count(record, tag, "Cells_in_Series")?,
                isco: record::number(record, tag, "Isco")?,
                voco: record::conversion_input(record, tag, "Voco")?,
                impo: record::conversion_input(record, tag, "Impo")?,
                vmpo: record::conversion_input(record, tag, "Vmpo")?,
                aisc: record::conversion_input(record, tag, "Aisc")?,
                bvoco: record::conversion_input(record, tag, "Bvoco")?,
            }),
            ModuleSchema::Pan => ModuleSource::Pan(PanModule {
                technol: record::optional_text(record, "Technol"),
                n_cel_s: record::count(record, tag, "NCelS")?,
                isc: record::conversion_input(record, tag, "Isc")?,
                voc: record::conversion_input(record, tag, "Voc")?,
                imp: record::number(record, tag, "Imp")?,
                vmp: record::number(record, tag, "Vmp")?,
                mu_isc: record::conversion_input(record, tag, "muISC")?,
                mu_voc_spec: record::conversion_input(record, tag, "muVocSpec")?,
                mu_pmp_req: record::number(record, tag, "muPmpReq")?,
                pnom: record::number(record, tag, "PNom")?,
                t_ref: record::number(record, tag, "TRef")?,
            }),
            ModuleSchema::Manual => ModuleSource::Manual(ManualModule {
                t_noct: record::number(record, tag, "T_NOCT")?,
                technology: record::optional_text(record, "Technology"),
                n_s: record::count(record, tag, "N_s")?,
                i_sc_ref: record::number(record, tag, "I_sc_ref")?,
                v_oc_ref: record::number(record, tag, "V_oc_ref")?,
                i_mp_ref: record::number(record, tag, "I_mp_ref")?,
                v_mp_ref: record::number(record, tag, "V_mp_ref")?,
                alpha_sc: record::number(record, tag, "alpha_sc")?,
                beta_oc: record::number(record, tag, "beta_oc")?,
                gamma_r: record::number(record, tag, "gamma_r")?,
                stc: record::number(record, tag, "STC")?,
            }),
        })
    }

    pub fn schema(&self) -> ModuleSchema {
        match self {
            ModuleSource::Cec(_) => ModuleSchema::CecModule,
            ModuleSource::Sandia(_) => ModuleSchema::SandiaModule,
            ModuleSource::Pan(_) => ModuleSchema::Pan,
            ModuleSource::Manual(_) => ModuleSchema::Manual,
        }
    }

    fn technology_text(&self) -> &str {
        match self {
            ModuleSource::Cec(m) => &m.technology,
            ModuleSource::Sandia(m) => &m.material,
            ModuleSource::Pan(m) => &m.technol,
            ModuleSource::Manual(m) => &m.technology,
        }
    }

    /// Map the source record onto the canonical parameter set.
    pub fn normalize(&self) -> PlantResult<ModuleParameters> {
        let raw_technology = self.technology_text();
        let technology = Technology::normalize(raw_technology);
        if technology.is_none() {
            warn!(
                schema = self.schema().as_str(),
                technology = raw_technology,
                "unrecognized module technology, leaving it unset"
            );
        }

        let params = match self {
            ModuleSource::Cec(m) => ModuleParameters {
                t_noct: Celsius(m.t_noct),
                technology,
                n_s: m.n_s,
                i_sc_ref: Amperes(m.i_sc_ref),
                v_oc_ref: Volts(m.v_oc_ref),
                i_mp_ref: Amperes(m.i_mp_ref),
                v_mp_ref: Volts(m.v_mp_ref),
                alpha_sc: relative(m.alpha_sc, m.i_sc_ref, "alpha_sc", "I_sc_ref")?.round_to(6),
                beta_oc: relative(m.beta_oc, m.v_oc_ref, "beta_oc", "V_oc_ref")?.round_to(6),
                gamma_r: PercentPerDegree(m.gamma_r),
                stc: Watts(m.stc),
            },
            ModuleSource::Sandia(m) => ModuleParameters {
                t_noct: SANDIA_DEFAULT_NOCT,
                technology,
                n_s: m.cells_in_series,
                i_sc_ref: Amperes(m.isco),
                v_oc_ref: Volts(m.voco),
                i_mp_ref: Amperes(m.impo),
                v_mp_ref: Volts(m.vmpo),
                alpha_sc: PercentPerDegree(finite(m.aisc, "Aisc")? * 100.0).round_to(6),
                beta_oc: relative(m.bvoco, m.voco, "Bvoco", "Voco")?.round_to(6),
                gamma_r: PercentPerDegree(0.0),
                stc: (Amperes(finite(m.impo, "Impo")?) * Volts(finite(m.vmpo, "Vmpo")?))
                    .round_to(2),
            },
            ModuleSource::Pan(m) => ModuleParameters {
                t_noct: Celsius(m.t_ref + PAN_NOCT_OFFSET),
                technology,
                n_s: m.n_cel_s,
                i_sc_ref: Amperes(m.isc),
                v_oc_ref: Volts(m.voc),
                i_mp_ref: Amperes(m.imp),
                v_mp_ref: Volts(m.vmp),
                alpha_sc: relative(m.mu_isc / 1000.0, m.isc, "muISC", "Isc")?.round_to(2),
                beta_oc: relative(m.mu_voc_spec / 1000.0, m.voc, "muVocSpec", "Voc")?
                    .round_to(2),
                gamma_r: PercentPerDegree(m.mu_pmp_req),
                stc: Watts(m.pnom),
            },
            ModuleSource::Manual(m) => ModuleParameters {
                t_noct: Celsius(m.t_noct),
                technology,
                n_s: m.n_s,
                i_sc_ref: Amperes(m.i_sc_ref),
                v_oc_ref: Volts(m.v_oc_ref),
                i_mp_ref: Amperes(m.i_mp_ref),
                v_mp_ref: Volts(m.v_mp_ref),
                alpha_sc: PercentPerDegree(m.alpha_sc),
                beta_oc: PercentPerDegree(m.beta_oc),
                gamma_r: PercentPerDegree(m.gamma_r),
                stc: Watts(m.stc),
            },
        };

        debug!(
            schema = self.schema().as_str(),
            stc = params.stc.value(),
            n_s = params.n_s,
            "normalized module"
        );
        Ok(params)
    }
}

fn relative(
    coefficient: f64,
    reference: f64,
    coefficient_name: &str,
    reference_name: &str,
) -> PlantResult<PercentPerDegree> {
    PercentPerDegree::from_absolute(coefficient, reference).ok_or_else(|| {
        PlantError::UnitConversion(format!(
            "cannot express {coefficient_name}={coefficient} relative to {reference_name}={reference}"
        ))
    })
}

fn finite(value: f64, name: &str) -> PlantResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PlantError::UnitConversion(format!("{name} is not finite")))
    }
}
