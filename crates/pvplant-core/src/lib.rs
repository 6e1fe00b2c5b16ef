//! # pvplant-core: PV Plant Configuration Model
//!
//! Pure domain logic for describing a photovoltaic plant for simulation.
//! Nothing in this crate touches the file system or the network.
//!
//! ## Pipeline
//!
//! 1. **Equipment normalization**: inverter and module records arrive in
//!    several source schemas (SAM databases, pvfree, PVsyst exports, manual
//!    entry). [`InverterSource`] and [`ModuleSource`] map each one onto a
//!    single parameter set per AC model and one canonical module set.
//! 2. **Geometry assembly**: per-subarray tilt/azimuth or tracker angles and
//!    string layout, entered as scalars or comma-delimited lists, are
//!    validated against the subarray count ([`geometry`]).
//! 3. **Plant assembly**: [`plant::assemble`] combines an immutable
//!    [`FormState`] into a flat [`PlantConfiguration`].
//!
//! Separately, [`capacity`] computes the net effective capacity (CEN) of a
//! plant from a simulated AC power series.
//!
//! ## Quick Start
//!
//! ```rust
//! use pvplant_core::geometry::ListInput;
//!
//! let tilts = ListInput::from("10, 15, 20").resolve(3, "surface_tilt")?;
//! assert_eq!(tilts, vec![10.0, 15.0, 20.0]);
//! # Ok::<(), pvplant_core::PlantError>(())
//! ```

pub mod capacity;
pub mod error;
pub mod geometry;
pub mod inverter;
pub mod module;
pub mod plant;
pub mod record;
pub mod surface;
pub mod technology;
pub mod units;

pub use capacity::{duration_curve, net_effective_capacity, CenReport, DurationPoint, PowerUnit};
pub use error::{PlantError, PlantResult};
pub use geometry::{
    ElectricalInput, ElectricalLayout, ListInput, ModuleType, MountGeometry, MountInput, Racking,
};
pub use inverter::{AcModel, InverterParameters, InverterSchema, InverterSource};
pub use module::{ModuleParameters, ModuleSchema, ModuleSource};
pub use plant::{assemble, Bifacial, FormState, Location, Losses, PlantConfiguration};
pub use record::RawRecord;
pub use technology::Technology;
pub use units::{Amperes, Celsius, Kilowatts, Megawatts, PercentPerDegree, Volts, Watts};
