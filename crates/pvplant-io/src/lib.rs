//! # pvplant-io: Equipment Sources & Configuration Files
//!
//! Everything that touches the outside world on behalf of `pvplant-core`:
//!
//! | Module | Reads / writes |
//! |--------|----------------|
//! | [`sam`] | SAM CSV equipment libraries (`CECMod`, `SandiaMod`, `CECInverter`, `SandiaInverter`) |
//! | [`pvfree`] | Module records from a pvfree REST service |
//! | [`pvsyst`] | PVsyst `.PAN` / `.OND` exports |
//! | [`config_file`] | Plant configuration JSON files |
//! | [`series`] | AC power series CSV, duration-curve CSV |
//!
//! All functions return [`pvplant_core::PlantResult`]; missing equipment is
//! reported as [`pvplant_core::PlantError::Lookup`].
//!
//! ```rust,no_run
//! use pvplant_io::sam::{SamDatabase, SamLibrary};
//! use std::path::Path;
//!
//! let lib = SamLibrary::open(Path::new("sam"), SamDatabase::CecInverters)?;
//! for manufacturer in lib.manufacturers() {
//!     println!("{manufacturer}");
//! }
//! # Ok::<(), pvplant_core::PlantError>(())
//! ```

pub mod config_file;
pub mod pvfree;
pub mod pvsyst;
pub mod sam;
pub mod series;

pub use config_file::{read_configuration, write_configuration, DEFAULT_CONFIG_DIR};
pub use pvfree::{PvfreeClient, PvfreeDatabase};
pub use pvsyst::{parse_ond, parse_pan};
pub use sam::{SamDatabase, SamLibrary};
pub use series::{read_ac_series, write_duration_curve};
