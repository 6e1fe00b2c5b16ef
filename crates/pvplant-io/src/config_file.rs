//! Persisted plant configuration files.
//!
//! Configurations are written as pretty-printed JSON (2-space indent) to
//! `<dir>/system_config.json`, or `<dir>/system_config_<name>.json` for a
//! named plant. Each write replaces the whole file.

use std::fs;
use std::path::{Path, PathBuf};

use pvplant_core::plant::config_file_name;
use pvplant_core::{PlantConfiguration, PlantResult};
use tracing::info;

/// Directory configurations are written to, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "configurations";

pub fn config_path(dir: &Path, name: &str) -> PlantResult<PathBuf> {
    Ok(dir.join(config_file_name(name)?))
}

pub fn to_pretty_json(config: &PlantConfiguration) -> PlantResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Write `config` under `dir`, creating the directory when missing.
pub fn write_configuration(config: &PlantConfiguration, dir: &Path) -> PlantResult<PathBuf> {
    let path = config_path(dir, &config.name)?;
    fs::create_dir_all(dir)?;
    let mut json = to_pretty_json(config)?;
    json.push('\n');
    fs::write(&path, json)?;
    info!(path = %path.display(), "Wrote plant configuration");
    Ok(path)
}

pub fn read_configuration(path: impl AsRef<Path>) -> PlantResult<PlantConfiguration> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_configuration_string(&content)
}

pub fn parse_configuration_string(content: &str) -> PlantResult<PlantConfiguration> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvplant_core::inverter::PvwattsParameters;
    use pvplant_core::module::ManualModule;
    use pvplant_core::{
        assemble, Bifacial, ElectricalInput, FormState, InverterSource, Location, Losses,
        ModuleSource, MountInput, PlantError, Watts,
    };
    use tempfile::tempdir;

    fn configuration(name: Option<&str>) -> PlantConfiguration {
        let form = FormState {
            location: Location {
                latitude: 4.6,
                longitude: -74.08,
                altitude: 2600.0,
                tz: "America/Bogota".into(),
            },
            surface_albedo: Some(0.2),
            surface_type: None,
            inverter: InverterSource::ManualPvwatts(PvwattsParameters {
                pdco: Watts(10_000.0),
                eta_inv_nom: 0.97,
            }),
            module: ModuleSource::Manual(ManualModule {
                t_noct: 45.0,
                technology: "monosi".into(),
                n_s: 72,
                i_sc_ref: 9.6,
                v_oc_ref: 47.0,
                i_mp_ref: 9.1,
                v_mp_ref: 38.5,
                alpha_sc: 0.05,
                beta_oc: -0.29,
                gamma_r: -0.37,
                stc: 350.0,
            }),
            bifacial: Bifacial::default(),
            num_arrays: 1,
            mount: MountInput::SingleAxis {
                axis_tilt: 0.0.into(),
                axis_azimuth: 180.0.into(),
                max_angle: 55.0.into(),
            },
            racking: None,
            electrical: ElectricalInput {
                modules_per_string: 18.0.into(),
                strings_per_inverter: 2.0.into(),
                num_inverter: 1,
            },
            losses: Losses::default(),
            name: name.map(str::to_string),
        };
        assemble(&form).unwrap()
    }

    #[test]
    fn test_default_and_named_paths() {
        let dir = Path::new("configurations");
        assert_eq!(
            config_path(dir, "").unwrap(),
            PathBuf::from("configurations/system_config.json")
        );
        assert_eq!(
            config_path(dir, "north").unwrap(),
            PathBuf::from("configurations/system_config_north.json")
        );
    }

    #[test]
    fn test_write_creates_directory_and_overwrites() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("configurations");

        let path = write_configuration(&configuration(None), &dir).unwrap();
        assert_eq!(path, dir.join("system_config.json"));
        assert!(path.exists());

        let mut changed = configuration(None);
        changed.loss = 10.0;
        write_configuration(&changed, &dir).unwrap();
        let back = read_configuration(&path).unwrap();
        assert_eq!(back.loss, 10.0);
    }

    #[test]
    fn test_pretty_two_space_indent() {
        let json = to_pretty_json(&configuration(Some("plant"))).unwrap();
        assert!(json.starts_with("{\n  \"latitude\": 4.6,"));
        assert!(json.contains("\n  \"surface_tilt\": null,"));
        assert!(json.contains("\"name\": \"plant\""));
    }

    #[test]
    fn test_round_trip_through_file() {
        let tmp = tempdir().unwrap();
        let config = configuration(Some("tracker"));
        let path = write_configuration(&config, tmp.path()).unwrap();
        assert!(path.ends_with("system_config_tracker.json"));
        assert_eq!(read_configuration(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        assert!(matches!(
            parse_configuration_string("{\"latitude\": 1.0}"),
            Err(PlantError::Parse(_))
        ));
    }
}
