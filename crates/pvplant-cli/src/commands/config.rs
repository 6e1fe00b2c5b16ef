use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pvplant_cli::cli::ConfigCommands;
use pvplant_cli::{FormFile, Settings};
use pvplant_core::{assemble, PlantConfiguration};
use pvplant_io::config_file::to_pretty_json;
use pvplant_io::{read_configuration, write_configuration};
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(command: &ConfigCommands, settings: &Settings) -> Result<()> {
    match command {
        ConfigCommands::Generate {
            form,
            out_dir,
            stdout,
        } => handle_generate(form, out_dir.as_deref(), *stdout, settings),
        ConfigCommands::Show { path } => handle_show(path),
    }
}

fn handle_generate(
    form_path: &Path,
    out_dir: Option<&Path>,
    stdout: bool,
    settings: &Settings,
) -> Result<()> {
    info!("Generating configuration from {}", form_path.display());
    let form = FormFile::load(form_path)?;
    let base_dir = form_path.parent().unwrap_or_else(|| Path::new("."));
    let state = form.into_form_state(settings, base_dir)?;
    let config = assemble(&state).context("assembling plant configuration")?;

    if stdout {
        println!("{}", to_pretty_json(&config)?);
        return Ok(());
    }

    let dir: PathBuf = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.data.config_dir.clone());
    let path = write_configuration(&config, &dir)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}

fn handle_show(path: &Path) -> Result<()> {
    let config = read_configuration(path)
        .with_context(|| format!("reading configuration {}", path.display()))?;
    print!("{}", summary_table(&config)?);
    Ok(())
}

fn join(values: &[impl ToString]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary_table(config: &PlantConfiguration) -> Result<String> {
    let mut writer = TabWriter::new(Vec::new()).padding(2);
    let name = if config.name.is_empty() {
        "(unnamed)"
    } else {
        config.name.as_str()
    };
    writeln!(writer, "Field\tValue")?;
    writeln!(writer, "name\t{name}")?;
    writeln!(
        writer,
        "location\t{}, {} ({} m, {})",
        config.latitude, config.longitude, config.altitude, config.tz
    )?;
    writeln!(writer, "surface_albedo\t{}", config.surface_albedo)?;
    writeln!(
        writer,
        "inverter\t{} (Pdco {} W) x {}",
        config.ac_model.as_str(),
        config.inverter.pdco().value(),
        config.num_inverter
    )?;
    let technology = config
        .module
        .technology
        .map(|t| t.as_str())
        .unwrap_or("unknown");
    writeln!(
        writer,
        "module\t{} W, {} cells, {}",
        config.module.stc.value(),
        config.module.n_s,
        technology
    )?;
    if config.with_tracker {
        writeln!(writer, "mount\tsingle-axis tracker")?;
        if let Some(max_angle) = &config.max_angle {
            writeln!(writer, "max_angle\t{}", join(max_angle))?;
        }
    } else {
        writeln!(writer, "mount\tfixed")?;
        if let Some(tilt) = &config.surface_tilt {
            writeln!(writer, "surface_tilt\t{}", join(tilt))?;
        }
        if let Some(azimuth) = &config.surface_azimuth {
            writeln!(writer, "surface_azimuth\t{}", join(azimuth))?;
        }
    }
    writeln!(writer, "num_arrays\t{}", config.num_arrays)?;
    writeln!(writer, "modules_per_string\t{}", join(&config.modules_per_string))?;
    writeln!(writer, "strings_per_inverter\t{}", join(&config.strings_per_inverter))?;
    writeln!(
        writer,
        "dc_capacity\t{:.3} kW",
        config.dc_capacity_watts() / 1e3
    )?;
    if config.bifacial {
        writeln!(writer, "bifaciality\t{}", config.bifaciality)?;
    }
    writeln!(
        writer,
        "losses\tloss {} %, kpc {} %, kt {} %, kin {} %",
        config.loss, config.kpc, config.kt, config.kin
    )?;
    writer.flush()?;
    Ok(String::from_utf8(writer.into_inner()?)?)
}
