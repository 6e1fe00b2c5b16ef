//! SAM library browsing.

use std::io::Write;

use anyhow::{anyhow, Result};
use pvplant_cli::cli::EquipmentCommands;
use pvplant_cli::form::{library_record, open_library};
use pvplant_cli::Settings;
use pvplant_core::{InverterSource, ModuleSource};
use pvplant_io::SamDatabase;
use serde_json::json;
use tabwriter::TabWriter;

pub fn handle(command: &EquipmentCommands, settings: &Settings) -> Result<()> {
    match command {
        EquipmentCommands::Manufacturers { db } => handle_manufacturers((*db).into(), settings),
        EquipmentCommands::Search { db, pattern } => {
            handle_search((*db).into(), pattern, settings)
        }
        EquipmentCommands::Show { db, name } => handle_show((*db).into(), name, settings),
    }
}

fn handle_manufacturers(database: SamDatabase, settings: &Settings) -> Result<()> {
    let library = open_library(settings, database)?;
    for manufacturer in library.manufacturers() {
        println!("{manufacturer}");
    }
    Ok(())
}

fn handle_search(database: SamDatabase, pattern: &str, settings: &Settings) -> Result<()> {
    let library = open_library(settings, database)?;
    let matches = library.search(pattern);
    if matches.is_empty() {
        println!("No {database} entries match '{pattern}'");
        return Ok(());
    }

    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Name\tSource name")?;
    for name in &matches {
        let source_name = library
            .get(name)?
            .get("Name")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        writeln!(writer, "{name}\t{source_name}")?;
    }
    writer.flush()?;
    print!("{}", String::from_utf8(writer.into_inner()?)?);
    println!("{} of {} entries", matches.len(), library.len());
    Ok(())
}

fn handle_show(database: SamDatabase, name: &str, settings: &Settings) -> Result<()> {
    let library = open_library(settings, database)?;
    let record = library_record(&library, name)?;

    let output = if let Some(schema) = database.inverter_schema() {
        let params = InverterSource::from_record(schema, record)?.normalize()?;
        json!({
            "database": database.as_str(),
            "ac_model": params.ac_model(),
            "inverter": params,
        })
    } else {
        let schema = database
            .module_schema()
            .ok_or_else(|| anyhow!("{database} has no known record schema"))?;
        let params = ModuleSource::from_record(schema, record)?.normalize()?;
        json!({
            "database": database.as_str(),
            "module": params,
        })
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
