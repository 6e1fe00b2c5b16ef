use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use pvplant_core::PowerUnit;
use pvplant_io::SamDatabase;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pvplant", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Settings file (defaults to ~/.pvplant/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and inspect plant configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Browse the SAM equipment libraries
    Equipment {
        #[command(subcommand)]
        command: EquipmentCommands,
    },
    /// List named ground surfaces and their albedo
    Surfaces,
    /// Net effective capacity (CEN) from an AC power series
    Cen {
        /// CSV file with AC power samples in watts
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Column holding the AC power
        #[arg(long, default_value = "ac")]
        column: String,
        /// Percentile of the duration curve
        #[arg(long, default_value_t = 99.0)]
        perc: f64,
        /// Decimal places in the report
        #[arg(long, default_value_t = 2)]
        decimals: u32,
        /// Reporting unit
        #[arg(long, value_enum, default_value = "MW")]
        unit: UnitArg,
        /// Write the duration curve to this CSV file
        #[arg(long, value_hint = ValueHint::FilePath)]
        curve: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Build a plant configuration from a TOML form
    Generate {
        /// Form file describing the plant
        #[arg(long, value_hint = ValueHint::FilePath)]
        form: PathBuf,
        /// Output directory (overrides the settings file)
        #[arg(long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
        /// Print the configuration instead of writing it
        #[arg(long)]
        stdout: bool,
    },
    /// Print a summary of an existing configuration file
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum EquipmentCommands {
    /// List the manufacturers in a library
    Manufacturers {
        #[arg(long, value_enum)]
        db: DatabaseArg,
    },
    /// List devices whose name contains a pattern
    Search {
        #[arg(long, value_enum)]
        db: DatabaseArg,
        pattern: String,
    },
    /// Print the normalized parameters of one device
    Show {
        #[arg(long, value_enum)]
        db: DatabaseArg,
        name: String,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DatabaseArg {
    #[value(name = "CECMod")]
    CecMod,
    #[value(name = "SandiaMod")]
    SandiaMod,
    #[value(name = "CECInverter")]
    CecInverter,
    #[value(name = "SandiaInverter")]
    SandiaInverter,
}

impl From<DatabaseArg> for SamDatabase {
    fn from(arg: DatabaseArg) -> Self {
        match arg {
            DatabaseArg::CecMod => SamDatabase::CecModules,
            DatabaseArg::SandiaMod => SamDatabase::SandiaModules,
            DatabaseArg::CecInverter => SamDatabase::CecInverters,
            DatabaseArg::SandiaInverter => SamDatabase::SandiaInverters,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum UnitArg {
    #[value(name = "kW")]
    Kw,
    #[value(name = "MW")]
    Mw,
}

impl From<UnitArg> for PowerUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Kw => PowerUnit::Kilowatts,
            UnitArg::Mw => PowerUnit::Megawatts,
        }
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_cen_defaults() {
        let cli = Cli::parse_from(["pvplant", "cen", "ac.csv"]);
        match cli.command {
            Commands::Cen {
                column,
                perc,
                decimals,
                unit,
                curve,
                ..
            } => {
                assert_eq!(column, "ac");
                assert_eq!(perc, 99.0);
                assert_eq!(decimals, 2);
                assert!(matches!(unit, UnitArg::Mw));
                assert!(curve.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cli.log_level, tracing::Level::INFO);
    }

    #[test]
    fn test_database_names() {
        let cli = Cli::parse_from(["pvplant", "equipment", "manufacturers", "--db", "CECInverter"]);
        match cli.command {
            Commands::Equipment {
                command: EquipmentCommands::Manufacturers { db },
            } => assert_eq!(SamDatabase::from(db), SamDatabase::CecInverters),
            other => panic!("unexpected {other:?}"),
        }
    }
}
