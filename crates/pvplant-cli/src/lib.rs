pub mod cli;
pub mod form;
pub mod settings;

pub use cli::{
    build_cli_command, Cli, Commands, ConfigCommands, DatabaseArg, EquipmentCommands, UnitArg,
};
pub use form::FormFile;
pub use settings::Settings;
