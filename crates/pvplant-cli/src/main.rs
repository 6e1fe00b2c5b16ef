use anyhow::Result;
use clap::Parser;
use pvplant_cli::{Cli, Commands, Settings};
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    debug!(
        sam_dir = %settings.data.sam_dir.display(),
        config_dir = %settings.data.config_dir.display(),
        "loaded settings"
    );

    match &cli.command {
        Commands::Config { command } => commands::config::handle(command, &settings),
        Commands::Equipment { command } => commands::equipment::handle(command, &settings),
        Commands::Surfaces => commands::surfaces::handle(),
        Commands::Cen {
            input,
            column,
            perc,
            decimals,
            unit,
            curve,
        } => commands::cen::handle(
            input,
            column,
            *perc,
            *decimals,
            (*unit).into(),
            curve.as_deref(),
        ),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(&cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
