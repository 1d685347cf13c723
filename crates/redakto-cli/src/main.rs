mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use redakto_config::{Config, LoggingConfig};

use crate::cli::{Cli, Commands, ServiceCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    let command = match cli.command {
        // init runs before a config file exists
        Commands::Init { dir, force } => {
            let _guard = logging::init(&LoggingConfig::default())?;
            return commands::init::handle(&config_path, dir, force);
        }
        Commands::Service(command) => command,
    };

    let config = Config::load_from(&config_path)?;
    let _guard = logging::init(&config.logging)?;

    let context = commands::Context::new(config, config_path, cli.catalog);
    match command {
        ServiceCommand::Serve { host, port } => commands::serve::handle(&context, host, port).await,
        ServiceCommand::Detect(args) => commands::detect::detect(&context, args).await,
        ServiceCommand::Redact {
            input,
            style,
            placeholder,
            json,
        } => commands::detect::redact(&context, input, style.into(), placeholder, json).await,
        ServiceCommand::EntitySets { id, model } => {
            commands::entity_sets::handle(&context, id, model).await
        }
    }
}
