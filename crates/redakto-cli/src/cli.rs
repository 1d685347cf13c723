use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use redakto_core::RedactionStyle;

#[derive(Parser)]
#[command(name = "redakto")]
#[command(about = "Detect and redact sensitive entities in German texts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "REDAKTO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Entity set catalog, overrides `catalog.path`
    #[arg(long, global = true, env = "REDAKTO_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config, sample catalog and sample pattern model
    Init {
        /// Target directory (default: directory of the config file)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    #[command(flatten)]
    Service(ServiceCommand),
}

/// Commands that run against a loaded config and catalog.
#[derive(Subcommand)]
pub enum ServiceCommand {
    /// Start the HTTP API
    Serve {
        #[arg(long, env = "REDAKTO_HOST")]
        host: Option<String>,

        #[arg(long, env = "REDAKTO_PORT")]
        port: Option<u16>,
    },

    /// Detect entities and print them as JSON
    Detect(DetectArgs),

    /// Redact entities and print the redacted texts
    Redact {
        #[command(flatten)]
        input: DetectArgs,

        #[arg(long, value_enum, default_value_t = StyleArg::Label)]
        style: StyleArg,

        /// Replacement template, `{label}` is substituted
        #[arg(long)]
        placeholder: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// List entity sets, or show one
    EntitySets {
        /// Entity set id
        id: Option<String>,

        /// Show this model of the entity set
        #[arg(long, requires = "id")]
        model: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[arg(long = "entity-set", short = 'e')]
    pub entity_set: String,

    #[arg(long, short = 'm')]
    pub model: String,

    /// Keep fine-grained labels instead of merged coarse ones
    #[arg(long)]
    pub fine_grained: bool,

    /// Read one input text from a file
    #[arg(long, short = 'f', conflicts_with = "texts")]
    pub file: Option<PathBuf>,

    /// Input texts; stdin is read when none are given
    pub texts: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Label,
    Mask,
    Asterisks,
    Remove,
}

impl From<StyleArg> for RedactionStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Label => RedactionStyle::Label,
            StyleArg::Mask => RedactionStyle::Mask,
            StyleArg::Asterisks => RedactionStyle::Asterisks,
            StyleArg::Remove => RedactionStyle::Remove,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redact() {
        let cli = Cli::try_parse_from([
            "redakto", "redact", "-e", "grascco", "-m", "patterns", "--style", "asterisks",
            "Frau Eva Roth",
        ])
        .unwrap();
        match cli.command {
            Commands::Service(ServiceCommand::Redact { input, style, .. }) => {
                assert_eq!(input.entity_set, "grascco");
                assert_eq!(input.texts, vec!["Frau Eva Roth"]);
                assert_eq!(RedactionStyle::from(style), RedactionStyle::Asterisks);
            }
            _ => panic!("expected redact"),
        }
    }

    #[test]
    fn test_init_is_separate_from_service_commands() {
        let cli = Cli::try_parse_from(["redakto", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true, .. }));

        let cli = Cli::try_parse_from(["redakto", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Service(ServiceCommand::Serve { port: Some(9000), .. })
        ));
    }

    #[test]
    fn test_file_conflicts_with_texts() {
        let result = Cli::try_parse_from([
            "redakto", "detect", "-e", "a", "-m", "b", "--file", "in.txt", "text",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_model_requires_entity_set() {
        assert!(Cli::try_parse_from(["redakto", "entity-sets", "--model", "m"]).is_err());
        assert!(Cli::try_parse_from(["redakto", "entity-sets", "grascco", "--model", "m"]).is_ok());
    }
}
