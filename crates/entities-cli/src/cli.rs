// Command-line definition

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Entities - preview trigger-driven suggestions against a vault of notes
#[derive(Parser, Debug)]
#[command(name = "entities")]
#[command(about = "Preview entity suggestions for a line of text")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root: a directory of markdown notes
    #[arg(long, global = true, default_value = ".")]
    pub vault: PathBuf,

    /// Settings file (.json, .yaml or .yml); the stored plugin data is used otherwise
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// JSON list of file classes exposed as the metadata schema
    #[arg(long, global = true)]
    pub file_classes: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the detected trigger and the suggestions for a line
    Suggest {
        /// Line of text being typed
        line: String,

        /// Cursor column in characters (end of line by default)
        #[arg(long)]
        cursor: Option<usize>,
    },

    /// Apply one suggestion and print the resulting text
    Select {
        line: String,

        /// Zero-based index into the suggestion list
        #[arg(long, default_value_t = 0)]
        index: usize,

        #[arg(long)]
        cursor: Option<usize>,
    },

    /// List provider types and the status of configured providers
    Providers,

    /// Print the default settings object
    DefaultSettings {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suggest() {
        let cli = Cli::try_parse_from(["entities", "--vault", "notes", "suggest", "hi @ad", "--cursor", "6"])
            .unwrap();
        assert_eq!(cli.vault, PathBuf::from("notes"));
        match cli.command {
            Commands::Suggest { line, cursor } => {
                assert_eq!(line, "hi @ad");
                assert_eq!(cursor, Some(6));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_settings_format() {
        let cli = Cli::try_parse_from(["entities", "default-settings", "--format", "yaml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::DefaultSettings {
                format: OutputFormat::Yaml
            }
        ));
        assert_eq!(cli.log_level, "warn");
    }
}
