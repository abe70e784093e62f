use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ImportConfig;

#[derive(Parser, Debug)]
#[command(name = "jt13-import")]
#[command(version, about = "Import 13jt bid/budget XML files into a relational database")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./jt13-import.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a file, or every matching file in a directory
    Import {
        /// Source file or directory
        input: PathBuf,

        /// Delete all rows from every tracked table before importing
        #[arg(long)]
        reset: bool,

        /// Database URL or SQLite path
        #[arg(short, long)]
        database: Option<String>,

        /// Prefix of the tables that mirror XML tags
        #[arg(short, long)]
        prefix: Option<String>,

        /// Source file extension (case-insensitive)
        #[arg(short, long)]
        extension: Option<String>,

        /// Write a JSON report of every file's outcome
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// List the tables in the catalog and the XML tag each one imports
    ListTables {
        /// Prefix of the tables that mirror XML tags
        #[arg(short, long)]
        prefix: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

impl Commands {
    /// Config values given on the command line
    pub fn overrides(&self) -> ImportConfig {
        match self {
            Commands::Import {
                database,
                prefix,
                extension,
                ..
            } => ImportConfig {
                database: database.clone(),
                table_prefix: prefix.clone(),
                extension: extension.clone(),
            },
            Commands::ListTables { prefix } => ImportConfig {
                table_prefix: prefix.clone(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_with_reset() {
        let cli = Cli::try_parse_from(["jt13-import", "import", "bids/", "--reset", "-d", "out.db"]).unwrap();
        match cli.command {
            Commands::Import { ref input, reset, .. } => {
                assert_eq!(input, &PathBuf::from("bids/"));
                assert!(reset);
            }
            _ => panic!("expected import"),
        }
        assert_eq!(cli.command.overrides().database.as_deref(), Some("out.db"));
    }

    #[test]
    fn test_reset_defaults_to_off() {
        let cli = Cli::try_parse_from(["jt13-import", "import", "bids/"]).unwrap();
        assert!(matches!(cli.command, Commands::Import { reset: false, .. }));
    }
}
