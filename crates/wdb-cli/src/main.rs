//! WDB Command-Line Shell
//!
//! Runs statements against a local WDB database, interactively or in batch.

mod commands;
mod completer;
mod executor;
mod formatter;
mod repl;

use clap::Parser;
use formatter::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wdb_core::{DatabaseConfig, EngineConfig, StorageConfig};

/// WDB Command-Line Shell
#[derive(Parser, Debug)]
#[command(name = "wdb")]
#[command(version, about = "WDB semantic-network database shell")]
pub struct Args {
    /// Database directory
    #[arg(short = 'd', long, default_value = "wdb-data")]
    pub data_path: PathBuf,

    /// Use a throwaway in-memory database
    #[arg(long, conflicts_with = "data_path")]
    pub temporary: bool,

    /// Execute a single statement and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Execute statements from file
    #[arg(short = 'f', long, conflicts_with = "command")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "plain", value_enum)]
    pub format: OutputFormat,

    /// Skip constraint checks after modify statements
    #[arg(long)]
    pub no_validate_modify: bool,
}

impl Args {
    /// Database configuration selected by the arguments.
    pub fn into_config(self) -> DatabaseConfig {
        let storage = if self.temporary {
            StorageConfig::temporary()
        } else {
            StorageConfig::new(self.data_path)
        };
        DatabaseConfig::default()
            .with_storage(storage)
            .with_engine(EngineConfig::default().validate_modify(!self.no_validate_modify))
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wdb=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let format = args.format;
    let command = args.command.clone();
    let file = args.file.clone();
    let mut session = executor::open(args.into_config())?;

    if let Some(command) = command {
        // Command mode: the exit status reflects the statement
        let formatter = formatter::create_formatter(format);
        match executor::execute(&mut session, &command, &*formatter) {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", formatter.format_error(&e.to_string()));
                std::process::exit(1);
            }
        }
    } else if let Some(file) = file {
        let content = std::fs::read_to_string(&file)?;
        let formatter = formatter::create_formatter(format);
        for result in executor::execute_script(&mut session, &content, &*formatter) {
            match result {
                Ok(output) if output.is_empty() => {}
                Ok(output) => println!("{}", output),
                Err(e) => eprintln!("{}", formatter.format_error(&e.to_string())),
            }
        }
        session.database().flush()?;
        Ok(())
    } else {
        repl::run(session, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_into_config() {
        let args = Args::parse_from(["wdb", "--temporary", "--no-validate-modify"]);
        let config = args.into_config();
        assert!(config.storage.temporary);
        assert!(!config.engine.validate_modify);

        let args = Args::parse_from(["wdb", "-d", "/tmp/db", "--format", "json"]);
        assert_eq!(args.format, OutputFormat::Json);
        let config = args.into_config();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/db"));
        assert!(config.engine.validate_modify);
    }
}
