use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loggable::cli::{handle_log_command, LogCommands};
use loggable::config::{paths::LoggablePaths, settings::Settings};
use loggable::storage::JsonlStore;

#[derive(Parser)]
#[command(
    name = "loggable",
    author = "Kaylee Beyene",
    version,
    about = "Browse entity change logs",
    long_about = "loggable reads the change-log tables written by the entity \
                  audit engine and shows who changed what, when, and how."
)]
struct Cli {
    /// Change-log table to read (defaults to the configured table)
    #[arg(long, global = true, env = "LOGGABLE_TABLE")]
    table: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Log(LogCommands),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOGGABLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = LoggablePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let table = cli.table.unwrap_or_else(|| settings.table_name.clone());

    let store = JsonlStore::from_paths(&paths);

    match cli.command {
        Some(Commands::Log(cmd)) => {
            handle_log_command(&store, &table, cmd)?;
        }
        Some(Commands::Config) => {
            println!("loggable Configuration");
            println!("======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Table file:     {}", paths.table_file(&table).display());
            println!();
            println!("Settings:");
            println!("  Table name:         {}", table);
            println!("  Compute diff:       {}", settings.compute_diff);
            println!("  Lazy update:        {}", settings.lazy_update);
            if !settings.lazy_update_fields.is_empty() {
                println!("  Lazy update fields: {}", settings.lazy_update_fields.join(", "));
            }
            match settings.identity_capacity {
                Some(capacity) => println!("  Identity capacity:  {}", capacity),
                None => println!("  Identity capacity:  unbounded"),
            }
        }
        None => {
            println!("loggable - entity change-log viewer");
            println!();
            println!("Run 'loggable --help' for usage information.");
        }
    }

    Ok(())
}
