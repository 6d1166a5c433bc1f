//! Change-log viewer commands
//!
//! Read-only queries over a change-log table. The viewer never writes rows.

use clap::Subcommand;

use crate::display::{format_record_detail, format_record_list};
use crate::error::{LoggableError, LoggableResult};
use crate::storage::ChangeLogStore;

/// Change-log viewer subcommands
#[derive(Subcommand)]
pub enum LogCommands {
    /// Show the most recent change log of an object
    Last {
        /// Object identifier (primary key)
        object_id: String,
    },

    /// List every change log of an object, oldest first
    History {
        /// Object identifier (primary key)
        object_id: String,

        /// Show full details for each record
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the most recent change logs in the table
    Recent {
        /// Number of records to show
        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },

    /// Show one change log by its record identifier
    Show {
        /// Change-log record identifier
        record_id: String,
    },
}

/// Handle a viewer command against `table`
pub fn handle_log_command(
    store: &dyn ChangeLogStore,
    table: &str,
    cmd: LogCommands,
) -> LoggableResult<()> {
    match cmd {
        LogCommands::Last { object_id } => match store.last_record(table, &object_id)? {
            Some(record) => print!("{}", format_record_detail(&record)),
            None => println!("No change logs found for object {}.", object_id),
        },

        LogCommands::History { object_id, verbose } => {
            let records = store.records(table, &object_id)?;

            if verbose && !records.is_empty() {
                for record in &records {
                    println!("{}", format_record_detail(record));
                }
            } else {
                print!("{}", format_record_list(&records));
                println!();
            }

            println!("Total: {} change log(s)", records.len());
        }

        LogCommands::Recent { count } => {
            let records = store.recent(table, count)?;
            print!("{}", format_record_list(&records));
            println!();
        }

        LogCommands::Show { record_id } => {
            let record = store
                .get(table, &record_id)?
                .ok_or_else(|| LoggableError::record_not_found(&record_id))?;
            print!("{}", format_record_detail(&record));
        }
    }

    Ok(())
}
