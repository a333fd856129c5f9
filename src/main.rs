use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_csv2sql::{
    convert_csv, default_search_dirs, repair_sql, run_menu, ConvertOptions, RepairOptions,
    SinkCapabilities, TerminalPrompter,
};

#[derive(Parser)]
#[command(name = "rust-csv2sql")]
#[command(author, version, about = "Convert CSV files to SQL and repair broken SQL dumps")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log progress details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive main menu (default)
    Menu,

    /// Convert a CSV file into a SQL script
    Convert {
        /// Path to the CSV file
        csv: PathBuf,

        /// Table name (defaults to the file name)
        #[arg(short, long)]
        table_name: Option<String>,

        /// Records processed per chunk
        #[arg(long, default_value_t = rust_csv2sql::convert::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Stop after this many rows
        #[arg(long)]
        max_rows: Option<usize>,

        /// Output path (defaults to <stem>_insert_statements.sql beside the CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Edit the schema of a SQL file and rebuild its INSERT statements
    Repair {
        /// Path to the SQL file
        sql: PathBuf,

        /// Number of VALUES tuples to rebuild (0 = all; asked when omitted)
        #[arg(long)]
        max_tuples: Option<usize>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let show_progress = !cli.no_progress && std::io::stderr().is_terminal();
    let capabilities = SinkCapabilities::detect();
    let mut prompter = TerminalPrompter::new();

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            run_menu(&mut prompter, &default_search_dirs(), capabilities, show_progress)?;
        }
        Commands::Convert {
            csv,
            table_name,
            chunk_size,
            max_rows,
            output,
        } => {
            let options = ConvertOptions {
                table_name,
                output_path: output,
                chunk_size,
                max_rows,
                show_progress,
                ..ConvertOptions::new(csv)
            };
            let result = convert_csv(&options)?;
            println!(
                "Wrote {} ({} rows, {} errors, {:.2}% success) in {:.2}s",
                result.sql_path.display(),
                result.processed_rows,
                result.error_count,
                result.success_rate(),
                result.elapsed.as_secs_f64()
            );
        }
        Commands::Repair { sql, max_tuples } => {
            let options = RepairOptions {
                max_tuples,
                show_progress,
                capabilities,
                ..RepairOptions::new(sql)
            };
            repair_sql(&options, &mut prompter)?;
        }
    }

    Ok(())
}
