use anyhow::Context;
use clap::Parser;
use std::process;
use taxi_trips::Settings;
use taxi_trips::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result: anyhow::Result<()> = runtime.block_on(async {
        let settings = Settings::from_env().context("invalid configuration")?;

        // Ingestion is blocking work; on Ctrl+C the task is abandoned and
        // chunks already committed stay committed
        let task = tokio::task::spawn_blocking(move || commands::run(&command, &settings));

        tokio::select! {
            joined = task => joined.context("command task panicked")?,
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for CTRL+C")?;
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("interrupted by user"))
            }
        }
    });

    // Do not wait for an abandoned blocking task
    runtime.shutdown_background();

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Taxi Trips - Taxi Trip Ingestion and Analytics");
    println!("==============================================");
    println!();
    println!("Ingest taxi trip CSV datasets in chunks, drop invalid rows, and report");
    println!("trip statistics, demand patterns, popular routes and trip distances.");
    println!();
    println!("USAGE:");
    println!("    taxi-trips <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    ingest      Ingest a CSV file and print ingestion statistics");
    println!("    report      Ingest a CSV file and print trip analytics");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Check how much of a file survives cleaning:");
    println!("    taxi-trips ingest train.csv --batch-size 5000");
    println!();
    println!("    # Full report over one month of a historical dataset:");
    println!("    taxi-trips report train.csv --start 2016-03-01 --end 2016-03-31 \\");
    println!("                                --as-of 2016-04-01 --format json");
    println!();
    println!("CONFIGURATION (environment or .env):");
    println!("    BATCH_SIZE, CACHE_TTL, RATE_LIMIT_PER_MINUTE, LOG_LEVEL, ENABLE_METRICS");
    println!();
    println!("For detailed help on any command, use:");
    println!("    taxi-trips <COMMAND> --help");
}
