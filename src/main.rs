//! shared-gallery CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shared_gallery::cli::{Cli, Commands};
use shared_gallery::commands::{
    run_add, run_client, run_config, run_delete, run_list, CommandContext,
};

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run() -> shared_gallery::Result<String> {
    let cli = Cli::parse();
    let ctx = CommandContext::from_cli(&cli)?;
    init_tracing(ctx.log_level());

    match &cli.command {
        Commands::Client(args) => run_client(args, &ctx),
        Commands::Add(args) => run_add(args, &ctx),
        Commands::List(args) => run_list(args, &ctx),
        Commands::Delete(args) => run_delete(args, &ctx),
        Commands::Config(args) => run_config(args, &ctx),
    }
}

/// Logs go to stderr; stdout belongs to rendered frames and command output
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shared_gallery={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
