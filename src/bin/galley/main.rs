//! Galley CLI - resolve, build and package native library recipes

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use galley::resolver::RecipeError;
use galley::util::diagnostic::emit;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<RecipeError>() {
            Some(recipe_err) => emit(&recipe_err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("galley=debug")
    } else {
        EnvFilter::new("galley=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::Create(args) => commands::create::execute(args, cli.verbose, color),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Matrix(args) => commands::matrix::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
