//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use galley::generation::Generation;

/// Galley - resolve, build and package native library recipes
#[derive(Parser)]
#[command(name = "galley")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve options, dependencies and build variables without building
    Resolve(ResolveArgs),

    /// Build, test and package a recipe, then publish its metadata
    Create(CreateArgs),

    /// Show recipe metadata and declared options
    Info(InfoArgs),

    /// Resolve every permutation of the boolean options
    Matrix(MatrixArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Inputs shared by every resolving command.
#[derive(Args, Debug, Clone)]
pub struct RecipeInput {
    /// Recipe file or directory containing Galley.toml (defaults to current directory)
    pub recipe: Option<PathBuf>,

    /// Setting as key=value (e.g., os=Linux, compiler.cppstd=20)
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Option override as name=value (e.g., shared=True)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Profile file with [settings] and [options]
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Recipe generation used for override syntax and output (legacy, current)
    #[arg(short, long, default_value_t = Generation::Current)]
    pub generation: Generation,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: RecipeInput,

    /// Print the resolution and metadata as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub input: RecipeInput,

    /// Source tree (defaults to the recipe directory)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Build directory
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Package directory
    #[arg(long)]
    pub package_dir: Option<PathBuf>,

    /// CMake generator (e.g., Ninja)
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Skip the consumption harness
    #[arg(long)]
    pub no_harness: bool,

    /// Print the published metadata as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Recipe file or directory containing Galley.toml (defaults to current directory)
    pub recipe: Option<PathBuf>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub input: RecipeInput,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
