mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{analyze, compile, generate, init, preview, AnalyzeArgs, CompileArgs, GenerateArgs, InitArgs, PreviewArgs};

/// Tessera CLI - block documents for shop product descriptions
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Tessera project
    Init(InitArgs),

    /// Analyze HTML fragments
    Analyze(AnalyzeArgs),

    /// Freeze every block of a document and refresh its compiled HTML
    Compile(CompileArgs),

    /// Render a document into an isolated preview page
    Preview(PreviewArgs),

    /// Generate a block type from an HTML fragment
    Generate(GenerateArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Analyze(args) => analyze(args, &cwd),
        Command::Compile(args) => compile(args, &cwd),
        Command::Preview(args) => preview(args, &cwd),
        Command::Generate(args) => generate(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
