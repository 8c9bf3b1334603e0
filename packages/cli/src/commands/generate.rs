use super::{file_label, resolve_path};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Map;
use std::fs;
use tessera_analyzer::format_error;
use tessera_document::BlockRegistry;
use tessera_generator::{BlockGenerator, GeneratorError};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// HTML fragment to turn into a block type
    pub input: String,

    /// Display name of the new block type
    #[arg(short, long)]
    pub name: String,

    /// Icon name (suggested from the markup when omitted)
    #[arg(short, long)]
    pub icon: Option<String>,

    /// Replace an existing block type with the same slug
    #[arg(long)]
    pub overwrite: bool,
}

pub fn generate(args: GenerateArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = resolve_path(cwd, &args.input);
    let source = fs::read_to_string(&input)?;

    let generator = BlockGenerator::new().with_limits(config.limits);
    let mut draft = match generator.analyze(&source, &args.name) {
        Ok(draft) => draft,
        Err(GeneratorError::Parse(err)) => {
            return Err(anyhow!("\n{}", format_error(&source, &file_label(&input), &err)));
        }
        Err(err) => return Err(err.into()),
    };
    if let Some(icon) = args.icon {
        draft.set_icon(icon);
    }

    println!(
        "{} {} ({})",
        "🧩 Generating block type".bright_blue().bold(),
        draft.name().bright_white(),
        draft.block_type()
    );
    for field in draft.fields() {
        println!("  {} {} ({:?}) = {}", "✓".green(), field.name, field.kind, field.default.dimmed());
    }

    let preview = draft.preview(&Map::new());
    for warning in &preview.warnings {
        println!("  {} {}", "⚠️".yellow(), warning);
    }

    let mut registry = config.load_registry(cwd)?;
    let definition = draft.save(&mut registry, args.overwrite)?;

    let mut stored = config.read_registry_file(cwd)?;
    stored.register(definition);
    config.write_registry_file(cwd, &stored)?;

    println!();
    println!(
        "{} Registered {} in {}",
        "✅".green(),
        draft.block_type(),
        config.get_registry_path(cwd).display()
    );
    Ok(())
}
