use super::resolve_path;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use tessera_compiler_html::{compile_with_options, CompileOptions};
use tessera_document::{Document, InMemoryRegistry};
use tessera_editor::{EditSession, EditorError};

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Document JSON file
    pub document: String,

    /// Write the updated document here instead of in place
    #[arg(short, long)]
    pub out: Option<String>,

    /// Minify generated CSS
    #[arg(long)]
    pub minify: bool,
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.load_registry(cwd)?;
    let input = resolve_path(cwd, &args.document);

    println!("{}", "🔨 Compiling document...".bright_blue().bold());

    let source = fs::read_to_string(&input)?;
    let document = Document::from_json(&source)?.with_limits(config.limits);
    let document = freeze_all(document, registry, args.minify)?;

    for block in document.blocks() {
        let bytes = block.compiled_html.as_ref().map_or(0, String::len);
        println!("  {} {} ({}) {} bytes", "✓".green(), block.id, block.block_type, bytes);
    }

    let output = args.out.as_deref().map_or(input.clone(), |out| resolve_path(cwd, out));
    fs::write(&output, document.to_json()?)?;

    println!();
    println!(
        "{} Compiled {} blocks → {}",
        "✅".green(),
        document.len(),
        output.display()
    );
    Ok(())
}

/// Commit the block being edited (and any other unlocked block) so every
/// block carries an up to date cache
pub(crate) fn freeze_all(document: Document, registry: InMemoryRegistry, minify: bool) -> Result<Document> {
    let mut session = EditSession::new(document, registry)?;
    match session.freeze_active(true) {
        Ok(()) | Err(EditorError::NoActiveBlock) => {}
        Err(err) => return Err(err.into()),
    }
    let mut document = session.into_document();

    let options = CompileOptions {
        minify_css: minify,
        ..CompileOptions::default()
    };
    for index in 0..document.len() {
        if let Some(block) = document.block_mut(index) {
            if let Some(tree) = &block.document {
                if minify || block.compiled_html.is_none() {
                    block.compiled_html = Some(compile_with_options(&block.id, tree, &options).cache_string());
                }
            }
        }
    }
    Ok(document)
}
