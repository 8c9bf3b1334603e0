use super::{parse_viewport, resolve_path};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use tessera_compiler_html::{render_preview, PreviewOptions};
use tessera_document::Document;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Document JSON file
    pub document: String,

    /// Viewport (desktop, tablet, mobile); defaults to the configured one
    #[arg(short, long)]
    pub viewport: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,

    /// Wrap the page in a sandboxed iframe of the viewport's width
    #[arg(long)]
    pub frame: bool,

    /// Pretty print block markup
    #[arg(long)]
    pub pretty: bool,
}

pub fn preview(args: PreviewArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.load_registry(cwd)?;
    let theme = config.load_theme(cwd)?;
    let variables = config.variable_source();
    let viewport = match args.viewport.as_deref() {
        Some(viewport) => parse_viewport(viewport)?,
        None => config.default_viewport,
    };

    let source = fs::read_to_string(resolve_path(cwd, &args.document))?;
    let document = Document::from_json(&source)?.with_limits(config.limits);

    let options = PreviewOptions {
        viewport,
        theme: &theme,
        variables: &variables,
        pretty: args.pretty,
    };
    let page = render_preview(&document, &registry, &options);

    for diagnostic in &page.diagnostics {
        eprintln!("  {} {}", "⚠️".yellow(), diagnostic);
    }

    let output = if args.frame { page.iframe() } else { page.html.clone() };
    match args.out {
        Some(out) => {
            let path = resolve_path(cwd, &out);
            fs::write(&path, output)?;
            eprintln!(
                "{} Preview ({}, {}px) → {}",
                "✅".green(),
                viewport,
                viewport.preview_width(),
                path.display()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}
