use super::{file_label, resolve_path};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tessera_analyzer::{format_error, AnalysisReport, Analyzer};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// HTML file or directory of .html files
    pub input: String,

    /// Print the full analysis as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn analyze(args: AnalyzeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let analyzer = Analyzer::new().with_limits(config.limits);
    let input = resolve_path(cwd, &args.input);

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_html_files(&input)
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    if files.is_empty() {
        println!("{}", "⚠️  No .html files found".yellow());
        return Ok(());
    }

    let mut error_count = 0;
    for file in &files {
        let source = fs::read_to_string(file)?;
        match analyzer.analyze(&source) {
            Ok(report) if args.json => println!("{}", serde_json::to_string_pretty(&report)?),
            Ok(report) => print_report(file, &report),
            Err(err) => {
                error_count += 1;
                eprintln!("  {} {}", "✗".red(), file.display());
                eprintln!("{}", format_error(&source, &file_label(file), &err));
            }
        }
    }

    if error_count > 0 {
        return Err(anyhow!("{} of {} files failed to parse", error_count, files.len()));
    }
    Ok(())
}

fn print_report(file: &Path, report: &AnalysisReport) {
    println!("{} {}", "✓".green(), file.display().to_string().bold());
    println!(
        "   Elements: {}  Depth: {}",
        report.element_count, report.depth
    );
    if !report.css_classes.is_empty() {
        println!("   Classes:  {}", report.css_classes.join(" "));
    }
    for field in &report.content_fields {
        println!(
            "   {} {} ({:?}) = {}",
            "field".cyan(),
            field.name,
            field.kind,
            field.value.dimmed()
        );
    }
    for repeater in &report.repeaters {
        println!(
            "   {} {} x{} <{}>",
            "repeat".magenta(),
            repeater.name,
            repeater.element_ids.len(),
            repeater.tag
        );
    }
    println!();
}

pub(crate) fn find_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.is_file() && matches!(path.extension().and_then(|s| s.to_str()), Some("html" | "htm"))
        })
        .collect();
    files.sort();
    files
}
