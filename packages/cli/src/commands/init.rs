use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

const EXAMPLE_THEME: &str = "body {\n  font-family: system-ui, sans-serif;\n}\n";

const EXAMPLE_DOCUMENT: &str = r#"{
  "blocks": []
}
"#;

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!("{} {} already exists", "⚠️".yellow(), DEFAULT_CONFIG_NAME.bright_white());
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Tessera project...".bright_blue().bold());

    let theme_dir = PathBuf::from(cwd).join("theme");
    if !theme_dir.exists() {
        fs::create_dir_all(&theme_dir)?;
        println!("  {} Created theme/", "✓".green());
    }

    let theme_file = theme_dir.join("theme.css");
    if !theme_file.exists() {
        fs::write(&theme_file, EXAMPLE_THEME)?;
        println!("  {} Created theme/theme.css", "✓".green());
    }

    let document_file = PathBuf::from(cwd).join("document.json");
    if !document_file.exists() {
        fs::write(&document_file, EXAMPLE_DOCUMENT)?;
        println!("  {} Created document.json", "✓".green());
    }

    let config = Config {
        theme_css: vec!["theme/theme.css".to_string()],
        variables: BTreeMap::from([(
            "product".to_string(),
            BTreeMap::from([("name".to_string(), "Sample product".to_string())]),
        )]),
        ..Config::default()
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: tessera generate section.html --name \"My section\"");
    println!("  2. Run: tessera compile document.json");
    println!("  3. Run: tessera preview document.json --out preview.html");

    Ok(())
}
