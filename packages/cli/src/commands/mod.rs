pub mod analyze;
pub mod compile;
pub mod generate;
pub mod init;
pub mod preview;

pub use analyze::{analyze, AnalyzeArgs};
pub use compile::{compile, CompileArgs};
pub use generate::{generate, GenerateArgs};
pub use init::{init, InitArgs};
pub use preview::{preview, PreviewArgs};

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tessera_document::Breakpoint;

/// Resolve a command-line path against the working directory
pub(crate) fn resolve_path(cwd: &str, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

pub(crate) fn parse_viewport(viewport: &str) -> Result<Breakpoint> {
    match viewport {
        "desktop" => Ok(Breakpoint::Desktop),
        "tablet" => Ok(Breakpoint::Tablet),
        "mobile" => Ok(Breakpoint::Mobile),
        other => Err(anyhow!(
            "Invalid viewport: {}. Use: desktop, tablet, or mobile",
            other
        )),
    }
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
