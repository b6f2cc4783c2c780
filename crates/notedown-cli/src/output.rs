//! Output formatting for CLI
//!
//! Provides consistent output formatting:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use notedown_core::{Config, ExportSummary};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the result of an export run
    pub fn print_summary(&self, summary: &ExportSummary, config: &Config) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "Export complete: {} file(s) saved to {}",
                    summary.files_written.len(),
                    config.output_dir.display()
                );
                for filename in &summary.files_written {
                    println!("  - {}", filename);
                }
                if summary.pages_skipped > 0 {
                    println!("{} page(s) skipped due to errors", summary.pages_skipped);
                }
                println!(
                    "Metadata index ({} entries): {}",
                    summary.index_entries,
                    config.metadata_file.display()
                );
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "files_written": summary.files_written,
                        "pages_skipped": summary.pages_skipped,
                        "index_entries": summary.index_entries,
                        "output_dir": config.output_dir,
                        "metadata_file": config.metadata_file,
                    })
                );
            }
            OutputFormat::Quiet => {
                for filename in &summary.files_written {
                    println!("{}", filename);
                }
            }
        }
    }
}
