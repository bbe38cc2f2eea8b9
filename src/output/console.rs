use std::io::{self, Write};
use std::path::Path;

use crate::models::{format_gib, InstallReport, ModelEntry, Profile};

const RULE_WIDTH: usize = 60;
const URL_PREVIEW_CHARS: usize = 80;
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Everything the user sees on stdout goes through here.
///
/// Write failures on the console are ignored: a closed stdout must not turn
/// into a failed download.
pub struct Console<W: Write> {
    out: W,
    progress_open: bool,
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            progress_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self, profile: Profile, comfyui_path: &Path) {
        let rule = "#".repeat(RULE_WIDTH);
        let _ = writeln!(self.out, "\n{rule}");
        let _ = writeln!(self.out, "# Anime Maker - model download");
        let _ = writeln!(self.out, "# Profile: {profile}");
        let _ = writeln!(self.out, "# ComfyUI path: {}", comfyui_path.display());
        let _ = writeln!(self.out, "{rule}");
        let _ = writeln!(self.out, "\n[Model status]");
    }

    pub fn model_status(&mut self, entry: &ModelEntry, installed: bool) {
        let status = if installed { "✅ installed" } else { "❌ missing" };
        let _ = writeln!(self.out, "  {}: {} ({})", entry.id, status, entry.size);
    }

    pub fn all_installed(&mut self) {
        let _ = writeln!(self.out, "\nAll models are already installed.");
    }

    pub fn plan_summary(&mut self, count: usize, total_bytes: u64) {
        let _ = writeln!(self.out, "\nModels to download: {count}");
        let _ = writeln!(self.out, "Required space: {}", format_gib(total_bytes));
    }

    pub fn cancelled(&mut self) {
        let _ = writeln!(self.out, "Cancelled");
    }

    pub fn download_header(&mut self, label: &str, url: &str, dest: &Path) {
        let rule = "=".repeat(RULE_WIDTH);
        let preview: String = url.chars().take(URL_PREVIEW_CHARS).collect();
        let _ = writeln!(self.out, "\n{rule}");
        let _ = writeln!(self.out, "Downloading: {label}");
        let _ = writeln!(self.out, "URL: {preview}...");
        let _ = writeln!(self.out, "Saving to: {}", dest.display());
        let _ = writeln!(self.out, "{rule}");
        let _ = self.out.flush();
    }

    /// Rewrites the single progress line in place.
    pub fn progress(&mut self, downloaded: u64, total: Option<u64>) {
        let _ = write!(
            self.out,
            "\rProgress: {}% ({:.1}MB)",
            percent(downloaded, total),
            downloaded as f64 / BYTES_PER_MIB
        );
        let _ = self.out.flush();
        self.progress_open = true;
    }

    pub fn progress_done(&mut self) {
        if self.progress_open {
            let _ = writeln!(self.out, "\nDone!");
            self.progress_open = false;
        }
    }

    pub fn download_error(&mut self, error: &anyhow::Error) {
        self.close_progress_line();
        let _ = writeln!(self.out, "\nError: {error:#}");
    }

    pub fn extracted(&mut self, archive: &Path, files: usize) {
        let _ = writeln!(
            self.out,
            "Extracted {files} files from {}",
            archive.display()
        );
    }

    pub fn extract_error(&mut self, error: &anyhow::Error) {
        let _ = writeln!(self.out, "Extraction error: {error:#}");
    }

    pub fn report(&mut self, report: &InstallReport) {
        let rule = "=".repeat(RULE_WIDTH);
        let _ = writeln!(self.out, "\n{rule}");
        let _ = writeln!(self.out, "Download finished!");
        let _ = writeln!(self.out, "Succeeded: {}", report.succeeded.len());
        if !report.failed.is_empty() {
            let _ = writeln!(
                self.out,
                "Failed: {} - {}",
                report.failed.len(),
                report.failed.join(", ")
            );
        }
        let _ = writeln!(self.out, "{rule}");
    }

    pub fn listing_header(&mut self) {
        let _ = writeln!(self.out, "\n[Available models]");
        let _ = writeln!(self.out, "{}", "-".repeat(80));
    }

    pub fn listing_profile(&mut self, profile: Profile) {
        let _ = writeln!(
            self.out,
            "\n{} profile:",
            profile.name().to_uppercase()
        );
    }

    pub fn listing_entry(&mut self, entry: &ModelEntry, installed: bool) {
        let marker = if installed { "✅" } else { "❌" };
        let _ = writeln!(
            self.out,
            "  {marker} {}: {} ({})",
            entry.id, entry.description, entry.size
        );
    }

    pub fn prompt(&mut self, question: &str) {
        let _ = write!(self.out, "\n{question}");
        let _ = self.out.flush();
    }

    fn close_progress_line(&mut self) {
        if self.progress_open {
            let _ = writeln!(self.out);
            self.progress_open = false;
        }
    }
}

/// Whole-percent progress, 0 when the total is unknown.
#[must_use]
pub fn percent(downloaded: u64, total: Option<u64>) -> u64 {
    match total {
        Some(total) if total > 0 => downloaded.saturating_mul(100) / total,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog;

    fn rendered(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).expect("utf8 console output")
    }

    #[test]
    fn percent_guards_unknown_total() {
        assert_eq!(percent(50, Some(200)), 25);
        assert_eq!(percent(50, Some(0)), 0);
        assert_eq!(percent(50, None), 0);
    }

    #[test]
    fn progress_rewrites_one_line() {
        let mut console = Console::new(Vec::new());
        console.progress(1024 * 1024, Some(4 * 1024 * 1024));
        console.progress(4 * 1024 * 1024, Some(4 * 1024 * 1024));
        console.progress_done();
        let text = rendered(console);
        assert_eq!(
            text,
            "\rProgress: 25% (1.0MB)\rProgress: 100% (4.0MB)\nDone!\n"
        );
    }

    #[test]
    fn report_lists_failures() {
        let mut console = Console::new(Vec::new());
        console.report(&InstallReport {
            succeeded: vec!["a"],
            failed: vec!["b", "c"],
        });
        let text = rendered(console);
        assert!(text.contains("Succeeded: 1"));
        assert!(text.contains("Failed: 2 - b, c"));
    }

    #[test]
    fn report_omits_empty_failures() {
        let mut console = Console::new(Vec::new());
        console.report(&InstallReport {
            succeeded: vec!["a"],
            failed: vec![],
        });
        assert!(!rendered(console).contains("Failed"));
    }

    #[test]
    fn listing_entry_shows_marker_and_size() {
        let entry = catalog::find("sdxl-vae").expect("catalog entry");
        let mut console = Console::new(Vec::new());
        console.listing_entry(entry, false);
        assert_eq!(rendered(console), "  ❌ sdxl-vae: SDXL VAE (335MB)\n");
    }
}
