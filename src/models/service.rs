use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::core::{Confirm, CONFIRM_QUESTION};
use crate::output::Console;

use super::{
    download::Downloader, extract::extract_zip, is_zip, DownloadPlan, ModelManager, Profile,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub succeeded: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled,
    Cancelled,
    Completed(InstallReport),
}

/// Plans, confirms, downloads and reports one profile install.
pub struct InstallService<'a, C, W: Write> {
    manager: &'a ModelManager,
    downloader: &'a Downloader,
    confirm: C,
    console: &'a mut Console<W>,
}

impl<'a, C, W> InstallService<'a, C, W>
where
    C: Confirm,
    W: Write,
{
    pub fn new(
        manager: &'a ModelManager,
        downloader: &'a Downloader,
        confirm: C,
        console: &'a mut Console<W>,
    ) -> Self {
        Self {
            manager,
            downloader,
            confirm,
            console,
        }
    }

    pub fn run(
        &mut self,
        profile: Profile,
        comfyui_path: &Path,
        force: bool,
    ) -> Result<InstallOutcome> {
        self.console.banner(profile, comfyui_path);
        for (entry, installed) in self.manager.statuses(profile) {
            self.console.model_status(entry, installed);
        }

        let plan = self.manager.plan(profile, force)?;
        if plan.is_empty() {
            self.console.all_installed();
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        self.console.plan_summary(plan.len(), plan.total_bytes);
        self.console.prompt(CONFIRM_QUESTION);
        if !self.confirm.confirm(&plan)? {
            tracing::info!(%profile, "download cancelled by user");
            self.console.cancelled();
            return Ok(InstallOutcome::Cancelled);
        }

        let report = self.download_all(&plan);
        self.console.report(&report);
        Ok(InstallOutcome::Completed(report))
    }

    fn download_all(&mut self, plan: &DownloadPlan) -> InstallReport {
        let mut report = InstallReport::default();
        for entry in &plan.entries {
            let dest = self.manager.path_for(entry);
            if !self
                .downloader
                .download(entry.url, &dest, entry.description, &mut *self.console)
            {
                tracing::warn!(model = entry.id, "download failed");
                report.failed.push(entry.id);
                continue;
            }

            // Extraction problems are reported but the download still counts.
            if entry.extract && is_zip(&dest) {
                match extract_zip(&dest) {
                    Ok(files) => self.console.extracted(&dest, files),
                    Err(error) => {
                        tracing::warn!(model = entry.id, "extraction failed: {error:#}");
                        self.console.extract_error(&error);
                    }
                }
            }
            report.succeeded.push(entry.id);
        }
        report
    }
}

/// Prints every profile with the install state of its members.
pub fn list_models<W: Write>(manager: &ModelManager, console: &mut Console<W>) {
    console.listing_header();
    for profile in Profile::ALL {
        console.listing_profile(profile);
        for (entry, installed) in manager.statuses(profile) {
            console.listing_entry(entry, installed);
        }
    }
}
