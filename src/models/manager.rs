use std::path::{Path, PathBuf};

use super::catalog::{ModelEntry, Profile};
use super::size::{total_size, SizeParseError};

const ARCHIVE_EXTENSION: &str = "zip";

/// Models that still need to be fetched for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub entries: Vec<&'static ModelEntry>,
    pub total_bytes: u64,
}

impl DownloadPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn model_ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.id).collect()
    }
}

/// Resolves catalog entries against a ComfyUI `models` directory.
pub struct ModelManager {
    root: PathBuf,
}

impl ModelManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path_for(&self, entry: &ModelEntry) -> PathBuf {
        self.root.join(entry.relative_path())
    }

    /// An archive also counts as installed once its extracted directory exists.
    #[must_use]
    pub fn is_installed(&self, entry: &ModelEntry) -> bool {
        let path = self.path_for(entry);
        if is_zip(&path) {
            return path.with_extension("").exists() || path.exists();
        }
        path.exists()
    }

    /// Members of `profile`, in order, paired with their install state.
    pub fn statuses(&self, profile: Profile) -> Vec<(&'static ModelEntry, bool)> {
        profile
            .entries()
            .iter()
            .map(|entry| (*entry, self.is_installed(entry)))
            .collect()
    }

    pub fn plan(&self, profile: Profile, force: bool) -> Result<DownloadPlan, SizeParseError> {
        let entries: Vec<&'static ModelEntry> = self
            .statuses(profile)
            .into_iter()
            .filter(|(_, installed)| force || !installed)
            .map(|(entry, _)| entry)
            .collect();
        let total_bytes = total_size(entries.iter().copied())?;
        Ok(DownloadPlan {
            entries,
            total_bytes,
        })
    }
}

#[must_use]
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
        .unwrap_or(false)
}
