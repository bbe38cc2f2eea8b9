use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::models::Profile;

pub const ENV_COMFYUI_PATH: &str = "COMFYUI_PATH";
const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_COMFYUI_DIR: &str = "ComfyUI";
const MODELS_DIR: &str = "models";

/// Optional defaults read from the user's config directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FileSettings {
    pub comfyui_path: Option<PathBuf>,
    pub profile: Option<Profile>,
}

/// Where models go and which profile to use when the CLI is silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub comfyui_path: PathBuf,
    pub profile: Profile,
}

impl Settings {
    /// Path precedence: flag, `COMFYUI_PATH`, settings file, `~/ComfyUI`.
    pub fn resolve(cli_path: Option<PathBuf>, cli_profile: Option<Profile>) -> Result<Self> {
        let file = match settings_path() {
            Some(_) if cli_path.is_some() && cli_profile.is_some() => FileSettings::default(),
            Some(path) => read_file_settings(&path),
            None => FileSettings::default(),
        };
        let env_path = std::env::var_os(ENV_COMFYUI_PATH)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::from_sources(cli_path, cli_profile, env_path, file, default_comfyui_path())
    }

    fn from_sources(
        cli_path: Option<PathBuf>,
        cli_profile: Option<Profile>,
        env_path: Option<PathBuf>,
        file: FileSettings,
        fallback: Option<PathBuf>,
    ) -> Result<Self> {
        let comfyui_path = cli_path
            .or(env_path)
            .or(file.comfyui_path)
            .or(fallback)
            .context("cannot determine the ComfyUI directory; pass --comfyui-path")?;
        Ok(Self {
            comfyui_path,
            profile: cli_profile.or(file.profile).unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn models_dir(&self) -> PathBuf {
        self.comfyui_path.join(MODELS_DIR)
    }
}

fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "AnimeMaker", "download-models")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

fn default_comfyui_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(DEFAULT_COMFYUI_DIR))
}

/// A broken settings file only costs its defaults.
fn read_file_settings(path: &Path) -> FileSettings {
    load_file_settings(path).unwrap_or_else(|error| {
        tracing::warn!("ignoring settings file: {error:#}");
        FileSettings::default()
    })
}

fn load_file_settings(path: &Path) -> Result<FileSettings> {
    if !path.exists() {
        return Ok(FileSettings::default());
    }
    let bytes = fs::read(path).with_context(|| format!("failed reading {path:?}"))?;
    let parsed = serde_json::from_slice(&bytes)
        .with_context(|| format!("settings file {path:?} could not be parsed"))?;
    tracing::debug!(?path, "loaded settings file");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: Option<&str>, profile: Option<Profile>) -> FileSettings {
        FileSettings {
            comfyui_path: path.map(PathBuf::from),
            profile,
        }
    }

    #[test]
    fn flag_beats_everything() {
        let settings = Settings::from_sources(
            Some("/flag".into()),
            None,
            Some("/env".into()),
            file(Some("/file"), None),
            Some("/home/u/ComfyUI".into()),
        )
        .unwrap();
        assert_eq!(settings.comfyui_path, PathBuf::from("/flag"));
        assert_eq!(settings.models_dir(), PathBuf::from("/flag/models"));
    }

    #[test]
    fn env_then_file_then_home() {
        let env = Settings::from_sources(
            None,
            None,
            Some("/env".into()),
            file(Some("/file"), None),
            Some("/home/u/ComfyUI".into()),
        )
        .unwrap();
        assert_eq!(env.comfyui_path, PathBuf::from("/env"));

        let from_file = Settings::from_sources(
            None,
            None,
            None,
            file(Some("/file"), None),
            Some("/home/u/ComfyUI".into()),
        )
        .unwrap();
        assert_eq!(from_file.comfyui_path, PathBuf::from("/file"));

        let home = Settings::from_sources(
            None,
            None,
            None,
            FileSettings::default(),
            Some("/home/u/ComfyUI".into()),
        )
        .unwrap();
        assert_eq!(home.comfyui_path, PathBuf::from("/home/u/ComfyUI"));
    }

    #[test]
    fn no_path_source_is_an_error() {
        assert!(
            Settings::from_sources(None, None, None, FileSettings::default(), None).is_err()
        );
    }

    #[test]
    fn profile_defaults_to_minimal() {
        let settings = Settings::from_sources(
            Some("/x".into()),
            None,
            None,
            file(None, Some(Profile::Full)),
            None,
        )
        .unwrap();
        assert_eq!(settings.profile, Profile::Full);

        let cli = Settings::from_sources(
            Some("/x".into()),
            Some(Profile::Recommended),
            None,
            file(None, Some(Profile::Full)),
            None,
        )
        .unwrap();
        assert_eq!(cli.profile, Profile::Recommended);

        let bare =
            Settings::from_sources(Some("/x".into()), None, None, FileSettings::default(), None)
                .unwrap();
        assert_eq!(bare.profile, Profile::Minimal);
    }

    #[test]
    fn reads_camel_case_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            br#"{ "comfyuiPath": "/opt/ComfyUI", "profile": "recommended" }"#,
        )
        .unwrap();
        let parsed = load_file_settings(&path).unwrap();
        assert_eq!(parsed, file(Some("/opt/ComfyUI"), Some(Profile::Recommended)));
    }

    #[test]
    fn missing_settings_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = load_file_settings(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(parsed, FileSettings::default());
    }

    #[test]
    fn malformed_settings_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, b"{ not json").unwrap();
        assert!(load_file_settings(&path).is_err());
        assert_eq!(read_file_settings(&path), FileSettings::default());
    }

    #[test]
    fn readable_settings_file_survives_lenient_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, br#"{ "profile": "full" }"#).unwrap();
        assert_eq!(read_file_settings(&path), file(None, Some(Profile::Full)));
    }
}
