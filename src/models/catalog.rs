use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelCategory {
    Checkpoints,
    Vae,
    Loras,
    AnimatediffModels,
    Sadtalker,
}

impl ModelCategory {
    #[must_use]
    pub fn dir_name(&self) -> &'static str {
        match self {
            ModelCategory::Checkpoints => "checkpoints",
            ModelCategory::Vae => "vae",
            ModelCategory::Loras => "loras",
            ModelCategory::AnimatediffModels => "animatediff_models",
            ModelCategory::Sadtalker => "sadtalker",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: &'static str,
    pub url: &'static str,
    pub category: ModelCategory,
    pub filename: &'static str,
    pub size: &'static str,
    pub description: &'static str,
    pub extract: bool,
}

impl ModelEntry {
    /// Location below the ComfyUI `models` directory.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.category.dir_name()).join(self.filename)
    }

    /// Profiles that list this entry, in declared profile order.
    #[must_use]
    pub fn profiles(&self) -> Vec<Profile> {
        Profile::ALL
            .into_iter()
            .filter(|profile| profile.entries().iter().any(|entry| entry.id == self.id))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    Minimal,
    Recommended,
    Full,
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Minimal
    }
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Minimal, Profile::Recommended, Profile::Full];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Profile::Minimal => "minimal",
            Profile::Recommended => "recommended",
            Profile::Full => "full",
        }
    }

    #[must_use]
    pub fn entries(&self) -> &'static [&'static ModelEntry] {
        match self {
            Profile::Minimal => MINIMAL,
            Profile::Recommended => RECOMMENDED,
            Profile::Full => FULL,
        }
    }

    #[must_use]
    pub fn model_ids(&self) -> Vec<&'static str> {
        self.entries().iter().map(|entry| entry.id).collect()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[must_use]
pub fn catalog() -> &'static [&'static ModelEntry] {
    FULL
}

#[must_use]
pub fn find(id: &str) -> Option<&'static ModelEntry> {
    FULL.iter().copied().find(|entry| entry.id == id)
}

static ANIMAGINE_XL_3_1: ModelEntry = ModelEntry {
    id: "animagine-xl-3.1",
    url: "https://huggingface.co/cagliostrolab/animagine-xl-3.1/resolve/main/animagine-xl-3.1.safetensors",
    category: ModelCategory::Checkpoints,
    filename: "animagine-xl-3.1.safetensors",
    size: "6.9GB",
    description: "High quality anime SDXL checkpoint",
    extract: false,
};

static ANYTHING_V5: ModelEntry = ModelEntry {
    id: "anything-v5",
    url: "https://huggingface.co/stablediffusionapi/anything-v5/resolve/main/anything-v5-PrtRE.safetensors",
    category: ModelCategory::Checkpoints,
    filename: "anything-v5.safetensors",
    size: "2.1GB",
    description: "Lightweight anime SD 1.5 checkpoint",
    extract: false,
};

static ANIMATEDIFF_LIGHTNING_4STEP: ModelEntry = ModelEntry {
    id: "animatediff-lightning-4step",
    url: "https://huggingface.co/ByteDance/AnimateDiff-Lightning/resolve/main/animatediff_lightning_4step_diffusers.safetensors",
    category: ModelCategory::AnimatediffModels,
    filename: "animatediff_lightning_4step.safetensors",
    size: "400MB",
    description: "Fast AnimateDiff motion module (4 step)",
    extract: false,
};

static ANIMATEDIFF_V3: ModelEntry = ModelEntry {
    id: "animatediff-v3",
    url: "https://huggingface.co/guoyww/animatediff/resolve/main/mm_sd_v15_v2.ckpt",
    category: ModelCategory::AnimatediffModels,
    filename: "mm_sd_v15_v2.ckpt",
    size: "1.8GB",
    description: "High quality AnimateDiff motion module",
    extract: false,
};

static SADTALKER_CHECKPOINTS: ModelEntry = ModelEntry {
    id: "sadtalker-checkpoints",
    url: "https://github.com/OpenTalker/SadTalker/releases/download/v0.0.2/checkpoints.zip",
    category: ModelCategory::Sadtalker,
    filename: "checkpoints.zip",
    size: "1.2GB",
    description: "SadTalker lip-sync checkpoints",
    extract: true,
};

static SDXL_VAE: ModelEntry = ModelEntry {
    id: "sdxl-vae",
    url: "https://huggingface.co/stabilityai/sdxl-vae/resolve/main/sdxl_vae.safetensors",
    category: ModelCategory::Vae,
    filename: "sdxl_vae.safetensors",
    size: "335MB",
    description: "SDXL VAE",
    extract: false,
};

static ANIME_LINEART_LORA: ModelEntry = ModelEntry {
    id: "anime-lineart-lora",
    url: "https://civitai.com/api/download/models/28907",
    category: ModelCategory::Loras,
    filename: "anime_lineart.safetensors",
    size: "150MB",
    description: "Anime line-art style LoRA",
    extract: false,
};

static MINIMAL: &[&ModelEntry] = &[
    &ANYTHING_V5,
    &ANIMATEDIFF_LIGHTNING_4STEP,
    &SADTALKER_CHECKPOINTS,
];

static RECOMMENDED: &[&ModelEntry] = &[
    &ANIMAGINE_XL_3_1,
    &ANIMATEDIFF_V3,
    &SADTALKER_CHECKPOINTS,
    &SDXL_VAE,
];

static FULL: &[&ModelEntry] = &[
    &ANIMAGINE_XL_3_1,
    &ANYTHING_V5,
    &ANIMATEDIFF_LIGHTNING_4STEP,
    &ANIMATEDIFF_V3,
    &SADTALKER_CHECKPOINTS,
    &SDXL_VAE,
    &ANIME_LINEART_LORA,
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn identifiers_are_unique() {
        let ids: HashSet<_> = catalog().iter().map(|entry| entry.id).collect();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn full_profile_is_whole_catalog() {
        let full: HashSet<_> = Profile::Full.model_ids().into_iter().collect();
        let all: HashSet<_> = catalog().iter().map(|entry| entry.id).collect();
        assert_eq!(full, all);
    }

    #[test]
    fn profiles_keep_declared_order() {
        assert_eq!(
            Profile::Minimal.model_ids(),
            vec![
                "anything-v5",
                "animatediff-lightning-4step",
                "sadtalker-checkpoints"
            ]
        );
        assert_eq!(
            Profile::Recommended.model_ids(),
            vec![
                "animagine-xl-3.1",
                "animatediff-v3",
                "sadtalker-checkpoints",
                "sdxl-vae"
            ]
        );
    }

    #[test]
    fn membership_overlaps() {
        let sadtalker = find("sadtalker-checkpoints").expect("catalog entry");
        assert_eq!(sadtalker.profiles(), Profile::ALL.to_vec());

        let lora = find("anime-lineart-lora").expect("catalog entry");
        assert_eq!(lora.profiles(), vec![Profile::Full]);
    }

    #[test]
    fn relative_path_uses_category_dir() {
        let vae = find("sdxl-vae").expect("catalog entry");
        assert_eq!(vae.relative_path(), PathBuf::from("vae/sdxl_vae.safetensors"));
        assert!(find("missing").is_none());
    }

    #[test]
    fn only_zip_entries_are_archive_flagged() {
        for entry in catalog() {
            if entry.extract {
                assert!(entry.filename.ends_with(".zip"), "{}", entry.id);
            }
        }
    }
}
