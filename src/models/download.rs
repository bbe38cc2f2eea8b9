use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use thiserror::Error;

use crate::output::Console;

const HUGGINGFACE_PREFIX: &str = "https://huggingface.co/";
const HUGGINGFACE_HOST: &str = "huggingface.co";
const HUGGINGFACE_FILE_SEGMENT: &str = "/resolve/main/";
const CHUNK_SIZE: usize = 32 * 1024;

/// Byte counts reported while a transfer is in flight.
pub type ProgressFn<'a> = dyn FnMut(u64, Option<u64>) + 'a;

/// One way of getting `url` onto disk at `dest`.
pub trait FetchStrategy {
    fn name(&self) -> &'static str;

    fn applies_to(&self, _url: &str) -> bool {
        true
    }

    fn fetch(&self, url: &str, dest: &Path, progress: &mut ProgressFn<'_>) -> Result<()>;
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{program} could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

fn run_tool(program: &Path, args: &[String]) -> Result<(), ToolError> {
    let program_name = program.display().to_string();
    tracing::debug!(program = %program_name, ?args, "running download tool");
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| ToolError::Spawn {
            program: program_name.clone(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed {
            program: program_name,
            status,
        })
    }
}

/// Pulls Hugging Face hosted files through `huggingface-cli`.
pub struct HuggingFaceCli {
    program: PathBuf,
}

impl HuggingFaceCli {
    pub fn new() -> Self {
        Self::with_program("huggingface-cli")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for HuggingFaceCli {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchStrategy for HuggingFaceCli {
    fn name(&self) -> &'static str {
        "huggingface-cli"
    }

    fn applies_to(&self, url: &str) -> bool {
        url.contains(HUGGINGFACE_HOST)
    }

    fn fetch(&self, url: &str, dest: &Path, _progress: &mut ProgressFn<'_>) -> Result<()> {
        let repo = huggingface_repo_id(url)
            .ok_or_else(|| anyhow!("cannot derive repository id from {url}"))?;
        let local_dir = dest
            .parent()
            .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
        let file_name = dest
            .file_name()
            .ok_or_else(|| anyhow!("destination has no file name: {}", dest.display()))?;
        let args = vec![
            "download".to_string(),
            "--local-dir".to_string(),
            local_dir.display().to_string(),
            repo,
            "--include".to_string(),
            file_name.to_string_lossy().into_owned(),
        ];
        run_tool(&self.program, &args)?;
        Ok(())
    }
}

/// Repository id of a `https://huggingface.co/<repo>/resolve/main/<file>` URL.
#[must_use]
pub fn huggingface_repo_id(url: &str) -> Option<String> {
    let rest = url.strip_prefix(HUGGINGFACE_PREFIX).unwrap_or(url);
    let repo = match rest.find(HUGGINGFACE_FILE_SEGMENT) {
        Some(index) => &rest[..index],
        None => rest,
    };
    let repo = repo.split_whitespace().next()?;
    Some(repo.to_string())
}

/// Generic `wget` download straight to the destination file.
pub struct Wget {
    program: PathBuf,
}

impl Wget {
    pub fn new() -> Self {
        Self::with_program("wget")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Wget {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchStrategy for Wget {
    fn name(&self) -> &'static str {
        "wget"
    }

    fn fetch(&self, url: &str, dest: &Path, _progress: &mut ProgressFn<'_>) -> Result<()> {
        let args = vec![
            "-O".to_string(),
            dest.display().to_string(),
            "--progress=bar:force".to_string(),
            url.to_string(),
        ];
        run_tool(&self.program, &args)?;
        Ok(())
    }
}

/// Built-in HTTP retrieval used when no external tool worked.
pub struct DirectHttp {
    client: Client,
}

impl DirectHttp {
    pub fn new() -> Result<Self> {
        let client = Client::builder().build().context("create http client")?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl FetchStrategy for DirectHttp {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn fetch(&self, url: &str, dest: &Path, progress: &mut ProgressFn<'_>) -> Result<()> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request {url}"))?
            .error_for_status()
            .with_context(|| format!("download {url}"))?;
        let total = response.content_length();

        let mut file =
            File::create(dest).with_context(|| format!("create {}", dest.display()))?;
        let mut downloaded = 0u64;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let read = response.read(&mut buffer).context("read download chunk")?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .context("write download chunk")?;
            downloaded += read as u64;
            progress(downloaded, total);
        }
        file.flush().context("flush download")?;
        Ok(())
    }
}

/// Ordered fallback chain of fetch strategies.
pub struct Downloader {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl Downloader {
    /// `huggingface-cli`, then `wget`, then direct HTTP.
    pub fn standard() -> Result<Self> {
        Ok(Self::new(vec![
            Box::new(HuggingFaceCli::new()),
            Box::new(Wget::new()),
            Box::new(DirectHttp::new()?),
        ]))
    }

    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Returns whether any strategy delivered the file.
    pub fn download<W: Write>(
        &self,
        url: &str,
        dest: &Path,
        label: &str,
        console: &mut Console<W>,
    ) -> bool {
        console.download_header(label, url, dest);
        match self.try_download(url, dest, console) {
            Ok(strategy) => {
                tracing::info!(%url, strategy, "download finished");
                true
            }
            Err(error) => {
                console.download_error(&error);
                false
            }
        }
    }

    fn try_download<W: Write>(
        &self,
        url: &str,
        dest: &Path,
        console: &mut Console<W>,
    ) -> Result<&'static str> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }

        let mut last_error = None;
        for strategy in self.strategies.iter().filter(|s| s.applies_to(url)) {
            let result = strategy.fetch(url, dest, &mut |downloaded, total| {
                console.progress(downloaded, total)
            });
            match result {
                Ok(()) => {
                    console.progress_done();
                    return Ok(strategy.name());
                }
                Err(error) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        "download strategy failed, trying next: {error:#}"
                    );
                    last_error = Some(error);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow!("no download strategy accepts {url}")))
    }
}
