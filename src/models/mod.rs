pub mod catalog;
mod download;
mod extract;
mod manager;
mod service;
mod size;

pub use catalog::{ModelCategory, ModelEntry, Profile};
pub use download::{
    huggingface_repo_id, DirectHttp, Downloader, FetchStrategy, HuggingFaceCli, ProgressFn,
    ToolError, Wget,
};
pub use extract::extract_zip;
pub use manager::{is_zip, DownloadPlan, ModelManager};
pub use service::{list_models, InstallOutcome, InstallReport, InstallService};
pub use size::{format_gib, parse_size, total_size, SizeParseError};
