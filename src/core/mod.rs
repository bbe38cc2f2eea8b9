pub mod prompt;
pub mod settings;

pub use prompt::{is_affirmative, Confirm, LineConfirm, CONFIRM_QUESTION};
pub use settings::{FileSettings, Settings, ENV_COMFYUI_PATH};
