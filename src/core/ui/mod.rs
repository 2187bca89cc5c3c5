pub mod dialog;
pub mod messages;

pub use dialog::{help_url, resolve_help_url, show_runtime_missing};
pub use messages::{runtime_missing, Language, RuntimeMissingText};
