pub mod extract;
pub mod installer;

pub use extract::{ArchiveExtractor, Extractor, ExternalArchiver, ZipExtractor};
pub use installer::{RuntimeInstallRequest, RuntimeInstaller, single_top_level_dir};
