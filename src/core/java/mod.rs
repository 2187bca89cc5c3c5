pub mod discovery;
pub mod version;

pub use discovery::{Candidate, Discovery, DiscoveryStatus, RuntimeDiscovery, SourceKind};
pub use version::{Thresholds, Version, JAVA_11, JAVA_8};
