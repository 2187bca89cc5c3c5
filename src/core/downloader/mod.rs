pub mod client;

pub use client::{HttpFetcher, PackageFetcher, DOWNLOAD_CHUNK_SIZE};
