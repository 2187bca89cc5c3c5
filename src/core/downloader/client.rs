use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// Size of the write buffer the response body is streamed through.
pub const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Fetches a package to a local file and returns the number of bytes written.
#[async_trait]
pub trait PackageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> LauncherResult<u64>;
}

/// Streams an HTTPS response body straight to disk.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self {
            client: build_http_client()?,
        })
    }
}

#[async_trait]
impl PackageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> LauncherResult<u64> {
        info!("Downloading {} -> {:?}", url, dest);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let expected = response.content_length();

        let write_err = |source: std::io::Error| LauncherError::DownloadWrite {
            path: dest.to_path_buf(),
            source,
        };

        let mut written = 0u64;
        // The handle is dropped at the end of this block, before the caller
        // touches the file again.
        {
            let file = tokio::fs::File::create(dest).await.map_err(write_err)?;
            let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                writer.write_all(&chunk).await.map_err(write_err)?;
                written = written.saturating_add(chunk.len() as u64);
            }
            writer.flush().await.map_err(write_err)?;
        }

        debug!(
            "Downloaded {} bytes from {} (announced {:?})",
            written, url, expected
        );
        Ok(written)
    }
}
