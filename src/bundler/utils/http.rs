//! HTTP utilities for downloading upstream archives.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// User agent sent with every request; GitHub rejects anonymous clients.
pub const USER_AGENT: &str = concat!("pdfium-xcframework/", env!("CARGO_PKG_VERSION"));

/// Builds the shared HTTP client.
pub fn client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Downloads `url` into `dest`, streaming the body to disk.
///
/// A single attempt is made; a non-success status is an error.
/// Returns the number of bytes written.
pub async fn download_to_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64> {
    log::info!("Downloading {}", url);

    let mut response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::DownloadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating download directory", parent)?;
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .fs_context("creating download file", dest)?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .fs_context("writing download file", dest)?;
        written += chunk.len() as u64;
    }
    file.flush().await.fs_context("flushing download file", dest)?;

    log::debug!("Downloaded {} bytes to {}", written, dest.display());
    Ok(written)
}
