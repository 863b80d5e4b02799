//! Upstream archive retrieval.
//!
//! An [`ArchiveSource`] places the extracted contents of one configuration's
//! archive into a directory. The production source downloads gzip tarballs from
//! the upstream GitHub release; tests substitute their own sources.

use crate::bundler::{
    BuildConfig, Settings,
    error::{Context, ErrorExt, Result},
    utils::{fs, http},
};
use flate2::read::GzDecoder;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Provides extracted archive trees for build configurations.
pub trait ArchiveSource: Send + Sync + 'static {
    /// Fetch and extract the archive for `config` into `dest_dir`.
    ///
    /// `dest_dir` is created by the caller and is exclusive to this call.
    fn fetch(
        &self,
        config: &BuildConfig,
        dest_dir: &Path,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Downloads archives from the upstream GitHub release for a tag.
#[derive(Debug, Clone)]
pub struct GithubReleaseSource {
    client: reqwest::Client,
    settings: Settings,
}

impl GithubReleaseSource {
    /// Create a source for the tag in `settings`.
    pub fn new(client: reqwest::Client, settings: Settings) -> Self {
        Self { client, settings }
    }
}

impl ArchiveSource for GithubReleaseSource {
    async fn fetch(&self, config: &BuildConfig, dest_dir: &Path) -> Result<()> {
        let url = self.settings.archive_url(config)?;
        let archive_path = dest_dir.join(config.archive_name());

        http::download_to_file(&self.client, url.as_str(), &archive_path)
            .await
            .with_context(|| format!("downloading {}", config.archive_name()))?;

        extract_tgz(&archive_path, dest_dir)
            .await
            .with_context(|| format!("extracting {}", config.archive_name()))?;

        tokio::fs::remove_file(&archive_path)
            .await
            .fs_context("removing downloaded archive", &archive_path)?;
        Ok(())
    }
}

/// Reads archives already present on disk (`<dir>/pdfium-<key>.tgz`).
///
/// Useful for offline rebuilds against a mirrored release.
#[derive(Debug, Clone)]
pub struct LocalArchiveSource {
    dir: PathBuf,
}

impl LocalArchiveSource {
    /// Create a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArchiveSource for LocalArchiveSource {
    async fn fetch(&self, config: &BuildConfig, dest_dir: &Path) -> Result<()> {
        let archive_path = self.dir.join(config.archive_name());
        log::info!("Using local archive {}", archive_path.display());
        extract_tgz(&archive_path, dest_dir)
            .await
            .with_context(|| format!("extracting {}", archive_path.display()))
    }
}

/// Extracts a `.tgz` archive into `dest`, preserving symlinks.
pub async fn extract_tgz(archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest, false).await?;

    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::open(&archive).fs_context("opening archive", &archive)?;
        let mut tarball = tar::Archive::new(GzDecoder::new(file));
        tarball.set_preserve_permissions(true);
        tarball.unpack(&dest).fs_context("unpacking archive", &archive)?;
        Ok(())
    })
    .await?
}
