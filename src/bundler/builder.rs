//! Build orchestration.
//!
//! The [`Bundler`] runs the pipeline up to a verified XCFramework:
//!
//! 1. fan out one fetch + assemble job per [`BuildConfig`] and join them all
//! 2. merge each [`FatGroup`] with `lipo`
//! 3. create the XCFramework from the device framework and the fat ones
//! 4. audit the result
//!
//! # Example
//!
//! ```no_run
//! use pdfium_xcframework::bundler::{Bundler, SettingsBuilder, XcodeTools};
//! use pdfium_xcframework::fetch::GithubReleaseSource;
//! use pdfium_xcframework::version::PdfiumVersion;
//!
//! # async fn example() -> pdfium_xcframework::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .version(PdfiumVersion::new(144, 0, 7506, 0))
//!     .build_id("20261016120000")
//!     .work_dir("build")
//!     .output_dir("dist")
//!     .build()?;
//! let client = pdfium_xcframework::bundler::http_client()?;
//! let source = GithubReleaseSource::new(client, settings.clone());
//!
//! let bundler = Bundler::new(settings, source, XcodeTools::new());
//! let output = bundler.bundle().await?;
//! println!("{} ({} errors)", output.path.display(), output.report.error_count());
//! # Ok(())
//! # }
//! ```

use crate::bundler::{
    BuildConfig, FatGroup, Settings,
    error::{Context, Error, ErrorExt, Result},
    platform::macos::{
        framework::{self, FrameworkBundle},
        tools::AppleTools,
        universal, verify,
        verify::VerificationReport,
        xcframework,
    },
    utils::fs,
};
use crate::fetch::ArchiveSource;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// An XCFramework produced by [`Bundler::bundle`].
#[derive(Debug, Clone)]
pub struct BundledXcframework {
    /// Container path
    pub path: PathBuf,
    /// Frameworks passed to the XCFramework builder, device first
    pub libraries: Vec<FrameworkBundle>,
    /// Audit of the container; advisory
    pub report: VerificationReport,
}

/// Pipeline driver, generic over where archives come from and how vendor
/// tools are run.
pub struct Bundler<S, T> {
    settings: Arc<Settings>,
    source: Arc<S>,
    tools: Arc<T>,
}

impl<S, T> std::fmt::Debug for Bundler<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S: ArchiveSource, T: AppleTools> Bundler<S, T> {
    /// Creates a bundler.
    pub fn new(settings: Settings, source: S, tools: T) -> Self {
        Self {
            settings: Arc::new(settings),
            source: Arc::new(source),
            tools: Arc::new(tools),
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs every stage and returns the verified container.
    ///
    /// Any container left by a previous run is removed up front, so a failed
    /// run never leaves one behind.
    pub async fn bundle(&self) -> Result<BundledXcframework> {
        let output = self.settings.xcframework_path();
        fs::remove_dir_all(&output).await?;

        let bundles = self.fan_out().await?;
        let libraries = self.merge(&bundles).await?;
        xcframework::build_xcframework(&*self.tools, &libraries, &output).await?;

        let path = output.clone();
        let report = tokio::task::spawn_blocking(move || verify::verify_xcframework(&path)).await??;
        if !report.is_clean() {
            log::error!(
                "{} failed {} check(s); continuing",
                output.display(),
                report.error_count()
            );
        }

        Ok(BundledXcframework {
            path: output,
            libraries,
            report,
        })
    }

    /// Fetches and assembles every configuration concurrently.
    ///
    /// All jobs run to completion even when one fails; the error then names
    /// every failed configuration.
    pub async fn fan_out(&self) -> Result<HashMap<BuildConfig, FrameworkBundle>> {
        let mut jobs = JoinSet::new();
        for config in BuildConfig::ALL {
            let settings = Arc::clone(&self.settings);
            let source = Arc::clone(&self.source);
            let tools = Arc::clone(&self.tools);
            jobs.spawn(async move {
                let result = run_job(&settings, &*source, &*tools, config).await;
                (config, result)
            });
        }
        log::info!("Started {} build jobs", jobs.len());

        let mut bundles = HashMap::new();
        let mut failed = Vec::new();
        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((config, Ok(bundle))) => {
                    log::info!("{} ready at {}", config, bundle.root.display());
                    bundles.insert(config, bundle);
                }
                Ok((config, Err(e))) => {
                    log::error!("{} failed: {}", config, e);
                    failed.push(config.key());
                }
                Err(e) => {
                    log::error!("Build job panicked: {}", e);
                    failed.push("<panicked task>".to_string());
                }
            }
        }

        if !failed.is_empty() {
            failed.sort();
            return Err(Error::JobsFailed { failed });
        }
        Ok(bundles)
    }

    /// Produces the XCFramework inputs: the device framework followed by one
    /// fat framework per group that could be merged.
    pub async fn merge(
        &self,
        bundles: &HashMap<BuildConfig, FrameworkBundle>,
    ) -> Result<Vec<FrameworkBundle>> {
        let device = bundles
            .get(&BuildConfig::IOS_DEVICE)
            .cloned()
            .with_context(|| format!("{} framework was not built", BuildConfig::IOS_DEVICE))?;

        let mut libraries = vec![device];
        for group in &FatGroup::ALL {
            if let Some(merged) =
                universal::merge_group(&*self.tools, &self.settings, group, bundles).await?
            {
                libraries.push(merged);
            }
        }
        Ok(libraries)
    }
}

/// Fetch, assemble and record one configuration.
async fn run_job<S: ArchiveSource, T: AppleTools>(
    settings: &Settings,
    source: &S,
    tools: &T,
    config: BuildConfig,
) -> Result<FrameworkBundle> {
    let extract_dir = settings.extract_dir(&config);
    fs::create_dir_all(&extract_dir, true).await?;

    source
        .fetch(&config, &extract_dir)
        .await
        .with_context(|| format!("fetching {}", config.archive_name()))?;

    let bundle = framework::assemble(tools, settings, &config, &extract_dir).await?;

    let marker = settings.marker_path(&config);
    if let Some(parent) = marker.parent() {
        fs::create_dir_all(parent, false).await?;
    }
    tokio::fs::write(&marker, format!("{}\n", bundle.root.display()))
        .await
        .fs_context("writing job marker", &marker)?;

    Ok(bundle)
}
