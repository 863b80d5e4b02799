//! `build` command: resolve, bundle, verify and package.

use crate::bundler::{
    self, BundledXcframework, Bundler, Settings, SettingsBuilder, XcodeTools, http_client,
};
use crate::cli::{BuildArgs, RuntimeConfig};
use crate::error::Result;
use crate::fetch::{ArchiveSource, GithubReleaseSource, LocalArchiveSource};
use crate::package;
use crate::version::{self, VersionRequest};

/// Default build identifier: the current UTC time, `%Y%m%d%H%M%S`.
fn default_build_id() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}

async fn bundle_with<S: ArchiveSource>(
    settings: &Settings,
    source: S,
) -> bundler::Result<BundledXcframework> {
    Bundler::new(settings.clone(), source, XcodeTools::new())
        .bundle()
        .await
}

/// Execute build command
pub(super) async fn execute_build(args: &BuildArgs, config: &RuntimeConfig) -> Result<i32> {
    config.section("PDFium XCFramework");

    let request = VersionRequest::from_inputs(
        args.version.as_deref(),
        args.env_version.as_deref(),
        args.tag.as_deref(),
    )?;
    XcodeTools::check_available()?;
    let client = http_client()?;
    let resolved = version::resolve(request, &client).await?;
    config.info_println(&format!(
        "PDFium {} (display {}) from {}",
        resolved.version,
        resolved.version.display(),
        resolved.tag
    ));

    let settings = SettingsBuilder::new()
        .version(resolved.version)
        .tag(resolved.tag)
        .build_id(args.build_id.clone().unwrap_or_else(default_build_id))
        .work_dir(args.work_dir.clone())
        .output_dir(args.output_dir.clone())
        .download_base(args.download_base.clone())
        .keep_work_dir(args.keep_work_dir)
        .build()?;
    config.verbose_println(&format!("Work directory: {}", settings.work_dir().display()));
    config.verbose_println(&format!("Output directory: {}", settings.output_dir().display()));

    let bundled = match &args.archives_dir {
        Some(dir) => bundle_with(&settings, LocalArchiveSource::new(dir.clone())).await?,
        None => bundle_with(&settings, GithubReleaseSource::new(client, settings.clone())).await?,
    };

    for library in &bundled.libraries {
        config.indent(&library.root.display().to_string());
    }
    if bundled.report.is_clean() {
        config.success_println(&format!(
            "Verified {} ({} platforms)",
            bundled.path.display(),
            bundled.report.platforms
        ));
    } else {
        config.warning_println(&format!(
            "Verification reported {} error(s); packaging anyway",
            bundled.report.error_count()
        ));
    }

    let packaged = package::package(&settings).await?;
    config.success_println(&format!("Archive: {}", packaged.archive.display()));
    config.indent(&format!("SHA-256: {}", packaged.sha256));
    config.indent(&format!("Record: {}", packaged.record.display()));

    Ok(0)
}
