//! Swift Package Manager and CocoaPods manifests for a published archive.
//!
//! Inputs come from a finished build's output directory: the
//! [`VersionRecord`] and the archive's checksum sidecar.

use crate::bundler::{DEFAULT_FRAMEWORK_NAME, Error as BundlerError};
use crate::error::{RecordError, Result};
use crate::package::{RECORD_FILE_NAME, VersionRecord, checksum};
use handlebars::Handlebars;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

const PACKAGE_SWIFT_TEMPLATE: &str = include_str!("templates/Package.swift.hbs");
const PODSPEC_TEMPLATE: &str = include_str!("templates/PDFium.podspec.hbs");

/// Rendered manifest contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifests {
    /// `Package.swift`
    pub package_swift: String,
    /// `<name>.podspec`
    pub podspec: String,
}

/// Public download URL of the archive named in `record`.
pub fn download_url(release_base_url: &str, record: &VersionRecord) -> Result<Url> {
    let mut base = release_base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let url = Url::parse(&base)
        .and_then(|b| b.join(&record.archive))
        .map_err(BundlerError::from)?;
    Ok(url)
}

/// Render both manifests.
pub fn render(record: &VersionRecord, checksum: &str, url: &Url) -> Result<Manifests> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("Package.swift", PACKAGE_SWIFT_TEMPLATE)
        .map_err(BundlerError::from)?;
    handlebars
        .register_template_string("podspec", PODSPEC_TEMPLATE)
        .map_err(BundlerError::from)?;

    let mut data = BTreeMap::new();
    data.insert("framework_name", DEFAULT_FRAMEWORK_NAME.to_string());
    data.insert("version", record.version.to_string());
    data.insert("display_version", record.version.display());
    data.insert("url", url.to_string());
    data.insert("checksum", checksum.to_string());

    Ok(Manifests {
        package_swift: handlebars
            .render("Package.swift", &data)
            .map_err(BundlerError::from)?,
        podspec: handlebars
            .render("podspec", &data)
            .map_err(BundlerError::from)?,
    })
}

/// Read the checksum sidecar for `record`'s archive.
pub async fn read_checksum(output_dir: &Path, record: &VersionRecord) -> Result<String> {
    let path = output_dir.join(format!("{}.sha256", record.archive));
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| RecordError::MalformedChecksum { path: path.clone() })?;
    checksum::parse_sidecar(&contents)
        .map(str::to_string)
        .ok_or_else(|| RecordError::MalformedChecksum { path }.into())
}

/// Render manifests from `output_dir` and write them into `manifest_dir`.
///
/// Returns the written paths.
pub async fn write_manifests(
    output_dir: &Path,
    release_base_url: &str,
    manifest_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let record = VersionRecord::read(&output_dir.join(RECORD_FILE_NAME)).await?;
    let checksum = read_checksum(output_dir, &record).await?;
    let url = download_url(release_base_url, &record)?;
    log::info!("Rendering manifests for {} at {}", record.version, url);

    let manifests = render(&record, &checksum, &url)?;

    tokio::fs::create_dir_all(manifest_dir).await?;
    let package_swift = manifest_dir.join("Package.swift");
    let podspec = manifest_dir.join(format!("{DEFAULT_FRAMEWORK_NAME}.podspec"));
    tokio::fs::write(&package_swift, manifests.package_swift).await?;
    tokio::fs::write(&podspec, manifests.podspec).await?;

    Ok(vec![package_swift, podspec])
}
