//! `release.env` version record.
//!
//! Four `KEY=value` lines consumed by CI and by the `manifests` command:
//!
//! ```text
//! PDFIUM_VERSION=144.0.7506.0
//! PDFIUM_TAG=chromium/7506
//! BUILD_ID=20261016120000
//! ARCHIVE=PDFium-7506-20261016120000.xcframework.zip
//! ```

use crate::error::{RecordError, Result};
use crate::version::{PdfiumVersion, ReleaseTag};
use std::collections::HashMap;
use std::path::Path;

/// Record file name inside the output directory.
pub const RECORD_FILE_NAME: &str = "release.env";

/// What was built and where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Full upstream version
    pub version: PdfiumVersion,
    /// Upstream tag
    pub tag: ReleaseTag,
    /// Build identifier
    pub build_id: String,
    /// Archive file name, relative to the output directory
    pub archive: String,
}

impl VersionRecord {
    /// Render the record.
    pub fn to_env(&self) -> String {
        format!(
            "PDFIUM_VERSION={}\nPDFIUM_TAG={}\nBUILD_ID={}\nARCHIVE={}\n",
            self.version, self.tag, self.build_id, self.archive
        )
    }

    /// Write the record to `path`, replacing any previous one.
    pub async fn write(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.to_env()).await?;
        log::info!("Wrote version record {}", path.display());
        Ok(())
    }

    /// Read a record written by [`VersionRecord::write`].
    pub async fn read(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecordError::NotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        let values: HashMap<&str, &str> = contents
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect();

        let get = |key: &'static str| {
            values
                .get(key)
                .copied()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RecordError::MissingKey {
                    path: path.to_path_buf(),
                    key,
                })
        };

        Ok(Self {
            version: PdfiumVersion::parse(get("PDFIUM_VERSION")?)?,
            tag: ReleaseTag::parse(get("PDFIUM_TAG")?)?,
            build_id: get("BUILD_ID")?.to_string(),
            archive: get("ARCHIVE")?.to_string(),
        })
    }
}
