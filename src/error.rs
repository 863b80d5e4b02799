//! Top-level error types for pdfium_xcframework operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pdfium_xcframework operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for all pdfium_xcframework operations
#[derive(Error, Debug)]
pub enum PackagerError {
    /// Version resolution errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Version record errors
    #[error("Version record error: {0}")]
    Record(#[from] RecordError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// Version resolution errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Invalid version format
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Invalid upstream tag
    #[error("Invalid release tag '{tag}': expected chromium/<build>")]
    InvalidTag {
        /// Tag string
        tag: String,
    },

    /// Querying the latest upstream release failed
    #[error("Failed to query latest release from {url}: {reason}")]
    LatestLookupFailed {
        /// API endpoint that was queried
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// No version source was provided
    #[error("No version given: pass VERSION, 'latest', or set PDFIUM_VERSION")]
    Unspecified,
}

/// Errors reading or writing the version record
#[derive(Error, Debug)]
pub enum RecordError {
    /// Record file missing
    #[error("Version record not found at {path}. Run a build first.")]
    NotFound {
        /// Expected record path
        path: PathBuf,
    },

    /// Record is missing a key
    #[error("Version record {path} is missing key {key}")]
    MissingKey {
        /// Record path
        path: PathBuf,
        /// Missing key
        key: &'static str,
    },

    /// Checksum sidecar unreadable
    #[error("Checksum file {path} is malformed")]
    MalformedChecksum {
        /// Sidecar path
        path: PathBuf,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as BundlerError;

        match self {
            PackagerError::Version(VersionError::Unspecified) => vec![
                "Run: pdfium-xcframework build latest".to_string(),
                "Or export PDFIUM_VERSION=144.0.7506.0 (and optionally PDFIUM_TAG)".to_string(),
            ],
            PackagerError::Version(VersionError::LatestLookupFailed { .. }) => vec![
                "Check network access to api.github.com".to_string(),
                "Pass an explicit version to skip the lookup".to_string(),
            ],
            PackagerError::Bundler(BundlerError::ToolNotFound(_)) => vec![
                "Install the Xcode Command Line Tools: xcode-select --install".to_string(),
                "Builds must run on macOS".to_string(),
            ],
            PackagerError::Bundler(BundlerError::JobsFailed { .. }) => vec![
                "Check the per-configuration errors logged above".to_string(),
                "Verify the release tag publishes every archive".to_string(),
            ],
            PackagerError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see the accepted arguments".to_string()]
            }
            PackagerError::Record(RecordError::NotFound { .. }) => {
                vec!["Run `pdfium-xcframework build` with the same --output-dir".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_version_suggests_latest() {
        let err = PackagerError::from(VersionError::Unspecified);
        let suggestions = err.recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.contains("build latest")));
    }

    #[test]
    fn generic_errors_get_fallback_suggestion() {
        let err = PackagerError::from(std::io::Error::other("disk full"));
        assert_eq!(err.recovery_suggestions().len(), 1);
    }
}
