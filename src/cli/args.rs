//! Command line argument parsing and validation.
//!
//! Every option has an environment fallback so CI jobs can configure a run
//! without flags.

use crate::bundler::DEFAULT_DOWNLOAD_BASE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Repackage PDFium binaries as an XCFramework
#[derive(Parser, Debug)]
#[command(
    name = "pdfium-xcframework",
    version,
    about = "Repackage prebuilt PDFium binaries as an Apple XCFramework",
    long_about = "Download the upstream PDFium archives for iOS, the iOS simulator, Mac Catalyst and macOS,
assemble them into one PDFium.xcframework and package it for distribution.

Usage:
  pdfium-xcframework build latest
  pdfium-xcframework build 144.0.7506.0 --output-dir dist
  PDFIUM_VERSION=144.0.7506.0 pdfium-xcframework build
  pdfium-xcframework verify dist/PDFium.xcframework
  pdfium-xcframework manifests --release-base-url https://example.com/releases/v1"
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Show per-check verification detail
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build, verify and package the XCFramework
    Build(BuildArgs),
    /// Audit an existing XCFramework; exits 1 when any check fails
    Verify(VerifyArgs),
    /// Render Package.swift and a podspec for the last build
    Manifests(ManifestArgs),
}

impl Command {
    /// Subcommand name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build(_) => "build",
            Command::Verify(_) => "verify",
            Command::Manifests(_) => "manifests",
        }
    }
}

/// Options for `build`
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// `latest` or a four-component version such as 144.0.7506.0
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Version used when VERSION is omitted
    #[arg(long = "pdfium-version", env = "PDFIUM_VERSION", value_name = "VERSION")]
    pub env_version: Option<String>,

    /// Upstream tag (chromium/<build>); derived from the version when unset
    #[arg(long, env = "PDFIUM_TAG")]
    pub tag: Option<String>,

    /// Scratch directory
    #[arg(long, env = "WORK_DIR", default_value = "./build")]
    pub work_dir: PathBuf,

    /// Directory receiving the XCFramework and archives
    #[arg(long, env = "OUTPUT_DIR", default_value = "./dist")]
    pub output_dir: PathBuf,

    /// Build identifier; defaults to the current UTC timestamp
    #[arg(long, env = "BUILD_ID")]
    pub build_id: Option<String>,

    /// Keep the scratch directory after a successful run
    #[arg(long)]
    pub keep_work_dir: bool,

    /// Base URL of upstream release downloads
    #[arg(long, env = "PDFIUM_DOWNLOAD_BASE", default_value = DEFAULT_DOWNLOAD_BASE)]
    pub download_base: String,

    /// Read pdfium-<key>.tgz archives from this directory instead of downloading
    #[arg(long, value_name = "DIR")]
    pub archives_dir: Option<PathBuf>,
}

/// Options for `verify`
#[derive(clap::Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Path to the .xcframework directory
    #[arg(value_name = "XCFRAMEWORK")]
    pub path: PathBuf,
}

/// Options for `manifests`
#[derive(clap::Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Output directory of the build (holds release.env)
    #[arg(long, env = "OUTPUT_DIR", default_value = "./dist")]
    pub output_dir: PathBuf,

    /// Public URL the archive is published under
    #[arg(long, env = "RELEASE_BASE_URL")]
    pub release_base_url: String,

    /// Where Package.swift and the podspec are written
    #[arg(long, default_value = ".")]
    pub manifest_dir: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.quiet && self.verbose {
            return Err("--quiet and --verbose cannot be combined".to_string());
        }

        match &self.command {
            Command::Build(build) => {
                if let Some(id) = &build.build_id
                    && id.trim().is_empty()
                {
                    return Err("--build-id must not be empty".to_string());
                }
                if let Some(dir) = &build.archives_dir
                    && !dir.is_dir()
                {
                    return Err(format!("archives directory {} does not exist", dir.display()));
                }
            }
            Command::Verify(_) => {}
            Command::Manifests(manifests) => {
                if manifests.release_base_url.trim().is_empty() {
                    return Err("--release-base-url must not be empty".to_string());
                }
            }
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print informational message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }

    /// Print verbose message (only with --verbose)
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        let _ = self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn build_defaults() {
        let args = Args::try_parse_from(["pdfium-xcframework", "build", "latest"]).unwrap();
        let Command::Build(build) = args.command else {
            panic!("expected build");
        };
        assert_eq!(build.version.as_deref(), Some("latest"));
        assert!(!build.keep_work_dir);
        assert_eq!(build.download_base, DEFAULT_DOWNLOAD_BASE);
    }

    #[test]
    fn verify_requires_a_path() {
        assert!(Args::try_parse_from(["pdfium-xcframework", "verify"]).is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let args = Args::try_parse_from(["pdfium-xcframework", "-q", "-v", "verify", "x"]).unwrap();
        assert!(args.validate().is_err());
    }
}
