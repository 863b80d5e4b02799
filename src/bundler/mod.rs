//! Apple framework bundler for PDFium binaries.
//!
//! Turns the seven upstream per-platform archives into one
//! `PDFium.xcframework`:
//!
//! | Slice | Configurations | Layout |
//! |-------|----------------|--------|
//! | ios-arm64 | ios-device-arm64 | shallow |
//! | ios-arm64_x86_64-simulator | ios-simulator-{arm64,x64} | shallow |
//! | ios-arm64_x86_64-maccatalyst | ios-catalyst-{arm64,x64} | deep |
//! | macos-arm64_x86_64 | mac-{arm64,x64} | deep |
//!
//! # Integration
//!
//! ```no_run
//! use pdfium_xcframework::bundler::{Bundler, SettingsBuilder, XcodeTools};
//! use pdfium_xcframework::fetch::LocalArchiveSource;
//! use pdfium_xcframework::version::PdfiumVersion;
//!
//! # async fn example() -> pdfium_xcframework::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .version(PdfiumVersion::new(144, 0, 7506, 0))
//!     .build_id("local")
//!     .work_dir("build")
//!     .output_dir("dist")
//!     .build()?;
//!
//! let bundler = Bundler::new(settings, LocalArchiveSource::new("mirror"), XcodeTools::new());
//! let xcframework = bundler.bundle().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
pub mod error;
pub mod platform;
mod settings;
pub mod utils;

// Public re-exports
pub use builder::{BundledXcframework, Bundler};
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::macos::{
    framework::{BinaryKind, FrameworkBundle},
    tools::{AppleTools, XcframeworkInput, XcodeTools},
    verify::{Finding, VerificationReport, verify_xcframework},
};
pub use settings::{
    Arch, BuildConfig, DEFAULT_BUNDLE_IDENTIFIER, DEFAULT_DOWNLOAD_BASE, DEFAULT_FRAMEWORK_NAME,
    FatGroup, Layout, PlatformFamily, Settings, SettingsBuilder,
};
pub use utils::http::client as http_client;
