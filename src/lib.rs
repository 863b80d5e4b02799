//! # PDFium XCFramework
//!
//! Repackages the prebuilt PDFium binaries published by `bblanchon/pdfium-binaries`
//! as a single Apple `PDFium.xcframework`.
//!
//! ## Pipeline
//!
//! - **Version resolution**: `latest`, an explicit version, or `PDFIUM_VERSION`/`PDFIUM_TAG`
//! - **Fan-out**: seven archives fetched and assembled into frameworks concurrently
//! - **Merge**: simulator, Mac Catalyst and macOS slices combined with `lipo`
//! - **XCFramework**: one `xcodebuild -create-xcframework` invocation, then a structural audit
//! - **Packaging**: zip, SHA-256 sidecar, stable aliases and a `release.env` record
//! - **Manifests**: `Package.swift` and a podspec for the published archive
//!
//! ## Usage
//!
//! ```bash
//! pdfium-xcframework build latest
//! pdfium-xcframework verify dist/PDFium.xcframework
//! pdfium-xcframework manifests --release-base-url https://example.com/v1
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod bundler;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod package;
pub mod version;

// Re-export main types for public API
pub use bundler::{Bundler, BundledXcframework, Settings, SettingsBuilder};
pub use cli::Args;
pub use error::{CliError, PackagerError, Result};
pub use version::{PdfiumVersion, ReleaseTag, ResolvedVersion};
