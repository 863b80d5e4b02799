//! Apple framework and XCFramework packaging.
//!
//! # Stages
//!
//! | Stage | Module | Tool |
//! |-------|--------|------|
//! | Framework bundle | [`framework`] | `install_name_tool` |
//! | Fat framework | [`universal`] | `lipo` |
//! | XCFramework | [`xcframework`] | `xcodebuild -create-xcframework` |
//! | Audit | [`verify`] | none (goblin, plist) |
//!
//! Every tool invocation goes through [`tools::AppleTools`], so the stages run
//! on any host once a different implementation is supplied.

pub mod framework;
pub mod tools;
pub mod universal;
pub mod verify;
pub mod xcframework;
