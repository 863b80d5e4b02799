//! Platform-specific bundling implementations.
//!
//! Only Apple targets are packaged. The stages are not gated on the host OS:
//! the vendor tools are reached through a trait, and the audit is pure Rust.

pub mod macos;
