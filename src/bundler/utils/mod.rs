//! Filesystem and HTTP helpers shared by the bundling stages.

pub mod fs;
pub mod http;
