//! `manifests` command.

use crate::cli::{ManifestArgs, RuntimeConfig};
use crate::error::Result;
use crate::manifest;

/// Execute manifests command
pub(super) async fn execute_manifests(args: &ManifestArgs, config: &RuntimeConfig) -> Result<i32> {
    let written =
        manifest::write_manifests(&args.output_dir, &args.release_base_url, &args.manifest_dir)
            .await?;
    for path in written {
        config.success_println(&format!("Wrote {}", path.display()));
    }
    Ok(0)
}
