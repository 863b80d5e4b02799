//! XCFramework creation from assembled frameworks.

use super::framework::FrameworkBundle;
use super::tools::{AppleTools, XcframeworkInput};
use crate::bundler::{error::Result, utils::fs};
use std::path::Path;

/// Build `output` from `bundles` in one `xcodebuild` invocation.
///
/// Any container already at `output` is removed first.
pub async fn build_xcframework<T: AppleTools>(
    tools: &T,
    bundles: &[FrameworkBundle],
    output: &Path,
) -> Result<()> {
    fs::remove_dir_all(output).await?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent, false).await?;
    }

    let libraries: Vec<XcframeworkInput> = bundles
        .iter()
        .map(|bundle| XcframeworkInput {
            framework: bundle.root.clone(),
            debug_symbols: bundle.dsym.clone(),
        })
        .collect();

    log::info!(
        "Creating {} from {} frameworks",
        output.display(),
        libraries.len()
    );
    tools.create_xcframework(&libraries, output).await
}
