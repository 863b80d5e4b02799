//! `verify` command: standalone audit of an XCFramework.

use crate::bundler::{Finding, verify_xcframework};
use crate::cli::{RuntimeConfig, VerifyArgs};
use crate::error::Result;

/// Execute verify command; a non-zero error tally exits 1.
pub(super) async fn execute_verify(args: &VerifyArgs, config: &RuntimeConfig) -> Result<i32> {
    let path = args.path.clone();
    let report = tokio::task::spawn_blocking(move || verify_xcframework(&path))
        .await
        .map_err(crate::bundler::Error::from)??;

    for finding in &report.findings {
        match finding {
            Finding::Ok(msg) => config.verbose_println(msg),
            Finding::Error(msg) => config.error_println(msg),
        }
    }

    if report.is_clean() {
        config.success_println(&format!(
            "{}: {} platforms, no errors",
            args.path.display(),
            report.platforms
        ));
        Ok(0)
    } else {
        config.error_println(&format!(
            "{}: {} error(s)",
            args.path.display(),
            report.error_count()
        ));
        Ok(1)
    }
}
