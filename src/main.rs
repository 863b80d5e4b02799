//! pdfium-xcframework - repackage prebuilt PDFium binaries as an Apple XCFramework.
//!
//! Diagnostics go to stderr; the exit code is 0 on success and 1 on any
//! fatal error.

use pdfium_xcframework::cli;
use pdfium_xcframework::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new(false, false);
            let _ = output.error(&format!("Fatal error: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
