//! Command execution functions.
//!
//! Each subcommand returns its exit code; errors are reported here together
//! with recovery suggestions and turned into exit code 1.

mod build;
mod manifests;
mod verify;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, Result};

use build::execute_build;
use manifests::execute_manifests;
use verify::execute_verify;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Build(build) => execute_build(build, &config).await,
        Command::Verify(verify) => execute_verify(verify, &config).await,
        Command::Manifests(manifests) => execute_manifests(manifests, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
