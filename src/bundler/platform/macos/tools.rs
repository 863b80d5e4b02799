//! Vendor command-line tools used to build frameworks.
//!
//! [`AppleTools`] is the seam between bundle assembly and Xcode's tools.
//! [`XcodeTools`] shells out to `install_name_tool`, `lipo` and `xcodebuild`.

use crate::bundler::error::{Error, Result};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Marker `install_name_tool` prints when the header padding is too small.
const HEADER_PAD_MESSAGE: &str = "larger updated load commands do not fit";

/// One library passed to `xcodebuild -create-xcframework`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcframeworkInput {
    /// Framework bundle directory
    pub framework: PathBuf,
    /// Matching `.dSYM` bundle, if one was produced
    pub debug_symbols: Option<PathBuf>,
}

/// Operations on Mach-O binaries and bundles.
pub trait AppleTools: Send + Sync + 'static {
    /// Rewrite the binary's `LC_ID_DYLIB` install name.
    ///
    /// Returns [`Error::HeaderPadExhausted`] when the name does not fit.
    fn set_install_id(
        &self,
        binary: &Path,
        install_name: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Combine single-architecture binaries into one fat binary.
    fn lipo_create(
        &self,
        inputs: &[PathBuf],
        output: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// List the architectures contained in a binary.
    fn lipo_archs(&self, binary: &Path) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Assemble an XCFramework at `output` from the given libraries.
    fn create_xcframework(
        &self,
        libraries: &[XcframeworkInput],
        output: &Path,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`AppleTools`] backed by the Xcode command line tools.
#[derive(Debug, Clone, Default)]
pub struct XcodeTools;

impl XcodeTools {
    /// Create the tool runner.
    pub fn new() -> Self {
        Self
    }

    /// Check every required tool is on `PATH`.
    pub fn check_available() -> Result<()> {
        for tool in ["install_name_tool", "lipo", "xcodebuild"] {
            let path = which::which(tool).map_err(|_| Error::ToolNotFound(tool.to_string()))?;
            log::debug!("Found {} at {}", tool, path.display());
        }
        Ok(())
    }
}

/// Captured result of a finished tool invocation.
#[derive(Debug)]
struct ToolOutput {
    stdout: String,
}

async fn run_tool(program: &str, args: Vec<OsString>) -> Result<ToolOutput> {
    let program_path = which::which(program).map_err(|_| Error::ToolNotFound(program.to_string()))?;
    let command_line = format!(
        "{} {}",
        program,
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    log::debug!("Running {}", command_line);

    let output = Command::new(&program_path)
        .args(&args)
        .output()
        .await
        .map_err(|error| Error::CommandFailed {
            command: command_line.clone(),
            error,
        })?;

    if !output.status.success() {
        return Err(Error::CommandStatus {
            command: command_line,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

impl AppleTools for XcodeTools {
    async fn set_install_id(&self, binary: &Path, install_name: &str) -> Result<()> {
        let args = vec![
            OsString::from("-id"),
            OsString::from(install_name),
            binary.as_os_str().to_owned(),
        ];
        match run_tool("install_name_tool", args).await {
            Err(Error::CommandStatus { stderr, .. }) if stderr.contains(HEADER_PAD_MESSAGE) => {
                Err(Error::HeaderPadExhausted {
                    binary: binary.to_path_buf(),
                    install_name: install_name.to_string(),
                })
            }
            other => other.map(|_| ()),
        }
    }

    async fn lipo_create(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let mut args = vec![OsString::from("-create")];
        args.extend(inputs.iter().map(|p| p.as_os_str().to_owned()));
        args.push(OsString::from("-output"));
        args.push(output.as_os_str().to_owned());
        run_tool("lipo", args).await.map(|_| ())
    }

    async fn lipo_archs(&self, binary: &Path) -> Result<Vec<String>> {
        let args = vec![OsString::from("-archs"), binary.as_os_str().to_owned()];
        let output = run_tool("lipo", args).await?;
        Ok(output.stdout.split_whitespace().map(str::to_owned).collect())
    }

    async fn create_xcframework(&self, libraries: &[XcframeworkInput], output: &Path) -> Result<()> {
        run_tool("xcodebuild", xcframework_args(libraries, output))
            .await
            .map(|_| ())
    }
}

/// Arguments for `xcodebuild -create-xcframework`.
pub fn xcframework_args(libraries: &[XcframeworkInput], output: &Path) -> Vec<OsString> {
    let mut args = vec![OsString::from("-create-xcframework")];
    for library in libraries {
        args.push(OsString::from("-framework"));
        args.push(library.framework.as_os_str().to_owned());
        if let Some(dsym) = &library.debug_symbols {
            args.push(OsString::from("-debug-symbols"));
            args.push(dsym.as_os_str().to_owned());
        }
    }
    args.push(OsString::from("-output"));
    args.push(output.as_os_str().to_owned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_symbols_follow_their_framework() {
        let libraries = vec![
            XcframeworkInput {
                framework: PathBuf::from("/w/a/PDFium.framework"),
                debug_symbols: Some(PathBuf::from("/w/a/PDFium.framework.dSYM")),
            },
            XcframeworkInput {
                framework: PathBuf::from("/w/b/PDFium.framework"),
                debug_symbols: None,
            },
        ];
        let args: Vec<String> = xcframework_args(&libraries, Path::new("/out/PDFium.xcframework"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-create-xcframework",
                "-framework",
                "/w/a/PDFium.framework",
                "-debug-symbols",
                "/w/a/PDFium.framework.dSYM",
                "-framework",
                "/w/b/PDFium.framework",
                "-output",
                "/out/PDFium.xcframework",
            ]
        );
    }
}
