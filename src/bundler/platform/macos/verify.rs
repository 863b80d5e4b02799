//! Structural audit of an assembled XCFramework.
//!
//! The audit never stops at the first problem: every platform is inspected
//! and each problem adds one to the error tally.

use crate::bail;
use crate::bundler::{
    Arch,
    error::{ErrorExt, Result},
};
use goblin::{Object, mach::Mach};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single audit observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Check passed
    Ok(String),
    /// Check failed; counted in the tally
    Error(String),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Ok(msg) => write!(f, "ok: {msg}"),
            Finding::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Result of [`verify_xcframework`].
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    /// Observations in the order they were made
    pub findings: Vec<Finding>,
    /// Platform directories containing a framework
    pub platforms: usize,
    /// `AvailableLibraries` count from the container Info.plist
    pub available_libraries: Option<usize>,
}

impl VerificationReport {
    fn ok(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::info!("{msg}");
        self.findings.push(Finding::Ok(msg));
    }

    fn error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::error!("{msg}");
        self.findings.push(Finding::Error(msg));
    }

    /// Number of failed checks.
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::Error(_)))
            .count()
    }

    /// True when no check failed.
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }
}

/// What a framework binary turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryFormat {
    /// Mach-O, thin or fat, with its architectures
    MachO(Vec<String>),
    /// `ar` static library
    StaticArchive,
}

/// Inspect a binary's header with goblin.
pub fn binary_format(bytes: &[u8]) -> Result<BinaryFormat> {
    let arch_name = |cputype: u32| {
        Arch::from_cpu_type(cputype)
            .map(|a| a.lipo_name().to_string())
            .unwrap_or_else(|| format!("cputype {cputype:#x}"))
    };

    match Object::parse(bytes)? {
        Object::Mach(Mach::Binary(macho)) => Ok(BinaryFormat::MachO(vec![arch_name(macho.header.cputype)])),
        Object::Mach(Mach::Fat(fat)) => Ok(BinaryFormat::MachO(
            fat.arches()?.iter().map(|a| arch_name(a.cputype)).collect(),
        )),
        Object::Archive(_) => Ok(BinaryFormat::StaticArchive),
        _ => bail!("not a Mach-O binary"),
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)
        .fs_context("reading directory", dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .fs_context("reading directory", dir)?;
    entries.sort();
    Ok(entries)
}

fn find_framework(platform_dir: &Path) -> Result<Option<PathBuf>> {
    Ok(sorted_entries(platform_dir)?
        .into_iter()
        .find(|p| p.is_dir() && p.extension() == Some(OsStr::new("framework"))))
}

fn verify_framework(report: &mut VerificationReport, platform: &str, framework: &Path) {
    let name = framework
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Deep layouts reach the binary through the root alias.
    let binary = framework.join(&name);
    match std::fs::read(&binary) {
        Ok(bytes) => {
            report.ok(format!("{platform}: binary {} present", binary.display()));
            match binary_format(&bytes) {
                Ok(BinaryFormat::MachO(archs)) => {
                    report.ok(format!("{platform}: Mach-O [{}]", archs.join(", ")))
                }
                Ok(BinaryFormat::StaticArchive) => {
                    report.ok(format!("{platform}: static archive"))
                }
                Err(reason) => report.error(format!("{platform}: {}: {reason}", binary.display())),
            }
        }
        Err(e) => report.error(format!("{platform}: binary {} missing ({e})", binary.display())),
    }

    if framework.join("Headers").is_dir() {
        report.ok(format!("{platform}: Headers present"));
    } else {
        report.error(format!("{platform}: Headers missing"));
    }

    let plist_present = [
        framework.join("Info.plist"),
        framework.join("Resources/Info.plist"),
    ]
    .iter()
    .any(|p| p.is_file());
    if plist_present {
        report.ok(format!("{platform}: Info.plist present"));
    } else {
        report.error(format!("{platform}: Info.plist missing"));
    }
}

/// Audit the XCFramework at `path`.
///
/// Fails only when `path` itself cannot be read; every other problem becomes
/// a [`Finding::Error`].
pub fn verify_xcframework(path: &Path) -> Result<VerificationReport> {
    let mut report = VerificationReport::default();
    log::info!("Verifying {}", path.display());

    let info_plist = path.join("Info.plist");
    match plist::Value::from_file(&info_plist) {
        Ok(value) => {
            let libraries = value
                .as_dictionary()
                .and_then(|d| d.get("AvailableLibraries"))
                .and_then(|v| v.as_array())
                .map(Vec::len);
            match libraries {
                Some(count) => {
                    report.available_libraries = Some(count);
                    report.ok(format!("Info.plist lists {count} libraries"));
                }
                None => report.error("Info.plist has no AvailableLibraries array"),
            }
        }
        Err(e) => report.error(format!("Info.plist unreadable: {e}")),
    }

    for entry in sorted_entries(path)? {
        if !entry.is_dir() {
            continue;
        }
        let Some(framework) = find_framework(&entry)? else {
            continue;
        };
        report.platforms += 1;
        let platform = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        verify_framework(&mut report, &platform, &framework);
    }

    if report.platforms == 0 {
        report.error("no platform directories found");
    } else if let Some(count) = report.available_libraries {
        if count != report.platforms {
            report.error(format!(
                "Info.plist lists {count} libraries but {} platform directories exist",
                report.platforms
            ));
        }
    }

    if report.is_clean() {
        log::info!("{} platforms verified", report.platforms);
    } else {
        log::error!("Verification found {} error(s)", report.error_count());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_not_mach_o() {
        assert!(binary_format(b"arm64\n").is_err());
    }

    #[test]
    fn thin_arm64_header_is_recognized() {
        // mach_header_64 for an arm64 dylib with no load commands
        let mut bytes = Vec::new();
        for word in [0xfeed_facf_u32, 0x0100_000c, 0, 6, 0, 0, 0, 0] {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        assert_eq!(
            binary_format(&bytes).unwrap(),
            BinaryFormat::MachO(vec!["arm64".to_string()])
        );
    }

    #[test]
    fn empty_directory_reports_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let report = verify_xcframework(tmp.path()).unwrap();
        assert_eq!(report.platforms, 0);
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn missing_container_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(verify_xcframework(&tmp.path().join("absent.xcframework")).is_err());
    }
}
