//! Host-independent stand-ins for the archive source and the Xcode tools.
//!
//! Fake binaries are text files holding one architecture name per line, so
//! `lipo -create` is concatenation and `lipo -archs` reads the lines back.

#![allow(dead_code)]

use pdfium_xcframework::bundler::{
    AppleTools, BuildConfig, Error, Result, Settings, SettingsBuilder, XcframeworkInput,
    utils::fs,
};
use pdfium_xcframework::fetch::ArchiveSource;
use pdfium_xcframework::version::PdfiumVersion;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const VERSION: PdfiumVersion = PdfiumVersion::new(144, 0, 7506, 0);

/// Settings rooted in `root` (`root/work`, `root/dist`).
pub fn settings(root: &Path) -> Settings {
    SettingsBuilder::new()
        .version(VERSION)
        .build_id("20261016120000")
        .work_dir(root.join("work"))
        .output_dir(root.join("dist"))
        .build()
        .unwrap()
}

/// Writes an extracted-archive tree for `config` into `dest`.
pub fn write_archive_tree(config: &BuildConfig, dest: &Path, with_dsym: bool) {
    let lib = dest.join("lib");
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::write(lib.join("libpdfium.dylib"), format!("{}\n", config.arch.lipo_name())).unwrap();

    let include = dest.join("include");
    std::fs::create_dir_all(include.join("cpp")).unwrap();
    std::fs::write(include.join("fpdfview.h"), "// fpdfview\n").unwrap();
    std::fs::write(include.join("fpdfview.h~"), "// backup\n").unwrap();
    std::fs::write(include.join("cpp/fpdf_scopers.h"), "// scopers\n").unwrap();

    if with_dsym {
        let dwarf = lib.join("libpdfium.dylib.dSYM/Contents/Resources/DWARF");
        std::fs::create_dir_all(&dwarf).unwrap();
        std::fs::write(dwarf.join("libpdfium.dylib"), format!("{}\n", config.arch.lipo_name()))
            .unwrap();
    }
}

/// Archive source writing fake trees, optionally failing for one key.
#[derive(Debug, Default)]
pub struct FakeSource {
    pub fail_key: Option<String>,
    pub with_dsym: bool,
}

impl ArchiveSource for FakeSource {
    async fn fetch(&self, config: &BuildConfig, dest_dir: &Path) -> Result<()> {
        if self.fail_key.as_deref() == Some(config.key().as_str()) {
            return Err(Error::DownloadStatus {
                url: format!("https://example.invalid/{}", config.archive_name()),
                status: 404,
            });
        }
        write_archive_tree(config, dest_dir, self.with_dsym);
        Ok(())
    }
}

/// Xcode tool stand-in.
#[derive(Debug, Default)]
pub struct FakeTools {
    /// Reject install names longer than `@rpath/<name>`
    pub tight_header_pad: bool,
    pub install_names: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeTools {
    pub fn tight() -> Self {
        Self {
            tight_header_pad: true,
            ..Self::default()
        }
    }

    pub fn install_name_of(&self, binary: &Path) -> Option<String> {
        self.install_names
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(b, _)| b == binary)
            .map(|(_, name)| name.clone())
    }
}

impl AppleTools for FakeTools {
    async fn set_install_id(&self, binary: &Path, install_name: &str) -> Result<()> {
        if !binary.is_file() {
            return Err(Error::BinaryNotFound(binary.to_path_buf()));
        }
        if self.tight_header_pad && install_name.contains(".framework") {
            return Err(Error::HeaderPadExhausted {
                binary: binary.to_path_buf(),
                install_name: install_name.to_string(),
            });
        }
        self.install_names
            .lock()
            .unwrap()
            .push((binary.to_path_buf(), install_name.to_string()));
        Ok(())
    }

    async fn lipo_create(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let mut merged = String::new();
        for input in inputs {
            merged.push_str(&std::fs::read_to_string(input)?);
        }
        std::fs::write(output, merged)?;
        Ok(())
    }

    async fn lipo_archs(&self, binary: &Path) -> Result<Vec<String>> {
        Ok(std::fs::read_to_string(binary)?
            .lines()
            .map(str::to_owned)
            .collect())
    }

    async fn create_xcframework(&self, libraries: &[XcframeworkInput], output: &Path) -> Result<()> {
        std::fs::create_dir_all(output)?;
        let mut available = Vec::new();

        for library in libraries {
            let identifier = library
                .framework
                .parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let slice = output.join(&identifier);
            let framework_name = library.framework.file_name().unwrap_or_default();
            fs::copy_dir(&library.framework, &slice.join(framework_name)).await?;

            if let Some(dsym) = &library.debug_symbols {
                let dsym_name = dsym.file_name().unwrap_or_default();
                fs::copy_dir(dsym, &slice.join("dSYMs").join(dsym_name)).await?;
            }

            let mut entry = plist::Dictionary::new();
            entry.insert("LibraryIdentifier".into(), identifier.into());
            available.push(plist::Value::Dictionary(entry));
        }

        let mut info = plist::Dictionary::new();
        info.insert("AvailableLibraries".into(), plist::Value::Array(available));
        info.insert("CFBundlePackageType".into(), "XFWK".into());
        plist::Value::Dictionary(info).to_file_xml(output.join("Info.plist"))?;
        Ok(())
    }
}

/// Lay out a container by hand with one shallow framework whose binary is
/// `binary`.
pub fn write_container(root: &Path, binary: &[u8]) -> PathBuf {
    let container = root.join("PDFium.xcframework");
    let framework = container.join("ios-arm64/PDFium.framework");
    std::fs::create_dir_all(framework.join("Headers")).unwrap();
    std::fs::write(framework.join("PDFium"), binary).unwrap();
    std::fs::write(framework.join("Headers/fpdfview.h"), "// fpdfview\n").unwrap();
    std::fs::write(framework.join("Info.plist"), "<plist/>").unwrap();

    let mut entry = plist::Dictionary::new();
    entry.insert("LibraryIdentifier".into(), "ios-arm64".into());
    let mut info = plist::Dictionary::new();
    info.insert(
        "AvailableLibraries".into(),
        plist::Value::Array(vec![plist::Value::Dictionary(entry)]),
    );
    plist::Value::Dictionary(info)
        .to_file_xml(container.join("Info.plist"))
        .unwrap();
    container
}

/// Header of a thin arm64 Mach-O dylib with no load commands.
pub fn arm64_dylib_header() -> Vec<u8> {
    let mut bytes = Vec::new();
    for word in [0xfeed_facf_u32, 0x0100_000c, 0, 6, 0, 0, 0, 0] {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes
}
