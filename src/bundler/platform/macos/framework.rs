//! Framework bundle (.framework) assembly from an extracted PDFium archive.
//!
//! Two layouts are produced, matching what `xcodebuild -create-xcframework`
//! accepts per platform:
//!
//! ```text
//! Shallow (iOS, simulator)        Deep (macOS, Mac Catalyst)
//! PDFium.framework/               PDFium.framework/
//!   PDFium                          PDFium -> Versions/Current/PDFium
//!   Headers/                        Headers -> Versions/Current/Headers
//!   Modules/module.modulemap        Modules -> Versions/Current/Modules
//!   Info.plist                      Resources -> Versions/Current/Resources
//!                                   Versions/
//!                                     Current -> A
//!                                     A/PDFium
//!                                     A/Headers/
//!                                     A/Modules/module.modulemap
//!                                     A/Resources/Info.plist
//! ```

use super::tools::AppleTools;
use crate::bundler::{
    BuildConfig, Layout, PlatformFamily, Settings,
    error::{Context, Error, ErrorExt, Result},
    utils::fs,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Whether the framework binary is a dylib or a static archive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryKind {
    /// Mach-O dynamic library; carries an install name
    Dynamic,
    /// `ar` static archive; no install name
    Static,
}

impl BinaryKind {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some("a") => BinaryKind::Static,
            _ => BinaryKind::Dynamic,
        }
    }
}

/// An assembled framework and the paths inside it.
///
/// All paths are computed from the root and layout; the binary, headers and
/// Info.plist paths always point at real files, never at root aliases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameworkBundle {
    /// `<...>/PDFium.framework`
    pub root: PathBuf,
    /// Framework name; equals the binary file name
    pub name: String,
    /// Directory convention
    pub layout: Layout,
    /// Binary flavour
    pub kind: BinaryKind,
    /// Sibling `PDFium.framework.dSYM`, when debug symbols were shipped
    pub dsym: Option<PathBuf>,
}

impl FrameworkBundle {
    /// Describe a framework at `root` without touching the filesystem.
    pub fn at(root: impl Into<PathBuf>, name: &str, layout: Layout, kind: BinaryKind) -> Self {
        Self {
            root: root.into(),
            name: name.to_string(),
            layout,
            kind,
            dsym: None,
        }
    }

    /// Directory holding the real binary, headers and modules.
    pub fn content_dir(&self) -> PathBuf {
        match self.layout {
            Layout::Shallow => self.root.clone(),
            Layout::Deep => self.root.join("Versions").join("A"),
        }
    }

    /// Real binary path.
    pub fn binary(&self) -> PathBuf {
        self.content_dir().join(&self.name)
    }

    /// Real headers directory.
    pub fn headers(&self) -> PathBuf {
        self.content_dir().join("Headers")
    }

    /// Real modules directory.
    pub fn modules(&self) -> PathBuf {
        self.content_dir().join("Modules")
    }

    /// Real Info.plist path.
    pub fn info_plist(&self) -> PathBuf {
        match self.layout {
            Layout::Shallow => self.root.join("Info.plist"),
            Layout::Deep => self.content_dir().join("Resources").join("Info.plist"),
        }
    }

    /// Where a sibling dSYM for this framework lives.
    pub fn dsym_path(&self) -> PathBuf {
        let mut name = self
            .root
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".dSYM");
        self.root.with_file_name(name)
    }

    /// DWARF binary inside the dSYM.
    pub fn dsym_dwarf(&self) -> Option<PathBuf> {
        self.dsym
            .as_ref()
            .map(|d| d.join("Contents/Resources/DWARF").join(&self.name))
    }

    /// Install names to try, most specific first.
    pub fn install_names(&self) -> [String; 2] {
        let full = match self.layout {
            Layout::Shallow => format!("@rpath/{0}.framework/{0}", self.name),
            Layout::Deep => format!("@rpath/{0}.framework/Versions/A/{0}", self.name),
        };
        [full, format!("@rpath/{}", self.name)]
    }
}

/// Locate the library in an extracted archive.
///
/// The first `*.dylib` in sorted walk order wins; a `*.a` is used only when
/// no dylib exists. Files inside `.dSYM` bundles are ignored.
pub fn find_primary_binary(extract_dir: &Path) -> Result<PathBuf> {
    let mut static_fallback = None;

    let walker = walkdir::WalkDir::new(extract_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path().extension() != Some(OsStr::new("dSYM")));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.path().extension().and_then(OsStr::to_str) {
            Some("dylib") => return Ok(entry.into_path()),
            Some("a") if static_fallback.is_none() => static_fallback = Some(entry.into_path()),
            _ => {}
        }
    }

    static_fallback.ok_or_else(|| Error::BinaryNotFound(extract_dir.to_path_buf()))
}

/// Returns true for editor and backup leftovers that must not ship.
pub fn is_editor_artifact(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return false;
    };
    name == ".DS_Store"
        || name.ends_with('~')
        || (name.starts_with('#') && name.ends_with('#'))
        || [".bak", ".orig", ".rej", ".swp", ".swo"]
            .iter()
            .any(|ext| name.ends_with(ext))
}

/// Set the install name, falling back to the short form when the full one
/// does not fit in the binary's header padding.
///
/// Returns the install name that was applied.
pub async fn apply_install_name<T: AppleTools>(
    tools: &T,
    bundle: &FrameworkBundle,
) -> Result<Option<String>> {
    if bundle.kind == BinaryKind::Static {
        log::debug!("{} is a static archive, skipping install name", bundle.root.display());
        return Ok(None);
    }

    let binary = bundle.binary();
    let [full, short] = bundle.install_names();

    match tools.set_install_id(&binary, &full).await {
        Ok(()) => Ok(Some(full)),
        Err(Error::HeaderPadExhausted { .. }) => {
            log::warn!(
                "{} does not fit in {}; using {}",
                full,
                binary.display(),
                short
            );
            tools
                .set_install_id(&binary, &short)
                .await
                .with_context(|| format!("setting install name {short}"))?;
            Ok(Some(short))
        }
        Err(e) => Err(e).with_context(|| format!("setting install name {full}")),
    }
}

/// Create `Versions/Current` and the root aliases of a deep framework.
///
/// Existing links are replaced, so this also repairs a copied framework.
pub async fn link_versioned_layout(bundle: &FrameworkBundle) -> Result<()> {
    let versions = bundle.root.join("Versions");
    fs::replace_symlink(Path::new("A"), &versions.join("Current")).await?;

    let mut aliases = vec![bundle.name.clone(), "Resources".to_string()];
    if bundle.headers().is_dir() {
        aliases.push("Headers".to_string());
    }
    if bundle.modules().is_dir() {
        aliases.push("Modules".to_string());
    }

    for alias in aliases {
        let target = Path::new("Versions/Current").join(&alias);
        fs::replace_symlink(&target, &bundle.root.join(&alias)).await?;
    }
    Ok(())
}

/// Render the framework's Info.plist.
pub fn write_info_plist(
    bundle: &FrameworkBundle,
    settings: &Settings,
    family: PlatformFamily,
) -> Result<()> {
    use plist::Value;

    let version = settings.version();
    let mut dict = plist::Dictionary::new();

    dict.insert("CFBundleDevelopmentRegion".into(), "en".into());
    dict.insert("CFBundleExecutable".into(), bundle.name.clone().into());
    dict.insert(
        "CFBundleIdentifier".into(),
        settings.bundle_identifier().into(),
    );
    dict.insert("CFBundleInfoDictionaryVersion".into(), "6.0".into());
    dict.insert("CFBundleName".into(), bundle.name.clone().into());
    dict.insert("CFBundlePackageType".into(), "FMWK".into());
    dict.insert(
        "CFBundleShortVersionString".into(),
        version.display().into(),
    );
    dict.insert("CFBundleVersion".into(), version.to_string().into());
    dict.insert(
        "CFBundleSupportedPlatforms".into(),
        Value::Array(vec![family.supported_platform().into()]),
    );
    dict.insert(
        family.minimum_os_key().into(),
        family.minimum_os_version().into(),
    );

    let path = bundle.info_plist();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).fs_context("creating Resources directory", parent)?;
    }
    Value::Dictionary(dict).to_file_xml(&path)?;
    Ok(())
}

/// Point `CFBundleExecutable` at the framework's binary again.
pub fn refresh_executable_name(bundle: &FrameworkBundle) -> Result<()> {
    let path = bundle.info_plist();
    let mut value = plist::Value::from_file(&path)?;
    let dict = value
        .as_dictionary_mut()
        .with_context(|| format!("{} is not a dictionary", path.display()))?;
    dict.insert("CFBundleExecutable".into(), bundle.name.clone().into());
    value.to_file_xml(&path)?;
    Ok(())
}

/// Write a module map exposing every header under `Headers/`.
pub async fn write_module_map(bundle: &FrameworkBundle) -> Result<()> {
    let modules = bundle.modules();
    fs::create_dir_all(&modules, false).await?;
    let contents = format!(
        "framework module {} {{\n    umbrella \"Headers\"\n    export *\n    module * {{ export * }}\n}}\n",
        bundle.name
    );
    let path = modules.join("module.modulemap");
    tokio::fs::write(&path, contents)
        .await
        .fs_context("writing module map", &path)
}

/// Copy a shipped `.dSYM` next to the framework, renaming its DWARF binary
/// to the framework name.
async fn copy_debug_symbols(source_binary: &Path, bundle: &FrameworkBundle) -> Result<Option<PathBuf>> {
    let mut dsym_name = source_binary
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    dsym_name.push(".dSYM");
    let source_dsym = source_binary.with_file_name(dsym_name);

    if !source_dsym.is_dir() {
        log::debug!("No debug symbols at {}", source_dsym.display());
        return Ok(None);
    }

    let dest = bundle.dsym_path();
    fs::remove_dir_all(&dest).await?;
    fs::copy_dir(&source_dsym, &dest).await?;

    let dwarf_dir = dest.join("Contents/Resources/DWARF");
    if let Some(original) = source_binary.file_name() {
        let from = dwarf_dir.join(original);
        if from.is_file() {
            let to = dwarf_dir.join(&bundle.name);
            tokio::fs::rename(&from, &to)
                .await
                .fs_context("renaming DWARF binary", &from)?;
        }
    }

    Ok(Some(dest))
}

/// Assemble the framework for `config` from its extracted archive.
pub async fn assemble<T: AppleTools>(
    tools: &T,
    settings: &Settings,
    config: &BuildConfig,
    extract_dir: &Path,
) -> Result<FrameworkBundle> {
    let source_binary = find_primary_binary(extract_dir)?;
    let mut bundle = FrameworkBundle::at(
        settings.framework_dir(config),
        settings.framework_name(),
        config.family.layout(),
        BinaryKind::of(&source_binary),
    );

    log::info!(
        "Assembling {} from {}",
        bundle.root.display(),
        source_binary.display()
    );

    fs::create_dir_all(&bundle.root, true).await?;
    fs::create_dir_all(&bundle.content_dir(), false).await?;

    let binary = bundle.binary();
    fs::copy_file(&source_binary, &binary)
        .await
        .with_context(|| format!("copying binary for {config}"))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting binary permissions", &binary)?;
    }

    apply_install_name(tools, &bundle).await?;

    let include_dir = extract_dir.join("include");
    if include_dir.is_dir() {
        fs::copy_dir_filtered(&include_dir, &bundle.headers(), is_editor_artifact)
            .await
            .with_context(|| format!("copying headers for {config}"))?;
        write_module_map(&bundle).await?;
    } else {
        log::warn!("{}: no include directory in archive, skipping headers", config);
    }

    bundle.dsym = copy_debug_symbols(&source_binary, &bundle).await?;

    write_info_plist(&bundle, settings, config.family)?;

    if bundle.layout == Layout::Deep {
        link_versioned_layout(&bundle).await?;
    }

    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_artifacts_are_detected() {
        for name in ["fpdfview.h~", ".DS_Store", "#fpdfview.h#", "a.h.orig", "a.h.swp", "a.bak"] {
            assert!(is_editor_artifact(Path::new(name)), "{name}");
        }
        for name in ["fpdfview.h", "cpp", "fpdf_doc.h"] {
            assert!(!is_editor_artifact(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn deep_paths_go_through_version_a() {
        let bundle = FrameworkBundle::at("/w/PDFium.framework", "PDFium", Layout::Deep, BinaryKind::Dynamic);
        assert_eq!(bundle.binary(), PathBuf::from("/w/PDFium.framework/Versions/A/PDFium"));
        assert_eq!(
            bundle.info_plist(),
            PathBuf::from("/w/PDFium.framework/Versions/A/Resources/Info.plist")
        );
        assert_eq!(bundle.dsym_path(), PathBuf::from("/w/PDFium.framework.dSYM"));
        assert_eq!(
            bundle.install_names(),
            [
                "@rpath/PDFium.framework/Versions/A/PDFium".to_string(),
                "@rpath/PDFium".to_string()
            ]
        );
    }

    #[test]
    fn shallow_paths_sit_at_root() {
        let bundle = FrameworkBundle::at("/w/PDFium.framework", "PDFium", Layout::Shallow, BinaryKind::Dynamic);
        assert_eq!(bundle.binary(), PathBuf::from("/w/PDFium.framework/PDFium"));
        assert_eq!(bundle.info_plist(), PathBuf::from("/w/PDFium.framework/Info.plist"));
        assert_eq!(bundle.install_names()[0], "@rpath/PDFium.framework/PDFium");
    }

    #[test]
    fn dylib_preferred_over_static_archive() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("lib")).unwrap();
        std::fs::write(tmp.path().join("lib/libpdfium.a"), b"!<arch>").unwrap();
        std::fs::write(tmp.path().join("lib/libpdfium.dylib"), b"").unwrap();
        assert_eq!(
            find_primary_binary(tmp.path()).unwrap(),
            tmp.path().join("lib/libpdfium.dylib")
        );

        std::fs::remove_file(tmp.path().join("lib/libpdfium.dylib")).unwrap();
        assert_eq!(
            find_primary_binary(tmp.path()).unwrap(),
            tmp.path().join("lib/libpdfium.a")
        );
    }

    #[test]
    fn missing_binary_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("include")).unwrap();
        assert!(matches!(
            find_primary_binary(tmp.path()),
            Err(Error::BinaryNotFound(_))
        ));
    }
}
