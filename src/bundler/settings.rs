//! Build configurations and packaging settings.
//!
//! The set of upstream archives is fixed: seven platform/architecture
//! combinations, three of which pairs are later merged into fat frameworks.
//! Every working path is derived from a configuration's identity so that no
//! stage has to discover another stage's output by searching the filesystem.

use crate::bundler::error::{Error, Result};
use crate::version::{PdfiumVersion, ReleaseTag};
use path_absolutize::Absolutize;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Default location of upstream release downloads.
pub const DEFAULT_DOWNLOAD_BASE: &str =
    "https://github.com/bblanchon/pdfium-binaries/releases/download/";

/// Default framework (and binary) name.
pub const DEFAULT_FRAMEWORK_NAME: &str = "PDFium";

/// Default `CFBundleIdentifier`.
pub const DEFAULT_BUNDLE_IDENTIFIER: &str = "io.github.bblanchon.pdfium";

/// CPU architecture of an upstream archive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Arch {
    /// AArch64 / ARM64 - Apple Silicon and iOS devices
    Arm64,
    /// x86_64 - Intel Macs and Intel simulators
    X64,
}

impl Arch {
    /// Architecture token used in upstream archive names.
    pub fn archive_name(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::X64 => "x64",
        }
    }

    /// Architecture name as reported by `lipo -archs`.
    pub fn lipo_name(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::X64 => "x86_64",
        }
    }

    /// Map a Mach-O `cputype` to an architecture.
    pub fn from_cpu_type(cputype: u32) -> Option<Self> {
        use goblin::mach::constants::cputype::{CPU_TYPE_ARM64, CPU_TYPE_X86_64};
        match cputype {
            CPU_TYPE_ARM64 => Some(Arch::Arm64),
            CPU_TYPE_X86_64 => Some(Arch::X64),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lipo_name())
    }
}

/// Framework directory convention.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layout {
    /// iOS style: binary, headers and Info.plist directly under the bundle root
    Shallow,
    /// macOS style: `Versions/A/...` with `Versions/Current` and root aliases
    Deep,
}

/// Apple platform family an archive targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PlatformFamily {
    /// Physical iOS devices
    IosDevice,
    /// iOS simulator
    IosSimulator,
    /// iOS apps running on macOS through Mac Catalyst
    MacCatalyst,
    /// Native macOS
    MacOs,
}

impl PlatformFamily {
    /// Prefix used in upstream archive names (`pdfium-<prefix>-<arch>.tgz`).
    pub fn archive_prefix(self) -> &'static str {
        match self {
            PlatformFamily::IosDevice => "ios-device",
            PlatformFamily::IosSimulator => "ios-simulator",
            PlatformFamily::MacCatalyst => "ios-catalyst",
            PlatformFamily::MacOs => "mac",
        }
    }

    /// Bundle layout `xcodebuild -create-xcframework` expects for this family.
    pub fn layout(self) -> Layout {
        match self {
            PlatformFamily::IosDevice | PlatformFamily::IosSimulator => Layout::Shallow,
            PlatformFamily::MacCatalyst | PlatformFamily::MacOs => Layout::Deep,
        }
    }

    /// `CFBundleSupportedPlatforms` entry.
    pub fn supported_platform(self) -> &'static str {
        match self {
            PlatformFamily::IosDevice => "iPhoneOS",
            PlatformFamily::IosSimulator => "iPhoneSimulator",
            PlatformFamily::MacCatalyst | PlatformFamily::MacOs => "MacOSX",
        }
    }

    /// Info.plist key carrying the minimum OS version.
    pub fn minimum_os_key(self) -> &'static str {
        match self.layout() {
            Layout::Shallow => "MinimumOSVersion",
            Layout::Deep => "LSMinimumSystemVersion",
        }
    }

    /// Minimum OS version written to Info.plist.
    pub fn minimum_os_version(self) -> &'static str {
        match self {
            PlatformFamily::IosDevice | PlatformFamily::IosSimulator => "13.0",
            PlatformFamily::MacCatalyst | PlatformFamily::MacOs => "11.0",
        }
    }

    /// Platform variant as used in XCFramework library identifiers.
    pub fn variant(self) -> Option<&'static str> {
        match self {
            PlatformFamily::IosSimulator => Some("simulator"),
            PlatformFamily::MacCatalyst => Some("maccatalyst"),
            PlatformFamily::IosDevice | PlatformFamily::MacOs => None,
        }
    }
}

/// One upstream archive to fetch and assemble.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BuildConfig {
    /// Target platform family
    pub family: PlatformFamily,
    /// Target architecture
    pub arch: Arch,
}

impl BuildConfig {
    /// The single-architecture device configuration shipped unmerged.
    pub const IOS_DEVICE: BuildConfig = BuildConfig::new(PlatformFamily::IosDevice, Arch::Arm64);

    /// Every configuration a build fetches.
    pub const ALL: [BuildConfig; 7] = [
        BuildConfig::IOS_DEVICE,
        BuildConfig::new(PlatformFamily::IosSimulator, Arch::Arm64),
        BuildConfig::new(PlatformFamily::IosSimulator, Arch::X64),
        BuildConfig::new(PlatformFamily::MacCatalyst, Arch::Arm64),
        BuildConfig::new(PlatformFamily::MacCatalyst, Arch::X64),
        BuildConfig::new(PlatformFamily::MacOs, Arch::Arm64),
        BuildConfig::new(PlatformFamily::MacOs, Arch::X64),
    ];

    /// Create a configuration.
    pub const fn new(family: PlatformFamily, arch: Arch) -> Self {
        Self { family, arch }
    }

    /// Stable key, e.g. `ios-simulator-x64`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.family.archive_prefix(), self.arch.archive_name())
    }

    /// Upstream archive file name, e.g. `pdfium-mac-arm64.tgz`.
    pub fn archive_name(&self) -> String {
        format!("pdfium-{}.tgz", self.key())
    }

    /// Platform variant, if any.
    pub fn variant(&self) -> Option<&'static str> {
        self.family.variant()
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Two single-architecture configurations merged into one fat framework.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FatGroup {
    /// Group name, used for the working directory
    pub name: &'static str,
    /// Shared platform family
    pub family: PlatformFamily,
    /// Configurations whose binaries are combined; the first is the structural base
    pub members: [BuildConfig; 2],
}

impl FatGroup {
    /// Every merged grouping in the final XCFramework.
    pub const ALL: [FatGroup; 3] = [
        FatGroup::pair("ios-simulator", PlatformFamily::IosSimulator),
        FatGroup::pair("ios-maccatalyst", PlatformFamily::MacCatalyst),
        FatGroup::pair("macos", PlatformFamily::MacOs),
    ];

    const fn pair(name: &'static str, family: PlatformFamily) -> Self {
        Self {
            name,
            family,
            members: [
                BuildConfig::new(family, Arch::Arm64),
                BuildConfig::new(family, Arch::X64),
            ],
        }
    }
}

/// Immutable settings for one packaging run.
#[derive(Debug, Clone)]
pub struct Settings {
    framework_name: String,
    bundle_identifier: String,
    version: PdfiumVersion,
    tag: ReleaseTag,
    build_id: String,
    work_dir: PathBuf,
    output_dir: PathBuf,
    download_base: Url,
    keep_work_dir: bool,
}

impl Settings {
    /// Framework and binary name (`PDFium`).
    pub fn framework_name(&self) -> &str {
        &self.framework_name
    }

    /// `CFBundleIdentifier`.
    pub fn bundle_identifier(&self) -> &str {
        &self.bundle_identifier
    }

    /// Full upstream version.
    pub fn version(&self) -> &PdfiumVersion {
        &self.version
    }

    /// Upstream release tag.
    pub fn tag(&self) -> &ReleaseTag {
        &self.tag
    }

    /// Build identifier embedded in the archive name.
    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    /// Scratch directory removed after a successful run.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Directory holding the persisted artifacts.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether the work directory survives a successful run.
    pub fn keep_work_dir(&self) -> bool {
        self.keep_work_dir
    }

    /// Download URL for one configuration's archive.
    pub fn archive_url(&self, config: &BuildConfig) -> Result<Url> {
        let tag = self.tag.as_str().replace('/', "%2F");
        Ok(self
            .download_base
            .join(&format!("{}/{}", tag, config.archive_name()))?)
    }

    /// `<name>.framework`
    pub fn framework_dir_name(&self) -> String {
        format!("{}.framework", self.framework_name)
    }

    /// Extraction directory for a configuration's archive.
    pub fn extract_dir(&self, config: &BuildConfig) -> PathBuf {
        self.work_dir.join("extract").join(config.key())
    }

    /// Framework assembled for a single configuration.
    pub fn framework_dir(&self, config: &BuildConfig) -> PathBuf {
        self.work_dir
            .join("frameworks")
            .join(config.key())
            .join(self.framework_dir_name())
    }

    /// Merged framework for a fat grouping.
    pub fn fat_framework_dir(&self, group: &FatGroup) -> PathBuf {
        self.work_dir
            .join("fat")
            .join(group.name)
            .join(self.framework_dir_name())
    }

    /// Marker file a fan-out job writes its framework path to.
    pub fn marker_path(&self, config: &BuildConfig) -> PathBuf {
        self.work_dir
            .join("markers")
            .join(format!("{}.path", config.key()))
    }

    /// Final container path.
    pub fn xcframework_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.xcframework", self.framework_name))
    }

    /// Unique archive file name for this build.
    pub fn archive_file_name(&self) -> String {
        format!(
            "{}-{}-{}.xcframework.zip",
            self.framework_name,
            self.tag.build_number(),
            self.build_id
        )
    }

    /// Build-id-free alias for the latest archive.
    pub fn archive_alias_name(&self) -> String {
        format!("{}.xcframework.zip", self.framework_name)
    }
}

/// Builder for [`Settings`].
///
/// ```no_run
/// use pdfium_xcframework::bundler::SettingsBuilder;
/// use pdfium_xcframework::version::{PdfiumVersion, ReleaseTag};
///
/// let version = PdfiumVersion::parse("144.0.7506.0")?;
/// let settings = SettingsBuilder::new()
///     .tag(ReleaseTag::from_version(&version))
///     .version(version)
///     .build_id("20261016120000")
///     .work_dir("build")
///     .output_dir("dist")
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    framework_name: Option<String>,
    bundle_identifier: Option<String>,
    version: Option<PdfiumVersion>,
    tag: Option<ReleaseTag>,
    build_id: Option<String>,
    work_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    download_base: Option<String>,
    keep_work_dir: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the framework name (default `PDFium`).
    pub fn framework_name(mut self, name: impl Into<String>) -> Self {
        self.framework_name = Some(name.into());
        self
    }

    /// Sets the bundle identifier.
    pub fn bundle_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.bundle_identifier = Some(identifier.into());
        self
    }

    /// Sets the upstream version.
    pub fn version(mut self, version: PdfiumVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the upstream tag.
    pub fn tag(mut self, tag: ReleaseTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Sets the build identifier.
    pub fn build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }

    /// Sets the scratch directory.
    pub fn work_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(path.into());
        self
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Overrides the download base URL.
    pub fn download_base(mut self, url: impl Into<String>) -> Self {
        self.download_base = Some(url.into());
        self
    }

    /// Keep the scratch directory after a successful run.
    pub fn keep_work_dir(mut self, keep: bool) -> Self {
        self.keep_work_dir = keep;
        self
    }

    /// Validates and builds the settings.
    pub fn build(self) -> Result<Settings> {
        let missing = |field: &str| Error::GenericError(format!("{field} is required"));

        let version = self.version.ok_or_else(|| missing("version"))?;
        let tag = self.tag.unwrap_or_else(|| ReleaseTag::from_version(&version));
        let build_id = self.build_id.ok_or_else(|| missing("build id"))?;
        if build_id.is_empty() || build_id.contains(['/', '\\']) {
            return Err(Error::GenericError(format!(
                "build id {build_id:?} cannot be used in a file name"
            )));
        }

        let work_dir = absolute(&self.work_dir.ok_or_else(|| missing("work directory"))?)?;
        let output_dir = absolute(&self.output_dir.ok_or_else(|| missing("output directory"))?)?;
        if work_dir == output_dir || output_dir.starts_with(&work_dir) {
            return Err(Error::GenericError(format!(
                "output directory {} must not live inside the work directory {}",
                output_dir.display(),
                work_dir.display()
            )));
        }

        let mut base = self
            .download_base
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE.to_string());
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Settings {
            framework_name: self
                .framework_name
                .unwrap_or_else(|| DEFAULT_FRAMEWORK_NAME.to_string()),
            bundle_identifier: self
                .bundle_identifier
                .unwrap_or_else(|| DEFAULT_BUNDLE_IDENTIFIER.to_string()),
            version,
            tag,
            build_id,
            work_dir,
            output_dir,
            download_base: Url::parse(&base)?,
            keep_work_dir: self.keep_work_dir,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path.absolutize()?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn settings() -> Settings {
        let version = PdfiumVersion::parse("144.0.7506.0").unwrap();
        SettingsBuilder::new()
            .version(version)
            .build_id("20261016120000")
            .work_dir("/tmp/pdfium-work")
            .output_dir("/tmp/pdfium-dist")
            .build()
            .unwrap()
    }

    #[test]
    fn seven_distinct_configurations() {
        let keys: HashSet<String> = BuildConfig::ALL.iter().map(BuildConfig::key).collect();
        assert_eq!(keys.len(), 7);
        assert!(keys.contains("ios-device-arm64"));
        assert!(keys.contains("ios-catalyst-x64"));
        assert!(keys.contains("mac-arm64"));
    }

    #[test]
    fn fat_group_members_are_configured() {
        for group in FatGroup::ALL {
            for member in group.members {
                assert!(BuildConfig::ALL.contains(&member));
                assert_eq!(member.family, group.family);
            }
            assert_ne!(group.members[0].arch, group.members[1].arch);
        }
    }

    #[test]
    fn layouts_follow_platform_family() {
        assert_eq!(PlatformFamily::IosDevice.layout(), Layout::Shallow);
        assert_eq!(PlatformFamily::IosSimulator.layout(), Layout::Shallow);
        assert_eq!(PlatformFamily::MacCatalyst.layout(), Layout::Deep);
        assert_eq!(PlatformFamily::MacOs.layout(), Layout::Deep);
        assert_eq!(PlatformFamily::MacOs.minimum_os_key(), "LSMinimumSystemVersion");
        assert_eq!(PlatformFamily::IosDevice.minimum_os_key(), "MinimumOSVersion");
    }

    #[test]
    fn archive_url_encodes_tag() {
        let s = settings();
        let config = BuildConfig::new(PlatformFamily::MacOs, Arch::X64);
        assert_eq!(
            s.archive_url(&config).unwrap().as_str(),
            "https://github.com/bblanchon/pdfium-binaries/releases/download/chromium%2F7506/pdfium-mac-x64.tgz"
        );
    }

    #[test]
    fn paths_are_keyed_by_configuration() {
        let s = settings();
        let config = BuildConfig::IOS_DEVICE;
        assert_eq!(
            s.framework_dir(&config),
            PathBuf::from("/tmp/pdfium-work/frameworks/ios-device-arm64/PDFium.framework")
        );
        assert_eq!(
            s.marker_path(&config),
            PathBuf::from("/tmp/pdfium-work/markers/ios-device-arm64.path")
        );
        assert_eq!(
            s.archive_file_name(),
            "PDFium-7506-20261016120000.xcframework.zip"
        );
    }

    #[test]
    fn output_inside_work_dir_is_rejected() {
        let version = PdfiumVersion::parse("144.0.7506.0").unwrap();
        let result = SettingsBuilder::new()
            .version(version)
            .build_id("1")
            .work_dir("/tmp/pdfium-work")
            .output_dir("/tmp/pdfium-work/dist")
            .build();
        assert!(result.is_err());
    }
}
