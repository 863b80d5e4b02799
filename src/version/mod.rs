//! PDFium version and upstream release tag handling.
//!
//! Upstream publishes archives under tags of the form `chromium/<build>`, while
//! the framework metadata needs the four-component Chromium version
//! (`144.0.7506.0`) and its three-component display form (`144.0.7506`).

use crate::error::{Result, VersionError};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// GitHub API endpoint for the latest upstream release.
pub const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/bblanchon/pdfium-binaries/releases/latest";

const FOUR_PART_VERSION: &str = r"\d+\.\d+\.\d+\.\d+";

/// Four-component Chromium version (`major.minor.build.patch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PdfiumVersion {
    /// Chromium milestone
    pub major: u32,
    /// Always 0 upstream
    pub minor: u32,
    /// Chromium build number; also names the upstream tag
    pub build: u32,
    /// Patch level
    pub patch: u32,
}

impl PdfiumVersion {
    /// Create a version from its components.
    pub const fn new(major: u32, minor: u32, build: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            build,
            patch,
        }
    }

    /// Parse a strict four-component version string.
    pub fn parse(input: &str) -> std::result::Result<Self, VersionError> {
        let invalid = |reason: &str| VersionError::InvalidVersion {
            version: input.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = input.trim().split('.').collect();
        if parts.len() != 4 {
            return Err(invalid("expected four dot-separated components"));
        }

        let mut numbers = [0u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| invalid("components must be unsigned integers"))?;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            build: numbers[2],
            patch: numbers[3],
        })
    }

    /// Find the first four-component version embedded in free text,
    /// e.g. a release title such as `PDFium 144.0.7506.0`.
    pub fn find_in(text: &str) -> Option<Self> {
        let pattern = Regex::new(FOUR_PART_VERSION).ok()?;
        Self::parse(pattern.find(text)?.as_str()).ok()
    }

    /// Three-component short version used for `CFBundleShortVersionString`.
    pub fn display(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl fmt::Display for PdfiumVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.patch)
    }
}

impl FromStr for PdfiumVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Upstream release tag, e.g. `chromium/7506`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag(String);

impl ReleaseTag {
    /// Validate and wrap a tag string.
    pub fn parse(tag: &str) -> std::result::Result<Self, VersionError> {
        let tag = tag.trim();
        match tag.strip_prefix("chromium/") {
            Some(build) if !build.is_empty() && build.chars().all(|c| c.is_ascii_digit()) => {
                Ok(Self(tag.to_string()))
            }
            _ => Err(VersionError::InvalidTag {
                tag: tag.to_string(),
            }),
        }
    }

    /// Derive the tag that publishes archives for `version`.
    pub fn from_version(version: &PdfiumVersion) -> Self {
        Self(format!("chromium/{}", version.build))
    }

    /// Build number component (`7506` for `chromium/7506`).
    pub fn build_number(&self) -> &str {
        self.0.strip_prefix("chromium/").unwrap_or(&self.0)
    }

    /// Tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the caller asked for a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    /// Query upstream for its newest release
    Latest,
    /// A literal version
    Explicit {
        /// Full version
        version: PdfiumVersion,
        /// Tag override, derived from the version when absent
        tag: Option<ReleaseTag>,
    },
    /// Values supplied through `PDFIUM_VERSION` / `PDFIUM_TAG`
    FromEnvironment {
        /// Full version
        version: PdfiumVersion,
        /// Tag, derived from the version when absent
        tag: Option<ReleaseTag>,
    },
}

impl VersionRequest {
    /// Interpret the positional CLI token and the environment fallbacks.
    ///
    /// The positional token wins over the environment version. A supplied
    /// tag applies to any literal version; `latest` takes upstream's tag.
    pub fn from_inputs(
        token: Option<&str>,
        env_version: Option<&str>,
        env_tag: Option<&str>,
    ) -> Result<Self> {
        let tag = env_tag
            .filter(|t| !t.trim().is_empty())
            .map(ReleaseTag::parse)
            .transpose()?;

        match token.map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("latest") => {
                if let Some(tag) = tag {
                    log::warn!("Ignoring tag {} for the latest release", tag);
                }
                Ok(Self::Latest)
            }
            Some(t) => Ok(Self::Explicit {
                version: PdfiumVersion::parse(t)?,
                tag,
            }),
            None => {
                let version = env_version
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(VersionError::Unspecified)?;
                Ok(Self::FromEnvironment {
                    version: PdfiumVersion::parse(version)?,
                    tag,
                })
            }
        }
    }
}

/// Version and tag a build runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Full four-component version
    pub version: PdfiumVersion,
    /// Upstream tag archives are downloaded from
    pub tag: ReleaseTag,
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
}

/// Resolve a request into a concrete version and tag.
///
/// Only [`VersionRequest::Latest`] touches the network.
pub async fn resolve(request: VersionRequest, client: &reqwest::Client) -> Result<ResolvedVersion> {
    match request {
        VersionRequest::Explicit { version, tag }
        | VersionRequest::FromEnvironment { version, tag } => Ok(ResolvedVersion {
            tag: tag.unwrap_or_else(|| ReleaseTag::from_version(&version)),
            version,
        }),
        VersionRequest::Latest => fetch_latest(client, LATEST_RELEASE_URL).await,
    }
}

/// Query a GitHub "latest release" endpoint.
pub async fn fetch_latest(client: &reqwest::Client, url: &str) -> Result<ResolvedVersion> {
    let failed = |reason: String| VersionError::LatestLookupFailed {
        url: url.to_string(),
        reason,
    };

    log::info!("Querying latest PDFium release from {}", url);

    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP status {}", response.status())).into());
    }

    let release: GithubRelease = response.json().await.map_err(|e| failed(e.to_string()))?;
    let resolved = resolve_release(&release.tag_name, release.name.as_deref())?;

    log::info!("Latest release: {} ({})", resolved.tag, resolved.version);
    Ok(resolved)
}

fn resolve_release(tag_name: &str, name: Option<&str>) -> Result<ResolvedVersion> {
    let tag = ReleaseTag::parse(tag_name)?;
    let version = name
        .and_then(PdfiumVersion::find_in)
        .ok_or_else(|| VersionError::InvalidVersion {
            version: name.unwrap_or_default().to_string(),
            reason: format!("release {tag} does not name a four-component version"),
        })?;

    if version.build.to_string() != tag.build_number() {
        log::warn!(
            "Release {} names version {} whose build component differs from the tag",
            tag,
            version
        );
    }

    Ok(ResolvedVersion { version, tag })
}
