//! Distribution packaging of a built XCFramework.
//!
//! Produces, in the output directory:
//!
//! - `PDFium-<build>-<build id>.xcframework.zip` and its `.sha256` sidecar
//! - `PDFium.xcframework.zip` / `PDFium.xcframework.zip.sha256` aliases
//!   pointing at the newest archive
//! - `release.env`, the [`VersionRecord`]

pub mod checksum;
pub mod record;

pub use checksum::sha256_file;
pub use record::{RECORD_FILE_NAME, VersionRecord};

use crate::bundler::{
    Settings,
    error::{Context, ErrorExt},
    utils::fs,
};
use crate::error::Result;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use zip::{ZipWriter, write::SimpleFileOptions};

/// Files written by [`package`].
#[derive(Debug, Clone)]
pub struct PackagedArchive {
    /// Uniquely named archive
    pub archive: PathBuf,
    /// Its checksum sidecar
    pub checksum_file: PathBuf,
    /// Hex SHA-256 of the archive
    pub sha256: String,
    /// Version record path
    pub record: PathBuf,
}

/// Zip `container` into `zip_path`.
///
/// Entries are rooted at the container's directory name. Symlinks are stored
/// as symlinks and unix modes are preserved.
pub async fn zip_container(container: &Path, zip_path: &Path) -> crate::bundler::Result<()> {
    let container = container.to_path_buf();
    let zip_path = zip_path.to_path_buf();
    tokio::task::spawn_blocking(move || write_zip(&container, &zip_path)).await?
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn unix_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn unix_mode(metadata: &std::fs::Metadata) -> u32 {
    if metadata.is_dir() { 0o755 } else { 0o644 }
}

fn write_zip(container: &Path, zip_path: &Path) -> crate::bundler::Result<()> {
    let base = container.parent().unwrap_or(Path::new(""));
    let file = std::fs::File::create(zip_path).fs_context("creating archive", zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in walkdir::WalkDir::new(container).sort_by_file_name() {
        let entry = entry?;
        let name = entry_name(entry.path().strip_prefix(base)?);
        let metadata = entry.metadata()?;
        let entry_options = options.unix_permissions(unix_mode(&metadata));

        if entry.file_type().is_symlink() {
            let target = std::fs::read_link(entry.path()).fs_context("reading symlink", entry.path())?;
            zip.add_symlink(name, target.to_string_lossy().replace('\\', "/"), entry_options)?;
        } else if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), entry_options)?;
        } else {
            zip.start_file(name, entry_options)?;
            let mut source = std::fs::File::open(entry.path()).fs_context("opening file", entry.path())?;
            std::io::copy(&mut source, &mut zip).fs_context("compressing file", entry.path())?;
        }
    }

    let mut file = zip.finish()?;
    file.flush().fs_context("flushing archive", zip_path)?;
    Ok(())
}

/// Package the container at `settings.xcframework_path()`.
///
/// Removes the work directory afterwards unless the settings keep it.
pub async fn package(settings: &Settings) -> Result<PackagedArchive> {
    let output_dir = settings.output_dir();
    let container = settings.xcframework_path();
    let archive_name = settings.archive_file_name();
    let archive = output_dir.join(&archive_name);

    fs::create_dir_all(output_dir, false).await?;
    log::info!("Compressing {} into {}", container.display(), archive.display());
    zip_container(&container, &archive)
        .await
        .with_context(|| format!("zipping {}", container.display()))?;

    let sha256 = sha256_file(&archive).await?;
    let checksum_name = format!("{archive_name}.sha256");
    let checksum_file = output_dir.join(&checksum_name);
    tokio::fs::write(&checksum_file, checksum::sidecar_line(&sha256, &archive_name))
        .await
        .fs_context("writing checksum", &checksum_file)?;
    log::info!("SHA-256 {}", sha256);

    let alias = settings.archive_alias_name();
    fs::replace_symlink(Path::new(&archive_name), &output_dir.join(&alias)).await?;
    fs::replace_symlink(
        Path::new(&checksum_name),
        &output_dir.join(format!("{alias}.sha256")),
    )
    .await?;

    let record = output_dir.join(RECORD_FILE_NAME);
    VersionRecord {
        version: *settings.version(),
        tag: settings.tag().clone(),
        build_id: settings.build_id().to_string(),
        archive: archive_name,
    }
    .write(&record)
    .await?;

    if settings.keep_work_dir() {
        log::info!("Keeping work directory {}", settings.work_dir().display());
    } else {
        fs::remove_dir_all(settings.work_dir()).await?;
    }

    Ok(PackagedArchive {
        archive,
        checksum_file,
        sha256,
        record,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Read;

    #[tokio::test]
    async fn zip_keeps_symlinks_and_modes() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let container = tmp.path().join("PDFium.xcframework");
        let fw = container.join("macos-arm64_x86_64/PDFium.framework");
        std::fs::create_dir_all(fw.join("Versions/A")).unwrap();
        std::fs::write(fw.join("Versions/A/PDFium"), b"bin").unwrap();
        std::fs::set_permissions(
            fw.join("Versions/A/PDFium"),
            std::fs::Permissions::from_mode(0o755),
        )
        .unwrap();
        std::os::unix::fs::symlink("A", fw.join("Versions/Current")).unwrap();

        let zip_path = tmp.path().join("out.zip");
        zip_container(&container, &zip_path).await.unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
        {
            let binary = archive
                .by_name("PDFium.xcframework/macos-arm64_x86_64/PDFium.framework/Versions/A/PDFium")
                .unwrap();
            assert_eq!(binary.unix_mode().map(|m| m & 0o777), Some(0o755));
        }
        let mut link = archive
            .by_name("PDFium.xcframework/macos-arm64_x86_64/PDFium.framework/Versions/Current")
            .unwrap();
        assert!(link.is_symlink());
        let mut target = String::new();
        link.read_to_string(&mut target).unwrap();
        assert_eq!(target, "A");
    }
}
