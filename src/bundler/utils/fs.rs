//! File system utilities for bundling.
//!
//! Provides file operations with automatic directory creation,
//! symlink preservation, and path-aware error reporting.

use crate::bail;
use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path)
            .await
            .fs_context("removing directory", path),
        Ok(_) => fs::remove_file(path).await.fs_context("removing file", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Fs {
            context: "inspecting",
            path: path.to_path_buf(),
            error: e,
        }),
    }
}

/// Makes a symbolic link at `dst` pointing at `src`.
///
/// `src` is stored verbatim, so relative targets stay relative.
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link at `dst` pointing at `src`.
#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let resolved = dst.parent().map(|p| p.join(src)).unwrap_or_else(|| src.to_path_buf());
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

/// Replaces whatever exists at `link` with a symlink to `target`.
pub async fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    remove_dir_all(link).await?;
    symlink(target, link).fs_context("creating symlink", link)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        bail!("{from:?} does not exist");
    }
    if !from.is_file() {
        bail!("{from:?} is not a file");
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Symlinks are recreated with their original (usually relative) targets.
/// Entries for which `skip` returns true are not copied; a skipped
/// directory is skipped with all of its contents.
pub async fn copy_dir_filtered<F>(from: &Path, to: &Path, skip: F) -> Result<()>
where
    F: Fn(&Path) -> bool,
{
    if !from.is_dir() {
        bail!("{from:?} is not a directory");
    }
    fs::create_dir_all(to)
        .await
        .fs_context("creating directory", to)?;

    let entries = walkdir::WalkDir::new(from)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !skip(e.path()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for entry in entries {
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())
                .await
                .fs_context("reading symlink", entry.path())?;
            symlink(&target, &dest_path).fs_context("creating symlink", &dest_path)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)
                .await
                .fs_context("creating directory", &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path)
                .await
                .fs_context("copying file", entry.path())?;
        }
    }

    Ok(())
}

/// Recursively copies a directory, preserving symlinks.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    copy_dir_filtered(from, to, |_| false).await
}
