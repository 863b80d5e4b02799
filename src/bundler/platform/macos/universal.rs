//! Fat framework creation (arm64 + x86_64) with `lipo`.
//!
//! The first member of a [`FatGroup`] is copied as the structural base;
//! its binary is then replaced by the merged one and the install name,
//! deep-layout links and Info.plist are refreshed.

use super::framework::{self, FrameworkBundle};
use super::tools::AppleTools;
use crate::bundler::{
    BuildConfig, FatGroup, Layout, Settings,
    error::{Context, Result},
    utils::fs,
};
use std::collections::HashMap;

/// Merge the two member frameworks of `group`.
///
/// Returns `Ok(None)` when a member was never assembled; the missing platform
/// then surfaces when the XCFramework is built.
pub async fn merge_group<T: AppleTools>(
    tools: &T,
    settings: &Settings,
    group: &FatGroup,
    bundles: &HashMap<BuildConfig, FrameworkBundle>,
) -> Result<Option<FrameworkBundle>> {
    let [base_config, other_config] = group.members;
    let (Some(base), Some(other)) = (bundles.get(&base_config), bundles.get(&other_config)) else {
        log::error!(
            "Skipping fat framework {}: missing {} or {}",
            group.name,
            base_config,
            other_config
        );
        return Ok(None);
    };

    let mut merged = FrameworkBundle::at(
        settings.fat_framework_dir(group),
        &base.name,
        base.layout,
        base.kind,
    );
    log::info!("Merging {} and {} into {}", base_config, other_config, merged.root.display());

    if let Some(parent) = merged.root.parent() {
        fs::create_dir_all(parent, true).await?;
    }
    fs::copy_dir(&base.root, &merged.root)
        .await
        .with_context(|| format!("copying {} as base for {}", base_config, group.name))?;

    // The copied binary is overwritten in place.
    let binary = merged.binary();
    tools
        .lipo_create(&[base.binary(), other.binary()], &binary)
        .await
        .with_context(|| format!("merging binaries for {}", group.name))?;

    framework::apply_install_name(tools, &merged).await?;

    if merged.layout == Layout::Deep {
        framework::link_versioned_layout(&merged).await?;
    }
    framework::refresh_executable_name(&merged)?;

    merged.dsym = merge_debug_symbols(tools, base, other, &merged).await?;

    let archs = tools.lipo_archs(&binary).await?;
    log::debug!("{} architectures: {}", group.name, archs.join(" "));

    Ok(Some(merged))
}

/// Copy the base dSYM next to the merged framework and merge both DWARF
/// binaries into it. Skipped unless both members carry debug symbols.
async fn merge_debug_symbols<T: AppleTools>(
    tools: &T,
    base: &FrameworkBundle,
    other: &FrameworkBundle,
    merged: &FrameworkBundle,
) -> Result<Option<std::path::PathBuf>> {
    let (Some(base_dsym), Some(base_dwarf), Some(other_dwarf)) =
        (base.dsym.as_ref(), base.dsym_dwarf(), other.dsym_dwarf())
    else {
        return Ok(None);
    };

    let dest = merged.dsym_path();
    fs::remove_dir_all(&dest).await?;
    fs::copy_dir(base_dsym, &dest).await?;

    let dwarf = dest.join("Contents/Resources/DWARF").join(&merged.name);
    tools
        .lipo_create(&[base_dwarf, other_dwarf], &dwarf)
        .await
        .context("merging debug symbols")?;

    Ok(Some(dest))
}
