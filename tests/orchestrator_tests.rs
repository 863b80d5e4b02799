mod common;

#[cfg(test)]
mod tests {
    use super::common::{self, FakeSource, FakeTools};
    use pdfium_xcframework::bundler::{
        AppleTools, BuildConfig, Bundler, Error, FatGroup, Layout,
    };
    use pdfium_xcframework::package::{self, VersionRecord};

    #[tokio::test]
    async fn test_bundle_produces_device_and_fat_libraries() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = common::settings(tmp.path());
        let source = FakeSource {
            with_dsym: true,
            ..FakeSource::default()
        };
        let bundler = Bundler::new(settings.clone(), source, FakeTools::default());

        let output = bundler.bundle().await.unwrap();

        assert_eq!(output.path, settings.xcframework_path());
        assert!(output.path.join("Info.plist").is_file());
        assert_eq!(output.libraries.len(), 1 + FatGroup::ALL.len());
        assert_eq!(output.libraries[0].root, settings.framework_dir(&BuildConfig::IOS_DEVICE));

        for config in BuildConfig::ALL {
            let dir = settings.framework_dir(&config);
            assert_eq!(dir.file_name().unwrap(), "PDFium.framework");
            let binary = match config.family.layout() {
                Layout::Shallow => dir.join("PDFium"),
                Layout::Deep => dir.join("Versions/A/PDFium"),
            };
            assert!(binary.is_file(), "{} has no binary", config.key());
            assert_eq!(binary.file_name().unwrap(), "PDFium");

            let marker = std::fs::read_to_string(settings.marker_path(&config)).unwrap();
            assert_eq!(marker.trim(), settings.framework_dir(&config).display().to_string());
        }

        let tools = FakeTools::default();
        for (merged, group) in output.libraries[1..].iter().zip(FatGroup::ALL.iter()) {
            assert_eq!(merged.root, settings.fat_framework_dir(group));
            assert_eq!(merged.layout, group.family.layout());
            assert_eq!(
                tools.lipo_archs(&merged.binary()).await.unwrap(),
                vec!["arm64".to_string(), "x86_64".to_string()]
            );
            let dwarf = merged.dsym_dwarf().unwrap();
            assert_eq!(tools.lipo_archs(&dwarf).await.unwrap().len(), 2);
        }

        let macos = &output.libraries[3];
        assert_eq!(macos.layout, Layout::Deep);
        #[cfg(unix)]
        assert_eq!(
            std::fs::read_link(macos.root.join("PDFium")).unwrap(),
            std::path::PathBuf::from("Versions/Current/PDFium")
        );

        // Fake binaries are not Mach-O: one finding per platform, not fatal.
        assert_eq!(output.report.platforms, 4);
        assert_eq!(output.report.available_libraries, Some(4));
        assert_eq!(output.report.error_count(), 4);
    }

    #[tokio::test]
    async fn test_failed_download_fails_run_and_leaves_no_container() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = common::settings(tmp.path());
        std::fs::create_dir_all(settings.xcframework_path().join("stale")).unwrap();

        let source = FakeSource {
            fail_key: Some("mac-x64".to_string()),
            ..FakeSource::default()
        };
        let bundler = Bundler::new(settings.clone(), source, FakeTools::default());

        match bundler.bundle().await {
            Err(Error::JobsFailed { failed }) => assert_eq!(failed, vec!["mac-x64".to_string()]),
            other => panic!("expected JobsFailed, got {other:?}"),
        }
        assert!(!settings.xcframework_path().exists());

        // Siblings still ran to completion.
        assert!(settings.marker_path(&BuildConfig::IOS_DEVICE).is_file());
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_container() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = common::settings(tmp.path());
        let stale = settings.xcframework_path().join("stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        let bundler = Bundler::new(settings.clone(), FakeSource::default(), FakeTools::default());
        bundler.bundle().await.unwrap();

        assert!(!stale.exists());
        assert!(settings.xcframework_path().join("ios-device-arm64").is_dir());
    }

    #[tokio::test]
    async fn test_package_writes_archive_checksum_aliases_and_record() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = common::settings(tmp.path());
        let bundler = Bundler::new(settings.clone(), FakeSource::default(), FakeTools::default());
        bundler.bundle().await.unwrap();

        let packaged = package::package(&settings).await.unwrap();
        let dist = settings.output_dir();
        let archive_name = "PDFium-7506-20261016120000.xcframework.zip";

        assert_eq!(packaged.archive, dist.join(archive_name));
        assert!(packaged.archive.is_file());
        assert_eq!(packaged.sha256, package::sha256_file(&packaged.archive).await.unwrap());
        assert_eq!(
            std::fs::read_to_string(&packaged.checksum_file).unwrap(),
            format!("{}  {}\n", packaged.sha256, archive_name)
        );

        #[cfg(unix)]
        {
            assert_eq!(
                std::fs::read_link(dist.join("PDFium.xcframework.zip")).unwrap(),
                std::path::PathBuf::from(archive_name)
            );
            assert_eq!(
                std::fs::read_link(dist.join("PDFium.xcframework.zip.sha256")).unwrap(),
                std::path::PathBuf::from(format!("{archive_name}.sha256"))
            );
        }

        let record = VersionRecord::read(&packaged.record).await.unwrap();
        assert_eq!(record.version, common::VERSION);
        assert_eq!(record.tag.as_str(), "chromium/7506");
        assert_eq!(record.build_id, "20261016120000");
        assert_eq!(record.archive, archive_name);

        assert!(!settings.work_dir().exists());
        assert!(settings.xcframework_path().is_dir());
    }
}
