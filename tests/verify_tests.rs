mod common;

#[cfg(test)]
mod tests {
    use super::common;
    use pdfium_xcframework::bundler::{Finding, verify_xcframework};

    #[test]
    fn test_valid_container_is_clean() {
        let tmp = tempfile::tempdir().unwrap();
        let container = common::write_container(tmp.path(), &common::arm64_dylib_header());

        let report = verify_xcframework(&container).unwrap();
        assert!(report.is_clean(), "{:?}", report.findings);
        assert_eq!(report.platforms, 1);
        assert!(
            report
                .findings
                .contains(&Finding::Ok("ios-arm64: Mach-O [arm64]".to_string()))
        );
    }

    #[test]
    fn test_corrupted_binary_is_counted() {
        let tmp = tempfile::tempdir().unwrap();
        let container = common::write_container(tmp.path(), b"this is not a mach-o binary at all");

        let report = verify_xcframework(&container).unwrap();
        assert_eq!(report.error_count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_missing_parts_are_each_counted() {
        let tmp = tempfile::tempdir().unwrap();
        let container = common::write_container(tmp.path(), &common::arm64_dylib_header());
        let framework = container.join("ios-arm64/PDFium.framework");
        std::fs::remove_dir_all(framework.join("Headers")).unwrap();
        std::fs::remove_file(framework.join("Info.plist")).unwrap();
        std::fs::remove_file(framework.join("PDFium")).unwrap();

        let report = verify_xcframework(&container).unwrap();
        assert_eq!(report.error_count(), 3);
    }

    #[test]
    fn test_library_count_mismatch_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let container = common::write_container(tmp.path(), &common::arm64_dylib_header());
        let second = container.join("macos-arm64_x86_64/PDFium.framework");
        std::fs::create_dir_all(second.join("Headers")).unwrap();
        std::fs::write(second.join("PDFium"), common::arm64_dylib_header()).unwrap();
        std::fs::write(second.join("Info.plist"), "<plist/>").unwrap();

        let report = verify_xcframework(&container).unwrap();
        assert_eq!(report.platforms, 2);
        assert_eq!(report.available_libraries, Some(1));
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_unparseable_info_plist_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let container = common::write_container(tmp.path(), &common::arm64_dylib_header());
        std::fs::write(container.join("Info.plist"), "<?xml version=\"1.0\"?><plist><dict><key>Broken").unwrap();

        let report = verify_xcframework(&container).unwrap();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.available_libraries, None);
    }
}
