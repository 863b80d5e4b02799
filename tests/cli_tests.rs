mod common;

#[cfg(test)]
mod tests {
    use super::common;
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn cli() -> Command {
        let mut cmd = Command::cargo_bin("pdfium-xcframework").unwrap();
        for var in ["PDFIUM_VERSION", "PDFIUM_TAG", "WORK_DIR", "OUTPUT_DIR", "BUILD_ID", "RELEASE_BASE_URL"] {
            cmd.env_remove(var);
        }
        cmd
    }

    #[test]
    fn test_help_lists_subcommands() {
        cli()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("build"))
            .stdout(predicate::str::contains("verify"))
            .stdout(predicate::str::contains("manifests"));
    }

    #[test]
    fn test_verify_missing_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        cli()
            .arg("verify")
            .arg(tmp.path().join("absent.xcframework"))
            .assert()
            .code(1);
    }

    #[test]
    fn test_verify_clean_container_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let container = common::write_container(tmp.path(), &common::arm64_dylib_header());
        cli()
            .arg("verify")
            .arg(&container)
            .assert()
            .success()
            .stderr(predicate::str::contains("no errors"));
    }

    #[test]
    fn test_verify_corrupted_container_exits_one() {
        let tmp = tempfile::tempdir().unwrap();
        let container = common::write_container(tmp.path(), b"definitely not a mach-o binary");
        cli()
            .arg("verify")
            .arg(&container)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("1 error(s)"));
    }

    #[test]
    fn test_build_with_malformed_version_fails() {
        let tmp = tempfile::tempdir().unwrap();
        cli()
            .current_dir(tmp.path())
            .args(["build", "not-a-version"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid version 'not-a-version'"));
    }

    #[test]
    fn test_manifests_without_record_fails() {
        let tmp = tempfile::tempdir().unwrap();
        cli()
            .arg("manifests")
            .arg("--output-dir")
            .arg(tmp.path())
            .args(["--release-base-url", "https://example.com/dl"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("release.env"));
    }

    #[test]
    fn test_manifests_render_from_record() {
        let tmp = tempfile::tempdir().unwrap();
        let dist = tmp.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        let archive = "PDFium-7506-1.xcframework.zip";
        std::fs::write(
            dist.join("release.env"),
            format!(
                "PDFIUM_VERSION=144.0.7506.0\nPDFIUM_TAG=chromium/7506\nBUILD_ID=1\nARCHIVE={archive}\n"
            ),
        )
        .unwrap();
        std::fs::write(
            dist.join(format!("{archive}.sha256")),
            format!("{}  {archive}\n", "0".repeat(64)),
        )
        .unwrap();

        cli()
            .arg("manifests")
            .arg("--output-dir")
            .arg(&dist)
            .args(["--release-base-url", "https://example.com/dl"])
            .arg("--manifest-dir")
            .arg(tmp.path().join("out"))
            .assert()
            .success();

        let package = std::fs::read_to_string(tmp.path().join("out/Package.swift")).unwrap();
        assert!(package.contains("https://example.com/dl/PDFium-7506-1.xcframework.zip"));
    }
}
