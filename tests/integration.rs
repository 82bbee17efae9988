use std::fs;
use std::path::Path;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn missing_videos_directory_fails() {
    let temp = TempDir::new().unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(contains("Videos directory").and(contains("not found")));
}

#[test]
fn empty_videos_directory_fails() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("videos")).unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(contains("no video files found"));
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;

    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Installs a shell script as a fake external tool.
    fn fake_tool(bin_dir: &Path, name: &str, script: &str) {
        fs::create_dir_all(bin_dir).unwrap();
        let path = bin_dir.join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn path_with(bin_dir: &Path) -> String {
        format!(
            "{}:{}",
            bin_dir.display(),
            std::env::var("PATH").unwrap_or_default()
        )
    }

    fn library_with_ffprobe(duration_script: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("videos")).unwrap();
        let bin = temp.path().join("bin");
        fake_tool(&bin, "ffprobe", duration_script);
        (temp, bin)
    }

    #[test]
    fn offline_run_catalogs_new_videos() {
        let (temp, bin) = library_with_ffprobe("#!/bin/sh\necho 5.000000\n");
        let root = temp.path();
        fs::write(root.join("videos").join("song1.mp4"), b"fake").unwrap();

        assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
            .current_dir(root)
            .env("PATH", path_with(&bin))
            .arg("--offline")
            .assert()
            .success();

        let raw = fs::read_to_string(root.join("videos.json")).expect("catalog written");
        let entries: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &entries[0];

        assert_eq!(entry["filename"], "song1");
        assert_eq!(entry["duration_seconds"], 5.0);
        assert!(entry.get("artist").is_none(), "offline must not set artist");
        assert!(entry.get("title").is_none());
        assert!(entry.get("cover_filename").is_none());
        assert!(entry.get("processed_at").is_some());

        let archive = fs::read_to_string(root.join("metadata.json")).expect("archive written");
        assert_eq!(archive.trim(), "{}");
    }

    #[test]
    fn offline_rerun_is_byte_identical() {
        let (temp, bin) = library_with_ffprobe("#!/bin/sh\necho 212.493000\n");
        let root = temp.path();
        fs::write(root.join("videos").join("song1.mp4"), b"fake").unwrap();

        let run = || {
            assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
                .current_dir(root)
                .env("PATH", path_with(&bin))
                .arg("--offline")
                .assert()
                .success();
        };

        run();
        let first = fs::read_to_string(root.join("videos.json")).unwrap();
        run();
        let second = fs::read_to_string(root.join("videos.json")).unwrap();

        assert_eq!(first, second, "a no-op re-run must not change the catalog");
        assert!(first.contains("212.49"));
    }

    #[test]
    fn duplicate_base_names_abort_without_writing() {
        let (temp, bin) = library_with_ffprobe("#!/bin/sh\necho 5.000000\n");
        let root = temp.path();
        fs::write(root.join("videos").join("song1.mp4"), b"fake").unwrap();
        fs::write(root.join("videos").join("song1.mkv"), b"fake").unwrap();

        assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
            .current_dir(root)
            .env("PATH", path_with(&bin))
            .arg("--offline")
            .assert()
            .failure()
            .stderr(contains("song1"));

        assert!(
            !root.join("videos.json").exists(),
            "no catalog may be written when base names collide"
        );
    }

    #[test]
    fn probe_failure_still_catalogs_the_file() {
        let script = "#!/bin/sh\ncase \"$1\" in\n-version) exit 0 ;;\nesac\nexit 1\n";
        let (temp, bin) = library_with_ffprobe(script);
        let root = temp.path();
        fs::write(root.join("videos").join("song1.mp4"), b"fake").unwrap();

        assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
            .current_dir(root)
            .env("PATH", path_with(&bin))
            .arg("--offline")
            .assert()
            .success();

        let raw = fs::read_to_string(root.join("videos.json")).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries[0]["filename"], "song1");
        assert!(
            entries[0].get("duration_seconds").is_none(),
            "failed probe must leave the duration absent"
        );
    }

    #[test]
    fn missing_ffprobe_is_a_fatal_environment_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("videos")).unwrap();
        fs::write(root.join("videos").join("song1.mp4"), b"fake").unwrap();
        let empty_bin = root.join("bin");
        fs::create_dir(&empty_bin).unwrap();

        assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
            .current_dir(root)
            // A PATH with only an empty directory hides every external tool.
            .env("PATH", empty_bin.display().to_string())
            .arg("--offline")
            .assert()
            .failure()
            .stderr(contains("missing dependencies"));

        assert!(!root.join("videos.json").exists());
    }

    #[test]
    fn nondefault_extension_is_recorded_as_video_filename() {
        let (temp, bin) = library_with_ffprobe("#!/bin/sh\necho 5.000000\n");
        let root = temp.path();
        fs::write(root.join("videos").join("song1.webm"), b"fake").unwrap();

        assert_cmd::cargo::cargo_bin_cmd!("songdataupdater")
            .current_dir(root)
            .env("PATH", path_with(&bin))
            .arg("--offline")
            .assert()
            .success();

        let raw = fs::read_to_string(root.join("videos.json")).unwrap();
        let entries: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries[0]["video_filename"], "song1.webm");
    }
}
