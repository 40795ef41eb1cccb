//! CLI integration tests
//!
//! These tests run the `shp` binary against containers and PNG frames in a
//! temporary directory and check exit codes and written files.

use image::GrayImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the shp binary
fn shp_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_shp"))
}

/// Run shp inside `dir` so config discovery only sees files written there
fn run_shp(dir: &Path, args: &[&str]) -> Output {
    Command::new(shp_binary())
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute shp")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Write a grayscale frame PNG where each pixel is `seed + x + y * width`
fn write_frame(path: &Path, width: u32, height: u32, seed: u8) {
    let image = GrayImage::from_fn(width, height, |x, y| {
        image::Luma([seed.wrapping_add((x + y * width) as u8)])
    });
    image.save(path).expect("should write frame PNG");
}

/// Pack three 4x3 frames into `unit.shp` and return its path
fn packed_unit(temp: &TempDir) -> PathBuf {
    let frames = temp.path().join("frames");
    fs::create_dir_all(&frames).unwrap();
    for i in 0..3u8 {
        write_frame(&frames.join(format!("{}.png", i)), 4, 3, i * 20);
    }

    let output = run_shp(temp.path(), &["pack", "frames", "-o", "unit.shp"]);
    assert!(output.status.success(), "pack failed: {}", stderr(&output));
    temp.path().join("unit.shp")
}

#[test]
fn test_pack_then_extract_returns_original_pixels() {
    let temp = TempDir::new().unwrap();
    let shp = packed_unit(&temp);
    assert!(shp.exists());

    let output = run_shp(temp.path(), &["extract", "unit.shp", "-o", "out"]);
    assert!(output.status.success(), "extract failed: {}", stderr(&output));

    for i in 0..3u8 {
        let extracted = image::open(temp.path().join(format!("out/unit_{:04}.png", i)))
            .expect("frame PNG should exist")
            .to_luma8();
        let original = image::open(temp.path().join(format!("frames/{}.png", i))).unwrap().to_luma8();
        assert_eq!(extracted.dimensions(), (4, 3));
        assert_eq!(extracted.into_raw(), original.into_raw(), "frame {} differs", i);
    }
}

#[test]
fn test_extract_sheet_with_scale_and_columns() {
    let temp = TempDir::new().unwrap();
    packed_unit(&temp);

    let output = run_shp(
        temp.path(),
        &["extract", "unit.shp", "--sheet", "--scale", "2", "--columns", "2"],
    );
    assert!(output.status.success(), "extract failed: {}", stderr(&output));

    let sheet = image::open(temp.path().join("unit_sheet.png")).unwrap();
    // 2 columns x 2 rows of 4x3 cells, doubled
    assert_eq!((sheet.width(), sheet.height()), (16, 12));
}

#[test]
fn test_extract_uses_config_file() {
    let temp = TempDir::new().unwrap();
    packed_unit(&temp);
    fs::write(temp.path().join("shp.toml"), "[extract]\nscale = 3\nout = \"cfg\"\n").unwrap();

    let output = run_shp(temp.path(), &["extract", "unit.shp"]);
    assert!(output.status.success(), "extract failed: {}", stderr(&output));

    let frame = image::open(temp.path().join("cfg/unit_0000.png")).unwrap();
    assert_eq!((frame.width(), frame.height()), (12, 9));
}

#[test]
fn test_cli_scale_overrides_config() {
    let temp = TempDir::new().unwrap();
    packed_unit(&temp);
    fs::write(temp.path().join("shp.toml"), "[extract]\nscale = 3\n").unwrap();

    let output = run_shp(temp.path(), &["extract", "unit.shp", "--scale", "1", "-o", "out"]);
    assert!(output.status.success(), "extract failed: {}", stderr(&output));

    let frame = image::open(temp.path().join("out/unit_0001.png")).unwrap();
    assert_eq!((frame.width(), frame.height()), (4, 3));
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    packed_unit(&temp);
    fs::write(temp.path().join("shp.toml"), "[extract]\nscale = 0\n").unwrap();

    let output = run_shp(temp.path(), &["extract", "unit.shp"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("scale"), "stderr: {}", stderr(&output));
}

#[test]
fn test_info_json_report() {
    let temp = TempDir::new().unwrap();
    packed_unit(&temp);

    let output = run_shp(temp.path(), &["info", "unit.shp", "--json"]);
    assert!(output.status.success(), "info failed: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(report["width"], 4);
    assert_eq!(report["height"], 3);
    assert_eq!(report["frame_count"], 3);
    assert_eq!(report["payload_start"], 14 + 5 * 8);

    let frames = report["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["format"], "lcw");
    assert_eq!(frames[0]["file_offset"], 54);
}

#[test]
fn test_info_table_output() {
    let temp = TempDir::new().unwrap();
    packed_unit(&temp);

    let output = run_shp(temp.path(), &["info", "unit.shp"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Canvas:  4x3"), "stdout: {}", text);
    assert!(text.contains("Frames:  3"));
}

#[test]
fn test_verify_reports_corrupt_file() {
    let temp = TempDir::new().unwrap();
    let shp = packed_unit(&temp);
    let bytes = fs::read(&shp).unwrap();
    fs::write(temp.path().join("broken.shp"), &bytes[..20]).unwrap();

    let output = run_shp(temp.path(), &["verify", "unit.shp", "broken.shp"]);
    assert_eq!(output.status.code(), Some(1));

    let text = stdout(&output);
    assert!(text.contains("OK    unit.shp"), "stdout: {}", text);
    assert!(text.contains("FAIL  broken.shp"), "stdout: {}", text);
}

#[test]
fn test_pack_rejects_mismatched_frame_sizes() {
    let temp = TempDir::new().unwrap();
    write_frame(&temp.path().join("a.png"), 4, 3, 0);
    write_frame(&temp.path().join("b.png"), 5, 3, 0);

    let output = run_shp(temp.path(), &["pack", "a.png", "b.png", "-o", "bad.shp"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("expected 4x3"));
    assert!(!temp.path().join("bad.shp").exists());
}

#[test]
fn test_pack_rejects_non_png_input() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("notes.txt"), "hello").unwrap();

    let output = run_shp(temp.path(), &["pack", "notes.txt", "-o", "x.shp"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_input_fails() {
    let temp = TempDir::new().unwrap();

    let output = run_shp(temp.path(), &["info", "nope.shp"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nope.shp"));
}

#[test]
fn test_pack_output_from_config() {
    let temp = TempDir::new().unwrap();
    write_frame(&temp.path().join("a.png"), 2, 2, 0);
    fs::write(temp.path().join("shp.toml"), "[pack]\nout = \"build/a.shp\"\nverify = true\n").unwrap();

    let output = run_shp(temp.path(), &["pack", "a.png"]);
    assert!(output.status.success(), "pack failed: {}", stderr(&output));
    assert!(temp.path().join("build/a.shp").exists());
}

#[test]
fn test_pack_without_output_is_invalid() {
    let temp = TempDir::new().unwrap();
    write_frame(&temp.path().join("a.png"), 2, 2, 0);

    let output = run_shp(temp.path(), &["pack", "a.png"]);
    assert_eq!(output.status.code(), Some(2));
}
