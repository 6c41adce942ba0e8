use std::path::Path;
use std::process::{Command, Output};

use image::{ImageBuffer, Rgba, RgbaImage};

fn reproject(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// A 64x64 source with a distinct color per quadrant.
fn write_source(dir: &Path) -> String {
    let img: RgbaImage = ImageBuffer::from_fn(64, 64, |x, y| match (x < 32, y < 32) {
        (true, true) => Rgba([255, 0, 0, 255]),
        (false, true) => Rgba([0, 255, 0, 255]),
        (true, false) => Rgba([0, 0, 255, 255]),
        (false, false) => Rgba([255, 255, 0, 255]),
    });
    let path = dir.join("world.png");
    img.save(&path).expect("Failed to write source image");
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help_flag() {
    let output = reproject(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reproject-png"));
    assert!(stdout.contains("--projection"));
    assert!(stdout.contains("--lon-offset"));
    assert!(stdout.contains("mollweide"));
}

#[test]
fn test_missing_projection() {
    let output = reproject(&["world.png"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--projection") || stderr.contains("required"));
}

#[test]
fn test_unknown_projection() {
    let output = reproject(&["world.png", "-p", "robinson"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("robinson"));
}

#[test]
fn test_invalid_background() {
    let output = reproject(&["world.png", "-p", "mollweide", "--background", "nothex"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid color"));
}

#[test]
fn test_offset_out_of_range() {
    let output = reproject(&["world.png", "-p", "mollweide", "--lon-offset", "270"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[-180, 180]"));
}

#[test]
fn test_file_not_found() {
    let output = reproject(&["nonexistent.png", "-p", "sinusoidal"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File not found"));
}

#[test]
fn test_reproject_to_equirectangular() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = write_source(temp_dir.path());
    let out_dir = temp_dir.path().join("out");

    let output = reproject(&[
        &input,
        "-p",
        "equirectangular",
        "-o",
        out_dir.to_str().unwrap(),
        "-q",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let expected = out_dir.join("world-equirectangular.png");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), expected.to_string_lossy());

    let result = image::open(&expected).expect("Output is not a readable PNG").to_rgba8();
    assert_eq!(result.dimensions(), (64, 32));
    // Quadrant colors survive on either side of the equator
    assert_eq!(result.get_pixel(8, 4).0, [255, 0, 0, 255]);
    assert_eq!(result.get_pixel(56, 28).0, [255, 255, 0, 255]);
}

#[test]
fn test_reproject_orthographic_with_background() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = write_source(temp_dir.path());

    let output = reproject(&[
        &input,
        "-p",
        "orthographic",
        "-o",
        temp_dir.path().to_str().unwrap(),
        "--output-name",
        "globe",
        "--background",
        "FFFFFFFF",
        "-q",
    ]);

    assert!(output.status.success());
    let result = image::open(temp_dir.path().join("globe.png"))
        .expect("Output is not a readable PNG")
        .to_rgba8();
    assert_eq!(result.dimensions(), (64, 64));
    assert_eq!(result.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(result.get_pixel(63, 63).0, [255, 255, 255, 255]);
}
