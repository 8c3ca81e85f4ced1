//! Integration tests for anim-export
//!
//! Tests the full pipeline: write pose file -> export -> verify / import output

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

use anim_common::{read_insertable, AnimationHeader, INSERTABLE_ANIMATION};

/// Two nodes over four frames: the root slides along x, the child bends 90° about x
fn write_pose(path: &Path) {
    let s = std::f32::consts::FRAC_1_SQRT_2;
    let pose = serde_json::json!({
        "name": "bend",
        "frame_start": 0,
        "nodes": ["root", "arm"],
        "frames": [
            { "translation": [0.0, 0.0, 0.0], "rotations": [[0, 0, 0, 1], [0, 0, 0, 1]] },
            { "translation": [0.5, 0.0, 0.0], "rotations": [[0, 0, 0, 1], [s, 0, 0, s]] },
            { "translation": [1.0, 0.0, 0.0], "rotations": [[0, 0, 0, 1], [s, 0, 0, s]] },
            { "translation": [1.0, 0.0, 0.0], "rotations": [[0, 0, 0, 1], [s, 0, 0, s]] }
        ]
    });
    std::fs::write(path, serde_json::to_string_pretty(&pose).unwrap())
        .expect("Failed to write pose file");
}

fn anim_export(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_anim-export"))
        .args(args)
        .output()
        .expect("Failed to run anim-export")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// Test pose -> insertable conversion
#[test]
fn test_export_insertable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pose_path = dir.path().join("bend.json");
    let out_path = dir.path().join("bend.insertable");
    write_pose(&pose_path);

    let result = anim_export(&["export", path_str(&pose_path), "-o", path_str(&out_path)]);
    assert!(result.status.success(), "anim-export export failed");

    let data = std::fs::read(&out_path).expect("Failed to read insertable");
    let (header, payload) = read_insertable(&data).expect("Invalid insertable");
    assert_eq!(header.data_type, INSERTABLE_ANIMATION);
    assert_eq!(header.pointer_offsets, vec![12, 16]);

    let bank0 = anim_common::SegmentMap::bank0();
    let anim = AnimationHeader::from_bytes(
        payload,
        anim_common::HeaderLayout::Linked { segments: &bank0 },
        0,
    )
    .expect("Invalid animation header");
    assert_eq!(anim.repetitions, 0);
    assert_eq!(anim.frame_start, 0);
    assert_eq!(anim.last_frame, 3);
    assert_eq!(anim.node_count, 2);
    assert_eq!(anim.indices_offset, 0x1A);
    assert_eq!(anim.values_offset, 0x1A + 9 * 4);
}

/// Test export then import round trip
#[test]
fn test_export_import_roundtrip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pose_path = dir.path().join("bend.json");
    let anim_path = dir.path().join("bend.insertable");
    let decoded_path = dir.path().join("bend.decoded.json");
    write_pose(&pose_path);

    let result = anim_export(&[
        "export",
        path_str(&pose_path),
        "-o",
        path_str(&anim_path),
        "--dma",
        "--no-loop",
    ]);
    assert!(result.status.success(), "anim-export export failed");

    let result = anim_export(&[
        "import",
        path_str(&anim_path),
        "-o",
        path_str(&decoded_path),
        "--nodes",
        "root,arm",
    ]);
    assert!(result.status.success(), "anim-export import failed");

    let text = std::fs::read_to_string(&decoded_path).expect("Failed to read decoded JSON");
    let decoded: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded["looping"], false);
    assert_eq!(decoded["repetitions"], 1);
    assert_eq!(decoded["last_frame"], 3);
    assert_eq!(decoded["nodes"][1]["name"], "arm");

    // 0, 0.5, 1.0 after the trailing hold is trimmed
    let root_x = decoded["root_translation"][0].as_array().unwrap();
    assert_eq!(root_x.len(), 3);
    assert!((root_x[1].as_f64().unwrap() - 0.5).abs() < 0.01);

    // arm bends once and holds: 0, π/2
    let arm_x = decoded["nodes"][1]["rotation"][0].as_array().unwrap();
    assert_eq!(arm_x.len(), 2);
    assert!((arm_x[1].as_f64().unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    assert_eq!(decoded["nodes"][1]["rotation"][1].as_array().unwrap().len(), 1);
}

/// Test writing into a ROM image at a segmented address
#[test]
fn test_export_into_rom() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pose_path = dir.path().join("bend.json");
    let rom_path = dir.path().join("game.z64");
    write_pose(&pose_path);
    std::fs::write(&rom_path, vec![0u8; 0x2000]).unwrap();

    let result = anim_export(&[
        "export",
        path_str(&pose_path),
        "-f",
        "rom",
        "-o",
        path_str(&rom_path),
        "--range",
        "0x1001:0x1800",
        "--segment",
        "0x04:0x1000:0x2000",
    ]);
    assert!(result.status.success(), "anim-export rom export failed");

    let rom = std::fs::read(&rom_path).unwrap();
    assert_eq!(rom.len(), 0x2000);
    // header at the aligned start, values pointer in segment 4
    assert_eq!(&rom[0x1008 + 0x0C..0x1008 + 0x10], &[0x04, 0x00, 0x00, 0x08 + 0x1A + 36]);
    assert!(rom[..0x1008].iter().all(|&b| b == 0));

    let decoded_path = dir.path().join("rom.decoded.json");
    let result = anim_export(&[
        "import",
        path_str(&rom_path),
        "--address",
        "0x1008",
        "--segment",
        "4:0x1000:0x2000",
        "--skeleton",
        path_str(&pose_path),
        "-o",
        path_str(&decoded_path),
        "--raw",
    ]);
    assert!(result.status.success(), "anim-export rom import failed");
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&decoded_path).unwrap()).unwrap();
    assert_eq!(raw["channels"][0], serde_json::json!([0, 50, 100]));
    assert_eq!(raw["channels"][6], serde_json::json!([0, 16384]));
}

/// Test that a window too small for the data is refused
#[test]
fn test_rom_range_too_small() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pose_path = dir.path().join("bend.json");
    let rom_path = dir.path().join("game.z64");
    write_pose(&pose_path);
    std::fs::write(&rom_path, vec![0u8; 0x200]).unwrap();

    let result = anim_export(&[
        "export",
        path_str(&pose_path),
        "-f",
        "rom",
        "-o",
        path_str(&rom_path),
        "--range",
        "0x100:0x120",
        "--dma",
    ]);
    assert!(!result.status.success(), "oversized export should fail");
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Size limit exceeded"), "stderr: {}", stderr);
    assert!(std::fs::read(&rom_path).unwrap().iter().all(|&b| b == 0));
}

/// Test manifest build with C and JSON outputs
#[test]
fn test_manifest_build() {
    let dir = tempdir().expect("Failed to create temp dir");
    let pose_path = dir.path().join("bend.json");
    let out_dir = dir.path().join("out");
    write_pose(&pose_path);

    let manifest_path = dir.path().join("animations.toml");
    let manifest = format!(
        r#"
[output]
dir = "{out}"

[settings]
author = "tester"
table = "bend_anims"

[animations.bend]
path = "{pose}"
format = "c"

[animations.bend_json]
path = "{pose}"
format = "json"
looping = false
"#,
        out = out_dir.display().to_string().replace('\\', "/"),
        pose = pose_path.display().to_string().replace('\\', "/"),
    );
    std::fs::write(&manifest_path, manifest).unwrap();

    let result = anim_export(&["check", path_str(&manifest_path)]);
    assert!(result.status.success(), "anim-export check failed");

    let result = anim_export(&["build", path_str(&manifest_path)]);
    assert!(result.status.success(), "anim-export build failed");

    let c_source = std::fs::read_to_string(out_dir.join("anim_bend.inc.c")).unwrap();
    assert!(c_source.starts_with("static const s16 bend_values[] = {\n\t"));
    assert!(c_source.contains("ANIMINDEX_NUMPARTS(bend_indices)"));

    let header = std::fs::read_to_string(out_dir.join("anim_header.h")).unwrap();
    assert_eq!(header, "extern const struct Animation *const bend_anims[];\n");
    let table = std::fs::read_to_string(out_dir.join("table.inc.c")).unwrap();
    assert!(table.contains("\t&bend,\n\tNULL,\n"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out_dir.join("bend_json.json")).unwrap())
            .unwrap();
    assert_eq!(json["name"], "bend_json");
    assert_eq!(json["author"], "tester");
    assert_eq!(json["looping"], "false");
    assert_eq!(json["length"], 3);
    assert_eq!(json["nodes"], 2);
    assert_eq!(json["indices"].as_array().unwrap().len(), 9 * 4);
}

/// Test that check rejects a manifest with a missing source
#[test]
fn test_check_missing_source() {
    let dir = tempdir().expect("Failed to create temp dir");
    let manifest_path = dir.path().join("animations.toml");
    std::fs::write(&manifest_path, "[animations]\nlost = \"nowhere.json\"\n").unwrap();

    let result = anim_export(&["check", path_str(&manifest_path)]);
    assert!(!result.status.success(), "check should fail for missing sources");
}
