use assert_cmd::Command;

mod common;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("cets 0.1.0\n");
}

// Validate subcommand tests

#[test]
fn validate_valid_dataset_succeeds() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["validate", "tests/fixtures/valid_dataset.json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"));
}

#[test]
fn validate_yaml_by_extension() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["validate", "tests/fixtures/valid_dataset.yaml"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"));
}

#[test]
fn validate_invalid_dataset_fails() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["validate", "tests/fixtures/invalid_dataset.json"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("error(s)"))
        .stdout(predicates::str::contains("DuplicateCoordinateSystem"))
        .stderr(predicates::str::contains("Validation failed"));
}

#[test]
fn validate_reports_unknown_frames_and_broken_chains() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["validate", "tests/fixtures/invalid_dataset.json"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("UnknownOutputFrame"))
        .stdout(predicates::str::contains("BrokenSequenceChain"));
}

#[test]
fn validate_json_output_format() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args([
        "validate",
        "tests/fixtures/valid_dataset.json",
        "--output",
        "json",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"error_count\": 0"))
        .stdout(predicates::str::contains("\"warning_count\": 0"));
}

#[test]
fn validate_strict_fails_on_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warn.json");
    std::fs::write(
        &path,
        r#"{"regions": [{"tomograms": [{"coordinate_transformations": [
            {"type": "sequence", "sequence": []}
        ]}]}]}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.arg("validate").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("EmptySequence"));

    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.arg("validate").arg(&path).arg("--strict");
    cmd.assert().failure();
}

#[test]
fn validate_rejects_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typo.json");
    std::fs::write(&path, r#"{"regoins": []}"#).unwrap();

    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.arg("validate").arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("regoins"));
}

#[test]
fn validate_nonexistent_file_fails() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["validate", "nonexistent_file.json"]);
    cmd.assert().failure();
}

// Header subcommand tests

#[test]
fn header_prints_mrc_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tomo.mrc");
    common::write_file(&path, &common::mrc_bytes(64, 48, 32, 2, 2.5));

    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.arg("header").arg(&path);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("width:      64"))
        .stdout(predicates::str::contains("height:     48"))
        .stdout(predicates::str::contains("depth:      32"))
        .stdout(predicates::str::contains("2.5 Å"));
}

#[test]
fn header_info_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stack.tif");
    common::write_file(&path, &common::tiff_bytes(40, 30, 5, None));

    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.arg("header").arg(&path).args(["--info", "--output", "json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"size_x\": 40"))
        .stdout(predicates::str::contains("\"size_z\": 5"))
        .stdout(predicates::str::contains("\"apix_x\": null"));
}

#[test]
fn header_unsupported_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    common::write_file(&path, b"not a volume");

    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.arg("header").arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Unsupported format"));
}

// Pipeline subcommand tests

#[test]
fn pipeline_map_prints_sequence() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args([
        "pipeline",
        "map",
        "--scale",
        "2",
        "--rotation",
        "1,0,0,0,1,0,0,0,1",
        "--translation",
        "1,-2,3",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"align_map_to_tomogram\""))
        .stdout(predicates::str::contains("\"type\": \"sequence\""))
        .stdout(predicates::str::contains("\"aligned_map\""));
}

#[test]
fn pipeline_calibration_image_flips() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["pipeline", "calibration-image", "--flip-axis", "y"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"flip2d\""));
}

#[test]
fn pipeline_rejects_bad_flip_axis() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["pipeline", "calibration-image", "--flip-axis", "z"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("invalid flip axis"));
}

#[test]
fn pipeline_rejects_mismatched_rotation() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["pipeline", "subtomogram", "--rotation", "0,-1,1,0"]);
    cmd.assert().failure();
}

#[test]
fn pipeline_unknown_stage_fails() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["pipeline", "gain-reference"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("stage 'gain-reference'"));
}

// Logging flags

#[test]
fn unparsable_log_filter_fails() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.args(["--log-filter", "cets_model=loud", "pipeline", "map"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("invalid log filter 'cets_model=loud'"));
}

#[test]
fn log_filter_from_environment_is_checked() {
    let mut cmd = Command::cargo_bin("cets").unwrap();
    cmd.env("CETS_LOG", "cets_model=loud").args(["pipeline", "map"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("invalid log filter"));
}
