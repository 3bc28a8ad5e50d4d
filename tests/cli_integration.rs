use std::io::Write;
use std::process::Command;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn scans_elements_against_quests() {
    let quests = write_temp(
        ".yaml",
        r#"quests:
  - name: surface
    filter: "ways with surface ~ paved|unpaved and !surface:note"
  - name: width
    filter: "ways with width > 3.5"
"#,
    );
    let elements = write_temp(
        ".jsonl",
        r#"{"type":"way","id":1,"tags":{"surface":"paved"}}
{"type":"way","id":2,"tags":{"surface":"unpaved","width":"4.0"}}
{"type":"way","id":3,"tags":{"surface":"paved","surface:note":"varies"}}
{"type":"node","id":4,"tags":{"surface":"paved"}}
{"type":"way","id":5,"tags":{"width":"3.5"}}
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_tagsieve"))
        .arg("--quests")
        .arg(quests.path())
        .arg("--elements")
        .arg(elements.path())
        .arg("--verbose")
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("surface: 2 match(es)"), "stdout: {stdout}");
    assert!(stdout.contains("width: 1 match(es)"), "stdout: {stdout}");
}

#[test]
fn check_accepts_valid_quest_definitions() {
    let quests = write_temp(
        ".yaml",
        r#"quests:
  - name: housenumber
    filter: "nodes, ways with building and !addr:housenumber"
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_tagsieve"))
        .arg("--quests")
        .arg(quests.path())
        .arg("--check")
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1 filter(s) OK"), "stdout: {stdout}");
}

#[test]
fn check_rejects_invalid_filter_naming_the_quest() {
    let quests = write_temp(
        ".yaml",
        r#"quests:
  - name: broken
    filter: "ways with"
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_tagsieve"))
        .arg("--quests")
        .arg(quests.path())
        .arg("--check")
        .output()
        .expect("failed to execute process");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("broken"), "stderr: {stderr}");
}

#[test]
fn emits_overpass_fragment_for_ad_hoc_filter() {
    let output = Command::new(env!("CARGO_BIN_EXE_tagsieve"))
        .arg("--filter")
        .arg("ways with surface = paved and !surface:note")
        .arg("--emit")
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(
        stdout.contains(r#"t["surface"] == "paved" && !is_tag("surface:note")"#),
        "stdout: {stdout}"
    );
}
