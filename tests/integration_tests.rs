//! Integration tests for the stembind pipeline
//!
//! These tests drive the full pipeline against synthesized template and stem
//! trees and verify the output containers, counts, and failure records.

use std::fs;
use std::path::{Path, PathBuf};
use stembind::config::Settings;
use stembind::{container, pipeline};
use tempfile::TempDir;

/// The placeholder track name used when authoring test templates
const PLACEHOLDER: &str = "Tape B - i won't be ur drug";

/// Build one audio track block with every reference variant a real template
/// carries: display names, relative path, bare path, and a percent-escaped
/// browser path.
fn audio_track(id: u32, base: &str) -> String {
    let escaped = base.replace(' ', "%20");
    format!(
        r#"      <AudioTrack Id="{id}">
        <Name Value="{base}" />
        <EffectiveName Value="{base}" />
        <MemorizedFirstClipName Value="{base}" />
        <SampleRef>
          <RelativePath Value="../{base}.flac" />
          <Path Value="{base}.flac" />
          <BrowserContentPath Value="query:UserLibrary#{escaped}.flac" />
        </SampleRef>
      </AudioTrack>"#
    )
}

/// Build a template document with the standard three placeholder tracks
fn template_doc(marker: &str) -> Vec<u8> {
    let tracks = [
        audio_track(1, &format!("drums-{}", PLACEHOLDER)),
        audio_track(2, &format!("Inst-{}", PLACEHOLDER)),
        audio_track(3, &format!("vocals-{}", PLACEHOLDER)),
    ]
    .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Ableton Creator="{marker}">
  <LiveSet>
    <Tracks>
{tracks}
    </Tracks>
  </LiveSet>
</Ableton>"#
    )
    .into_bytes()
}

/// Gzip a document and write it as a template file
fn write_template(templates_dir: &Path, file_name: &str, document: &[u8]) {
    let compressed = container::encode(document).expect("Failed to encode template");
    fs::write(templates_dir.join(file_name), compressed).expect("Failed to write template");
}

/// Create a stem folder following the <root>/<tempo>/<section>/<track>/ convention
fn make_stem_folder(root: &Path, tempo: &str, section: &str, track: &str, files: &[&str]) -> PathBuf {
    let folder = root.join(tempo).join(section).join(track);
    fs::create_dir_all(&folder).expect("Failed to create stem folder");
    for file in files {
        fs::write(folder.join(file), b"").expect("Failed to write stem file");
    }
    folder
}

/// Create test settings with progress bars disabled
fn create_test_settings(input: &Path, templates: &Path) -> Settings {
    Settings {
        input: input.to_path_buf(),
        templates_dir: templates.to_path_buf(),
        force: false,
        tempo_min: 70,
        tempo_max: 200,
        validate: false,
        purge_analysis_files: true,
        report: None,
        show_progress: false, // Disable progress bars in tests
        dry_run: false,
    }
}

/// Decode an output artifact to text for assertions
fn read_output(folder: &Path) -> String {
    let bytes = container::decode(&folder.join("CH1.als")).expect("Failed to decode output");
    String::from_utf8(bytes).expect("Output should be UTF-8 in these tests")
}

#[test]
fn test_pipeline_binds_full_stem_folder() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    let folder = make_stem_folder(
        root.path(),
        "95",
        "5A",
        "Song",
        &["drums-Song.flac", "Inst-Song.flac", "vocals-Song.flac"],
    );

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.total_folders, 1);
    assert_eq!(result.processed, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(result.skipped, 0);

    let text = read_output(&folder);

    // Every variant rewritten for every role
    assert!(text.contains(r#"<Path Value="drums-Song.flac" />"#));
    assert!(text.contains(r#"<RelativePath Value="../Inst-Song.flac" />"#));
    assert!(text.contains(r#"query:UserLibrary#vocals-Song.flac"#));

    // Display names follow the new base names
    assert!(text.contains(r#"<Name Value="drums-Song" />"#));
    assert!(text.contains(r#"<EffectiveName Value="vocals-Song" />"#));

    // No spelling of the placeholder survives
    assert!(!text.contains(PLACEHOLDER));
    assert!(!text.contains("Tape%20B"));
}

#[test]
fn test_pipeline_partial_stem_set_leaves_other_roles() {
    // Instrumental stem absent from the folder
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    let folder = make_stem_folder(
        root.path(),
        "95",
        "5A",
        "Song",
        &["drums-Song.flac", "vocals-Song.flac"],
    );

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");
    assert_eq!(result.processed, 1);

    let text = read_output(&folder);

    assert!(text.contains(r#"<Path Value="drums-Song.flac" />"#));
    assert!(text.contains(r#"<Path Value="vocals-Song.flac" />"#));

    // The unbound role keeps its placeholder reference and display name intact
    assert!(text.contains(&format!(r#"<Path Value="Inst-{}.flac" />"#, PLACEHOLDER)));
    assert!(text.contains(&format!(r#"<Name Value="Inst-{}" />"#, PLACEHOLDER)));
}

#[test]
fn test_pipeline_skips_existing_output() {
    // Skip policy enabled, output already present
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);
    fs::write(folder.join("CH1.als"), b"pre-existing artifact").unwrap();

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.processed, 0);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.failed, 0);

    // No write occurred
    let bytes = fs::read(folder.join("CH1.als")).unwrap();
    assert_eq!(bytes, b"pre-existing artifact");
}

#[test]
fn test_pipeline_force_overwrites_existing_output() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);
    fs::write(folder.join("CH1.als"), b"pre-existing artifact").unwrap();

    let mut settings = create_test_settings(root.path(), templates.path());
    settings.force = true;
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.processed, 1);
    assert_eq!(result.skipped, 0);

    let text = read_output(&folder);
    assert!(text.contains("drums-Song.flac"));
}

#[test]
fn test_exact_tempo_template_preferred_over_default() {
    // Both 95.als and default.als exist: the exact match must win
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("tempo-95"));
    write_template(templates.path(), "default.als", &template_doc("fallback"));

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");
    assert_eq!(result.processed, 1);

    let text = read_output(&folder);
    assert!(text.contains(r#"Creator="tempo-95""#));
}

#[test]
fn test_out_of_range_tempo_falls_back_to_default() {
    // Range validation precedes lookup, so 310.als is never consulted and
    // the default wins
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "310.als", &template_doc("tempo-310"));
    write_template(templates.path(), "default.als", &template_doc("fallback"));

    let folder = make_stem_folder(root.path(), "310", "5A", "Song", &["drums-Song.flac"]);

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");
    assert_eq!(result.processed, 1);

    let text = read_output(&folder);
    assert!(text.contains(r#"Creator="fallback""#));
}

#[test]
fn test_out_of_range_tempo_without_default_fails() {
    // Out-of-range tempo with no default to fall back to
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "310.als", &template_doc("tempo-310"));

    let folder = make_stem_folder(root.path(), "310", "5A", "Song", &["drums-Song.flac"]);

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.processed, 0);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].code, "TEMPLATE_UNAVAILABLE");
    assert!(!folder.join("CH1.als").exists());
}

#[test]
fn test_template_without_references_fails_no_output() {
    // The template has nothing to rewrite
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    let empty_doc = br#"<?xml version="1.0"?><Ableton><LiveSet><Tracks></Tracks></LiveSet></Ableton>"#;
    write_template(templates.path(), "95.als", empty_doc);

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].code, "NO_REFERENCES");
    assert!(!folder.join("CH1.als").exists());
}

#[test]
fn test_corrupt_template_fails_and_batch_continues() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));
    fs::write(templates.path().join("100.als"), b"not a gzip stream").unwrap();

    // 100 sorts before 95 in walk order, so the failure comes first
    make_stem_folder(root.path(), "100", "3B", "Bad", &["drums-Bad.flac"]);
    let good = make_stem_folder(root.path(), "95", "5A", "Good", &["drums-Good.flac"]);

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.total_folders, 2);
    assert_eq!(result.processed, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].code, "CONTAINER");
    assert!(result.failures[0].folder.ends_with("100/3B/Bad"));
    assert!(good.join("CH1.als").exists());
}

#[test]
fn test_unclassifiable_folder_recorded_as_classification_miss() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "default.als", &template_doc("fallback"));

    make_stem_folder(root.path(), "95", "5A", "Song", &["melody-Song.flac"]);

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].code, "CLASSIFICATION_MISS");
}

#[test]
fn test_pipeline_handles_empty_root() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed on empty root");

    assert_eq!(result.total_folders, 0);
    assert_eq!(result.processed, 0);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.failed, 0);
}

#[test]
fn test_pipeline_nonexistent_root_is_fatal() {
    let templates = TempDir::new().unwrap();

    let settings = create_test_settings(Path::new("/nonexistent/stems"), templates.path());
    let result = pipeline::run(&settings);

    assert!(result.is_err(), "Pipeline should return error for missing root");
}

#[test]
fn test_stale_analysis_caches_are_purged() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);
    fs::write(folder.join("drums-Song.flac.asd"), b"stale cache").unwrap();

    let settings = create_test_settings(root.path(), templates.path());
    pipeline::run(&settings).expect("Pipeline should succeed");

    assert!(!folder.join("drums-Song.flac.asd").exists());
    assert!(folder.join("CH1.als").exists());
}

#[test]
fn test_analysis_caches_kept_when_disabled() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);
    fs::write(folder.join("drums-Song.flac.asd"), b"stale cache").unwrap();

    let mut settings = create_test_settings(root.path(), templates.path());
    settings.purge_analysis_files = false;
    pipeline::run(&settings).expect("Pipeline should succeed");

    assert!(folder.join("drums-Song.flac.asd").exists());
}

#[test]
fn test_validation_accepts_well_formed_output() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);

    let mut settings = create_test_settings(root.path(), templates.path());
    settings.validate = true;
    let result = pipeline::run(&settings).expect("Pipeline should succeed");
    assert_eq!(result.processed, 1);
}

#[test]
fn test_report_written_with_outcomes() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    let report_dir = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);
    // Second folder has no usable template
    make_stem_folder(root.path(), "80", "2B", "Other", &["vocals-Other.flac"]);

    let report_path = report_dir.path().join("report.json");
    let mut settings = create_test_settings(root.path(), templates.path());
    settings.report = Some(report_path.clone());

    let result = pipeline::run(&settings).expect("Pipeline should succeed");
    assert_eq!(result.processed, 1);
    assert_eq!(result.failed, 1);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["metadata"]["processed"], 1);
    assert_eq!(json["metadata"]["failed"], 1);

    let folders = json["folders"].as_array().unwrap();
    assert_eq!(folders.len(), 2);

    let failed = folders
        .iter()
        .find(|f| f["outcome"] == "failed")
        .expect("Report should record the failed folder");
    assert_eq!(failed["code"], "TEMPLATE_UNAVAILABLE");
    assert_eq!(failed["tempo"], 80);

    let processed = folders
        .iter()
        .find(|f| f["outcome"] == "processed")
        .expect("Report should record the processed folder");
    assert_eq!(processed["roles_bound"][0], "drums");
}

#[test]
fn test_dry_run_writes_nothing() {
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    write_template(templates.path(), "95.als", &template_doc("95"));

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);

    let mut settings = create_test_settings(root.path(), templates.path());
    settings.dry_run = true;
    let result = pipeline::run(&settings).expect("Pipeline should succeed");

    assert_eq!(result.processed, 0);
    assert_eq!(result.skipped, 1);
    assert!(!folder.join("CH1.als").exists());
}

#[test]
fn test_round_trip_of_untouched_roles_is_byte_exact() {
    // A template whose only reference role is absent from the folder: the
    // output document must equal the template document byte for byte
    let root = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();

    let doc = format!(
        r#"<?xml version="1.0"?><Ableton><LiveSet>
{}
</LiveSet></Ableton>"#,
        audio_track(1, &format!("Inst-{}", PLACEHOLDER))
    )
    .into_bytes();
    write_template(templates.path(), "95.als", &doc);

    let folder = make_stem_folder(root.path(), "95", "5A", "Song", &["drums-Song.flac"]);

    let settings = create_test_settings(root.path(), templates.path());
    let result = pipeline::run(&settings).expect("Pipeline should succeed");
    assert_eq!(result.processed, 1);

    let bytes = container::decode(&folder.join("CH1.als")).unwrap();
    assert_eq!(bytes, doc);
}
