//! Integration tests for opening and reloading documents from disk

mod common;

use common::{model_xml, package, package_bytes, triangle_mesh};
use std::io::Write;
use tempfile::NamedTempFile;
use threemf_scene::{Document, Error, ReloadOutcome, SceneConfig};

fn single_part_xml(part_number: &str) -> String {
    model_xml(
        "millimeter",
        &format!(r#"<object id="1" name="Plate">{}</object>"#, triangle_mesh("")),
        &format!(r#"<item objectid="1" partnumber="{}"/>"#, part_number),
    )
}

fn write_file(file: &NamedTempFile, bytes: &[u8]) {
    let mut handle = file.reopen().unwrap();
    handle.set_len(0).unwrap();
    handle.write_all(bytes).unwrap();
    handle.flush().unwrap();
}

fn document_on_disk(xml: &str) -> (NamedTempFile, Document) {
    let file = NamedTempFile::new().unwrap();
    write_file(&file, &package_bytes(xml));
    let document = Document::open(file.path(), SceneConfig::default()).unwrap();
    (file, document)
}

#[test]
fn test_open_builds_the_model() {
    let (file, document) = document_on_disk(&single_part_xml("plate"));

    assert_eq!(document.path(), Some(file.path()));
    assert_eq!(document.model().parts().len(), 1);
    assert_eq!(document.model().parts()[0].id, "plate");
    assert_eq!(document.generation(), 0);
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Document::open(dir.path().join("missing.3mf"), SceneConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_reload_replaces_the_model() {
    let (file, mut document) = document_on_disk(&single_part_xml("first"));

    write_file(&file, &package_bytes(&single_part_xml("second")));
    assert_eq!(document.reload().unwrap(), ReloadOutcome::Reloaded);
    assert_eq!(document.model().parts()[0].id, "second");
    assert_eq!(document.generation(), 1);
}

#[test]
fn test_half_written_archive_keeps_the_model() {
    let (file, mut document) = document_on_disk(&single_part_xml("kept"));

    let bytes = package_bytes(&single_part_xml("lost"));
    write_file(&file, &bytes[..bytes.len() / 2]);

    assert_eq!(document.reload().unwrap(), ReloadOutcome::Incomplete);
    assert_eq!(document.model().parts()[0].id, "kept");
}

/// Flip bytes inside the compressed data of the model part
fn corrupt_model_entry(bytes: &mut [u8]) {
    let name = b"3D/3dmodel.model";
    let name_at = bytes.windows(name.len()).position(|w| w == name).unwrap();
    let header = name_at - 30;
    let extra_len = u16::from_le_bytes([bytes[header + 28], bytes[header + 29]]) as usize;
    let data = name_at + name.len() + extra_len;
    for byte in &mut bytes[data + 10..data + 30] {
        *byte ^= 0x5A;
    }
}

#[test]
fn test_corrupt_entry_on_reload_keeps_the_model() {
    let (file, mut document) = document_on_disk(&single_part_xml("kept"));

    let mut bytes = package_bytes(&single_part_xml("lost"));
    corrupt_model_entry(&mut bytes);
    write_file(&file, &bytes);

    assert_eq!(document.reload().unwrap(), ReloadOutcome::Incomplete);
    assert_eq!(document.model().parts()[0].id, "kept");
    assert_eq!(document.generation(), 1);
}

#[test]
fn test_invalid_model_on_reload_keeps_the_model() {
    let (file, mut document) = document_on_disk(&single_part_xml("kept"));

    let broken = model_xml("millimeter", "", r#"<item objectid="5"/>"#);
    write_file(&file, &package_bytes(&broken));

    let err = document.reload().unwrap_err();
    assert!(matches!(err, Error::MissingObject { object_id: 5, .. }));
    assert_eq!(document.model().parts()[0].id, "kept");
}

#[test]
fn test_reload_if_modified_skips_unchanged_files() {
    let (_file, mut document) = document_on_disk(&single_part_xml("plate"));

    assert_eq!(document.reload_if_modified().unwrap(), ReloadOutcome::Unchanged);
    assert_eq!(document.generation(), 0);
}

#[test]
fn test_from_reader_documents_have_no_path() {
    let mut document =
        Document::from_reader(package(&single_part_xml("plate")), SceneConfig::default()).unwrap();

    assert!(document.path().is_none());
    assert_eq!(document.reload().unwrap(), ReloadOutcome::Unchanged);
    assert_eq!(document.model().parts()[0].display_name(), "Plate");
}

#[test]
fn test_stale_background_load_is_dropped() {
    let (file, mut document) = document_on_disk(&single_part_xml("first"));

    let stale = document.begin_load();
    write_file(&file, &package_bytes(&single_part_xml("second")));
    assert_eq!(document.reload().unwrap(), ReloadOutcome::Reloaded);

    let late = threemf_scene::RenderModel::from_reader(
        package(&single_part_xml("stale")),
        document.config(),
    );
    assert_eq!(
        document.finish_load(stale, late).unwrap(),
        threemf_scene::LoadOutcome::Superseded
    );
    assert_eq!(document.model().parts()[0].id, "second");
}
