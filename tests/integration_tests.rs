// Integration tests for pdfmetaextract.
//
// These tests work without real PDF fixtures by testing type behaviour and
// the public API surface directly.  Tests that require actual PDF files
// would live in a `tests/fixtures/` directory and are marked `#[ignore]` so
// CI passes even without those files.

use pdfmetaextract::{ExtractorConfig, MetadataError, MetadataRecord};

// ── ExtractorConfig ───────────────────────────────────────────────────────────

#[test]
fn default_config_is_strict() {
    let cfg = ExtractorConfig::default();
    assert!(cfg.strict_xmp);
}

#[test]
fn custom_config_round_trips() {
    let cfg = ExtractorConfig { strict_xmp: false };
    assert!(!cfg.strict_xmp);
}

// ── MetadataRecord ────────────────────────────────────────────────────────────

#[test]
fn fresh_record_is_empty() {
    let record = MetadataRecord::default();
    assert!(record.is_empty());
}

#[test]
fn populated_record_is_not_empty() {
    let record = MetadataRecord {
        title: Some("Moby Dick".into()),
        ..Default::default()
    };
    assert!(!record.is_empty());
}

#[test]
fn absent_fields_are_omitted_from_json() {
    let record = MetadataRecord {
        title: Some("Moby Dick".into()),
        author: vec!["Herman Melville".into()],
        ..Default::default()
    };
    let json = serde_json::to_value(&record).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object.len(), 2, "only populated fields serialize: {object:?}");
    assert_eq!(object["title"], "Moby Dick");
    assert_eq!(object["author"][0], "Herman Melville");
    assert!(!object.contains_key("uuid"));
    assert!(!object.contains_key("tags"));
}

// ── MetadataError display ─────────────────────────────────────────────────────

#[test]
fn error_display_is_non_empty() {
    let errors: &[MetadataError] = &[
        MetadataError::XmpSyntax("test".into()),
        MetadataError::MalformedMetadata("test".into()),
        MetadataError::KeyConflict("test".into()),
        MetadataError::RekeyMismatch("test".into()),
        MetadataError::AmbiguousRekey("test".into()),
        MetadataError::ToolNotFound("pdftoppm".into()),
        MetadataError::RenderFailed("exit status: 1".into()),
    ];
    for e in errors {
        assert!(!e.to_string().is_empty(), "empty display for {e:?}");
    }
}

// ── MetadataExtractor with invalid input ──────────────────────────────────────

#[test]
fn from_bytes_rejects_empty_slice() {
    use pdfmetaextract::MetadataExtractor;
    assert!(MetadataExtractor::from_bytes(&[]).is_err());
}

#[test]
fn from_bytes_rejects_non_pdf() {
    use pdfmetaextract::MetadataExtractor;
    assert!(MetadataExtractor::from_bytes(b"not a pdf").is_err());
}

// ── External tool lookup ──────────────────────────────────────────────────────

#[test]
fn find_tool_errors_on_unknown_binary() {
    let err = pdfmetaextract::poppler::find_tool("definitely-not-a-poppler-tool");
    assert!(matches!(err, Err(MetadataError::ToolNotFound(_))));
}

// ── Fixture-based tests (ignored without real PDFs) ───────────────────────────

/// To run: place a PDF with an Info dictionary and XMP metadata at
/// `tests/fixtures/sample_metadata.pdf` and run with `--include-ignored`.
#[test]
#[ignore]
fn fixture_metadata_roundtrip() {
    use pdfmetaextract::MetadataExtractor;

    let bytes = std::fs::read("tests/fixtures/sample_metadata.pdf")
        .expect("place tests/fixtures/sample_metadata.pdf to run this test");

    let extractor = MetadataExtractor::from_bytes(&bytes).unwrap();
    let record = extractor.metadata().unwrap();
    assert!(!record.is_empty());
}

/// To run: same fixture as above, plus Poppler installed, with
/// `--include-ignored`.
#[test]
#[ignore]
fn fixture_page_images_render() {
    use std::path::Path;

    let dir = tempfile::tempdir().unwrap();
    pdfmetaextract::poppler::page_images(
        Path::new("tests/fixtures/sample_metadata.pdf"),
        dir.path(),
        1,
        1,
    )
    .unwrap();

    let rendered: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(!rendered.is_empty());
}
