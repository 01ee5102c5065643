// Tests for the Info-dictionary normalization pipeline: regex re-keying,
// drop-lists, the per-field policy table, and the key/value-swap retry.

use pdfmetaextract::{normalize_info_dict, InfoValue, MetadataRecord};

fn text(s: &str) -> InfoValue {
    InfoValue::Text(s.into())
}

fn entries(pairs: &[(&str, InfoValue)]) -> Vec<(String, InfoValue)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn normalize(pairs: &[(&str, InfoValue)]) -> MetadataRecord {
    let mut record = MetadataRecord::default();
    normalize_info_dict(&entries(pairs), &mut record).unwrap();
    record
}

// ── Re-keying ─────────────────────────────────────────────────────────────────

#[test]
fn author_and_creator_both_append_to_author() {
    let record = normalize(&[
        ("Author", text("Herman Melville")),
        ("Creator", text("Nathaniel Philbrick")),
    ]);
    assert_eq!(record.author, vec!["Herman Melville", "Nathaniel Philbrick"]);
}

#[test]
fn rekeying_is_case_insensitive_and_trims() {
    let record = normalize(&[("  aUtHoR  ", text("Herman Melville"))]);
    assert_eq!(record.author, vec!["Herman Melville"]);
}

#[test]
fn vendor_prefixed_dates_rekey_to_timestamps() {
    let record = normalize(&[
        ("PTEX.CreationDate", text("D:20200101000000Z")),
        ("ModDate", text("D:20210101000000Z")),
    ]);
    assert_eq!(record.timestamp.as_deref(), Some("D:20200101000000Z"));
    assert_eq!(record.last_modified.as_deref(), Some("D:20210101000000Z"));
}

// ── Drop-lists ────────────────────────────────────────────────────────────────

#[test]
fn acrobat_producer_is_dropped() {
    let record = normalize(&[("Producer", text("Acrobat Distiller 9.0"))]);
    assert!(record.producer.is_empty());
}

#[test]
fn latex_producer_is_dropped() {
    let record = normalize(&[("Producer", text("LaTeX with hyperref package"))]);
    assert!(record.producer.is_empty());
}

#[test]
fn producer_drop_list_is_case_sensitive() {
    // "acrobat" does not match the ".*Acrobat.*" pattern.
    let record = normalize(&[("Producer", text("acrobat clone 1.0"))]);
    assert_eq!(record.producer, vec!["acrobat clone 1.0"]);
}

#[test]
fn honest_producer_is_kept() {
    let record = normalize(&[("Producer", text("pdfTeX-1.40"))]);
    assert_eq!(record.producer, vec!["pdfTeX-1.40"]);
}

#[test]
fn codemantra_boilerplate_key_is_dropped() {
    let record = normalize(&[(
        "the process that creates this pdf constitutes a trade secret of \
         codemantra, llc and is protected by the copyright laws of the united states",
        text("anything"),
    )]);
    assert!(record.is_empty());
}

// ── Title, keywords, tags ─────────────────────────────────────────────────────

#[test]
fn title_and_keywords_accumulate_tags_in_dispatch_order() {
    let record = normalize(&[
        ("Title", text("Moby Dick")),
        ("Keywords", text("fiction,whaling")),
    ]);
    assert_eq!(record.title.as_deref(), Some("Moby Dick"));
    assert_eq!(record.tags, vec!["Moby Dick", "fiction", "whaling"]);
}

#[test]
fn comma_free_keywords_are_one_tag() {
    let record = normalize(&[("Keywords", text("whaling voyages"))]);
    assert_eq!(record.tags, vec!["whaling voyages"]);
}

#[test]
fn subject_extends_tags() {
    let record = normalize(&[("Subject", text("nautical fiction"))]);
    assert_eq!(record.tags, vec!["nautical fiction"]);
}

#[test]
fn title_overwrites_but_tags_keep_both() {
    let record = normalize(&[
        ("Title", text("First Title")),
        ("Title", text("Second Title")),
    ]);
    assert_eq!(record.title.as_deref(), Some("Second Title"));
    assert_eq!(record.tags, vec!["First Title", "Second Title"]);
}

// ── Publisher asymmetry (documented quirk, not a bug) ─────────────────────────

#[test]
fn publisher_under_primary_key_is_a_tag_not_a_publisher() {
    let record = normalize(&[("Publisher", text("/Penguin Classics"))]);
    assert!(record.publisher.is_empty());
    assert_eq!(record.tags, vec!["Penguin Classics"]);
}

#[test]
fn ebx_publisher_rekeys_to_the_primary_key_and_lands_in_tags() {
    // The re-key table canonicalizes ebx_Publisher to publisher before the
    // policy sees it, so the raw vendor key takes the tag path too.
    let record = normalize(&[("ebx_Publisher", text("Penguin Classics"))]);
    assert!(record.publisher.is_empty());
    assert_eq!(record.tags, vec!["Penguin Classics"]);
}

// ── llc producer fallback ─────────────────────────────────────────────────────

#[test]
fn llc_fills_producer_when_no_sibling_producer_key_exists() {
    let record = normalize(&[("llc", text("Some Press"))]);
    assert_eq!(record.producer, vec!["Some Press"]);
}

#[test]
fn llc_defers_to_a_sibling_producer_key() {
    let record = normalize(&[
        ("llc", text("Some Press")),
        ("producer", text("Real Producer")),
    ]);
    assert_eq!(record.producer, vec!["Real Producer"]);
}

#[test]
fn llc_respects_the_producer_drop_list() {
    let record = normalize(&[("llc", text("LaTeX helper"))]);
    assert!(record.producer.is_empty());
}

// ── universal field ───────────────────────────────────────────────────────────

#[test]
fn universal_pdf_keyword_is_ignored() {
    let record = normalize(&[("universal", InfoValue::Keyword("pdf".into()))]);
    assert!(record.is_empty());
}

#[test]
fn universal_pdf_keyword_is_case_insensitive() {
    let record = normalize(&[("universal", InfoValue::Keyword("PDF".into()))]);
    assert!(record.is_empty());
}

#[test]
fn universal_text_value_becomes_a_tag() {
    let record = normalize(&[("universal", text("special collection"))]);
    assert_eq!(record.tags, vec!["special collection"]);
}

#[test]
fn unexpected_universal_keyword_is_a_fatal_error() {
    let mut record = MetadataRecord::default();
    let info = entries(&[("universal", InfoValue::Keyword("postscript".into()))]);
    assert!(normalize_info_dict(&info, &mut record).is_err());
}

// ── Explicitly ignored fields ─────────────────────────────────────────────────

#[test]
fn known_noise_fields_have_no_effect() {
    let record = normalize(&[
        ("universal pdf", text("x")),
        ("codemantra, llc", text("y")),
        ("PDFVersion", text("1.7")),
    ]);
    assert!(record.is_empty());
}

// ── Unrecognized entries and the key/value swap ───────────────────────────────

#[test]
fn unknown_entries_are_silently_dropped() {
    let record = normalize(&[("X-Vendor-Custom", text("opaque value"))]);
    assert!(record.is_empty());
}

#[test]
fn swap_retries_with_the_value_as_the_key() {
    // The key carries no meaning, but the value is a recognizable field
    // name; the retry dispatches it with the value standing in for both
    // sides.
    let record = normalize(&[("6fa0de21", text("subject"))]);
    assert_eq!(record.tags, vec!["subject"]);
}

#[test]
fn swap_respects_the_key_drop_list() {
    let record = normalize(&[(
        "6fa0de21",
        text(
            "the process that creates this pdf constitutes a trade secret of \
             codemantra, llc and is protected by the copyright laws of the united states",
        ),
    )]);
    assert!(record.is_empty());
}

// ── Append-only list fields ───────────────────────────────────────────────────

#[test]
fn author_and_producer_never_shrink_or_reorder() {
    let mut record = MetadataRecord::default();

    let first = entries(&[("Author", text("A")), ("Producer", text("P1"))]);
    normalize_info_dict(&first, &mut record).unwrap();
    let second = entries(&[("Author", text("B")), ("Producer", text("P2"))]);
    normalize_info_dict(&second, &mut record).unwrap();

    assert_eq!(record.author, vec!["A", "B"]);
    assert_eq!(record.producer, vec!["P1", "P2"]);
}
