//! Folding a parsed XMP mapping into the canonical record.
//!
//! Where the Info-dict side tolerates a wide spread of vendor noise, the
//! XMP side fails fast: the recognized shapes are few and deliberate, and
//! anything outside them means the document's metadata is malformed rather
//! than merely messy. The lenient escape hatch
//! ([`ExtractorConfig::strict_xmp`](crate::ExtractorConfig) set to `false`)
//! degrades instead of failing where a degraded reading exists.

use tracing::debug;

use crate::record::MetadataRecord;
use crate::xmp_parser::{XmpMeta, XmpValue};
use crate::{ExtractorConfig, MetadataError, Result};

/// Fold an XMP mapping into `record`.
///
/// Info-dict normalization runs before this for a given document, so values
/// here overwrite or extend what the Info dictionary already set. In strict
/// mode any namespace outside `xapmm`/`dc` is rejected up front, before the
/// record is touched — a fatal error never leaves a partially-updated
/// record behind.
pub fn normalize_xmp(
    meta: &XmpMeta,
    record: &mut MetadataRecord,
    config: &ExtractorConfig,
) -> Result<()> {
    for ns in meta.namespaces() {
        if ns != "xapmm" && ns != "dc" {
            if config.strict_xmp {
                return Err(MetadataError::MalformedMetadata(format!(
                    "unrecognized XMP namespace '{ns}'"
                )));
            }
            debug!(namespace = %ns, "ignoring XMP namespace outside xapmm/dc");
        }
    }

    fold_document_ids(meta, record, config)?;
    fold_dublin_core(meta, record, config)
}

// ── xapmm ────────────────────────────────────────────────────────────────────

fn fold_document_ids(
    meta: &XmpMeta,
    record: &mut MetadataRecord,
    config: &ExtractorConfig,
) -> Result<()> {
    for (field, value) in meta.properties("xapmm") {
        match field.as_str() {
            "InstanceID" => {}
            "DocumentID" => fold_document_id(value, record, config)?,
            other => {
                return Err(MetadataError::MalformedMetadata(format!(
                    "unexpected field '{other}' in the xapmm namespace"
                )));
            }
        }
    }
    Ok(())
}

/// `DocumentID` must be `uuid:<value>`: colon-delimited, exactly two tokens,
/// the first literally `uuid`. Anything else is malformed — except that
/// lenient mode accepts a colon-less identifier verbatim.
fn fold_document_id(
    value: &XmpValue,
    record: &mut MetadataRecord,
    config: &ExtractorConfig,
) -> Result<()> {
    let XmpValue::Text(Some(identifier)) = value else {
        return Err(MetadataError::MalformedMetadata(
            "xapmm:DocumentID is not a plain text property".into(),
        ));
    };

    let tokens: Vec<&str> = identifier.split(':').collect();
    match tokens.as_slice() {
        [_] => {
            if config.strict_xmp {
                return Err(MetadataError::MalformedMetadata(format!(
                    "unrecognized kind of identifier: '{identifier}'"
                )));
            }
            record.uuid = Some(identifier.clone());
        }
        ["uuid", id] => record.uuid = Some((*id).to_string()),
        [scheme, _] => {
            return Err(MetadataError::MalformedMetadata(format!(
                "unrecognized identifier scheme '{scheme}' in '{identifier}'"
            )));
        }
        _ => {
            return Err(MetadataError::MalformedMetadata(format!(
                "identifier has an unexpected number of tokens: '{identifier}'"
            )));
        }
    }
    Ok(())
}

// ── dc ───────────────────────────────────────────────────────────────────────

fn fold_dublin_core(
    meta: &XmpMeta,
    record: &mut MetadataRecord,
    config: &ExtractorConfig,
) -> Result<()> {
    for (field, value) in meta.properties("dc") {
        // Valueless properties carry nothing worth folding.
        if value.is_empty() {
            continue;
        }

        match field.as_str() {
            "title" => fold_title(value, record, config)?,
            "creator" => fold_creator(value, record),
            "format" => {}
            "publisher" => fold_publisher(value, record, config)?,
            "description" => fold_description(value, record, config)?,
            "subject" => {
                record
                    .tags
                    .extend(value.texts().into_iter().map(|tag| tag.to_string()));
            }
            other => {
                if config.strict_xmp {
                    return Err(MetadataError::MalformedMetadata(format!(
                        "unrecognized field '{other}' in the dc namespace"
                    )));
                }
                debug!(field = %other, "ignoring unrecognized dc field");
            }
        }
    }
    Ok(())
}

fn fold_title(
    value: &XmpValue,
    record: &mut MetadataRecord,
    config: &ExtractorConfig,
) -> Result<()> {
    match value {
        XmpValue::LangAlt(entries) if entries.len() == 1 => {
            if let Some(text) = &entries[0].1 {
                record.title = Some(text.clone());
            }
        }
        XmpValue::LangAlt(_) => {
            if config.strict_xmp {
                return Err(MetadataError::MalformedMetadata(
                    "ambiguous dc:title with multiple language alternatives".into(),
                ));
            }
            // Lenient reading: first alternative wins, and every
            // alternative lands in the tags.
            let texts = value.texts();
            if let Some(first) = texts.first() {
                record.title = Some((*first).to_string());
            }
            record.tags.extend(texts.into_iter().map(|alt| alt.to_string()));
        }
        XmpValue::Text(Some(text)) => record.title = Some(text.clone()),
        XmpValue::Text(None) => {}
        XmpValue::List(_) => {
            if config.strict_xmp {
                return Err(MetadataError::MalformedMetadata(
                    "dc:title is a list, expected text or language alternatives".into(),
                ));
            }
            if let Some(first) = value.texts().first() {
                record.title = Some((*first).to_string());
            }
        }
    }
    Ok(())
}

/// Any creator is assumed to be an author; XMP has no way to say otherwise.
/// A list replaces `author` wholesale with one joined string — unlike the
/// Info-dict path, which appends.
fn fold_creator(value: &XmpValue, record: &mut MetadataRecord) {
    match value {
        XmpValue::List(_) | XmpValue::LangAlt(_) => {
            record.author = vec![value.texts().join(", ")];
        }
        XmpValue::Text(Some(text)) => record.author = vec![text.clone()],
        XmpValue::Text(None) => {}
    }
}

fn fold_publisher(
    value: &XmpValue,
    record: &mut MetadataRecord,
    config: &ExtractorConfig,
) -> Result<()> {
    if let XmpValue::List(items) = value {
        if items.len() == 1 {
            if let Some(Some(text)) = items.first() {
                record.publisher = vec![text.clone()];
            }
        } else if config.strict_xmp {
            return Err(MetadataError::MalformedMetadata(format!(
                "ambiguous dc:publisher with {} entries",
                items.len()
            )));
        } else if let Some(first) = value.texts().first() {
            record.publisher = vec![(*first).to_string()];
        }
    }
    Ok(())
}

/// The only tolerated description is podofo's default placeholder — a
/// single `x-default` alternative with no text — which is ignored. In
/// lenient mode any other description is joined into `publisher`, matching
/// the legacy fallback this normalizer inherited.
fn fold_description(
    value: &XmpValue,
    record: &mut MetadataRecord,
    config: &ExtractorConfig,
) -> Result<()> {
    if let XmpValue::LangAlt(entries) = value {
        if entries.len() == 1
            && entries[0].0.as_deref() == Some("x-default")
            && entries[0].1.is_none()
        {
            return Ok(());
        }
    }

    if config.strict_xmp {
        return Err(MetadataError::MalformedMetadata(
            "unexpected dc:description shape".into(),
        ));
    }
    record.publisher = vec![value.texts().join(", ")];
    Ok(())
}
