use lopdf::{Document, Object};
use std::path::Path;
use tracing::debug;

use crate::info_normalizer::{self, InfoValue};
use crate::record::MetadataRecord;
use crate::xmp_normalizer;
use crate::xmp_parser;
use crate::{ExtractorConfig, MetadataError, Result};

// ── MetadataExtractor ─────────────────────────────────────────────────────────

/// Entry point for metadata extraction.
///
/// # Creating an extractor
///
/// ```no_run
/// use pdfmetaextract::{MetadataExtractor, ExtractorConfig};
///
/// // From a file path
/// let e = MetadataExtractor::from_path("book.pdf").unwrap();
///
/// // From an in-memory buffer
/// let bytes = std::fs::read("book.pdf").unwrap();
/// let e = MetadataExtractor::from_bytes(&bytes).unwrap();
///
/// // With custom configuration
/// let cfg = ExtractorConfig { strict_xmp: false };
/// let e = MetadataExtractor::with_config("book.pdf", cfg).unwrap();
/// ```
pub struct MetadataExtractor {
    document: Document,
    config: ExtractorConfig,
}

impl MetadataExtractor {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a PDF from the file system.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            document: Document::load(path)?,
            config: ExtractorConfig::default(),
        })
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            document: Document::load_mem(data)?,
            config: ExtractorConfig::default(),
        })
    }

    /// Load a PDF from the file system with a custom [`ExtractorConfig`].
    pub fn with_config<P: AsRef<Path>>(path: P, config: ExtractorConfig) -> Result<Self> {
        Ok(Self {
            document: Document::load(path)?,
            config,
        })
    }

    // ── Extraction ────────────────────────────────────────────────────────────

    /// Extract and normalize the document's metadata.
    ///
    /// The trailer `/Info` dictionary is folded first; if the catalog
    /// carries a `/Metadata` XMP stream, that is parsed and folded on top,
    /// so XMP values may overwrite or extend what the Info dictionary set.
    /// A fatal parse error aborts the extraction — no partial record is
    /// returned on that path.
    pub fn metadata(&self) -> Result<MetadataRecord> {
        let mut record = MetadataRecord::default();

        if let Some(info) = self.raw_info_dict()? {
            info_normalizer::normalize_info_dict(&info, &mut record)?;
        }

        if let Some(xmp) = self.raw_xmp_stream()? {
            let meta = xmp_parser::parse_xmp(&xmp)?;
            xmp_normalizer::normalize_xmp(&meta, &mut record, &self.config)?;
        }

        Ok(record)
    }

    // ── Raw metadata access ───────────────────────────────────────────────────

    /// The raw trailer `/Info` dictionary, decoded to text, in the
    /// dictionary's own entry order. `Ok(None)` when the document has no
    /// Info dictionary at all.
    ///
    /// Null-valued entries are dropped; container-valued entries (arrays,
    /// dictionaries, streams) are logged and skipped.
    pub fn raw_info_dict(&self) -> Result<Option<Vec<(String, InfoValue)>>> {
        let Ok(info_val) = self.document.trailer.get(b"Info") else {
            return Ok(None);
        };

        // /Info may be an inline dict or an indirect reference.
        let info_dict = if let Ok(id) = info_val.as_reference() {
            self.document
                .get_object(id)
                .ok()
                .and_then(|o| o.as_dict().ok().cloned())
        } else {
            info_val.as_dict().ok().cloned()
        };
        let Some(dict) = info_dict else {
            return Ok(None);
        };

        let mut entries = Vec::with_capacity(dict.len());
        for (key, value) in dict.iter() {
            let key = String::from_utf8_lossy(key).into_owned();
            match self.decode_info_value(value) {
                Some(decoded) => entries.push((key, decoded)),
                None => {
                    debug!(key = %key, "skipping info-dict entry with non-text value");
                }
            }
        }
        Ok(Some(entries))
    }

    /// The raw XMP stream bytes from the catalog's `/Metadata` entry, or
    /// `Ok(None)` when the document has none.
    pub fn raw_xmp_stream(&self) -> Result<Option<Vec<u8>>> {
        let Ok(catalog) = self.document.catalog() else {
            return Ok(None);
        };
        let Ok(meta_val) = catalog.get(b"Metadata") else {
            return Ok(None);
        };

        let meta_id = meta_val.as_reference().map_err(|_| {
            MetadataError::MalformedMetadata("/Metadata entry is not an indirect reference".into())
        })?;
        let meta_obj = self.document.get_object(meta_id)?;
        let stream = meta_obj.as_stream().map_err(|_| {
            MetadataError::MalformedMetadata("/Metadata object is not a stream".into())
        })?;

        let bytes = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        Ok(Some(bytes))
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Returns a reference to the underlying [`lopdf::Document`].
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns a reference to the active [`ExtractorConfig`].
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    // ── Private: value decoding ──────────────────────────────────────────────

    /// Decode one Info-dictionary object to text form. Name tokens keep
    /// their keyword nature; numbers and booleans are rendered to text;
    /// nulls and containers yield `None`.
    fn decode_info_value(&self, object: &Object) -> Option<InfoValue> {
        match object {
            Object::String(bytes, _) => Some(InfoValue::Text(decode_pdf_string(bytes))),
            Object::Name(bytes) => Some(InfoValue::Keyword(
                String::from_utf8_lossy(bytes).into_owned(),
            )),
            Object::Integer(n) => Some(InfoValue::Text(n.to_string())),
            Object::Real(r) => Some(InfoValue::Text(r.to_string())),
            Object::Boolean(b) => Some(InfoValue::Text(b.to_string())),
            Object::Reference(id) => self
                .document
                .get_object(*id)
                .ok()
                .and_then(|resolved| self.decode_info_value(resolved)),
            _ => None,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Decode a PDF text string: UTF-16BE when the byte-order mark is present,
/// otherwise a lossy UTF-8 read.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
