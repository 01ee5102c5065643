//! # pdfmetaextract
//!
//! A Rust library for extracting bibliographic metadata from PDF documents
//! and normalizing it into one canonical record.
//!
//! ## What this crate does
//!
//! Metadata can be embedded in PDF files in two distinct places. Older PDFs
//! carry an "Info" dictionary referenced from the trailer; newer ones embed
//! an XMP/RDF stream in the document catalog; many carry both, with
//! arbitrarily-named, vendor-specific fields. This crate:
//!
//! 1. **Reads the Info dictionary** — regex re-keys known fields, drops
//!    known vendor noise, and folds the rest into a [`MetadataRecord`] via a
//!    per-field policy table.
//! 2. **Parses the XMP stream** — namespaced XML/RDF into a two-level
//!    mapping ([`XmpMeta`]), covering the Bag, Seq, and Alt container forms.
//! 3. **Normalizes the XMP mapping** — folds the recognized `xapmm` and `dc`
//!    properties into the same record, failing fast on shapes it does not
//!    understand.
//! 4. **Drives external renderers** — optional helpers invoke Poppler's
//!    `pdfinfo` and `pdftoppm` for the line-oriented info output and page
//!    images.
//!
//! ## Quick example
//!
//! ```no_run
//! use pdfmetaextract::MetadataExtractor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = MetadataExtractor::from_path("book.pdf")?;
//! let record = extractor.metadata()?;
//!
//! if let Some(title) = &record.title {
//!     println!("title: {title}");
//! }
//! for author in &record.author {
//!     println!("author: {author}");
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod dict_utils;
mod extractor;
mod info_normalizer;
pub mod poppler;
mod record;
mod xmp_normalizer;
mod xmp_parser;

pub use extractor::MetadataExtractor;
pub use info_normalizer::InfoValue;
pub use record::MetadataRecord;
pub use xmp_parser::{XmpMeta, XmpValue};
// The normalizer entry points are re-exported so the two pipelines can be
// driven without a PDF in hand (e.g. over pdfinfo output or a bare XMP blob).
pub use info_normalizer::normalize_info_dict;
pub use xmp_normalizer::normalize_xmp;
pub use xmp_parser::parse_xmp;

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`MetadataExtractor`].
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// When `true` (the default), XMP metadata whose shape falls outside the
    /// small set of recognized forms aborts the extraction with
    /// [`MetadataError::MalformedMetadata`].
    ///
    /// When `false`, the normalizer degrades instead: a colon-less
    /// `xapmm:DocumentID` is taken verbatim as the uuid, unknown `dc` tags
    /// and foreign namespaces are logged and skipped, and an over-long
    /// `dc:publisher` list keeps its first element.
    pub strict_xmp: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self { strict_xmp: true }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A filesystem I/O error occurred (e.g. when loading the PDF).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The XMP metadata stream is not well-formed XML.
    #[error("XMP stream is not well-formed XML: {0}")]
    XmpSyntax(String),

    /// The document's metadata violates one of the shapes the normalizers
    /// understand (malformed `DocumentID`, ambiguous title cardinality,
    /// unrecognized namespace, …). The extraction is aborted; no partial
    /// record is returned.
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    /// Two dictionaries being merged share a key whose values cannot be
    /// reconciled.
    #[error("key conflict during dictionary merge: {0}")]
    KeyConflict(String),

    /// A re-key pass did not transfer every entry it was required to.
    #[error("re-key mismatch: {0}")]
    RekeyMismatch(String),

    /// A key matched more than one pattern of a re-key table.
    #[error("ambiguous re-key: '{0}' matches more than one pattern")]
    AmbiguousRekey(String),

    /// A caller-supplied regex pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// An external tool required for rendering could not be located.
    #[error("external tool not found: {0}")]
    ToolNotFound(String),

    /// The external page renderer exited with a non-zero status.
    #[error("failed to render PDF, pdftoppm exit status: {0}")]
    RenderFailed(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, MetadataError>;
