use serde::Serialize;

// ── MetadataRecord ───────────────────────────────────────────────────────────

/// The canonical metadata record both normalizers fold into.
///
/// Returned by [`crate::MetadataExtractor::metadata`]. The shape is
/// source-independent: whether a field arrived via the legacy Info dictionary
/// or via XMP, it lands in the same place here.
///
/// List-valued fields (`author`, `tags`, `producer`, `publisher`) are
/// append-only during a normalization pass and may contain duplicates;
/// scalar fields are last-write-wins. When serialized, absent fields are
/// omitted rather than null-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    /// Document authors, in the order they were encountered. The Info
    /// dictionary's `Creator` field is treated as an author alias.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<String>,

    /// Document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Free-form tags, accumulated from keywords, subject entries, and the
    /// title itself.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Creation timestamp, verbatim in whichever date format the source
    /// used (typically PDF date syntax, `D:YYYYMMDDHHmmSS…`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Modification timestamp, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,

    /// Producer strings, with known toolchain noise (LaTeX, Acrobat)
    /// already dropped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub producer: Vec<String>,

    /// Publisher strings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub publisher: Vec<String>,

    /// Document identifier extracted from `xapmm:DocumentID`, without its
    /// `uuid:` scheme prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl MetadataRecord {
    /// Returns `true` when no field has been populated.
    pub fn is_empty(&self) -> bool {
        self.author.is_empty()
            && self.title.is_none()
            && self.tags.is_empty()
            && self.timestamp.is_none()
            && self.last_modified.is_none()
            && self.producer.is_empty()
            && self.publisher.is_empty()
            && self.uuid.is_none()
    }
}
