//! Normalization of the legacy trailer `/Info` dictionary.
//!
//! Info dictionaries in the wild carry arbitrarily-cased, vendor-prefixed
//! field names (`ebx_Publisher`, `PTEX.Fullbanner`, …) and occasionally have
//! their key and value the wrong way round. The pipeline here is: regex
//! re-key to a canonical field name, drop known boilerplate, dispatch
//! through a per-field policy table, and on a miss retry once with the value
//! standing in as the key. Entries that are still unrecognized are logged
//! and dropped — unknown vendor fields are expected, not an error.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::dict_utils::{self, match_at_start};
use crate::record::MetadataRecord;
use crate::{MetadataError, Result};

/// Producer strings matching any of these are toolchain noise, not
/// bibliographic data. Case-sensitive.
const PRODUCER_DROP_PATTERNS: &[&str] = &[r".*LaTeX.*", r".*Acrobat.*"];

/// Keys matching any of these are dropped outright. The single entry is the
/// legal boilerplate some conversion houses stamp into every document.
const INFO_KEY_DROP_PATTERNS: &[&str] = &["the process that creates this pdf constitutes \
a trade secret of codemantra, llc and is protected by the copyright laws of the united states"];

/// Re-key table applied to trimmed, lower-cased raw keys. First matching
/// pattern wins; unmatched keys pass through unchanged.
static REKEY_TABLE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^Author$", "author"),
        (r"^.*CreationDate$", "timestamp"),
        (r"^.*Creator$", "creator"),
        (r"^ModDate$", "last_modified"),
        (r"^.*Producer$", "producer"),
        (r"^(ebx_)?Publisher$", "publisher"),
        (r"^Title$", "title"),
    ]
    .into_iter()
    .map(|(pattern, name)| {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("valid re-key pattern");
        (re, name)
    })
    .collect()
});

// ── Raw values ───────────────────────────────────────────────────────────────

/// A decoded value from the raw Info dictionary.
///
/// PDF distinguishes text strings from name tokens (`/pdf`-style literals);
/// the `universal` policy needs that distinction, so it survives decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    /// A decoded PDF text string.
    Text(String),
    /// A PDF name token — the keyword/literal form.
    Keyword(String),
}

impl InfoValue {
    /// The value's text content, regardless of form.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Keyword(s) => s,
        }
    }
}

// ── Per-field policies ───────────────────────────────────────────────────────

/// What a recognized canonical field does to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldPolicy {
    /// Append to `author`. `creator` is treated as an author alias.
    AppendAuthor,
    /// Split on comma when one is present, extend `tags`.
    SplitKeywords,
    /// Overwrite `last_modified`.
    SetLastModified,
    /// Append to `producer`, but only when no sibling `producer` key exists
    /// and the value clears the producer drop-list.
    ProducerFallback,
    /// Append to `producer` unless the value matches the drop-list.
    AppendProducer,
    /// Publisher handling, including the `ebx_publisher` asymmetry.
    Publisher,
    /// Extend `tags` with the value.
    ExtendTags,
    /// Overwrite `timestamp`.
    SetTimestamp,
    /// Overwrite `title` and extend `tags` with it.
    SetTitle,
    /// Tag unless the value is the `/pdf` keyword; any other keyword is a
    /// fatal parse error.
    UniversalTag,
    /// Recognized and deliberately discarded.
    Ignore,
}

/// The executable form of the per-field policy table.
const POLICY_TABLE: &[(&str, FieldPolicy)] = &[
    ("author", FieldPolicy::AppendAuthor),
    ("creator", FieldPolicy::AppendAuthor),
    ("keywords", FieldPolicy::SplitKeywords),
    ("last_modified", FieldPolicy::SetLastModified),
    ("llc", FieldPolicy::ProducerFallback),
    ("producer", FieldPolicy::AppendProducer),
    ("publisher", FieldPolicy::Publisher),
    ("ebx_publisher", FieldPolicy::Publisher),
    ("subject", FieldPolicy::ExtendTags),
    ("timestamp", FieldPolicy::SetTimestamp),
    ("title", FieldPolicy::SetTitle),
    ("universal", FieldPolicy::UniversalTag),
    ("universal pdf", FieldPolicy::Ignore),
    ("codemantra, llc", FieldPolicy::Ignore),
    ("pdfversion", FieldPolicy::Ignore),
];

fn policy_for(key: &str) -> Option<FieldPolicy> {
    POLICY_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, policy)| *policy)
}

// ── Normalization ────────────────────────────────────────────────────────────

/// Fold a raw Info dictionary into `record`.
///
/// `info` preserves the dictionary's own entry order; dispatch order is
/// visible in the record (tags accumulate in encounter order).
pub fn normalize_info_dict(info: &[(String, InfoValue)], record: &mut MetadataRecord) -> Result<()> {
    let raw_keys: Vec<String> = info.iter().map(|(key, _)| key.clone()).collect();
    let raw_values: Vec<String> = info
        .iter()
        .map(|(_, value)| value.as_text().to_string())
        .collect();

    for (raw_key, value) in info {
        let field_key = rekey_field(raw_key);
        if dict_utils::matches_any(INFO_KEY_DROP_PATTERNS, &field_key, false)? {
            continue;
        }
        if apply_policy(&field_key, value, &raw_keys, record)? {
            continue;
        }

        // The entry was not recognized: some producers write the meaningful
        // token on the value side. Retry once with the decoded value as the
        // key candidate; the sibling set for this pass is the dictionary's
        // values.
        let swapped_key = value.as_text();
        if dict_utils::matches_any(INFO_KEY_DROP_PATTERNS, swapped_key, false)? {
            continue;
        }
        let swapped_value = InfoValue::Text(swapped_key.to_string());
        if apply_policy(swapped_key, &swapped_value, &raw_values, record)? {
            continue;
        }

        debug!(
            key = %raw_key,
            value = %value.as_text(),
            "unexpected info-dict entry dropped"
        );
    }

    Ok(())
}

/// Re-key one raw field name: trim, lower-case, then first matching table
/// pattern wins; unmatched names pass through (lower-cased).
fn rekey_field(raw_key: &str) -> String {
    let lowered = raw_key.trim().to_lowercase();
    for (re, canonical) in REKEY_TABLE.iter() {
        if match_at_start(re, &lowered) {
            return (*canonical).to_string();
        }
    }
    lowered
}

/// Dispatch one `(key, value)` pair through the policy table.
///
/// Returns `Ok(false)` when no policy recognizes the key — the caller
/// decides whether to retry or drop. `siblings` is the raw key set of the
/// dictionary (or its value set, on the swap retry), used by the `llc` and
/// `ebx_publisher` fallback checks.
fn apply_policy(
    key: &str,
    value: &InfoValue,
    siblings: &[String],
    record: &mut MetadataRecord,
) -> Result<bool> {
    let Some(policy) = policy_for(key) else {
        return Ok(false);
    };

    match policy {
        FieldPolicy::AppendAuthor => record.author.push(value.as_text().to_string()),

        FieldPolicy::SplitKeywords => {
            let text = value.as_text();
            if text.contains(',') {
                record.tags.extend(text.split(',').map(|tag| tag.to_string()));
            } else {
                record.tags.push(text.to_string());
            }
        }

        FieldPolicy::SetLastModified => record.last_modified = Some(value.as_text().to_string()),

        FieldPolicy::ProducerFallback => {
            if !siblings.iter().any(|s| s == "producer")
                && !dict_utils::matches_any(PRODUCER_DROP_PATTERNS, value.as_text(), false)?
            {
                record.producer.push(value.as_text().to_string());
            }
        }

        FieldPolicy::AppendProducer => {
            if !dict_utils::matches_any(PRODUCER_DROP_PATTERNS, value.as_text(), false)? {
                record.producer.push(value.as_text().to_string());
            }
        }

        FieldPolicy::Publisher => {
            let text = value.as_text();
            let text = text.strip_prefix('/').unwrap_or(text);
            if key != "publisher" && !siblings.iter().any(|s| s == "publisher") {
                record.publisher.push(text.to_string());
            } else {
                // A publisher under the primary key is recorded as a tag,
                // not a publisher.
                record.tags.push(text.to_string());
            }
        }

        FieldPolicy::ExtendTags => record.tags.push(value.as_text().to_string()),

        FieldPolicy::SetTimestamp => record.timestamp = Some(value.as_text().to_string()),

        FieldPolicy::SetTitle => {
            let text = value.as_text().to_string();
            record.title = Some(text.clone());
            record.tags.push(text);
        }

        FieldPolicy::UniversalTag => match value {
            // Internal postscript keywords are not bibliographic data; the
            // only one tolerated is `pdf`.
            InfoValue::Keyword(keyword) => {
                if !keyword.eq_ignore_ascii_case("pdf") {
                    return Err(MetadataError::MalformedMetadata(format!(
                        "unexpected keyword value under 'universal' field: '{keyword}'"
                    )));
                }
            }
            InfoValue::Text(text) => record.tags.push(text.clone()),
        },

        FieldPolicy::Ignore => {}
    }

    Ok(true)
}
