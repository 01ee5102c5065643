//! XMP/RDF stream parsing.
//!
//! XMP embeds an RDF document inside an `x:xmpmeta` envelope. Only the
//! subset of RDF that XMP actually uses is understood here: plain text
//! properties and the `Bag`, `Seq`, and `Alt` container forms. The result
//! is a two-level mapping — namespace prefix, then local tag name — with no
//! schema beyond that; unrecognized namespaces and tags are preserved
//! verbatim for the caller to judge.

use std::collections::BTreeMap;
use std::fmt::Display;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use tracing::debug;

use crate::{MetadataError, Result};

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Namespace-URI → short-prefix table. URIs outside this table pass through
/// verbatim as the mapping key.
const NS_PREFIXES: &[(&str, &str)] = &[
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
    ("http://purl.org/dc/elements/1.1/", "dc"),
    ("http://ns.adobe.com/xap/1.0/", "xap"),
    ("http://ns.adobe.com/pdf/1.3/", "pdf"),
    ("http://ns.adobe.com/xap/1.0/mm/", "xapmm"),
    ("http://ns.adobe.com/pdfx/1.3/", "pdfx"),
    ("http://prismstandard.org/namespaces/basic/2.0/", "prism"),
    ("http://crossref.org/crossmark/1.0/", "crossmark"),
    ("http://ns.adobe.com/xap/1.0/rights/", "rights"),
    ("http://www.w3.org/XML/1998/namespace", "xml"),
];

fn ns_key(uri: &str) -> String {
    NS_PREFIXES
        .iter()
        .find(|(known, _)| *known == uri)
        .map(|(_, prefix)| (*prefix).to_string())
        .unwrap_or_else(|| uri.to_string())
}

// ── Value and mapping types ──────────────────────────────────────────────────

/// One parsed XMP property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmpValue {
    /// A plain property: its direct text content, absent when the element
    /// was empty.
    Text(Option<String>),
    /// A `Bag` or `Seq` container: item texts in document order. RDF treats
    /// `Bag` as unordered; this parser does not reorder.
    List(Vec<Option<String>>),
    /// An `Alt` container: `(language, text)` pairs in document order.
    LangAlt(Vec<(Option<String>, Option<String>)>),
}

impl XmpValue {
    /// `true` for values with nothing in them: an absent or empty scalar,
    /// or a container without items.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(None) => true,
            Self::Text(Some(s)) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::LangAlt(entries) => entries.is_empty(),
        }
    }

    /// All present texts, in encounter order. Absent items are skipped.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text(text) => text.iter().map(String::as_str).collect(),
            Self::List(items) => items.iter().flatten().map(String::as_str).collect(),
            Self::LangAlt(entries) => entries
                .iter()
                .filter_map(|(_, text)| text.as_deref())
                .collect(),
        }
    }
}

/// The parsed XMP mapping: namespace prefix → ordered `(tag, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmpMeta {
    namespaces: BTreeMap<String, Vec<(String, XmpValue)>>,
}

impl XmpMeta {
    /// `true` when no property was parsed.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// The namespace keys present in the mapping.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    /// The `(tag, value)` pairs of one namespace, in document order. Empty
    /// when the namespace is absent.
    pub fn properties(&self, ns: &str) -> &[(String, XmpValue)] {
        self.namespaces.get(ns).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a single property.
    pub fn get(&self, ns: &str, tag: &str) -> Option<&XmpValue> {
        self.properties(ns)
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, value)| value)
    }

    fn insert(&mut self, ns: String, tag: String, value: XmpValue) {
        let properties = self.namespaces.entry(ns).or_default();
        // A repeated tag replaces the earlier value in place.
        match properties.iter_mut().find(|(name, _)| *name == tag) {
            Some(slot) => slot.1 = value,
            None => properties.push((tag, value)),
        }
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Parse a raw XMP stream into an [`XmpMeta`] mapping.
///
/// The single `rdf:RDF` element is located (as the document root or a direct
/// child of it), and every property element of every `rdf:Description` is
/// converted. A `Description` with no child elements at all yields an empty
/// mapping for the whole document.
pub fn parse_xmp(xmp: &[u8]) -> Result<XmpMeta> {
    let root = read_tree(xmp)?;
    let rdf = find_rdf(&root)
        .ok_or_else(|| MetadataError::XmpSyntax("no rdf:RDF element found".into()))?;

    let mut meta = XmpMeta::default();
    for desc in rdf
        .children
        .iter()
        .filter(|child| child.ns == RDF_NS && child.local == "Description")
    {
        if desc.children.is_empty() {
            debug!("rdf:Description without children, returning empty mapping");
            return Ok(XmpMeta::default());
        }
        for property in &desc.children {
            meta.insert(
                ns_key(&property.ns),
                property.local.clone(),
                property_value(property),
            );
        }
    }

    Ok(meta)
}

/// A minimal element tree, just enough to mirror the RDF constructs XMP
/// uses. Text is the content before the first child element, matching how
/// scalar properties are read.
struct XmlElement {
    /// Resolved namespace URI; empty for unbound names.
    ns: String,
    local: String,
    lang: Option<String>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

fn xml_err(err: impl Display) -> MetadataError {
    MetadataError::XmpSyntax(err.to_string())
}

/// Read the document's root element from raw bytes.
fn read_tree(xmp: &[u8]) -> Result<XmlElement> {
    let mut reader = NsReader::from_reader(xmp);
    reader.config_mut().expand_empty_elements = true;

    let mut stack: Vec<XmlElement> = Vec::new();
    loop {
        match reader.read_resolved_event().map_err(xml_err)? {
            (resolve, Event::Start(start)) => {
                stack.push(element_from_start(resolve, &start)?);
            }
            (_, Event::End(_)) => {
                let completed = stack
                    .pop()
                    .ok_or_else(|| MetadataError::XmpSyntax("unbalanced end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(completed),
                    // Root element closed; trailing xpacket padding is not
                    // read.
                    None => return Ok(completed),
                }
            }
            (_, Event::Text(text)) => {
                if let Some(current) = stack.last_mut() {
                    if current.children.is_empty() {
                        let decoded = text.unescape().map_err(xml_err)?;
                        append_text(&mut current.text, &decoded);
                    }
                }
            }
            (_, Event::CData(cdata)) => {
                if let Some(current) = stack.last_mut() {
                    if current.children.is_empty() {
                        let decoded = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                        append_text(&mut current.text, &decoded);
                    }
                }
            }
            (_, Event::Eof) => {
                return Err(MetadataError::XmpSyntax("no root element found".into()));
            }
            // Declarations, processing instructions (xpacket), comments.
            _ => {}
        }
    }
}

fn element_from_start(resolve: ResolveResult, start: &BytesStart) -> Result<XmlElement> {
    let ns = match resolve {
        ResolveResult::Bound(namespace) => {
            String::from_utf8_lossy(namespace.as_ref()).into_owned()
        }
        _ => String::new(),
    };
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let lang = match start.try_get_attribute("xml:lang").map_err(xml_err)? {
        Some(attr) => Some(attr.unescape_value().map_err(xml_err)?.into_owned()),
        None => None,
    };
    Ok(XmlElement {
        ns,
        local,
        lang,
        text: None,
        children: Vec::new(),
    })
}

fn append_text(slot: &mut Option<String>, chunk: &str) {
    match slot {
        Some(existing) => existing.push_str(chunk),
        None => *slot = Some(chunk.to_string()),
    }
}

fn find_rdf(root: &XmlElement) -> Option<&XmlElement> {
    if root.ns == RDF_NS && root.local == "RDF" {
        return Some(root);
    }
    root.children
        .iter()
        .find(|child| child.ns == RDF_NS && child.local == "RDF")
}

fn find_child<'e>(el: &'e XmlElement, ns: &str, local: &str) -> Option<&'e XmlElement> {
    el.children
        .iter()
        .find(|child| child.ns == ns && child.local == local)
}

fn list_items(container: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    container
        .children
        .iter()
        .filter(|child| child.ns == RDF_NS && child.local == "li")
}

/// Convert one property element to its value form: `Bag`/`Seq` to a list,
/// `Alt` to a language map, anything else to its direct text.
fn property_value(el: &XmlElement) -> XmpValue {
    if let Some(container) = find_child(el, RDF_NS, "Bag").or_else(|| find_child(el, RDF_NS, "Seq"))
    {
        XmpValue::List(list_items(container).map(|li| li.text.clone()).collect())
    } else if let Some(container) = find_child(el, RDF_NS, "Alt") {
        XmpValue::LangAlt(
            list_items(container)
                .map(|li| (li.lang.clone(), li.text.clone()))
                .collect(),
        )
    } else {
        XmpValue::Text(el.text.clone())
    }
}
