//! Blocking subprocess glue around Poppler's `pdfinfo` and `pdftoppm`.
//!
//! The working directory for every invocation is an explicit argument passed
//! to the child process; nothing process-wide is changed, so concurrent
//! extractions in one process do not interfere with each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::bytes::Regex as BytesRegex;
use tracing::warn;

use crate::{MetadataError, Result};

/// Directories probed, in order, when locating an external tool.
const TOOL_DIRS: &[&str] = &["/usr/bin", "/usr/local/bin", "/usr"];

/// `pdfinfo -meta` appends the XMP section after a `Metadata:` marker line.
static METADATA_MARKER: Lazy<BytesRegex> =
    Lazy::new(|| BytesRegex::new(r"(?m)^Metadata:").expect("valid marker pattern"));

/// Parsed output of a `pdfinfo -meta` run.
#[derive(Debug, Clone, Default)]
pub struct InfoToolOutput {
    /// `Field: value` pairs from the line-oriented section.
    pub fields: HashMap<String, String>,
    /// The raw XMP section, when the document carries one. Kept as bytes:
    /// the XMP stream's encoding need not match the rest of the output.
    pub xmp_metadata: Option<Vec<u8>>,
}

/// Locate a tool binary in the well-known directories.
pub fn find_tool(name: &str) -> Result<PathBuf> {
    for dir in TOOL_DIRS {
        let candidate = Path::new(dir).join(name);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(MetadataError::ToolNotFound(name.to_string()))
}

/// Run `pdfinfo -meta` on `pdf_path` and parse its output.
///
/// A non-zero exit or non-UTF-8 line output yields `Ok(None)` — "no
/// metadata available" — rather than an error; the caller is not expected
/// to treat that as an extraction bug. With `get_cover` set, the first page
/// is also rendered to `cover.jpg` inside `workdir`; a failure there is
/// logged and otherwise ignored.
pub fn read_info(pdf_path: &Path, workdir: &Path, get_cover: bool) -> Result<Option<InfoToolOutput>> {
    let pdfinfo = find_tool("pdfinfo")?;
    let output = Command::new(&pdfinfo)
        .args(["-meta", "-enc", "UTF-8"])
        .arg(pdf_path)
        .current_dir(workdir)
        .output()?;

    if !output.status.success() {
        warn!(status = %output.status, "pdfinfo errored out");
        return Ok(None);
    }

    // The XMP section could be in an encoding other than UTF-8, so carve it
    // out before decoding the rest.
    let mut raw = output.stdout.as_slice();
    let mut parsed = InfoToolOutput::default();
    if let Some(marker) = METADATA_MARKER.find(raw) {
        parsed.xmp_metadata = Some(raw[marker.end()..].to_vec());
        raw = &raw[..marker.start()];
    }

    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(_) => {
            warn!("pdfinfo returned no UTF-8 data");
            return Ok(None);
        }
    };

    for line in text.lines() {
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let field = field.trim();
        let value = value.trim();
        if !field.is_empty() && !value.is_empty() {
            parsed.fields.insert(field.to_string(), value.to_string());
        }
    }

    if get_cover {
        render_cover(pdf_path, workdir)?;
    }

    Ok(Some(parsed))
}

fn render_cover(pdf_path: &Path, workdir: &Path) -> Result<()> {
    let pdftoppm = find_tool("pdftoppm")?;
    let status = Command::new(&pdftoppm)
        .args(["-singlefile", "-jpeg", "-cropbox"])
        .arg(pdf_path)
        .arg("cover")
        .current_dir(workdir)
        .status()?;
    if !status.success() {
        warn!(status = %status, "pdftoppm errored out while rendering the cover");
    }
    Ok(())
}

/// Render pages `first..=last` of `pdf_path` as JPEG images named
/// `page-images-<n>.jpg` inside `output_dir`.
///
/// A non-zero exit from the renderer is an error; nothing is retried.
pub fn page_images(pdf_path: &Path, output_dir: &Path, first: u32, last: u32) -> Result<()> {
    let pdftoppm = find_tool("pdftoppm")?;
    let status = Command::new(&pdftoppm)
        .args(["-cropbox", "-jpeg", "-f"])
        .arg(first.to_string())
        .arg("-l")
        .arg(last.to_string())
        .arg(pdf_path)
        .arg(output_dir.join("page-images"))
        .status()?;
    if !status.success() {
        return Err(MetadataError::RenderFailed(status.to_string()));
    }
    Ok(())
}
