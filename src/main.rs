//! CLI tool for extracting normalized metadata from PDF documents.
//!
//! This binary demonstrates the capabilities of the pdfmetaextract crate:
//! it prints the canonical metadata record as JSON and can optionally
//! render the first page to an image directory.

use pdfmetaextract::{poppler, ExtractorConfig, MetadataExtractor, Result};
use std::path::Path;
use std::{env, fs, process};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let pdf_path = &args[1];
    let images_dir = args.get(2).map(String::as_str);

    match run_extraction(pdf_path, images_dir) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_usage(program_name: &str) {
    println!("📄 pdfmetaextract - PDF Metadata Extraction & Normalization Tool");
    println!();
    println!("USAGE:");
    println!("    {} <pdf_file> [images_dir]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <pdf_file>     Path to the PDF file to read");
    println!("    [images_dir]   If given, render page 1 as a JPEG into this directory");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help     Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("    {} book.pdf", program_name);
    println!("    {} book.pdf ./covers", program_name);
    println!();
    println!("This tool will:");
    println!("  • Read the trailer Info dictionary and normalize its fields");
    println!("  • Parse and normalize embedded XMP/RDF metadata, if present");
    println!("  • Print the unified record as JSON");
}

fn run_extraction(pdf_path: &str, images_dir: Option<&str>) -> Result<()> {
    println!("🔍 Reading PDF: {}", pdf_path);
    println!("{}", "─".repeat(60));

    let extractor = MetadataExtractor::with_config(pdf_path, ExtractorConfig::default())?;
    let record = extractor.metadata()?;

    if record.is_empty() {
        println!("ℹ️  No metadata found in this document");
    } else {
        let json = serde_json::to_string_pretty(&record).unwrap_or_else(|_| format!("{record:?}"));
        println!("{json}");
    }

    if let Some(dir) = images_dir {
        println!("\n🖼️  Rendering page 1 to: {}", dir);
        fs::create_dir_all(dir)?;
        poppler::page_images(Path::new(pdf_path), Path::new(dir), 1, 1)?;
        println!("✅ Wrote {}/page-images-1.jpg", dir);
    }

    Ok(())
}
