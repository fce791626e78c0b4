//! codex - datasheet extraction from catalogue data

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use codex::catalogue::{CatalogueIndex, SourcePriority, catalogue_imports};
use codex::extract::{DEFAULT_MAX_DEPTH, UnitExtractor};
use codex::markup::Document;
use codex::system::SchemaRegistry;

#[derive(Parser)]
#[command(name = "codex")]
#[command(version, about = "Extract unit datasheets from catalogue data", long_about = None)]
#[command(after_help = "EXAMPLES:
    codex --system wh40k.gst --catalogue chaos_marines.cat --unit \"Abaddon the Despoiler\"
    codex --system wh40k.gst --catalogue chaos_marines.cat --library heretics.cat --unit Legionaries")]
struct Cli {
    /// Game system file defining profile and cost types
    #[arg(long, value_name = "FILE")]
    system: PathBuf,

    /// Primary catalogue file
    #[arg(long, value_name = "FILE")]
    catalogue: PathBuf,

    /// Library catalogue imported by the primary one (repeatable)
    #[arg(long = "library", value_name = "FILE")]
    libraries: Vec<PathBuf>,

    /// Unit name to extract (exact match)
    #[arg(long)]
    unit: String,

    /// Indentation width for JSON output
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Maximum entry nesting depth
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, String> {
    let system_doc = parse_file(&cli.system)?;
    let mut registry = SchemaRegistry::new();
    registry.load_system(&system_doc);

    let catalogue_doc = parse_file(&cli.catalogue)?;
    if cli.libraries.is_empty() {
        for import in catalogue_imports(&catalogue_doc) {
            eprintln!(
                "note: catalogue imports '{}'; pass --library if links fail to resolve",
                import.name
            );
        }
    }

    let mut index = CatalogueIndex::new();
    index.load_catalogue(catalogue_doc, SourcePriority::Primary);
    for path in &cli.libraries {
        index.load_catalogue(parse_file(path)?, SourcePriority::Library);
    }

    let extraction = UnitExtractor::new(&index, &registry)
        .with_max_depth(cli.max_depth)
        .extract(&cli.unit)
        .map_err(|e| e.to_string())?;

    if cli.indent == 0 {
        return serde_json::to_string(&extraction).map_err(|e| e.to_string());
    }
    let indent = " ".repeat(cli.indent);
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    extraction.serialize(&mut ser).map_err(|e| e.to_string())?;
    String::from_utf8(buf).map_err(|e| e.to_string())
}

fn parse_file(path: &Path) -> Result<Document, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    Document::parse(&text).map_err(|e| format!("{}: {e}", path.display()))
}
