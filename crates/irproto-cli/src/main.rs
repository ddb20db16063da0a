//! irproto - Compile protocol-schema IR documents into proto3 files
//!
//! This tool loads an intermediate representation of namespaces, messages and
//! enums from a JSON document and renders it into deterministic `.proto` files.

use anyhow::{bail, Context, Result};
use clap::Parser;
use irproto_core::ir::Program;
use irproto_core::{CompilerConfig, Proto3Compiler, RenderedUnit};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Compile protocol-schema IR documents into proto3 files
#[derive(Parser, Debug)]
#[command(name = "irproto")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the IR document (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for generated .proto files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Nest files in one directory per package segment
    #[arg(long)]
    package_structured: bool,

    /// Write every namespace into a single dump file
    #[arg(long)]
    dump: bool,

    /// File name of the dump file
    #[arg(long, default_value = irproto_core::proto::DEFAULT_DUMP_FILE)]
    dump_file: String,

    /// Dry run - render everything but don't write files
    #[arg(long)]
    dry_run: bool,

    /// Print a short content digest next to every unit
    #[arg(long)]
    digest: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let program = load_program(&cli.input)?;
    let config = CompilerConfig::new()
        .output_dir(&cli.output)
        .package_structured(cli.package_structured)
        .dump_mode(cli.dump)
        .dump_file_name(&cli.dump_file);
    let compiler = Proto3Compiler::new(&program, config);

    if cli.dry_run {
        let units = compiler
            .render_units()
            .context("Failed to render proto units")?;
        for unit in &units {
            print_unit("Would write", &cli, unit);
        }
        return Ok(());
    }

    let report = compiler
        .compile()
        .with_context(|| format!("Failed to compile into {}", cli.output.display()))?;

    if cli.digest {
        // Digests are taken from the bytes now on disk
        for path in &report.written {
            let target = cli.output.join(path);
            let content = fs::read_to_string(&target)
                .with_context(|| format!("Failed to read back {}", target.display()))?;
            println!("{}  {}", content_hash(&content), path);
        }
    } else {
        for path in &report.written {
            println!("Wrote {}", cli.output.join(path).display());
        }
    }

    info!(
        "Summary: {} units, {} messages, {} enums, {} fields, {} oneofs, {} synthesized zero values",
        report.stats.units,
        report.stats.messages,
        report.stats.enums,
        report.stats.fields,
        report.stats.oneofs,
        report.stats.synthesized_zero_values
    );

    Ok(())
}

/// Read and parse the IR document
fn load_program(path: &Path) -> Result<Program> {
    if !path.is_file() {
        bail!("Input file does not exist: {}", path.display());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let program: Program = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse IR document: {}", path.display()))?;

    debug!(
        "Loaded {} namespace(s) from {}",
        program.namespaces.len(),
        path.display()
    );
    Ok(program)
}

fn print_unit(verb: &str, cli: &Cli, unit: &RenderedUnit) {
    let target = cli.output.join(&unit.path);
    if cli.digest {
        println!("{}  {}", content_hash(&unit.content), unit.path);
    } else {
        println!("{}: {}", verb, target.display());
    }
    if cli.verbose > 0 {
        println!("---");
        println!("{}", unit.content);
        println!("---");
    }
}

/// Compute a short hash of the content (first 8 chars of blake3)
fn content_hash(content: &str) -> String {
    let hash = blake3::hash(content.as_bytes());
    hash.to_hex()[..8].to_string()
}
