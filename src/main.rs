//! pandora - LaTeX + Manim source to pre-rendered bundle

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pandora::export::BundleConfig;
use pandora::render::{LatexConfig, ManimConfig};
use pandora::{Element, PipelineOptions, build_bundle, parse_document};

#[derive(Parser)]
#[command(name = "pandora")]
#[command(version, about = "Pre-render annotated LaTeX into a bundle", long_about = None)]
#[command(after_help = "EXAMPLES:
    pandora lecture.tex -o lecture.pandora    Build a bundle
    pandora -i lecture.tex                    List parsed elements")]
struct Cli {
    /// Input LaTeX source
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output bundle
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "info")]
    output: Option<PathBuf>,

    /// Show parsed elements without rendering
    #[arg(short, long)]
    info: bool,

    /// Directory relative media paths are resolved against
    #[arg(long, value_name = "DIR", default_value = ".")]
    assets: PathBuf,

    /// LaTeX compiler producing DVI
    #[arg(long, value_name = "PROGRAM", default_value = "latex")]
    latex: String,

    /// DVI to SVG converter
    #[arg(long, value_name = "PROGRAM", default_value = "dvisvgm")]
    dvisvgm: String,

    /// Manim executable
    #[arg(long, value_name = "PROGRAM", default_value = "manim")]
    manim: String,

    /// Deflate level for the bundle (0-9)
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u32).range(0..=9))]
    compression_level: Option<u32>,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug output, including external tool invocations
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    match (cli.info, cli.output.as_deref()) {
        (true, _) => show_info(&cli.input),
        (false, Some(output)) => build(cli, output),
        (false, None) => Err("no output bundle given (use -o/--output)".to_string()),
    }
}

fn build(cli: &Cli, output: &Path) -> Result<(), String> {
    let options = PipelineOptions {
        latex: LatexConfig {
            latex_program: cli.latex.clone(),
            dvisvgm_program: cli.dvisvgm.clone(),
            ..LatexConfig::default()
        },
        manim: ManimConfig {
            program: cli.manim.clone(),
            ..ManimConfig::default()
        },
        bundle: BundleConfig {
            compression_level: cli.compression_level,
        },
        asset_root: cli.assets.clone(),
    };

    build_bundle(&cli.input, output, &options).map_err(|e| e.to_string())?;
    Ok(())
}

fn show_info(path: &Path) -> Result<(), String> {
    let source = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let doc = parse_document(&source);

    println!("File: {}", path.display());
    println!("Layout: {}", doc.layout.as_str());
    println!("Elements: {}", doc.len());
    for (i, element) in doc.elements.iter().enumerate() {
        println!("  [{i}] {:<9} {}", element.kind_name(), summary(element));
    }

    Ok(())
}

/// One-line preview of an element.
fn summary(element: &Element) -> String {
    let text = match element {
        Element::Text { raw } => raw.as_str(),
        Element::Animation { code } => code.as_str(),
        Element::Media(media) => media.path.as_str(),
        Element::PageBreak => "",
    };
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > 60 {
        let cut: String = line.chars().take(60).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
