//! End-to-end bundle building.
//!
//! source → [`parse_document`] → [`Dispatcher`] → [`BundleWriter`]
//!
//! All artifacts are staged in a temporary directory that is removed once
//! the archive is written, whether or not writing succeeded.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::export::{BundleConfig, BundleWriter};
use crate::model::{Document, Manifest};
use crate::parse::parse_document;
use crate::render::{
    Converter, Dispatcher, LatexConfig, LatexConverter, ManimConfig, ManimConverter,
};

/// Settings for a full build.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub latex: LatexConfig,
    pub manim: ManimConfig,
    pub bundle: BundleConfig,
    /// Directory relative media paths are resolved against.
    pub asset_root: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            latex: LatexConfig::default(),
            manim: ManimConfig::default(),
            bundle: BundleConfig::default(),
            asset_root: PathBuf::from("."),
        }
    }
}

/// Build a bundle from the source file at `input`, using the LaTeX and
/// Manim toolchains on `PATH`.
pub fn build_bundle(input: &Path, output: &Path, options: &PipelineOptions) -> Result<Manifest> {
    let source = fs::read_to_string(input)?;
    let typesetter = LatexConverter::new().with_config(options.latex.clone());
    let animator = ManimConverter::new().with_config(options.manim.clone());
    build_bundle_with(&source, output, &typesetter, &animator, options)
}

/// Build a bundle from `source` with caller-supplied converters.
pub fn build_bundle_with(
    source: &str,
    output: &Path,
    typesetter: &dyn Converter,
    animator: &dyn Converter,
    options: &PipelineOptions,
) -> Result<Manifest> {
    let document = parse_document(source);
    info!("Found {} document elements", document.len());

    let manifest = render_document(&document, output, typesetter, animator, options)?;

    let errors = manifest.error_count();
    if errors > 0 {
        warn!("{errors} of {} elements failed to render", manifest.sequence.len());
    }
    info!(
        "Built {} elements -> {}",
        manifest.sequence.len(),
        output.display()
    );
    Ok(manifest)
}

fn render_document(
    document: &Document,
    output: &Path,
    typesetter: &dyn Converter,
    animator: &dyn Converter,
    options: &PipelineOptions,
) -> Result<Manifest> {
    let staging = tempfile::Builder::new().prefix("pandora-").tempdir()?;

    let sequence = Dispatcher::new(typesetter, animator, staging.path())
        .with_asset_root(&options.asset_root)
        .dispatch(&document.elements);
    let manifest = Manifest::new(document.layout, sequence);

    let mut writer = BufWriter::new(File::create(output)?);
    BundleWriter::new()
        .with_config(options.bundle.clone())
        .write(&manifest, staging.path(), &mut writer)?;
    writer.flush()?;

    staging.close()?;
    Ok(manifest)
}
