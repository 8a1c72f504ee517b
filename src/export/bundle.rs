//! Bundle archive writer and reader.
//!
//! A bundle is a ZIP file holding `meta.json` plus every artifact file the
//! manifest points at, under the same relative paths.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::model::Manifest;

/// Name of the manifest entry at the bundle root.
pub const MANIFEST_NAME: &str = "meta.json";

/// Configuration for bundle writing.
#[derive(Debug, Clone, Default)]
pub struct BundleConfig {
    /// Compression level for deflate (0-9, default 6). Level 0 stores
    /// entries uncompressed.
    pub compression_level: Option<u32>,
}

/// Packages a manifest and its staged artifacts into one archive.
///
/// # Example
///
/// ```no_run
/// use pandora::export::BundleWriter;
/// use pandora::model::{Layout, Manifest};
/// use std::fs::File;
/// use std::path::Path;
///
/// let manifest = Manifest::new(Layout::SingleColumn, Vec::new());
/// let mut file = File::create("deck.pandora")?;
/// BundleWriter::new().write(&manifest, Path::new("staging"), &mut file)?;
/// # Ok::<(), pandora::Error>(())
/// ```
pub struct BundleWriter {
    config: BundleConfig,
}

impl BundleWriter {
    /// Create a new writer with default configuration.
    pub fn new() -> Self {
        Self {
            config: BundleConfig::default(),
        }
    }

    /// Configure the writer with custom settings.
    pub fn with_config(mut self, config: BundleConfig) -> Self {
        self.config = config;
        self
    }

    /// Write `manifest` into `staging` and archive it with its artifacts.
    ///
    /// Artifact files are read from `staging` at their manifest paths. Files
    /// that were never produced (missing media) are skipped, and a path
    /// referenced twice is stored once.
    pub fn write<W: Write + Seek>(
        &self,
        manifest: &Manifest,
        staging: &Path,
        writer: &mut W,
    ) -> Result<()> {
        let json = serde_json::to_vec_pretty(manifest)?;
        fs::write(staging.join(MANIFEST_NAME), &json)?;

        let mut zip = ZipWriter::new(writer);
        let compression_level = self.config.compression_level.unwrap_or(6).min(9);
        let deflated = if compression_level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(compression_level as i64))
        };

        // 1. Manifest first so readers can find it without a directory scan
        zip.start_file(MANIFEST_NAME, deflated)?;
        zip.write_all(&json)?;

        // 2. Artifacts in sequence order
        let mut written = HashSet::new();
        for file in manifest.sequence.iter().filter_map(|a| a.file()) {
            if !written.insert(file) {
                continue;
            }
            let path = staging.join(file);
            if !path.is_file() {
                debug!(file, "artifact not staged, skipping");
                continue;
            }
            zip.start_file(file, deflated)?;
            let mut source = File::open(&path)?;
            io::copy(&mut source, &mut zip)?;
        }

        zip.finish()?;
        Ok(())
    }
}

impl Default for BundleWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the manifest back out of a bundle.
pub fn read_manifest<R: Read + Seek>(reader: R) -> Result<Manifest> {
    let mut archive = ZipArchive::new(reader)?;
    let entry = match archive.by_name(MANIFEST_NAME) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(Error::InvalidBundle(format!("missing {MANIFEST_NAME}")));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_reader(entry)?)
}
