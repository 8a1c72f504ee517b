//! Export module for packaging rendered documents.
//!
//! # Architecture
//!
//! [`BundleWriter`] follows the builder pattern used across the crate:
//! - `new()` creates a writer with default configuration
//! - `with_config()` allows customization
//! - `write()` packages to any `Write + Seek` destination
//!
//! The layout inside a bundle is fixed:
//!
//! ```text
//! meta.json              manifest: layout + ordered sequence
//! latex/block_<i>.svg    typeset text blocks
//! videos/scene_<i>.mp4   rendered animations
//! images/<name>          copied images
//! videos/<name>          copied videos
//! ```

mod bundle;

pub use bundle::{BundleConfig, BundleWriter, MANIFEST_NAME, read_manifest};
