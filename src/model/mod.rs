//! Core data model for bundle building.
//!
//! This module contains:
//! - The parsed [`Document`] and its ordered [`Element`]s
//! - Media references with optional sizing attributes
//! - Rendered [`Artifact`]s and the [`Manifest`] written into each bundle

mod artifact;
mod element;

pub use artifact::{Artifact, Manifest};
pub use element::{Document, Element, Layout, MediaKind, MediaRef};
