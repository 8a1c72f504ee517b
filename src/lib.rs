//! # pandora
//!
//! Turns an annotated LaTeX source into a bundle of pre-rendered elements:
//! SVGs of typeset text and math, Manim animation clips, and copied images
//! and videos, plus a `meta.json` manifest giving their order and the page
//! layout.
//!
//! ## Source annotations
//!
//! - `\begin{manim} ... \end{manim}` or `\manim{...}`: a Manim scene body
//! - `\image[width=50%]{path}` / `\video[scale=0.5]{path}`: media references
//! - `\newpage` / `\breakpage`: page breaks
//! - `%% twocolumn`, `\twocolumn` or `\documentclass[twocolumn]`: two-column
//!   layout for the whole document
//!
//! Everything else is LaTeX, typeset block by block.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pandora::{PipelineOptions, build_bundle};
//! use std::path::Path;
//!
//! let manifest = build_bundle(
//!     Path::new("lecture.tex"),
//!     Path::new("lecture.pandora"),
//!     &PipelineOptions::default(),
//! )?;
//! println!("{} elements", manifest.sequence.len());
//! # Ok::<(), pandora::Error>(())
//! ```
//!
//! ## Parsing only
//!
//! ```
//! use pandora::model::Element;
//! use pandora::parse_document;
//!
//! let doc = parse_document("Intro\n\\begin{manim}\nself.wait()\n\\end{manim}\nOutro");
//! assert_eq!(doc.elements.len(), 3);
//! assert!(matches!(doc.elements[1], Element::Animation { .. }));
//! ```

pub mod error;
pub mod export;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod render;

pub use error::{Error, Result};
pub use model::{Artifact, Document, Element, Layout, Manifest, MediaKind, MediaRef};
pub use parse::parse_document;
pub use pipeline::{PipelineOptions, build_bundle, build_bundle_with};
pub use render::{ConvertError, ConvertRequest, Converter};
