//! Source parsing: layout detection and block segmentation.
//!
//! The grammar is deliberately narrow. Only these constructs are recognized;
//! everything else is passed through as LaTeX text:
//!
//! - `\begin{manim} ... \end{manim}` and inline `\manim{...}` animations
//! - `\newpage` / `\breakpage` page breaks
//! - `\image[attrs]{path}` / `\video[attrs]{path}` media references
//! - a two-column marker (`%% twocolumn`, `\twocolumn`,
//!   `\documentclass[twocolumn]`) selecting the global layout
//!
//! # Example
//!
//! ```
//! use pandora::model::{Element, Layout};
//! use pandora::parse::parse_document;
//!
//! let doc = parse_document("%% twocolumn\nHello $x$\n\\newpage\nBye");
//! assert_eq!(doc.layout, Layout::TwoColumn);
//! assert_eq!(doc.elements.len(), 3);
//! assert_eq!(doc.elements[1], Element::PageBreak);
//! ```

mod layout;
mod media;
mod patterns;
mod segment;

pub use layout::detect_layout;
pub use media::resolve_media;
pub use segment::segment;

use crate::model::Document;

/// Parse a whole source into a [`Document`].
///
/// The layout is detected once over the raw text before segmentation.
pub fn parse_document(source: &str) -> Document {
    let layout = detect_layout(source);
    let elements = segment(source);
    Document { layout, elements }
}
