//! Parsed document representation.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Page layout of the whole document.
///
/// Decided once per source before segmentation and never changed afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    SingleColumn,
    TwoColumn,
}

impl Layout {
    /// The manifest spelling of this layout.
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::SingleColumn => "single-column",
            Layout::TwoColumn => "two-column",
        }
    }
}

/// Kind of an externally referenced asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Bundle directory that assets of this kind are copied into.
    pub fn bundle_dir(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
        }
    }

    /// Directive name used in the source (`\image`, `\video`).
    pub fn directive(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// A normalized reference to an image or video asset.
///
/// Sizing attributes are kept verbatim (`"50%"`, `"320px"`, `"0.5"`) and are
/// `None` when the source did not mention them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub path: String,
    pub width: Option<String>,
    pub height: Option<String>,
    pub scale: Option<String>,
}

impl MediaRef {
    /// Create a reference with no sizing attributes.
    pub fn new(kind: MediaKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            width: None,
            height: None,
            scale: None,
        }
    }

    /// File name component of the referenced path.
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }

    /// Relative location of the asset inside a bundle, e.g. `images/foo.png`.
    pub fn bundle_path(&self) -> String {
        format!("{}/{}", self.kind.bundle_dir(), self.file_name())
    }
}

/// One unit of the ordered document decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Markup to be typeset into a vector image.
    Text { raw: String },
    /// Body of an animation scene to be rendered into a video.
    Animation { code: String },
    /// Inline image or video reference.
    Media(MediaRef),
    /// Structural page boundary.
    PageBreak,
}

impl Element {
    /// Short name used in logs and `--info` output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Text { .. } => "latex",
            Element::Animation { .. } => "manim",
            Element::Media(media) => media.kind.directive(),
            Element::PageBreak => "pagebreak",
        }
    }
}

/// A parsed source: global layout plus elements in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub layout: Layout,
    pub elements: Vec<Element>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
