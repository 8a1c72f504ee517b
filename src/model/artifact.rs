//! Rendered output records and the bundle manifest.

use serde::{Deserialize, Serialize};

use super::{Layout, MediaKind, MediaRef};

/// Output produced for one element, in the same position as the element.
///
/// `file` paths are relative to the bundle root and always use `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Artifact {
    Latex {
        file: String,
    },
    Image {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<String>,
    },
    Video {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scale: Option<String>,
    },
    PageBreak,
    Error {
        text: String,
    },
}

impl Artifact {
    /// Artifact for a copied media asset, carrying its sizing attributes.
    pub fn media(media: &MediaRef, file: String) -> Self {
        let width = media.width.clone();
        let height = media.height.clone();
        let scale = media.scale.clone();
        match media.kind {
            MediaKind::Image => Artifact::Image {
                file,
                width,
                height,
                scale,
            },
            MediaKind::Video => Artifact::Video {
                file,
                width,
                height,
                scale,
            },
        }
    }

    /// Rendered animation clip.
    pub fn clip(file: String) -> Self {
        Artifact::Video {
            file,
            width: None,
            height: None,
            scale: None,
        }
    }

    /// Bundle-relative file this artifact points at, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            Artifact::Latex { file }
            | Artifact::Image { file, .. }
            | Artifact::Video { file, .. } => Some(file),
            Artifact::PageBreak | Artifact::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Artifact::Error { .. })
    }
}

/// Ordered description of a bundle, stored as `meta.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub layout: Layout,
    pub sequence: Vec<Artifact>,
}

impl Manifest {
    pub fn new(layout: Layout, sequence: Vec<Artifact>) -> Self {
        Self { layout, sequence }
    }

    /// Number of `error` entries in the sequence.
    pub fn error_count(&self) -> usize {
        self.sequence.iter().filter(|a| a.is_error()).count()
    }
}
