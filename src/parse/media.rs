//! Inline media directive resolution.

use regex_lite::Regex;

use crate::model::{MediaKind, MediaRef};

use super::patterns::{HEIGHT_RE, SCALE_RE, WIDTH_RE};

/// Build a [`MediaRef`] from the parts of an `\image`/`\video` directive.
///
/// The path is trimmed. Sizing keys are searched anywhere in `attrs`;
/// unknown keys are ignored and missing keys stay unset.
pub fn resolve_media(kind: MediaKind, attrs: Option<&str>, path: &str) -> MediaRef {
    let mut media = MediaRef::new(kind, path.trim());
    if let Some(attrs) = attrs {
        media.width = first_group(&WIDTH_RE, attrs);
        media.height = first_group(&HEIGHT_RE, attrs);
        media.scale = first_group(&SCALE_RE, attrs);
    }
    media
}

fn first_group(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
