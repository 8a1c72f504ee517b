//! Block segmentation of a source into ordered elements.
//!
//! Segmentation runs in two passes:
//!
//! 1. `\begin{manim} ... \end{manim}` regions are cut out first. The text
//!    between them becomes text blocks; animation code is never touched by
//!    later passes.
//! 2. Each text block is expanded: inline `\manim{..}` directives are pulled
//!    out, the rest is split on `\newpage`/`\breakpage`, and every page
//!    segment yields its `\image`/`\video` references followed by whatever
//!    text is left.
//!
//! Directives that do not match (unterminated braces, a `\begin{manim}`
//! without its `\end{manim}`) are left in place as literal text.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::model::{Element, MediaKind};

use super::media::resolve_media;
use super::patterns::{INLINE_MANIM_RE, MANIM_BLOCK_RE, MEDIA_RE, PAGE_BREAK_RE};

/// Result of the first pass.
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    Text(&'a str),
    Animation(&'a str),
}

/// An inline animation removed from a text block, with the byte offset in
/// the stripped text where it used to be.
type InlineAnimation = (usize, String);

/// Split `source` into elements in document order.
pub fn segment(source: &str) -> Vec<Element> {
    let mut elements = Vec::new();
    for block in split_blocks(source) {
        match block {
            Block::Animation(code) => elements.push(Element::Animation {
                code: code.to_string(),
            }),
            Block::Text(text) => expand_text(text, &mut elements),
        }
    }
    elements
}

fn split_blocks(source: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    for caps in MANIM_BLOCK_RE.captures_iter(source) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let before = source[pos..whole.start()].trim();
        if !before.is_empty() {
            blocks.push(Block::Text(before));
        }
        blocks.push(Block::Animation(code.as_str().trim()));
        pos = whole.end();
    }

    let after = source[pos..].trim();
    if !after.is_empty() {
        blocks.push(Block::Text(after));
    }
    blocks
}

fn expand_text(text: &str, out: &mut Vec<Element>) {
    let (stripped, inline) = strip_inline_animations(text);
    let mut pending = inline.into_iter().peekable();

    let mut start = 0;
    for brk in PAGE_BREAK_RE.find_iter(&stripped) {
        emit_page(&stripped[start..brk.start()], brk.start(), &mut pending, out);
        out.push(Element::PageBreak);
        start = brk.end();
    }
    emit_page(&stripped[start..], usize::MAX, &mut pending, out);
}

fn strip_inline_animations(text: &str) -> (String, Vec<InlineAnimation>) {
    let mut stripped = String::with_capacity(text.len());
    let mut inline = Vec::new();
    let mut last = 0;

    for caps in INLINE_MANIM_RE.captures_iter(text) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        stripped.push_str(&text[last..whole.start()]);
        inline.push((stripped.len(), code.as_str().trim().to_string()));
        last = whole.end();
    }
    stripped.push_str(&text[last..]);

    (stripped, inline)
}

/// Emit one page segment: the inline animations that occurred in it, then
/// its media references, then its remaining text.
fn emit_page(
    segment: &str,
    end: usize,
    pending: &mut Peekable<IntoIter<InlineAnimation>>,
    out: &mut Vec<Element>,
) {
    while let Some((_, code)) = pending.next_if(|(offset, _)| *offset <= end) {
        out.push(Element::Animation { code });
    }

    if segment.trim().is_empty() {
        return;
    }

    let mut leftover = String::with_capacity(segment.len());
    let mut last = 0;

    for caps in MEDIA_RE.captures_iter(segment) {
        let (Some(whole), Some(kind), Some(path)) = (caps.get(0), caps.get(1), caps.get(3)) else {
            continue;
        };
        let kind = match kind.as_str() {
            "image" => MediaKind::Image,
            _ => MediaKind::Video,
        };
        let media = resolve_media(kind, caps.get(2).map(|m| m.as_str()), path.as_str());
        if media.path.is_empty() {
            // Blank path: leave the directive as text.
            continue;
        }
        leftover.push_str(&segment[last..whole.start()]);
        out.push(Element::Media(media));
        last = whole.end();
    }
    leftover.push_str(&segment[last..]);

    let leftover = leftover.trim();
    if !leftover.is_empty() {
        out.push(Element::Text {
            raw: leftover.to_string(),
        });
    }
}
