//! Cached regex patterns for source segmentation.
//!
//! Uses LazyLock to compile patterns once on first use.

use regex_lite::Regex;
use std::sync::LazyLock;

// === Layout ===

/// Matches a two-column marker at the start of a line:
/// `%% twocolumn`, `\twocolumn`, or a `\documentclass[...]` option list
/// containing `twocolumn`.
pub static TWO_COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:%+[ \t]*twocolumn|\\twocolumn\b|\\document(?:class)?[ \t]*\[[^\]\n]*\btwocolumn\b[^\]\n]*\])",
    )
    .unwrap()
});

// === Blocks ===

/// Matches `\begin{manim} ... \end{manim}` regions, across lines.
pub static MANIM_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\\begin\{manim\}(.*?)\\end\{manim\}").unwrap()
});

/// Matches single-argument `\manim{...}` directives. An argument holding
/// any brace does not match.
pub static INLINE_MANIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\manim\{([^{}]*)\}").unwrap()
});

/// Matches `\newpage` and `\breakpage` as whole commands.
pub static PAGE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:newpage|breakpage)\b").unwrap()
});

/// Matches `\image[attrs]{path}` and `\video[attrs]{path}`.
///
/// Groups: 1 = kind, 2 = attribute list (optional), 3 = path.
pub static MEDIA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(image|video)(?:\[([^\]]*)\])?\{([^}]+)\}").unwrap()
});

// === Media attributes ===

/// Matches `width=<n>%` or `width=<n>px`.
pub static WIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"width\s*=\s*([0-9]+(?:\.[0-9]+)?(?:%|px))").unwrap()
});

/// Matches `height=<n>%` or `height=<n>px`.
pub static HEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"height\s*=\s*([0-9]+(?:\.[0-9]+)?(?:%|px))").unwrap()
});

/// Matches `scale=<decimal>`.
pub static SCALE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"scale\s*=\s*([0-9.]+)").unwrap()
});
