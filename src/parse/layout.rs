//! Global layout detection.

use crate::model::Layout;

use super::patterns::TWO_COLUMN_RE;

/// Detect the page layout of a whole source.
///
/// Runs over the raw text once, before segmentation. Any two-column marker
/// at the start of a line selects [`Layout::TwoColumn`], wherever it sits in
/// the document.
pub fn detect_layout(source: &str) -> Layout {
    if TWO_COLUMN_RE.is_match(source) {
        Layout::TwoColumn
    } else {
        Layout::SingleColumn
    }
}
