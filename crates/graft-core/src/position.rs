//! Shared position conversion helpers.
//!
//! Tree-sitter positions are zero-based. For user-facing messages, we prefer
//! one-based line and column numbers.

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// Computes the one-based line and column of a byte offset in `text`.
#[must_use]
pub fn offset_to_one_based(text: &str, offset: usize) -> (u32, u32) {
    let before = text.get(..offset).unwrap_or(text);
    let row = before.matches('\n').count();
    let column = before.rfind('\n').map_or(before.len(), |nl| {
        before.len().saturating_sub(nl.saturating_add(1))
    });
    point_to_one_based(tree_sitter::Point { row, column })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", 0, (1, 1))]
    #[case("abc", 2, (1, 3))]
    #[case("a\nbc", 3, (2, 2))]
    #[case("a\n\n", 3, (3, 1))]
    fn converts_offsets(#[case] text: &str, #[case] offset: usize, #[case] expected: (u32, u32)) {
        assert_eq!(offset_to_one_based(text, offset), expected);
    }
}
