// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

/// A position or a span inside the pattern source.
///
/// `index` counts chars (not bytes), `line` and `column` are 0-based.
/// Patterns are usually a single line, but verbose patterns often span
/// several, so the line is tracked as well.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Location {
    pub index: usize,
    pub line: usize,
    pub column: usize,
    pub length: usize, // 0 for a single position
}

impl Location {
    pub fn new_position(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
            length: 0,
        }
    }

    pub fn new_range(index: usize, line: usize, column: usize, length: usize) -> Self {
        Self {
            index,
            line,
            column,
            length,
        }
    }

    pub fn from_position_and_length(position: &Location, length: usize) -> Self {
        Self::new_range(position.index, position.line, position.column, length)
    }

    /// Span from `position_start` up to and including `position_end_included`.
    pub fn from_position_pair_with_end_included(
        position_start: &Location,
        position_end_included: &Location,
    ) -> Self {
        Self::new_range(
            position_start.index,
            position_start.line,
            position_start.column,
            position_end_included.index - position_start.index + 1,
        )
    }

    /// Span covering both ranges, assuming `range_start` comes first.
    pub fn from_range_pair(range_start: &Location, range_end: &Location) -> Self {
        Self::new_range(
            range_start.index,
            range_start.line,
            range_start.column,
            range_end.index + range_end.length - range_start.index,
        )
    }

    pub fn get_position_by_range_start(&self) -> Self {
        Self::new_position(self.index, self.line, self.column)
    }

    pub fn move_position_forward(&self) -> Self {
        Self {
            index: self.index + 1,
            column: self.column + 1,
            length: 0,
            ..*self
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.length > 1 {
            write!(
                f,
                "line {}, column {} (length {})",
                self.line + 1,
                self.column + 1,
                self.length
            )
        } else {
            write!(f, "line {}, column {}", self.line + 1, self.column + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Location;

    #[test]
    fn test_location_ranges() {
        let start = Location::new_position(3, 0, 3);
        let end = Location::new_position(7, 0, 7);

        assert_eq!(
            Location::from_position_pair_with_end_included(&start, &end),
            Location::new_range(3, 0, 3, 5)
        );

        let first = Location::new_range(2, 0, 2, 2);
        let second = Location::new_range(6, 0, 6, 3);
        assert_eq!(
            Location::from_range_pair(&first, &second),
            Location::new_range(2, 0, 2, 7)
        );

        assert_eq!(
            Location::new_range(4, 1, 2, 6).get_position_by_range_start(),
            Location::new_position(4, 1, 2)
        );

        assert_eq!(
            start.move_position_forward(),
            Location::new_position(4, 0, 4)
        );
    }

    #[test]
    fn test_location_display() {
        assert_eq!(
            Location::new_position(0, 0, 0).to_string(),
            "line 1, column 1"
        );
        assert_eq!(
            Location::new_range(5, 2, 1, 3).to_string(),
            "line 3, column 2 (length 3)"
        );
    }
}
