// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::location::Location;

#[derive(Debug, PartialEq, Clone)]
pub struct CharWithPosition {
    pub character: char,
    pub position: Location,
}

impl CharWithPosition {
    pub fn new(character: char, position: Location) -> Self {
        Self {
            character,
            position,
        }
    }
}

/// Decorates the chars of a pattern source with their positions.
pub struct CharsWithPositionIter<'a> {
    upstream: &'a mut dyn Iterator<Item = char>,
    current_position: Location,
}

impl<'a> CharsWithPositionIter<'a> {
    pub fn new(upstream: &'a mut dyn Iterator<Item = char>) -> Self {
        Self {
            upstream,
            current_position: Location::new_position(0, 0, 0),
        }
    }
}

impl Iterator for CharsWithPositionIter<'_> {
    type Item = CharWithPosition;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.upstream.next()?;
        let last_position = self.current_position;

        self.current_position.index += 1;

        if c == '\n' {
            self.current_position.line += 1;
            self.current_position.column = 0;
        } else {
            self.current_position.column += 1;
        }

        Some(CharWithPosition::new(c, last_position))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        charwithposition::{CharWithPosition, CharsWithPositionIter},
        location::Location,
    };

    #[test]
    fn test_chars_with_position_iter() {
        // a verbose pattern spanning lines
        let mut chars = "a+\n#x\n[b]".chars();
        let iter = CharsWithPositionIter::new(&mut chars);
        let items: Vec<CharWithPosition> = iter.collect();

        assert_eq!(
            items,
            vec![
                CharWithPosition::new('a', Location::new_position(0, 0, 0)),
                CharWithPosition::new('+', Location::new_position(1, 0, 1)),
                CharWithPosition::new('\n', Location::new_position(2, 0, 2)),
                CharWithPosition::new('#', Location::new_position(3, 1, 0)),
                CharWithPosition::new('x', Location::new_position(4, 1, 1)),
                CharWithPosition::new('\n', Location::new_position(5, 1, 2)),
                CharWithPosition::new('[', Location::new_position(6, 2, 0)),
                CharWithPosition::new('b', Location::new_position(7, 2, 1)),
                CharWithPosition::new(']', Location::new_position(8, 2, 2)),
            ]
        );
    }
}
