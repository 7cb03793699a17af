// Copyright (c) 2024 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

// Positions are byte offsets into the text and always lie
// on char boundaries.

/// Reads the char starting at `position`.
///
/// Returns the char and its length in bytes, or `None`
/// at the end of the text.
pub fn read_char(text: &str, position: usize) -> Option<(char, usize)> {
    text.get(position..)?
        .chars()
        .next()
        .map(|c| (c, c.len_utf8()))
}

/// Reads the char that ends at `position`.
///
/// Returns the char and its length in bytes, or `None`
/// at the start of the text.
pub fn read_previous_char(text: &str, position: usize) -> Option<(char, usize)> {
    text.get(..position)?
        .chars()
        .next_back()
        .map(|c| (c, c.len_utf8()))
}

/// Moves `chars` chars backward from `position`, returns `None`
/// if the start of the text is passed.
pub fn get_position_by_chars_backward(
    text: &str,
    mut position: usize,
    chars: usize,
) -> Option<usize> {
    for _ in 0..chars {
        let (_, length) = read_previous_char(text, position)?;
        position -= length;
    }
    Some(position)
}

/// The position after the char at `position`, `None` at the end of the text.
pub fn next_char_position(text: &str, position: usize) -> Option<usize> {
    read_char(text, position).map(|(_, length)| position + length)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{get_position_by_chars_backward, read_char, read_previous_char};

    #[test]
    fn test_read_char() {
        let text = "a文😊";
        assert_eq!(read_char(text, 0), Some(('a', 1)));
        assert_eq!(read_char(text, 1), Some(('文', 3)));
        assert_eq!(read_char(text, 4), Some(('😊', 4)));
        assert_eq!(read_char(text, 8), None);

        // not a char boundary
        assert_eq!(read_char(text, 2), None);
    }

    #[test]
    fn test_read_previous_char() {
        let text = "a文😊";
        assert_eq!(read_previous_char(text, 0), None);
        assert_eq!(read_previous_char(text, 1), Some(('a', 1)));
        assert_eq!(read_previous_char(text, 4), Some(('文', 3)));
        assert_eq!(read_previous_char(text, 8), Some(('😊', 4)));
    }

    #[test]
    fn test_get_position_by_chars_backward() {
        let text = "a文😊";
        assert_eq!(get_position_by_chars_backward(text, 8, 0), Some(8));
        assert_eq!(get_position_by_chars_backward(text, 8, 2), Some(1));
        assert_eq!(get_position_by_chars_backward(text, 8, 3), Some(0));
        assert_eq!(get_position_by_chars_backward(text, 8, 4), None);
    }
}
