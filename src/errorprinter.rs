// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::error::CompileError;

/// Renders a compile error together with the offending line of the
/// pattern source and a caret marker under the reported span, e.g.
///
/// ```text
/// (a|b
/// ^
/// Unclosed group, expect ")". (line 1, column 1)
/// ```
pub fn print_error(source: &str, error: &CompileError) -> String {
    let location = match error.get_location() {
        Some(location) => location,
        None => {
            return format!("{}\n{}", source, error);
        }
    };

    let line_text = source.lines().nth(location.line).unwrap_or("");

    // the span may run past the end of the line (e.g. a multi-line group)
    let line_length = line_text.chars().count();
    let marker_start = location.column.min(line_length);
    let marker_length = location
        .length
        .max(1)
        .min(line_length.saturating_sub(marker_start).max(1));

    let indent: String = line_text
        .chars()
        .take(marker_start)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();

    format!(
        "{}\n{}{}\n{}",
        line_text,
        indent,
        "^".repeat(marker_length),
        error
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{error::CompileError, location::Location};

    use super::print_error;

    #[test]
    fn test_print_error() {
        let error = CompileError::MessageWithLocation(
            "Unsupported escape char 'q'.".to_owned(),
            Location::new_range(2, 0, 2, 2),
        );

        assert_eq!(
            print_error(r#"ab\qc"#, &error),
            "ab\\qc\n  ^^\nUnsupported escape char 'q'. (line 1, column 3 (length 2))"
        );

        // second line of a verbose pattern
        let error = CompileError::DuplicateGroupName(
            "x".to_owned(),
            Location::new_range(9, 1, 2, 7),
        );
        assert_eq!(
            print_error("(?P<x>a)\n  (?P<x>b)", &error),
            "  (?P<x>b)\n  ^^^^^^^\nGroup name \"x\" is already defined. (line 2, column 3 (length 7))"
        );

        let error = CompileError::UnexpectedEndOfPattern("Incomplete charset.".to_owned());
        assert_eq!(
            print_error("[abc", &error),
            "[abc\nUnexpected end of pattern: Incomplete charset."
        );
    }
}
