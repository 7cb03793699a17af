// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

/// Compile-time options.
///
/// - `ignore_case` (`i`): case-insensitive matching.
/// - `multiline` (`m`): `^` and `$` also match at line boundaries.
/// - `dot_all` (`s`): `.` also matches `\n`.
/// - `verbose` (`x`): whitespace and `#` comments in the pattern are ignored,
///   except when escaped or inside a character class.
///
/// The first three can also be switched on and off for a sub-expression
/// with inline flag groups such as `(?i:...)` and `(?-s:...)`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Flags {
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
    pub verbose: bool,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag named by the letter, returns false for unknown letters.
    pub fn set_by_letter(&mut self, letter: char, value: bool) -> bool {
        match letter {
            'i' => self.ignore_case = value,
            'm' => self.multiline = value,
            's' => self.dot_all = value,
            'x' => self.verbose = value,
            _ => return false,
        }
        true
    }
}

impl Display for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut letters = String::new();
        if self.ignore_case {
            letters.push('i');
        }
        if self.multiline {
            letters.push('m');
        }
        if self.dot_all {
            letters.push('s');
        }
        if self.verbose {
            letters.push('x');
        }
        f.write_str(&letters)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Flags;

    #[test]
    fn test_set_by_letter() {
        let mut flags = Flags::new();
        assert!(flags.set_by_letter('i', true));
        assert!(flags.set_by_letter('s', true));
        assert!(!flags.set_by_letter('u', true));

        assert_eq!(
            flags,
            Flags {
                ignore_case: true,
                multiline: false,
                dot_all: true,
                verbose: false,
            }
        );
        assert_eq!(flags.to_string(), "is");

        flags.set_by_letter('i', false);
        assert_eq!(flags.to_string(), "s");
    }
}
