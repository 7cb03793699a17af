// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::{self, Display};

use crate::location::Location;

/// Errors raised while compiling a pattern (or a replacement template).
///
/// A pattern that fails to compile never produces a usable `Regex`.
#[derive(Debug, PartialEq, Clone)]
pub enum CompileError {
    /// Unmatched `(`, `)`, `[` or `]`.
    UnbalancedGroup(String, Location),

    /// `{min,max}` with `min > max`, a quantifier applied to nothing,
    /// to another quantifier, or to a zero-width assertion.
    InvalidQuantifierRange(String, Location),

    /// The body of a look-behind has no fixed width.
    VariableWidthLookbehind(Location),

    /// A reference to a group that is never defined (or not yet closed).
    /// The first field is the group index or name as written.
    UndefinedBackreference(String, Location),

    /// The same group name is declared twice.
    DuplicateGroupName(String, Location),

    /// Any other syntax error.
    MessageWithLocation(String, Location),

    /// The pattern ends in the middle of a construct.
    UnexpectedEndOfPattern(String),
}

impl CompileError {
    pub fn get_location(&self) -> Option<&Location> {
        match self {
            CompileError::UnbalancedGroup(_, location)
            | CompileError::InvalidQuantifierRange(_, location)
            | CompileError::VariableWidthLookbehind(location)
            | CompileError::UndefinedBackreference(_, location)
            | CompileError::DuplicateGroupName(_, location)
            | CompileError::MessageWithLocation(_, location) => Some(location),
            CompileError::UnexpectedEndOfPattern(_) => None,
        }
    }

    pub fn get_message(&self) -> String {
        match self {
            CompileError::UnbalancedGroup(message, _) => message.clone(),
            CompileError::InvalidQuantifierRange(message, _) => message.clone(),
            CompileError::VariableWidthLookbehind(_) => {
                "Look-behind requires a fixed-width pattern.".to_owned()
            }
            CompileError::UndefinedBackreference(reference, _) => {
                format!("Reference to undefined group \"{}\".", reference)
            }
            CompileError::DuplicateGroupName(name, _) => {
                format!("Group name \"{}\" is already defined.", name)
            }
            CompileError::MessageWithLocation(message, _) => message.clone(),
            CompileError::UnexpectedEndOfPattern(message) => message.clone(),
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get_location() {
            Some(location) => write!(f, "{} ({})", self.get_message(), location),
            None => write!(f, "Unexpected end of pattern: {}", self.get_message()),
        }
    }
}

impl std::error::Error for CompileError {}

/// Errors raised while running a compiled pattern.
///
/// Not finding a match is not an error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchError {
    /// The backtrack budget or the choice-point stack limit was exhausted,
    /// see `RegexBuilder::backtrack_limit` and `RegexBuilder::max_stack`.
    BacktrackLimitExceeded,
}

impl Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::BacktrackLimitExceeded => {
                f.write_str("Backtracking limit exceeded, the match attempt was aborted.")
            }
        }
    }
}

impl std::error::Error for MatchError {}

/// Either kind of error, for operations that compile something
/// (e.g. a replacement template) and then match.
#[derive(Debug, PartialEq, Clone)]
pub enum RegexError {
    Compile(CompileError),
    Match(MatchError),
}

impl Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexError::Compile(e) => write!(f, "{}", e),
            RegexError::Match(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RegexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegexError::Compile(e) => Some(e),
            RegexError::Match(e) => Some(e),
        }
    }
}

impl From<CompileError> for RegexError {
    fn from(e: CompileError) -> Self {
        RegexError::Compile(e)
    }
}

impl From<MatchError> for RegexError {
    fn from(e: MatchError) -> Self {
        RegexError::Match(e)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::location::Location;

    use super::{CompileError, MatchError, RegexError};

    #[test]
    fn test_display() {
        assert_eq!(
            CompileError::DuplicateGroupName("year".to_owned(), Location::new_range(9, 0, 9, 9))
                .to_string(),
            "Group name \"year\" is already defined. (line 1, column 10 (length 9))"
        );

        assert_eq!(
            CompileError::UnexpectedEndOfPattern("Incomplete charset.".to_owned()).to_string(),
            "Unexpected end of pattern: Incomplete charset."
        );

        let e: RegexError = MatchError::BacktrackLimitExceeded.into();
        assert_eq!(
            e.to_string(),
            "Backtracking limit exceeded, the match attempt was aborted."
        );
    }
}
