// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::{flags::Flags, location::Location};

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    CharSetStart,         // [
    CharSetStartNegative, // [^
    CharSetEnd,           // ]

    ZeroOrMore,     // *
    ZeroOrMoreLazy, // *?
    OneOrMore,      // +
    OneOrMoreLazy,  // +?
    Optional,       // ?
    OptionalLazy,   // ??

    // {m}, {m,}, {,n}, {m,n}, followed by an optional `?` for lazy
    Repetition(Repetition, /* lazy */ bool),

    LogicOr,             // |
    StartAssertion,      // ^
    EndAssertion,        // $
    InputStartAssertion, // \A
    InputEndAssertion,   // \Z and \z
    Dot,                 // .

    Char(char),
    CharRange(char, char), // only inside a charset, e.g. `a-z`
    PresetCharSet(char),   // \w, \W, \d, \D, \s, \S
    BoundaryAssertion(char),

    GroupStart,                 // (
    NonCapturing,               // (?:
    NamedCapture(String),       // (?<name> and (?P<name>
    LookAhead,                  // (?=
    LookAheadNegative,          // (?!
    LookBehind,                 // (?<=
    LookBehindNegative,         // (?<!
    FlagGroup(FlagsModifier),   // (?i-s:
    InlineFlags(FlagsModifier), // (?i-s)
    GroupEnd,                   // )

    BackReferenceNumber(usize),      // \number
    BackReferenceIdentifier(String), // \k<name> and (?P=name)

    // `(?#...)` anywhere, and `# ...` in verbose mode
    Comment(String),

    // verbose mode only
    Whitespace,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Repetition {
    Specified(usize),
    AtLeast(usize),
    Range(usize, usize),
}

/// The letters switched on and off by an inline flag group,
/// e.g. `(?i-s:...)` is `set: ['i'], clear: ['s']`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct FlagsModifier {
    pub set: Vec<char>,
    pub clear: Vec<char>,
}

impl FlagsModifier {
    pub fn apply(&self, flags: &Flags) -> Flags {
        let mut result = *flags;
        for letter in &self.set {
            result.set_by_letter(*letter, true);
        }
        for letter in &self.clear {
            result.set_by_letter(*letter, false);
        }
        result
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct TokenWithRange {
    pub token: Token,
    pub range: Location,
}

impl TokenWithRange {
    pub fn new(token: Token, range: Location) -> Self {
        Self { token, range }
    }

    pub fn from_position_and_length(token: Token, position: &Location, length: usize) -> Self {
        Self {
            token,
            range: Location::from_position_and_length(position, length),
        }
    }
}
