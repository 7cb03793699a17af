// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

/// The pattern AST.
///
/// Flags are already resolved when a node is built: a literal knows whether
/// it is case-insensitive, `.` knows whether it matches `\n`, and `^`/`$` are
/// either input or line anchors. So the AST of `(?i:a)b` is simply two
/// literals with different `ignore_case` values.
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Literal {
        character: char,
        ignore_case: bool,
    },

    AnyChar {
        dot_all: bool,
    },

    CharClass(CharClass),

    // The empty concat matches the empty string, e.g. the
    // right hand side of `a|`.
    Concat(Vec<Node>),

    // Branches are tried in the listed order, the first one
    // that lets the rest of the pattern succeed wins.
    Alternation(Vec<Node>),

    Group {
        inner: Box<Node>,
        capture_index: Option<usize>, // None for non-capturing groups
        name: Option<String>,
    },

    Quantifier {
        inner: Box<Node>,
        min: usize,
        max: Option<usize>, // None for unbounded
        greedy: bool,
    },

    Anchor(AnchorKind),

    WordBoundary {
        negated: bool,
    },

    Backreference {
        capture_index: usize,
        ignore_case: bool,
    },

    LookAround {
        kind: LookAroundKind,
        inner: Box<Node>,
    },
}

/// A parsed pattern, i.e. the root node and the capture group table.
#[derive(Debug, PartialEq, Clone)]
pub struct Pattern {
    pub node: Node,

    // one entry per capture group, indexed by the group number.
    // the entry 0 stands for the whole match and has no name.
    pub capture_group_names: Vec<Option<String>>,
}

impl Pattern {
    /// The number of capture groups, including the group 0.
    pub fn get_capture_group_count(&self) -> usize {
        self.capture_group_names.len()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AnchorKind {
    StartOfInput,
    EndOfInput,
    StartOfLine,
    EndOfLine,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LookAroundKind {
    AheadPositive,
    AheadNegative,
    BehindPositive,
    BehindNegative,
}

impl LookAroundKind {
    pub fn is_behind(&self) -> bool {
        matches!(
            self,
            LookAroundKind::BehindPositive | LookAroundKind::BehindNegative
        )
    }

    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            LookAroundKind::AheadNegative | LookAroundKind::BehindNegative
        )
    }
}

impl Node {
    pub fn new_empty() -> Self {
        Node::Concat(vec![])
    }

    /// Anchors, word boundaries and look-arounds, i.e. the
    /// nodes a quantifier must not be applied to.
    pub fn is_zero_width_assertion(&self) -> bool {
        matches!(
            self,
            Node::Anchor(_) | Node::WordBoundary { .. } | Node::LookAround { .. }
        )
    }
}

#[allow(clippy::enum_variant_names)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PresetCharSetName {
    CharWord,
    CharNotWord,
    CharDigit,
    CharNotDigit,
    CharSpace,
    CharNotSpace,
}

impl PresetCharSetName {
    pub fn from_char(name_char: char) -> Option<Self> {
        let name = match name_char {
            'w' => PresetCharSetName::CharWord,
            'W' => PresetCharSetName::CharNotWord,
            'd' => PresetCharSetName::CharDigit,
            'D' => PresetCharSetName::CharNotDigit,
            's' => PresetCharSetName::CharSpace,
            'S' => PresetCharSetName::CharNotSpace,
            _ => return None,
        };
        Some(name)
    }

    /// The ranges of the positive set, and whether the preset is its negation.
    fn positive_ranges(&self) -> (Vec<CharRange>, bool) {
        match self {
            PresetCharSetName::CharWord => (word_ranges(), false),
            PresetCharSetName::CharNotWord => (word_ranges(), true),
            PresetCharSetName::CharDigit => (digit_ranges(), false),
            PresetCharSetName::CharNotDigit => (digit_ranges(), true),
            PresetCharSetName::CharSpace => (space_ranges(), false),
            PresetCharSetName::CharNotSpace => (space_ranges(), true),
        }
    }

    /// The ranges of the preset, with the negative presets
    /// expressed as the complement of the positive ones.
    pub fn to_ranges(&self) -> Vec<CharRange> {
        let (ranges, negated) = self.positive_ranges();
        if negated {
            complement_ranges(&ranges)
        } else {
            ranges
        }
    }
}

// [0-9]
fn digit_ranges() -> Vec<CharRange> {
    vec![CharRange::new('0', '9')]
}

// [0-9A-Za-z_]
fn word_ranges() -> Vec<CharRange> {
    vec![
        CharRange::new('0', '9'),
        CharRange::new('A', 'Z'),
        CharRange::new('_', '_'),
        CharRange::new('a', 'z'),
    ]
}

// [ \t\n\r\f\v], i.e. 0x09..=0x0D and the space
fn space_ranges() -> Vec<CharRange> {
    vec![CharRange::new('\t', '\r'), CharRange::new(' ', ' ')]
}

pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct CharRange {
    pub start: char,
    pub end_included: char,
}

impl CharRange {
    pub fn new(start: char, end_included: char) -> Self {
        Self {
            start,
            end_included,
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.start <= c && c <= self.end_included
    }
}

/// A set of chars, stored as sorted, non-overlapping and
/// non-adjacent ranges.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CharClass {
    pub ranges: Vec<CharRange>,
    pub negated: bool,
}

// Ranges are scanned for case variants only up to here, there are no
// cased chars above the supplementary multilingual plane.
const CASE_VARIANT_SCAN_END: u32 = 0x1_FFFF;

impl CharClass {
    pub fn new(ranges: Vec<CharRange>, negated: bool) -> Self {
        Self {
            ranges: normalize_ranges(ranges),
            negated,
        }
    }

    pub fn from_preset(name: PresetCharSetName) -> Self {
        let (ranges, negated) = name.positive_ranges();
        Self::new(ranges, negated)
    }

    pub fn contains(&self, c: char) -> bool {
        let found = self
            .ranges
            .binary_search_by(|range| {
                if range.end_included < c {
                    std::cmp::Ordering::Less
                } else if range.start > c {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok();

        found ^ self.negated
    }

    /// Adds the upper and lower case variants of every member, so that a
    /// case-insensitive class can be matched without folding at match time.
    pub fn add_case_variants(&mut self) {
        let mut variants = vec![];

        for range in &self.ranges {
            let start = range.start as u32;
            let end = (range.end_included as u32).min(CASE_VARIANT_SCAN_END);

            for codepoint in start..=end {
                let Some(c) = char::from_u32(codepoint) else {
                    continue;
                };

                for variant in case_variants(c) {
                    if !range.contains(variant) {
                        variants.push(CharRange::new(variant, variant));
                    }
                }
            }
        }

        if !variants.is_empty() {
            variants.extend(self.ranges.iter().copied());
            self.ranges = normalize_ranges(variants);
        }
    }
}

/// The simple (single char) lower and upper case mappings of `c`.
fn case_variants(c: char) -> Vec<char> {
    let mut variants = vec![];

    let mut lower = c.to_lowercase();
    if let (Some(l), None) = (lower.next(), lower.next()) {
        if l != c {
            variants.push(l);
        }
    }

    let mut upper = c.to_uppercase();
    if let (Some(u), None) = (upper.next(), upper.next()) {
        if u != c {
            variants.push(u);
        }
    }

    variants
}

/// Simple case folding used by case-insensitive literals and backreferences.
pub fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn next_char(c: char) -> Option<char> {
    match c as u32 {
        0xD7FF => Some('\u{E000}'),
        codepoint => char::from_u32(codepoint + 1),
    }
}

fn previous_char(c: char) -> Option<char> {
    match c as u32 {
        0 => None,
        0xE000 => Some('\u{D7FF}'),
        codepoint => char::from_u32(codepoint - 1),
    }
}

/// Sorts the ranges and merges the overlapping and adjacent ones.
pub fn normalize_ranges(mut ranges: Vec<CharRange>) -> Vec<CharRange> {
    ranges.sort();

    let mut merged: Vec<CharRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            let touches = match next_char(last.end_included) {
                Some(following) => range.start <= following,
                None => true,
            };

            if touches {
                if range.end_included > last.end_included {
                    last.end_included = range.end_included;
                }
                continue;
            }
        }
        merged.push(range);
    }

    merged
}

/// All chars that are not covered by `ranges`.
pub fn complement_ranges(ranges: &[CharRange]) -> Vec<CharRange> {
    let ranges = normalize_ranges(ranges.to_vec());
    let mut complement = vec![];
    let mut start = Some('\0');

    for range in &ranges {
        if let Some(s) = start {
            if s < range.start {
                if let Some(end) = previous_char(range.start) {
                    complement.push(CharRange::new(s, end));
                }
            }
        }
        start = next_char(range.end_included);
    }

    if let Some(s) = start {
        complement.push(CharRange::new(s, char::MAX));
    }

    complement
}
