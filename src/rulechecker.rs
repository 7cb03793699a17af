// Copyright (c) 2024 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use std::ops::{Add, BitOr, Mul};

use crate::ast::Node;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MatchLength {
    Variable,
    Fixed(usize), // length by char (unicode char codepoint)
}

impl Add for MatchLength {
    type Output = MatchLength;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) => match v0.checked_add(v1) {
                Some(length) => MatchLength::Fixed(length),
                None => MatchLength::Variable,
            },
            _ => MatchLength::Variable,
        }
    }
}

impl Mul<usize> for MatchLength {
    type Output = MatchLength;

    fn mul(self, rhs: usize) -> Self::Output {
        match self {
            MatchLength::Variable => MatchLength::Variable,
            MatchLength::Fixed(v) => match v.checked_mul(rhs) {
                Some(length) => MatchLength::Fixed(length),
                None => MatchLength::Variable,
            },
        }
    }
}

impl BitOr for MatchLength {
    type Output = MatchLength;

    // both branches of an alternation must have the same length
    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (MatchLength::Fixed(v0), MatchLength::Fixed(v1)) if v0 == v1 => MatchLength::Fixed(v0),
            _ => MatchLength::Variable,
        }
    }
}

pub fn get_match_length(node: &Node) -> MatchLength {
    match node {
        Node::Literal { .. } | Node::AnyChar { .. } | Node::CharClass(_) => MatchLength::Fixed(1),
        Node::Concat(nodes) => nodes
            .iter()
            .map(get_match_length)
            .fold(MatchLength::Fixed(0), |acc, item| acc + item),
        Node::Alternation(nodes) => nodes
            .iter()
            .map(get_match_length)
            .reduce(|acc, item| acc | item)
            .unwrap_or(MatchLength::Fixed(0)),
        Node::Group { inner, .. } => get_match_length(inner),
        Node::Quantifier {
            inner, min, max, ..
        } => {
            if *max == Some(*min) {
                get_match_length(inner) * *min
            } else {
                MatchLength::Variable
            }
        }
        Node::Anchor(_) | Node::WordBoundary { .. } | Node::LookAround { .. } => {
            MatchLength::Fixed(0)
        }
        Node::Backreference { .. } => MatchLength::Variable,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{flags::Flags, traditional::parse_from_str};

    use super::{get_match_length, MatchLength};

    fn get_pattern_length(s: &str) -> MatchLength {
        let pattern = parse_from_str(s, &Flags::new()).unwrap();
        get_match_length(&pattern.node)
    }

    #[test]
    fn test_get_match_length() {
        assert_eq!(get_pattern_length("abc"), MatchLength::Fixed(3));
        assert_eq!(get_pattern_length(r#"a[xyz]\d."#), MatchLength::Fixed(4));
        assert_eq!(get_pattern_length("(ab|cd)e"), MatchLength::Fixed(3));
        assert_eq!(get_pattern_length("a{3}(?:bc){2}"), MatchLength::Fixed(7));
        assert_eq!(get_pattern_length(r#"^a\b(?=xyz)$"#), MatchLength::Fixed(1));
        assert_eq!(get_pattern_length(""), MatchLength::Fixed(0));

        assert_eq!(get_pattern_length("ab|c"), MatchLength::Variable);
        assert_eq!(get_pattern_length("a+"), MatchLength::Variable);
        assert_eq!(get_pattern_length("a{2,3}"), MatchLength::Variable);
        assert_eq!(get_pattern_length(r#"(a)\1"#), MatchLength::Variable);

        // too long to count
        assert_eq!(
            get_pattern_length("a{18446744073709551615}a"),
            MatchLength::Variable
        );
    }
}
