// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::{
    ast::{
        AnchorKind, CharClass, CharRange, LookAroundKind, Node, Pattern, PresetCharSetName,
    },
    error::CompileError,
    flags::Flags,
    location::Location,
    peekableiter::PeekableIter,
    rulechecker::{get_match_length, MatchLength},
};

use super::{
    commentremover::clean,
    lexer::lex_from_str,
    token::{Repetition, Token, TokenWithRange},
};

pub const PARSER_PEEK_TOKEN_MAX_COUNT: usize = 2;

// Groups nested deeper than this are rejected, so that the recursive
// parsing, checking and compiling stay within a small, fixed stack depth.
pub const MAX_NESTING_DEPTH: usize = 200;

pub fn parse_from_str(s: &str, flags: &Flags) -> Result<Pattern, CompileError> {
    let tokens = clean(lex_from_str(s, flags.verbose)?);
    let mut token_iter = tokens.into_iter();
    let mut peekable_token_iter = PeekableIter::new(&mut token_iter, PARSER_PEEK_TOKEN_MAX_COUNT);
    let mut parser = Parser::new(&mut peekable_token_iter, *flags);
    parser.parse_pattern()
}

pub struct Parser<'a> {
    upstream: &'a mut PeekableIter<'a, TokenWithRange>,
    last_range: Location,

    // the flags in effect at the current token
    flags: Flags,

    // indexed by the group number, the entry 0 is the whole match
    capture_group_names: Vec<Option<String>>,
    closed_groups: Vec<bool>,

    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(upstream: &'a mut PeekableIter<'a, TokenWithRange>, flags: Flags) -> Self {
        Self {
            upstream,
            last_range: Location::new_range(0, 0, 0, 0),
            flags,
            capture_group_names: vec![None],
            closed_groups: vec![true],
            depth: 0,
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        match self.upstream.next() {
            Some(TokenWithRange { token, range }) => {
                self.last_range = range;
                Some(token)
            }
            None => None,
        }
    }

    fn peek_token(&mut self, offset: usize) -> Option<&Token> {
        self.upstream.peek(offset).map(|item| &item.token)
    }

    fn peek_range(&mut self, offset: usize) -> Option<Location> {
        self.upstream.peek(offset).map(|item| item.range)
    }
}

impl Parser<'_> {
    pub fn parse_pattern(&mut self) -> Result<Pattern, CompileError> {
        let node = self.parse_alternation()?;

        // the alternation stops at `)` or at the end of tokens
        if let Some(range) = self.peek_range(0) {
            return Err(CompileError::UnbalancedGroup(
                "Unmatched \")\", the group is not opened.".to_owned(),
                range,
            ));
        }

        Ok(Pattern {
            node,
            capture_group_names: std::mem::take(&mut self.capture_group_names),
        })
    }

    fn parse_alternation(&mut self) -> Result<Node, CompileError> {
        // concat ( "|" concat )*
        // ------
        // ^
        // | current, None or Some(...)
        //
        // `|` has the lowest precedence, e.g. "ab|cd" == "(?:ab)|(?:cd)"

        let mut branches = vec![self.parse_concat()?];

        while let Some(Token::LogicOr) = self.peek_token(0) {
            self.next_token(); // consume '|'
            branches.push(self.parse_concat()?);
        }

        if branches.len() == 1 {
            Ok(branches.remove(0))
        } else {
            Ok(Node::Alternation(branches))
        }
    }

    fn parse_concat(&mut self) -> Result<Node, CompileError> {
        // token ...
        // -----
        // ^
        // | current, None or Some(...)

        let mut nodes = vec![];

        loop {
            let token = match self.peek_token(0) {
                None | Some(Token::GroupEnd | Token::LogicOr) => break,
                Some(token) => token.clone(),
            };

            if let Token::InlineFlags(modifier) = token {
                // `(?i)` applies to the rest of the enclosing group,
                // the group restores the flags when it closes.
                self.next_token(); // consume "(?...)"
                self.flags = modifier.apply(&self.flags);
            } else {
                let node = self.parse_quantified()?;
                nodes.push(node);
            }
        }

        if nodes.len() == 1 {
            Ok(nodes.remove(0))
        } else {
            Ok(Node::Concat(nodes))
        }
    }

    fn parse_quantified(&mut self) -> Result<Node, CompileError> {
        // atom quantifier?
        // ----
        // ^
        // | current, Some(...)

        let node = self.parse_atom()?;

        let Some((min, max, greedy)) = self.peek_quantifier() else {
            return Ok(node);
        };

        self.next_token(); // consume quantifier
        let quantifier_range = self.last_range;

        if node.is_zero_width_assertion() {
            return Err(CompileError::InvalidQuantifierRange(
                "A quantifier can not be applied to an assertion.".to_owned(),
                quantifier_range,
            ));
        }

        if let Some(max) = max {
            if min > max {
                return Err(CompileError::InvalidQuantifierRange(
                    format!(
                        "Invalid repetition range {{{},{}}}, the minimum is greater than the maximum.",
                        min, max
                    ),
                    quantifier_range,
                ));
            }
        }

        if self.peek_quantifier().is_some() {
            let range = self.peek_range(0).unwrap_or(quantifier_range);
            return Err(CompileError::InvalidQuantifierRange(
                "A quantifier can not follow another quantifier.".to_owned(),
                range,
            ));
        }

        Ok(Node::Quantifier {
            inner: Box::new(node),
            min,
            max,
            greedy,
        })
    }

    // (min, max, greedy) of the quantifier at the current token
    fn peek_quantifier(&mut self) -> Option<(usize, Option<usize>, bool)> {
        let quantifier = match self.peek_token(0)? {
            Token::Optional => (0, Some(1), true),
            Token::OptionalLazy => (0, Some(1), false),
            Token::OneOrMore => (1, None, true),
            Token::OneOrMoreLazy => (1, None, false),
            Token::ZeroOrMore => (0, None, true),
            Token::ZeroOrMoreLazy => (0, None, false),
            Token::Repetition(repetition, lazy) => match repetition {
                Repetition::Specified(n) => (*n, Some(*n), !*lazy),
                Repetition::AtLeast(n) => (*n, None, !*lazy),
                Repetition::Range(m, n) => (*m, Some(*n), !*lazy),
            },
            _ => return None,
        };
        Some(quantifier)
    }

    fn parse_atom(&mut self) -> Result<Node, CompileError> {
        // atom ...
        // ----
        // ^
        // | current, Some(...)

        let token = match self.next_token() {
            Some(token) => token,
            None => {
                return Err(CompileError::UnexpectedEndOfPattern(
                    "Expect an expression.".to_owned(),
                ));
            }
        };
        let token_range = self.last_range;

        let node = match token {
            Token::Char(character) => Node::Literal {
                character,
                ignore_case: self.flags.ignore_case,
            },
            Token::Dot => Node::AnyChar {
                dot_all: self.flags.dot_all,
            },
            Token::PresetCharSet(name_char) => {
                Node::CharClass(CharClass::from_preset(preset_charset_name_from_char(
                    name_char,
                    token_range,
                )?))
            }
            Token::CharSetStart => self.parse_charset(false, token_range)?,
            Token::CharSetStartNegative => self.parse_charset(true, token_range)?,
            Token::StartAssertion => Node::Anchor(if self.flags.multiline {
                AnchorKind::StartOfLine
            } else {
                AnchorKind::StartOfInput
            }),
            Token::EndAssertion => Node::Anchor(if self.flags.multiline {
                AnchorKind::EndOfLine
            } else {
                AnchorKind::EndOfInput
            }),
            Token::InputStartAssertion => Node::Anchor(AnchorKind::StartOfInput),
            Token::InputEndAssertion => Node::Anchor(AnchorKind::EndOfInput),
            Token::BoundaryAssertion(c) => Node::WordBoundary { negated: c == 'B' },
            Token::BackReferenceNumber(capture_index) => {
                self.check_backreference(capture_index, &capture_index.to_string(), token_range)?;
                Node::Backreference {
                    capture_index,
                    ignore_case: self.flags.ignore_case,
                }
            }
            Token::BackReferenceIdentifier(name) => {
                let capture_index = self
                    .capture_group_names
                    .iter()
                    .position(|item| item.as_deref() == Some(name.as_str()))
                    .ok_or_else(|| {
                        CompileError::UndefinedBackreference(name.clone(), token_range)
                    })?;
                self.check_backreference(capture_index, &name, token_range)?;
                Node::Backreference {
                    capture_index,
                    ignore_case: self.flags.ignore_case,
                }
            }
            Token::GroupStart
            | Token::NonCapturing
            | Token::NamedCapture(_)
            | Token::FlagGroup(_)
            | Token::LookAhead
            | Token::LookAheadNegative
            | Token::LookBehind
            | Token::LookBehindNegative => self.parse_group(token, token_range)?,
            Token::Optional
            | Token::OptionalLazy
            | Token::OneOrMore
            | Token::OneOrMoreLazy
            | Token::ZeroOrMore
            | Token::ZeroOrMoreLazy
            | Token::Repetition(..) => {
                return Err(CompileError::InvalidQuantifierRange(
                    "Nothing to repeat, a quantifier must follow an expression.".to_owned(),
                    token_range,
                ));
            }
            _ => {
                return Err(CompileError::MessageWithLocation(
                    "Unexpected token.".to_owned(),
                    token_range,
                ));
            }
        };

        Ok(node)
    }

    fn check_backreference(
        &self,
        capture_index: usize,
        reference: &str,
        range: Location,
    ) -> Result<(), CompileError> {
        // a group can only be referenced after it is closed,
        // and the group 0 is never closed inside the pattern.
        match self.closed_groups.get(capture_index) {
            Some(true) if capture_index > 0 => Ok(()),
            _ => Err(CompileError::UndefinedBackreference(
                reference.to_owned(),
                range,
            )),
        }
    }

    fn parse_group(&mut self, head_token: Token, head_range: Location) -> Result<Node, CompileError> {
        // "(" alternation ")" ?
        //  ^                  ^-- to here
        //  | current, the head token has been consumed
        //
        // also: "(?:", "(?<name>", "(?i:", "(?=", "(?!", "(?<=", "(?<!"

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(CompileError::MessageWithLocation(
                format!(
                    "Groups are nested too deeply, the maximum depth is {}.",
                    MAX_NESTING_DEPTH
                ),
                head_range,
            ));
        }

        let saved_flags = self.flags;

        let (capture_index, name) = match &head_token {
            Token::GroupStart => (Some(self.open_capture_group(None)), None),
            Token::NamedCapture(name) => {
                if self
                    .capture_group_names
                    .iter()
                    .any(|item| item.as_deref() == Some(name.as_str()))
                {
                    return Err(CompileError::DuplicateGroupName(name.clone(), head_range));
                }
                (
                    Some(self.open_capture_group(Some(name.clone()))),
                    Some(name.clone()),
                )
            }
            Token::FlagGroup(modifier) => {
                self.flags = modifier.apply(&self.flags);
                (None, None)
            }
            _ => (None, None),
        };

        let inner = self.parse_alternation()?;

        match self.next_token() {
            Some(Token::GroupEnd) => {}
            _ => {
                return Err(CompileError::UnbalancedGroup(
                    "Unclosed group, expect \")\".".to_owned(),
                    head_range,
                ));
            }
        }

        let group_range = Location::from_range_pair(&head_range, &self.last_range);

        self.flags = saved_flags;
        self.depth -= 1;

        if let Some(index) = capture_index {
            self.closed_groups[index] = true;
        }

        // the flags are already resolved into the inner nodes
        if let Token::FlagGroup(_) = head_token {
            return Ok(inner);
        }

        let look_around_kind = match head_token {
            Token::LookAhead => Some(LookAroundKind::AheadPositive),
            Token::LookAheadNegative => Some(LookAroundKind::AheadNegative),
            Token::LookBehind => Some(LookAroundKind::BehindPositive),
            Token::LookBehindNegative => Some(LookAroundKind::BehindNegative),
            _ => None,
        };

        let node = match look_around_kind {
            Some(kind) => {
                if kind.is_behind() && get_match_length(&inner) == MatchLength::Variable {
                    return Err(CompileError::VariableWidthLookbehind(group_range));
                }

                Node::LookAround {
                    kind,
                    inner: Box::new(inner),
                }
            }
            None => Node::Group {
                inner: Box::new(inner),
                capture_index,
                name,
            },
        };

        Ok(node)
    }

    fn open_capture_group(&mut self, name: Option<String>) -> usize {
        let index = self.capture_group_names.len();
        self.capture_group_names.push(name);
        self.closed_groups.push(false);
        index
    }

    fn parse_charset(&mut self, negated: bool, head_range: Location) -> Result<Node, CompileError> {
        // "[" {char | char_range | preset_charset} "]" ?
        //  ^                                           ^__ to here
        //  | current, the head token has been consumed
        //
        // also: "[^" ...

        let mut ranges = vec![];

        // preset members are ASCII sets, they take no part in the case expansion
        let mut preset_ranges = vec![];

        loop {
            match self.next_token() {
                Some(Token::CharSetEnd) => break,
                Some(Token::Char(c)) => ranges.push(CharRange::new(c, c)),
                Some(Token::CharRange(start, end_included)) => {
                    ranges.push(CharRange::new(start, end_included))
                }
                Some(Token::PresetCharSet(name_char)) => {
                    preset_ranges.extend(
                        preset_charset_name_from_char(name_char, self.last_range)?.to_ranges(),
                    )
                }
                Some(_) => {
                    return Err(CompileError::MessageWithLocation(
                        "Unsupported charset member.".to_owned(),
                        self.last_range,
                    ));
                }
                None => {
                    return Err(CompileError::UnbalancedGroup(
                        "Unclosed charset, expect \"]\".".to_owned(),
                        head_range,
                    ));
                }
            }
        }

        let mut class = CharClass::new(ranges, negated);
        if self.flags.ignore_case {
            class.add_case_variants();
        }

        if !preset_ranges.is_empty() {
            preset_ranges.extend(class.ranges);
            class = CharClass::new(preset_ranges, negated);
        }

        Ok(Node::CharClass(class))
    }
}

fn preset_charset_name_from_char(
    name_char: char,
    range: Location,
) -> Result<PresetCharSetName, CompileError> {
    PresetCharSetName::from_char(name_char).ok_or_else(|| {
        CompileError::MessageWithLocation(
            format!("Unknown preset charset '{}'.", name_char),
            range,
        )
    })
}
