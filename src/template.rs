// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Replacement template syntax:
//
// - \N        Capture group N (one or two digits), `\0` is the whole match
// - \g<N>     Capture group N
// - \g<name>  Named capture group
// - \\        Backslash
// - \n \t \r  Line feed, tab, carriage return
// - \ + any other non-alphanumeric char is that char
//
// A group that did not take part in the match is replaced by "".

use crate::{
    charwithposition::{CharWithPosition, CharsWithPositionIter},
    error::CompileError,
    location::Location,
    peekableiter::PeekableIter,
    regex::Captures,
};

const TEMPLATE_PEEK_CHAR_MAX_COUNT: usize = 2;

/// Group references in a replacement template are
/// limited to two digits, like `\1` .. `\99` in a pattern.
const MAX_GROUP_REFERENCE_DIGITS: usize = 2;

#[derive(Debug, PartialEq, Clone)]
pub enum TemplateSegment {
    Literal(String),
    Group(usize),
}

/// A parsed replacement template.
#[derive(Debug, PartialEq, Clone)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parses the template, every group reference is checked against
    /// the capture groups of the pattern.
    pub fn parse(s: &str, capture_group_names: &[Option<String>]) -> Result<Self, CompileError> {
        let mut chars = s.chars();
        let mut char_position_iter = CharsWithPositionIter::new(&mut chars);
        let mut peekable_char_position_iter =
            PeekableIter::new(&mut char_position_iter, TEMPLATE_PEEK_CHAR_MAX_COUNT);
        let mut parser = TemplateParser::new(&mut peekable_char_position_iter, capture_group_names);
        let segments = parser.parse()?;
        Ok(Template { segments })
    }

    /// Appends the replacement for one match to `dst`.
    pub fn expand(&self, captures: &Captures, dst: &mut String) {
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(s) => dst.push_str(s),
                TemplateSegment::Group(index) => {
                    if let Some(m) = captures.get(*index) {
                        dst.push_str(m.as_str());
                    }
                }
            }
        }
    }
}

struct TemplateParser<'a> {
    upstream: &'a mut PeekableIter<'a, CharWithPosition>,
    capture_group_names: &'a [Option<String>],
    last_position: Location,
}

impl<'a> TemplateParser<'a> {
    fn new(
        upstream: &'a mut PeekableIter<'a, CharWithPosition>,
        capture_group_names: &'a [Option<String>],
    ) -> Self {
        Self {
            upstream,
            capture_group_names,
            last_position: Location::new_position(0, 0, 0),
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let CharWithPosition {
            character,
            position,
        } = self.upstream.next()?;
        self.last_position = position;
        Some(character)
    }

    fn peek_char(&mut self, offset: usize) -> Option<char> {
        self.upstream.peek(offset).map(|item| item.character)
    }

    fn parse(&mut self) -> Result<Vec<TemplateSegment>, CompileError> {
        let mut segments = vec![];
        let mut literal = String::new();

        while let Some(current_char) = self.next_char() {
            if current_char != '\\' {
                literal.push(current_char);
                continue;
            }

            let escape_position = self.last_position;

            match self.next_char() {
                Some('\\') => literal.push('\\'),
                Some('n') => literal.push('\n'),
                Some('t') => literal.push('\t'),
                Some('r') => literal.push('\r'),
                Some('g') => {
                    let index = self.parse_group_name_or_index(&escape_position)?;
                    push_group(&mut segments, &mut literal, index);
                }
                Some(c) if c.is_ascii_digit() => {
                    let index = self.parse_group_number(c, &escape_position)?;
                    push_group(&mut segments, &mut literal, index);
                }
                Some(c) if c.is_alphanumeric() => {
                    return Err(CompileError::MessageWithLocation(
                        format!("Unsupported escape \"\\{}\" in replacement template.", c),
                        Location::from_position_and_length(&escape_position, 2),
                    ));
                }
                Some(c) => literal.push(c),
                None => {
                    return Err(CompileError::UnexpectedEndOfPattern(
                        "Incomplete escape in replacement template.".to_owned(),
                    ));
                }
            }
        }

        if !literal.is_empty() {
            segments.push(TemplateSegment::Literal(literal));
        }

        Ok(segments)
    }

    fn parse_group_number(
        &mut self,
        first_digit: char,
        escape_position: &Location,
    ) -> Result<usize, CompileError> {
        // \NN
        //  ^ ^__ to here
        //  |____ first digit, consumed

        let mut num_string = String::from(first_digit);

        while num_string.len() < MAX_GROUP_REFERENCE_DIGITS {
            match self.peek_char(0) {
                Some(c) if c.is_ascii_digit() => {
                    num_string.push(c);
                    self.next_char();
                }
                _ => break,
            }
        }

        let range = Location::from_position_and_length(escape_position, num_string.len() + 1);
        self.check_group_index(&num_string, range)
    }

    fn parse_group_name_or_index(
        &mut self,
        escape_position: &Location,
    ) -> Result<usize, CompileError> {
        // \g<name>
        //   ^     ^__ to here
        //   |________ current char

        match self.next_char() {
            Some('<') => {}
            Some(_) => {
                return Err(CompileError::MessageWithLocation(
                    "Expect \"<\" after \"\\g\".".to_owned(),
                    self.last_position,
                ));
            }
            None => {
                return Err(CompileError::UnexpectedEndOfPattern(
                    "Incomplete group reference in replacement template.".to_owned(),
                ));
            }
        }

        let mut name = String::new();
        loop {
            match self.next_char() {
                Some('>') => break,
                Some(c) => name.push(c),
                None => {
                    return Err(CompileError::UnexpectedEndOfPattern(
                        "Incomplete group reference in replacement template, expect \">\"."
                            .to_owned(),
                    ));
                }
            }
        }

        let range =
            Location::from_position_pair_with_end_included(escape_position, &self.last_position);

        if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
            self.check_group_index(&name, range)
        } else {
            self.capture_group_names
                .iter()
                .position(|item| item.as_deref() == Some(name.as_str()))
                .ok_or(CompileError::UndefinedBackreference(name, range))
        }
    }

    fn check_group_index(&self, num_string: &str, range: Location) -> Result<usize, CompileError> {
        match num_string.parse::<usize>() {
            Ok(index) if index < self.capture_group_names.len() => Ok(index),
            _ => Err(CompileError::UndefinedBackreference(
                num_string.to_owned(),
                range,
            )),
        }
    }
}

fn push_group(segments: &mut Vec<TemplateSegment>, literal: &mut String, index: usize) {
    if !literal.is_empty() {
        segments.push(TemplateSegment::Literal(std::mem::take(literal)));
    }
    segments.push(TemplateSegment::Group(index));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{error::CompileError, location::Location};

    use super::{Template, TemplateSegment};

    fn names() -> Vec<Option<String>> {
        vec![None, None, Some("word".to_owned())]
    }

    fn parse(s: &str) -> Result<Vec<TemplateSegment>, CompileError> {
        Template::parse(s, &names()).map(|template| template.segments)
    }

    #[test]
    fn test_parse_template() {
        assert_eq!(
            parse(r#"<\1>\g<word>-\g<0>"#).unwrap(),
            vec![
                TemplateSegment::Literal("<".to_owned()),
                TemplateSegment::Group(1),
                TemplateSegment::Literal(">".to_owned()),
                TemplateSegment::Group(2),
                TemplateSegment::Literal("-".to_owned()),
                TemplateSegment::Group(0),
            ]
        );

        assert_eq!(
            parse(r#"a\\b\n\t\r\$"#).unwrap(),
            vec![TemplateSegment::Literal("a\\b\n\t\r$".to_owned())]
        );

        // only two digits are taken
        assert_eq!(
            parse(r#"\012"#).unwrap(),
            vec![
                TemplateSegment::Group(1),
                TemplateSegment::Literal("2".to_owned())
            ]
        );

        assert_eq!(parse("").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_template_error() {
        assert_eq!(
            parse(r#"ab\3"#),
            Err(CompileError::UndefinedBackreference(
                "3".to_owned(),
                Location::new_range(2, 0, 2, 2)
            ))
        );

        assert_eq!(
            parse(r#"\g<foo>"#),
            Err(CompileError::UndefinedBackreference(
                "foo".to_owned(),
                Location::new_range(0, 0, 0, 7)
            ))
        );

        assert!(matches!(
            parse(r#"\g<12>"#),
            Err(CompileError::UndefinedBackreference(..))
        ));

        assert!(matches!(
            parse(r#"\q"#),
            Err(CompileError::MessageWithLocation(..))
        ));

        assert!(matches!(
            parse(r#"\g<1"#),
            Err(CompileError::UnexpectedEndOfPattern(_))
        ));

        assert!(matches!(
            parse("abc\\"),
            Err(CompileError::UnexpectedEndOfPattern(_))
        ));
    }
}
