// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Syntax Summary:
//
// Meta characters and their meanings:
//
// - [ ]      Character set, a `]` right after `[` or `[^` is a literal
// - [^ ]     Negated character set
// - {m}      Exact repetition (m times)
// - {m,n}    Repetition range (m to n times)
// - {m,}     At least m repetitions
// - {,n}     At most n repetitions
// - (xyz)    Capturing group
// - *        Zero or more repetitions
// - +        One or more repetitions
// - ?        Optional, or lazy when it follows another quantifier
// - |        Alternation
// - ^        Start of input (or of a line in multiline mode)
// - $        End of input (or of a line in multiline mode)
// - .        Any character except `\n` (any character in dot-all mode)
// - \        Escape character
//
// A `{` that does not start a well-formed repetition is a literal, e.g. `a{`, `{x}`.
//
// Escaped characters:
//
// - \t \n \r \f \v \a \0
// - \xhh      Two hex digits
// - \uhhhh    Four hex digits
// - \u{h..}   Unicode code point, up to six hex digits
// - \ + any non-alphanumeric char is that char, e.g. `\.`, `\-`, `\ `
//
// Preset character sets (ASCII):
//
// - \w \W \d \D \s \S
//
// Assertions:
//
// - \b \B     Word boundary, not a word boundary (backspace inside a charset)
// - \A        Start of input
// - \Z \z     End of input
//
// Groups:
//
// - (?:...)                   Non-capturing group
// - (?<name>...) (?P<name>...) Named capturing group
// - (?=...) (?!...)           Look-ahead
// - (?<=...) (?<!...)         Look-behind
// - (?i-ms:...)               Flags scoped to the group
// - (?i-ms)                   Flags for the rest of the enclosing group
// - (?#...)                   Comment
//
// Back references:
//
// - \1 .. \99
// - \k<name> (?P=name)
//
// Verbose mode (flag `x`, or `(?x)` at the very start of the pattern):
// whitespace and `#` line comments outside charsets are ignored.

use crate::{
    charwithposition::{CharWithPosition, CharsWithPositionIter},
    error::CompileError,
    location::Location,
    peekableiter::PeekableIter,
};

use super::token::{FlagsModifier, Repetition, Token, TokenWithRange};

pub const LEXER_PEEK_CHAR_MAX_COUNT: usize = 4;

pub fn lex_from_str(s: &str, verbose: bool) -> Result<Vec<TokenWithRange>, CompileError> {
    let mut chars = s.chars();
    let mut char_position_iter = CharsWithPositionIter::new(&mut chars);
    let mut peekable_char_position_iter =
        PeekableIter::new(&mut char_position_iter, LEXER_PEEK_CHAR_MAX_COUNT);
    let mut lexer = Lexer::new(&mut peekable_char_position_iter, verbose);
    lexer.lex()
}

fn is_verbose_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

struct Lexer<'a> {
    upstream: &'a mut PeekableIter<'a, CharWithPosition>,
    last_position: Location, // last position consumed
    saved_positions: Vec<Location>,
    verbose: bool,
}

impl<'a> Lexer<'a> {
    fn new(upstream: &'a mut PeekableIter<'a, CharWithPosition>, verbose: bool) -> Self {
        Self {
            upstream,
            last_position: Location::new_position(0, 0, 0),
            saved_positions: vec![],
            verbose,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        match self.upstream.next() {
            Some(CharWithPosition {
                character,
                position,
            }) => {
                self.last_position = position;
                Some(character)
            }
            None => None,
        }
    }

    fn peek_char(&mut self, offset: usize) -> Option<char> {
        self.upstream.peek(offset).map(|item| item.character)
    }

    fn peek_char_and_equals(&mut self, offset: usize, expected_char: char) -> bool {
        self.peek_char(offset) == Some(expected_char)
    }

    fn peek_position(&mut self, offset: usize) -> Option<Location> {
        self.upstream.peek(offset).map(|item| item.position)
    }

    fn push_peek_position(&mut self) {
        let position = match self.peek_position(0) {
            Some(position) => position,
            None => self.last_position.move_position_forward(),
        };
        self.saved_positions.push(position);
    }

    fn pop_saved_position(&mut self) -> Location {
        self.saved_positions.pop().unwrap_or(self.last_position)
    }

    fn expect_char(
        &mut self,
        expected_char: char,
        char_description: &str,
    ) -> Result<(), CompileError> {
        match self.next_char() {
            Some(ch) => {
                if ch == expected_char {
                    Ok(())
                } else {
                    Err(CompileError::MessageWithLocation(
                        format!("Expect char: {}.", char_description),
                        self.last_position,
                    ))
                }
            }
            None => Err(CompileError::UnexpectedEndOfPattern(format!(
                "Expect char: {}.",
                char_description
            ))),
        }
    }

    // consumes `length` chars and returns the token covering them
    fn take_token(&mut self, token: Token, length: usize) -> TokenWithRange {
        self.push_peek_position();
        for _ in 0..length {
            self.next_char();
        }
        TokenWithRange::from_position_and_length(token, &self.pop_saved_position(), length)
    }
}

impl Lexer<'_> {
    fn lex(&mut self) -> Result<Vec<TokenWithRange>, CompileError> {
        let mut token_with_ranges = vec![];

        while let Some(current_char) = self.peek_char(0) {
            let twr = match current_char {
                c if self.verbose && is_verbose_whitespace(c) => self.lex_whitespace(),
                '#' if self.verbose => self.lex_line_comment(),
                '[' => {
                    let mut twrs = self.lex_charset()?;
                    token_with_ranges.append(&mut twrs);
                    continue;
                }
                ']' => {
                    return Err(CompileError::UnbalancedGroup(
                        "Unmatched \"]\", the charset is not opened.".to_owned(),
                        Location::from_position_and_length(
                            &self.peek_position(0).unwrap_or(self.last_position),
                            1,
                        ),
                    ));
                }
                '{' => {
                    if self.is_repetition_ahead() {
                        self.lex_repetition()?
                    } else {
                        self.take_token(Token::Char('{'), 1)
                    }
                }
                '(' => {
                    let at_pattern_start = token_with_ranges.is_empty();
                    self.lex_group_start(at_pattern_start)?
                }
                ')' => self.take_token(Token::GroupEnd, 1),
                '?' if self.peek_char_and_equals(1, '?') => self.take_token(Token::OptionalLazy, 2),
                '?' => self.take_token(Token::Optional, 1),
                '+' if self.peek_char_and_equals(1, '?') => {
                    self.take_token(Token::OneOrMoreLazy, 2)
                }
                '+' => self.take_token(Token::OneOrMore, 1),
                '*' if self.peek_char_and_equals(1, '?') => {
                    self.take_token(Token::ZeroOrMoreLazy, 2)
                }
                '*' => self.take_token(Token::ZeroOrMore, 1),
                '^' => self.take_token(Token::StartAssertion, 1),
                '$' => self.take_token(Token::EndAssertion, 1),
                '.' => self.take_token(Token::Dot, 1),
                '|' => self.take_token(Token::LogicOr, 1),
                '\\' => self.lex_main_escaping()?,
                c => self.take_token(Token::Char(c), 1),
            };

            token_with_ranges.push(twr);
        }

        Ok(token_with_ranges)
    }

    fn lex_whitespace(&mut self) -> TokenWithRange {
        // ' \t\n'?  //
        // ^      ^__// to here
        // |_________// current char, validated

        self.push_peek_position();

        while matches!(self.peek_char(0), Some(c) if is_verbose_whitespace(c)) {
            self.next_char();
        }

        let range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );
        TokenWithRange::new(Token::Whitespace, range)
    }

    fn lex_line_comment(&mut self) -> TokenWithRange {
        // # ... \n  //
        // ^     ^___// to here, the '\n' is not consumed
        // |_________// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '#'

        let mut comment_string = String::new();
        while let Some(current_char) = self.peek_char(0) {
            if current_char == '\n' {
                break;
            }
            comment_string.push(current_char);
            self.next_char();
        }

        let range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );
        TokenWithRange::new(Token::Comment(comment_string), range)
    }

    fn lex_charset(&mut self) -> Result<Vec<TokenWithRange>, CompileError> {
        // [.....]?  //
        // ^      ^__// to here
        // |_________// current char, validated
        //
        // also `[^.....]`

        let mut token_with_ranges = vec![];

        let charset_start = if self.peek_char_and_equals(1, '^') {
            self.take_token(Token::CharSetStartNegative, 2)
        } else {
            self.take_token(Token::CharSetStart, 1)
        };
        let charset_start_range = charset_start.range;
        token_with_ranges.push(charset_start);

        // `]` as the first member is a literal, e.g. `[]a]`
        if self.peek_char_and_equals(0, ']') {
            let twr = self.take_token(Token::Char(']'), 1);
            token_with_ranges.push(twr);
        }

        loop {
            let member = match self.peek_char(0) {
                Some(']') => break,
                Some(_) => self.lex_charset_member()?,
                None => {
                    return Err(CompileError::UnbalancedGroup(
                        "Unclosed charset, expect \"]\".".to_owned(),
                        charset_start_range,
                    ));
                }
            };

            // a hyphen between two members makes a char range, a hyphen
            // before the closing `]` is a literal, e.g. `[a-]`
            let is_range = self.peek_char_and_equals(0, '-')
                && !self.peek_char_and_equals(1, ']')
                && self.peek_char(1).is_some();

            if !is_range {
                token_with_ranges.push(member);
                continue;
            }

            self.next_char(); // consume '-'
            let end_member = self.lex_charset_member()?;
            let range = Location::from_range_pair(&member.range, &end_member.range);

            let (Token::Char(char_start), Token::Char(char_end)) =
                (&member.token, &end_member.token)
            else {
                return Err(CompileError::MessageWithLocation(
                    "Expect a char on both sides of a char range, e.g. \"a-z\".".to_owned(),
                    range,
                ));
            };

            if char_start > char_end {
                return Err(CompileError::MessageWithLocation(
                    format!(
                        "Invalid char range \"{}-{}\", the start char is greater than the end char.",
                        char_start, char_end
                    ),
                    range,
                ));
            }

            token_with_ranges.push(TokenWithRange::new(
                Token::CharRange(*char_start, *char_end),
                range,
            ));
        }

        let charset_end = self.take_token(Token::CharSetEnd, 1);
        token_with_ranges.push(charset_end);

        Ok(token_with_ranges)
    }

    fn lex_charset_member(&mut self) -> Result<TokenWithRange, CompileError> {
        match self.peek_char(0) {
            Some('\\') => self.lex_charset_escaping(),
            Some(c) => Ok(self.take_token(Token::Char(c), 1)),
            None => Err(CompileError::UnexpectedEndOfPattern(
                "Incomplete charset.".to_owned(),
            )),
        }
    }

    fn lex_main_escaping(&mut self) -> Result<TokenWithRange, CompileError> {
        // \xxxx?  //
        // ^    ^__// to here
        // |_______// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '\'

        let escape_char = match self.next_char() {
            Some(c) => c,
            None => {
                // `\` | EOF
                return Err(CompileError::UnexpectedEndOfPattern(
                    "Incomplete escape character sequence.".to_owned(),
                ));
            }
        };

        let token = match escape_char {
            // preset charsets
            'w' | 'W' | 'd' | 'D' | 's' | 'S' => Token::PresetCharSet(escape_char),
            // boundary assertions
            'b' | 'B' => Token::BoundaryAssertion(escape_char),
            'A' => Token::InputStartAssertion,
            'Z' | 'z' => Token::InputEndAssertion,
            // back reference by index, one or two digits
            '1'..='9' => {
                let mut num = escape_char as usize - '0' as usize;
                if let Some(digit) = self.peek_char(0).and_then(|c| c.to_digit(10)) {
                    self.next_char();
                    num = num * 10 + digit as usize;
                }
                Token::BackReferenceNumber(num)
            }
            // back reference by name
            'k' => {
                self.expect_char('<', "angle bracket \"<\" for group name")?;
                let name = self.lex_identifier('>')?;
                Token::BackReferenceIdentifier(name)
            }
            _ => match self.unescape_char(escape_char)? {
                Some(c) => Token::Char(c),
                None => {
                    return Err(CompileError::MessageWithLocation(
                        format!("Unsupported escape char '{}'.", escape_char),
                        Location::from_position_and_length(&self.pop_saved_position(), 2),
                    ));
                }
            },
        };

        let token_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange::new(token, token_range))
    }

    fn lex_charset_escaping(&mut self) -> Result<TokenWithRange, CompileError> {
        // [\xxxx...]  //
        //  ^    ^_____// to here
        //  |__________// current char, validated

        self.push_peek_position();

        self.next_char(); // consume '\'

        let escape_char = match self.next_char() {
            Some(c) => c,
            None => {
                return Err(CompileError::UnexpectedEndOfPattern(
                    "Incomplete escape character sequence.".to_owned(),
                ));
            }
        };

        let token = match escape_char {
            // negative presets are allowed as well, e.g. `[\W\d]`
            'w' | 'W' | 'd' | 'D' | 's' | 'S' => Token::PresetCharSet(escape_char),
            // backspace
            'b' => Token::Char('\u{08}'),
            'B' | 'A' | 'Z' | 'z' => {
                return Err(CompileError::MessageWithLocation(
                    "Assertions are not supported in charset.".to_owned(),
                    Location::from_position_and_length(&self.pop_saved_position(), 2),
                ));
            }
            '1'..='9' | 'k' => {
                return Err(CompileError::MessageWithLocation(
                    "Back references are not supported in charset.".to_owned(),
                    Location::from_position_and_length(&self.pop_saved_position(), 2),
                ));
            }
            _ => match self.unescape_char(escape_char)? {
                Some(c) => Token::Char(c),
                None => {
                    return Err(CompileError::MessageWithLocation(
                        format!("Unsupported escape char '{}' in charset.", escape_char),
                        Location::from_position_and_length(&self.pop_saved_position(), 2),
                    ));
                }
            },
        };

        let token_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange::new(token, token_range))
    }

    // The escapes shared by the main pattern and charsets, the `\` and
    // the `escape_char` are already consumed.
    // Returns None for chars that are not a known escape.
    fn unescape_char(&mut self, escape_char: char) -> Result<Option<char>, CompileError> {
        let c = match escape_char {
            't' => '\t',       // horizontal tabulation
            'n' => '\n',       // line feed
            'r' => '\r',       // carriage return
            'f' => '\u{0C}',   // form feed
            'v' => '\u{0B}',   // vertical tabulation
            'a' => '\u{07}',   // bell
            '0' => '\0',       // null
            'x' => self.unescape_hex(2)?,
            'u' if self.peek_char_and_equals(0, '{') => self.unescape_unicode()?,
            'u' => self.unescape_hex(4)?,
            c if !c.is_ascii_alphanumeric() => c,
            _ => return Ok(None),
        };

        Ok(Some(c))
    }

    fn unescape_hex(&mut self, digit_count: usize) -> Result<char, CompileError> {
        // \xhh?    //
        //   ^ ^____// to here
        //   |______// current char
        //
        // also `\uhhhh`

        self.push_peek_position();

        let mut codepoint_string = String::new();
        for _ in 0..digit_count {
            match self.next_char() {
                Some(c) if c.is_ascii_hexdigit() => codepoint_string.push(c),
                Some(c) => {
                    return Err(CompileError::MessageWithLocation(
                        format!("Invalid character '{}' for hexadecimal escape sequence.", c),
                        self.last_position,
                    ));
                }
                None => {
                    return Err(CompileError::UnexpectedEndOfPattern(format!(
                        "Incomplete hexadecimal escape sequence, expect {} hex digits.",
                        digit_count
                    )));
                }
            }
        }

        let codepoint_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        self.codepoint_to_char(&codepoint_string, codepoint_range)
    }

    fn unescape_unicode(&mut self) -> Result<char, CompileError> {
        // \u{6587}?  //
        //   ^     ^__// to here
        //   |________// current char, validated

        self.push_peek_position();

        self.next_char(); // comsume char '{'

        let mut codepoint_string = String::new();

        loop {
            match self.next_char() {
                Some(previous_char) => match previous_char {
                    '}' => break,
                    '0'..='9' | 'a'..='f' | 'A'..='F' => codepoint_string.push(previous_char),
                    _ => {
                        return Err(CompileError::MessageWithLocation(
                            format!(
                                "Invalid character '{}' for unicode escape sequence.",
                                previous_char
                            ),
                            self.last_position,
                        ));
                    }
                },
                None => {
                    // EOF
                    return Err(CompileError::UnexpectedEndOfPattern(
                        "Incomplete unicode escape sequence.".to_owned(),
                    ));
                }
            }

            if codepoint_string.len() > 6 {
                break;
            }
        }

        let codepoint_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        if codepoint_string.len() > 6 {
            return Err(CompileError::MessageWithLocation(
                "Unicode point code exceeds six digits.".to_owned(),
                codepoint_range,
            ));
        }

        if codepoint_string.is_empty() {
            return Err(CompileError::MessageWithLocation(
                "Empty unicode code point.".to_owned(),
                codepoint_range,
            ));
        }

        self.codepoint_to_char(&codepoint_string, codepoint_range)
    }

    fn codepoint_to_char(
        &self,
        codepoint_string: &str,
        codepoint_range: Location,
    ) -> Result<char, CompileError> {
        // valid code points are 0 to 0x10FFFF excluding the surrogates
        u32::from_str_radix(codepoint_string, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                CompileError::MessageWithLocation(
                    "Invalid unicode code point.".to_owned(),
                    codepoint_range,
                )
            })
    }

    fn lex_number(&mut self) -> Result<usize, CompileError> {
        // 123456N  //
        // ^     ^__// to here
        // |________// current char, validated
        //
        // N = not a number || EOF

        let mut num_string = String::new();

        self.push_peek_position();

        while let Some(current_char) = self.peek_char(0) {
            match current_char {
                '0'..='9' => {
                    num_string.push(current_char);
                    self.next_char(); // consume digit
                }
                _ => {
                    break;
                }
            }
        }

        if num_string.is_empty() {
            return Err(CompileError::MessageWithLocation(
                "Expect a number.".to_owned(),
                self.last_position.move_position_forward(),
            ));
        }

        let num_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        let num = num_string.parse::<usize>().map_err(|_| {
            CompileError::MessageWithLocation(
                format!("Can not convert \"{}\" to integer number.", num_string),
                num_range,
            )
        })?;

        Ok(num)
    }

    fn lex_identifier(&mut self, terminator: char) -> Result<String, CompileError> {
        // name>?  //
        // ^    ^__// to here, the terminator is consumed
        // |_______// current char
        //
        // the terminator is `>` for `<name>` and `)` for `(?P=name)`

        let mut name_string = String::new();

        loop {
            match self.peek_char(0) {
                Some(current_char) if current_char == terminator => {
                    break;
                }
                Some(current_char) if current_char.is_alphanumeric() || current_char == '_' => {
                    if name_string.is_empty() && current_char.is_ascii_digit() {
                        return Err(CompileError::MessageWithLocation(
                            "Group name can not start with a digit.".to_owned(),
                            self.last_position.move_position_forward(),
                        ));
                    }
                    name_string.push(current_char);
                    self.next_char(); // consume char
                }
                Some(current_char) => {
                    return Err(CompileError::MessageWithLocation(
                        format!("Invalid char '{}' for group name.", current_char),
                        self.last_position.move_position_forward(),
                    ));
                }
                None => {
                    return Err(CompileError::UnexpectedEndOfPattern(
                        "Incomplete group name.".to_owned(),
                    ));
                }
            }
        }

        if name_string.is_empty() {
            return Err(CompileError::MessageWithLocation(
                "Expect a group name.".to_owned(),
                self.last_position.move_position_forward(),
            ));
        }

        self.next_char(); // consume the terminator

        Ok(name_string)
    }

    fn lex_group_start(&mut self, at_pattern_start: bool) -> Result<TokenWithRange, CompileError> {
        // (?xxx?  //
        // ^    ^__// to here
        // |_______// current char, validated

        if !self.peek_char_and_equals(1, '?') {
            return Ok(self.take_token(Token::GroupStart, 1));
        }

        self.push_peek_position();

        self.next_char(); // consume '('
        self.next_char(); // consume '?'

        let token = match self.next_char() {
            Some(':') => Token::NonCapturing,
            Some('=') => Token::LookAhead,
            Some('!') => Token::LookAheadNegative,
            Some('<') => match self.peek_char(0) {
                Some('=') => {
                    self.next_char(); // consume '='
                    Token::LookBehind
                }
                Some('!') => {
                    self.next_char(); // consume '!'
                    Token::LookBehindNegative
                }
                _ => Token::NamedCapture(self.lex_identifier('>')?),
            },
            Some('P') => match self.next_char() {
                Some('<') => Token::NamedCapture(self.lex_identifier('>')?),
                Some('=') => Token::BackReferenceIdentifier(self.lex_identifier(')')?),
                Some('>') => {
                    return Err(CompileError::MessageWithLocation(
                        "Recursive pattern references are not supported.".to_owned(),
                        Location::from_position_and_length(&self.pop_saved_position(), 4),
                    ));
                }
                _ => {
                    return Err(CompileError::MessageWithLocation(
                        "Unknown group type, expect \"(?P<name>\" or \"(?P=name)\".".to_owned(),
                        Location::from_position_and_length(&self.pop_saved_position(), 3),
                    ));
                }
            },
            Some('#') => Token::Comment(self.lex_group_comment()?),
            Some('R' | '&' | '+' | '0'..='9') => {
                return Err(CompileError::MessageWithLocation(
                    "Recursive pattern references are not supported.".to_owned(),
                    Location::from_position_and_length(&self.pop_saved_position(), 3),
                ));
            }
            Some(c @ ('i' | 'm' | 's' | 'x' | '-')) => self.lex_flags(c, at_pattern_start)?,
            Some(c) => {
                return Err(CompileError::MessageWithLocation(
                    format!("Unknown group type \"(?{}\".", c),
                    Location::from_position_and_length(&self.pop_saved_position(), 3),
                ));
            }
            None => {
                return Err(CompileError::UnexpectedEndOfPattern(
                    "Incomplete group, expect the group type after \"(?\".".to_owned(),
                ));
            }
        };

        let token_range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange::new(token, token_range))
    }

    fn lex_group_comment(&mut self) -> Result<String, CompileError> {
        // (?#...)?  //
        //    ^   ^__// to here
        //    |______// current char

        let mut comment_string = String::new();
        loop {
            match self.next_char() {
                Some(')') => break,
                Some(c) => comment_string.push(c),
                None => {
                    return Err(CompileError::UnexpectedEndOfPattern(
                        "Incomplete comment group, expect \")\".".to_owned(),
                    ));
                }
            }
        }
        Ok(comment_string)
    }

    fn lex_flags(
        &mut self,
        first_char: char,
        at_pattern_start: bool,
    ) -> Result<Token, CompileError> {
        // (?im-s:  //
        //   ^    ^_// to here, ':' or ')'
        //   |______// first char, consumed

        let mut modifier = FlagsModifier::default();
        let mut clearing = false;
        let mut current_char = first_char;

        let scoped = loop {
            match current_char {
                ':' => break true,
                ')' => break false,
                '-' if !clearing => clearing = true,
                'i' | 'm' | 's' | 'x' => {
                    if clearing {
                        modifier.clear.push(current_char);
                    } else {
                        modifier.set.push(current_char);
                    }
                }
                _ => {
                    return Err(CompileError::MessageWithLocation(
                        format!("Unknown flag '{}'.", current_char),
                        self.last_position,
                    ));
                }
            }

            current_char = match self.next_char() {
                Some(c) => c,
                None => {
                    return Err(CompileError::UnexpectedEndOfPattern(
                        "Incomplete flag group, expect \":\" or \")\".".to_owned(),
                    ));
                }
            };
        };

        if modifier.set.is_empty() && modifier.clear.is_empty() {
            return Err(CompileError::MessageWithLocation(
                "Expect a flag letter.".to_owned(),
                self.last_position,
            ));
        }

        if modifier.clear.contains(&'x') {
            return Err(CompileError::MessageWithLocation(
                "The verbose flag can not be turned off inline.".to_owned(),
                self.last_position,
            ));
        }

        if modifier.set.contains(&'x') {
            // the verbose mode changes how the rest of the pattern is
            // tokenized, so it is only accepted as `(?x)` at the start
            if scoped || !at_pattern_start {
                return Err(CompileError::MessageWithLocation(
                    "The verbose flag can only be set by \"(?x)\" at the start of the pattern."
                        .to_owned(),
                    self.last_position,
                ));
            }
            self.verbose = true;
            modifier.set.retain(|c| *c != 'x');
        }

        let token = if scoped {
            Token::FlagGroup(modifier)
        } else {
            Token::InlineFlags(modifier)
        };

        Ok(token)
    }

    fn is_repetition_ahead(&mut self) -> bool {
        // `{` followed by `m}`, `m,}`, `,n}`, `m,n}` or `,}`

        let mut offset = 1;
        let mut digit_count = 0;
        while matches!(self.peek_char(offset), Some('0'..='9')) {
            offset += 1;
            digit_count += 1;
        }

        if self.peek_char_and_equals(offset, ',') {
            offset += 1;
            while matches!(self.peek_char(offset), Some('0'..='9')) {
                offset += 1;
            }
        } else if digit_count == 0 {
            return false;
        }

        self.peek_char_and_equals(offset, '}')
    }

    fn lex_repetition(&mut self) -> Result<TokenWithRange, CompileError> {
        // {...}?  //
        // ^    ^__// to here
        // |_______// from here, validated by `is_repetition_ahead`

        self.push_peek_position();

        self.next_char(); // consume '{'

        let from = if matches!(self.peek_char(0), Some('0'..='9')) {
            Some(self.lex_number()?)
        } else {
            None
        };

        let repetition = if self.peek_char_and_equals(0, ',') {
            self.next_char(); // consume ','
            if self.peek_char_and_equals(0, '}') {
                Repetition::AtLeast(from.unwrap_or(0))
            } else {
                let to = self.lex_number()?;
                Repetition::Range(from.unwrap_or(0), to)
            }
        } else {
            Repetition::Specified(from.unwrap_or(0))
        };

        self.expect_char('}', "right brace \"}\"")?;

        let lazy = if self.peek_char_and_equals(0, '?') {
            self.next_char(); // consume '?'
            true
        } else {
            false
        };

        let token = Token::Repetition(repetition, lazy);
        let range = Location::from_position_pair_with_end_included(
            &self.pop_saved_position(),
            &self.last_position,
        );

        Ok(TokenWithRange { token, range })
    }
}
