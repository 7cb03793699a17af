// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use super::token::{Token, TokenWithRange};

// Filters out comments and verbose-mode whitespace.
pub fn clean(tokens: Vec<TokenWithRange>) -> Vec<TokenWithRange> {
    tokens
        .into_iter()
        .filter(|e| {
            !matches!(
                e,
                TokenWithRange {
                    token: Token::Comment(_) | Token::Whitespace,
                    ..
                }
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        error::CompileError,
        location::Location,
        traditional::{
            lexer::lex_from_str,
            token::{Repetition, Token, TokenWithRange},
        },
    };

    use super::clean;

    fn clean_and_lex_from_str(s: &str, verbose: bool) -> Result<Vec<TokenWithRange>, CompileError> {
        let tokens = lex_from_str(s, verbose)?;
        Ok(clean(tokens))
    }

    fn clean_and_lex_from_str_without_location(
        s: &str,
        verbose: bool,
    ) -> Result<Vec<Token>, CompileError> {
        let tokens = clean_and_lex_from_str(s, verbose)?
            .into_iter()
            .map(|e| e.token)
            .collect::<Vec<Token>>();
        Ok(tokens)
    }

    #[test]
    fn test_clean_comments() {
        assert_eq!(
            clean_and_lex_from_str_without_location(
                r#"
                \d{4}   # year
                -
                \d{2}   # month
                "#,
                true
            )
            .unwrap(),
            vec![
                Token::PresetCharSet('d'),
                Token::Repetition(Repetition::Specified(4), false),
                Token::Char('-'),
                Token::PresetCharSet('d'),
                Token::Repetition(Repetition::Specified(2), false),
            ]
        );

        // group comments are removed in the normal mode too
        assert_eq!(
            clean_and_lex_from_str("a(?#x)b", false).unwrap(),
            vec![
                TokenWithRange::from_position_and_length(
                    Token::Char('a'),
                    &Location::new_position(0, 0, 0),
                    1
                ),
                TokenWithRange::from_position_and_length(
                    Token::Char('b'),
                    &Location::new_position(6, 0, 6),
                    1
                ),
            ]
        );

        // whitespace is significant without the verbose flag
        assert_eq!(
            clean_and_lex_from_str_without_location("a b", false).unwrap(),
            vec![Token::Char('a'), Token::Char(' '), Token::Char('b')]
        );
    }
}
