// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Prints the AST back to the pattern syntax.
//
// The output is not the original pattern text (flags are resolved into
// the nodes, escapes are normalized), but compiling it without any flags
// yields an equivalent AST.

use std::fmt::{Display, Write};

use crate::ast::{AnchorKind, CharClass, CharRange, LookAroundKind, Node, Pattern};

fn write_char(f: &mut std::fmt::Formatter<'_>, c: char) -> std::fmt::Result {
    match c {
        '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
        // escaped so that the output is valid in the verbose mode as well
        | ' ' | '#' => {
            write!(f, "\\{}", c)
        }
        _ => write_plain_char(f, c),
    }
}

fn write_class_char(f: &mut std::fmt::Formatter<'_>, c: char) -> std::fmt::Result {
    match c {
        '\\' | ']' | '[' | '^' | '-' => write!(f, "\\{}", c),
        _ => write_plain_char(f, c),
    }
}

fn write_plain_char(f: &mut std::fmt::Formatter<'_>, c: char) -> std::fmt::Result {
    match c {
        '\t' => f.write_str("\\t"),
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        c if c.is_control() => write!(f, "\\u{{{:x}}}", c as u32),
        c => f.write_char(c),
    }
}

impl Display for CharRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_class_char(f, self.start)?;
        if self.start != self.end_included {
            f.write_char('-')?;
            write_class_char(f, self.end_included)?;
        }
        Ok(())
    }
}

impl Display for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char('[')?;
        if self.negated {
            f.write_char('^')?;
        }
        for range in &self.ranges {
            write!(f, "{}", range)?;
        }
        f.write_char(']')
    }
}

impl Display for AnchorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnchorKind::StartOfInput => f.write_str("^"),
            AnchorKind::EndOfInput => f.write_str("$"),
            AnchorKind::StartOfLine => f.write_str("(?m:^)"),
            AnchorKind::EndOfLine => f.write_str("(?m:$)"),
        }
    }
}

impl Display for LookAroundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookAroundKind::AheadPositive => f.write_str("(?="),
            LookAroundKind::AheadNegative => f.write_str("(?!"),
            LookAroundKind::BehindPositive => f.write_str("(?<="),
            LookAroundKind::BehindNegative => f.write_str("(?<!"),
        }
    }
}

// Nodes that have to be wrapped in a non-capturing group before a
// quantifier is appended. Flagged nodes such as `(?i:a)` are atoms already.
fn needs_group_for_quantifier(node: &Node) -> bool {
    match node {
        Node::Concat(nodes) => nodes.len() != 1,
        Node::Alternation(_) | Node::Quantifier { .. } => true,
        _ => false,
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Literal {
                character,
                ignore_case,
            } => {
                if *ignore_case {
                    f.write_str("(?i:")?;
                    write_char(f, *character)?;
                    f.write_char(')')
                } else {
                    write_char(f, *character)
                }
            }
            Node::AnyChar { dot_all } => {
                if *dot_all {
                    f.write_str("(?s:.)")
                } else {
                    f.write_char('.')
                }
            }
            Node::CharClass(class) => write!(f, "{}", class),
            Node::Concat(nodes) => {
                for (idx, node) in nodes.iter().enumerate() {
                    let followed_by_digit = matches!(
                        nodes.get(idx + 1),
                        Some(Node::Literal { character, .. }) if character.is_ascii_digit()
                    );

                    match node {
                        Node::Alternation(_) => write!(f, "(?:{})", node)?,
                        // `\1` followed by `0` would read as `\10`
                        Node::Backreference { .. } if followed_by_digit => {
                            write!(f, "(?:{})", node)?
                        }
                        _ => write!(f, "{}", node)?,
                    }
                }
                Ok(())
            }
            Node::Alternation(nodes) => {
                let branches: Vec<String> = nodes.iter().map(|e| e.to_string()).collect();
                write!(f, "{}", branches.join("|"))
            }
            Node::Group {
                inner,
                capture_index,
                name,
            } => match (capture_index, name) {
                (Some(_), Some(name)) => write!(f, "(?P<{}>{})", name, inner),
                (Some(_), None) => write!(f, "({})", inner),
                (None, _) => write!(f, "(?:{})", inner),
            },
            Node::Quantifier {
                inner,
                min,
                max,
                greedy,
            } => {
                if needs_group_for_quantifier(inner) {
                    write!(f, "(?:{})", inner)?;
                } else {
                    write!(f, "{}", inner)?;
                }

                match (min, max) {
                    (0, None) => f.write_char('*')?,
                    (1, None) => f.write_char('+')?,
                    (0, Some(1)) => f.write_char('?')?,
                    (m, None) => write!(f, "{{{},}}", m)?,
                    (m, Some(n)) if m == n => write!(f, "{{{}}}", m)?,
                    (m, Some(n)) => write!(f, "{{{},{}}}", m, n)?,
                }

                if !greedy {
                    f.write_char('?')?;
                }
                Ok(())
            }
            Node::Anchor(kind) => write!(f, "{}", kind),
            Node::WordBoundary { negated } => {
                if *negated {
                    f.write_str("\\B")
                } else {
                    f.write_str("\\b")
                }
            }
            Node::Backreference {
                capture_index,
                ignore_case,
            } => {
                if *ignore_case {
                    write!(f, "(?i:\\{})", capture_index)
                } else {
                    write!(f, "\\{}", capture_index)
                }
            }
            Node::LookAround { kind, inner } => write!(f, "{}{})", kind, inner),
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.node)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{flags::Flags, traditional::parse_from_str};

    fn print(s: &str, flags: &str) -> String {
        let mut f = Flags::new();
        for letter in flags.chars() {
            f.set_by_letter(letter, true);
        }
        parse_from_str(s, &f).unwrap().to_string()
    }

    #[test]
    fn test_print_pattern() {
        assert_eq!(print(r#"a\.b\d+"#, ""), r#"a\.b[0-9]+"#);
        assert_eq!(print("ab|c|", ""), "ab|c|");
        assert_eq!(print("x(?:a|b)*?", ""), "x(?:a|b)*?");
        assert_eq!(print("(ab){2,}c{1,3}d{4}", ""), "(ab){2,}c{1,3}d{4}");
        assert_eq!(print(r#"(?<year>\d{4})-\1"#, ""), r#"(?P<year>[0-9]{4})-\1"#);
        assert_eq!(print(r#"(a)\1 0"#, "x"), r#"(a)(?:\1)0"#);
        assert_eq!(print(r#"(?<=a)b(?!c)\b$"#, ""), r#"(?<=a)b(?!c)\b$"#);
        assert_eq!(print("[^a-d_]", ""), "[^_a-d]");
        assert_eq!(print(r#"[\]\-^]"#, ""), r#"[\-\]-\^]"#);
        assert_eq!(print("a b\t", ""), r#"a\ b\t"#);
    }

    #[test]
    fn test_print_resolved_flags() {
        assert_eq!(print("a.^", "ims"), "(?i:a)(?s:.)(?m:^)");
        assert_eq!(print("(?i)ab*", ""), "(?i:a)(?i:b)*");
        assert_eq!(print("a b # comment", "x"), "ab");
    }

    #[test]
    fn test_print_and_reparse() {
        for source in [
            r#"^(\w+)\s*=\s*(?:"([^"]*)"|(\d+))$"#,
            r#"(?i)(?P<tag><[a-z]+>).*?(?P=tag)"#,
            r#"(?<!\$)\b\d{1,3}(?:,\d{3})*\b"#,
        ] {
            let pattern = parse_from_str(source, &Flags::new()).unwrap();
            let reparsed = parse_from_str(&pattern.to_string(), &Flags::new()).unwrap();
            assert_eq!(pattern, reparsed);
        }
    }
}
