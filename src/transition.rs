// Copyright (c) 2024 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use std::fmt::Display;

use crate::{
    ast::{fold_case, is_word_char, AnchorKind, CharClass},
    context::{Context, Counter},
    error::MatchError,
    object_file::ObjectFile,
    process::start_sub_route,
    utf8reader::{get_position_by_chars_backward, read_char, read_previous_char},
};

#[derive(Debug)]
pub enum Transition {
    Jump(JumpTransition),
    Char(CharTransition),
    AnyChar(AnyCharTransition),
    CharSet(CharSetTransition),
    BackReference(BackReferenceTransition),
    AnchorAssertion(AnchorAssertionTransition),
    BoundaryAssertion(BoundaryAssertionTransition),

    // capture
    CaptureStart(CaptureStartTransition),
    CaptureEnd(CaptureEndTransition),

    // repetition
    CounterReset(CounterResetTransition),
    Repetition(RepetitionTransition),
    CounterCheck(CounterCheckTransition),

    // look-around
    LookAheadAssertion(LookAheadAssertionTransition),
    LookBehindAssertion(LookBehindAssertionTransition),
}

#[derive(Debug)]
pub struct JumpTransition;

#[derive(Debug)]
pub struct CharTransition {
    // folded already when `ignore_case` is set
    pub character: char,
    pub ignore_case: bool,
}

#[derive(Debug)]
pub struct AnyCharTransition {
    pub dot_all: bool,
}

#[derive(Debug)]
pub struct CharSetTransition {
    pub class: CharClass,
}

#[derive(Debug)]
pub struct BackReferenceTransition {
    pub capture_group_index: usize,
    pub ignore_case: bool,
}

#[derive(Debug)]
pub struct AnchorAssertionTransition {
    pub kind: AnchorKind,
}

#[derive(Debug)]
pub struct BoundaryAssertionTransition {
    pub negated: bool,
}

#[derive(Debug)]
pub struct CaptureStartTransition {
    pub capture_group_index: usize,
}

#[derive(Debug)]
pub struct CaptureEndTransition {
    pub capture_group_index: usize,
}

#[derive(Debug)]
pub struct CounterResetTransition {
    pub counter_index: usize,
}

// Enters one more iteration of the repetition body.
#[derive(Debug)]
pub struct RepetitionTransition {
    pub counter_index: usize,
    pub min: usize,
    pub max: Option<usize>,
}

// Leaves the repetition.
#[derive(Debug)]
pub struct CounterCheckTransition {
    pub counter_index: usize,
    pub min: usize,
}

#[derive(Debug)]
pub struct LookAheadAssertionTransition {
    pub route_index: usize,
    pub negative: bool,
}

#[derive(Debug)]
pub struct LookBehindAssertionTransition {
    pub route_index: usize,
    pub negative: bool,
    pub match_length_in_char: usize,
}

impl CharTransition {
    pub fn new(character: char, ignore_case: bool) -> Self {
        let character = if ignore_case {
            fold_case(character)
        } else {
            character
        };

        CharTransition {
            character,
            ignore_case,
        }
    }
}

impl Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Jump(_) => f.write_str("Jump"),
            Transition::Char(t) => {
                if t.ignore_case {
                    write!(f, "Char {:?}, ignore case", t.character)
                } else {
                    write!(f, "Char {:?}", t.character)
                }
            }
            Transition::AnyChar(t) => {
                if t.dot_all {
                    f.write_str("Any char, dot all")
                } else {
                    f.write_str("Any char")
                }
            }
            Transition::CharSet(t) => {
                let items: Vec<String> = t
                    .class
                    .ranges
                    .iter()
                    .map(|range| {
                        if range.start == range.end_included {
                            format!("{:?}", range.start)
                        } else {
                            format!("{:?}..{:?}", range.start, range.end_included)
                        }
                    })
                    .collect();

                if t.class.negated {
                    write!(f, "Charset ![{}]", items.join(", "))
                } else {
                    write!(f, "Charset [{}]", items.join(", "))
                }
            }
            Transition::BackReference(t) => {
                if t.ignore_case {
                    write!(
                        f,
                        "Back reference {{{}}}, ignore case",
                        t.capture_group_index
                    )
                } else {
                    write!(f, "Back reference {{{}}}", t.capture_group_index)
                }
            }
            Transition::AnchorAssertion(t) => {
                let name = match t.kind {
                    AnchorKind::StartOfInput => "start",
                    AnchorKind::EndOfInput => "end",
                    AnchorKind::StartOfLine => "line start",
                    AnchorKind::EndOfLine => "line end",
                };
                write!(f, "Assertion \"{}\"", name)
            }
            Transition::BoundaryAssertion(t) => {
                if t.negated {
                    f.write_str("Assertion \"not boundary\"")
                } else {
                    f.write_str("Assertion \"boundary\"")
                }
            }
            Transition::CaptureStart(t) => {
                write!(f, "Capture start {{{}}}", t.capture_group_index)
            }
            Transition::CaptureEnd(t) => write!(f, "Capture end {{{}}}", t.capture_group_index),
            Transition::CounterReset(t) => write!(f, "Counter reset %{}", t.counter_index),
            Transition::Repetition(t) => match t.max {
                Some(max) => write!(
                    f,
                    "Repetition %{}, from {} to {}",
                    t.counter_index, t.min, max
                ),
                None => write!(f, "Repetition %{}, from {} to MAX", t.counter_index, t.min),
            },
            Transition::CounterCheck(t) => {
                write!(f, "Counter check %{}, at least {}", t.counter_index, t.min)
            }
            Transition::LookAheadAssertion(t) => {
                if t.negative {
                    write!(f, "Look ahead negative ${}", t.route_index)
                } else {
                    write!(f, "Look ahead ${}", t.route_index)
                }
            }
            Transition::LookBehindAssertion(t) => {
                if t.negative {
                    write!(
                        f,
                        "Look behind negative ${}, match length {}",
                        t.route_index, t.match_length_in_char
                    )
                } else {
                    write!(
                        f,
                        "Look behind ${}, match length {}",
                        t.route_index, t.match_length_in_char
                    )
                }
            }
        }
    }
}

pub enum CheckResult {
    Success(/* forward bytes */ usize),
    Failure,
}

impl Transition {
    pub fn check(
        &self,
        context: &mut Context,
        object_file: &ObjectFile,
        position: usize,
    ) -> Result<CheckResult, MatchError> {
        let text = context.text;

        let result = match self {
            Transition::Jump(_) => CheckResult::Success(0),
            Transition::Char(transition) => match read_char(text, position) {
                Some((c, length)) => {
                    let c = if transition.ignore_case { fold_case(c) } else { c };
                    if c == transition.character {
                        CheckResult::Success(length)
                    } else {
                        CheckResult::Failure
                    }
                }
                None => CheckResult::Failure,
            },
            Transition::AnyChar(transition) => match read_char(text, position) {
                Some((c, length)) if transition.dot_all || c != '\n' => {
                    CheckResult::Success(length)
                }
                _ => CheckResult::Failure,
            },
            Transition::CharSet(transition) => match read_char(text, position) {
                Some((c, length)) if transition.class.contains(c) => CheckResult::Success(length),
                _ => CheckResult::Failure,
            },
            Transition::BackReference(transition) => {
                // a group that has not captured anything never matches
                match context.match_ranges[transition.capture_group_index] {
                    Some(range) => {
                        let captured = &text[range.start..range.end];
                        match match_captured_text(
                            text,
                            position,
                            captured,
                            transition.ignore_case,
                        ) {
                            Some(length) => CheckResult::Success(length),
                            None => CheckResult::Failure,
                        }
                    }
                    None => CheckResult::Failure,
                }
            }
            Transition::AnchorAssertion(transition) => {
                let success = match transition.kind {
                    AnchorKind::StartOfInput => position == 0,
                    AnchorKind::EndOfInput => position == text.len(),
                    AnchorKind::StartOfLine => matches!(
                        read_previous_char(text, position),
                        None | Some(('\n', _))
                    ),
                    AnchorKind::EndOfLine => {
                        matches!(read_char(text, position), None | Some(('\n', _)))
                    }
                };

                if success {
                    CheckResult::Success(0)
                } else {
                    CheckResult::Failure
                }
            }
            Transition::BoundaryAssertion(transition) => {
                if is_word_bound(text, position) ^ transition.negated {
                    CheckResult::Success(0)
                } else {
                    CheckResult::Failure
                }
            }
            Transition::CaptureStart(transition) => {
                context.set_capture_start(transition.capture_group_index, position);
                CheckResult::Success(0)
            }
            Transition::CaptureEnd(transition) => {
                context.set_capture_end(transition.capture_group_index, position);
                CheckResult::Success(0)
            }
            Transition::CounterReset(transition) => {
                context.set_counter(transition.counter_index, Counter::new());
                CheckResult::Success(0)
            }
            Transition::Repetition(transition) => {
                let counter = context.get_counter(transition.counter_index);

                let below_max = match transition.max {
                    Some(max) => counter.count < max,
                    None => true,
                };

                // once the minimum is reached, an iteration that consumed
                // nothing ends the repetition.
                let can_iterate = below_max
                    && (counter.count < transition.min || counter.last_start != position);

                if can_iterate {
                    context.set_counter(
                        transition.counter_index,
                        Counter {
                            count: counter.count + 1,
                            last_start: position,
                        },
                    );
                    CheckResult::Success(0)
                } else {
                    CheckResult::Failure
                }
            }
            Transition::CounterCheck(transition) => {
                let counter = context.get_counter(transition.counter_index);
                if counter.count >= transition.min {
                    CheckResult::Success(0)
                } else {
                    CheckResult::Failure
                }
            }
            Transition::LookAheadAssertion(transition) => {
                let matched =
                    start_sub_route(context, object_file, transition.route_index, position, None)?;

                // assertion should not move the position
                if matched ^ transition.negative {
                    CheckResult::Success(0)
                } else {
                    CheckResult::Failure
                }
            }
            Transition::LookBehindAssertion(transition) => {
                let matched = match get_position_by_chars_backward(
                    text,
                    position,
                    transition.match_length_in_char,
                ) {
                    // the sub-route must end exactly at the current position
                    Some(start) => start_sub_route(
                        context,
                        object_file,
                        transition.route_index,
                        start,
                        Some(position),
                    )?,
                    None => false,
                };

                if matched ^ transition.negative {
                    CheckResult::Success(0)
                } else {
                    CheckResult::Failure
                }
            }
        };

        Ok(result)
    }
}

// Returns the length (in bytes) of the text matched.
fn match_captured_text(
    text: &str,
    position: usize,
    captured: &str,
    ignore_case: bool,
) -> Option<usize> {
    let rest = text.get(position..)?;

    if !ignore_case {
        return if rest.starts_with(captured) {
            Some(captured.len())
        } else {
            None
        };
    }

    let mut length = 0;
    let mut rest_chars = rest.chars();
    for expected in captured.chars() {
        let c = rest_chars.next()?;
        if fold_case(c) != fold_case(expected) {
            return None;
        }
        length += c.len_utf8();
    }

    Some(length)
}

// The edges of the text count as non-word chars.
fn is_word_bound(text: &str, position: usize) -> bool {
    let is_word_before = matches!(read_previous_char(text, position), Some((c, _)) if is_word_char(c));
    let is_word_after = matches!(read_char(text, position), Some((c, _)) if is_word_char(c));
    is_word_before != is_word_after
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{is_word_bound, match_captured_text};

    #[test]
    fn test_is_word_bound() {
        let text = "ab c_";
        assert!(is_word_bound(text, 0));
        assert!(!is_word_bound(text, 1));
        assert!(is_word_bound(text, 2));
        assert!(is_word_bound(text, 3));
        assert!(!is_word_bound(text, 4));
        assert!(is_word_bound(text, 5));

        assert!(!is_word_bound("", 0));
        assert!(!is_word_bound("--", 1));
    }

    #[test]
    fn test_match_captured_text() {
        assert_eq!(match_captured_text("abcabc", 3, "abc", false), Some(3));
        assert_eq!(match_captured_text("abcab", 3, "abc", false), None);
        assert_eq!(match_captured_text("abcABC", 3, "abc", false), None);
        assert_eq!(match_captured_text("abcABC", 3, "abc", true), Some(3));
        assert_eq!(match_captured_text("ж-Ж", 3, "ж", true), Some(2));
        assert_eq!(match_captured_text("abc", 1, "", false), Some(0));
    }
}
