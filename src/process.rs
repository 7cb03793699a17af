// Copyright (c) 2024 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

use crate::{
    context::{Context, TransitionStackFrame},
    error::MatchError,
    object_file::{ObjectFile, MAIN_ROUTE_INDEX},
    transition::CheckResult,
    utf8reader::next_char_position,
};

/// Runs one match attempt of the main route, anchored at `start`.
///
/// When `required_end` is given, only a match ending exactly there
/// is accepted, other candidates are backtracked like any failure.
/// The captures are left in `context.match_ranges`.
pub fn start_process(
    context: &mut Context,
    object_file: &ObjectFile,
    start: usize,
    required_end: Option<usize>,
) -> Result<bool, MatchError> {
    context.reset();
    start_route(context, object_file, MAIN_ROUTE_INDEX, start, required_end)
}

/// Tries every start position from `start` to the end of the text,
/// the first success wins.
pub fn start_search(
    context: &mut Context,
    object_file: &ObjectFile,
    start: usize,
) -> Result<bool, MatchError> {
    let text = context.text;
    let is_fixed_start_position = object_file.routes[MAIN_ROUTE_INDEX].is_fixed_start_position;
    let mut position = start;

    loop {
        if let Some(c) = object_file.leading_char {
            match find_char(text, position, c) {
                Some(found) => position = found,
                None => return Ok(false),
            }
        }

        if start_process(context, object_file, position, None)? {
            return Ok(true);
        }

        if is_fixed_start_position {
            return Ok(false);
        }

        // move forward one character and try again
        match next_char_position(text, position) {
            Some(next) => position = next,
            None => return Ok(false),
        }
    }
}

/// Runs a look-around route.
///
/// The sub-route sees the captures made so far, but the captures it
/// makes itself are discarded when it returns.
pub fn start_sub_route(
    context: &mut Context,
    object_file: &ObjectFile,
    route_index: usize,
    start: usize,
    required_end: Option<usize>,
) -> Result<bool, MatchError> {
    let undo_log_length = context.get_undo_log_length();
    let matched = start_route(context, object_file, route_index, start, required_end)?;
    context.rollback(undo_log_length);
    Ok(matched)
}

fn start_route(
    context: &mut Context,
    object_file: &ObjectFile,
    route_index: usize,
    start: usize,
    required_end: Option<usize>,
) -> Result<bool, MatchError> {
    let route = &object_file.routes[route_index];

    // frames below the base belong to the outer routes
    let base = context.transition_stack.len();

    append_transition_stack_frames_by_node(
        context,
        object_file,
        route_index,
        route.start_node_index,
        start,
    )?;

    let mut matched = false;

    while context.transition_stack.len() > base {
        let Some(frame) = context.transition_stack.pop() else {
            break;
        };

        // restore the captures and counters of this choice point
        context.rollback(frame.undo_log_length);

        let node = &route.nodes[frame.node_index];
        let transition_item = &node.transition_items[frame.transition_index];
        let target_node_index = transition_item.target_node_index;

        match transition_item
            .transition
            .check(context, object_file, frame.position)?
        {
            CheckResult::Success(move_forward) => {
                let position = frame.position + move_forward;

                if target_node_index == route.end_node_index {
                    if required_end.map_or(true, |end| end == position) {
                        matched = true;
                        break;
                    }

                    context.count_backtrack()?;
                    continue;
                }

                append_transition_stack_frames_by_node(
                    context,
                    object_file,
                    route_index,
                    target_node_index,
                    position,
                )?;
            }
            CheckResult::Failure => {
                context.count_backtrack()?;
            }
        }
    }

    // the remaining choice points of a finished route are dropped,
    // i.e. a look-around is never re-entered by backtracking.
    context.transition_stack.truncate(base);

    Ok(matched)
}

fn append_transition_stack_frames_by_node(
    context: &mut Context,
    object_file: &ObjectFile,
    route_index: usize,
    node_index: usize,
    position: usize,
) -> Result<(), MatchError> {
    let node = &object_file.routes[route_index].nodes[node_index];
    let undo_log_length = context.get_undo_log_length();

    // push in reverse order so that the first transition is checked first
    for transition_index in (0..node.transition_items.len()).rev() {
        context.push_frame(TransitionStackFrame {
            route_index,
            node_index,
            transition_index,
            position,
            undo_log_length,
        })?;
    }

    Ok(())
}

fn find_char(text: &str, start: usize, c: char) -> Option<usize> {
    let rest = text.get(start..)?;
    if c.is_ascii() {
        memchr::memchr(c as u8, rest.as_bytes()).map(|offset| start + offset)
    } else {
        rest.find(c).map(|offset| start + offset)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        compiler::compile_from_str,
        context::{Context, MatchOptions, MatchRange},
        error::MatchError,
        flags::Flags,
        object_file::ObjectFile,
    };

    use super::{find_char, start_process, start_search};

    const OPTIONS: MatchOptions = MatchOptions {
        backtrack_limit: 1_000_000,
        max_stack: 1_000_000,
    };

    fn compile(s: &str) -> ObjectFile {
        compile_from_str(s, &Flags::new()).unwrap()
    }

    fn search(s: &str, text: &str) -> Option<Vec<Option<(usize, usize)>>> {
        let object_file = compile(s);
        let mut context = Context::new(
            text,
            object_file.capture_group_names.len(),
            object_file.number_of_counters,
            OPTIONS,
        );

        if start_search(&mut context, &object_file, 0).unwrap() {
            Some(
                context
                    .match_ranges
                    .iter()
                    .map(|item| item.map(|MatchRange { start, end }| (start, end)))
                    .collect(),
            )
        } else {
            None
        }
    }

    fn search_range(s: &str, text: &str) -> Option<(usize, usize)> {
        search(s, text).and_then(|ranges| ranges[0])
    }

    #[test]
    fn test_process_char() {
        assert_eq!(search_range("a", "xya"), Some((2, 3)));
        assert_eq!(search_range("ab", "aab"), Some((1, 3)));
        assert_eq!(search_range("ab", "ba"), None);
        assert_eq!(search_range("文字", "中文字"), Some((3, 9)));
        assert_eq!(search_range("", "abc"), Some((0, 0)));
    }

    #[test]
    fn test_process_alternation() {
        assert_eq!(search_range("a|ab", "ab"), Some((0, 1)));
        assert_eq!(search_range("ab|a", "ab"), Some((0, 2)));
        assert_eq!(search_range("x(?:a|b|)y", "xy"), Some((0, 2)));
        assert_eq!(search_range("x(?:a|b|)y", "xby"), Some((0, 3)));
    }

    #[test]
    fn test_process_repetition() {
        assert_eq!(search_range("a*", "aaab"), Some((0, 3)));
        assert_eq!(search_range("a*?", "aaab"), Some((0, 0)));
        assert_eq!(search_range("a+?b", "aaab"), Some((0, 4)));
        assert_eq!(search_range("a{2}", "abaaa"), Some((2, 4)));
        assert_eq!(search_range("a{2,3}", "aaaa"), Some((0, 3)));
        assert_eq!(search_range("a{2,3}?", "aaaa"), Some((0, 2)));
        assert_eq!(search_range("a{,2}b", "aaab"), Some((1, 4)));
        assert_eq!(search_range("(?:ab)+c", "abababc"), Some((0, 7)));
        assert_eq!(search_range("colou?r", "color"), Some((0, 5)));
        assert_eq!(search_range("colou??r", "colour"), Some((0, 6)));

        // nested repetitions
        assert_eq!(search_range("(?:a{2})*", "aaaaa"), Some((0, 4)));
        assert_eq!(search_range("(?:a*b)*c", "abaabbc"), Some((0, 7)));
    }

    #[test]
    fn test_process_empty_iteration() {
        assert_eq!(search("(a?)*", ""), Some(vec![Some((0, 0)), Some((0, 0))]));
        assert_eq!(search_range("(?:a*)*b", "aab"), Some((0, 3)));
        assert_eq!(search_range("(?:|a)+", "aa"), Some((0, 0)));
        assert_eq!(search_range("(?:a?){3}x", "ax"), Some((0, 2)));
    }

    #[test]
    fn test_process_capture() {
        assert_eq!(
            search("(a)(b)?c", "ac"),
            Some(vec![Some((0, 2)), Some((0, 1)), None])
        );

        // the last iteration wins
        assert_eq!(
            search("(?:(a)|(b))+", "ab"),
            Some(vec![Some((0, 2)), Some((0, 1)), Some((1, 2))])
        );
        assert_eq!(search("(\\w)+", "abc"), Some(vec![Some((0, 3)), Some((2, 3))]));

        // captures are restored on backtracking
        assert_eq!(
            search("(a+)(a)", "aaa"),
            Some(vec![Some((0, 3)), Some((0, 2)), Some((2, 3))])
        );
    }

    #[test]
    fn test_process_backreference() {
        assert_eq!(search_range(r#"(\w)\1"#, "abccd"), Some((2, 4)));
        assert_eq!(search_range(r#"(a)?b\1"#, "b"), None);
        assert_eq!(search_range(r#"(?i)(a)\1"#, "aA"), Some((0, 2)));
        assert_eq!(search_range(r#"(a)\1"#, "aA"), None);
    }

    #[test]
    fn test_process_anchors() {
        assert_eq!(search_range("^a", "ba"), None);
        assert_eq!(search_range("a$", "ab\na"), Some((3, 4)));
        assert_eq!(search_range("a$", "a\n"), None);
        assert_eq!(search_range("(?m)a$", "a\nb"), Some((0, 1)));
        assert_eq!(search_range("(?m)^b", "a\nb"), Some((2, 3)));
        assert_eq!(search_range(r#"\bis\b"#, "this is"), Some((5, 7)));
        assert_eq!(search_range(r#"\Bis\b"#, "this is"), Some((2, 4)));
    }

    #[test]
    fn test_process_look_around() {
        assert_eq!(search_range("a(?=b)", "acab"), Some((2, 3)));
        assert_eq!(search_range("a(?!b)", "abac"), Some((2, 3)));
        assert_eq!(search_range("(?<=b)a", "abca"), None);
        assert_eq!(search_range("(?<=c)a", "abca"), Some((3, 4)));
        assert_eq!(search_range("(?<!b)a", "baa"), Some((2, 3)));
        assert_eq!(search_range("(?<=文)字", "字文字"), Some((6, 9)));

        // the look-behind can not step back before the start of the text
        assert_eq!(search_range("(?<=ab)c", "bc"), None);
        assert_eq!(search_range("(?<!ab)c", "bc"), Some((1, 2)));

        // captures inside a look-around are discarded
        assert_eq!(
            search("(?=(a))a", "a"),
            Some(vec![Some((0, 1)), None])
        );
    }

    #[test]
    fn test_process_anchored_attempt() {
        let object_file = compile("a|ab");
        let mut context = Context::new("xab", 1, 0, OPTIONS);

        assert!(!start_process(&mut context, &object_file, 0, None).unwrap());
        assert!(start_process(&mut context, &object_file, 1, None).unwrap());
        assert_eq!(context.match_ranges[0], Some(MatchRange { start: 1, end: 2 }));

        // the required end takes part in backtracking
        assert!(start_process(&mut context, &object_file, 1, Some(3)).unwrap());
        assert_eq!(context.match_ranges[0], Some(MatchRange { start: 1, end: 3 }));
    }

    #[test]
    fn test_process_backtrack_limit() {
        let object_file = compile("(?:a*)*b");
        let text = "a".repeat(32);
        let mut context = Context::new(
            &text,
            1,
            object_file.number_of_counters,
            MatchOptions {
                backtrack_limit: 1_000,
                max_stack: 1_000_000,
            },
        );

        assert_eq!(
            start_search(&mut context, &object_file, 0),
            Err(MatchError::BacktrackLimitExceeded)
        );

        let object_file = compile("a*");
        let text = "a".repeat(100);
        let mut context = Context::new(
            &text,
            1,
            object_file.number_of_counters,
            MatchOptions {
                backtrack_limit: 1_000_000,
                max_stack: 10,
            },
        );

        assert_eq!(
            start_search(&mut context, &object_file, 0),
            Err(MatchError::BacktrackLimitExceeded)
        );
    }

    #[test]
    fn test_find_char() {
        assert_eq!(find_char("abcabc", 1, 'a'), Some(3));
        assert_eq!(find_char("abcabc", 4, 'a'), None);
        assert_eq!(find_char("a文b文", 4, '文'), Some(5));
        assert_eq!(find_char("abc", 3, 'a'), None);
    }
}
