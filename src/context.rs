// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::error::MatchError;

/// Limits of a single match attempt.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MatchOptions {
    // the maximum number of failed transitions
    pub backtrack_limit: usize,

    // the maximum number of pending transition frames
    pub max_stack: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize, // excluded
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Counter {
    // the number of iterations entered
    pub count: usize,

    // the position where the last iteration started
    pub last_start: usize,
}

impl Counter {
    pub fn new() -> Self {
        Counter {
            count: 0,
            last_start: usize::MAX,
        }
    }
}

/// A pending transition, i.e. a choice point.
#[derive(Debug, Clone, Copy)]
pub struct TransitionStackFrame {
    pub route_index: usize,
    pub node_index: usize,
    pub transition_index: usize,
    pub position: usize,

    // the state (captures and counters) to restore before
    // this transition is checked.
    pub undo_log_length: usize,
}

/// A reversible change of the state.
#[derive(Debug, Clone, Copy)]
pub enum UndoItem {
    CaptureStart(usize, Option<usize>),
    Capture(usize, Option<MatchRange>),
    Counter(usize, Counter),
}

/// The mutable state of one matching invocation.
///
/// Compiled programs are immutable, everything that changes while
/// matching lives here and is discarded afterwards.
pub struct Context<'a> {
    pub text: &'a str,
    pub options: MatchOptions,

    // the final capture ranges, indexed by the capture group number
    pub match_ranges: Vec<Option<MatchRange>>,

    // the start positions of the capture groups being captured
    capture_starts: Vec<Option<usize>>,

    counters: Vec<Counter>,
    undo_log: Vec<UndoItem>,

    pub transition_stack: Vec<TransitionStackFrame>,
    backtrack_count: usize,
}

impl<'a> Context<'a> {
    pub fn new(
        text: &'a str,
        number_of_capture_groups: usize,
        number_of_counters: usize,
        options: MatchOptions,
    ) -> Self {
        Context {
            text,
            options,
            match_ranges: vec![None; number_of_capture_groups],
            capture_starts: vec![None; number_of_capture_groups],
            counters: vec![Counter::new(); number_of_counters],
            undo_log: vec![],
            transition_stack: vec![],
            backtrack_count: 0,
        }
    }

    /// Clears the state for a new match attempt.
    pub fn reset(&mut self) {
        self.match_ranges.fill(None);
        self.capture_starts.fill(None);
        self.counters.fill(Counter::new());
        self.undo_log.clear();
        self.transition_stack.clear();
        self.backtrack_count = 0;
    }

    pub fn get_undo_log_length(&self) -> usize {
        self.undo_log.len()
    }

    /// Reverts every change made after the undo log had the given length.
    pub fn rollback(&mut self, undo_log_length: usize) {
        while self.undo_log.len() > undo_log_length {
            let Some(item) = self.undo_log.pop() else {
                break;
            };

            match item {
                UndoItem::CaptureStart(idx, previous) => self.capture_starts[idx] = previous,
                UndoItem::Capture(idx, previous) => self.match_ranges[idx] = previous,
                UndoItem::Counter(idx, previous) => self.counters[idx] = previous,
            }
        }
    }

    pub fn set_capture_start(&mut self, capture_group_index: usize, position: usize) {
        let previous = self.capture_starts[capture_group_index];
        self.undo_log
            .push(UndoItem::CaptureStart(capture_group_index, previous));
        self.capture_starts[capture_group_index] = Some(position);
    }

    /// Completes the capture group. A group inside a repetition
    /// keeps the range of its last iteration.
    pub fn set_capture_end(&mut self, capture_group_index: usize, position: usize) {
        let Some(start) = self.capture_starts[capture_group_index] else {
            return;
        };

        let previous = self.match_ranges[capture_group_index];
        self.undo_log
            .push(UndoItem::Capture(capture_group_index, previous));
        self.match_ranges[capture_group_index] = Some(MatchRange {
            start,
            end: position,
        });
    }

    pub fn get_counter(&self, counter_index: usize) -> Counter {
        self.counters[counter_index]
    }

    pub fn set_counter(&mut self, counter_index: usize, counter: Counter) {
        let previous = self.counters[counter_index];
        self.undo_log.push(UndoItem::Counter(counter_index, previous));
        self.counters[counter_index] = counter;
    }

    pub fn push_frame(&mut self, frame: TransitionStackFrame) -> Result<(), MatchError> {
        if self.transition_stack.len() >= self.options.max_stack {
            return Err(MatchError::BacktrackLimitExceeded);
        }
        self.transition_stack.push(frame);
        Ok(())
    }

    /// Records a failed transition.
    pub fn count_backtrack(&mut self) -> Result<(), MatchError> {
        self.backtrack_count += 1;
        if self.backtrack_count > self.options.backtrack_limit {
            Err(MatchError::BacktrackLimitExceeded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::MatchError;

    use super::{Context, Counter, MatchOptions, MatchRange, TransitionStackFrame};

    const OPTIONS: MatchOptions = MatchOptions {
        backtrack_limit: 2,
        max_stack: 1,
    };

    #[test]
    fn test_rollback() {
        let mut context = Context::new("abc", 2, 1, OPTIONS);

        context.set_capture_start(1, 0);
        context.set_capture_end(1, 1);
        let saved = context.get_undo_log_length();

        context.set_capture_start(1, 1);
        context.set_capture_end(1, 3);
        context.set_counter(
            0,
            Counter {
                count: 2,
                last_start: 1,
            },
        );

        assert_eq!(context.match_ranges[1], Some(MatchRange { start: 1, end: 3 }));

        context.rollback(saved);
        assert_eq!(context.match_ranges[1], Some(MatchRange { start: 0, end: 1 }));
        assert_eq!(context.get_counter(0), Counter::new());

        context.rollback(0);
        assert_eq!(context.match_ranges[1], None);
    }

    #[test]
    fn test_capture_end_without_start() {
        let mut context = Context::new("abc", 2, 0, OPTIONS);
        context.set_capture_end(1, 2);
        assert_eq!(context.match_ranges[1], None);
    }

    #[test]
    fn test_limits() {
        let mut context = Context::new("abc", 1, 0, OPTIONS);

        assert_eq!(context.count_backtrack(), Ok(()));
        assert_eq!(context.count_backtrack(), Ok(()));
        assert_eq!(
            context.count_backtrack(),
            Err(MatchError::BacktrackLimitExceeded)
        );

        let frame = TransitionStackFrame {
            route_index: 0,
            node_index: 0,
            transition_index: 0,
            position: 0,
            undo_log_length: 0,
        };
        assert_eq!(context.push_frame(frame), Ok(()));
        assert_eq!(
            context.push_frame(frame),
            Err(MatchError::BacktrackLimitExceeded)
        );

        context.reset();
        assert_eq!(context.count_backtrack(), Ok(()));
        assert_eq!(context.push_frame(frame), Ok(()));
    }
}
