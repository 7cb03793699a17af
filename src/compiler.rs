// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::{
    ast::{AnchorKind, CharClass, LookAroundKind, Node, Pattern},
    error::CompileError,
    flags::Flags,
    location::Location,
    object_file::{ObjectFile, Route},
    rulechecker::{get_match_length, MatchLength},
    transition::{
        AnchorAssertionTransition, AnyCharTransition, BackReferenceTransition,
        BoundaryAssertionTransition, CaptureEndTransition, CaptureStartTransition,
        CharSetTransition, CharTransition, CounterCheckTransition, CounterResetTransition,
        JumpTransition, LookAheadAssertionTransition, LookBehindAssertionTransition,
        RepetitionTransition, Transition,
    },
};

/// Compile from regular expression.
pub fn compile_from_str(s: &str, flags: &Flags) -> Result<ObjectFile, CompileError> {
    let pattern = crate::traditional::parse_from_str(s, flags)?;
    compile(&pattern)
}

/// Compile from AST `Pattern`.
pub fn compile(pattern: &Pattern) -> Result<ObjectFile, CompileError> {
    let mut object_file = ObjectFile::new(pattern.capture_group_names.clone());
    let mut compiler = Compiler::new(pattern, &mut object_file);
    compiler.compile()?;

    object_file.leading_char = get_leading_char(&pattern.node);
    Ok(object_file)
}

pub struct Compiler<'a> {
    // The AST
    pattern: &'a Pattern,

    // The compilation target
    object_file: &'a mut ObjectFile,

    // Index of the current route
    current_route_index: usize,
}

impl<'a> Compiler<'a> {
    fn new(pattern: &'a Pattern, object_file: &'a mut ObjectFile) -> Self {
        let current_route_index = object_file.create_route();
        Compiler {
            pattern,
            object_file,
            current_route_index,
        }
    }

    fn get_current_route_ref_mut(&mut self) -> &mut Route {
        &mut self.object_file.routes[self.current_route_index]
    }

    fn compile(&mut self) -> Result<(), CompileError> {
        self.emit_pattern(self.pattern)
    }

    fn emit_pattern(&mut self, pattern: &Pattern) -> Result<(), CompileError> {
        // The whole pattern is wrapped by the capture group 0.
        //
        //                    pattern
        //   capture start   component      capture end
        //        trans    /-----------\    trans
        //  ==o==---------==o in  out o==--------==o==
        // in |            \-----------/           | out
        //    |                                    |
        //    \-------------- route ---------------/

        let pattern_component = self.emit_node(&pattern.node)?;

        let route = self.get_current_route_ref_mut();
        let in_node_index = route.create_node();
        let out_node_index = route.create_node();

        route.create_transition_item(
            in_node_index,
            pattern_component.in_node_index,
            Transition::CaptureStart(CaptureStartTransition {
                capture_group_index: 0,
            }),
        );

        route.create_transition_item(
            pattern_component.out_node_index,
            out_node_index,
            Transition::CaptureEnd(CaptureEndTransition {
                capture_group_index: 0,
            }),
        );

        route.start_node_index = in_node_index;
        route.end_node_index = out_node_index;
        route.is_fixed_start_position = is_anchored_at_start(&pattern.node);

        Ok(())
    }

    /// Compile a node to a component
    fn emit_node(&mut self, node: &Node) -> Result<Component, CompileError> {
        let component = match node {
            Node::Literal {
                character,
                ignore_case,
            } => self.emit_single_transition(Transition::Char(CharTransition::new(
                *character,
                *ignore_case,
            ))),
            Node::AnyChar { dot_all } => {
                self.emit_single_transition(Transition::AnyChar(AnyCharTransition {
                    dot_all: *dot_all,
                }))
            }
            Node::CharClass(class) => self.emit_charset(class),
            Node::Concat(nodes) => self.emit_concat(nodes)?,
            Node::Alternation(nodes) => self.emit_alternation(nodes)?,
            Node::Group {
                inner,
                capture_index,
                ..
            } => match capture_index {
                Some(index) => self.emit_capture_group(inner, *index)?,
                // a non-capturing group only changes the precedence
                None => self.emit_node(inner)?,
            },
            Node::Quantifier {
                inner,
                min,
                max,
                greedy,
            } => self.emit_quantifier(inner, *min, *max, *greedy)?,
            Node::Anchor(kind) => self.emit_single_transition(Transition::AnchorAssertion(
                AnchorAssertionTransition { kind: *kind },
            )),
            Node::WordBoundary { negated } => self.emit_single_transition(
                Transition::BoundaryAssertion(BoundaryAssertionTransition { negated: *negated }),
            ),
            Node::Backreference {
                capture_index,
                ignore_case,
            } => self.emit_single_transition(Transition::BackReference(
                BackReferenceTransition {
                    capture_group_index: *capture_index,
                    ignore_case: *ignore_case,
                },
            )),
            Node::LookAround { kind, inner } => self.emit_look_around(*kind, inner)?,
        };

        Ok(component)
    }

    fn emit_single_transition(&mut self, transition: Transition) -> Component {
        let route = self.get_current_route_ref_mut();
        let in_node_index = route.create_node();
        let out_node_index = route.create_node();

        route.create_transition_item(in_node_index, out_node_index, transition);
        Component::new(in_node_index, out_node_index)
    }

    fn emit_charset(&mut self, class: &CharClass) -> Component {
        self.emit_single_transition(Transition::CharSet(CharSetTransition {
            class: class.clone(),
        }))
    }

    /// Short-cut component.
    fn emit_empty(&mut self) -> Component {
        self.emit_single_transition(Transition::Jump(JumpTransition))
    }

    fn emit_concat(&mut self, nodes: &[Node]) -> Result<Component, CompileError> {
        // Compile each node into a component and connect adjacent components
        // using "jump transitions".
        //
        //     prev component  jump      next component
        //     /-----------\   trans    /-----------\
        // ====o in  out o==----------==o in  out o======
        //  |  \-----------/            \-----------/  |
        //  |                                          |
        //  \--------------- component ----------------/

        let mut components = vec![];
        for node in nodes {
            components.push(self.emit_node(node)?);
        }

        let (first, last) = match (components.first(), components.last()) {
            (Some(first), Some(last)) => (first.in_node_index, last.out_node_index),
            _ => return Ok(self.emit_empty()),
        };

        let route = self.get_current_route_ref_mut();
        for pair in components.windows(2) {
            route.create_transition_item(
                pair[0].out_node_index,
                pair[1].in_node_index,
                Transition::Jump(JumpTransition),
            );
        }

        Ok(Component::new(first, last))
    }

    fn emit_alternation(&mut self, nodes: &[Node]) -> Result<Component, CompileError> {
        // The branches are tried in order.
        //
        //                  branch 0
        //         jump   /-----------\   jump
        //      /--------==o in  out o==--------\
        //  in  |         \-----------/         |  out
        // ==o--|                               |--o==
        //   |  |           branch 1            |  |
        //   |  |         /-----------\         |  |
        //   |  |--------==o in  out o==--------|  |
        //   |  |         \-----------/         |  |
        //   |  |               ...             |  |
        //   |                                     |
        //   \-------------- component ------------/

        let mut components = vec![];
        for node in nodes {
            components.push(self.emit_node(node)?);
        }

        let route = self.get_current_route_ref_mut();
        let in_node_index = route.create_node();
        let out_node_index = route.create_node();

        for component in &components {
            route.create_transition_item(
                in_node_index,
                component.in_node_index,
                Transition::Jump(JumpTransition),
            );

            route.create_transition_item(
                component.out_node_index,
                out_node_index,
                Transition::Jump(JumpTransition),
            );
        }

        Ok(Component::new(in_node_index, out_node_index))
    }

    fn emit_capture_group(
        &mut self,
        inner: &Node,
        capture_group_index: usize,
    ) -> Result<Component, CompileError> {
        let component = self.emit_node(inner)?;

        //   capture start   component    capture end
        //        trans    /-----------\    trans
        //  ==o==---------==o in  out o==--------==o==
        // in |            \-----------/           | out
        //    |                                    |
        //    \-------------- component -----------/

        let route = self.get_current_route_ref_mut();
        let in_node_index = route.create_node();
        let out_node_index = route.create_node();

        route.create_transition_item(
            in_node_index,
            component.in_node_index,
            Transition::CaptureStart(CaptureStartTransition {
                capture_group_index,
            }),
        );

        route.create_transition_item(
            component.out_node_index,
            out_node_index,
            Transition::CaptureEnd(CaptureEndTransition {
                capture_group_index,
            }),
        );

        Ok(Component::new(in_node_index, out_node_index))
    }

    fn emit_quantifier(
        &mut self,
        inner: &Node,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    ) -> Result<Component, CompileError> {
        match (min, max) {
            (0, Some(0)) => Ok(self.emit_empty()),
            (1, Some(1)) => self.emit_node(inner),
            (0, Some(1)) => {
                let component = self.emit_node(inner)?;
                Ok(self.continue_emit_optional(component, greedy))
            }
            _ => self.emit_repetition(inner, min, max, greedy),
        }
    }

    fn continue_emit_optional(&mut self, component: Component, greedy: bool) -> Component {
        // for greedy optional:
        //
        //                 component
        //   in     jmp  /-----------\  jmp
        //  ==o|o==-----==o in  out o==---==o==
        //     |o==\     \-----------/      ^ out
        //         |                        |
        //         \------------------------/
        //                jump trans
        //
        // for lazy optional the jump that skips the component comes first.

        let route = self.get_current_route_ref_mut();
        let in_node_index = route.create_node();
        let out_node_index = route.create_node();

        if !greedy {
            route.create_transition_item(
                in_node_index,
                out_node_index,
                Transition::Jump(JumpTransition),
            );
        }

        route.create_transition_item(
            in_node_index,
            component.in_node_index,
            Transition::Jump(JumpTransition),
        );

        route.create_transition_item(
            component.out_node_index,
            out_node_index,
            Transition::Jump(JumpTransition),
        );

        if greedy {
            route.create_transition_item(
                in_node_index,
                out_node_index,
                Transition::Jump(JumpTransition),
            );
        }

        Component::new(in_node_index, out_node_index)
    }

    fn emit_repetition(
        &mut self,
        inner: &Node,
        min: usize,
        max: Option<usize>,
        greedy: bool,
    ) -> Result<Component, CompileError> {
        // for greedy repetition:
        //
        //                 repetition trans
        //          /--------------------------------\
        //          |                                |
        //          |        /-----------\   jump    v
        //          |       =o in  out o==-------\   |
        //          |        \-----------/       |   |
        //   in     |                            v   |      out
        //  ==o==---------------------------==o|o==/   /---==o==
        //        ^ counter            left    |o==----/  ^
        //        | reset trans                           | counter check
        //                                                  trans
        //
        // for lazy repetition the "counter check" transition of
        // the left node comes first.
        //
        // The "repetition" transition increases the counter, it fails when
        // the maximum is reached, or when the minimum is reached and the
        // last iteration consumed nothing. The "counter check" transition
        // fails while the minimum is not reached.

        let component = self.emit_node(inner)?;
        let counter_index = self.object_file.create_counter();

        let route = self.get_current_route_ref_mut();
        let in_node_index = route.create_node();
        let left_node_index = route.create_node();
        let out_node_index = route.create_node();

        route.create_transition_item(
            in_node_index,
            left_node_index,
            Transition::CounterReset(CounterResetTransition { counter_index }),
        );

        let repetition_transition = Transition::Repetition(RepetitionTransition {
            counter_index,
            min,
            max,
        });

        let counter_check_transition =
            Transition::CounterCheck(CounterCheckTransition { counter_index, min });

        if greedy {
            route.create_transition_item(
                left_node_index,
                component.in_node_index,
                repetition_transition,
            );
            route.create_transition_item(left_node_index, out_node_index, counter_check_transition);
        } else {
            route.create_transition_item(left_node_index, out_node_index, counter_check_transition);
            route.create_transition_item(
                left_node_index,
                component.in_node_index,
                repetition_transition,
            );
        }

        route.create_transition_item(
            component.out_node_index,
            left_node_index,
            Transition::Jump(JumpTransition),
        );

        Ok(Component::new(in_node_index, out_node_index))
    }

    fn emit_look_around(
        &mut self,
        kind: LookAroundKind,
        inner: &Node,
    ) -> Result<Component, CompileError> {
        //         | look-around
        //  in     v trans        out
        // ==o==-----------------==o==
        //
        // The inner node is compiled into a sub-route, which is
        // run by the look-around transition.

        let match_length_in_char = if kind.is_behind() {
            match get_match_length(inner) {
                MatchLength::Fixed(length) => length,
                // the parser rejects these already, only an AST built by
                // hand can get here, and it has no source location.
                MatchLength::Variable => {
                    return Err(CompileError::VariableWidthLookbehind(Location::default()))
                }
            }
        } else {
            0
        };

        // 1. save the current route index
        // 2. create new route
        let saved_route_index = self.current_route_index;
        let sub_route_index = self.object_file.create_route();

        // 3. switch to the new route
        self.current_route_index = sub_route_index;

        {
            let sub_component = self.emit_node(inner)?;

            // update the sub-route
            let sub_route = self.get_current_route_ref_mut();
            sub_route.start_node_index = sub_component.in_node_index;
            sub_route.end_node_index = sub_component.out_node_index;
            sub_route.is_fixed_start_position = true;
        }

        // 4. restore to the previous route
        self.current_route_index = saved_route_index;

        let negative = kind.is_negative();
        let transition = if kind.is_behind() {
            Transition::LookBehindAssertion(LookBehindAssertionTransition {
                route_index: sub_route_index,
                negative,
                match_length_in_char,
            })
        } else {
            Transition::LookAheadAssertion(LookAheadAssertionTransition {
                route_index: sub_route_index,
                negative,
            })
        };

        Ok(self.emit_single_transition(transition))
    }
}

// A component is a pair of input node and output node.
struct Component {
    in_node_index: usize,
    out_node_index: usize,
}

impl Component {
    fn new(in_node_index: usize, out_node_index: usize) -> Self {
        Component {
            in_node_index,
            out_node_index,
        }
    }
}

// Whether every match has to start at the position 0.
fn is_anchored_at_start(node: &Node) -> bool {
    match node {
        Node::Anchor(AnchorKind::StartOfInput) => true,
        Node::Concat(nodes) => nodes.first().is_some_and(is_anchored_at_start),
        Node::Group { inner, .. } => is_anchored_at_start(inner),
        Node::Alternation(nodes) => nodes.iter().all(is_anchored_at_start),
        _ => false,
    }
}

// The char every match starts with, if there is one.
// Case-insensitive literals are not considered.
fn get_leading_char(node: &Node) -> Option<char> {
    match node {
        Node::Literal {
            character,
            ignore_case: false,
        } => Some(*character),
        Node::Concat(nodes) => {
            // zero-width assertions do not move the position
            let first = nodes.iter().find(|item| !item.is_zero_width_assertion())?;
            get_leading_char(first)
        }
        Node::Alternation(nodes) => {
            let mut chars = nodes.iter().map(get_leading_char);
            let first = chars.next()??;
            if chars.all(|item| item == Some(first)) {
                Some(first)
            } else {
                None
            }
        }
        Node::Group { inner, .. } => get_leading_char(inner),
        Node::Quantifier { inner, min, .. } if *min > 0 => get_leading_char(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::{assert_eq, assert_str_eq};

    use crate::{
        ast::{LookAroundKind, Node, Pattern},
        error::CompileError,
        flags::Flags,
        object_file::ObjectFile,
    };

    use super::{compile, compile_from_str};

    fn compile_text(s: &str) -> String {
        compile_from_str(s, &Flags::new()).unwrap().get_debug_text()
    }

    fn compile_object_file(s: &str) -> ObjectFile {
        compile_from_str(s, &Flags::new()).unwrap()
    }

    #[test]
    fn test_compile_char() {
        assert_str_eq!(
            compile_text("a"),
            "\
- 0
  -> 1, Char 'a'
- 1
  -> 3, Capture end {0}
> 2
  -> 0, Capture start {0}
< 3
# {0}"
        );

        assert_str_eq!(
            compile_text("(?i)A."),
            "\
- 0
  -> 1, Char 'a', ignore case
- 1
  -> 2, Jump
- 2
  -> 3, Any char
- 3
  -> 5, Capture end {0}
> 4
  -> 0, Capture start {0}
< 5
# {0}"
        );
    }

    #[test]
    fn test_compile_charset() {
        assert_str_eq!(
            compile_text(r#"[^\d_x-z]"#),
            "\
- 0
  -> 1, Charset !['0'..'9', '_', 'x'..'z']
- 1
  -> 3, Capture end {0}
> 2
  -> 0, Capture start {0}
< 3
# {0}"
        );
    }

    #[test]
    fn test_compile_alternation() {
        assert_str_eq!(
            compile_text("a|b"),
            "\
- 0
  -> 1, Char 'a'
- 1
  -> 5, Jump
- 2
  -> 3, Char 'b'
- 3
  -> 5, Jump
- 4
  -> 0, Jump
  -> 2, Jump
- 5
  -> 7, Capture end {0}
> 6
  -> 4, Capture start {0}
< 7
# {0}"
        );
    }

    #[test]
    fn test_compile_capture_group() {
        assert_str_eq!(
            compile_text("(?P<x>a)"),
            "\
- 0
  -> 1, Char 'a'
- 1
  -> 3, Capture end {1}
- 2
  -> 0, Capture start {1}
- 3
  -> 5, Capture end {0}
> 4
  -> 2, Capture start {0}
< 5
# {0}
# {1}, x"
        );
    }

    #[test]
    fn test_compile_optional() {
        assert_str_eq!(
            compile_text("a?"),
            "\
- 0
  -> 1, Char 'a'
- 1
  -> 3, Jump
- 2
  -> 0, Jump
  -> 3, Jump
- 3
  -> 5, Capture end {0}
> 4
  -> 2, Capture start {0}
< 5
# {0}"
        );

        assert_str_eq!(
            compile_text("a??"),
            "\
- 0
  -> 1, Char 'a'
- 1
  -> 3, Jump
- 2
  -> 3, Jump
  -> 0, Jump
- 3
  -> 5, Capture end {0}
> 4
  -> 2, Capture start {0}
< 5
# {0}"
        );
    }

    #[test]
    fn test_compile_repetition() {
        assert_str_eq!(
            compile_text("a{2,5}"),
            "\
- 0
  -> 1, Char 'a'
- 1
  -> 3, Jump
- 2
  -> 3, Counter reset %0
- 3
  -> 0, Repetition %0, from 2 to 5
  -> 4, Counter check %0, at least 2
- 4
  -> 6, Capture end {0}
> 5
  -> 2, Capture start {0}
< 6
# {0}"
        );

        assert_str_eq!(
            compile_text("a+?"),
            "\
- 0
  -> 1, Char 'a'
- 1
  -> 3, Jump
- 2
  -> 3, Counter reset %0
- 3
  -> 4, Counter check %0, at least 1
  -> 0, Repetition %0, from 1 to MAX
- 4
  -> 6, Capture end {0}
> 5
  -> 2, Capture start {0}
< 6
# {0}"
        );

        // every repetition owns a counter
        assert_eq!(compile_object_file("(?:a*b)+c{3}").number_of_counters, 3);
        assert_eq!(compile_object_file("a?b{1}").number_of_counters, 0);
    }

    #[test]
    fn test_compile_look_around() {
        assert_str_eq!(
            compile_text("(?<=b)a"),
            "\
= $0
- 0
  -> 1, Look behind $1, match length 1
- 1
  -> 2, Jump
- 2
  -> 3, Char 'a'
- 3
  -> 5, Capture end {0}
> 4
  -> 0, Capture start {0}
< 5
= $1
> 0
  -> 1, Char 'b'
< 1
# {0}"
        );

        assert_str_eq!(
            compile_text("(?!xy)"),
            "\
= $0
- 0
  -> 1, Look ahead negative $1
- 1
  -> 3, Capture end {0}
> 2
  -> 0, Capture start {0}
< 3
= $1
> 0
  -> 1, Char 'x'
- 1
  -> 2, Jump
- 2
  -> 3, Char 'y'
< 3
# {0}"
        );
    }

    #[test]
    fn test_compile_variable_width_look_behind() {
        // an AST that did not come from the parser
        let pattern = Pattern {
            node: Node::LookAround {
                kind: LookAroundKind::BehindPositive,
                inner: Box::new(Node::Quantifier {
                    inner: Box::new(Node::Literal {
                        character: 'a',
                        ignore_case: false,
                    }),
                    min: 1,
                    max: None,
                    greedy: true,
                }),
            },
            capture_group_names: vec![None],
        };

        assert!(matches!(
            compile(&pattern),
            Err(CompileError::VariableWidthLookbehind(_))
        ));
    }

    #[test]
    fn test_fixed_start_position() {
        assert!(compile_object_file("^ab").routes[0].is_fixed_start_position);
        assert!(compile_object_file(r#"(?:^a|\Ab)"#).routes[0].is_fixed_start_position);
        assert!(!compile_object_file("a^").routes[0].is_fixed_start_position);
        assert!(!compile_object_file("(?m)^a").routes[0].is_fixed_start_position);
        assert!(!compile_object_file("^a|b").routes[0].is_fixed_start_position);
    }

    #[test]
    fn test_leading_char() {
        assert_eq!(compile_object_file("abc").leading_char, Some('a'));
        assert_eq!(compile_object_file(r#"\b(?:x+|xy)"#).leading_char, Some('x'));
        assert_eq!(compile_object_file("(?<=a)b").leading_char, Some('b'));
        assert_eq!(compile_object_file("a*b").leading_char, None);
        assert_eq!(compile_object_file("(?i)a").leading_char, None);
        assert_eq!(compile_object_file("a|b").leading_char, None);
        assert_eq!(compile_object_file("()a").leading_char, None);
        assert_eq!(compile_object_file("").leading_char, None);
    }
}
