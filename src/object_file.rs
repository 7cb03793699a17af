// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::transition::Transition;

pub const MAIN_ROUTE_INDEX: usize = 0;

/// The compiled program.
///
/// The main route (index 0) is the whole pattern, every look-around
/// is compiled into a route of its own.
#[derive(Debug)]
pub struct ObjectFile {
    pub routes: Vec<Route>,

    // indexed by the capture group number, the entry 0 is the whole match.
    pub capture_group_names: Vec<Option<String>>,

    // every counted repetition owns a counter
    pub number_of_counters: usize,

    // the char every match must start with (case-sensitive),
    // used to skip start positions quickly when searching.
    pub leading_char: Option<char>,
}

/// A route is a graph of nodes connected by transitions.
#[derive(Debug)]
pub struct Route {
    pub nodes: Vec<Node>,
    pub start_node_index: usize,
    pub end_node_index: usize,

    // a route that starts with `^` (start of input) can only match
    // at the position 0, there is no need to try the other positions.
    pub is_fixed_start_position: bool,
}

#[derive(Debug)]
pub struct Node {
    pub transition_items: Vec<TransitionItem>,
}

#[derive(Debug)]
pub struct TransitionItem {
    pub transition: Transition,
    pub target_node_index: usize,
}

impl ObjectFile {
    pub fn new(capture_group_names: Vec<Option<String>>) -> Self {
        ObjectFile {
            routes: vec![],
            capture_group_names,
            number_of_counters: 0,
            leading_char: None,
        }
    }

    pub fn create_route(&mut self) -> usize {
        let route = Route {
            nodes: vec![],
            start_node_index: 0,
            end_node_index: 0,
            is_fixed_start_position: false,
        };
        let idx = self.routes.len();
        self.routes.push(route);
        idx
    }

    pub fn create_counter(&mut self) -> usize {
        let idx = self.number_of_counters;
        self.number_of_counters += 1;
        idx
    }

    pub fn get_capture_group_name_by_index(&self, index: usize) -> Option<&str> {
        self.capture_group_names
            .get(index)
            .and_then(|name| name.as_deref())
    }

    pub fn get_capture_group_index_by_name(&self, name: &str) -> Option<usize> {
        self.capture_group_names
            .iter()
            .position(|item| item.as_deref() == Some(name))
    }

    pub fn get_debug_text(&self) -> String {
        let mut lines = vec![];

        if self.routes.len() == 1 {
            lines.push(self.routes[0].get_debug_text());
        } else {
            for (route_index, route) in self.routes.iter().enumerate() {
                lines.push(format!("= ${}", route_index));
                lines.push(route.get_debug_text());
            }
        }

        for (capture_group_index, name) in self.capture_group_names.iter().enumerate() {
            match name {
                Some(s) => lines.push(format!("# {{{}}}, {}", capture_group_index, s)),
                None => lines.push(format!("# {{{}}}", capture_group_index)),
            }
        }

        lines.join("\n")
    }
}

impl Route {
    pub fn create_node(&mut self) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            transition_items: vec![],
        });
        idx
    }

    pub fn create_transition_item(
        &mut self,
        source_node_index: usize,
        target_node_index: usize,
        transition: Transition,
    ) {
        self.nodes[source_node_index]
            .transition_items
            .push(TransitionItem {
                transition,
                target_node_index,
            });
    }

    pub fn get_debug_text(&self) -> String {
        let mut lines = vec![];

        for (node_index, node) in self.nodes.iter().enumerate() {
            let prefix = if node_index == self.start_node_index {
                '>'
            } else if node_index == self.end_node_index {
                '<'
            } else {
                '-'
            };

            lines.push(format!("{} {}", prefix, node_index));

            for item in &node.transition_items {
                lines.push(format!(
                    "  -> {}, {}",
                    item.target_node_index, item.transition
                ));
            }
        }

        lines.join("\n")
    }
}
