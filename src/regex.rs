// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::{
    fmt::Display,
    ops::{Index, Range},
};

use crate::{
    ast::Pattern,
    compiler::compile,
    context::{Context, MatchOptions, MatchRange},
    error::{CompileError, MatchError, RegexError},
    flags::Flags,
    object_file::ObjectFile,
    process::{start_process, start_search},
    template::Template,
    traditional::parse_from_str,
    utf8reader::next_char_position,
};

/// The default maximum number of failed transitions in one match attempt.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// The default maximum number of pending choice points.
pub const DEFAULT_MAX_STACK: usize = 1_000_000;

/// A compiled regular expression.
///
/// It is immutable, so it can be compiled once and then used
/// for matching any number of texts, from any number of threads.
#[derive(Debug)]
pub struct Regex {
    source: String,
    flags: Flags,
    pattern: Pattern,
    object_file: ObjectFile,
    options: MatchOptions,
}

/// Builds a `Regex` with flags and limits other than the defaults.
///
/// ```
/// use regex_backtrack::RegexBuilder;
///
/// let re = RegexBuilder::new()
///     .ignore_case(true)
///     .backtrack_limit(10_000)
///     .build("hello")
///     .unwrap();
/// assert!(re.is_match("Hello, World!").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    flags: Flags,
    options: MatchOptions,
}

impl Default for RegexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexBuilder {
    pub fn new() -> Self {
        RegexBuilder {
            flags: Flags::new(),
            options: MatchOptions {
                backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
                max_stack: DEFAULT_MAX_STACK,
            },
        }
    }

    pub fn build(&self, pattern: &str) -> Result<Regex, CompileError> {
        let parsed = parse_from_str(pattern, &self.flags)?;
        let object_file = compile(&parsed)?;

        Ok(Regex {
            source: pattern.to_owned(),
            flags: self.flags,
            pattern: parsed,
            object_file,
            options: self.options,
        })
    }

    pub fn flags(&mut self, flags: Flags) -> &mut Self {
        self.flags = flags;
        self
    }

    pub fn ignore_case(&mut self, value: bool) -> &mut Self {
        self.flags.ignore_case = value;
        self
    }

    pub fn multiline(&mut self, value: bool) -> &mut Self {
        self.flags.multiline = value;
        self
    }

    pub fn dot_all(&mut self, value: bool) -> &mut Self {
        self.flags.dot_all = value;
        self
    }

    pub fn verbose(&mut self, value: bool) -> &mut Self {
        self.flags.verbose = value;
        self
    }

    /// Limits the number of failed transitions in one match attempt
    /// (i.e. at one start position), matching fails with
    /// `MatchError::BacktrackLimitExceeded` when exceeded.
    pub fn backtrack_limit(&mut self, limit: usize) -> &mut Self {
        self.options.backtrack_limit = limit;
        self
    }

    /// Limits the number of pending choice points.
    ///
    /// Every iteration of a greedy repetition leaves one choice point,
    /// so e.g. `\w+` over a word longer than this limit fails with
    /// `MatchError::BacktrackLimitExceeded` even though it needs no backtracking.
    pub fn max_stack(&mut self, limit: usize) -> &mut Self {
        self.options.max_stack = limit;
        self
    }
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, CompileError> {
        RegexBuilder::new().build(pattern)
    }

    pub fn with_flags(pattern: &str, flags: Flags) -> Result<Self, CompileError> {
        RegexBuilder::new().flags(flags).build(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn ast(&self) -> &Pattern {
        &self.pattern
    }

    /// The number of capture groups, including the group 0 (the whole match).
    pub fn captures_len(&self) -> usize {
        self.object_file.capture_group_names.len()
    }

    pub fn capture_names(&self) -> impl Iterator<Item = Option<&str>> {
        self.object_file
            .capture_group_names
            .iter()
            .map(|name| name.as_deref())
    }

    /// The compiled routes in a human-readable form.
    pub fn get_debug_text(&self) -> String {
        self.object_file.get_debug_text()
    }

    fn new_context<'t>(&self, text: &'t str) -> Context<'t> {
        Context::new(
            text,
            self.object_file.capture_group_names.len(),
            self.object_file.number_of_counters,
            self.options,
        )
    }

    pub fn is_match(&self, text: &str) -> Result<bool, MatchError> {
        let mut context = self.new_context(text);
        start_search(&mut context, &self.object_file, 0)
    }

    /// Matches at exactly `start` (a byte offset), the match
    /// does not have to reach the end of the text.
    pub fn match_at<'a, 'b>(
        &'a self,
        text: &'b str,
        start: usize,
    ) -> Result<Option<Captures<'a, 'b>>, MatchError> {
        if !text.is_char_boundary(start) {
            return Ok(None);
        }

        let mut context = self.new_context(text);
        if start_process(&mut context, &self.object_file, start, None)? {
            Ok(Some(new_captures(&self.object_file, &context)))
        } else {
            Ok(None)
        }
    }

    /// Matches only when the whole text is matched.
    ///
    /// Reaching the end of the text takes part in backtracking,
    /// e.g. `a|ab` matches `"ab"` as a whole.
    pub fn full_match<'a, 'b>(
        &'a self,
        text: &'b str,
    ) -> Result<Option<Captures<'a, 'b>>, MatchError> {
        let mut context = self.new_context(text);
        if start_process(&mut context, &self.object_file, 0, Some(text.len()))? {
            Ok(Some(new_captures(&self.object_file, &context)))
        } else {
            Ok(None)
        }
    }

    /// Tries every start position from left to right and
    /// returns the first match.
    pub fn search<'a, 'b>(
        &'a self,
        text: &'b str,
    ) -> Result<Option<Captures<'a, 'b>>, MatchError> {
        let mut context = self.new_context(text);
        if start_search(&mut context, &self.object_file, 0)? {
            Ok(Some(new_captures(&self.object_file, &context)))
        } else {
            Ok(None)
        }
    }

    /// Same as `search`.
    pub fn captures<'a, 'b>(
        &'a self,
        text: &'b str,
    ) -> Result<Option<Captures<'a, 'b>>, MatchError> {
        self.search(text)
    }

    pub fn find<'a, 'b>(&'a self, text: &'b str) -> Result<Option<Match<'a, 'b>>, MatchError> {
        let captures = self.search(text)?;
        Ok(captures.and_then(|mut item| item.matches.swap_remove(0)))
    }

    /// All non-overlapping matches, from left to right.
    pub fn captures_iter<'a, 'b>(&'a self, text: &'b str) -> CaptureMatches<'a, 'b> {
        CaptureMatches {
            object_file: &self.object_file,
            context: self.new_context(text),
            next_start: Some(0),
        }
    }

    pub fn find_iter<'a, 'b>(&'a self, text: &'b str) -> Matches<'a, 'b> {
        Matches {
            captures_iter: self.captures_iter(text),
        }
    }

    pub fn find_all<'a, 'b>(&'a self, text: &'b str) -> Result<Vec<Captures<'a, 'b>>, MatchError> {
        self.captures_iter(text).collect()
    }

    /// The pieces of the text between the matches.
    pub fn split<'b>(&self, text: &'b str) -> Result<Vec<&'b str>, MatchError> {
        self.splitn(text, usize::MAX)
    }

    /// Like `split`, but returns at most `limit` pieces,
    /// the last piece is the rest of the text.
    pub fn splitn<'b>(&self, text: &'b str, limit: usize) -> Result<Vec<&'b str>, MatchError> {
        let mut pieces = vec![];
        if limit == 0 {
            return Ok(pieces);
        }

        let mut last_end = 0;
        for item in self.find_iter(text) {
            if pieces.len() + 1 >= limit {
                break;
            }

            let m = item?;
            pieces.push(&text[last_end..m.start]);
            last_end = m.end;
        }

        pieces.push(&text[last_end..]);
        Ok(pieces)
    }

    /// Replaces every match with the expanded template,
    /// see `Template` for the syntax.
    pub fn substitute(&self, text: &str, template: &str) -> Result<String, RegexError> {
        let (result, _) = self.substitute_n(text, template, 0)?;
        Ok(result)
    }

    /// Replaces at most `limit` matches (all when `limit` is 0),
    /// returns the new text and the number of replacements.
    pub fn substitute_n(
        &self,
        text: &str,
        template: &str,
        limit: usize,
    ) -> Result<(String, usize), RegexError> {
        let template = Template::parse(template, &self.object_file.capture_group_names)?;
        let result = self.replace(text, limit, |captures, dst| template.expand(captures, dst))?;
        Ok(result)
    }

    /// Replaces every match with the string returned by `replacer`.
    pub fn substitute_with<F>(&self, text: &str, mut replacer: F) -> Result<String, MatchError>
    where
        F: FnMut(&Captures) -> String,
    {
        let (result, _) = self.replace(text, 0, |captures, dst| {
            dst.push_str(&replacer(captures))
        })?;
        Ok(result)
    }

    fn replace<F>(
        &self,
        text: &str,
        limit: usize,
        mut append_replacement: F,
    ) -> Result<(String, usize), MatchError>
    where
        F: FnMut(&Captures, &mut String),
    {
        let mut result = String::with_capacity(text.len());
        let mut last_end = 0;
        let mut count = 0;
        let mut matches = self.captures_iter(text);

        while limit == 0 || count < limit {
            let Some(item) = matches.next() else {
                break;
            };

            let captures = item?;
            let Some(whole) = captures.get(0) else {
                continue;
            };

            result.push_str(&text[last_end..whole.start]);
            last_end = whole.end;
            append_replacement(&captures, &mut result);
            count += 1;
        }

        result.push_str(&text[last_end..]);
        Ok((result, count))
    }
}

impl Display for Regex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn new_captures<'a, 'b>(object_file: &'a ObjectFile, context: &Context<'b>) -> Captures<'a, 'b> {
    let text = context.text;
    let matches = context
        .match_ranges
        .iter()
        .enumerate()
        .map(|(idx, match_range)| {
            match_range.map(|MatchRange { start, end }| {
                Match::new(
                    start,
                    end,
                    object_file.get_capture_group_name_by_index(idx),
                    &text[start..end],
                )
            })
        })
        .collect();

    Captures { matches }
}

pub struct CaptureMatches<'a, 'b> {
    object_file: &'a ObjectFile,
    context: Context<'b>,

    // None when the iteration is finished
    next_start: Option<usize>,
}

impl<'a, 'b> Iterator for CaptureMatches<'a, 'b> {
    type Item = Result<Captures<'a, 'b>, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;

        match start_search(&mut self.context, self.object_file, start) {
            Ok(true) => {
                let captures = new_captures(self.object_file, &self.context);
                let (match_start, match_end) = captures
                    .get(0)
                    .map_or((start, start), |m| (m.start, m.end));

                // move forward one character after an empty match
                self.next_start = if match_start == match_end {
                    next_char_position(self.context.text, match_end)
                } else {
                    Some(match_end)
                };

                Some(Ok(captures))
            }
            Ok(false) => {
                self.next_start = None;
                None
            }
            Err(e) => {
                self.next_start = None;
                Some(Err(e))
            }
        }
    }
}

pub struct Matches<'a, 'b> {
    captures_iter: CaptureMatches<'a, 'b>,
}

impl<'a, 'b> Iterator for Matches<'a, 'b> {
    type Item = Result<Match<'a, 'b>, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.captures_iter.next()?;
        match item {
            Ok(mut captures) => captures.matches.swap_remove(0).map(Ok),
            Err(e) => Some(Err(e)),
        }
    }
}

/// The capture groups of a match, the group 0 is the whole match.
#[derive(Debug, PartialEq, Clone)]
pub struct Captures<'a, 'b> {
    // None for the groups that did not take part in the match
    pub matches: Vec<Option<Match<'a, 'b>>>,
}

impl<'b> Captures<'_, 'b> {
    // the following methods are intended to
    // be compatible with the 'Captures' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Captures.html

    pub fn get(&self, index: usize) -> Option<&Match<'_, 'b>> {
        self.matches.get(index)?.as_ref()
    }

    pub fn name(&self, name: &str) -> Option<&Match<'_, 'b>> {
        self.matches
            .iter()
            .flatten()
            .find(|item| item.name == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Match<'_, 'b>>> {
        self.matches.iter().map(|item| item.as_ref())
    }

    // e.g.
    //
    // ```
    //   let c = re.search("...")?.unwrap();
    //   let (whole, [one, two, three]) = c.extract();
    // ```
    //
    // groups that did not take part in the match are "".
    //
    // panics when `N` is not less than the number of capture groups
    // (the group 0 excluded).
    pub fn extract<const N: usize>(&self) -> (&'b str, [&'b str; N]) {
        let mut items: [&str; N] = [""; N];
        for (idx, item) in items.iter_mut().enumerate() {
            *item = self.matches[idx + 1].as_ref().map_or("", |m| m.value);
        }
        let whole = self.matches[0].as_ref().map_or("", |m| m.value);
        (whole, items)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Index<usize> for Captures<'_, '_> {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| {
                panic!(
                    "Capture group {} does not exist or did not take part in the match.",
                    index
                )
            })
            .as_str()
    }
}

impl Index<&str> for Captures<'_, '_> {
    type Output = str;

    fn index(&self, name: &str) -> &Self::Output {
        self.name(name)
            .unwrap_or_else(|| {
                panic!(
                    "Capture group \"{}\" does not exist or did not take part in the match.",
                    name
                )
            })
            .as_str()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Match<'a, 'b> {
    pub start: usize, // byte offset, included
    pub end: usize,   // byte offset, excluded
    pub name: Option<&'a str>,
    pub value: &'b str,
}

impl<'a, 'b> Match<'a, 'b> {
    pub fn new(start: usize, end: usize, name: Option<&'a str>, value: &'b str) -> Self {
        Match {
            start,
            end,
            name,
            value,
        }
    }

    // the following methods are intended to
    // be compatible with the 'Match' API of crate 'regex':
    // https://docs.rs/regex/latest/regex/struct.Match.html

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        Range {
            start: self.start,
            end: self.end,
        }
    }

    pub fn as_str(&self) -> &'b str {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        error::{CompileError, MatchError, RegexError},
        flags::Flags,
    };

    use super::{Captures, Match, Regex, RegexBuilder};

    fn new_match(start: usize, end: usize, value: &str) -> Match {
        Match::new(start, end, None, value)
    }

    fn new_captures<'a, 'b>(
        groups: &'a [(
            /*start:*/ usize,
            /*end:*/ usize,
            /*name:*/ Option<&'a str>,
            /*value:*/ &'b str,
        )],
    ) -> Captures<'a, 'b> {
        let matches = groups
            .iter()
            .map(|(start, end, name, value)| Some(Match::new(*start, *end, *name, value)))
            .collect();
        Captures { matches }
    }

    fn find_all_str<'b>(re: &Regex, text: &'b str) -> Vec<&'b str> {
        re.find_iter(text)
            .map(|item| item.unwrap().as_str())
            .collect()
    }

    #[test]
    fn test_find() {
        let re = Regex::new(r#"\d+"#).unwrap();
        assert_eq!(re.find("ab123c45").unwrap(), Some(new_match(2, 5, "123")));
        assert_eq!(re.find("abc").unwrap(), None);

        let re = Regex::new("文字").unwrap();
        let m = re.find("中文字!").unwrap().unwrap();
        assert_eq!(m.range(), 3..9);
        assert_eq!(m.len(), 6);
        assert!(!m.is_empty());
    }

    #[test]
    fn test_find_iter() {
        let re = Regex::new(r#"(?<!0x)[\da-f]{2}"#).unwrap();
        let text = "13 0x17 0o19 0x23 29";
        let mut matches = re.find_iter(text);

        assert_eq!(matches.next(), Some(Ok(new_match(0, 2, "13"))));
        assert_eq!(matches.next(), Some(Ok(new_match(10, 12, "19"))));
        assert_eq!(matches.next(), Some(Ok(new_match(18, 20, "29"))));
        assert_eq!(matches.next(), None);
        assert_eq!(matches.next(), None);
    }

    #[test]
    fn test_find_iter_empty_matches() {
        let re = Regex::new("a*").unwrap();
        assert_eq!(find_all_str(&re, "baaac"), vec!["", "aaa", "", ""]);

        let re = Regex::new("").unwrap();
        let ranges: Vec<(usize, usize)> = re
            .find_iter("a文")
            .map(|item| {
                let m = item.unwrap();
                (m.start(), m.end())
            })
            .collect();
        assert_eq!(ranges, vec![(0, 0), (1, 1), (4, 4)]);
    }

    #[test]
    fn test_captures() {
        let re = Regex::new(r#"(?<prefix>0x|0o|0b)(?<number>\d+)(x)?"#).unwrap();
        let text = "abc0x23def0o456xyz";

        let one = re.captures(text).unwrap().unwrap();
        assert_eq!(
            one,
            Captures {
                matches: vec![
                    Some(Match::new(3, 7, None, "0x23")),
                    Some(Match::new(3, 5, Some("prefix"), "0x")),
                    Some(Match::new(5, 7, Some("number"), "23")),
                    None,
                ]
            }
        );

        assert_eq!(one.len(), 4);
        assert_eq!(&one[0], "0x23");
        assert_eq!(&one["prefix"], "0x");
        assert_eq!(one.name("number").map(|m| m.as_str()), Some("23"));
        assert_eq!(one.get(3), None);
        assert_eq!(one.extract(), ("0x23", ["0x", "23", ""]));

        let all = re.find_all(text).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[1].iter().map(|m| m.map(|v| v.as_str())).collect::<Vec<_>>(),
            vec![Some("0o456x"), Some("0o"), Some("456"), Some("x")]
        );
    }

    #[test]
    fn test_captures_iter_backreference() {
        let re = Regex::new(r#"<(?<tag_name>\w+)>.+?</\k<tag_name>>"#).unwrap();
        let text = "zero<div>one<div>two</div>three</div>four";
        let mut matches = re.captures_iter(text);

        assert_eq!(
            matches.next(),
            Some(Ok(new_captures(&[
                (4, 26, None, "<div>one<div>two</div>"),
                (5, 8, Some("tag_name"), "div")
            ])))
        );

        let re = Regex::new(r#"<(?<tag_name>\w+)>.+</\k<tag_name>>"#).unwrap();
        assert_eq!(
            re.search(text).unwrap(),
            Some(new_captures(&[
                (4, 37, None, "<div>one<div>two</div>three</div>"),
                (5, 8, Some("tag_name"), "div")
            ]))
        );
    }

    #[test]
    fn test_match_at_and_full_match() {
        let re = Regex::new("a|ab").unwrap();

        assert_eq!(re.match_at("xab", 0).unwrap(), None);
        assert_eq!(
            re.match_at("xab", 1).unwrap().map(|c| c[0].to_owned()),
            Some("a".to_owned())
        );
        assert_eq!(re.match_at("xab", 9).unwrap(), None);
        assert_eq!(re.match_at("文", 1).unwrap(), None);

        assert_eq!(
            re.full_match("ab").unwrap().map(|c| c[0].to_owned()),
            Some("ab".to_owned())
        );
        assert_eq!(re.full_match("abc").unwrap(), None);

        let re = Regex::new("(a+)(a+?)").unwrap();
        let captures = re.full_match("aaaa").unwrap().unwrap();
        assert_eq!(captures.extract(), ("aaaa", ["aaa", "a"]));
    }

    #[test]
    fn test_split() {
        let re = Regex::new(r#"\s*,\s*"#).unwrap();
        assert_eq!(re.split("a , b,c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(re.split(",a,").unwrap(), vec!["", "a", ""]);
        assert_eq!(re.split("abc").unwrap(), vec!["abc"]);
        assert_eq!(re.splitn("a,b,c", 2).unwrap(), vec!["a", "b,c"]);
        assert_eq!(re.splitn("a,b,c", 1).unwrap(), vec!["a,b,c"]);
        assert_eq!(re.splitn("a,b,c", 0).unwrap(), Vec::<&str>::new());

        let re = Regex::new("").unwrap();
        assert_eq!(re.split("abc").unwrap(), vec!["", "a", "b", "c", ""]);
    }

    #[test]
    fn test_substitute() {
        let re = Regex::new(r#"(?P<key>\w+)=(\d+)?"#).unwrap();

        assert_eq!(
            re.substitute("a=1, b=, c=3", r#"\2:\g<key>"#).unwrap(),
            "1:a, :b, 3:c"
        );

        assert_eq!(
            re.substitute_n("a=1, b=, c=3", r#"[\0]"#, 2).unwrap(),
            ("[a=1], [b=], c=3".to_owned(), 2)
        );

        assert_eq!(
            re.substitute_with("a=1, b=2", |c| c["key"].to_uppercase())
                .unwrap(),
            "A, B"
        );

        assert!(matches!(
            re.substitute("a=1", r#"\3"#),
            Err(RegexError::Compile(CompileError::UndefinedBackreference(..)))
        ));

        // an empty pattern inserts at every position
        let re = Regex::new("").unwrap();
        assert_eq!(re.substitute("ab", "-").unwrap(), "-a-b-");
    }

    #[test]
    fn test_builder() {
        let re = RegexBuilder::new()
            .ignore_case(true)
            .multiline(true)
            .dot_all(true)
            .build("^b.c$")
            .unwrap();

        assert_eq!(
            re.flags(),
            Flags {
                ignore_case: true,
                multiline: true,
                dot_all: true,
                verbose: false
            }
        );
        assert_eq!(find_all_str(&re, "a\nB\nc\nbxc"), vec!["B\nc", "bxc"]);

        let re = RegexBuilder::new()
            .verbose(true)
            .build(r#"\d+ \s* # a number"#)
            .unwrap();
        assert_eq!(re.find("ab 12  c").unwrap().map(|m| m.as_str()), Some("12  "));
        assert_eq!(re.as_str(), r#"\d+ \s* # a number"#);

        let mut flags = Flags::new();
        flags.set_by_letter('i', true);
        let re = Regex::with_flags("abc", flags).unwrap();
        assert!(re.is_match("xABC").unwrap());
        assert!(!re.is_match("xAB").unwrap());
    }

    #[test]
    fn test_ignore_case_preset_in_charset() {
        let non_word = RegexBuilder::new()
            .ignore_case(true)
            .build(r#"[\W]"#)
            .unwrap();
        let word = RegexBuilder::new()
            .ignore_case(true)
            .build(r#"^[^\W]+$"#)
            .unwrap();

        for text in ["k", "K", "s", "S", "i", "I"] {
            assert!(!non_word.is_match(text).unwrap(), "text: {}", text);
            assert!(word.is_match(text).unwrap(), "text: {}", text);
        }

        assert!(non_word.is_match("-").unwrap());
        assert!(word.is_match("kiss").unwrap());

        // the literal members are still case-expanded
        let re = RegexBuilder::new()
            .ignore_case(true)
            .build(r#"^[k\d]+$"#)
            .unwrap();
        assert!(re.is_match("kK7").unwrap());
        assert!(!re.is_match("kx").unwrap());
    }

    #[test]
    fn test_look_behind_length_overflow() {
        assert!(matches!(
            Regex::new("(?<=a{18446744073709551615}a)b"),
            Err(CompileError::VariableWidthLookbehind(_))
        ));
    }

    #[test]
    fn test_backtrack_limit() {
        let re = RegexBuilder::new()
            .backtrack_limit(10_000)
            .build("(a*)*b")
            .unwrap();
        let text = "a".repeat(30);

        assert_eq!(re.is_match(&text), Err(MatchError::BacktrackLimitExceeded));
        assert_eq!(
            re.find_iter(&text).collect::<Vec<_>>(),
            vec![Err(MatchError::BacktrackLimitExceeded)]
        );
        assert!(matches!(
            re.substitute(&text, "x"),
            Err(RegexError::Match(MatchError::BacktrackLimitExceeded))
        ));

        // the limit applies to each start position
        let re = RegexBuilder::new()
            .backtrack_limit(10)
            .build(r#"\d"#)
            .unwrap();
        let text = format!("{}7", "x".repeat(100));
        assert_eq!(re.find(&text).unwrap().map(|m| m.start()), Some(100));
    }

    #[test]
    fn test_regex_info() {
        let re = Regex::new(r#"(?P<year>\d{4})-(\d{2})"#).unwrap();
        assert_eq!(re.captures_len(), 3);
        assert_eq!(
            re.capture_names().collect::<Vec<_>>(),
            vec![None, Some("year"), None]
        );
        assert_eq!(re.to_string(), r#"(?P<year>\d{4})-(\d{2})"#);
        assert_eq!(re.ast().to_string(), r#"(?P<year>[0-9]{4})-([0-9]{2})"#);
        assert!(re.get_debug_text().contains("Capture start {1}"));
    }
}
