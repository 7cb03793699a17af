// Copyright (c) 2024 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE, LICENSE.additional and CONTRIBUTING.

mod charwithposition;
mod compiler;
mod context;
mod error;
mod errorprinter;
mod flags;
mod location;
mod object_file;
mod peekableiter;
mod printer;
mod process;
mod regex;
mod rulechecker;
mod template;
mod traditional;
mod transition;
mod utf8reader;

pub mod ast;

pub use error::{CompileError, MatchError, RegexError};
pub use errorprinter::print_error;
pub use flags::Flags;
pub use location::Location;
pub use regex::{
    CaptureMatches, Captures, Match, Matches, Regex, RegexBuilder, DEFAULT_BACKTRACK_LIMIT,
    DEFAULT_MAX_STACK,
};
pub use template::{Template, TemplateSegment};
