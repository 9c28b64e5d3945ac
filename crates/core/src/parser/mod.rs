//! Parser for the shell subset used by Portage ebuild/eclass files.
//!
//! Ebuilds are bash scripts, but the variables the IDE features care about
//! are plain `NAME=VALUE` assignments and `inherit` directives, so a full
//! shell interpreter is unnecessary. The parser records a source range for
//! every name, scalar and array element, which is what lets hover and
//! document-link providers annotate exactly the token that produced a
//! value. Anything outside the subset (phase function bodies, conditionals)
//! is skipped line by line.
//!
//! Parsing is all-or-nothing for structural errors: an unterminated quote
//! or array aborts the whole parse. Callers treat that as "the document is
//! mid-edit, annotate nothing", not as a failure worth reporting.

pub mod vocabulary;

use serde::Serialize;
use thiserror::Error;

use crate::source::{Position, Range};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated double-quoted string starting at {0}")]
    UnterminatedString(Position),
    #[error("unterminated array starting at {0}")]
    UnterminatedArray(Position),
}

/// A scalar string token with the range of its literal content. For quoted
/// strings the range excludes the surrounding quotes.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EbuildString {
    pub value: String,
    pub range: Range,
}

/// The right-hand side of an assignment: a scalar, or a parenthesized
/// array whose range includes both parens.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum EbuildValue {
    String(EbuildString),
    Array {
        elements: Vec<EbuildString>,
        range: Range,
    },
}

impl EbuildValue {
    pub fn range(&self) -> Range {
        match self {
            EbuildValue::String(s) => s.range,
            EbuildValue::Array { range, .. } => *range,
        }
    }

    /// All scalar tokens in this value, in document order.
    pub fn strings(&self) -> Vec<&EbuildString> {
        match self {
            EbuildValue::String(s) => vec![s],
            EbuildValue::Array { elements, .. } => elements.iter().collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EbuildAssignment {
    pub name: String,
    pub name_range: Range,
    pub value: EbuildValue,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InheritedEclass {
    pub name: String,
    pub range: Range,
}

/// Parse result for one document. Assignments and inherits keep document
/// order; repeated assignments to one variable are all recorded, and
/// picking the effective one is consumer policy.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEbuild {
    pub assignments: Vec<EbuildAssignment>,
    pub inherits: Vec<InheritedEclass>,
}

impl ParsedEbuild {
    /// Last assignment to `name`, the one Portage would observe.
    pub fn last_assignment(&self, name: &str) -> Option<&EbuildAssignment> {
        self.assignments.iter().rev().find(|a| a.name == name)
    }

    pub fn assignment_at(&self, position: Position) -> Option<&EbuildAssignment> {
        self.assignments
            .iter()
            .find(|a| a.name_range.contains(position))
    }

    pub fn inherit_at(&self, position: Position) -> Option<&InheritedEclass> {
        self.inherits.iter().find(|i| i.range.contains(position))
    }
}

pub fn parse_ebuild(text: &str) -> Result<ParsedEbuild, ParseError> {
    let mut scanner = Scanner::new(text);
    let mut parsed = ParsedEbuild::default();

    loop {
        scanner.skip_inline_whitespace();
        match scanner.peek() {
            None => break,
            Some('\n') => {
                scanner.bump();
            }
            Some('#') => scanner.skip_line(),
            Some(c) if is_name_char(c) => {
                let start = scanner.position();
                let word = scanner.take_while(is_name_char);
                if word == "inherit" {
                    parse_inherit_line(&mut scanner, &mut parsed.inherits);
                } else if scanner.peek() == Some('=') {
                    let name_range = Range::new(start, scanner.position());
                    scanner.bump();
                    let value = parse_value(&mut scanner)?;
                    parsed.assignments.push(EbuildAssignment {
                        name: word,
                        name_range,
                        value,
                    });
                } else {
                    // Function definition or other shell statement
                    scanner.skip_line();
                }
            }
            Some(_) => scanner.skip_line(),
        }
    }

    Ok(parsed)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_inherit_line(scanner: &mut Scanner<'_>, inherits: &mut Vec<InheritedEclass>) {
    loop {
        scanner.skip_inline_whitespace();
        match scanner.peek() {
            None => break,
            Some('\n') => {
                scanner.bump();
                break;
            }
            Some('#') => {
                scanner.skip_line();
                break;
            }
            Some(_) => {
                let start = scanner.position();
                let name = scanner.take_while(|c| !c.is_whitespace());
                let range = Range::new(start, scanner.position());
                inherits.push(InheritedEclass { name, range });
            }
        }
    }
}

fn parse_value(scanner: &mut Scanner<'_>) -> Result<EbuildValue, ParseError> {
    match scanner.peek() {
        Some('"') => Ok(EbuildValue::String(parse_quoted(scanner)?)),
        Some('(') => parse_array(scanner),
        _ => Ok(EbuildValue::String(parse_bare(scanner))),
    }
}

/// Double-quoted string. No escape processing: every character up to the
/// closing quote is literal content, which matches how ebuild metadata
/// variables are actually written.
fn parse_quoted(scanner: &mut Scanner<'_>) -> Result<EbuildString, ParseError> {
    let open = scanner.position();
    scanner.bump();
    let start = scanner.position();
    let mut value = String::new();
    loop {
        match scanner.peek() {
            None => return Err(ParseError::UnterminatedString(open)),
            Some('"') => {
                let end = scanner.position();
                scanner.bump();
                return Ok(EbuildString {
                    value,
                    range: Range::new(start, end),
                });
            }
            Some(c) => {
                value.push(c);
                scanner.bump();
            }
        }
    }
}

/// Unquoted token, running until the first whitespace. May be empty, in
/// which case the range collapses to the position right after the `=`.
fn parse_bare(scanner: &mut Scanner<'_>) -> EbuildString {
    let start = scanner.position();
    let value = scanner.take_while(|c| !c.is_whitespace());
    EbuildString {
        value,
        range: Range::new(start, scanner.position()),
    }
}

/// Parenthesized array, possibly spanning several lines. Whitespace and
/// comments between elements are insignificant; the overall range covers
/// `(` through `)` inclusive.
fn parse_array(scanner: &mut Scanner<'_>) -> Result<EbuildValue, ParseError> {
    let open = scanner.position();
    scanner.bump();
    let mut elements = Vec::new();
    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            None => return Err(ParseError::UnterminatedArray(open)),
            Some(')') => {
                scanner.bump();
                return Ok(EbuildValue::Array {
                    elements,
                    range: Range::new(open, scanner.position()),
                });
            }
            Some('"') => elements.push(parse_quoted(scanner)?),
            Some('#') => scanner.skip_line(),
            Some(_) => {
                let start = scanner.position();
                let value = scanner.take_while(|c| !c.is_whitespace() && c != ')');
                elements.push(EbuildString {
                    value,
                    range: Range::new(start, scanner.position()),
                });
            }
        }
    }
}

/// Character cursor tracking (line, character) as it advances.
struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
    character: u32,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 0,
            character: 0,
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.character)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.character = 0;
        } else {
            self.character += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    /// Spaces and tabs only; stops at newlines.
    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Any whitespace, newlines included.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Consumes through the end of the current line.
    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }
}
