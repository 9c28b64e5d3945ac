use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based (line, character) location inside a document. Characters
/// count Unicode scalar values, not bytes.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// Half-open range `[start, end)` with `start <= end` in the
/// lexicographic (line, character) order.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let range = Range::new(Position::new(1, 2), Position::new(1, 5));
        assert!(!range.contains(Position::new(1, 1)));
        assert!(range.contains(Position::new(1, 2)));
        assert!(range.contains(Position::new(1, 4)));
        assert!(!range.contains(Position::new(1, 5)));
    }

    #[test]
    fn multiline_containment() {
        let range = Range::new(Position::new(0, 3), Position::new(2, 1));
        assert!(range.contains(Position::new(1, 0)));
        assert!(range.contains(Position::new(2, 0)));
        assert!(!range.contains(Position::new(2, 1)));
    }

    #[test]
    fn empty_range_contains_nothing() {
        let range = Range::new(Position::new(0, 4), Position::new(0, 4));
        assert!(range.is_empty());
        assert!(!range.contains(Position::new(0, 4)));
    }
}
