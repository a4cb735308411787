//! Positions carried on every syntactic node.
//!
//! The lexer (`crate::lexer`) produces offset, line, and column directly
//! while it scans, so `Position` just carries them; nothing downstream
//! ever has to reconcile one field against another or reconstruct one
//! from the others.

use crate::source_file::SourceFile;
use std::fmt;

/// `{ file, offset, line, column }`, 1-based line and column.
#[derive(Clone, Eq, PartialEq)]
pub struct Position {
    pub file: SourceFile,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[must_use]
    pub fn start_of(file: SourceFile) -> Self {
        Self {
            file,
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A start/end pair. Not part of a node's record (nodes carry a single
/// `Position`), but a convenient internal tool for slicing the original
/// source text back out for string-literal decoding and comment capture.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.start.file.contents()[self.start.offset..self.end.offset]
    }
}
