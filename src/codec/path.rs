//! Decoded identifier paths.

use std::iter::FusedIterator;

/// One step from the model root towards the addressed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// Bucket key (`prefix SEP elementKey`) of the addressed element.
    Element(String),
    /// Compound slot to step into.
    Slot(String),
    /// Observable slot, already normalized to the model's spelling.
    Observable(String),
}

impl PathToken {
    pub fn as_str(&self) -> &str {
        match self {
            PathToken::Element(s) | PathToken::Slot(s) | PathToken::Observable(s) => s,
        }
    }
}

/// Forward-only, single-pass sequence of [`PathToken`]s.
///
/// Yielded tokens cannot be pushed back; consumers step into successive
/// slots as they go.
#[derive(Debug)]
pub struct DecodedPath {
    tokens: std::vec::IntoIter<PathToken>,
    nested: bool,
    rewritten: bool,
}

impl DecodedPath {
    pub(crate) fn new(tokens: Vec<PathToken>, nested: bool, rewritten: bool) -> Self {
        Self {
            tokens: tokens.into_iter(),
            nested,
            rewritten,
        }
    }

    /// Whether the identifier addressed something inside a compound slot.
    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// Whether an algorithm identifier was rewritten to its runtime node.
    pub fn is_rewritten(&self) -> bool {
        self.rewritten
    }
}

impl Iterator for DecodedPath {
    type Item = PathToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokens.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tokens.size_hint()
    }
}

impl ExactSizeIterator for DecodedPath {}

impl FusedIterator for DecodedPath {}
