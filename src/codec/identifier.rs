//! Flat telemetry identifiers.
//!
//! An identifier is `prefix SEP key… SEP observable`, bit-exact with the
//! monitoring channel. The observable segment is the null marker when no
//! observable is attached; identifiers produced without an observable stop
//! after the key.

use crate::codec::observable::Observable;
use std::sync::Arc;

/// Default segment separator shared with the monitoring channel.
pub const DEFAULT_SEPARATOR: &str = ":";
/// Default observable segment for "no observable".
pub const DEFAULT_NULL_MARKER: &str = "null";

/// Separator and null marker of the identifier wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierFormat {
    pub separator: String,
    pub null_marker: String,
}

impl Default for IdentifierFormat {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            null_marker: DEFAULT_NULL_MARKER.to_string(),
        }
    }
}

impl IdentifierFormat {
    /// `prefix SEP key SEP (observable | null)`.
    pub fn with_observable(&self, prefix: &str, key: &str, observable: Option<&Observable>) -> String {
        let observable = observable.map(Observable::name).unwrap_or(&self.null_marker);
        format!(
            "{prefix}{sep}{key}{sep}{observable}",
            sep = self.separator
        )
    }

    /// `prefix SEP key`.
    pub fn bucket(&self, prefix: &str, key: &str) -> String {
        format!("{}{}{}", prefix, self.separator, key)
    }

    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    pub fn split(&self, identifier: &str) -> Arc<[String]> {
        identifier
            .split(self.separator.as_str())
            .map(str::to_string)
            .collect()
    }
}

/// Borrowed view over the segments of one identifier.
#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    segments: &'a [String],
}

impl<'a> Identifier<'a> {
    pub fn new(segments: &'a [String]) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &'a [String] {
        self.segments
    }

    pub fn prefix(&self) -> &'a str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    /// Final segment, when the identifier carries one past the key.
    pub fn observable_token(&self) -> Option<&'a str> {
        if self.segments.len() > 2 {
            self.segments.last().map(String::as_str)
        } else {
            None
        }
    }

    /// Segments between the prefix and the observable token.
    pub fn middle(&self) -> &'a [String] {
        match self.segments.len() {
            0 | 1 => &[],
            2 => &self.segments[1..],
            n => &self.segments[1..n - 1],
        }
    }

    /// Addresses something inside a compound slot rather than a bare
    /// top-level element: more middle segments than `key_segments`.
    pub fn is_nested(&self, key_segments: usize) -> bool {
        self.middle().len() > key_segments
    }
}
