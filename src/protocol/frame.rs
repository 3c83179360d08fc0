//! Completion detection over accumulated reply bytes.

use std::sync::LazyLock;

use regex::bytes::Regex;

/// Reply code pattern: four ASCII digits at the start of any line.
const REPLY_CODE_PATTERN: &str = r"(?m)^[0-9]{4}";

static SHARED: LazyLock<ReplyClassifier> = LazyLock::new(ReplyClassifier::new);

/// Decides whether a buffer of reply bytes contains a completion line.
///
/// A completion line is any line whose four-digit code starts with `0`. The
/// match is line-anchored but not tied to the end of the buffer, so a
/// completion code on any line seen so far ends the wait.
#[derive(Debug, Clone)]
pub struct ReplyClassifier {
    pattern: Regex,
}

impl ReplyClassifier {
    /// Build a classifier with its own compiled pattern.
    ///
    /// Prefer [`ReplyClassifier::shared`] unless an owned copy is needed.
    ///
    /// # Panics
    ///
    /// Never in practice; the pattern is a compile-time constant and is
    /// covered by this module's tests.
    #[must_use]
    pub fn new() -> Self {
        let pattern = Regex::new(REPLY_CODE_PATTERN).expect("reply code pattern is valid");
        Self { pattern }
    }

    /// Process-wide classifier, compiled on first use.
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Returns true once any line of `buf` starts with a completion code.
    ///
    /// Safe to call on partial buffers; a code split across reads is simply
    /// not matched until its fourth digit has arrived.
    #[must_use]
    pub fn is_complete(&self, buf: &[u8]) -> bool {
        self.pattern
            .find_iter(buf)
            .any(|code| code.as_bytes().first() == Some(&b'0'))
    }
}

impl Default for ReplyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Offset of the first byte of the last line in `buf`.
///
/// Everything before this offset is made of complete lines, so a classifier
/// that already rejected them only needs to look from here on.
#[must_use]
pub fn last_line_start(buf: &[u8]) -> usize {
    buf.iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |newline| newline + 1)
}
