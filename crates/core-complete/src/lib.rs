//! Tab-completion protocol: request/response types, provider trait, and the
//! attempt tracker the engine uses across repeated Tab presses.
//!
//! A provider receives the word fragment before the cursor plus a zero-based
//! attempt counter, and answers with exactly one of: an insertion to splice
//! at the cursor, a list of alternatives to display, an error flag (further
//! Tabs restart at attempt 0), or nothing (bell, attempt sequence continues).
//! Providers may answer differently across attempts for the same fragment to
//! stream progressively narrower suggestions.
//!
//! [`CompletionResponse::from_output`] validates the convenience form where a
//! provider returns the whole replacement word: the output must be at least
//! as long as the fragment and must prefix-match it case-insensitively.
//! Violations are errors to the provider, never to the end user.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("completion output {output:?} is shorter than fragment {fragment:?}")]
    OutputTooShort { fragment: String, output: String },
    #[error("completion output {output:?} does not extend fragment {fragment:?}")]
    PrefixMismatch { fragment: String, output: String },
}

/// One completion round-trip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRequest<'a> {
    /// Word fragment immediately before the cursor.
    pub fragment: &'a str,
    /// Zero-based counter, incremented on each Tab for the same fragment.
    pub attempt: u32,
}

/// Provider answer for one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResponse {
    insert: Option<String>,
    alternatives: Vec<String>,
    error: bool,
}

impl CompletionResponse {
    /// Nothing to offer this attempt; the engine rings the bell and keeps the
    /// attempt sequence alive (a provider may stream alternatives later).
    pub fn none() -> Self {
        Self::default()
    }

    /// Splice `text` at the cursor.
    pub fn insert(text: impl Into<String>) -> Self {
        Self {
            insert: Some(text.into()),
            ..Self::default()
        }
    }

    /// Display candidate words below the line.
    pub fn with_alternatives(alternatives: Vec<String>) -> Self {
        Self {
            alternatives,
            ..Self::default()
        }
    }

    /// Completion failed; further Tabs restart at attempt 0.
    pub fn error() -> Self {
        Self {
            error: true,
            ..Self::default()
        }
    }

    /// Build an insertion from the full replacement word. The output must
    /// extend the fragment (case-insensitive prefix match); the fragment's
    /// own characters are not re-inserted.
    pub fn from_output(fragment: &str, output: &str) -> Result<Self, ProtocolError> {
        let frag_chars = fragment.chars().count();
        let out_chars: Vec<char> = output.chars().collect();
        if out_chars.len() < frag_chars {
            return Err(ProtocolError::OutputTooShort {
                fragment: fragment.to_string(),
                output: output.to_string(),
            });
        }
        let prefix_matches = fragment
            .chars()
            .zip(out_chars.iter())
            .all(|(f, o)| f.eq_ignore_ascii_case(o));
        if !prefix_matches {
            return Err(ProtocolError::PrefixMismatch {
                fragment: fragment.to_string(),
                output: output.to_string(),
            });
        }
        Ok(Self::insert(out_chars[frag_chars..].iter().collect::<String>()))
    }

    pub fn insertion(&self) -> Option<&str> {
        self.insert.as_deref()
    }

    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn is_error(&self) -> bool {
        self.error
    }
}

/// Completion provider registered on a line editor.
pub trait Completer {
    fn complete(&mut self, request: &CompletionRequest<'_>) -> CompletionResponse;
}

impl<F> Completer for F
where
    F: FnMut(&CompletionRequest<'_>) -> CompletionResponse,
{
    fn complete(&mut self, request: &CompletionRequest<'_>) -> CompletionResponse {
        self(request)
    }
}

/// Bookkeeping for a run of Tab presses on one fragment.
///
/// Tracks the attempt counter and the most recent insertion as a start index
/// plus a length in characters, so a later attempt can remove exactly the
/// earlier splice even if the cursor has wandered since.
#[derive(Debug, Default)]
pub struct AttemptTracker {
    next_attempt: u32,
    inserted: Option<(usize, usize)>,
}

impl AttemptTracker {
    /// Claim the next attempt number (0 on the first Tab of a sequence).
    pub fn next(&mut self) -> u32 {
        let attempt = self.next_attempt;
        self.next_attempt += 1;
        attempt
    }

    /// Start index and character count of the previous attempt's insertion.
    pub fn previous_insertion(&self) -> Option<(usize, usize)> {
        self.inserted
    }

    /// Record a splice at `start`. Empty insertions leave nothing to remove
    /// and are not tracked.
    pub fn record_insertion(&mut self, start: usize, chars: usize) {
        self.inserted = (chars > 0).then_some((start, chars));
    }

    /// Back to attempt 0 with no tracked insertion (buffer changed, error
    /// response, or line finished).
    pub fn reset(&mut self) {
        self.next_attempt = 0;
        self.inserted = None;
    }
}
