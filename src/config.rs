//! Decoder limits.

use crate::format::INTEGER_MAX_LENGTH;

/// Default bound on list/dictionary nesting. Real metainfo files stay well
/// below ten levels.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Limits and strictness switches for [`BDecoder`](crate::bdecode::BDecoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum characters in an integer literal or string size header.
    pub max_literal_length: usize,
    /// Maximum nesting of lists and dictionaries.
    pub max_depth: usize,
    /// Reject `-0` and leading zeros instead of accepting them.
    pub strict_integers: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            max_literal_length: INTEGER_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_integers: false,
        }
    }
}

impl DecoderConfig {
    pub fn strict() -> Self {
        DecoderConfig::default().with_strict_integers(true)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_literal_length(mut self, max_literal_length: usize) -> Self {
        self.max_literal_length = max_literal_length;
        self
    }

    pub fn with_strict_integers(mut self, strict: bool) -> Self {
        self.strict_integers = strict;
        self
    }
}
