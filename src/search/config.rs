// Search profiles and length limits.

use crate::format::MAX_COMMAND_LEN;

/// Longest match any finder reports, in command units.
///
/// Equal to the largest length a header can carry, so every candidate is
/// directly encodable.
pub const MAX_MATCH: usize = MAX_COMMAND_LEN;

/// Shortest `RunByte` / `RunIncrement` worth encoding (strictly more than 3).
pub const MIN_RUN: usize = 4;

/// Shortest copy or word run worth encoding (strictly more than 4 bytes).
pub const MIN_COPY: usize = 5;

/// Default number of prior offsets per parallel work unit.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Search profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Name for display purposes.
    pub name: &'static str,
    /// Run the bit-mirrored back-reference finder.
    pub mirror: bool,
    /// Run the backward back-reference finder.
    pub reverse: bool,
    /// Prior offsets scanned per work unit by the back-reference finders.
    pub chunk_size: usize,
}

impl SearchConfig {
    /// Profile for the encoder's `fast` flag.
    pub fn for_mode(fast: bool) -> SearchConfig {
        if fast { FAST } else { THOROUGH }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        THOROUGH
    }
}

/// Run finders and forward back-references only.
pub const FAST: SearchConfig = SearchConfig {
    name: "fast",
    mirror: false,
    reverse: false,
    chunk_size: DEFAULT_CHUNK_SIZE,
};

/// All six finders.
pub const THOROUGH: SearchConfig = SearchConfig {
    name: "thorough",
    mirror: true,
    reverse: true,
    chunk_size: DEFAULT_CHUNK_SIZE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selects_profile() {
        assert_eq!(SearchConfig::for_mode(true), FAST);
        assert_eq!(SearchConfig::for_mode(false), THOROUGH);
        assert_eq!(SearchConfig::default().name, "thorough");
    }

    #[test]
    fn match_cap_fits_a_header() {
        assert_eq!(MAX_MATCH, 1024);
        assert!(MIN_RUN < MIN_COPY);
    }
}
