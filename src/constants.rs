//! Library constants.
//!
//! Centralizes magic numbers and file naming conventions.

/// Roman numeral constants.
pub mod numerals {
    /// Largest value with a canonical (non-repeating `M`) Roman form.
    pub const MAX_CANONICAL: u32 = 3999;
}

/// Commentary unit constants.
pub mod units {
    /// Longest range a single unit label may expand to ("Sermons 1-40").
    pub const MAX_LABEL_SPAN: u32 = 500;
}

/// Eusebian canon constants.
pub mod canon {
    /// Number of canon tables (I through XIII).
    pub const CANON_COUNT: u32 = 13;
}

/// Input discovery constants.
pub mod input {
    /// Suffix of commentary work files.
    pub const WORK_SUFFIX: &str = ".units.json";

    /// Suffix of Eusebian canon section files.
    pub const CANON_SUFFIX: &str = ".canon.json";

    /// Default directory scanned for input files.
    pub const DEFAULT_INPUT_DIR: &str = "texts/sources";
}

/// Output file naming constants.
pub mod output {
    /// Resolved coverage per unit, keyed by unit number.
    pub const COVERAGE_FILE: &str = "homily_coverage.json";

    /// Verse-to-units lookup.
    pub const VERSE_INDEX_FILE: &str = "verse_to_homilies.json";

    /// Verse-to-canon lookup.
    pub const CANON_INDEX_FILE: &str = "verse_to_canon.json";

    /// Default directory receiving derived files.
    pub const DEFAULT_OUTPUT_DIR: &str = "texts/derived";
}
