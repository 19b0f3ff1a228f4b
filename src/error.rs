//! Library error types.
//!
//! Provides unified error handling with actionable context for debugging.

use std::path::PathBuf;

use thiserror::Error;

use crate::bible::Book;

/// Library result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<PathBuf>,
    },

    /// JSON (de)serialization error with path context
    #[error("JSON error in {path:?}: {source}")]
    Json {
        /// The underlying serde error.
        source: serde_json::Error,
        /// File the JSON came from or was headed to, if known.
        path: Option<PathBuf>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Malformed or out-of-range Roman numeral
    #[error("Invalid numeral {input:?}: {reason}")]
    InvalidNumeral {
        /// The offending input, as given.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Reference string matched none of the recognized grammars
    #[error("Unparseable reference: {input:?}")]
    UnparseableReference {
        /// The original reference string.
        input: String,
    },

    /// Coordinates that cannot form a passage (zero chapter, end before start)
    #[error("Invalid passage range: {message}")]
    InvalidRange {
        /// Description of the violated constraint.
        message: String,
    },

    /// Chapter-length lookup miss during coverage resolution
    #[error("No verse count for {book} chapter {chapter}")]
    MissingChapterLength {
        /// Book being resolved.
        book: Book,
        /// Chapter with no table entry.
        chapter: u32,
    },

    /// Chapter-length table that cannot be used at all
    #[error("Malformed chapter table for {book}: {message}")]
    MalformedChapterTable {
        /// Book whose entry is malformed.
        book: Book,
        /// Description of the problem.
        message: String,
    },

    /// Book name not present in the alias table
    #[error("Unknown book: {0:?}")]
    UnknownBook(String),

    /// Coverage resolution requested for a work with no units
    #[error("Cannot resolve coverage of an empty unit sequence")]
    EmptySequence,

    /// Two units in one work claim the same number
    #[error("Unit number {unit_number} appears more than once")]
    DuplicateUnit {
        /// The repeated unit number.
        unit_number: u32,
    },

    /// A unit's passage belongs to a different book than the work
    #[error("Unit {unit_number} covers {found}, expected {expected}")]
    BookMismatch {
        /// Unit carrying the foreign passage.
        unit_number: u32,
        /// Book the work treats.
        expected: Book,
        /// Book found on the unit.
        found: Book,
    },

    /// Two inputs of one batch would write the same output directory
    #[error("Output {name:?} is claimed by {count} inputs; rename the work or file")]
    OutputConflict {
        /// Output directory name.
        name: String,
        /// How many inputs claim it.
        count: usize,
    },

    /// Eusebian canon record error
    #[error("Canon table error: {0}")]
    Canon(String),

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a JSON error with path context
    pub fn json(source: serde_json::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Json { source, path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a numeral error for the given input
    pub fn numeral(input: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidNumeral { input: input.into(), reason }
    }

    /// Create an unparseable-reference error carrying the original string
    pub fn unparseable(input: impl Into<String>) -> Self {
        Self::UnparseableReference { input: input.into() }
    }

    /// Create an invalid-range error
    pub fn range(message: impl Into<String>) -> Self {
        Self::InvalidRange { message: message.into() }
    }

    /// Whether this error is a data problem in one reference (as opposed to
    /// configuration or I/O), which callers may choose to tolerate.
    pub const fn is_reference_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidNumeral { .. } | Self::UnparseableReference { .. } | Self::InvalidRange { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { source: e, path: None }
    }
}
