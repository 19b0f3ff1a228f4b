//! Eusebian canon tables: which canon row a Gospel section belongs to.
//!
//! Section references look like `"3.10-16A"`; the letter marks a part of a
//! verse and is dropped. Each section's start verse is keyed to its canon
//! reference written `"<canon in Roman>.<row>"`, e.g. `"II.5"`.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use crate::bible::numerals;
use crate::bible::{parse_reference, Book, Position};
use crate::constants::canon::CANON_COUNT;
use crate::error::{Error, Result};

/// Regex matching a verse-part letter glued to a number (`16A`, `9b`).
#[allow(clippy::expect_used)]
static RE_VERSE_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)[A-Za-z]+\b").expect("valid regex: RE_VERSE_PART")
});

/// Gospels taking part in each canon, I through XIII.
static CANON_GOSPELS: [&[Book]; CANON_COUNT as usize] = [
    &[Book::Matthew, Book::Mark, Book::Luke, Book::John],
    &[Book::Matthew, Book::Mark, Book::Luke],
    &[Book::Matthew, Book::Luke, Book::John],
    &[Book::Matthew, Book::Mark, Book::John],
    &[Book::Matthew, Book::Luke],
    &[Book::Matthew, Book::Mark],
    &[Book::Matthew, Book::John],
    &[Book::Luke, Book::Mark],
    &[Book::Luke, Book::John],
    &[Book::Matthew],
    &[Book::Mark],
    &[Book::Luke],
    &[Book::John],
];

/// Gospels listed in canon `canon` (1-based).
pub fn canon_gospels(canon: u32) -> Result<&'static [Book]> {
    canon
        .checked_sub(1)
        .and_then(|i| CANON_GOSPELS.get(usize::try_from(i).ok()?))
        .copied()
        .ok_or_else(|| Error::Canon(format!("canon {canon} outside I-XIII")))
}

/// A row of one canon table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonRef {
    canon: NonZeroU32,
    /// Row within the canon table.
    pub row: u32,
}

impl CanonRef {
    /// Create a reference, checking the canon number.
    pub fn new(canon: u32, row: u32) -> Result<Self> {
        canon_gospels(canon)?;
        let canon = NonZeroU32::new(canon).ok_or_else(|| Error::Canon("canon 0".to_string()))?;
        Ok(Self { canon, row })
    }

    /// Canon number, 1 through 13.
    pub const fn canon(&self) -> u32 {
        self.canon.get()
    }
}

impl fmt::Display for CanonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", numerals::encode(self.canon), self.row)
    }
}

impl Serialize for CanonRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One Gospel's section in one canon row, as read from the canon tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Canon number (1-13).
    pub canon: u32,
    /// Row within the canon.
    pub row: u32,
    /// Gospel the section belongs to.
    pub gospel: Book,
    /// Section reference, e.g. `"3.10-16A"`.
    pub reference: String,
}

/// First verse of a section reference such as `"3.10-16A"` or `"1.1"`.
pub fn section_start(gospel: Book, reference: &str) -> Result<Position> {
    let cleaned = RE_VERSE_PART.replace_all(reference, "$1");
    Ok(parse_reference(gospel, &cleaned)?.start())
}

/// Gospel → start verse → canon rows whose section starts there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VerseToCanonIndex {
    gospels: BTreeMap<Book, BTreeMap<Position, Vec<CanonRef>>>,
}

impl VerseToCanonIndex {
    /// Build from section records. Fails on a canon outside I-XIII, a
    /// gospel absent from its canon, or an unparseable section reference.
    pub fn build(records: &[SectionRecord]) -> Result<Self> {
        let mut gospels: BTreeMap<Book, BTreeMap<Position, Vec<CanonRef>>> = BTreeMap::new();
        for record in records {
            if !canon_gospels(record.canon)?.contains(&record.gospel) {
                return Err(Error::Canon(format!(
                    "{} has no column in canon {}",
                    record.gospel, record.canon
                )));
            }
            let canon_ref = CanonRef::new(record.canon, record.row)?;
            let start = section_start(record.gospel, &record.reference)?;
            gospels
                .entry(record.gospel)
                .or_default()
                .entry(start)
                .or_default()
                .push(canon_ref);
        }
        for verses in gospels.values_mut() {
            for refs in verses.values_mut() {
                refs.sort_unstable();
                refs.dedup();
            }
        }
        Ok(Self { gospels })
    }

    /// Canon rows whose `gospel` section starts at `position`.
    pub fn get(&self, gospel: Book, position: Position) -> &[CanonRef] {
        self.gospels
            .get(&gospel)
            .and_then(|verses| verses.get(&position))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of indexed start verses for `gospel`.
    pub fn verse_count(&self, gospel: Book) -> usize {
        self.gospels.get(&gospel).map_or(0, BTreeMap::len)
    }
}
