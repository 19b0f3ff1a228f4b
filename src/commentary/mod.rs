//! Commentary units (homilies, sermons) and their construction from source records.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bible::numerals;
use crate::bible::{parse_reference, Book, PassageRange, Position};
use crate::constants::units::MAX_LABEL_SPAN;
use crate::error::{Error, Result};

pub mod coverage;
pub mod index;

pub use coverage::{CoverageResolver, Resolution, SequenceGap};
pub use index::{IndexEntry, VerseToUnitsIndex};

/// Separators between numbers in a unit label ("8 & 9", "8 and 9", "8, 9").
#[allow(clippy::expect_used)]
static RE_LABEL_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:&amp;|&|,|\band\b)\s*").expect("valid regex: RE_LABEL_SEPARATOR")
});

/// Regex matching a leading word like `Homily`, `Sermons`, `Hom.`.
#[allow(clippy::expect_used)]
static RE_LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:homil(?:y|ies)|hom\.|sermons?|serm\.|discourses?|sections?)\s*")
        .expect("valid regex: RE_LABEL_PREFIX")
});

/// One homily, sermon or section of commentary on a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryUnit {
    unit_number: NonZeroU32,
    /// Display title, often embedding the source reference text.
    pub title: String,
    /// Passage treated; the end may still be a placeholder until resolved.
    pub coverage: PassageRange,
}

impl CommentaryUnit {
    /// Create a unit. Unit numbers are 1-based.
    pub fn new(unit_number: u32, title: impl Into<String>, coverage: PassageRange) -> Result<Self> {
        let unit_number = NonZeroU32::new(unit_number)
            .ok_or_else(|| Error::numeral("0", "unit numbers start at 1"))?;
        Ok(Self { unit_number, title: title.into(), coverage })
    }

    /// Position of the unit within its work.
    pub const fn unit_number(&self) -> u32 {
        self.unit_number.get()
    }

    /// Roman form of the unit number ("XLV"), always derived.
    pub fn roman_numeral(&self) -> String {
        numerals::encode(self.unit_number)
    }

    /// Book the unit comments on.
    pub const fn book(&self) -> Book {
        self.coverage.book()
    }

    /// First verse treated.
    pub const fn start(&self) -> Position {
        self.coverage.start()
    }
}

impl fmt::Display for CommentaryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Homily {} ({})", self.roman_numeral(), self.coverage)
    }
}

/// Persisted shape of a resolved unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRecord {
    /// Unit number.
    pub homily_number: u32,
    /// Unit number in Roman form.
    pub homily_roman: String,
    /// First chapter treated.
    pub start_chapter: u32,
    /// First verse treated.
    pub start_verse: u32,
    /// Last chapter treated.
    pub end_chapter: u32,
    /// Last verse treated.
    pub end_verse: u32,
    /// Display title.
    pub title: String,
}

impl From<&CommentaryUnit> for CoverageRecord {
    fn from(unit: &CommentaryUnit) -> Self {
        Self {
            homily_number: unit.unit_number(),
            homily_roman: unit.roman_numeral(),
            start_chapter: unit.coverage.start_chapter(),
            start_verse: unit.coverage.start_verse(),
            end_chapter: unit.coverage.end_chapter(),
            end_verse: unit.coverage.end_verse(),
            title: unit.title.clone(),
        }
    }
}

/// Minimal per-unit metadata handed over by a source adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Unit number, when the source gives exactly one.
    #[serde(default)]
    pub unit_number: Option<u32>,
    /// Label naming one or more units ("8 & 9", "XLV"), used when `unit_number` is absent.
    #[serde(default)]
    pub unit_label: Option<String>,
    /// Display title.
    pub title: String,
    /// Reference text for the start; the title is used when absent.
    #[serde(default)]
    pub reference: Option<String>,
    /// Reference text for an explicit end (e.g. the last verse quoted in the unit).
    #[serde(default)]
    pub end_reference: Option<String>,
}

impl SourceRecord {
    /// Record with a number and a title that doubles as the reference.
    pub fn new(unit_number: u32, title: impl Into<String>) -> Self {
        Self {
            unit_number: Some(unit_number),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Unit numbers this record stands for.
    pub fn unit_numbers(&self) -> Result<Vec<u32>> {
        match (self.unit_number, self.unit_label.as_deref()) {
            (Some(n), _) => Ok(vec![n]),
            (None, Some(label)) => parse_unit_numbers(label),
            (None, None) => Err(Error::Msg(format!(
                "Record {:?} has neither unit_number nor unit_label",
                self.title
            ))),
        }
    }

    fn reference_text(&self) -> &str {
        self.reference.as_deref().unwrap_or(&self.title)
    }
}

/// What to do with a reference none of the grammars recognize.
///
/// The library never decides this on its own; `Reject` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnparseablePolicy {
    /// Fail the whole work.
    #[default]
    Reject,
    /// Substitute 1:1 and log a warning naming the unit and the raw string.
    OpeningVerse,
}

impl FromStr for UnparseablePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "opening_verse" | "opening-verse" => Ok(Self::OpeningVerse),
            other => Err(Error::config(
                format!("unknown unparseable-reference policy {other:?}"),
                "Use `reject` or `opening_verse`",
            )),
        }
    }
}

/// Parse a unit label such as `"8 & 9"`, `"Sermons 12-13"` or `"Homily XLV."`.
///
/// Numbers may be Arabic or Roman; ranges expand inclusively.
pub fn parse_unit_numbers(label: &str) -> Result<Vec<u32>> {
    let body = RE_LABEL_PREFIX.replace(label, "");
    let body = body.trim().trim_end_matches(['.', ':']).trim();
    if body.is_empty() {
        return Err(Error::numeral(label, "no unit number in label"));
    }

    let mut numbers = Vec::new();
    for part in RE_LABEL_SEPARATOR.split(body).filter(|p| !p.is_empty()) {
        if let Some((from, to)) = part.split_once(['-', '–']) {
            let from = numerals::parse_number(from)?;
            let to = numerals::parse_number(to)?;
            if to < from {
                return Err(Error::numeral(label, "descending unit range"));
            }
            if to - from >= MAX_LABEL_SPAN {
                return Err(Error::numeral(label, "unit range too long"));
            }
            numbers.extend(from..=to);
        } else {
            numbers.push(numerals::parse_number(part)?);
        }
    }
    Ok(numbers)
}

/// Turn source records into units with parsed starts (and explicit ends
/// where the source supplies them), sorted by unit number.
pub fn units_from_records(
    book: Book,
    records: &[SourceRecord],
    policy: UnparseablePolicy,
) -> Result<Vec<CommentaryUnit>> {
    let mut units = Vec::with_capacity(records.len());
    for record in records {
        let numbers = record.unit_numbers()?;
        let coverage = record_coverage(book, record, policy)?;
        for number in numbers {
            units.push(CommentaryUnit::new(number, record.title.clone(), coverage)?);
        }
    }
    units.sort_by_key(CommentaryUnit::unit_number);
    Ok(units)
}

fn record_coverage(
    book: Book,
    record: &SourceRecord,
    policy: UnparseablePolicy,
) -> Result<PassageRange> {
    let raw = record.reference_text();
    let coverage = match parse_reference(book, raw) {
        Ok(range) => range,
        Err(e) if e.is_reference_error() && policy == UnparseablePolicy::OpeningVerse => {
            tracing::warn!("{:?}: {e}; using {book} 1:1 per caller policy", record.title);
            PassageRange::at(book, Position::new(1, 1))?
        }
        Err(e) => return Err(e),
    };

    let Some(end_raw) = record.end_reference.as_deref() else {
        return Ok(coverage);
    };
    match parse_reference(book, end_raw) {
        Ok(end) if end.end() > coverage.end() => coverage.with_end(end.end()),
        Ok(end) => {
            tracing::debug!(
                "{:?}: end reference {end} does not extend {coverage}, ignored",
                record.title
            );
            Ok(coverage)
        }
        Err(e) if e.is_reference_error() && policy == UnparseablePolicy::OpeningVerse => {
            tracing::warn!("{:?}: {e}; end reference ignored per caller policy", record.title);
            Ok(coverage)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_roman_numeral_is_derived() {
        let range = PassageRange::at(Book::Matthew, Position::new(12, 46)).unwrap();
        let unit = CommentaryUnit::new(44, "Matthew XII. 46.", range).unwrap();
        assert_eq!(unit.roman_numeral(), "XLIV");
        assert_eq!(unit.to_string(), "Homily XLIV (Matthew 12:46)");
        assert!(CommentaryUnit::new(0, "", range).is_err());
    }

    #[test]
    fn test_coverage_record_shape() {
        let range = PassageRange::new(Book::Matthew, Position::new(1, 1), Position::new(1, 16)).unwrap();
        let unit = CommentaryUnit::new(2, "Matt. 1:1-16", range).unwrap();
        let json = serde_json::to_value(CoverageRecord::from(&unit)).unwrap();
        assert_eq!(json["homily_number"], 2);
        assert_eq!(json["homily_roman"], "II");
        assert_eq!(json["end_verse"], 16);
        assert_eq!(json["title"], "Matt. 1:1-16");
    }

    #[test]
    fn test_parse_unit_numbers() {
        assert_eq!(parse_unit_numbers("8 & 9").unwrap(), vec![8, 9]);
        assert_eq!(parse_unit_numbers("8 &amp; 9").unwrap(), vec![8, 9]);
        assert_eq!(parse_unit_numbers("Sermons 12-14").unwrap(), vec![12, 13, 14]);
        assert_eq!(parse_unit_numbers("Homily XLV.").unwrap(), vec![45]);
        assert_eq!(parse_unit_numbers("III and IV").unwrap(), vec![3, 4]);
        assert!(parse_unit_numbers("Sermon").is_err());
        assert!(parse_unit_numbers("9-8").is_err());
    }

    #[test]
    fn test_unit_range_is_bounded() {
        assert_eq!(parse_unit_numbers("Sermons 1-500").unwrap().len(), 500);
        for label in ["Sermons 1-501", "Sermons 1-20000000", "Homilies 1-4000000000"] {
            assert!(
                matches!(parse_unit_numbers(label), Err(Error::InvalidNumeral { .. })),
                "{label}"
            );
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("reject".parse::<UnparseablePolicy>().unwrap(), UnparseablePolicy::Reject);
        assert_eq!(
            "opening_verse".parse::<UnparseablePolicy>().unwrap(),
            UnparseablePolicy::OpeningVerse
        );
        assert!(matches!("maybe".parse::<UnparseablePolicy>(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_units_from_records_sorted_and_expanded() {
        let records = vec![
            SourceRecord::new(3, "Matthew I. 18."),
            SourceRecord {
                unit_label: Some("1 & 2".to_string()),
                title: "Matthew I. 1.".to_string(),
                ..SourceRecord::default()
            },
        ];
        let units = units_from_records(Book::Matthew, &records, UnparseablePolicy::Reject).unwrap();
        let numbers: Vec<u32> = units.iter().map(CommentaryUnit::unit_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(units[0].start(), Position::new(1, 1));
        assert_eq!(units[1].start(), Position::new(1, 1));
        assert_eq!(units[2].start(), Position::new(1, 18));
    }

    #[test]
    fn test_reference_overrides_title() {
        let record = SourceRecord {
            unit_number: Some(5),
            title: "Homily V.".to_string(),
            reference: Some("Matt. 2:1".to_string()),
            ..SourceRecord::default()
        };
        let units = units_from_records(Book::Matthew, &[record], UnparseablePolicy::Reject).unwrap();
        assert_eq!(units[0].start(), Position::new(2, 1));
    }

    #[test]
    fn test_end_reference_supplies_explicit_end() {
        let record = SourceRecord {
            end_reference: Some("Matthew I. 22, 23".to_string()),
            ..SourceRecord::new(5, "Matthew I. 18.")
        };
        let units = units_from_records(Book::Matthew, &[record], UnparseablePolicy::Reject).unwrap();
        assert_eq!(units[0].coverage.end(), Position::new(1, 23));
    }

    #[test]
    fn test_unparseable_policy() {
        let records = vec![SourceRecord::new(1, "Preface.")];
        let err = units_from_records(Book::John, &records, UnparseablePolicy::Reject).unwrap_err();
        assert!(matches!(err, Error::UnparseableReference { .. }));

        let units = units_from_records(Book::John, &records, UnparseablePolicy::OpeningVerse).unwrap();
        assert_eq!(units[0].start(), Position::new(1, 1));
        assert!(units[0].coverage.is_single_verse());
    }
}
