//! Biblical books, verse positions and canonical passage ranges.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

pub mod chapters;
pub mod numerals;
pub mod reference;

pub use chapters::ChapterLengths;
pub use reference::parse_reference;

/// A book of the Bible (Protestant canon order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[allow(missing_docs)]
pub enum Book {
    Genesis,
    Exodus,
    Leviticus,
    Numbers,
    Deuteronomy,
    Joshua,
    Judges,
    Ruth,
    FirstSamuel,
    SecondSamuel,
    FirstKings,
    SecondKings,
    FirstChronicles,
    SecondChronicles,
    Ezra,
    Nehemiah,
    Esther,
    Job,
    Psalms,
    Proverbs,
    Ecclesiastes,
    SongOfSolomon,
    Isaiah,
    Jeremiah,
    Lamentations,
    Ezekiel,
    Daniel,
    Hosea,
    Joel,
    Amos,
    Obadiah,
    Jonah,
    Micah,
    Nahum,
    Habakkuk,
    Zephaniah,
    Haggai,
    Zechariah,
    Malachi,
    Matthew,
    Mark,
    Luke,
    John,
    Acts,
    Romans,
    FirstCorinthians,
    SecondCorinthians,
    Galatians,
    Ephesians,
    Philippians,
    Colossians,
    FirstThessalonians,
    SecondThessalonians,
    FirstTimothy,
    SecondTimothy,
    Titus,
    Philemon,
    Hebrews,
    James,
    FirstPeter,
    SecondPeter,
    FirstJohn,
    SecondJohn,
    ThirdJohn,
    Jude,
    Revelation,
}

impl Book {
    /// Canonical English name, as used in passage strings ("Matthew 1:1").
    pub const fn name(self) -> &'static str {
        match self {
            Self::Genesis => "Genesis",
            Self::Exodus => "Exodus",
            Self::Leviticus => "Leviticus",
            Self::Numbers => "Numbers",
            Self::Deuteronomy => "Deuteronomy",
            Self::Joshua => "Joshua",
            Self::Judges => "Judges",
            Self::Ruth => "Ruth",
            Self::FirstSamuel => "1 Samuel",
            Self::SecondSamuel => "2 Samuel",
            Self::FirstKings => "1 Kings",
            Self::SecondKings => "2 Kings",
            Self::FirstChronicles => "1 Chronicles",
            Self::SecondChronicles => "2 Chronicles",
            Self::Ezra => "Ezra",
            Self::Nehemiah => "Nehemiah",
            Self::Esther => "Esther",
            Self::Job => "Job",
            Self::Psalms => "Psalms",
            Self::Proverbs => "Proverbs",
            Self::Ecclesiastes => "Ecclesiastes",
            Self::SongOfSolomon => "Song of Solomon",
            Self::Isaiah => "Isaiah",
            Self::Jeremiah => "Jeremiah",
            Self::Lamentations => "Lamentations",
            Self::Ezekiel => "Ezekiel",
            Self::Daniel => "Daniel",
            Self::Hosea => "Hosea",
            Self::Joel => "Joel",
            Self::Amos => "Amos",
            Self::Obadiah => "Obadiah",
            Self::Jonah => "Jonah",
            Self::Micah => "Micah",
            Self::Nahum => "Nahum",
            Self::Habakkuk => "Habakkuk",
            Self::Zephaniah => "Zephaniah",
            Self::Haggai => "Haggai",
            Self::Zechariah => "Zechariah",
            Self::Malachi => "Malachi",
            Self::Matthew => "Matthew",
            Self::Mark => "Mark",
            Self::Luke => "Luke",
            Self::John => "John",
            Self::Acts => "Acts",
            Self::Romans => "Romans",
            Self::FirstCorinthians => "1 Corinthians",
            Self::SecondCorinthians => "2 Corinthians",
            Self::Galatians => "Galatians",
            Self::Ephesians => "Ephesians",
            Self::Philippians => "Philippians",
            Self::Colossians => "Colossians",
            Self::FirstThessalonians => "1 Thessalonians",
            Self::SecondThessalonians => "2 Thessalonians",
            Self::FirstTimothy => "1 Timothy",
            Self::SecondTimothy => "2 Timothy",
            Self::Titus => "Titus",
            Self::Philemon => "Philemon",
            Self::Hebrews => "Hebrews",
            Self::James => "James",
            Self::FirstPeter => "1 Peter",
            Self::SecondPeter => "2 Peter",
            Self::FirstJohn => "1 John",
            Self::SecondJohn => "2 John",
            Self::ThirdJohn => "3 John",
            Self::Jude => "Jude",
            Self::Revelation => "Revelation",
        }
    }

    /// Look up a book by any known name or abbreviation.
    ///
    /// Case-insensitive; tolerates a trailing period ("Matt.") and a missing
    /// space in numbered books ("1cor").
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().trim_end_matches('.').trim().to_lowercase();
        if let Some(&book) = BOOK_ALIASES.get(lower.as_str()) {
            return Some(book);
        }

        // Try without spaces for numbered books
        let no_space = lower.replace(' ', "");
        BOOK_ALIASES.get(no_space.as_str()).copied()
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Book {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| Error::UnknownBook(s.to_string()))
    }
}

impl TryFrom<String> for Book {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Book> for String {
    fn from(book: Book) -> Self {
        book.name().to_string()
    }
}

lazy_static! {
    /// Book name normalization map
    static ref BOOK_ALIASES: HashMap<&'static str, Book> = {
        let mut m = HashMap::new();
        m.insert("gen", Book::Genesis);
        m.insert("genesis", Book::Genesis);
        m.insert("ex", Book::Exodus);
        m.insert("exod", Book::Exodus);
        m.insert("exodus", Book::Exodus);
        m.insert("lev", Book::Leviticus);
        m.insert("leviticus", Book::Leviticus);
        m.insert("num", Book::Numbers);
        m.insert("numbers", Book::Numbers);
        m.insert("deut", Book::Deuteronomy);
        m.insert("deuteronomy", Book::Deuteronomy);
        m.insert("josh", Book::Joshua);
        m.insert("joshua", Book::Joshua);
        m.insert("judg", Book::Judges);
        m.insert("judges", Book::Judges);
        m.insert("ruth", Book::Ruth);
        m.insert("1sam", Book::FirstSamuel);
        m.insert("1samuel", Book::FirstSamuel);
        m.insert("2sam", Book::SecondSamuel);
        m.insert("2samuel", Book::SecondSamuel);
        m.insert("1kings", Book::FirstKings);
        m.insert("1kgs", Book::FirstKings);
        m.insert("2kings", Book::SecondKings);
        m.insert("2kgs", Book::SecondKings);
        m.insert("1chr", Book::FirstChronicles);
        m.insert("1chronicles", Book::FirstChronicles);
        m.insert("2chr", Book::SecondChronicles);
        m.insert("2chronicles", Book::SecondChronicles);
        m.insert("ezra", Book::Ezra);
        m.insert("neh", Book::Nehemiah);
        m.insert("nehemiah", Book::Nehemiah);
        m.insert("esth", Book::Esther);
        m.insert("esther", Book::Esther);
        m.insert("job", Book::Job);
        m.insert("ps", Book::Psalms);
        m.insert("psa", Book::Psalms);
        m.insert("psalm", Book::Psalms);
        m.insert("psalms", Book::Psalms);
        m.insert("prov", Book::Proverbs);
        m.insert("proverbs", Book::Proverbs);
        m.insert("eccl", Book::Ecclesiastes);
        m.insert("eccles", Book::Ecclesiastes);
        m.insert("ecclesiastes", Book::Ecclesiastes);
        m.insert("song", Book::SongOfSolomon);
        m.insert("song of solomon", Book::SongOfSolomon);
        m.insert("song of songs", Book::SongOfSolomon);
        m.insert("isa", Book::Isaiah);
        m.insert("isaiah", Book::Isaiah);
        m.insert("jer", Book::Jeremiah);
        m.insert("jeremiah", Book::Jeremiah);
        m.insert("lam", Book::Lamentations);
        m.insert("lamentations", Book::Lamentations);
        m.insert("ezek", Book::Ezekiel);
        m.insert("ezekiel", Book::Ezekiel);
        m.insert("dan", Book::Daniel);
        m.insert("daniel", Book::Daniel);
        m.insert("hos", Book::Hosea);
        m.insert("hosea", Book::Hosea);
        m.insert("joel", Book::Joel);
        m.insert("amos", Book::Amos);
        m.insert("obad", Book::Obadiah);
        m.insert("obadiah", Book::Obadiah);
        m.insert("jonah", Book::Jonah);
        m.insert("mic", Book::Micah);
        m.insert("micah", Book::Micah);
        m.insert("nah", Book::Nahum);
        m.insert("nahum", Book::Nahum);
        m.insert("hab", Book::Habakkuk);
        m.insert("habakkuk", Book::Habakkuk);
        m.insert("zeph", Book::Zephaniah);
        m.insert("zephaniah", Book::Zephaniah);
        m.insert("hag", Book::Haggai);
        m.insert("haggai", Book::Haggai);
        m.insert("zech", Book::Zechariah);
        m.insert("zechariah", Book::Zechariah);
        m.insert("mal", Book::Malachi);
        m.insert("malachi", Book::Malachi);
        // New Testament
        m.insert("mt", Book::Matthew);
        m.insert("matt", Book::Matthew);
        m.insert("matth", Book::Matthew);
        m.insert("matthew", Book::Matthew);
        m.insert("mk", Book::Mark);
        m.insert("mc", Book::Mark);
        m.insert("mar", Book::Mark);
        m.insert("mark", Book::Mark);
        m.insert("lk", Book::Luke);
        m.insert("lc", Book::Luke);
        m.insert("luk", Book::Luke);
        m.insert("luke", Book::Luke);
        m.insert("jn", Book::John);
        m.insert("joh", Book::John);
        m.insert("john", Book::John);
        m.insert("acts", Book::Acts);
        m.insert("rom", Book::Romans);
        m.insert("romans", Book::Romans);
        m.insert("1cor", Book::FirstCorinthians);
        m.insert("1corinthians", Book::FirstCorinthians);
        m.insert("2cor", Book::SecondCorinthians);
        m.insert("2corinthians", Book::SecondCorinthians);
        m.insert("gal", Book::Galatians);
        m.insert("galatians", Book::Galatians);
        m.insert("eph", Book::Ephesians);
        m.insert("ephesians", Book::Ephesians);
        m.insert("phil", Book::Philippians);
        m.insert("philippians", Book::Philippians);
        m.insert("col", Book::Colossians);
        m.insert("colossians", Book::Colossians);
        m.insert("1thess", Book::FirstThessalonians);
        m.insert("1thessalonians", Book::FirstThessalonians);
        m.insert("2thess", Book::SecondThessalonians);
        m.insert("2thessalonians", Book::SecondThessalonians);
        m.insert("1tim", Book::FirstTimothy);
        m.insert("1timothy", Book::FirstTimothy);
        m.insert("2tim", Book::SecondTimothy);
        m.insert("2timothy", Book::SecondTimothy);
        m.insert("tit", Book::Titus);
        m.insert("titus", Book::Titus);
        m.insert("philem", Book::Philemon);
        m.insert("philemon", Book::Philemon);
        m.insert("heb", Book::Hebrews);
        m.insert("hebrews", Book::Hebrews);
        m.insert("james", Book::James);
        m.insert("jas", Book::James);
        m.insert("1pet", Book::FirstPeter);
        m.insert("1peter", Book::FirstPeter);
        m.insert("2pet", Book::SecondPeter);
        m.insert("2peter", Book::SecondPeter);
        m.insert("1john", Book::FirstJohn);
        m.insert("2john", Book::SecondJohn);
        m.insert("3john", Book::ThirdJohn);
        m.insert("jude", Book::Jude);
        m.insert("rev", Book::Revelation);
        m.insert("apoc", Book::Revelation);
        m.insert("revelation", Book::Revelation);
        m.insert("revelations", Book::Revelation);
        m
    };
}

/// A single verse location within a book, ordered chapter-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Chapter number (1-based).
    pub chapter: u32,
    /// Verse number (1-based).
    pub verse: u32,
}

impl Position {
    /// Create a position. Zero coordinates are rejected by [`PassageRange`], not here.
    pub const fn new(chapter: u32, verse: u32) -> Self {
        Self { chapter, verse }
    }

    /// Whether both coordinates are 1-based positive numbers.
    pub const fn is_valid(self) -> bool {
        self.chapter > 0 && self.verse > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parse a `"chapter:verse"` key.
    fn from_str(s: &str) -> Result<Self> {
        let (chapter, verse) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| Error::range(format!("expected chapter:verse, got {s:?}")))?;
        let chapter = chapter
            .parse()
            .map_err(|_| Error::range(format!("bad chapter in {s:?}")))?;
        let verse = verse
            .parse()
            .map_err(|_| Error::range(format!("bad verse in {s:?}")))?;
        Ok(Self { chapter, verse })
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The canonical normalized reference: a contiguous span of one book.
///
/// Always satisfies `start <= end` with positive coordinates; construct via
/// [`PassageRange::new`] or [`PassageRange::at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassageRange {
    book: Book,
    start: Position,
    end: Position,
}

impl PassageRange {
    /// Create a validated range.
    pub fn new(book: Book, start: Position, end: Position) -> Result<Self> {
        if !start.is_valid() || !end.is_valid() {
            return Err(Error::range(format!(
                "{book} {start}-{end}: chapters and verses are 1-based"
            )));
        }
        if end < start {
            return Err(Error::range(format!("{book} {start}-{end}: end precedes start")));
        }
        Ok(Self { book, start, end })
    }

    /// A single-verse range (end placeholder equal to start).
    pub fn at(book: Book, start: Position) -> Result<Self> {
        Self::new(book, start, start)
    }

    /// The same start with a different end.
    pub fn with_end(self, end: Position) -> Result<Self> {
        Self::new(self.book, self.start, end)
    }

    /// Book this range belongs to.
    pub const fn book(&self) -> Book {
        self.book
    }

    /// First verse covered.
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Last verse covered.
    pub const fn end(&self) -> Position {
        self.end
    }

    /// Starting chapter.
    pub const fn start_chapter(&self) -> u32 {
        self.start.chapter
    }

    /// Starting verse.
    pub const fn start_verse(&self) -> u32 {
        self.start.verse
    }

    /// Ending chapter.
    pub const fn end_chapter(&self) -> u32 {
        self.end.chapter
    }

    /// Ending verse.
    pub const fn end_verse(&self) -> u32 {
        self.end.verse
    }

    /// Whether the end is still the placeholder equal to the start.
    pub fn is_single_verse(&self) -> bool {
        self.start == self.end
    }

    /// `"Matthew 1:1"` style string for the start.
    pub fn start_label(&self) -> String {
        format!("{} {}", self.book, self.start)
    }

    /// `"Matthew 1:25"` style string for the end.
    pub fn end_label(&self) -> String {
        format!("{} {}", self.book, self.end)
    }
}

impl fmt::Display for PassageRange {
    /// Format for display (e.g., "Matthew 1:1-25", "Luke 9:57-10:3")
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_verse() {
            write!(f, "{} {}", self.book, self.start)
        } else if self.start.chapter == self.end.chapter {
            write!(f, "{} {}-{}", self.book, self.start, self.end.verse)
        } else {
            write!(f, "{} {}-{}", self.book, self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_book_aliases() {
        assert_eq!(Book::from_name("Matt."), Some(Book::Matthew));
        assert_eq!(Book::from_name("MATTHEW"), Some(Book::Matthew));
        assert_eq!(Book::from_name("1 Cor"), Some(Book::FirstCorinthians));
        assert_eq!(Book::from_name("1cor"), Some(Book::FirstCorinthians));
        assert_eq!(Book::from_name("3 John"), Some(Book::ThirdJohn));
        assert_eq!(Book::from_name("Song of Songs"), Some(Book::SongOfSolomon));
        assert_eq!(Book::from_name("Homily"), None);
        assert_eq!(Book::from_name("Lc."), Some(Book::Luke));
        assert_eq!(Book::from_name("Mc"), Some(Book::Mark));
    }

    #[test]
    fn test_book_serde_uses_name() {
        let json = serde_json::to_string(&Book::FirstJohn).unwrap();
        assert_eq!(json, "\"1 John\"");
        let back: Book = serde_json::from_str("\"Lk\"").unwrap();
        assert_eq!(back, Book::Luke);
        assert!(serde_json::from_str::<Book>("\"Hezekiah\"").is_err());
    }

    #[test]
    fn test_position_ordering_is_chapter_first() {
        assert!(Position::new(1, 25) < Position::new(2, 1));
        assert!(Position::new(2, 3) < Position::new(2, 10));
    }

    #[test]
    fn test_position_key_roundtrip() {
        let p: Position = "12:46".parse().unwrap();
        assert_eq!(p, Position::new(12, 46));
        assert_eq!(p.to_string(), "12:46");
        assert!("12".parse::<Position>().is_err());
    }

    #[test]
    fn test_range_rejects_end_before_start() {
        let err = PassageRange::new(Book::Mark, Position::new(2, 5), Position::new(2, 4));
        assert!(matches!(err, Err(Error::InvalidRange { .. })));
        let err = PassageRange::at(Book::Mark, Position::new(0, 1));
        assert!(matches!(err, Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn test_range_display() {
        let single = PassageRange::at(Book::John, Position::new(3, 16)).unwrap();
        assert_eq!(single.to_string(), "John 3:16");

        let same = single.with_end(Position::new(3, 21)).unwrap();
        assert_eq!(same.to_string(), "John 3:16-21");

        let cross = PassageRange::new(Book::Luke, Position::new(9, 57), Position::new(10, 3)).unwrap();
        assert_eq!(cross.to_string(), "Luke 9:57-10:3");
        assert_eq!(cross.end_label(), "Luke 10:3");
    }
}
