//! Per-chapter verse counts.
//!
//! Coverage inference leans on this table whenever a unit runs to the end of
//! a chapter, so a missing entry is an error rather than a guess.

use std::collections::HashMap;

use serde::Deserialize;

use super::{Book, Position};
use crate::error::{Error, Result};

/// Verse counts (KJV versification) for the New Testament.
const NEW_TESTAMENT: &[(Book, &[u32])] = &[
    (Book::Matthew, &[
        25, 23, 17, 25, 48, 34, 29, 34, 38, 42, 30, 50, 58, 36, 39, 28, 27, 35, 30, 34, 46, 46, 39, 51,
        46, 75, 66, 20,
    ]),
    (Book::Mark, &[45, 28, 35, 41, 43, 56, 37, 38, 50, 52, 33, 44, 37, 72, 47, 20]),
    (Book::Luke, &[
        80, 52, 38, 44, 39, 49, 50, 56, 62, 42, 54, 59, 35, 35, 32, 31, 37, 43, 48, 47, 38, 71, 56, 53,
    ]),
    (Book::John, &[
        51, 25, 36, 54, 47, 71, 53, 59, 41, 42, 57, 50, 38, 31, 27, 33, 26, 40, 42, 31, 25,
    ]),
    (Book::Acts, &[
        26, 47, 26, 37, 42, 15, 60, 40, 43, 48, 30, 25, 52, 28, 41, 40, 34, 28, 41, 38, 40, 30, 35, 27,
        27, 32, 44, 31,
    ]),
    (Book::Romans, &[32, 29, 31, 25, 21, 23, 25, 39, 33, 21, 36, 21, 14, 23, 33, 27]),
    (Book::FirstCorinthians, &[31, 16, 23, 21, 13, 20, 40, 13, 27, 33, 34, 31, 13, 40, 58, 24]),
    (Book::SecondCorinthians, &[24, 17, 18, 18, 21, 18, 16, 24, 15, 18, 33, 21, 14]),
    (Book::Galatians, &[24, 21, 29, 31, 26, 18]),
    (Book::Ephesians, &[23, 22, 21, 32, 33, 24]),
    (Book::Philippians, &[30, 30, 21, 23]),
    (Book::Colossians, &[29, 23, 25, 18]),
    (Book::FirstThessalonians, &[10, 20, 13, 18, 28]),
    (Book::SecondThessalonians, &[12, 17, 18]),
    (Book::FirstTimothy, &[20, 15, 16, 16, 25, 21]),
    (Book::SecondTimothy, &[18, 26, 17, 22]),
    (Book::Titus, &[16, 15, 15]),
    (Book::Philemon, &[25]),
    (Book::Hebrews, &[14, 18, 19, 16, 14, 20, 28, 13, 28, 39, 40, 29, 25]),
    (Book::James, &[27, 26, 18, 17, 20]),
    (Book::FirstPeter, &[25, 25, 22, 19, 14]),
    (Book::SecondPeter, &[21, 22, 18]),
    (Book::FirstJohn, &[10, 29, 24, 21, 21]),
    (Book::SecondJohn, &[13]),
    (Book::ThirdJohn, &[14]),
    (Book::Jude, &[25]),
    (Book::Revelation, &[
        20, 29, 22, 11, 14, 17, 17, 13, 21, 11, 19, 17, 18, 20, 8, 21, 18, 24, 21, 15, 27, 21,
    ]),
];

/// Immutable book → verse-count-per-chapter table.
///
/// Cheap to share across threads; pass it by reference into the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HashMap<Book, Vec<u32>>")]
pub struct ChapterLengths {
    books: HashMap<Book, Vec<u32>>,
}

impl ChapterLengths {
    /// Build a table, rejecting books with no chapters or a zero count.
    pub fn new(books: HashMap<Book, Vec<u32>>) -> Result<Self> {
        for (book, counts) in &books {
            validate(*book, counts)?;
        }
        Ok(Self { books })
    }

    /// The built-in New Testament table.
    pub fn new_testament() -> Self {
        Self {
            books: NEW_TESTAMENT
                .iter()
                .map(|(book, counts)| (*book, counts.to_vec()))
                .collect(),
        }
    }

    /// Parse a JSON object of the form `{"Matthew": [25, 23, ...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Return a table where every book in `other` replaces the entry here.
    #[must_use]
    pub fn merged_with(mut self, other: Self) -> Self {
        self.books.extend(other.books);
        self
    }

    /// Whether the table has any entry for `book`.
    pub fn contains(&self, book: Book) -> bool {
        self.books.contains_key(&book)
    }

    /// Number of chapters in `book`.
    pub fn chapter_count(&self, book: Book) -> Result<u32> {
        let counts = self.counts(book, 1)?;
        u32::try_from(counts.len()).map_err(|_| Error::MalformedChapterTable {
            book,
            message: "too many chapters".to_string(),
        })
    }

    /// Verse count of `chapter` in `book`.
    pub fn verse_count(&self, book: Book, chapter: u32) -> Result<u32> {
        let counts = self.counts(book, chapter)?;
        chapter
            .checked_sub(1)
            .and_then(|i| counts.get(usize::try_from(i).ok()?))
            .copied()
            .ok_or(Error::MissingChapterLength { book, chapter })
    }

    /// Last verse of the book, e.g. `28:20` for Matthew.
    pub fn final_position(&self, book: Book) -> Result<Position> {
        let chapter = self.chapter_count(book)?;
        Ok(Position::new(chapter, self.verse_count(book, chapter)?))
    }

    /// Whether `position` lies inside the book according to this table.
    pub fn contains_position(&self, book: Book, position: Position) -> bool {
        position.verse > 0
            && self
                .verse_count(book, position.chapter)
                .is_ok_and(|count| position.verse <= count)
    }

    fn counts(&self, book: Book, chapter: u32) -> Result<&[u32]> {
        self.books
            .get(&book)
            .map(Vec::as_slice)
            .ok_or(Error::MissingChapterLength { book, chapter })
    }
}

impl TryFrom<HashMap<Book, Vec<u32>>> for ChapterLengths {
    type Error = Error;

    fn try_from(books: HashMap<Book, Vec<u32>>) -> Result<Self> {
        Self::new(books)
    }
}

fn validate(book: Book, counts: &[u32]) -> Result<()> {
    if counts.is_empty() {
        return Err(Error::MalformedChapterTable {
            book,
            message: "no chapters listed".to_string(),
        });
    }
    if let Some(i) = counts.iter().position(|&c| c == 0) {
        return Err(Error::MalformedChapterTable {
            book,
            message: format!("chapter {} has zero verses", i + 1),
        });
    }
    Ok(())
}
