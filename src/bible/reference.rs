//! Scripture reference parsing.
//!
//! Turns the reference strings found in commentary titles, XML attributes and
//! table-of-contents prose into a [`PassageRange`]. The book always comes from
//! the caller; a book name in the text is only stripped (and checked).
//!
//! Recognized forms, tried in this order:
//! - Roman chapter with Arabic verses: `"Matt. I. 22, 23."`, `"Matthew V. 17-20"`;
//!   the period after the numeral is required
//! - Arabic chapter and verse: `"Matthew 5:17-20"`, `"John 1.35-37"`,
//!   `"Luke 9:57-10:3"`, `"Luke 2v1-20"`
//! - Bare chapter: `"John 13"` (verse 1 placeholder, resolved later)
//!
//! Only the first member of a `;` list is parsed, and for Arabic and bare
//! forms only the first `,` token. Use [`parse_reference_list`] to get every
//! `;` member.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::numerals;
use super::{Book, PassageRange, Position};
use crate::error::{Error, Result};

/// Regex matching a leading book name such as `Matt.`, `1 John`, `Song of Songs`.
#[allow(clippy::expect_used)]
static RE_BOOK_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:[1-3]\s*)?[A-Za-z]+(?:\s+of\s+[A-Za-z]+)?)\.?\s*")
        .expect("valid regex: RE_BOOK_PREFIX")
});

/// Regex matching `I. 22, 23` or `V. 17-20` (Roman chapter, Arabic verses).
#[allow(clippy::expect_used)]
static RE_ROMAN_CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([ivxlcdm]+)\.\s*(\d+)(?:\s*,\s*(\d+))*(?:\s*[-–—]\s*(\d+))?")
        .expect("valid regex: RE_ROMAN_CHAPTER")
});

/// Regex matching a chapter/verse separator followed by a verse, as in `2:1`.
/// A Roman match whose verse is followed by this is really an Arabic reference.
#[allow(clippy::expect_used)]
static RE_ARABIC_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[:.v]\s*\d").expect("valid regex: RE_ARABIC_TAIL")
});

/// Regex matching `5:17`, `1.35-37`, `9:57-10:3`, `2v1-20`.
#[allow(clippy::expect_used)]
static RE_CHAPTER_VERSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*[:.v]\s*(\d+)(?:\s*[-–—]\s*(?:(\d+)\s*[:.v]\s*)?(\d+))?")
        .expect("valid regex: RE_CHAPTER_VERSE")
});

/// Regex matching a whole-chapter reference like `13` or `13.`.
#[allow(clippy::expect_used)]
static RE_BARE_CHAPTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*\.?\s*$").expect("valid regex: RE_BARE_CHAPTER")
});

/// Version tags occasionally appended to references.
const VERSION_TAGS: &[&str] = &["NRSVue", "NRSVUE", "NRSV", "NIV", "KJV", "ESV", "RSV"];

/// Parse one reference string against the given book.
///
/// Fails with [`Error::UnparseableReference`] carrying `input` when no form
/// matches. Never substitutes a default position.
pub fn parse_reference(book: Book, input: &str) -> Result<PassageRange> {
    let cleaned = clean(input);
    let (first, rest) = match cleaned.split_once(';') {
        Some((first, rest)) => (first.trim(), Some(rest.trim())),
        None => (cleaned.trim(), None),
    };
    if let Some(rest) = rest {
        tracing::debug!("Reference {input:?}: ignoring list remainder {rest:?}");
    }

    let body = strip_book(book, first);
    parse_body(book, body).ok_or_else(|| Error::unparseable(input))?
}

/// Parse every `;`-separated member of a reference list.
///
/// The book prefix, when present, is taken from the first member; later
/// members like `"5.1"` in `"John 4.54; 5.1"` are parsed against the same book.
pub fn parse_reference_list(book: Book, input: &str) -> Result<Vec<PassageRange>> {
    clean(input)
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let body = strip_book(book, part);
            parse_body(book, body).ok_or_else(|| Error::unparseable(input))?
        })
        .collect()
}

/// Recognize a leading book name, if any.
pub fn detect_book(input: &str) -> Option<Book> {
    let caps = RE_BOOK_PREFIX.captures(input)?;
    Book::from_name(caps.get(1)?.as_str())
}

/// Drop parenthetical notes and trailing version tags.
fn clean(input: &str) -> &str {
    let mut text = input.split('(').next().unwrap_or(input).trim();
    for tag in VERSION_TAGS {
        text = text.trim_end_matches(tag).trim();
    }
    text
}

/// Strip a recognized book prefix, logging when it names another book.
fn strip_book(book: Book, text: &str) -> &str {
    let Some(caps) = RE_BOOK_PREFIX.captures(text) else {
        return text;
    };
    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
        return text;
    };
    let Some(found) = Book::from_name(name.as_str()) else {
        return text;
    };
    if found != book {
        tracing::warn!("Reference {text:?} names {found}, parsing it as {book}");
    }
    &text[whole.end()..]
}

/// Try each grammar in order. `None` means nothing matched; `Some(Err)` means
/// a grammar matched but produced an impossible range.
fn parse_body(book: Book, body: &str) -> Option<Result<PassageRange>> {
    let body = body.trim();

    if let Some(caps) = RE_ROMAN_CHAPTER.captures(body) {
        let verse_end = caps.get(2).map_or(body.len(), |m| m.end());
        if RE_ARABIC_TAIL.is_match(&body[verse_end..]) {
            // An unknown abbreviation spelled in Roman letters ("Lc. 2:1")
            tracing::debug!("Reference {body:?}: not a Roman chapter");
            return None;
        }
        return Some(roman_chapter(book, &caps));
    }

    // Comma lists collapse to their first token from here on
    let (body, rest) = match body.split_once(',') {
        Some((first, rest)) => (first.trim(), Some(rest)),
        None => (body, None),
    };
    if let Some(rest) = rest {
        tracing::debug!("Reference {body:?}: ignoring comma remainder {rest:?}");
    }

    if let Some(caps) = RE_CHAPTER_VERSE.captures(body) {
        return Some(chapter_verse(book, &caps));
    }

    if let Some(caps) = RE_BARE_CHAPTER.captures(body) {
        let chapter = number(&caps, 1)?;
        return Some(PassageRange::at(book, Position::new(chapter, 1)));
    }

    None
}

fn roman_chapter(book: Book, caps: &Captures<'_>) -> Result<PassageRange> {
    let chapter = numerals::to_int(caps.get(1).map_or("", |m| m.as_str()))?;
    let start_verse = number(caps, 2).ok_or_else(|| Error::unparseable(&caps[0]))?;
    let end_verse = number(caps, 4).or_else(|| number(caps, 3)).unwrap_or(start_verse);
    PassageRange::new(
        book,
        Position::new(chapter, start_verse),
        Position::new(chapter, end_verse),
    )
}

fn chapter_verse(book: Book, caps: &Captures<'_>) -> Result<PassageRange> {
    let chapter = number(caps, 1).ok_or_else(|| Error::unparseable(&caps[0]))?;
    let start_verse = number(caps, 2).ok_or_else(|| Error::unparseable(&caps[0]))?;
    let start = Position::new(chapter, start_verse);
    let end = number(caps, 4).map_or(start, |end_verse| {
        Position::new(number(caps, 3).unwrap_or(chapter), end_verse)
    });
    PassageRange::new(book, start, end)
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}
