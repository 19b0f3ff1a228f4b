//! Coverage resolution: filling in where each unit ends.
//!
//! Each unit's end comes from, in order of preference:
//! 1. an explicit end already on the unit (end differs from start),
//! 2. the verse before the next unit's start, looking up the previous
//!    chapter's length when the next unit opens a chapter,
//! 3. the book's final verse, for the last unit.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::CommentaryUnit;
use crate::bible::{Book, ChapterLengths, Position};
use crate::error::{Error, Result};

/// Non-contiguous unit numbers. Resolution still uses the later unit as
/// "next", so the earlier unit may absorb whatever the missing units covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceGap {
    /// Last unit number before the gap.
    pub after: u32,
    /// First unit number after the gap.
    pub before: u32,
}

impl SequenceGap {
    /// Unit numbers absent from the sequence.
    pub fn missing(&self) -> std::ops::Range<u32> {
        self.after + 1..self.before
    }
}

impl fmt::Display for SequenceGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit numbers jump from {} to {}", self.after, self.before)
    }
}

/// Resolved units plus any non-fatal conditions met along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Units in unit-number order, every end filled.
    pub units: Vec<CommentaryUnit>,
    /// Gaps in the unit numbering.
    pub gaps: Vec<SequenceGap>,
}

/// Computes unit ends for one work on one book.
#[derive(Debug, Clone, Copy)]
pub struct CoverageResolver<'a> {
    lengths: &'a ChapterLengths,
    book: Book,
    book_end: Position,
}

impl<'a> CoverageResolver<'a> {
    /// Resolver for `book`, taking the book's last verse from the table.
    pub fn new(lengths: &'a ChapterLengths, book: Book) -> Result<Self> {
        let book_end = lengths.final_position(book)?;
        Ok(Self { lengths, book, book_end })
    }

    /// Override where the last unit ends (a work that stops short of the
    /// book's final verse, or a versification the table does not follow).
    #[must_use]
    pub const fn with_book_end(mut self, book_end: Position) -> Self {
        self.book_end = book_end;
        self
    }

    /// Fill in every unit's end.
    ///
    /// Units are ordered by number first; file order is irrelevant. Fails on
    /// an empty sequence, repeated unit numbers, foreign books, or a
    /// chapter-length miss. Nothing is returned partially resolved.
    pub fn resolve(&self, mut units: Vec<CommentaryUnit>) -> Result<Resolution> {
        if units.is_empty() {
            return Err(Error::EmptySequence);
        }
        units.sort_by_key(CommentaryUnit::unit_number);
        self.check_units(&units)?;

        let gaps = find_gaps(&units);
        for gap in &gaps {
            tracing::warn!("{}: {gap}; resolving across the gap", self.book);
        }

        for i in 0..units.len() {
            let end = match units.get(i + 1) {
                Some(next) => self.end_before(&units[i], next.start())?,
                None => self.book_end,
            };
            let unit = &mut units[i];
            unit.coverage = unit.coverage.with_end(end)?;
        }

        Ok(Resolution { units, gaps })
    }

    /// End of `unit` given the start of the unit after it.
    fn end_before(&self, unit: &CommentaryUnit, next: Position) -> Result<Position> {
        if !unit.coverage.is_single_verse() {
            return Ok(unit.coverage.end());
        }

        let inferred = if next.verse == 1 {
            match next.chapter.checked_sub(1).filter(|&c| c > 0) {
                Some(prev) => Position::new(prev, self.lengths.verse_count(self.book, prev)?),
                None => Position::new(1, 1),
            }
        } else {
            Position::new(next.chapter, next.verse - 1)
        };

        if inferred >= unit.start() {
            return Ok(inferred);
        }
        if next == unit.start() {
            tracing::debug!(
                "Unit {} starts at {} like the unit after it; ending it there",
                unit.unit_number(),
                unit.start()
            );
        } else {
            tracing::warn!(
                "{}: unit {} starts at {} but the unit after it starts earlier, at {next}; ending it at its start",
                self.book,
                unit.unit_number(),
                unit.start()
            );
        }
        Ok(unit.start())
    }

    fn check_units(&self, units: &[CommentaryUnit]) -> Result<()> {
        let mut seen = HashSet::with_capacity(units.len());
        for unit in units {
            if !seen.insert(unit.unit_number()) {
                return Err(Error::DuplicateUnit { unit_number: unit.unit_number() });
            }
            if unit.book() != self.book {
                return Err(Error::BookMismatch {
                    unit_number: unit.unit_number(),
                    expected: self.book,
                    found: unit.book(),
                });
            }
        }
        Ok(())
    }
}

fn find_gaps(units: &[CommentaryUnit]) -> Vec<SequenceGap> {
    units
        .windows(2)
        .filter_map(|pair| {
            let (after, before) = (pair[0].unit_number(), pair[1].unit_number());
            (before > after + 1).then_some(SequenceGap { after, before })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::PassageRange;

    fn unit(n: u32, chapter: u32, verse: u32) -> CommentaryUnit {
        let range = PassageRange::at(Book::Matthew, Position::new(chapter, verse)).unwrap();
        CommentaryUnit::new(n, format!("Homily {n}"), range).unwrap()
    }

    fn ranged(n: u32, start: (u32, u32), end: (u32, u32)) -> CommentaryUnit {
        let range = PassageRange::new(
            Book::Matthew,
            Position::new(start.0, start.1),
            Position::new(end.0, end.1),
        )
        .unwrap();
        CommentaryUnit::new(n, format!("Homily {n}"), range).unwrap()
    }

    fn ends(resolution: &Resolution) -> Vec<(u32, u32)> {
        resolution
            .units
            .iter()
            .map(|u| (u.coverage.end_chapter(), u.coverage.end_verse()))
            .collect()
    }

    #[test]
    fn test_end_of_chapter_inference() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver.resolve(vec![unit(1, 1, 1), unit(2, 2, 1)]).unwrap();
        assert_eq!(ends(&r), vec![(1, 25), (28, 20)]);
    }

    #[test]
    fn test_same_chapter_inference() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver.resolve(vec![unit(1, 1, 1), unit(2, 1, 22)]).unwrap();
        assert_eq!(ends(&r)[0], (1, 21));
    }

    #[test]
    fn test_last_unit_runs_to_book_end() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver
            .resolve(vec![unit(1, 1, 1), ranged(2, (27, 27), (27, 30))])
            .unwrap();
        assert_eq!(ends(&r)[1], (28, 20));

        let short = resolver.with_book_end(Position::new(27, 66));
        let r = short.resolve(vec![unit(1, 27, 27)]).unwrap();
        assert_eq!(ends(&r), vec![(27, 66)]);
    }

    #[test]
    fn test_explicit_end_is_kept() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver
            .resolve(vec![ranged(1, (1, 1), (1, 16)), unit(2, 1, 22)])
            .unwrap();
        assert_eq!(ends(&r)[0], (1, 16));
    }

    #[test]
    fn test_orders_by_unit_number_not_input_order() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver.resolve(vec![unit(2, 1, 18), unit(1, 1, 1)]).unwrap();
        assert_eq!(r.units[0].unit_number(), 1);
        assert_eq!(ends(&r), vec![(1, 17), (28, 20)]);
    }

    #[test]
    fn test_shared_start_does_not_invert_range() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver
            .resolve(vec![unit(1, 5, 1), unit(2, 5, 1), unit(3, 5, 17), unit(4, 5, 17)])
            .unwrap();
        assert_eq!(ends(&r), vec![(5, 1), (5, 16), (5, 17), (28, 20)]);
    }

    #[test]
    fn test_next_unit_starting_earlier_ends_unit_at_its_start() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver
            .resolve(vec![unit(1, 5, 10), unit(2, 3, 1), unit(3, 3, 7)])
            .unwrap();
        assert_eq!(ends(&r), vec![(5, 10), (3, 6), (28, 20)]);
    }

    #[test]
    fn test_next_unit_at_book_opening() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver.resolve(vec![unit(1, 1, 1), unit(2, 1, 1)]).unwrap();
        assert_eq!(ends(&r)[0], (1, 1));
    }

    #[test]
    fn test_gap_is_reported_not_filled() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let r = resolver
            .resolve(vec![unit(5, 2, 1), unit(7, 3, 1), unit(8, 3, 13)])
            .unwrap();
        assert_eq!(r.units.len(), 3);
        assert_eq!(r.gaps, vec![SequenceGap { after: 5, before: 7 }]);
        assert_eq!(r.gaps[0].missing().collect::<Vec<_>>(), vec![6]);
        assert_eq!(ends(&r)[0], (2, 23));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        let first = resolver
            .resolve(vec![unit(1, 1, 1), unit(2, 1, 18), unit(3, 2, 1), unit(4, 2, 2)])
            .unwrap();
        let second = resolver.resolve(first.units.clone()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fatal_conditions() {
        let table = ChapterLengths::new_testament();
        let resolver = CoverageResolver::new(&table, Book::Matthew).unwrap();
        assert!(matches!(resolver.resolve(vec![]), Err(Error::EmptySequence)));
        assert!(matches!(
            resolver.resolve(vec![unit(1, 1, 1), unit(1, 2, 1)]),
            Err(Error::DuplicateUnit { unit_number: 1 })
        ));

        let mark = PassageRange::at(Book::Mark, Position::new(1, 1)).unwrap();
        let foreign = CommentaryUnit::new(2, "Mark", mark).unwrap();
        assert!(matches!(
            resolver.resolve(vec![unit(1, 1, 1), foreign]),
            Err(Error::BookMismatch { .. })
        ));

        assert!(matches!(
            CoverageResolver::new(&table, Book::Genesis),
            Err(Error::MissingChapterLength { .. })
        ));
    }

    #[test]
    fn test_missing_chapter_length_aborts() {
        let table = ChapterLengths::from_json(r#"{"Matthew": [25]}"#).unwrap();
        let resolver = CoverageResolver::new(&table, Book::Matthew)
            .unwrap()
            .with_book_end(Position::new(28, 20));
        let err = resolver
            .resolve(vec![unit(1, 1, 1), unit(2, 3, 1), unit(3, 3, 5)])
            .unwrap_err();
        assert!(matches!(err, Error::MissingChapterLength { chapter: 2, .. }));
    }
}
