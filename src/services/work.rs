//! Per-work processing: source records in, resolved coverage and index out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bible::{Book, ChapterLengths, Position};
use crate::commentary::{
    units_from_records, CommentaryUnit, CoverageRecord, CoverageResolver, SequenceGap,
    SourceRecord, UnparseablePolicy, VerseToUnitsIndex,
};
use crate::error::{Error, Result};

/// One commentary work as handed over by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFile {
    /// Short name, also the output directory (e.g. `"chrysostom-matthew"`).
    pub work: String,
    /// Book the work comments on.
    pub book: Book,
    /// Where the last unit ends, when not the book's final verse.
    #[serde(default)]
    pub book_end: Option<Position>,
    /// Per-work override of the unparseable-reference policy.
    #[serde(default)]
    pub on_unparseable: Option<UnparseablePolicy>,
    /// Units in source order.
    pub records: Vec<SourceRecord>,
}

impl WorkFile {
    /// Output directory name, rejecting names that would escape the output root.
    pub fn dir_name(&self) -> Result<&str> {
        let name = self.work.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(Error::Msg(format!("Work name {:?} is not a usable directory name", self.work)));
        }
        Ok(name)
    }
}

/// A fully resolved work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWork {
    /// Work name.
    pub name: String,
    /// Book commented on.
    pub book: Book,
    /// Units in number order with every end filled.
    pub units: Vec<CommentaryUnit>,
    /// Gaps in the unit numbering, reported rather than filled.
    pub gaps: Vec<SequenceGap>,
    /// Start verse → units.
    pub index: VerseToUnitsIndex,
}

impl ResolvedWork {
    /// Coverage keyed by unit number, as persisted.
    pub fn coverage(&self) -> BTreeMap<u32, CoverageRecord> {
        self.units
            .iter()
            .map(|unit| (unit.unit_number(), CoverageRecord::from(unit)))
            .collect()
    }
}

/// Parse, resolve and index one work.
///
/// # Arguments
/// * `file` - The work's source records
/// * `lengths` - Chapter-length table for the work's book
/// * `policy` - Unparseable-reference policy, unless the file overrides it
pub fn resolve_work(
    file: &WorkFile,
    lengths: &ChapterLengths,
    policy: UnparseablePolicy,
) -> Result<ResolvedWork> {
    let name = file.dir_name()?.to_string();
    let policy = file.on_unparseable.unwrap_or(policy);
    let units = units_from_records(file.book, &file.records, policy)?;

    let mut resolver = CoverageResolver::new(lengths, file.book)?;
    if let Some(end) = file.book_end {
        resolver = resolver.with_book_end(end);
    }
    let resolution = resolver.resolve(units)?;
    let index = VerseToUnitsIndex::build(&resolution.units);

    for (key, list) in index.shared_starts() {
        let romans: Vec<&str> = list.iter().map(|e| e.homily_roman.as_str()).collect();
        tracing::info!("{}: {} {key} starts {}", file.work, file.book, romans.join(", "));
    }

    Ok(ResolvedWork {
        name,
        book: file.book,
        units: resolution.units,
        gaps: resolution.gaps,
        index,
    })
}
