//! Verse → commentary-unit lookup built from resolved units.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CommentaryUnit;
use crate::bible::Position;

/// One unit listed under the verse where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unit number.
    pub homily_number: u32,
    /// Unit number in Roman form.
    pub homily_roman: String,
    /// Start, e.g. `"Matthew 5:17"`.
    pub passage: String,
    /// End, e.g. `"Matthew 5:20"`.
    pub end: String,
}

impl From<&CommentaryUnit> for IndexEntry {
    fn from(unit: &CommentaryUnit) -> Self {
        Self {
            homily_number: unit.unit_number(),
            homily_roman: unit.roman_numeral(),
            passage: unit.coverage.start_label(),
            end: unit.coverage.end_label(),
        }
    }
}

/// `"chapter:verse"` → every unit starting there, in unit-number order.
///
/// Derived data: rebuild it from the units rather than editing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerseToUnitsIndex {
    entries: BTreeMap<Position, Vec<IndexEntry>>,
}

impl VerseToUnitsIndex {
    /// Group units by start verse. Units sharing a start are all kept.
    pub fn build(units: &[CommentaryUnit]) -> Self {
        let mut entries: BTreeMap<Position, Vec<IndexEntry>> = BTreeMap::new();
        for unit in units {
            entries.entry(unit.start()).or_default().push(IndexEntry::from(unit));
        }
        for list in entries.values_mut() {
            list.sort_by_key(|e| e.homily_number);
        }
        Self { entries }
    }

    /// Units starting at `position`; empty when none do.
    pub fn get(&self, position: Position) -> &[IndexEntry] {
        self.entries.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The nearest start at or before `position` and the units listed there,
    /// i.e. the units a reader at `position` is most likely inside.
    pub fn preceding(&self, position: Position) -> Option<(Position, &[IndexEntry])> {
        self.entries
            .range(..=position)
            .next_back()
            .map(|(key, list)| (*key, list.as_slice()))
    }

    /// Keys under which more than one unit starts.
    pub fn shared_starts(&self) -> impl Iterator<Item = (Position, &[IndexEntry])> {
        self.iter().filter(|(_, list)| list.len() > 1)
    }

    /// All keys in verse order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &[IndexEntry])> {
        self.entries.iter().map(|(key, list)| (*key, list.as_slice()))
    }

    /// Number of distinct start verses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no units were indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::{Book, PassageRange};

    fn unit(n: u32, start: (u32, u32), end: (u32, u32)) -> CommentaryUnit {
        let range = PassageRange::new(
            Book::Matthew,
            Position::new(start.0, start.1),
            Position::new(end.0, end.1),
        )
        .unwrap();
        CommentaryUnit::new(n, String::new(), range).unwrap()
    }

    #[test]
    fn test_shared_start_keeps_every_unit() {
        let units = vec![
            unit(16, (5, 17), (5, 20)),
            unit(15, (5, 17), (5, 17)),
            unit(17, (5, 21), (5, 48)),
        ];
        let index = VerseToUnitsIndex::build(&units);
        let shared = index.get(Position::new(5, 17));
        let numbers: Vec<u32> = shared.iter().map(|e| e.homily_number).collect();
        assert_eq!(numbers, vec![15, 16]);
        assert_eq!(shared[0].homily_roman, "XV");
        assert_eq!(shared[1].end, "Matthew 5:20");
        assert_eq!(index.len(), 2);
        assert_eq!(index.shared_starts().count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let units = vec![unit(1, (1, 1), (1, 17)), unit(2, (1, 18), (1, 25))];
        let json = serde_json::to_value(VerseToUnitsIndex::build(&units)).unwrap();
        let entry = &json["1:18"][0];
        assert_eq!(entry["homily_number"], 2);
        assert_eq!(entry["homily_roman"], "II");
        assert_eq!(entry["passage"], "Matthew 1:18");
        assert_eq!(entry["end"], "Matthew 1:25");
    }

    #[test]
    fn test_keys_ordered_numerically() {
        let units = vec![unit(2, (10, 1), (10, 42)), unit(1, (2, 1), (9, 38))];
        let index = VerseToUnitsIndex::build(&units);
        let keys: Vec<String> = index.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["2:1", "10:1"]);
    }

    #[test]
    fn test_preceding_lookup() {
        let units = vec![unit(1, (1, 1), (1, 17)), unit(2, (1, 18), (1, 25))];
        let index = VerseToUnitsIndex::build(&units);
        let (key, list) = index.preceding(Position::new(1, 20)).unwrap();
        assert_eq!(key, Position::new(1, 18));
        assert_eq!(list[0].homily_number, 2);
        assert!(index.get(Position::new(1, 20)).is_empty());
    }
}
