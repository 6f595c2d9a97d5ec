//! Record selection: index ranges, equality predicates, and limits
//!
//! A [`RecordSelector`] narrows the data store's logical stream in three
//! stages, in order: the index range (positional, drives early termination),
//! the equality predicate (content inspection), and the match limit. Both
//! the range upper bound and the limit stop the scan outright instead of
//! merely filtering, since pulling further records can mean opening further
//! files.

use std::str::FromStr;

use apache_avro::types::Value;

use crate::error::{Result, StoreError};
use crate::fields;
use crate::store::{DataStore, RecordIter};

/// Closed interval over the zero-based global record index, either bound
/// optionally open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    lower: Option<u64>,
    upper: Option<u64>,
}

/// Position of an index relative to a [`Range`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RangePosition {
    /// Strictly below the lower bound.
    Below,
    /// Within the range.
    Inside,
    /// Strictly above the upper bound.
    Above,
}

impl Range {
    /// The range covering the entire stream.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Where the given index lies relative to this range.
    pub fn position(&self, index: u64) -> RangePosition {
        if let Some(lower) = self.lower {
            if index < lower {
                return RangePosition::Below;
            }
        }
        match self.upper {
            Some(upper) if index > upper => RangePosition::Above,
            _ => RangePosition::Inside,
        }
    }
}

impl FromStr for Range {
    type Err = StoreError;

    /// Parse `a-b`, `-b`, `a-`, or a single `a`.
    fn from_str(spec: &str) -> Result<Self> {
        let invalid = || StoreError::InvalidRangeSpec {
            spec: spec.to_string(),
        };
        let parts: Vec<&str> = spec.split('-').collect();
        match parts.as_slice() {
            [single] => {
                let index = single.parse().map_err(|_| invalid())?;
                Ok(Self {
                    lower: Some(index),
                    upper: Some(index),
                })
            }
            [lower, upper] => {
                if lower.is_empty() && upper.is_empty() {
                    return Err(invalid());
                }
                let parse_bound = |bound: &str| -> Result<Option<u64>> {
                    if bound.is_empty() {
                        Ok(None)
                    } else {
                        bound.parse().map(Some).map_err(|_| invalid())
                    }
                };
                Ok(Self {
                    lower: parse_bound(lower)?,
                    upper: parse_bound(upper)?,
                })
            }
            _ => Err(invalid()),
        }
    }
}

/// Equality predicate on a (possibly nested) field.
///
/// A record matches when the value at the dotted key path equals the target
/// under textual comparison; the target literal `null` matches an actually
/// absent value (and nothing else does).
#[derive(Clone, Debug)]
pub struct EqualitySelection {
    key: String,
    target: String,
}

impl EqualitySelection {
    /// Build a predicate from a dotted key and a target literal.
    pub fn new(key: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            target: target.into(),
        }
    }

    /// Whether the record content satisfies the predicate.
    ///
    /// A key path missing from the record is a fatal
    /// [`StoreError::FieldNotFound`], not a non-match.
    pub fn matches(&self, content: &Value) -> Result<bool> {
        let value = fields::resolve(content, &self.key)?;
        if fields::is_null(value) {
            Ok(self.target == "null")
        } else {
            Ok(fields::text_form(value)? == self.target)
        }
    }
}

impl FromStr for EqualitySelection {
    type Err = StoreError;

    /// Parse a `key=value` string; the key may be dotted.
    fn from_str(spec: &str) -> Result<Self> {
        match spec.split_once('=') {
            Some((key, target)) if !key.is_empty() => Ok(Self::new(key, target)),
            _ => Err(StoreError::InvalidSelectionSpec {
                spec: spec.to_string(),
            }),
        }
    }
}

/// A record yielded by selection: global index plus decoded content.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Zero-based position within the whole logical stream.
    pub index: u64,
    /// Decoded record content.
    pub content: Value,
}

/// Filter stack applied to a data store's logical stream.
#[derive(Clone, Debug, Default)]
pub struct RecordSelector {
    range: Range,
    selection: Option<EqualitySelection>,
    limit: Option<u64>,
}

impl RecordSelector {
    /// Combine the three optional filters; absent filters select everything.
    pub fn new(
        range: Option<Range>,
        selection: Option<EqualitySelection>,
        limit: Option<u64>,
    ) -> Self {
        Self {
            range: range.unwrap_or_default(),
            selection,
            limit,
        }
    }

    /// Lazily select records from the data store, in ascending index order.
    pub fn select<'a>(&'a self, store: &'a DataStore) -> Result<Selection<'a>> {
        Ok(Selection {
            records: store.iter()?,
            selector: self,
            matched: 0,
            done: false,
        })
    }
}

/// Lazy sequence of selected records.
pub struct Selection<'a> {
    records: RecordIter<'a>,
    selector: &'a RecordSelector,
    matched: u64,
    done: bool,
}

impl Iterator for Selection<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(limit) = self.selector.limit {
            if self.matched >= limit {
                // Limit reached: stop pulling records entirely.
                self.done = true;
                return None;
            }
        }
        loop {
            let (index, content) = match self.records.next()? {
                Ok(item) => item,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            match self.selector.range.position(index) {
                RangePosition::Below => continue,
                RangePosition::Above => {
                    // The stream is index-ordered, so nothing further can be
                    // in range: terminate the whole scan.
                    self.done = true;
                    return None;
                }
                RangePosition::Inside => {}
            }
            if let Some(selection) = &self.selector.selection {
                match selection.matches(&content) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err.at_record(index)));
                    }
                }
            }
            self.matched += 1;
            return Some(Ok(Record { index, content }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(spec: &str) -> Range {
        spec.parse().unwrap()
    }

    #[test]
    fn closed_range_positions() {
        let r = range("3-5");
        assert_eq!(r.position(2), RangePosition::Below);
        assert_eq!(r.position(3), RangePosition::Inside);
        assert_eq!(r.position(5), RangePosition::Inside);
        assert_eq!(r.position(6), RangePosition::Above);
    }

    #[test]
    fn half_open_ranges() {
        assert_eq!(range("-4").position(0), RangePosition::Inside);
        assert_eq!(range("-4").position(5), RangePosition::Above);
        assert_eq!(range("4-").position(3), RangePosition::Below);
        assert_eq!(range("4-").position(u64::MAX), RangePosition::Inside);
    }

    #[test]
    fn single_index_range() {
        let r = range("4");
        assert_eq!(r.position(3), RangePosition::Below);
        assert_eq!(r.position(4), RangePosition::Inside);
        assert_eq!(r.position(5), RangePosition::Above);
    }

    #[test]
    fn unbounded_range_accepts_everything() {
        assert_eq!(Range::unbounded().position(0), RangePosition::Inside);
        assert_eq!(Range::unbounded().position(u64::MAX), RangePosition::Inside);
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        for spec in ["", "-", "1-2-3", "a", "1-b", "-1-"] {
            assert!(
                spec.parse::<Range>().is_err(),
                "'{spec}' should not parse"
            );
        }
    }

    #[test]
    fn selection_spec_parses_on_first_equals_sign() {
        let sel: EqualitySelection = "sub.level2=a=b".parse().unwrap();
        assert_eq!(sel.key, "sub.level2");
        assert_eq!(sel.target, "a=b");
        assert!("no_equals_sign".parse::<EqualitySelection>().is_err());
        assert!("=value".parse::<EqualitySelection>().is_err());
    }

    #[test]
    fn null_literal_matches_absent_but_not_empty_string() {
        let record = Value::Record(vec![(
            "color".into(),
            Value::Union(1, Box::new(Value::Null)),
        )]);
        assert!(EqualitySelection::new("color", "null")
            .matches(&record)
            .unwrap());
        assert!(!EqualitySelection::new("color", "")
            .matches(&record)
            .unwrap());

        let empty = Value::Record(vec![(
            "color".into(),
            Value::Union(0, Box::new(Value::String(String::new()))),
        )]);
        assert!(EqualitySelection::new("color", "")
            .matches(&empty)
            .unwrap());
        assert!(!EqualitySelection::new("color", "null")
            .matches(&empty)
            .unwrap());
    }

    #[test]
    fn numbers_compare_textually() {
        let record = Value::Record(vec![("position".into(), Value::Int(1))]);
        assert!(EqualitySelection::new("position", "1")
            .matches(&record)
            .unwrap());
        assert!(!EqualitySelection::new("position", "2")
            .matches(&record)
            .unwrap());
    }

    proptest! {
        #[test]
        fn closed_range_round_trips(lower in 0u64..10_000, width in 0u64..10_000) {
            let upper = lower + width;
            let parsed: Range = format!("{lower}-{upper}").parse().unwrap();
            prop_assert_eq!(parsed.position(lower), RangePosition::Inside);
            prop_assert_eq!(parsed.position(upper), RangePosition::Inside);
            if lower > 0 {
                prop_assert_eq!(parsed.position(lower - 1), RangePosition::Below);
            }
            prop_assert_eq!(parsed.position(upper + 1), RangePosition::Above);
        }
    }
}
