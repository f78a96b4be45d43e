// ==========================================
// tabload - duplicate-key resolution
// ==========================================
// Run-scoped state machine keyed per composite key. Owned by the
// executor so a run's merge state is fully reconstructable and testable
// in isolation; rows for a given key must arrive in input order.
// ==========================================

use crate::domain::dimension::Value;
use crate::domain::spec::DuplicateKeyAction;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::key::CompositeKey;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// The durable unit written to the sink: the latest/merged data-column
/// values for one composite key. Created on first sight of a key,
/// mutated in place by later rows, never deleted by the importer.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub data: Vec<Value>,
}

/// Applies the duplicate-key policy, maintaining per-key merge state.
pub struct DuplicateResolver {
    action: DuplicateKeyAction,
    rows: HashMap<CompositeKey, StoredRow>,
    // per-key, per-data-column count of non-NA contributions;
    // populated only under the average policy
    counts: HashMap<CompositeKey, Vec<u64>>,
}

impl DuplicateResolver {
    pub fn new(action: DuplicateKeyAction) -> Self {
        Self {
            action,
            rows: HashMap::new(),
            counts: HashMap::new(),
        }
    }

    /// Merge one row into the stored state.
    ///
    /// Returns the stored row to (re)write to the sink, or `None` when
    /// the row was discarded under the ignore policy. A duplicate under
    /// the error policy aborts with DuplicateKey regardless of dontFail.
    pub fn apply(
        &mut self,
        key: &CompositeKey,
        data: Vec<Value>,
    ) -> ImportResult<Option<&StoredRow>> {
        match self.rows.entry(key.clone()) {
            Entry::Vacant(slot) => {
                if self.action == DuplicateKeyAction::Average {
                    let counts = data
                        .iter()
                        .map(|v| if v.is_missing() { 0 } else { 1 })
                        .collect();
                    self.counts.insert(key.clone(), counts);
                }
                Ok(Some(&*slot.insert(StoredRow { data })))
            }
            Entry::Occupied(slot) => match self.action {
                DuplicateKeyAction::Error => Err(ImportError::DuplicateKey(key.to_string())),
                DuplicateKeyAction::Ignore => Ok(None),
                DuplicateKeyAction::Overwrite => {
                    let stored = slot.into_mut();
                    stored.data = data;
                    Ok(Some(&*stored))
                }
                DuplicateKeyAction::Average => {
                    let counts = self
                        .counts
                        .entry(key.clone())
                        .or_insert_with(|| vec![0; data.len()]);
                    let stored = slot.into_mut();
                    for ((current, incoming), count) in
                        stored.data.iter_mut().zip(data).zip(counts.iter_mut())
                    {
                        merge_average(current, incoming, count);
                    }
                    Ok(Some(&*stored))
                }
            },
        }
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&StoredRow> {
        self.rows.get(key)
    }
}

/// Running arithmetic mean over non-NA numeric contributions; NA
/// contributions leave the stored value and count untouched. Non-numeric
/// columns fall back to overwrite semantics.
fn merge_average(current: &mut Value, incoming: Value, count: &mut u64) {
    match (&mut *current, incoming) {
        (Value::Numeric(stored), Value::Numeric(v)) => {
            if v.is_nan() {
                return;
            }
            if *count == 0 {
                *stored = v;
                *count = 1;
            } else {
                *stored = (*count as f64 * *stored + v) / (*count as f64 + 1.0);
                *count += 1;
            }
        }
        (_, other) => *current = other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dimension::Dimension;
    use crate::domain::spec::DataSpecification;
    use crate::importer::coerce::ParsedRow;
    use crate::importer::key::KeyBuilder;

    fn key(label: &str) -> CompositeKey {
        let spec = DataSpecification::builder()
            .num_cols(2)
            .dimension_cols([0])
            .data_cols([1])
            .dimensions(vec![Dimension::string(), Dimension::numeric()])
            .build()
            .unwrap();
        KeyBuilder::from_spec(&spec).key_for(&ParsedRow {
            row: 1,
            dims: vec![Value::String(label.into())],
            data: vec![],
        })
    }

    fn nums(vs: &[f64]) -> Vec<Value> {
        vs.iter().map(|&v| Value::Numeric(v)).collect()
    }

    #[test]
    fn test_error_policy_rejects_second_occurrence() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Error);
        let k = key("a");
        assert!(r.apply(&k, nums(&[1.0])).unwrap().is_some());
        let err = r.apply(&k, nums(&[2.0])).unwrap_err();
        assert!(matches!(err, ImportError::DuplicateKey(_)));
    }

    #[test]
    fn test_overwrite_replaces_entirely() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Overwrite);
        let k = key("a");
        r.apply(&k, nums(&[1.0, 10.0])).unwrap();
        r.apply(&k, nums(&[3.0, 30.0])).unwrap();
        assert_eq!(r.get(&k).unwrap().data, nums(&[3.0, 30.0]));
    }

    #[test]
    fn test_ignore_first_wins() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Ignore);
        let k = key("a");
        assert!(r.apply(&k, nums(&[1.0])).unwrap().is_some());
        assert!(r.apply(&k, nums(&[9.0])).unwrap().is_none());
        assert_eq!(r.get(&k).unwrap().data, nums(&[1.0]));
    }

    #[test]
    fn test_average_running_mean() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Average);
        let k = key("a");
        r.apply(&k, nums(&[1.0, 10.0])).unwrap();
        r.apply(&k, nums(&[3.0, 30.0])).unwrap();
        assert_eq!(r.get(&k).unwrap().data, nums(&[2.0, 20.0]));
        r.apply(&k, nums(&[5.0, 20.0])).unwrap();
        assert_eq!(r.get(&k).unwrap().data, nums(&[3.0, 20.0]));
    }

    #[test]
    fn test_average_skips_na_contributions() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Average);
        let k = key("a");
        r.apply(&k, nums(&[f64::NAN])).unwrap();
        r.apply(&k, nums(&[4.0])).unwrap();
        r.apply(&k, nums(&[f64::NAN])).unwrap();
        r.apply(&k, nums(&[6.0])).unwrap();
        assert_eq!(r.get(&k).unwrap().data, nums(&[5.0]));
    }

    #[test]
    fn test_average_of_identical_values_is_the_value() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Average);
        let k = key("a");
        for _ in 0..5 {
            r.apply(&k, nums(&[7.0])).unwrap();
        }
        assert_eq!(r.get(&k).unwrap().data, nums(&[7.0]));
    }

    #[test]
    fn test_average_falls_back_to_overwrite_for_strings() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Average);
        let k = key("a");
        r.apply(&k, vec![Value::String("first".into())]).unwrap();
        r.apply(&k, vec![Value::String("second".into())]).unwrap();
        assert_eq!(r.get(&k).unwrap().data, vec![Value::String("second".into())]);
    }

    #[test]
    fn test_distinct_keys_do_not_interact() {
        let mut r = DuplicateResolver::new(DuplicateKeyAction::Error);
        r.apply(&key("a"), nums(&[1.0])).unwrap();
        r.apply(&key("b"), nums(&[2.0])).unwrap();
        assert_eq!(r.len(), 2);
    }
}
