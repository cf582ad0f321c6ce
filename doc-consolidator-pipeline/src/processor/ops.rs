//! Relational primitives used by the merge strategies.
//!
//! All operations are pure and deterministic: row order follows the left or
//! source relation, and group contents follow source row order.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use doc_consolidator_shared::{JoinKey, Record, Relation};

/// Grouped values keyed by the normalised group key.
pub type Groups = BTreeMap<JoinKey, Vec<Value>>;

const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

/// Left join `left` with `right` on the column `on`, present on both sides.
///
/// Every left row is kept. A left row matching several right rows is repeated
/// once per match, in right order. Unmatched rows carry nulls in the
/// right-only columns. Non-key columns present on both sides are suffixed
/// with `_x` (left) and `_y` (right).
pub fn left_join(left: &Relation, right: &Relation, on: &str) -> Relation {
    let collides =
        |column: &str| column != on && left.has_column(column) && right.has_column(column);

    let left_columns: Vec<(String, String)> = left
        .columns()
        .iter()
        .map(|c| {
            let out = if collides(c) {
                format!("{}{}", c, LEFT_SUFFIX)
            } else {
                c.clone()
            };
            (c.clone(), out)
        })
        .collect();
    let right_columns: Vec<(String, String)> = right
        .columns()
        .iter()
        .filter(|c| c.as_str() != on)
        .map(|c| {
            let out = if collides(c) {
                format!("{}{}", c, RIGHT_SUFFIX)
            } else {
                c.clone()
            };
            (c.clone(), out)
        })
        .collect();

    let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
    for row in 0..right.len() {
        if let Some(key) = JoinKey::from_value(right.cell(row, on)) {
            index.entry(key).or_default().push(row);
        }
    }

    let columns: Vec<String> = left_columns
        .iter()
        .chain(right_columns.iter())
        .map(|(_, out)| out.clone())
        .collect();
    let mut rows = Vec::with_capacity(left.len());

    for row in 0..left.len() {
        let mut base = Record::new();
        for (column, out) in &left_columns {
            base.insert(out.clone(), left.cell(row, column).clone());
        }

        let matches = JoinKey::from_value(left.cell(row, on)).and_then(|key| index.get(&key));
        match matches {
            Some(matches) => {
                for &matched in matches {
                    let mut joined = base.clone();
                    for (column, out) in &right_columns {
                        joined.insert(out.clone(), right.cell(matched, column).clone());
                    }
                    rows.push(joined);
                }
            }
            None => {
                for (_, out) in &right_columns {
                    base.insert(out.clone(), Value::Null);
                }
                rows.push(base);
            }
        }
    }

    Relation::with_columns(left.name(), columns, rows)
}

/// Collect `column` into one list per value of `group_by`.
///
/// Rows with a null key are left out. Missing cells are collected as nulls.
pub fn group_values(relation: &Relation, group_by: &str, column: &str) -> Groups {
    let mut groups = Groups::new();
    for row in 0..relation.len() {
        if let Some(key) = JoinKey::from_value(relation.cell(row, group_by)) {
            groups
                .entry(key)
                .or_default()
                .push(relation.cell(row, column).clone());
        }
    }
    groups
}

/// Collect one record of `columns` per row, grouped by `group_by`.
pub fn group_records(relation: &Relation, group_by: &str, columns: &[String]) -> Groups {
    let mut groups = Groups::new();
    for row in 0..relation.len() {
        if let Some(key) = JoinKey::from_value(relation.cell(row, group_by)) {
            let record: Record = columns
                .iter()
                .map(|c| (c.clone(), relation.cell(row, c).clone()))
                .collect();
            groups.entry(key).or_default().push(Value::Object(record));
        }
    }
    groups
}

/// Attach groups to `subject` as the list column `output`, matched on the
/// subject's `key` column.
///
/// Rows without a group get an empty list. Returns `true` when `output`
/// already existed and was replaced.
pub fn attach(subject: &mut Relation, key: &str, output: &str, groups: &Groups) -> bool {
    let replaced = subject.has_column(output);
    let values = (0..subject.len())
        .map(|row| {
            let group = JoinKey::from_value(subject.cell(row, key)).and_then(|k| groups.get(&k));
            Value::Array(group.cloned().unwrap_or_default())
        })
        .collect();
    subject.set_column(output, values);
    replaced
}

/// Columns from `wanted` that `relation` does not have.
pub fn missing_columns(relation: &Relation, wanted: &[&str]) -> Vec<String> {
    wanted
        .iter()
        .filter(|c| !relation.has_column(c))
        .map(|c| (*c).to_string())
        .collect()
}
