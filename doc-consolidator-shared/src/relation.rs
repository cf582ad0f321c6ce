//! Tabular relation container.
//!
//! A relation is a list of records plus the ordered union of their column
//! names. A column that a row does not carry is a missing cell and reads as
//! JSON `null`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A single row: column name to value, in insertion order.
pub type Record = Map<String, Value>;

static NULL: Value = Value::Null;

/// A named, in-memory table of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    name: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Relation {
    /// Create an empty relation with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build a relation from records, deriving the column list from the keys
    /// in first-seen order.
    pub fn from_records(name: impl Into<String>, rows: Vec<Record>) -> Self {
        let mut relation = Self::new(name);
        for row in rows {
            relation.push_row(row);
        }
        relation
    }

    /// Build a relation with an explicit column list.
    ///
    /// Columns carried by rows but missing from `columns` are appended.
    pub fn with_columns(name: impl Into<String>, columns: Vec<String>, rows: Vec<Record>) -> Self {
        let mut relation = Self {
            name: name.into(),
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            relation.push_row(row);
        }
        relation
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Value of `column` in row `index`, or `null` when the cell is missing.
    pub fn cell(&self, index: usize, column: &str) -> &Value {
        self.rows
            .get(index)
            .and_then(|row| row.get(column))
            .unwrap_or(&NULL)
    }

    /// Append a row, extending the column list with any unseen keys.
    pub fn push_row(&mut self, row: Record) {
        for key in row.keys() {
            if !self.has_column(key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Rename columns in place, keeping their positions.
    ///
    /// Renames whose source column does not exist are ignored.
    pub fn rename_columns(&mut self, renames: &[(&str, &str)]) {
        let target = |name: &str| -> Option<String> {
            renames
                .iter()
                .find(|(from, _)| *from == name)
                .map(|(_, to)| (*to).to_string())
        };

        let mut columns = Vec::with_capacity(self.columns.len());
        for column in self.columns.drain(..) {
            let renamed = target(&column).unwrap_or(column);
            if !columns.contains(&renamed) {
                columns.push(renamed);
            }
        }
        self.columns = columns;

        for row in &mut self.rows {
            let taken = std::mem::take(row);
            *row = taken
                .into_iter()
                .map(|(key, value)| match target(&key) {
                    Some(renamed) => (renamed, value),
                    None => (key, value),
                })
                .collect();
        }
    }

    /// Add or replace a column with one value per row.
    ///
    /// `values` shorter than the relation leave the remaining cells missing.
    pub fn set_column(&mut self, column: &str, values: Vec<Value>) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(column.to_string(), value);
        }
    }

    /// A new relation with only `columns`, in the given order.
    ///
    /// Columns this relation does not have are skipped.
    pub fn select(&self, columns: &[&str]) -> Relation {
        let kept: Vec<String> = columns
            .iter()
            .filter(|c| self.has_column(c))
            .map(|c| (*c).to_string())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                kept.iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect()
            })
            .collect();
        Relation::with_columns(self.name.clone(), kept, rows)
    }

    /// Remove columns from the column list and from every row.
    pub fn drop_columns(&mut self, columns: &[String]) {
        self.columns.retain(|c| !columns.contains(c));
        for row in &mut self.rows {
            row.retain(|key, _| !columns.contains(key));
        }
    }

    /// Row `index` with exactly this relation's columns, in column order,
    /// missing cells filled with `null`.
    pub fn normalized_row(&self, index: usize) -> Record {
        self.columns
            .iter()
            .map(|column| (column.clone(), self.cell(index, column).clone()))
            .collect()
    }
}

/// Relations loaded for one run, keyed by relation name.
#[derive(Debug, Clone, Default)]
pub struct RelationMap {
    relations: BTreeMap<String, Relation>,
}

impl RelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relation under its own name, replacing any previous one.
    pub fn insert(&mut self, relation: Relation) {
        self.relations.insert(relation.name().to_string(), relation);
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Relation> {
        self.relations.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Relation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl FromIterator<Relation> for RelationMap {
    fn from_iter<I: IntoIterator<Item = Relation>>(iter: I) -> Self {
        let mut map = Self::new();
        for relation in iter {
            map.insert(relation);
        }
        map
    }
}
