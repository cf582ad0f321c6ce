//! Merge strategy executor.
//!
//! Applies directives to the subject table in declared order. Every
//! per-directive problem is absorbed into a [`RunWarning`]; a skipped
//! directive still declares its output fields, as explicit nulls.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::directive::{DictSpec, Directive, DirectiveTable, ListSpec, Projection, Strategy};
use crate::processor::ops::{attach, group_records, group_values, left_join, missing_columns, Groups};
use crate::report::RunWarning;
use doc_consolidator_shared::{Relation, RelationMap};

/// Executes merge directives against one run's relation map.
pub struct MergeExecutor<'a> {
    pub(crate) relations: &'a RelationMap,
    warnings: Vec<RunWarning>,
}

impl<'a> MergeExecutor<'a> {
    pub fn new(relations: &'a RelationMap) -> Self {
        Self {
            relations,
            warnings: Vec::new(),
        }
    }

    /// Apply every directive of `table` in order.
    #[instrument(skip_all, fields(subject = %subject.name(), directives = table.len()))]
    pub fn apply_all(&mut self, subject: Relation, table: &DirectiveTable) -> Relation {
        table
            .iter()
            .fold(subject, |subject, directive| self.apply(subject, directive))
    }

    /// Apply one directive and return the updated subject table.
    ///
    /// Every output field of `directive` is present afterwards.
    pub fn apply(&mut self, subject: Relation, directive: &Directive) -> Relation {
        debug!(directive = %directive.name, "Merging");

        let mut subject = self.merge(subject, directive);
        for output in directive.outputs() {
            if !subject.has_column(output) {
                let nulls = vec![Value::Null; subject.len()];
                subject.set_column(output, nulls);
            }
        }
        subject
    }

    fn merge(&mut self, subject: Relation, directive: &Directive) -> Relation {

        let relations = self.relations;
        if let Some(name) = directive.primary_relation() {
            match relations.get(name) {
                None => {
                    self.record(RunWarning::SourceMissing {
                        directive: directive.name.clone(),
                        relation: name.to_string(),
                    });
                    return subject;
                }
                Some(primary) if primary.is_empty() => {
                    self.record(RunWarning::EmptyRelation {
                        directive: directive.name.clone(),
                        relation: name.to_string(),
                    });
                    return subject;
                }
                Some(_) => {}
            }
        }

        match &directive.strategy {
            Strategy::GroupAndList(spec) => self.group_and_list(subject, &directive.name, spec),
            Strategy::GroupAndDict(spec) => self.group_and_dict(subject, &directive.name, spec),
            Strategy::RollupSelfJoin(spec) => self.rollup(subject, &directive.name, spec),
        }
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[RunWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<RunWarning> {
        self.warnings
    }

    pub(crate) fn record(&mut self, warning: RunWarning) {
        warn!(%warning, "Directive warning");
        self.warnings.push(warning);
    }

    /// Record a warning when `relation` lacks any of `wanted`.
    ///
    /// Returns `true` when every column is present.
    pub(crate) fn require_columns(
        &mut self,
        directive: &str,
        relation: &Relation,
        wanted: &[&str],
    ) -> bool {
        let missing = missing_columns(relation, wanted);
        if missing.is_empty() {
            return true;
        }
        self.record(RunWarning::MissingColumns {
            directive: directive.to_string(),
            relation: relation.name().to_string(),
            columns: missing,
        });
        false
    }

    /// Attach `groups` and record a warning if an existing column was replaced.
    pub(crate) fn attach_groups(
        &mut self,
        directive: &str,
        target: &mut Relation,
        key: &str,
        output: &str,
        groups: &Groups,
    ) {
        if attach(target, key, output, groups) {
            self.record(RunWarning::ColumnOverwritten {
                directive: directive.to_string(),
                column: output.to_string(),
            });
        }
    }

    /// Fold `spec` into `target` as a list column matched on `target_key`.
    ///
    /// Unlike a primary relation, a missing or unusable enrichment relation
    /// still produces the column, filled with empty lists.
    pub(crate) fn enrich_list(
        &mut self,
        directive: &str,
        target: &mut Relation,
        target_key: &str,
        spec: &ListSpec,
    ) {
        let relations = self.relations;
        let groups = match relations.get(&spec.relation) {
            None => {
                self.record(RunWarning::SourceMissing {
                    directive: directive.to_string(),
                    relation: spec.relation.clone(),
                });
                Groups::new()
            }
            Some(relation) => {
                if self.require_columns(directive, relation, &[spec.group_by.as_str(), spec.column.as_str()]) {
                    group_values(relation, &spec.group_by, &spec.column)
                } else {
                    Groups::new()
                }
            }
        };
        self.attach_groups(directive, target, target_key, &spec.output, &groups);
    }

    fn group_and_list(&mut self, mut subject: Relation, directive: &str, spec: &ListSpec) -> Relation {
        let relations = self.relations;
        let Some(relation) = relations.get(&spec.relation) else {
            return subject;
        };
        if !self.require_columns(directive, relation, &[spec.group_by.as_str(), spec.column.as_str()])
            || !self.require_columns(directive, &subject, &[spec.group_by.as_str()])
        {
            return subject;
        }

        let groups = group_values(relation, &spec.group_by, &spec.column);
        debug!(directive, groups = groups.len(), "Grouped values");
        self.attach_groups(directive, &mut subject, &spec.group_by, &spec.output, &groups);
        subject
    }

    fn group_and_dict(&mut self, mut subject: Relation, directive: &str, spec: &DictSpec) -> Relation {
        let relations = self.relations;
        let Some(primary) = relations.get(&spec.relation) else {
            return subject;
        };

        let (joined, projection) = match &spec.dimension {
            Some(dimension) => {
                let Some(source) = relations.get(&dimension.relation) else {
                    self.record(RunWarning::SourceMissing {
                        directive: directive.to_string(),
                        relation: dimension.relation.clone(),
                    });
                    return subject;
                };
                if !self.require_columns(directive, source, &[dimension.dimension_key.as_str()])
                    || !self.require_columns(directive, primary, &[dimension.foreign_key.as_str()])
                {
                    return subject;
                }

                let mut lookup = source.clone();
                lookup.rename_columns(&[(dimension.dimension_key.as_str(), dimension.foreign_key.as_str())]);
                for enrichment in &dimension.enrichments {
                    self.enrich_list(directive, &mut lookup, &dimension.foreign_key, enrichment);
                }

                let projection = match &spec.projection {
                    Projection::Columns(columns) => columns.clone(),
                    Projection::DimensionColumns => lookup.columns().to_vec(),
                };
                (left_join(primary, &lookup, &dimension.foreign_key), projection)
            }
            None => {
                let projection = match &spec.projection {
                    Projection::Columns(columns) => columns.clone(),
                    // Rejected when the table is built.
                    Projection::DimensionColumns => primary.columns().to_vec(),
                };
                (primary.clone(), projection)
            }
        };

        if !self.require_columns(directive, &joined, &[spec.group_by.as_str()])
            || !self.require_columns(directive, &subject, &[spec.group_by.as_str()])
        {
            return subject;
        }

        let wanted: Vec<&str> = projection.iter().map(String::as_str).collect();
        self.require_columns(directive, &joined, &wanted);
        let present: Vec<String> = projection
            .into_iter()
            .filter(|c| joined.has_column(c))
            .collect();

        let groups = group_records(&joined, &spec.group_by, &present);
        debug!(directive, groups = groups.len(), columns = present.len(), "Grouped records");
        self.attach_groups(directive, &mut subject, &spec.group_by, &spec.output, &groups);
        subject
    }
}
