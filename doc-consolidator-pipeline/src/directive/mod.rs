//! Merge directives.
//!
//! A directive is one declarative rule describing how a child relation (and
//! optionally a dimension relation) is folded into the subject table. Each
//! strategy is its own variant so that an unknown strategy cannot be expressed.

mod table;

pub use table::DirectiveTable;

/// Group a relation by a key and collect one column into an ordered list.
///
/// Used directly as the group-and-list strategy, and as the list enrichment
/// step inside dimension joins and the rollup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSpec {
    /// Relation to aggregate.
    pub relation: String,
    /// Key column in `relation`.
    pub group_by: String,
    /// Column whose values are collected.
    pub column: String,
    /// Output field holding the list.
    pub output: String,
}

impl ListSpec {
    pub fn new(
        relation: impl Into<String>,
        group_by: impl Into<String>,
        column: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            relation: relation.into(),
            group_by: group_by.into(),
            column: column.into(),
            output: output.into(),
        }
    }
}

/// Columns kept in each record of a group-and-dict aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// An explicit, ordered column subset.
    Columns(Vec<String>),
    /// Every column of the dimension relation after its key rename.
    DimensionColumns,
}

impl Projection {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Columns(columns.into_iter().map(Into::into).collect())
    }
}

/// Left join of the primary relation against a dimension lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionJoin {
    /// Dimension relation name.
    pub relation: String,
    /// Foreign-key column in the primary relation.
    pub foreign_key: String,
    /// The dimension's own identifier column, renamed to `foreign_key`
    /// before the join.
    pub dimension_key: String,
    /// List columns folded into the dimension before the join, keyed by
    /// `foreign_key`.
    pub enrichments: Vec<ListSpec>,
}

impl DimensionJoin {
    pub fn new(
        relation: impl Into<String>,
        foreign_key: impl Into<String>,
        dimension_key: impl Into<String>,
    ) -> Self {
        Self {
            relation: relation.into(),
            foreign_key: foreign_key.into(),
            dimension_key: dimension_key.into(),
            enrichments: Vec::new(),
        }
    }

    pub fn with_enrichment(mut self, enrichment: ListSpec) -> Self {
        self.enrichments.push(enrichment);
        self
    }
}

/// Group a relation by a key into an ordered list of projected records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictSpec {
    pub relation: String,
    pub group_by: String,
    pub output: String,
    pub dimension: Option<DimensionJoin>,
    pub projection: Projection,
}

/// Two-hop specialty rollup over the subject relation itself.
///
/// The subject is joined to a specialty dimension for its canonical name,
/// then to itself through `parent_column` for the parent's display name,
/// then enriched with symptom and synonym lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupSpec {
    /// Specialty dimension relation.
    pub dimension: String,
    /// The dimension's identifier column, renamed to `specialty_key`.
    pub dimension_key: String,
    /// The dimension's name column.
    pub dimension_name: String,
    /// Output field for the dimension's name.
    pub canonical_name_output: String,
    /// Subject column the dimension is joined on.
    pub specialty_key: String,
    /// Subject's own identifier column.
    pub id_column: String,
    /// Subject column holding the display name.
    pub display_name_column: String,
    /// Subject column referencing the parent row's `id_column`.
    pub parent_column: String,
    /// Output field for the parent's display name.
    pub parent_name_output: String,
    /// Symptom list, grouped by the symptom relation's key and matched on
    /// `specialty_key`.
    pub symptoms: ListSpec,
    /// Synonym list, matched like `symptoms`.
    pub synonyms: ListSpec,
}

impl RollupSpec {
    /// The rollup used for the specialty-rollup extract.
    pub fn specialty_rollup() -> Self {
        Self {
            dimension: "Specialty".to_string(),
            dimension_key: "Id".to_string(),
            dimension_name: "Name".to_string(),
            canonical_name_output: "CanonicalSpecialtyName".to_string(),
            specialty_key: "SpecialtyId".to_string(),
            id_column: "Id".to_string(),
            display_name_column: "Specialty".to_string(),
            parent_column: "ParentSpecialty".to_string(),
            parent_name_output: "ParentSpecialtyName".to_string(),
            symptoms: ListSpec::new("Symptom", "SpecialtyId", "SymptomText", "SymptomText"),
            synonyms: ListSpec::new("Synonym", "SpecialtyId", "SynonymText", "SynonymText"),
        }
    }
}

/// Merge strategy of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    GroupAndList(ListSpec),
    GroupAndDict(DictSpec),
    RollupSelfJoin(RollupSpec),
}

/// A named merge rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub strategy: Strategy,
}

impl Directive {
    pub fn group_and_list(name: impl Into<String>, spec: ListSpec) -> Self {
        Self {
            name: name.into(),
            strategy: Strategy::GroupAndList(spec),
        }
    }

    pub fn group_and_dict(name: impl Into<String>, spec: DictSpec) -> Self {
        Self {
            name: name.into(),
            strategy: Strategy::GroupAndDict(spec),
        }
    }

    pub fn rollup(name: impl Into<String>, spec: RollupSpec) -> Self {
        Self {
            name: name.into(),
            strategy: Strategy::RollupSelfJoin(spec),
        }
    }

    /// The relation whose absence or emptiness skips this directive.
    ///
    /// `None` for the rollup, whose primary relation is the subject itself.
    pub fn primary_relation(&self) -> Option<&str> {
        match &self.strategy {
            Strategy::GroupAndList(spec) => Some(&spec.relation),
            Strategy::GroupAndDict(spec) => Some(&spec.relation),
            Strategy::RollupSelfJoin(_) => None,
        }
    }

    /// Fields this directive adds to the subject table.
    pub fn outputs(&self) -> Vec<&str> {
        match &self.strategy {
            Strategy::GroupAndList(spec) => vec![spec.output.as_str()],
            Strategy::GroupAndDict(spec) => vec![spec.output.as_str()],
            Strategy::RollupSelfJoin(spec) => vec![
                spec.canonical_name_output.as_str(),
                spec.parent_name_output.as_str(),
                spec.symptoms.output.as_str(),
                spec.synonyms.output.as_str(),
            ],
        }
    }
}
