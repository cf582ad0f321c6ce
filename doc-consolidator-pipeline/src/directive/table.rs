//! Ordered, validated directive table.

use std::collections::HashSet;

use crate::directive::{Directive, ListSpec, Projection, Strategy};
use crate::errors::DirectiveError;

/// Directives in evaluation order.
///
/// Construction validates every directive, so a table that exists can always
/// be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveTable {
    directives: Vec<Directive>,
}

impl DirectiveTable {
    pub fn new(directives: Vec<Directive>) -> Result<Self, DirectiveError> {
        let mut outputs = HashSet::new();

        for (position, directive) in directives.iter().enumerate() {
            if directive.name.trim().is_empty() {
                return Err(DirectiveError::EmptyName(position));
            }
            validate_strategy(directive)?;

            for output in directive.outputs() {
                if !outputs.insert(output.to_string()) {
                    return Err(DirectiveError::DuplicateOutput(output.to_string()));
                }
            }
        }

        Ok(Self { directives })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

fn require(directive: &str, field: &str, value: &str) -> Result<(), DirectiveError> {
    if value.trim().is_empty() {
        Err(DirectiveError::empty_field(directive, field))
    } else {
        Ok(())
    }
}

fn validate_list(directive: &str, spec: &ListSpec) -> Result<(), DirectiveError> {
    require(directive, "relation", &spec.relation)?;
    require(directive, "group_by", &spec.group_by)?;
    require(directive, "column", &spec.column)?;
    require(directive, "output", &spec.output)
}

fn validate_strategy(directive: &Directive) -> Result<(), DirectiveError> {
    let name = directive.name.as_str();
    match &directive.strategy {
        Strategy::GroupAndList(spec) => validate_list(name, spec),
        Strategy::GroupAndDict(spec) => {
            require(name, "relation", &spec.relation)?;
            require(name, "group_by", &spec.group_by)?;
            require(name, "output", &spec.output)?;

            if let Some(dimension) = &spec.dimension {
                require(name, "dimension.relation", &dimension.relation)?;
                require(name, "dimension.foreign_key", &dimension.foreign_key)?;
                require(name, "dimension.dimension_key", &dimension.dimension_key)?;
                for enrichment in &dimension.enrichments {
                    validate_list(name, enrichment)?;
                }
            }

            match &spec.projection {
                Projection::Columns(columns) if columns.is_empty() => {
                    Err(DirectiveError::EmptyProjection(name.to_string()))
                }
                Projection::Columns(columns) => columns
                    .iter()
                    .try_for_each(|c| require(name, "projection", c)),
                Projection::DimensionColumns if spec.dimension.is_none() => {
                    Err(DirectiveError::ProjectionWithoutDimension(name.to_string()))
                }
                Projection::DimensionColumns => Ok(()),
            }
        }
        Strategy::RollupSelfJoin(spec) => {
            require(name, "dimension", &spec.dimension)?;
            require(name, "dimension_key", &spec.dimension_key)?;
            require(name, "dimension_name", &spec.dimension_name)?;
            require(name, "canonical_name_output", &spec.canonical_name_output)?;
            require(name, "specialty_key", &spec.specialty_key)?;
            require(name, "id_column", &spec.id_column)?;
            require(name, "display_name_column", &spec.display_name_column)?;
            require(name, "parent_column", &spec.parent_column)?;
            require(name, "parent_name_output", &spec.parent_name_output)?;
            validate_list(name, &spec.symptoms)?;
            validate_list(name, &spec.synonyms)
        }
    }
}
