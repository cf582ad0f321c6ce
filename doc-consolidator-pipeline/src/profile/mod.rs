//! Built-in consolidation profiles.
//!
//! A profile names the subject relation, the directive table applied to it
//! and how the result is assembled.

use crate::assembler::{AssemblerConfig, SideRelation};
use crate::directive::{
    DictSpec, DimensionJoin, Directive, DirectiveTable, ListSpec, Projection, RollupSpec,
};
use crate::errors::DirectiveError;

pub const PHYSICIAN_PROFILE: &str = "physician";
pub const SPECIALTY_ROLLUP_PROFILE: &str = "specialty-rollup";

/// Everything needed to consolidate one extract.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    /// Relation whose rows become documents.
    pub subject: String,
    /// Business identifier column of the subject.
    pub subject_key: String,
    pub directives: DirectiveTable,
    pub assembler: AssemblerConfig,
    /// Default name of the written output.
    pub output_name: String,
}

impl Profile {
    /// Look up a built-in profile by name.
    pub fn by_name(name: &str) -> Result<Self, DirectiveError> {
        match name {
            PHYSICIAN_PROFILE => Self::physician(),
            SPECIALTY_ROLLUP_PROFILE => Self::specialty_rollup(),
            other => Err(DirectiveError::UnknownProfile(other.to_string())),
        }
    }

    /// Physicians with their languages, practices, insurance, locations,
    /// education, credentials and specialties.
    pub fn physician() -> Result<Self, DirectiveError> {
        let by_physician = |relation: &str, output: &str, dimension, projection| DictSpec {
            relation: relation.to_string(),
            group_by: "PhysicianId".to_string(),
            output: output.to_string(),
            dimension,
            projection,
        };

        let directives = DirectiveTable::new(vec![
            Directive::group_and_list(
                "Languages",
                ListSpec::new("PhysicianLanguage", "PhysicianId", "Language", "languages"),
            ),
            Directive::group_and_list(
                "Practices",
                ListSpec::new("PhysicianPractice", "PhysicianId", "PracticeId", "PracticeId"),
            ),
            Directive::group_and_list(
                "Team Keywords",
                ListSpec::new("PhysicianTeamKeyword", "PhysicianId", "TeamKeyword", "TeamKeyword"),
            ),
            Directive::group_and_list(
                "Faculty Appointments",
                ListSpec::new(
                    "PhysicianFacultyAppointment",
                    "PhysicianId",
                    "Position",
                    "Position_faculty_appointments",
                ),
            ),
            Directive::group_and_dict(
                "Insurance",
                by_physician(
                    "PhysicianInsurance",
                    "insurance",
                    Some(DimensionJoin::new("Insurance", "InsuranceId", "Id")),
                    Projection::columns(["InsuranceId", "Name"]),
                ),
            ),
            Directive::group_and_dict(
                "Locations",
                by_physician(
                    "PhysicianLocation",
                    "location",
                    Some(DimensionJoin::new("Location", "LocationId", "Id")),
                    Projection::DimensionColumns,
                ),
            ),
            Directive::group_and_dict(
                "Area of Expertise",
                by_physician(
                    "PhysicianAreaOfExpertise",
                    "area_of_expertise",
                    Some(DimensionJoin::new("AreaOfExpertise", "AreaOfExpertiseId", "Id")),
                    Projection::DimensionColumns,
                ),
            ),
            Directive::group_and_dict(
                "Education",
                by_physician(
                    "PhysicianEducation",
                    "education",
                    None,
                    Projection::columns(["School", "SchoolType", "Degree", "AreaOfStudy"]),
                ),
            ),
            Directive::group_and_dict(
                "Credentials",
                by_physician(
                    "PhysicianCredential",
                    "facility",
                    None,
                    Projection::columns(["Facility", "ShowOnWeb"]),
                ),
            ),
            Directive::group_and_dict(
                "Specialties",
                by_physician(
                    "PhysicianSpecialty",
                    "specialties",
                    Some(
                        DimensionJoin::new("Specialty", "SpecialtyId", "Id")
                            .with_enrichment(ListSpec::new(
                                "Synonym",
                                "SpecialtyId",
                                "SynonymText",
                                "SynonymTexts",
                            ))
                            .with_enrichment(ListSpec::new(
                                "Symptom",
                                "SpecialtyId",
                                "SymptomText",
                                "SymptomTexts",
                            )),
                    ),
                    Projection::columns([
                        "SpecialtyId",
                        "BoardCertification",
                        "AcceptingNewPatients",
                        "Primary",
                        "Name",
                        "SynonymTexts",
                        "SymptomTexts",
                    ]),
                ),
            ),
        ])?;

        Ok(Self {
            name: PHYSICIAN_PROFILE.to_string(),
            subject: "Physician".to_string(),
            subject_key: "PhysicianId".to_string(),
            directives,
            assembler: AssemblerConfig {
                drop_columns: vec!["AcceptingNewPatients".to_string()],
                ..AssemblerConfig::default()
            },
            output_name: "transformed_physician_data.jsonl".to_string(),
        })
    }

    /// Specialty links rolled up to their canonical and parent names, followed
    /// by the area-of-expertise reference list.
    pub fn specialty_rollup() -> Result<Self, DirectiveError> {
        let directives = DirectiveTable::new(vec![Directive::rollup(
            "Specialty Rollup",
            RollupSpec::specialty_rollup(),
        )])?;

        Ok(Self {
            name: SPECIALTY_ROLLUP_PROFILE.to_string(),
            subject: "PhysicianRollupSpecialties".to_string(),
            subject_key: "Id".to_string(),
            directives,
            assembler: AssemblerConfig {
                side_relations: vec![
                    SideRelation::new("AreaOfExpertise").rename("Id", "AreaofExpertiseId")
                ],
                ..AssemblerConfig::default()
            },
            output_name: "transformed_rollup_data.jsonl".to_string(),
        })
    }

    /// Write the output under `name` instead of the profile default.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }
}
