//! Resume section schema
//!
//! The record book resume has fourteen section kinds. They differ only in
//! which fields they carry, so they share one document type and one
//! collection; the `section` tag selects a [`SectionSchema`] that validates
//! the kind-specific fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::db::repository::{Record, Repository, Scope, StoreResult};
use crate::db::schemas::Envelope;
use crate::types::{RecordError, StoreError};

pub const SECTION_COLLECTION: &str = "sections";

/// Keys owned by the document itself rather than the kind schema
const RESERVED_KEYS: &[&str] = &["id", "user_id", "created", "updated", "section", "year"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum SectionKind {
    ClubInformation = 1,
    ProjectExperience = 2,
    ClubActivities = 3,
    CountyActivities = 4,
    StateActivities = 5,
    ClubLeadership = 6,
    CountyLeadership = 7,
    ClubCommunityService = 8,
    IndividualCommunityService = 9,
    Communications = 10,
    Awards = 11,
    OtherActivities = 12,
    OtherLeadership = 13,
    OtherAwards = 14,
}

impl SectionKind {
    pub const ALL: [SectionKind; 14] = [
        SectionKind::ClubInformation,
        SectionKind::ProjectExperience,
        SectionKind::ClubActivities,
        SectionKind::CountyActivities,
        SectionKind::StateActivities,
        SectionKind::ClubLeadership,
        SectionKind::CountyLeadership,
        SectionKind::ClubCommunityService,
        SectionKind::IndividualCommunityService,
        SectionKind::Communications,
        SectionKind::Awards,
        SectionKind::OtherActivities,
        SectionKind::OtherLeadership,
        SectionKind::OtherAwards,
    ];

    pub fn from_number(number: i64) -> Option<Self> {
        if (1..=14).contains(&number) {
            Some(Self::ALL[(number - 1) as usize])
        } else {
            None
        }
    }

    /// Like [`SectionKind::from_number`], with the client-facing error
    pub fn parse(number: i64) -> Result<Self, RecordError> {
        Self::from_number(number)
            .ok_or_else(|| RecordError::Validation(format!("invalid section number: {number}")))
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::ClubInformation => "club_information",
            SectionKind::ProjectExperience => "project_experience",
            SectionKind::ClubActivities => "club_activities",
            SectionKind::CountyActivities => "county_activities",
            SectionKind::StateActivities => "state_activities",
            SectionKind::ClubLeadership => "club_leadership",
            SectionKind::CountyLeadership => "county_leadership",
            SectionKind::ClubCommunityService => "club_community_service",
            SectionKind::IndividualCommunityService => "individual_community_service",
            SectionKind::Communications => "communications",
            SectionKind::Awards => "awards",
            SectionKind::OtherActivities => "other_activities",
            SectionKind::OtherLeadership => "other_leadership",
            SectionKind::OtherAwards => "other_awards",
        }
    }

    pub fn schema(self) -> &'static SectionSchema {
        &SCHEMAS[self.number() as usize - 1]
    }

    /// Route segment, e.g. `section7`
    pub fn path(self) -> String {
        format!("section{}", self.number())
    }
}

impl TryFrom<u8> for SectionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value as i64).ok_or_else(|| format!("invalid section number: {value}"))
    }
}

impl From<SectionKind> for u8 {
    fn from(kind: SectionKind) -> Self {
        kind.number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Integer => value.as_i64().is_some(),
            FieldKind::Number => value.is_number(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Text => "a string",
            FieldKind::Integer => "an integer",
            FieldKind::Number => "a number",
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required,
    }
}

/// Per-kind field descriptor
#[derive(Debug)]
pub struct SectionSchema {
    pub kind: SectionKind,
    pub fields: &'static [FieldSpec],
}

use FieldKind::{Integer, Number, Text};

static SCHEMAS: [SectionSchema; 14] = [
    SectionSchema {
        kind: SectionKind::ClubInformation,
        fields: &[
            field("grade", Integer, true),
            field("club_name", Text, true),
            field("num_in_club", Integer, false),
            field("club_leader", Text, false),
            field("meetings_held", Integer, false),
            field("meetings_attended", Integer, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::ProjectExperience,
        fields: &[
            field("project_name", Text, true),
            field("project_scope", Text, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::ClubActivities,
        fields: &[field("activity", Text, true), field("role", Text, false)],
    },
    SectionSchema {
        kind: SectionKind::CountyActivities,
        fields: &[field("activity", Text, true), field("role", Text, false)],
    },
    SectionSchema {
        kind: SectionKind::StateActivities,
        fields: &[
            field("activity", Text, true),
            field("level", Text, false),
            field("role", Text, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::ClubLeadership,
        fields: &[
            field("leadership_role", Text, true),
            field("hours", Number, false),
            field("num_people_reached", Integer, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::CountyLeadership,
        fields: &[
            field("leadership_role", Text, true),
            field("level", Text, false),
            field("hours", Number, false),
            field("num_people_reached", Integer, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::ClubCommunityService,
        fields: &[
            field("activity", Text, true),
            field("hours", Number, false),
            field("num_people_served", Integer, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::IndividualCommunityService,
        fields: &[
            field("activity", Text, true),
            field("hours", Number, false),
            field("num_people_served", Integer, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::Communications,
        fields: &[
            field("communication_type", Text, true),
            field("topic", Text, false),
            field("num_people_reached", Integer, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::Awards,
        fields: &[field("recognition", Text, true), field("level", Text, false)],
    },
    SectionSchema {
        kind: SectionKind::OtherActivities,
        fields: &[
            field("activity", Text, true),
            field("organization", Text, false),
            field("role", Text, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::OtherLeadership,
        fields: &[
            field("leadership_role", Text, true),
            field("organization", Text, false),
            field("hours", Number, false),
        ],
    },
    SectionSchema {
        kind: SectionKind::OtherAwards,
        fields: &[
            field("recognition", Text, true),
            field("organization", Text, false),
        ],
    },
];

impl SectionSchema {
    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a request body against this kind and keep only its fields.
    ///
    /// Envelope keys, `section` and `year` are dropped; nulls count as absent.
    pub fn validate(&self, body: &Map<String, Value>) -> Result<Map<String, Value>, RecordError> {
        let mut fields = Map::new();

        for (key, value) in body {
            if RESERVED_KEYS.contains(&key.as_str()) || value.is_null() {
                continue;
            }
            let spec = self.field(key).ok_or_else(|| {
                RecordError::Validation(format!(
                    "unknown field for {}: {key}",
                    self.kind.name()
                ))
            })?;
            if !spec.kind.accepts(value) {
                return Err(RecordError::Validation(format!(
                    "field {key} must be {}",
                    spec.kind
                )));
            }
            fields.insert(key.clone(), value.clone());
        }

        for spec in self.fields.iter().filter(|f| f.required) {
            let present = match fields.get(spec.name) {
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
                None => false,
            };
            if !present {
                return Err(RecordError::missing_field(spec.name));
            }
        }

        Ok(fields)
    }
}

/// One resume entry of any kind
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Section {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub section: SectionKind,

    pub year: String,

    /// Kind-specific fields, validated by the kind's schema
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record for Section {
    const COLLECTION: &'static str = SECTION_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

/// Scope selecting one section kind
pub fn kind_scope(kind: SectionKind) -> Scope {
    Scope::new().with("section", kind.number())
}

/// Fetch a section by `(kind, id, user)`.
///
/// A record with that id but another kind is reported as not found.
pub async fn fetch_section(
    repo: &dyn Repository<Section>,
    kind: SectionKind,
    user_id: &str,
    id: &str,
) -> StoreResult<Section> {
    let section = repo.get(user_id, id).await?;
    if section.section == kind {
        Ok(section)
    } else {
        Err(StoreError::not_found(format!(
            "{} {id} is not a {} record",
            section.section.path(),
            kind.name()
        )))
    }
}
