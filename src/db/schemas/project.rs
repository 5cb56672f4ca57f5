//! Project schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repository::Record;
use crate::db::schemas::Envelope;

pub const PROJECT_COLLECTION: &str = "projects";

/// A 4-H project for one year (e.g. "Market Swine 2024")
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Project {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub year: String,

    #[serde(
        default,
        with = "crate::time::date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(
        default,
        with = "crate::time::date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
}

impl Record for Project {
    const COLLECTION: &'static str = PROJECT_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
