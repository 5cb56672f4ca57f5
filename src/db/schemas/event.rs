//! Event and event-section link schemas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repository::Record;
use crate::db::schemas::{Envelope, SectionKind};

pub const EVENT_COLLECTION: &str = "events";
pub const EVENT_SECTION_COLLECTION: &str = "event_sections";

/// Fair, show, clinic or other dated activity
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Event {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    #[serde(with = "crate::time::date")]
    pub event_date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Record for Event {
    const COLLECTION: &'static str = EVENT_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

/// Link from an event to one resume section record.
///
/// A user may link a given section to a given event once; the store enforces
/// it through the unique `(user_id, event_id, section_id)` key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventSection {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub event_id: String,

    pub section_number: SectionKind,

    pub section_id: String,
}

impl Record for EventSection {
    const COLLECTION: &'static str = EVENT_SECTION_COLLECTION;
    const UNIQUE: &'static [&'static str] = &["event_id", "section_id"];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
