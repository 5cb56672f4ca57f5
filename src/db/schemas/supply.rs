//! Supply inventory schema

use serde::{Deserialize, Serialize};

use crate::db::repository::Record;
use crate::db::schemas::Envelope;

pub const SUPPLY_COLLECTION: &str = "supplies";

/// Equipment or supply carried through a project, valued at start and end
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Supply {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub project_id: String,

    pub description: String,

    pub start_value: f64,

    pub end_value: f64,
}

impl Record for Supply {
    const COLLECTION: &'static str = SUPPLY_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
