//! Expense schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repository::Record;
use crate::db::schemas::Envelope;

pub const EXPENSE_COLLECTION: &str = "expenses";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Expense {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub project_id: String,

    #[serde(with = "crate::time::date")]
    pub date: DateTime<Utc>,

    /// What was bought
    pub items: String,

    pub quantity: f64,

    pub cost: f64,
}

impl Record for Expense {
    const COLLECTION: &'static str = EXPENSE_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
