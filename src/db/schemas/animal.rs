//! Animal schema
//!
//! Livestock raised under a project, with its purchase, weigh-in and sale
//! figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repository::Record;
use crate::db::schemas::Envelope;

pub const ANIMAL_COLLECTION: &str = "animals";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Animal {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub project_id: String,

    pub name: String,

    pub species: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,

    /// Ear tag or registration number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(
        default,
        with = "crate::time::date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<DateTime<Utc>>,

    #[serde(
        default,
        with = "crate::time::date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchase_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_weight: Option<f64>,

    #[serde(
        default,
        with = "crate::time::date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub before_weight_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_weight: Option<f64>,

    #[serde(
        default,
        with = "crate::time::date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub after_weight_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
}

impl Record for Animal {
    const COLLECTION: &'static str = ANIMAL_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
