//! Feed, feed purchase and daily feeding schemas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repository::Record;
use crate::db::schemas::Envelope;

pub const FEED_COLLECTION: &str = "feeds";
pub const FEED_PURCHASE_COLLECTION: &str = "feed_purchases";
pub const DAILY_FEED_COLLECTION: &str = "daily_feeds";

/// A feed product used in a project
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Feed {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub project_id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Unit amounts are recorded in (lbs, bags, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
}

impl Record for Feed {
    const COLLECTION: &'static str = FEED_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FeedPurchase {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub project_id: String,

    pub feed_id: String,

    #[serde(with = "crate::time::date")]
    pub date_purchased: DateTime<Utc>,

    pub amount_purchased: f64,

    pub total_cost: f64,
}

impl Record for FeedPurchase {
    const COLLECTION: &'static str = FEED_PURCHASE_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

/// Amount of one feed given to one animal on one day
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DailyFeed {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub project_id: String,

    pub animal_id: String,

    pub feed_id: String,

    #[serde(with = "crate::time::date")]
    pub feed_date: DateTime<Utc>,

    pub feed_amount: f64,
}

impl Record for DailyFeed {
    const COLLECTION: &'static str = DAILY_FEED_COLLECTION;

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
