//! Bookmark schema

use serde::{Deserialize, Serialize};

use crate::db::repository::Record;
use crate::db::schemas::Envelope;

pub const BOOKMARK_COLLECTION: &str = "bookmarks";

/// Saved link; each user may bookmark a given link once
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Bookmark {
    #[serde(flatten)]
    pub envelope: Envelope,

    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Record for Bookmark {
    const COLLECTION: &'static str = BOOKMARK_COLLECTION;
    const UNIQUE: &'static [&'static str] = &["link"];

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}
