//! Document schemas for the record book
//!
//! Every document flattens the common [`Envelope`] and implements
//! [`Record`](crate::db::Record) with its collection name.

mod animal;
mod bookmark;
mod envelope;
mod event;
mod expense;
mod feed;
mod project;
pub mod section;
mod supply;
mod user;

pub use animal::{Animal, ANIMAL_COLLECTION};
pub use bookmark::{Bookmark, BOOKMARK_COLLECTION};
pub use envelope::Envelope;
pub use event::{Event, EventSection, EVENT_COLLECTION, EVENT_SECTION_COLLECTION};
pub use expense::{Expense, EXPENSE_COLLECTION};
pub use feed::{
    DailyFeed, Feed, FeedPurchase, DAILY_FEED_COLLECTION, FEED_COLLECTION,
    FEED_PURCHASE_COLLECTION,
};
pub use project::{Project, PROJECT_COLLECTION};
pub use section::{
    fetch_section, FieldKind, FieldSpec, Section, SectionKind, SectionSchema, SECTION_COLLECTION,
};
pub use supply::{Supply, SUPPLY_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
