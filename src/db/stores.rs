//! Store handles injected into request handlers

use std::sync::Arc;
use tracing::info;

use crate::db::memory::MemoryRepository;
use crate::db::mongo::MongoClient;
use crate::db::repository::{Repository, StoreResult};
use crate::db::schemas::{
    Animal, Bookmark, DailyFeed, Event, EventSection, Expense, Feed, FeedPurchase, Project,
    Section, Supply, UserDoc,
};

/// One repository per entity, built once at start-up
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn Repository<UserDoc>>,
    pub bookmarks: Arc<dyn Repository<Bookmark>>,
    pub projects: Arc<dyn Repository<Project>>,
    pub animals: Arc<dyn Repository<Animal>>,
    pub feeds: Arc<dyn Repository<Feed>>,
    pub feed_purchases: Arc<dyn Repository<FeedPurchase>>,
    pub daily_feeds: Arc<dyn Repository<DailyFeed>>,
    pub expenses: Arc<dyn Repository<Expense>>,
    pub supplies: Arc<dyn Repository<Supply>>,
    pub events: Arc<dyn Repository<Event>>,
    pub event_sections: Arc<dyn Repository<EventSection>>,
    pub sections: Arc<dyn Repository<Section>>,
}

impl Stores {
    /// MongoDB-backed stores; creates indexes on every collection
    pub async fn mongo(client: &MongoClient) -> StoreResult<Self> {
        let stores = Self {
            users: Arc::new(client.repository::<UserDoc>().await?),
            bookmarks: Arc::new(client.repository::<Bookmark>().await?),
            projects: Arc::new(client.repository::<Project>().await?),
            animals: Arc::new(client.repository::<Animal>().await?),
            feeds: Arc::new(client.repository::<Feed>().await?),
            feed_purchases: Arc::new(client.repository::<FeedPurchase>().await?),
            daily_feeds: Arc::new(client.repository::<DailyFeed>().await?),
            expenses: Arc::new(client.repository::<Expense>().await?),
            supplies: Arc::new(client.repository::<Supply>().await?),
            events: Arc::new(client.repository::<Event>().await?),
            event_sections: Arc::new(client.repository::<EventSection>().await?),
            sections: Arc::new(client.repository::<Section>().await?),
        };
        info!(db = client.db_name(), "MongoDB stores ready");
        Ok(stores)
    }

    /// Process-local stores, empty at start
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryRepository::new()),
            bookmarks: Arc::new(MemoryRepository::new()),
            projects: Arc::new(MemoryRepository::new()),
            animals: Arc::new(MemoryRepository::new()),
            feeds: Arc::new(MemoryRepository::new()),
            feed_purchases: Arc::new(MemoryRepository::new()),
            daily_feeds: Arc::new(MemoryRepository::new()),
            expenses: Arc::new(MemoryRepository::new()),
            supplies: Arc::new(MemoryRepository::new()),
            events: Arc::new(MemoryRepository::new()),
            event_sections: Arc::new(MemoryRepository::new()),
            sections: Arc::new(MemoryRepository::new()),
        }
    }
}
