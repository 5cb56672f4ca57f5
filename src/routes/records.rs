//! Plain record endpoints: bookmarks, projects, animals, feeds, feed
//! purchases, daily feedings, expenses, supplies and events.

use serde::Deserialize;
use std::sync::Arc;

use crate::db::schemas::{
    Animal, Bookmark, DailyFeed, Event, Expense, Feed, FeedPurchase, Project, Supply,
};
use crate::db::{Envelope, Repository, Stores};
use crate::routes::resource::{
    optional_date, optional_text, required_date, required_number, required_text, Resource,
};
use crate::types::RecordError;

#[derive(Debug, Deserialize)]
pub struct BookmarkInput {
    link: Option<String>,
    title: Option<String>,
}

impl Resource for Bookmark {
    type Input = BookmarkInput;
    const PATH: &'static str = "bookmarks";
    const SCOPE_PARAMS: &'static [&'static str] = &["link"];
    const PAGINATED: bool = true;

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.bookmarks
    }

    fn build(input: BookmarkInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(Bookmark {
            envelope,
            link: required_text(input.link, "link")?.trim().to_string(),
            title: optional_text(input.title),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectInput {
    name: Option<String>,
    description: Option<String>,
    year: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl Resource for Project {
    type Input = ProjectInput;
    const PATH: &'static str = "project";
    const SCOPE_PARAMS: &'static [&'static str] = &["year"];

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.projects
    }

    fn build(input: ProjectInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(Project {
            envelope,
            name: required_text(input.name, "name")?,
            description: optional_text(input.description),
            year: required_text(input.year, "year")?,
            start_date: optional_date(input.start_date)?,
            end_date: optional_date(input.end_date)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AnimalInput {
    project_id: Option<String>,
    name: Option<String>,
    species: Option<String>,
    breed: Option<String>,
    tag: Option<String>,
    birth_date: Option<String>,
    purchase_date: Option<String>,
    purchase_price: Option<f64>,
    before_weight: Option<f64>,
    before_weight_date: Option<String>,
    after_weight: Option<f64>,
    after_weight_date: Option<String>,
    sale_price: Option<f64>,
}

impl Resource for Animal {
    type Input = AnimalInput;
    const PATH: &'static str = "animal";
    const SCOPE_PARAMS: &'static [&'static str] = &["project_id"];

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.animals
    }

    fn build(input: AnimalInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(Animal {
            envelope,
            project_id: required_text(input.project_id, "project_id")?,
            name: required_text(input.name, "name")?,
            species: required_text(input.species, "species")?,
            breed: optional_text(input.breed),
            tag: optional_text(input.tag),
            birth_date: optional_date(input.birth_date)?,
            purchase_date: optional_date(input.purchase_date)?,
            purchase_price: input.purchase_price,
            before_weight: input.before_weight,
            before_weight_date: optional_date(input.before_weight_date)?,
            after_weight: input.after_weight,
            after_weight_date: optional_date(input.after_weight_date)?,
            sale_price: input.sale_price,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedInput {
    project_id: Option<String>,
    name: Option<String>,
    brand: Option<String>,
    weight_unit: Option<String>,
}

impl Resource for Feed {
    type Input = FeedInput;
    const PATH: &'static str = "feed";
    const SCOPE_PARAMS: &'static [&'static str] = &["project_id"];

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.feeds
    }

    fn build(input: FeedInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(Feed {
            envelope,
            project_id: required_text(input.project_id, "project_id")?,
            name: required_text(input.name, "name")?,
            brand: optional_text(input.brand),
            weight_unit: optional_text(input.weight_unit),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedPurchaseInput {
    project_id: Option<String>,
    feed_id: Option<String>,
    date_purchased: Option<String>,
    amount_purchased: Option<f64>,
    total_cost: Option<f64>,
}

impl Resource for FeedPurchase {
    type Input = FeedPurchaseInput;
    const PATH: &'static str = "feed-purchase";
    const SCOPE_PARAMS: &'static [&'static str] = &["project_id", "feed_id"];

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.feed_purchases
    }

    fn build(input: FeedPurchaseInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(FeedPurchase {
            envelope,
            project_id: required_text(input.project_id, "project_id")?,
            feed_id: required_text(input.feed_id, "feed_id")?,
            date_purchased: required_date(input.date_purchased, "date_purchased")?,
            amount_purchased: required_number(input.amount_purchased, "amount_purchased")?,
            total_cost: required_number(input.total_cost, "total_cost")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DailyFeedInput {
    project_id: Option<String>,
    animal_id: Option<String>,
    feed_id: Option<String>,
    feed_date: Option<String>,
    feed_amount: Option<f64>,
}

impl Resource for DailyFeed {
    type Input = DailyFeedInput;
    const PATH: &'static str = "daily-feed";
    const SCOPE_PARAMS: &'static [&'static str] = &["project_id", "animal_id", "feed_id"];

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.daily_feeds
    }

    fn build(input: DailyFeedInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(DailyFeed {
            envelope,
            project_id: required_text(input.project_id, "project_id")?,
            animal_id: required_text(input.animal_id, "animal_id")?,
            feed_id: required_text(input.feed_id, "feed_id")?,
            feed_date: required_date(input.feed_date, "feed_date")?,
            feed_amount: required_number(input.feed_amount, "feed_amount")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpenseInput {
    project_id: Option<String>,
    date: Option<String>,
    items: Option<String>,
    quantity: Option<f64>,
    cost: Option<f64>,
}

impl Resource for Expense {
    type Input = ExpenseInput;
    const PATH: &'static str = "expense";
    const SCOPE_PARAMS: &'static [&'static str] = &["project_id"];

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.expenses
    }

    fn build(input: ExpenseInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(Expense {
            envelope,
            project_id: required_text(input.project_id, "project_id")?,
            date: required_date(input.date, "date")?,
            items: required_text(input.items, "items")?,
            quantity: required_number(input.quantity, "quantity")?,
            cost: required_number(input.cost, "cost")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SupplyInput {
    project_id: Option<String>,
    description: Option<String>,
    start_value: Option<f64>,
    end_value: Option<f64>,
}

impl Resource for Supply {
    type Input = SupplyInput;
    const PATH: &'static str = "supply";
    const SCOPE_PARAMS: &'static [&'static str] = &["project_id"];

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.supplies
    }

    fn build(input: SupplyInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(Supply {
            envelope,
            project_id: required_text(input.project_id, "project_id")?,
            description: required_text(input.description, "description")?,
            start_value: required_number(input.start_value, "start_value")?,
            end_value: required_number(input.end_value, "end_value")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EventInput {
    name: Option<String>,
    event_type: Option<String>,
    event_date: Option<String>,
    location: Option<String>,
    description: Option<String>,
    project_id: Option<String>,
}

impl Resource for Event {
    type Input = EventInput;
    const PATH: &'static str = "event";
    const SCOPE_PARAMS: &'static [&'static str] = &["project_id"];
    const PAGINATED: bool = true;

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>> {
        &stores.events
    }

    fn build(input: EventInput, envelope: Envelope) -> Result<Self, RecordError> {
        Ok(Event {
            envelope,
            name: required_text(input.name, "name")?,
            event_type: optional_text(input.event_type),
            event_date: required_date(input.event_date, "event_date")?,
            location: optional_text(input.location),
            description: optional_text(input.description),
            project_id: optional_text(input.project_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_expense_requires_every_field() {
        let err = Expense::build(
            input(json!({ "project_id": "p1", "date": "2024-03-01T00:00:00Z", "items": "Hay" })),
            Envelope::new("u1"),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "missing required field: quantity");
    }

    #[test]
    fn test_animal_dates_validated() {
        let err = Animal::build(
            input(json!({
                "project_id": "p1",
                "name": "Wilbur",
                "species": "swine",
                "birth_date": "March 3rd"
            })),
            Envelope::new("u1"),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "bad date: March 3rd");
    }

    #[test]
    fn test_event_optional_fields_normalized() {
        let event = Event::build(
            input(json!({
                "name": "Achievement Day",
                "event_date": "2024-05-04T13:00:00Z",
                "location": "",
                "project_id": "p1"
            })),
            Envelope::new("u1"),
        )
        .unwrap();
        assert_eq!(event.location, None);
        assert_eq!(event.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_bookmark_link_trimmed() {
        let bookmark = Bookmark::build(
            input(json!({ "link": "  https://4-h.org  " })),
            Envelope::new("u1"),
        )
        .unwrap();
        assert_eq!(bookmark.link, "https://4-h.org");
    }
}
