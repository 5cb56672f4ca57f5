//! HTTP routes for the record book
//!
//! [`dispatch`] is the whole HTTP surface: it resolves the path, checks the
//! bearer token, runs the handler and turns any error into a JSON response.

pub mod events;
pub mod health;
pub mod records;
pub mod request;
pub mod resource;
pub mod response;
pub mod sections;
pub mod upc;
pub mod user;

pub use health::{health_check, version_info};
pub use request::ApiRequest;
pub use response::{error_response, preflight_response, ApiResponse};

use hyper::header::AUTHORIZATION;
use hyper::Method;

use crate::auth::{self, Identity};
use crate::db::schemas::{
    Animal, Bookmark, DailyFeed, Event, Expense, Feed, FeedPurchase, Project, SectionKind, Supply,
};
use crate::server::AppState;
use crate::types::RecordError;

/// An authenticated endpoint, resolved from the path alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint<'a> {
    User,
    Bookmarks(Option<&'a str>),
    Project(Option<&'a str>),
    Animal(Option<&'a str>),
    Feed(Option<&'a str>),
    FeedPurchase(Option<&'a str>),
    DailyFeed(Option<&'a str>),
    Expense(Option<&'a str>),
    Supply(Option<&'a str>),
    Events,
    Event(&'a str),
    EventLink(&'a str, &'a str),
    Section(SectionKind, Option<&'a str>),
    Upc(&'a str),
}

impl<'a> Endpoint<'a> {
    fn resolve(segments: &[&'a str]) -> Option<Self> {
        let (head, rest) = segments.split_first()?;
        let id = match rest {
            &[id] => Some(id),
            _ => None,
        };

        let endpoint = match (*head, rest) {
            ("user", []) => Endpoint::User,
            ("event", []) => Endpoint::Events,
            ("event", &[event_id]) => Endpoint::Event(event_id),
            ("event", &[event_id, section_id]) => Endpoint::EventLink(event_id, section_id),
            ("upc", &[code]) => Endpoint::Upc(code),
            (_, rest) if rest.len() > 1 => return None,
            ("bookmarks", _) => Endpoint::Bookmarks(id),
            ("project", _) => Endpoint::Project(id),
            ("animal", _) => Endpoint::Animal(id),
            ("feed", _) => Endpoint::Feed(id),
            ("feed-purchase", _) => Endpoint::FeedPurchase(id),
            ("daily-feed", _) => Endpoint::DailyFeed(id),
            ("expense", _) => Endpoint::Expense(id),
            ("supply", _) => Endpoint::Supply(id),
            (segment, _) => Endpoint::Section(sections::parse_segment(segment)?, id),
        };

        Some(endpoint)
    }
}

/// Route a collected request and produce its response
pub async fn dispatch(state: &AppState, req: ApiRequest) -> ApiResponse {
    match route(state, &req).await {
        Ok(response) => response,
        Err(err) => error_response(err),
    }
}

async fn route(state: &AppState, req: &ApiRequest) -> Result<ApiResponse, RecordError> {
    if req.method == Method::OPTIONS {
        return Ok(preflight_response());
    }

    let segments = req.segments();

    match (&req.method, segments.as_slice()) {
        (&Method::GET, ["health"]) | (&Method::GET, ["healthz"]) => {
            return Ok(health_check(state))
        }
        (&Method::GET, ["version"]) => return Ok(version_info()),
        _ => {}
    }

    let endpoint = Endpoint::resolve(&segments)
        .ok_or_else(|| RecordError::NotFound(format!("no route for {}", req.path)))?;

    let identity: Identity = auth::authenticate(&state.jwt, req.header(AUTHORIZATION))?;

    match endpoint {
        Endpoint::User => user::handle(state, &identity, req).await,
        Endpoint::Bookmarks(id) => resource::handle::<Bookmark>(state, &identity, req, id).await,
        Endpoint::Project(id) => resource::handle::<Project>(state, &identity, req, id).await,
        Endpoint::Animal(id) => resource::handle::<Animal>(state, &identity, req, id).await,
        Endpoint::Feed(id) => resource::handle::<Feed>(state, &identity, req, id).await,
        Endpoint::FeedPurchase(id) => {
            resource::handle::<FeedPurchase>(state, &identity, req, id).await
        }
        Endpoint::DailyFeed(id) => resource::handle::<DailyFeed>(state, &identity, req, id).await,
        Endpoint::Expense(id) => resource::handle::<Expense>(state, &identity, req, id).await,
        Endpoint::Supply(id) => resource::handle::<Supply>(state, &identity, req, id).await,
        Endpoint::Events => resource::handle::<Event>(state, &identity, req, None).await,
        Endpoint::Event(event_id) => events::handle_event(state, &identity, req, event_id).await,
        Endpoint::EventLink(event_id, section_id) => {
            events::handle_link(state, &identity, req, event_id, section_id).await
        }
        Endpoint::Section(kind, id) => sections::handle(state, &identity, req, kind, id).await,
        Endpoint::Upc(code) => upc::handle(state, req, code).await,
    }
}
