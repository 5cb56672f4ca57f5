//! Event endpoints beyond plain CRUD
//!
//! `GET /event/{id}` resolves the sections linked to an event, `POST
//! /event/{id}` links a section, and `/event/{id}/{section_id}` reads or
//! removes one link.

use hyper::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::Identity;
use crate::db::schemas::{fetch_section, Event, EventSection, Section, SectionKind};
use crate::db::{Envelope, Scope};
use crate::routes::request::ApiRequest;
use crate::routes::resource::{self, required_text};
use crate::routes::response::{created, no_content, ok, ApiResponse};
use crate::server::AppState;
use crate::types::RecordError;

/// An event with its linked sections, in link order
#[derive(Debug, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
pub struct AddSectionInput {
    section_number: Option<i64>,
    section_id: Option<String>,
}

/// `/event/{event_id}`
pub async fn handle_event(
    state: &AppState,
    identity: &Identity,
    req: &ApiRequest,
    event_id: &str,
) -> Result<ApiResponse, RecordError> {
    match req.method {
        Method::GET => Ok(ok(&event_detail(state, identity, event_id).await?)),
        Method::POST => Ok(created(&add_section(state, identity, req, event_id).await?)),
        _ => resource::handle::<Event>(state, identity, req, Some(event_id)).await,
    }
}

/// `/event/{event_id}/{section_id}`
pub async fn handle_link(
    state: &AppState,
    identity: &Identity,
    req: &ApiRequest,
    event_id: &str,
    section_id: &str,
) -> Result<ApiResponse, RecordError> {
    let link = find_link(state, identity, event_id, section_id).await?;

    match req.method {
        Method::GET => {
            let section = fetch_section(
                state.stores.sections.as_ref(),
                link.section_number,
                &identity.user_id,
                &link.section_id,
            )
            .await?;
            Ok(ok(&section))
        }
        Method::DELETE => {
            state
                .stores
                .event_sections
                .delete(&identity.user_id, &link.envelope.id)
                .await?;
            Ok(no_content())
        }
        ref method => Err(RecordError::MethodNotAllowed(format!(
            "{} {}",
            method, req.path
        ))),
    }
}

async fn event_detail(
    state: &AppState,
    identity: &Identity,
    event_id: &str,
) -> Result<EventDetail, RecordError> {
    let user_id = identity.user_id.as_str();
    let event = state.stores.events.get(user_id, event_id).await?;

    let links = state
        .stores
        .event_sections
        .list(user_id, &Scope::new().with("event_id", event_id))
        .await?;

    let mut sections = Vec::with_capacity(links.len());
    for link in links {
        match fetch_section(
            state.stores.sections.as_ref(),
            link.section_number,
            user_id,
            &link.section_id,
        )
        .await
        {
            Ok(section) => sections.push(section),
            // Sections can be deleted while still linked
            Err(e) if e.is_not_found() => {
                debug!(event_id = %event_id, section_id = %link.section_id, "skipping dangling section link");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(EventDetail { event, sections })
}

/// Link a section to an event.
///
/// Checks run in order: section number, event, section record, then the
/// store's uniqueness on `(event_id, section_id)`.
async fn add_section(
    state: &AppState,
    identity: &Identity,
    req: &ApiRequest,
    event_id: &str,
) -> Result<EventSection, RecordError> {
    let input: AddSectionInput = req.json()?;
    let number = input
        .section_number
        .ok_or_else(|| RecordError::missing_field("section_number"))?;
    let kind = SectionKind::parse(number)?;
    let section_id = required_text(input.section_id, "section_id")?;

    let user_id = identity.user_id.as_str();
    state.stores.events.get(user_id, event_id).await?;
    fetch_section(state.stores.sections.as_ref(), kind, user_id, &section_id).await?;

    let link = EventSection {
        envelope: Envelope::new(user_id),
        event_id: event_id.to_string(),
        section_number: kind,
        section_id,
    };

    Ok(state.stores.event_sections.upsert(link).await?)
}

async fn find_link(
    state: &AppState,
    identity: &Identity,
    event_id: &str,
    section_id: &str,
) -> Result<EventSection, RecordError> {
    let scope = Scope::new()
        .with("event_id", event_id)
        .with("section_id", section_id);

    state
        .stores
        .event_sections
        .find_first(&identity.user_id, &scope)
        .await?
        .ok_or_else(|| {
            RecordError::NotFound(format!(
                "section {section_id} is not linked to event {event_id}"
            ))
        })
}
