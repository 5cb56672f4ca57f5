//! Caller's own profile (`/user`)
//!
//! The profile's id is the caller's identity, so there is exactly one per
//! user and no id appears in the path.

use hyper::Method;
use serde::Deserialize;

use crate::auth::Identity;
use crate::db::schemas::UserDoc;
use crate::db::Envelope;
use crate::routes::request::ApiRequest;
use crate::routes::resource::{optional_date, optional_text, required_text};
use crate::routes::response::{created, no_content, ok, ApiResponse};
use crate::server::AppState;
use crate::types::RecordError;

#[derive(Debug, Deserialize)]
pub struct UserInput {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    birthdate: Option<String>,
    club_name: Option<String>,
    county: Option<String>,
}

/// Build a profile; `first_name` falls back to the token's claim
fn build(input: UserInput, envelope: Envelope, identity: &Identity) -> Result<UserDoc, RecordError> {
    let first_name = optional_text(input.first_name)
        .or_else(|| optional_text(Some(identity.first_name.clone())));

    Ok(UserDoc {
        envelope,
        first_name: required_text(first_name, "first_name")?,
        last_name: optional_text(input.last_name),
        email: optional_text(input.email),
        birthdate: optional_date(input.birthdate)?,
        club_name: optional_text(input.club_name),
        county: optional_text(input.county),
    })
}

pub async fn handle(
    state: &AppState,
    identity: &Identity,
    req: &ApiRequest,
) -> Result<ApiResponse, RecordError> {
    let repo = state.stores.users.as_ref();
    let user_id = identity.user_id.as_str();

    match req.method {
        Method::GET => Ok(ok(&repo.get(user_id, user_id).await?)),
        Method::POST => {
            let input: UserInput = req.json()?;
            let profile = build(input, Envelope::with_id(user_id, user_id), identity)?;
            match repo.get(user_id, user_id).await {
                Ok(_) => Err(RecordError::Conflict("user profile already exists".into())),
                Err(e) if e.is_not_found() => Ok(created(&repo.upsert(profile).await?)),
                Err(e) => Err(e.into()),
            }
        }
        Method::PUT => {
            let input: UserInput = req.json()?;
            let existing = repo.get(user_id, user_id).await?;
            repo.upsert(build(input, existing.envelope.revise(), identity)?)
                .await?;
            Ok(no_content())
        }
        ref method => Err(RecordError::MethodNotAllowed(format!("{} /user", method))),
    }
}
