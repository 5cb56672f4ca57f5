//! Resume section endpoints (`/section1` .. `/section14`)
//!
//! All fourteen kinds share these handlers; the kind in the path picks the
//! schema used to validate the body.

use hyper::Method;
use serde_json::{Map, Value};

use crate::auth::Identity;
use crate::db::schemas::section::{fetch_section, kind_scope};
use crate::db::schemas::{Section, SectionKind};
use crate::db::Envelope;
use crate::routes::request::ApiRequest;
use crate::routes::response::{created, no_content, ok, ApiResponse};
use crate::server::AppState;
use crate::types::RecordError;

/// Parse a `sectionN` path segment
pub fn parse_segment(segment: &str) -> Option<SectionKind> {
    let number = segment.strip_prefix("section")?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    number.parse().ok().and_then(SectionKind::from_number)
}

pub async fn handle(
    state: &AppState,
    identity: &Identity,
    req: &ApiRequest,
    kind: SectionKind,
    id: Option<&str>,
) -> Result<ApiResponse, RecordError> {
    let repo = state.stores.sections.as_ref();
    let user_id = identity.user_id.as_str();

    match (&req.method, id) {
        (&Method::GET, None) => {
            let mut scope = kind_scope(kind);
            if let Some(year) = req.query_param("year") {
                scope.push("year", year);
            }
            Ok(ok(&repo.list(user_id, &scope).await?))
        }
        (&Method::POST, None) => {
            let section = build(kind, req, Envelope::new(user_id))?;
            Ok(created(&repo.upsert(section).await?))
        }
        (&Method::GET, Some(id)) => Ok(ok(&fetch_section(repo, kind, user_id, id).await?)),
        (&Method::PUT, Some(id)) => {
            let (year, fields) = build_fields(kind, req)?;
            let existing = fetch_section(repo, kind, user_id, id).await?;
            repo.upsert(Section {
                envelope: existing.envelope.revise(),
                section: kind,
                year,
                fields,
            })
            .await?;
            Ok(no_content())
        }
        (&Method::DELETE, Some(id)) => {
            fetch_section(repo, kind, user_id, id).await?;
            repo.delete(user_id, id).await?;
            Ok(no_content())
        }
        (method, _) => Err(RecordError::MethodNotAllowed(format!(
            "{} {}",
            method, req.path
        ))),
    }
}

fn build(kind: SectionKind, req: &ApiRequest, envelope: Envelope) -> Result<Section, RecordError> {
    let (year, fields) = build_fields(kind, req)?;
    Ok(Section {
        envelope,
        section: kind,
        year,
        fields,
    })
}

/// Validated `year` and kind-specific fields from the request body
fn build_fields(
    kind: SectionKind,
    req: &ApiRequest,
) -> Result<(String, Map<String, Value>), RecordError> {
    let body: Map<String, Value> = req.json()?;

    // Only the integer tag of this kind may ride along in the body
    match body.get("section") {
        None | Some(Value::Null) => {}
        Some(tag) if tag.as_i64() == Some(kind.number() as i64) => {}
        Some(tag) => {
            return Err(RecordError::Validation(format!(
                "section {tag} does not match {}",
                kind.path()
            )))
        }
    }

    let year = match body.get("year") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(RecordError::missing_field("year")),
    };

    let fields = kind.schema().validate(&body)?;
    Ok((year, fields))
}
