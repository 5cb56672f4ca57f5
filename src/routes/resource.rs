//! Generic CRUD handlers
//!
//! Each plain entity describes its request body, its list filters and how a
//! record is built from a validated body; list/get/create/update/delete are
//! written once here.

use chrono::{DateTime, Utc};
use hyper::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::Identity;
use crate::db::{Envelope, Page, Pagination, Record, Repository, Scope, Stores};
use crate::routes::request::ApiRequest;
use crate::routes::response::{created, no_content, ok, ApiResponse};
use crate::server::AppState;
use crate::time::{parse_date, parse_optional_date};
use crate::types::RecordError;

/// An entity served under `/{PATH}` and `/{PATH}/{id}`
pub trait Resource: Record {
    /// Request body accepted by create and update
    type Input: DeserializeOwned + Send;

    const PATH: &'static str;

    /// Query parameters applied as equality filters on list
    const SCOPE_PARAMS: &'static [&'static str] = &[];

    /// List returns a [`Page`] instead of a plain array
    const PAGINATED: bool = false;

    fn repo(stores: &Stores) -> &Arc<dyn Repository<Self>>;

    /// Validate `input` and build the record around `envelope`
    fn build(input: Self::Input, envelope: Envelope) -> Result<Self, RecordError>;
}

pub async fn handle<R: Resource>(
    state: &AppState,
    identity: &Identity,
    req: &ApiRequest,
    id: Option<&str>,
) -> Result<ApiResponse, RecordError> {
    let repo = R::repo(&state.stores);
    let user_id = identity.user_id.as_str();

    match (&req.method, id) {
        (&Method::GET, None) => list::<R>(repo.as_ref(), user_id, req).await,
        (&Method::POST, None) => create::<R>(repo.as_ref(), user_id, req).await,
        (&Method::GET, Some(id)) => Ok(ok(&repo.get(user_id, id).await?)),
        (&Method::PUT, Some(id)) => update::<R>(repo.as_ref(), user_id, id, req).await,
        (&Method::DELETE, Some(id)) => {
            repo.delete(user_id, id).await?;
            Ok(no_content())
        }
        (method, _) => Err(RecordError::MethodNotAllowed(format!(
            "{} {}",
            method, req.path
        ))),
    }
}

async fn list<R: Resource>(
    repo: &dyn Repository<R>,
    user_id: &str,
    req: &ApiRequest,
) -> Result<ApiResponse, RecordError> {
    let mut scope = Scope::new();
    let mut filters = Vec::new();
    for param in R::SCOPE_PARAMS {
        if let Some(value) = req.query_param(param) {
            scope.push(*param, value.clone());
            filters.push((*param, value));
        }
    }

    if R::PAGINATED {
        let pagination = Pagination::from_query(req.query.as_deref())?;
        let data = repo.page(user_id, &scope, &pagination).await?;
        let page = Page::new(data, &pagination, &format!("/{}", R::PATH), &filters);
        Ok(ok(&page))
    } else {
        Ok(ok(&repo.list(user_id, &scope).await?))
    }
}

async fn create<R: Resource>(
    repo: &dyn Repository<R>,
    user_id: &str,
    req: &ApiRequest,
) -> Result<ApiResponse, RecordError> {
    let input: R::Input = req.json()?;
    let record = R::build(input, Envelope::new(user_id))?;
    let stored = repo.upsert(record).await?;
    Ok(created(&stored))
}

async fn update<R: Resource>(
    repo: &dyn Repository<R>,
    user_id: &str,
    id: &str,
    req: &ApiRequest,
) -> Result<ApiResponse, RecordError> {
    let input: R::Input = req.json()?;
    let existing = repo.get(user_id, id).await?;
    let record = R::build(input, existing.envelope().revise())?;
    repo.upsert(record).await?;
    Ok(no_content())
}

/// Required text: absent, null and blank are all missing
pub fn required_text(value: Option<String>, name: &str) -> Result<String, RecordError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RecordError::missing_field(name)),
    }
}

/// Optional text with blanks normalized to `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn required_number(value: Option<f64>, name: &str) -> Result<f64, RecordError> {
    value.ok_or_else(|| RecordError::missing_field(name))
}

pub fn required_date(value: Option<String>, name: &str) -> Result<DateTime<Utc>, RecordError> {
    parse_date(&required_text(value, name)?)
}

pub fn optional_date(value: Option<String>) -> Result<Option<DateTime<Utc>>, RecordError> {
    parse_optional_date(value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text(Some("x".into()), "name").unwrap(), "x");
        for missing in [None, Some(String::new()), Some("   ".into())] {
            let err = required_text(missing, "name").unwrap_err();
            assert_eq!(err.to_string(), "missing required field: name");
        }
    }

    #[test]
    fn test_dates() {
        assert!(required_date(Some("2024-01-15T00:00:00Z".into()), "date").is_ok());
        assert_eq!(
            required_date(None, "date").unwrap_err().to_string(),
            "missing required field: date"
        );
        assert_eq!(
            required_date(Some("01/15/2024".into()), "date")
                .unwrap_err()
                .to_string(),
            "bad date: 01/15/2024"
        );
        assert_eq!(optional_date(Some("".into())).unwrap(), None);
        assert!(optional_date(Some("soon".into())).is_err());
    }
}
