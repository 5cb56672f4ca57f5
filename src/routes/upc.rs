//! UPC lookup proxy (`/upc/{code}`)

use hyper::Method;

use crate::routes::request::ApiRequest;
use crate::routes::response::{ok, ApiResponse};
use crate::server::AppState;
use crate::types::RecordError;

pub async fn handle(
    state: &AppState,
    req: &ApiRequest,
    code: &str,
) -> Result<ApiResponse, RecordError> {
    if req.method != Method::GET {
        return Err(RecordError::MethodNotAllowed(format!(
            "{} {}",
            req.method, req.path
        )));
    }

    let product = state.upc.lookup(code).await?;
    Ok(ok(&product))
}
