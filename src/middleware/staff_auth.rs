use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::db::{AppState, queries};
use crate::error::AppError;
use crate::models::Staff;

/// The authenticated staff member, attached to every back-office request.
#[derive(Clone)]
pub struct StaffContext {
    pub staff: Staff,
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Authenticate a staff API key from the Authorization header and attach a
/// [`StaffContext`] to the request.
pub async fn staff_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let conn = state.db.get()?;
    let staff = queries::get_staff_by_api_key(&conn, token)?.ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(StaffContext { staff });
    Ok(next.run(request).await)
}
