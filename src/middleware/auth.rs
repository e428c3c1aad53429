use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::Credentials;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the session before any handler work and injects the
/// [`Principal`](crate::auth::Principal) as a request extension.
///
/// A request that fails here never has its body read.
pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = Credentials::from_headers(request.headers(), &state.config.security.session_cookie)?;
    let principal = state.authenticator.authenticate(&credentials).await?;

    tracing::debug!(principal = %principal.id(), method = %request.method(), path = %request.uri().path(), "Resolved session");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
