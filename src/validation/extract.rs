use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};

use super::{Body, Validate};
use crate::error::ApiError;

/// Extracts and validates a JSON body as `T`.
///
/// Runs after the session middleware, so an unauthenticated request never
/// gets its body inspected.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("Request body too large")
            } else {
                ApiError::bad_request(rejection.body_text())
            }
        })?;

        let body = Body::parse(&bytes)?;
        Ok(ValidatedJson(T::validate(body)?))
    }
}
