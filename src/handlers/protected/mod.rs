pub mod note_versions;
pub mod processing;
pub mod resource;

use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::filter::Filter;
use crate::models::Resource;
use crate::validation::InvalidInput;

/// A path id that is not a UUID cannot name an owned resource.
pub(crate) fn parse_id<R: Resource>(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", R::NAME)))
}

/// Positive integer, capped at the configured maximum.
pub(crate) fn list_limit(raw: Option<&str>, api: &ApiConfig) -> Result<u32, ApiError> {
    match raw {
        None => Ok(api.default_list_limit.min(api.max_list_limit)),
        Some(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n.min(api.max_list_limit)),
            _ => Err(InvalidInput::field("limit", "must be a positive integer").into()),
        },
    }
}

/// Rows to skip; absent means the first page.
pub(crate) fn list_offset(raw: Option<&str>) -> Result<u32, ApiError> {
    match raw {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ApiError::from(InvalidInput::field("offset", "must be a non-negative integer"))),
    }
}

/// `?limit=&offset=` as a page of the caller's rows.
pub(crate) fn page(limit: Option<&str>, offset: Option<&str>, api: &ApiConfig) -> Result<Filter, ApiError> {
    Ok(Filter::new().limit(list_limit(limit, api)?).offset(list_offset(offset)?))
}
