//! Public Reddit `.json` listings, readable without credentials.

use chrono::{DateTime, Utc};

use sweep_core::PostRecord;

use crate::{CollectRequest, CollectorError};

pub(super) fn parse(
    body: &str,
    source_url: &str,
    request: &CollectRequest,
    now: DateTime<Utc>,
) -> Result<Vec<PostRecord>, CollectorError> {
    crate::reddit::parse_public_listing(body, source_url, request, now)
}
