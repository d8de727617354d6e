//! Extractor for the caller's external calendar access token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Header carrying the OAuth access token for the caller's external calendar.
pub const CALENDAR_TOKEN_HEADER: &str = "x-calendar-token";

/// The `X-Calendar-Token` header, when present and non-blank.
///
/// The token is passed straight through to the calendar provider and is
/// never stored or logged.
#[derive(Clone, Default)]
pub struct CalendarToken(pub Option<String>);

impl std::fmt::Debug for CalendarToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self.0.as_ref().map(|_| "<redacted>");
        f.debug_tuple("CalendarToken").field(&shown).finish()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CalendarToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(CALENDAR_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        Ok(CalendarToken(token))
    }
}
