//! Bearer credential extraction
//!
//! The service does not validate tokens itself. It only lifts the caller's
//! credential off the request so outbound Locations API calls run under the
//! same authorization.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

const SCHEME: &str = "Bearer";

/// The inbound token with its `Bearer` scheme stripped, if one was sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BearerCredential(pub Option<String>);

/// Extract the token from the Authorization header
///
/// A value without the scheme prefix is forwarded unchanged. Blank tokens
/// count as absent.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix(SCHEME).unwrap_or(value).trim_start();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerCredential {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerCredential(extract_credential(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn strips_bearer_scheme() {
        assert_eq!(
            extract_credential(&headers("Bearer eyJhbGciOi.abc")),
            Some("eyJhbGciOi.abc".to_string())
        );
    }

    #[test]
    fn raw_token_passes_through() {
        assert_eq!(
            extract_credential(&headers("eyJhbGciOi.abc")),
            Some("eyJhbGciOi.abc".to_string())
        );
    }

    #[test]
    fn missing_or_blank_header_is_none() {
        assert_eq!(extract_credential(&HeaderMap::new()), None);
        assert_eq!(extract_credential(&headers("Bearer   ")), None);
    }
}
