//! Resolves the calling `Principal` from HTTP Basic credentials.
//!
//! No `Authorization` header means an anonymous caller. A header that does
//! not decode, names an unknown user, carries the wrong password or belongs
//! to a deactivated account is rejected with 401.

use crate::{access::Principal, errors::AppError, services::AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose};
use tracing::debug;

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Principal::Anonymous);
        };

        let (username, password) = value
            .to_str()
            .ok()
            .and_then(parse_basic)
            .ok_or_else(AppError::unauthorized)?;

        match state.users.verify_credentials(&username, &password).await? {
            Some(user) => Ok(Principal::from(&user)),
            None => {
                debug!(username = %username, "rejected credentials");
                Err(AppError::unauthorized())
            }
        }
    }
}

/// Split `Basic <base64(user:password)>` into its parts.
fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_credentials() {
        let header = format!("Basic {}", general_purpose::STANDARD.encode("alice:s3:cret"));
        assert_eq!(
            parse_basic(&header),
            Some(("alice".to_string(), "s3:cret".to_string()))
        );
        assert_eq!(parse_basic("Bearer abc"), None);
        assert_eq!(parse_basic("Basic !!!"), None);
    }
}
