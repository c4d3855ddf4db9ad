//! Logout handling.
//!
//! The gateway terminates `/logout` itself instead of forwarding it: the
//! session cookies live on this origin, so only this origin can expire them.
//!
//! # Data Flow
//!
//! ```text
//! GET /logout
//!     |
//!     v
//! expire session + role + status + subscription cookies
//!     |
//!     v
//! 307 -> /login
//! ```

use axum::body::Body;
use axum::http::header::{HeaderValue, LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::Response;

use crate::guard::session::{ROLE_COOKIE, SESSION_COOKIE, STATUS_COOKIE, SUBSCRIPTION_COOKIE};

/// Cookie string that expires the named cookie on every path.
fn expired_cookie(name: &str, http_only: bool) -> String {
    if http_only {
        format!(
            "{}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; HttpOnly; SameSite=Lax",
            name
        )
    } else {
        format!(
            "{}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; SameSite=Lax",
            name
        )
    }
}

/// Clears every session cookie and sends the client back to the login page.
pub async fn logout_handler() -> Response {
    tracing::info!("Session terminated via /logout");

    let mut builder = Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(LOCATION, HeaderValue::from_static("/login"));

    for (name, http_only) in [
        (SESSION_COOKIE, true),
        (ROLE_COOKIE, false),
        (STATUS_COOKIE, false),
        (SUBSCRIPTION_COOKIE, false),
    ] {
        builder = builder.header(SET_COOKIE, expired_cookie(name, http_only));
    }

    match builder.body(Body::empty()) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = %err, "Failed to build logout response");
            Response::new(Body::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn redirects_to_login() {
        let response = logout_handler().await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    }

    #[tokio::test]
    async fn expires_all_four_cookies() {
        let response = logout_handler().await;
        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        assert_eq!(cookies.len(), 4);
        for name in [SESSION_COOKIE, ROLE_COOKIE, STATUS_COOKIE, SUBSCRIPTION_COOKIE] {
            assert!(
                cookies
                    .iter()
                    .any(|c| c.starts_with(&format!("{}=;", name))),
                "missing expiry for {}",
                name
            );
        }
        for cookie in &cookies {
            assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
            assert!(cookie.contains("Path=/"));
        }
    }

    #[tokio::test]
    async fn session_cookie_is_http_only() {
        let response = logout_handler().await;
        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        let session = cookies
            .iter()
            .find(|c| c.starts_with(&format!("{}=;", SESSION_COOKIE)))
            .unwrap();
        assert!(session.contains("HttpOnly"));

        let role = cookies
            .iter()
            .find(|c| c.starts_with(&format!("{}=;", ROLE_COOKIE)))
            .unwrap();
        assert!(!role.contains("HttpOnly"));
    }
}
