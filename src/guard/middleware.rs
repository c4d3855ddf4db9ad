//! Route guard middleware.
//!
//! Runs before the proxy handler. Redirects never reach the upstream;
//! forwarded requests carry the evaluated identity in an extension so
//! downstream handlers do not re-parse cookies.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::guard::classify::classify;
use crate::guard::decision::{evaluate, Decision};
use crate::guard::session::Identity;
use crate::observability::metrics;

pub async fn guard_middleware(mut req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let identity = Identity::from_headers(req.headers());
    let class = classify(&path);

    match evaluate(&path, query.as_deref(), &identity) {
        Decision::Forward => {
            metrics::record_guard_decision(class.as_str(), "forward");
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Decision::Redirect(target) => {
            let location = target.location();
            tracing::debug!(
                path = %path,
                class = %class.as_str(),
                location = %location,
                authenticated = identity.is_authenticated(),
                "Guard redirect"
            );
            metrics::record_guard_decision(class.as_str(), "redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::routing::any;
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/{*path}", any(|| async { "page" }))
            .route("/", any(|| async { "page" }))
            .layer(axum::middleware::from_fn(guard_middleware))
    }

    async fn send(path_and_query: &str, cookies: Option<&str>) -> (StatusCode, Option<String>) {
        let mut builder = Request::builder().uri(path_and_query);
        if let Some(c) = cookies {
            builder = builder.header(header::COOKIE, c);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (status, location)
    }

    #[tokio::test]
    async fn anonymous_page_request_redirects_with_callback() {
        let (status, location) = send("/invoices?page=2", None).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location.as_deref(),
            Some("/login?callbackUrl=%2Finvoices%3Fpage%3D2")
        );
    }

    #[tokio::test]
    async fn forwarded_request_reaches_handler() {
        let (status, location) = send("/dashboard", Some("session=tok")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(location, None);
    }

    #[tokio::test]
    async fn role_violation_redirects_to_unauthorized() {
        let (status, location) = send("/admin/users", Some("session=tok; userRole=user")).await;
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/unauthorized"));
    }
}
