//! Operator-facing admin API.
//!
//! Served on its own listener (never the public one) and protected by a
//! bearer key from config. Read-only: it reports gateway state, it does
//! not mutate it.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Extension, Router};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/upstreams", get(get_upstreams))
        .route("/admin/store", get(get_store))
        .layer(middleware::from_fn(admin_auth_middleware))
        .layer(Extension(state.clone()))
        .with_state(state)
}
