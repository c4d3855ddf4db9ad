//! Path classification.
//!
//! # Design Decisions
//! - First match wins; order below is the fixed precedence
//! - Exact matching for the public set, prefix matching for role areas
//! - No regex to guarantee O(n) matching

/// Pages reachable without a session.
pub const PUBLIC_PATHS: [&str; 6] = [
    "/login",
    "/register",
    "/forgot-password",
    "/reset-password",
    "/pending-approval",
    "/account-inactive",
];

/// The logout action handled by the gateway itself.
pub const LOGOUT_PATH: &str = "/logout";

const AUTH_API_PREFIX: &str = "/api/auth/";
const PUBLIC_API_PREFIX: &str = "/api/public/";
const ASSET_PREFIXES: [&str; 2] = ["/static/", "/assets/"];
const ASSET_FILES: [&str; 2] = ["/favicon.ico", "/robots.txt"];

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Identity-provider endpoints. Never guarded, never redirect-looped.
    AuthApi,
    /// Static assets and explicitly public API routes.
    Asset,
    /// The logout action. Always continued so any account can sign out.
    Logout,
    /// Pages in the fixed public set.
    Public,
    /// Paths under /admin.
    AdminArea,
    /// Paths under /reports or /analytics.
    ManagerArea,
    /// Everything else; requires an authenticated session.
    General,
}

impl RouteClass {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::AuthApi => "auth_api",
            RouteClass::Asset => "asset",
            RouteClass::Logout => "logout",
            RouteClass::Public => "public",
            RouteClass::AdminArea => "admin_area",
            RouteClass::ManagerArea => "manager_area",
            RouteClass::General => "general",
        }
    }
}

/// Classify a request path. First match wins.
pub fn classify(path: &str) -> RouteClass {
    if path.starts_with(AUTH_API_PREFIX) {
        return RouteClass::AuthApi;
    }
    if ASSET_PREFIXES.iter().any(|p| path.starts_with(p))
        || ASSET_FILES.contains(&path)
        || path.starts_with(PUBLIC_API_PREFIX)
    {
        return RouteClass::Asset;
    }
    if path == LOGOUT_PATH {
        return RouteClass::Logout;
    }
    if PUBLIC_PATHS.contains(&path) {
        return RouteClass::Public;
    }
    if path.starts_with("/admin") {
        return RouteClass::AdminArea;
    }
    if path.starts_with("/reports") || path.starts_with("/analytics") {
        return RouteClass::ManagerArea;
    }
    RouteClass::General
}
