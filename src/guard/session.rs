//! Identity signals carried in request cookies.
//!
//! The gateway does not mint or validate sessions; the external identity
//! service does. Here we only read the opaque signals it left behind:
//! presence of a session token, a role string, and a status string.

use axum::http::{header, HeaderMap};

/// Cookie holding the opaque session token.
pub const SESSION_COOKIE: &str = "session";
/// Cookie holding the role string.
pub const ROLE_COOKIE: &str = "userRole";
/// Cookie holding the account status string.
pub const STATUS_COOKIE: &str = "userStatus";
/// Cookie holding the subscription flag, cleared on logout.
pub const SUBSCRIPTION_COOKIE: &str = "subscriptionActive";

/// Coarse authorization tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Role {
    /// Parse a role cookie value. Unknown strings yield None (no role).
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// Account lifecycle state. Absence means active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    Inactive,
}

impl Status {
    /// Parse a status cookie value. Unknown strings yield None (active).
    pub fn parse(value: &str) -> Option<Status> {
        match value {
            "pending" => Some(Status::Pending),
            "inactive" => Some(Status::Inactive),
            _ => None,
        }
    }
}

/// Identity signals extracted from one request.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    /// Opaque session token, if any. Presence means authenticated.
    pub session: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
}

impl Identity {
    /// Read identity signals from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Identity {
        Identity {
            session: cookie_value(headers, SESSION_COOKIE),
            role: cookie_value(headers, ROLE_COOKIE).as_deref().and_then(Role::parse),
            status: cookie_value(headers, STATUS_COOKIE).as_deref().and_then(Status::parse),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Extract a single cookie value by name.
///
/// Scans every Cookie header (HTTP/2 clients may send several), first
/// match wins. Empty values count as absent.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .find_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_named_cookie() {
        let headers = headers_with_cookie("session=abc123; userRole=admin; userStatus=pending");
        assert_eq!(cookie_value(&headers, "session"), Some("abc123".to_string()));
        assert_eq!(cookie_value(&headers, "userRole"), Some("admin".to_string()));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn tolerates_whitespace_and_empty_values() {
        let headers = headers_with_cookie("  session=tok ;userRole=;  other=1");
        assert_eq!(cookie_value(&headers, "session"), Some("tok".to_string()));
        assert_eq!(cookie_value(&headers, "userRole"), None);
    }

    #[test]
    fn scans_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("session=tok"));
        assert_eq!(cookie_value(&headers, "session"), Some("tok".to_string()));
    }

    #[test]
    fn identity_from_headers() {
        let headers = headers_with_cookie("session=tok; userRole=manager; userStatus=inactive");
        let identity = Identity::from_headers(&headers);
        assert!(identity.is_authenticated());
        assert_eq!(identity.role, Some(Role::Manager));
        assert_eq!(identity.status, Some(Status::Inactive));
    }

    #[test]
    fn unknown_role_and_status_degrade_to_none() {
        let headers = headers_with_cookie("session=tok; userRole=superuser; userStatus=frozen");
        let identity = Identity::from_headers(&headers);
        assert!(identity.is_authenticated());
        assert_eq!(identity.role, None);
        assert_eq!(identity.status, None);
    }

    #[test]
    fn no_cookies_means_anonymous() {
        let identity = Identity::from_headers(&HeaderMap::new());
        assert!(!identity.is_authenticated());
        assert_eq!(identity.role, None);
        assert_eq!(identity.status, None);
    }
}
