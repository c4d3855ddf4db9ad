//! Guard decision engine.
//!
//! Pure function from (path, query, identity) to a forwarding decision.
//! Performs no I/O and never fails; every input combination maps to
//! exactly one outcome.

use crate::guard::classify::{classify, RouteClass};
use crate::guard::session::{Identity, Role, Status};

/// Query parameter preserving the original destination across a login.
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Pages an authenticated user may stay on despite a gated status.
const STATUS_PAGES: [&str; 2] = ["/pending-approval", "/account-inactive"];

/// Where a request is sent instead of its original destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// The login page, optionally carrying the original destination.
    Login { callback: Option<String> },
    /// A decoded callback destination, resumed after login.
    Resume(String),
    PendingApproval,
    AccountInactive,
    Unauthorized,
    AdminHome,
    Dashboard,
}

impl RedirectTarget {
    /// Render the Location header value.
    pub fn location(&self) -> String {
        match self {
            RedirectTarget::Login { callback: None } => "/login".to_string(),
            RedirectTarget::Login { callback: Some(dest) } => {
                format!("/login?{}={}", CALLBACK_PARAM, urlencoding::encode(dest))
            }
            RedirectTarget::Resume(dest) => dest.clone(),
            RedirectTarget::PendingApproval => "/pending-approval".to_string(),
            RedirectTarget::AccountInactive => "/account-inactive".to_string(),
            RedirectTarget::Unauthorized => "/unauthorized".to_string(),
            RedirectTarget::AdminHome => "/admin".to_string(),
            RedirectTarget::Dashboard => "/dashboard".to_string(),
        }
    }
}

/// Outcome of one guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Pass the request through to the upstream.
    Forward,
    /// Short-circuit with a 307 redirect.
    Redirect(RedirectTarget),
}

/// Evaluate the guard for one request.
///
/// `path` always starts with `/`; `query` is the raw query string without
/// the leading `?`, if any.
pub fn evaluate(path: &str, query: Option<&str>, identity: &Identity) -> Decision {
    match classify(path) {
        RouteClass::AuthApi | RouteClass::Asset | RouteClass::Logout => Decision::Forward,
        RouteClass::Public => evaluate_public(path, query, identity),
        class => evaluate_protected(path, query, class, identity),
    }
}

/// Public pages: anonymous users pass, signed-in users are sent where
/// they belong (callback first, then status page, then role landing).
fn evaluate_public(path: &str, query: Option<&str>, identity: &Identity) -> Decision {
    if !identity.is_authenticated() {
        return Decision::Forward;
    }
    if let Some(dest) = callback_param(query) {
        return Decision::Redirect(RedirectTarget::Resume(dest));
    }
    match identity.status {
        Some(Status::Pending) if path != "/pending-approval" => {
            Decision::Redirect(RedirectTarget::PendingApproval)
        }
        Some(Status::Inactive) if path != "/account-inactive" => {
            Decision::Redirect(RedirectTarget::AccountInactive)
        }
        _ if STATUS_PAGES.contains(&path) => Decision::Forward,
        _ => match identity.role {
            Some(Role::Admin) => Decision::Redirect(RedirectTarget::AdminHome),
            _ => Decision::Redirect(RedirectTarget::Dashboard),
        },
    }
}

/// Protected pages: require a session, then role area, then status gate.
fn evaluate_protected(
    path: &str,
    query: Option<&str>,
    class: RouteClass,
    identity: &Identity,
) -> Decision {
    if !identity.is_authenticated() {
        // Root never carries a callback parameter.
        let callback = (path != "/").then(|| original_destination(path, query));
        return Decision::Redirect(RedirectTarget::Login { callback });
    }

    match class {
        RouteClass::AdminArea if identity.role != Some(Role::Admin) => {
            return Decision::Redirect(RedirectTarget::Unauthorized);
        }
        RouteClass::ManagerArea
            if !matches!(identity.role, Some(Role::Admin) | Some(Role::Manager)) =>
        {
            return Decision::Redirect(RedirectTarget::Unauthorized);
        }
        _ => {}
    }

    match identity.status {
        Some(Status::Pending) => Decision::Redirect(RedirectTarget::PendingApproval),
        Some(Status::Inactive) => Decision::Redirect(RedirectTarget::AccountInactive),
        None => Decision::Forward,
    }
}

/// Original destination as path plus query, for the login callback.
fn original_destination(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", path, q),
        _ => path.to_string(),
    }
}

/// Extract and decode the callback parameter from a raw query string.
/// First occurrence wins; empty values count as absent.
///
/// Decoded values are sanitized like a URL parser would: tab, CR and LF
/// are stripped, and a value still carrying control bytes counts as
/// absent. The Location header built from the result is always valid.
fn callback_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != CALLBACK_PARAM || value.is_empty() {
            return None;
        }
        let decoded = urlencoding::decode(value).ok()?;
        let cleaned: String = decoded
            .chars()
            .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
            .collect();
        if cleaned.is_empty() || cleaned.chars().any(|c| c.is_ascii_control()) {
            return None;
        }
        Some(cleaned)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous() -> Identity {
        Identity::default()
    }

    fn signed_in(role: Option<Role>, status: Option<Status>) -> Identity {
        Identity {
            session: Some("tok".to_string()),
            role,
            status,
        }
    }

    fn redirect_to(decision: Decision) -> String {
        match decision {
            Decision::Redirect(target) => target.location(),
            Decision::Forward => panic!("expected redirect, got forward"),
        }
    }

    #[test]
    fn anonymous_protected_path_redirects_to_login_with_callback() {
        let d = evaluate("/invoices/42", None, &anonymous());
        assert_eq!(redirect_to(d), "/login?callbackUrl=%2Finvoices%2F42");
    }

    #[test]
    fn callback_preserves_query_string() {
        let d = evaluate("/invoices", Some("page=2&sort=date"), &anonymous());
        assert_eq!(
            redirect_to(d),
            "/login?callbackUrl=%2Finvoices%3Fpage%3D2%26sort%3Ddate"
        );
    }

    #[test]
    fn root_gets_no_callback() {
        let d = evaluate("/", None, &anonymous());
        assert_eq!(redirect_to(d), "/login");
    }

    #[test]
    fn anonymous_public_path_forwards() {
        assert_eq!(evaluate("/login", None, &anonymous()), Decision::Forward);
        assert_eq!(evaluate("/register", None, &anonymous()), Decision::Forward);
    }

    #[test]
    fn auth_api_never_redirects() {
        assert_eq!(evaluate("/api/auth/session", None, &anonymous()), Decision::Forward);
        let pending = signed_in(Some(Role::User), Some(Status::Pending));
        assert_eq!(evaluate("/api/auth/session", None, &pending), Decision::Forward);
    }

    #[test]
    fn signed_in_on_login_honors_callback_over_everything() {
        let pending = signed_in(Some(Role::User), Some(Status::Pending));
        let d = evaluate("/login", Some("callbackUrl=%2Fdashboard"), &pending);
        assert_eq!(redirect_to(d), "/dashboard");
    }

    #[test]
    fn signed_in_on_login_lands_by_role() {
        let d = evaluate("/login", None, &signed_in(Some(Role::Admin), None));
        assert_eq!(redirect_to(d), "/admin");

        let d = evaluate("/login", None, &signed_in(Some(Role::User), None));
        assert_eq!(redirect_to(d), "/dashboard");

        let d = evaluate("/login", None, &signed_in(None, None));
        assert_eq!(redirect_to(d), "/dashboard");
    }

    #[test]
    fn pending_user_on_auth_page_goes_to_pending_approval() {
        let pending = signed_in(Some(Role::User), Some(Status::Pending));
        let d = evaluate("/register", None, &pending);
        assert_eq!(redirect_to(d), "/pending-approval");
    }

    #[test]
    fn pending_user_stays_on_pending_approval() {
        let pending = signed_in(Some(Role::User), Some(Status::Pending));
        assert_eq!(evaluate("/pending-approval", None, &pending), Decision::Forward);
    }

    #[test]
    fn inactive_user_stays_on_account_inactive() {
        let inactive = signed_in(Some(Role::User), Some(Status::Inactive));
        assert_eq!(evaluate("/account-inactive", None, &inactive), Decision::Forward);
        let d = evaluate("/login", None, &inactive);
        assert_eq!(redirect_to(d), "/account-inactive");
    }

    #[test]
    fn active_user_on_status_page_forwards() {
        let active = signed_in(Some(Role::User), None);
        assert_eq!(evaluate("/pending-approval", None, &active), Decision::Forward);
    }

    #[test]
    fn admin_area_requires_admin() {
        let d = evaluate("/admin/users", None, &signed_in(Some(Role::User), None));
        assert_eq!(redirect_to(d), "/unauthorized");

        let d = evaluate("/admin/users", None, &signed_in(Some(Role::Manager), None));
        assert_eq!(redirect_to(d), "/unauthorized");

        let admin = signed_in(Some(Role::Admin), None);
        assert_eq!(evaluate("/admin/users", None, &admin), Decision::Forward);
    }

    #[test]
    fn manager_area_admits_admin_and_manager() {
        let manager = signed_in(Some(Role::Manager), None);
        assert_eq!(evaluate("/reports/sales", None, &manager), Decision::Forward);

        let admin = signed_in(Some(Role::Admin), None);
        assert_eq!(evaluate("/analytics", None, &admin), Decision::Forward);

        let d = evaluate("/reports/sales", None, &signed_in(Some(Role::User), None));
        assert_eq!(redirect_to(d), "/unauthorized");
    }

    #[test]
    fn missing_role_is_denied_admin_area() {
        let d = evaluate("/admin", None, &signed_in(None, None));
        assert_eq!(redirect_to(d), "/unauthorized");
    }

    #[test]
    fn role_check_precedes_status_gate() {
        // A pending non-admin probing /admin sees unauthorized, not the
        // status page.
        let pending_user = signed_in(Some(Role::User), Some(Status::Pending));
        let d = evaluate("/admin", None, &pending_user);
        assert_eq!(redirect_to(d), "/unauthorized");

        // A pending admin passes the role check and is then status-gated.
        let pending_admin = signed_in(Some(Role::Admin), Some(Status::Pending));
        let d = evaluate("/admin", None, &pending_admin);
        assert_eq!(redirect_to(d), "/pending-approval");
    }

    #[test]
    fn status_gate_applies_to_general_paths() {
        let pending = signed_in(Some(Role::User), Some(Status::Pending));
        let d = evaluate("/dashboard", None, &pending);
        assert_eq!(redirect_to(d), "/pending-approval");

        let inactive = signed_in(Some(Role::User), Some(Status::Inactive));
        let d = evaluate("/invoices", None, &inactive);
        assert_eq!(redirect_to(d), "/account-inactive");
    }

    #[test]
    fn active_user_forwards_on_general_paths() {
        let active = signed_in(Some(Role::User), None);
        assert_eq!(evaluate("/dashboard", None, &active), Decision::Forward);
        assert_eq!(evaluate("/invoices/42", None, &active), Decision::Forward);
    }

    #[test]
    fn logout_always_forwards() {
        let pending = signed_in(Some(Role::User), Some(Status::Pending));
        assert_eq!(evaluate("/logout", None, &pending), Decision::Forward);
        assert_eq!(evaluate("/logout", None, &anonymous()), Decision::Forward);
    }

    #[test]
    fn callback_param_first_occurrence_wins() {
        let d = evaluate(
            "/login",
            Some("callbackUrl=%2Freports&callbackUrl=%2Fadmin"),
            &signed_in(Some(Role::Manager), None),
        );
        assert_eq!(redirect_to(d), "/reports");
    }

    #[test]
    fn empty_callback_param_is_ignored() {
        let d = evaluate("/login", Some("callbackUrl="), &signed_in(Some(Role::User), None));
        assert_eq!(redirect_to(d), "/dashboard");
    }

    #[test]
    fn control_bytes_in_callback_are_stripped() {
        // %0D%0A decodes to CR/LF; the remainder must still redirect.
        let d = evaluate(
            "/login",
            Some("callbackUrl=%0D%0A%2Fdashboard"),
            &signed_in(Some(Role::User), None),
        );
        assert_eq!(redirect_to(d), "/dashboard");
    }

    #[test]
    fn callback_of_only_control_bytes_is_ignored() {
        let d = evaluate(
            "/login",
            Some("callbackUrl=%0D%0A"),
            &signed_in(Some(Role::User), None),
        );
        assert_eq!(redirect_to(d), "/dashboard");
    }

    #[test]
    fn callback_with_embedded_control_byte_is_ignored() {
        let d = evaluate(
            "/login",
            Some("callbackUrl=%2Freports%00"),
            &signed_in(Some(Role::Manager), None),
        );
        assert_eq!(redirect_to(d), "/dashboard");
    }
}
