//! Operator session and route guarding

use rewards_admin_client::navigation::{ACCESS_DENIED_PATH, SIGN_IN_PATH};
use rewards_admin_core::config::AuthConfig;
use std::fmt;

/// Role an operator needs to use the console
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Signed-in operator as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// Identity provider user id
    pub id: String,
    /// Primary email
    pub email: Option<String>,
    /// Role from the user's public metadata
    pub role: Option<String>,
}

/// Identity provider session as seen by the console
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    loaded: bool,
    operator: Option<Operator>,
}

impl Session {
    /// Session still being restored
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            loaded: false,
            operator: None,
        }
    }

    /// Restored session with nobody signed in
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            loaded: true,
            operator: None,
        }
    }

    /// Restored session for `operator`
    #[must_use]
    pub const fn signed_in(operator: Operator) -> Self {
        Self {
            loaded: true,
            operator: Some(operator),
        }
    }

    /// Whether the identity provider has finished restoring the session
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether someone is signed in
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.operator.is_some()
    }

    /// Signed-in operator
    #[must_use]
    pub const fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    /// Whether the signed-in operator holds `role`
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.operator
            .as_ref()
            .and_then(|op| op.role.as_deref())
            .is_some_and(|r| r == role)
    }
}

/// Console screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Identity provider sign-in
    SignIn,
    /// Signed in without the required role
    AccessDenied,
    /// Platform summary
    Dashboard,
    /// Category management
    Categories,
    /// Business moderation
    Businesses,
    /// Creator moderation
    Creators,
    /// Content moderation
    Content,
    /// Reports
    Reports,
}

impl Route {
    /// Screens that require the admin role
    pub const PROTECTED: [Self; 6] = [
        Self::Dashboard,
        Self::Categories,
        Self::Businesses,
        Self::Creators,
        Self::Content,
        Self::Reports,
    ];

    /// Path of this screen
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignIn => SIGN_IN_PATH,
            Self::AccessDenied => ACCESS_DENIED_PATH,
            Self::Dashboard => "/dashboard",
            Self::Categories => "/categories",
            Self::Businesses => "/businesses",
            Self::Creators => "/creators",
            Self::Content => "/content",
            Self::Reports => "/reports",
        }
    }

    /// Whether the screen is reachable without a session
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::SignIn | Self::AccessDenied)
    }

    /// Screen for `path`; the sign-in flow owns every path below `/sign-in`
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if path == SIGN_IN_PATH || path.starts_with("/sign-in/") {
            return Some(Self::SignIn);
        }
        let trimmed = path.trim_end_matches('/');
        [Self::AccessDenied]
            .into_iter()
            .chain(Self::PROTECTED)
            .find(|route| route.path() == trimmed)
    }

    /// Screen for `path`, falling back by session state for `/` and unknown paths
    #[must_use]
    pub fn resolve(path: &str, session: &Session) -> Self {
        Self::from_path(path).unwrap_or(if session.is_signed_in() {
            Self::Dashboard
        } else {
            Self::SignIn
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decision for rendering a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Session still restoring; show a loading indicator
    Loading,
    /// Show the screen
    Render(Route),
    /// Replace the location with another screen
    Redirect(Route),
}

/// Decide what to show for `route` given `session` and the required role
#[must_use]
pub fn guard(session: &Session, route: Route, required_role: &str) -> Guard {
    if route.is_public() {
        return Guard::Render(route);
    }
    if !session.is_loaded() {
        return Guard::Loading;
    }
    if !session.is_signed_in() {
        return Guard::Redirect(Route::SignIn);
    }
    if !session.has_role(required_role) {
        return Guard::Redirect(Route::AccessDenied);
    }
    Guard::Render(route)
}

/// [`guard`] bound to the role the deployment requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    required_role: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(SUPER_ADMIN_ROLE)
    }
}

impl RouteGuard {
    /// Guard requiring `required_role`
    #[must_use]
    pub fn new(required_role: impl Into<String>) -> Self {
        Self {
            required_role: required_role.into(),
        }
    }

    /// Guard requiring the configured role
    #[must_use]
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(auth.required_role.clone())
    }

    /// Role an operator must hold
    #[must_use]
    pub fn required_role(&self) -> &str {
        &self.required_role
    }

    /// Decide what to show for `route`
    #[must_use]
    pub fn check(&self, session: &Session, route: Route) -> Guard {
        guard(session, route, &self.required_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn operator(role: Option<&str>) -> Operator {
        Operator {
            id: "user_1".to_string(),
            email: Some("ops@example.com".to_string()),
            role: role.map(ToString::to_string),
        }
    }

    #[rstest]
    #[case("/dashboard", Some(Route::Dashboard))]
    #[case("/businesses/", Some(Route::Businesses))]
    #[case("/sign-in/factor-one", Some(Route::SignIn))]
    #[case("/access-denied", Some(Route::AccessDenied))]
    #[case("/reports?type=users", Some(Route::Reports))]
    #[case("/", None)]
    #[case("/settings", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<Route>) {
        assert_eq!(Route::from_path(path), expected);
    }

    #[test]
    fn test_root_resolves_by_session() {
        let signed_in = Session::signed_in(operator(Some(SUPER_ADMIN_ROLE)));

        assert_eq!(Route::resolve("/", &signed_in), Route::Dashboard);
        assert_eq!(Route::resolve("/", &Session::signed_out()), Route::SignIn);
        assert_eq!(Route::resolve("/nowhere", &signed_in), Route::Dashboard);
    }

    #[test]
    fn test_guard_waits_for_session() {
        assert_eq!(
            guard(&Session::loading(), Route::Dashboard, SUPER_ADMIN_ROLE),
            Guard::Loading
        );
    }

    #[test]
    fn test_guard_redirects_signed_out_to_sign_in() {
        assert_eq!(
            guard(&Session::signed_out(), Route::Creators, SUPER_ADMIN_ROLE),
            Guard::Redirect(Route::SignIn)
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some("admin"))]
    #[case(Some("SUPER_ADMIN"))]
    fn test_guard_denies_wrong_role(#[case] role: Option<&str>) {
        let session = Session::signed_in(operator(role));

        assert_eq!(
            guard(&session, Route::Categories, SUPER_ADMIN_ROLE),
            Guard::Redirect(Route::AccessDenied)
        );
    }

    #[test]
    fn test_guard_renders_for_super_admin() {
        let session = Session::signed_in(operator(Some(SUPER_ADMIN_ROLE)));

        for route in Route::PROTECTED {
            assert_eq!(guard(&session, route, SUPER_ADMIN_ROLE), Guard::Render(route));
        }
    }

    #[test]
    fn test_route_guard_uses_configured_role() {
        let mut config = rewards_admin_core::Config::new("https://api.example.com", "pk_test");
        config.auth.required_role = "moderator".to_string();
        let route_guard = RouteGuard::from_config(&config.auth);

        let moderator = Session::signed_in(operator(Some("moderator")));
        let super_admin = Session::signed_in(operator(Some(SUPER_ADMIN_ROLE)));

        assert_eq!(
            route_guard.check(&moderator, Route::Businesses),
            Guard::Render(Route::Businesses)
        );
        assert_eq!(
            route_guard.check(&super_admin, Route::Businesses),
            Guard::Redirect(Route::AccessDenied)
        );
        assert_eq!(RouteGuard::default().required_role(), SUPER_ADMIN_ROLE);
    }

    #[test]
    fn test_public_routes_always_render() {
        assert_eq!(
            guard(&Session::loading(), Route::SignIn, SUPER_ADMIN_ROLE),
            Guard::Render(Route::SignIn)
        );
    }
}
