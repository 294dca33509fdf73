//! Route table and routing policy.
//!
//! `resolve` is the single place that decides what a path shows under a given
//! authorization state. It never renders anything, so it is tested on its own.

use super::entities::AuthorizationState;

pub const ROOT: &str = "/";
pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/register";
pub const USER_HOME: &str = "/user";
pub const ADMIN_HOME: &str = "/admin";
pub const ADMIN_CONFIRM_USER: &str = "/admin/confirm-user";
pub const ADMIN_CONFIRM_CLAIM: &str = "/admin/confirm-claim";
pub const ADMIN_POLICYHOLDERS: &str = "/admin/view-all-policyholders";

const UNAUTHENTICATED_PATHS: &[&str] = &[LOGIN, REGISTER];
const USER_PATHS: &[&str] = &[USER_HOME];
const ADMIN_PATHS: &[&str] = &[
    ADMIN_HOME,
    ADMIN_CONFIRM_USER,
    ADMIN_CONFIRM_CLAIM,
    ADMIN_POLICYHOLDERS,
];

/// What a permitted path renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    UserDashboard,
    /// Admin dashboard, optionally opened on one of its panels.
    AdminDashboard(Option<AdminSection>),
}

/// Admin panels reachable by deep link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSection {
    ConfirmUser,
    ConfirmClaim,
    Policyholders,
}

/// Outcome of the routing policy for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Render(Screen),
    /// Replace the requested path with this canonical one.
    Redirect(&'static str),
}

/// Canonical path for a state: where every disallowed navigation lands.
pub fn home_path(state: AuthorizationState) -> &'static str {
    match state {
        AuthorizationState::Unauthenticated => LOGIN,
        AuthorizationState::AuthenticatedUser => USER_HOME,
        AuthorizationState::AuthenticatedAdmin => ADMIN_HOME,
    }
}

/// Paths that render without a redirect under `state`.
pub fn allowed_paths(state: AuthorizationState) -> &'static [&'static str] {
    match state {
        AuthorizationState::Unauthenticated => UNAUTHENTICATED_PATHS,
        AuthorizationState::AuthenticatedUser => USER_PATHS,
        AuthorizationState::AuthenticatedAdmin => ADMIN_PATHS,
    }
}

/// Drops query/fragment and trailing slashes. An empty path is the root.
pub fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { ROOT } else { trimmed }
}

/// Routing policy. Wrong-role and unknown paths redirect to the role's home;
/// every path except the login/registration pair redirects to `/login` while
/// unauthenticated, deep links included.
pub fn resolve(state: AuthorizationState, path: &str) -> Route {
    let path = normalize(path);
    match state {
        AuthorizationState::Unauthenticated => match path {
            LOGIN => Route::Render(Screen::Login),
            REGISTER => Route::Render(Screen::Register),
            _ => Route::Redirect(LOGIN),
        },
        AuthorizationState::AuthenticatedUser => match path {
            USER_HOME => Route::Render(Screen::UserDashboard),
            _ => Route::Redirect(USER_HOME),
        },
        AuthorizationState::AuthenticatedAdmin => match admin_section(path) {
            Some(section) => Route::Render(Screen::AdminDashboard(section)),
            None => Route::Redirect(ADMIN_HOME),
        },
    }
}

/// `None` when the path is outside `/admin`; `Some(None)` for the dashboard
/// itself or an unrecognised sub-path.
fn admin_section(path: &str) -> Option<Option<AdminSection>> {
    match path {
        ADMIN_HOME => Some(None),
        ADMIN_CONFIRM_USER => Some(Some(AdminSection::ConfirmUser)),
        ADMIN_CONFIRM_CLAIM => Some(Some(AdminSection::ConfirmClaim)),
        ADMIN_POLICYHOLDERS => Some(Some(AdminSection::Policyholders)),
        p if p.starts_with("/admin/") => Some(None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AuthorizationState::*;

    #[test]
    fn test_unauthenticated_deep_links_redirect_to_login() {
        for path in [
            "/",
            "/user",
            "/admin",
            "/admin/confirm-claim",
            "/nowhere",
            "",
        ] {
            assert_eq!(resolve(Unauthenticated, path), Route::Redirect(LOGIN), "{path}");
        }
        assert_eq!(resolve(Unauthenticated, "/login"), Route::Render(Screen::Login));
        assert_eq!(
            resolve(Unauthenticated, "/register"),
            Route::Render(Screen::Register)
        );
    }

    #[test]
    fn test_user_never_renders_admin_paths() {
        for path in ADMIN_PATHS.iter().copied().chain(["/admin/anything"]) {
            assert_eq!(resolve(AuthenticatedUser, path), Route::Redirect(USER_HOME));
        }
        assert_eq!(
            resolve(AuthenticatedUser, "/user"),
            Route::Render(Screen::UserDashboard)
        );
    }

    #[test]
    fn test_admin_routes() {
        assert_eq!(resolve(AuthenticatedAdmin, "/user"), Route::Redirect(ADMIN_HOME));
        assert_eq!(resolve(AuthenticatedAdmin, "/"), Route::Redirect(ADMIN_HOME));
        assert_eq!(resolve(AuthenticatedAdmin, "/login"), Route::Redirect(ADMIN_HOME));
        assert_eq!(
            resolve(AuthenticatedAdmin, "/admin/confirm-user/"),
            Route::Render(Screen::AdminDashboard(Some(AdminSection::ConfirmUser)))
        );
        assert_eq!(
            resolve(AuthenticatedAdmin, "/admin/reports"),
            Route::Render(Screen::AdminDashboard(None))
        );
    }

    #[test]
    fn test_authenticated_login_path_goes_home() {
        assert_eq!(resolve(AuthenticatedUser, "/login"), Route::Redirect(USER_HOME));
        assert_eq!(resolve(AuthenticatedUser, "/register"), Route::Redirect(USER_HOME));
    }

    #[test]
    fn test_redirect_targets_always_render() {
        for state in [Unauthenticated, AuthenticatedUser, AuthenticatedAdmin] {
            assert!(matches!(resolve(state, home_path(state)), Route::Render(_)));
            for path in allowed_paths(state) {
                assert!(matches!(resolve(state, path), Route::Render(_)), "{path}");
            }
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("///"), "/");
        assert_eq!(normalize("/admin/?tab=1"), "/admin");
        assert_eq!(normalize("/user#top"), "/user");
    }
}
