use super::*;
use crate::test_helpers::user_fixture;

fn signed_in(role: Option<Role>, status: Status) -> Session {
    Session { identity: Some(user_fixture("9876543210", role, status)), is_loading: false }
}

fn signed_out() -> Session {
    Session { identity: None, is_loading: false }
}

#[test]
fn loading_session_suspends() {
    let session = Session::default();
    assert_eq!(evaluate(&session, &Requirements::default()), Decision::Suspend);
    // Even with a cached identity, loading wins.
    let mut session = signed_in(Some(Role::Head), Status::Active);
    session.is_loading = true;
    assert_eq!(evaluate(&session, &Requirements::role(Role::Head)), Decision::Suspend);
}

#[test]
fn no_identity_redirects_to_auth() {
    assert_eq!(evaluate(&signed_out(), &Requirements::default()), Decision::Redirect(Route::Auth));
    assert_eq!(evaluate(&signed_out(), &Requirements::any_status()), Decision::Redirect(Route::Auth));
}

#[test]
fn wrong_role_redirects_home() {
    let session = signed_in(Some(Role::Normal), Status::Active);
    assert_eq!(evaluate(&session, &Requirements::role(Role::Head)), Decision::Redirect(Route::Home));
    let session = signed_in(None, Status::Active);
    assert_eq!(evaluate(&session, &Requirements::role(Role::Head)), Decision::Redirect(Route::Home));
}

#[test]
fn role_checked_before_status() {
    let session = signed_in(Some(Role::Normal), Status::Pending);
    assert_eq!(evaluate(&session, &Requirements::role(Role::Head)), Decision::Redirect(Route::Home));
}

#[test]
fn pending_status_redirects_to_membership() {
    let session = signed_in(Some(Role::Normal), Status::Pending);
    assert_eq!(evaluate(&session, &Requirements::default()), Decision::Redirect(Route::Membership));
    let session = signed_in(Some(Role::Permanent), Status::Rejected);
    assert_eq!(check_route(&session, Route::Dashboard), Decision::Redirect(Route::Membership));
}

#[test]
fn matching_requirements_allow() {
    let session = signed_in(Some(Role::Head), Status::Active);
    assert_eq!(check_route(&session, Route::Admin), Decision::Allow);
    assert_eq!(check_route(&session, Route::Dashboard), Decision::Allow);
}

#[test]
fn membership_accepts_any_status() {
    for status in [Status::Pending, Status::Active, Status::Rejected] {
        assert_eq!(check_route(&signed_in(Some(Role::Normal), status), Route::Membership), Decision::Allow);
    }
}

#[test]
fn public_routes_always_allowed() {
    let loading = Session::default();
    for route in [Route::Home, Route::Auth, Route::About, Route::Administration, Route::Contact] {
        assert_eq!(check_route(&loading, route), Decision::Allow);
        assert_eq!(check_route(&signed_out(), route), Decision::Allow);
    }
}

#[test]
fn parse_matches_paths() {
    assert_eq!(Route::parse("/"), Some(Route::Home));
    assert_eq!(Route::parse(""), Some(Route::Home));
    assert_eq!(Route::parse("/admin/"), Some(Route::Admin));
    assert_eq!(Route::parse("/dashboard?tab=card"), Some(Route::Dashboard));
    assert_eq!(Route::parse("/nope"), None);
    for route in Route::ALL {
        assert_eq!(Route::parse(route.path()), Some(route));
    }
}

#[test]
fn home_for_picks_admin_for_head() {
    assert_eq!(home_for(&user_fixture("1", Some(Role::Head), Status::Active)), Route::Admin);
    assert_eq!(home_for(&user_fixture("1", Some(Role::Associated), Status::Active)), Route::Dashboard);
    assert_eq!(home_for(&user_fixture("1", None, Status::Pending)), Route::Dashboard);
}

#[test]
fn display_is_path() {
    assert_eq!(Route::Administration.to_string(), "/administration");
}
