use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::error::ApiError;
use crate::net::api::{ApiClient, ME_PATH};
use crate::test_support::{FakeIdentity, MockTransport, profile, profile_json, respond, session_with, test_config};
use crate::util::storage::KeyValueStore;

fn guard(session: &SessionStore, identity: FakeIdentity) -> NavigationGuard<FakeIdentity> {
    NavigationGuard::new(session.clone(), identity, "/")
}

#[test]
fn public_route_is_allowed_without_session() {
    let (session, _) = session_with("", "");
    let guard = guard(&session, FakeIdentity::returning(profile(1, "ana")));
    assert_eq!(block_on(guard.check(&RouteMeta::public("/about"))), NavDecision::Allow);
}

#[test]
fn missing_token_redirects_without_network_call() {
    let (session, _) = session_with("", "");
    let guard = guard(&session, FakeIdentity::returning(profile(1, "ana")));

    let decision = block_on(guard.check(&RouteMeta::protected("/objectives")));

    assert_eq!(decision, NavDecision::Redirect("/".to_owned()));
    assert_eq!(guard.identity.calls(), 0);
}

#[test]
fn token_without_user_fetches_profile_once_and_allows() {
    let (session, _) = session_with("a1", "r1");
    let guard = guard(&session, FakeIdentity::returning(profile(1, "ana")));

    let decision = block_on(guard.check(&RouteMeta::protected("/team")));

    assert_eq!(decision, NavDecision::Allow);
    assert_eq!(guard.identity.calls(), 1);
    assert_eq!(session.user(), Some(profile(1, "ana")));
}

#[test]
fn cached_user_skips_fetch() {
    let (session, _) = session_with("a1", "r1");
    session.set_user(Some(profile(1, "ana")));
    let guard = guard(&session, FakeIdentity::returning(profile(1, "ana")));

    block_on(guard.check(&RouteMeta::protected("/team")));
    block_on(guard.check(&RouteMeta::protected("/meetings")));

    assert_eq!(guard.identity.calls(), 0);
}

#[test]
fn failed_fetch_logs_out_and_redirects() {
    let (session, storage) = session_with("a1", "r1");
    let guard = guard(&session, FakeIdentity::failing(ApiError::Status { status: 401, body: String::new() }));

    let decision = block_on(guard.check(&RouteMeta::protected("/objectives")));

    assert_eq!(decision, NavDecision::Redirect("/".to_owned()));
    assert_eq!(guard.identity.calls(), 1);
    assert!(!session.has_token());
    assert_eq!(session.refresh_token(), "");
    assert_eq!(storage.get("token"), None);
}

#[test]
fn token_rotated_during_fetch_keeps_session_and_allows() {
    let (session, _) = session_with("a1", "r1");
    let guard = guard(&session, FakeIdentity::returning(profile(1, "ana")));

    let meta = RouteMeta::protected("/team");
    let (decision, ()) = block_on(async {
        futures::join!(guard.check(&meta), async { session.set_token("a2") })
    });

    assert_eq!(decision, NavDecision::Allow);
    assert_eq!(guard.identity.tokens_seen(), vec!["a1".to_owned(), "a2".to_owned()]);
    assert_eq!(session.token(), "a2");
    assert_eq!(session.refresh_token(), "r1");
    assert_eq!(session.user(), Some(profile(1, "ana")));
}

#[test]
fn redirect_uses_configured_entry_route() {
    let (session, _) = session_with("", "");
    let guard = NavigationGuard::new(session, FakeIdentity::returning(profile(1, "ana")), "/login");
    let decision = block_on(guard.check(&RouteMeta::protected("/aiph")));
    assert_eq!(decision, NavDecision::Redirect("/login".to_owned()));
}

#[test]
fn guard_fetches_profile_through_api_client() {
    let transport = MockTransport::new(|_| respond(200, profile_json(5, "cy")));
    let (session, _) = session_with("a1", "r1");
    let api = ApiClient::live(transport.clone(), test_config(), session.clone());
    let guard = NavigationGuard::new(session.clone(), api, "/");

    let decision = block_on(guard.check(&RouteMeta::protected("/evaluations")));

    assert_eq!(decision, NavDecision::Allow);
    assert_eq!(transport.count_to(ME_PATH), 1);
    assert_eq!(session.user().map(|u| u.username), Some("cy".to_owned()));
}

#[test]
fn guard_expired_profile_fetch_clears_session() {
    let transport = MockTransport::new(|_| respond(401, json!({ "detail": "expired" })));
    let (session, _) = session_with("a1", "r1");
    let api = ApiClient::live(transport.clone(), test_config(), session.clone());
    let guard = NavigationGuard::new(session.clone(), api, "/");

    let decision = block_on(guard.check(&RouteMeta::protected("/evaluations")));

    assert_eq!(decision, NavDecision::Redirect("/".to_owned()));
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(session.snapshot(), crate::state::session::Session::default());
}
