use super::*;

#[test]
fn user_profile_decodes_minimal_payload() {
    let profile: UserProfile =
        serde_json::from_str(r#"{"id":7,"email":"ana@example.test","username":"ana","extra":true}"#).unwrap();
    assert_eq!(profile.id, 7);
    assert_eq!(profile.first_name, None);
    assert_eq!(profile.display_name(), "ana");
}

#[test]
fn user_profile_decodes_empty_object() {
    let profile: UserProfile = serde_json::from_str("{}").unwrap();
    assert_eq!(profile.id, 0);
    assert_eq!(profile.username, "");
    assert_eq!(profile.display_name(), "");
}

#[test]
fn user_profile_rejects_non_object() {
    assert!(serde_json::from_str::<UserProfile>("null").is_err());
}

#[test]
fn display_name_prefers_full_name() {
    let profile: UserProfile = serde_json::from_value(serde_json::json!({
        "id": 1,
        "email": "ana@example.test",
        "username": "ana",
        "first_name": "Ana",
        "last_name": "Lima",
        "active": true,
        "team_member_id": 3,
        "created_at": "2024-05-01T10:00:00"
    }))
    .unwrap();
    assert_eq!(profile.display_name(), "Ana Lima");
    assert_eq!(profile.team_member_id, Some(3));
}

#[test]
fn token_pair_defaults_token_type() {
    let pair: TokenPair = serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
    assert_eq!(pair.token_type, "bearer");
}

#[test]
fn refresh_request_serializes_refresh_token_field() {
    let body = serde_json::to_value(RefreshRequest { refresh_token: "r1" }).unwrap();
    assert_eq!(body, serde_json::json!({ "refresh_token": "r1" }));
}
