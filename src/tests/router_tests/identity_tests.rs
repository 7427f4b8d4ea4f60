use crate::tests::utils::{init_test_state, register, send, send_with_token};
use crate::services::identity::{DEMO_NATIONAL_ID, DEMO_PASSWORD};
use serde_json::json;

#[test]
fn register_returns_profile_without_password() {
    let state = init_test_state();
    let (status, user) = send(
        &state,
        "POST",
        "/register",
        Some(json!({
            "role": "volunteer",
            "firstName": "Somchai",
            "lastName": "Jaidee",
            "nationalId": "111",
            "phone": "0811111111",
            "password": "secret",
            "skills": ["first_aid", "first_aid", "driving"],
        })),
    );

    assert_eq!(status, 201);
    assert_eq!(user["role"], "volunteer");
    assert_eq!(user["rating"], 0.0);
    assert_eq!(user["completedJobs"], 0);
    assert_eq!(user["skills"], json!(["first_aid", "driving"]));
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
}

#[test]
fn duplicate_national_id_is_conflict() {
    let state = init_test_state();
    register(&state, "volunteer", "111");

    let (status, body) = send(
        &state,
        "POST",
        "/api/auth/register",
        Some(json!({
            "role": "requester",
            "firstName": "Other",
            "lastName": "Person",
            "nationalId": "111",
            "phone": "0822222222",
            "password": "pw",
        })),
    );
    assert_eq!(status, 409);
    assert!(body["error"].as_str().unwrap().contains("111"));
}

#[test]
fn register_with_missing_field_is_bad_request() {
    let state = init_test_state();
    let (status, _) = send(
        &state,
        "POST",
        "/register",
        Some(json!({ "role": "volunteer", "firstName": "A" })),
    );
    assert_eq!(status, 400);

    let (status, _) = send(&state, "POST", "/register", None);
    assert_eq!(status, 400);
}

#[test]
fn login_me_logout_flow() {
    let state = init_test_state();
    let id = register(&state, "requester", "222");

    let (status, body) = send(
        &state,
        "POST",
        "/login",
        Some(json!({ "nationalId": "222", "password": "wrong" })),
    );
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send(
        &state,
        "POST",
        "/api/login",
        Some(json!({ "nationalId": "222", "password": "pw-123" })),
    );
    assert_eq!(status, 200);
    assert_eq!(body["user"]["id"], id);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send_with_token(&state, "GET", "/me", &token);
    assert_eq!(status, 200);
    assert_eq!(me["nationalId"], "222");

    let (status, _) = send_with_token(&state, "POST", "/logout", &token);
    assert_eq!(status, 204);
    let (status, _) = send_with_token(&state, "GET", "/me", &token);
    assert_eq!(status, 401);

    let (status, _) = send(&state, "GET", "/me", None);
    assert_eq!(status, 401);
}

#[test]
fn profile_update_respects_role() {
    let state = init_test_state();
    let id = register(&state, "requester", "222");

    let (status, user) = send(
        &state,
        "PUT",
        &format!("/users/{id}"),
        Some(json!({
            "phone": "0899999999",
            "skills": ["ignored"],
            "additionalNeeds": ["ramp", "ramp"],
        })),
    );
    assert_eq!(status, 200);
    assert_eq!(user["phone"], "0899999999");
    assert_eq!(user["skills"], json!([]));
    assert_eq!(user["additionalNeeds"], json!(["ramp"]));

    let (status, fetched) = send(&state, "GET", &format!("/users/{id}"), None);
    assert_eq!(status, 200);
    assert_eq!(fetched["phone"], "0899999999");
}

#[test]
fn unknown_user_and_route_are_not_found() {
    let state = init_test_state();
    let (status, _) = send(&state, "GET", "/users/999", None);
    assert_eq!(status, 404);
    let (status, _) = send(&state, "GET", "/volunteers/999/reviews", None);
    assert_eq!(status, 404);
    let (status, _) = send(&state, "GET", "/nowhere", None);
    assert_eq!(status, 404);
    let (status, _) = send(&state, "GET", "/users/abc", None);
    assert_eq!(status, 400);
}

#[test]
fn seeded_demo_volunteer_can_log_in() {
    let state = init_test_state();
    let seeded = state
        .db
        .with_conn(|conn| state.identity.seed_demo_volunteer(conn, 1))
        .unwrap();
    assert!(seeded.is_some());

    let (status, body) = send(
        &state,
        "POST",
        "/api/auth/login",
        Some(json!({ "nationalId": DEMO_NATIONAL_ID, "password": DEMO_PASSWORD })),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["user"]["firstName"], "Somchai");
    assert_eq!(body["user"]["completedJobs"], 12);
}
