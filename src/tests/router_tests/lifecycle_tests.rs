use crate::tests::utils::{apply, create_job, init_test_state, register, send};
use serde_json::{json, Value};

fn application_statuses(state: &crate::state::AppState, job_id: i64) -> Vec<(i64, String)> {
    let (status, body) = send(state, "GET", &format!("/jobs/{job_id}/applications"), None);
    assert_eq!(status, 200);
    body["applications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| (a["id"].as_i64().unwrap(), a["status"].as_str().unwrap().to_string()))
        .collect()
}

fn get(state: &crate::state::AppState, uri: &str) -> Value {
    let (status, body) = send(state, "GET", uri, None);
    assert_eq!(status, 200, "GET {uri}: {body}");
    body
}

#[test]
fn accepting_single_application_starts_job() {
    let state = init_test_state();
    let volunteer = register(&state, "volunteer", "111");
    let requester = register(&state, "requester", "222");
    let job_id = create_job(&state, requester, "Hospital visit");
    let app = apply(&state, job_id, volunteer);

    let (status, _) = send(&state, "POST", &format!("/applications/{app}/accept"), None);
    assert_eq!(status, 204);

    let job = get(&state, &format!("/jobs/{job_id}"));
    assert_eq!(job["status"], "in_progress");
    assert_eq!(job["acceptedVolunteerId"], volunteer);
    assert_eq!(job["acceptedVolunteerName"], "First111 Last");
    assert_eq!(application_statuses(&state, job_id), vec![(app, "accepted".to_string())]);
}

#[test]
fn accepting_one_rejects_siblings() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let v1 = register(&state, "volunteer", "111");
    let v2 = register(&state, "volunteer", "112");
    let job_id = create_job(&state, requester, "Shopping");
    let a1 = apply(&state, job_id, v1);
    let a2 = apply(&state, job_id, v2);

    let (status, _) = send(&state, "POST", &format!("/api/applications/{a1}/accept"), None);
    assert_eq!(status, 204);
    assert_eq!(
        application_statuses(&state, job_id),
        vec![(a1, "accepted".to_string()), (a2, "rejected".to_string())]
    );
    assert_eq!(get(&state, &format!("/jobs/{job_id}"))["acceptedVolunteerId"], v1);

    let (_, body) = send(
        &state,
        "GET",
        &format!("/jobs/{job_id}/applications?status=rejected"),
        None,
    );
    let rejected = body["applications"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["volunteer"]["id"], v2);

    let (status, _) = send(&state, "POST", &format!("/applications/{a2}/accept"), None);
    assert_eq!(status, 409);
    let (status, _) = send(&state, "POST", &format!("/applications/{a1}/accept"), None);
    assert_eq!(status, 409);
}

#[test]
fn duplicate_and_late_applications_are_refused() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let v1 = register(&state, "volunteer", "111");
    let v2 = register(&state, "volunteer", "112");
    let job_id = create_job(&state, requester, "Transport");
    let a1 = apply(&state, job_id, v1);

    let (status, body) = send(
        &state,
        "POST",
        &format!("/jobs/{job_id}/applications"),
        Some(json!({ "volunteerId": v1 })),
    );
    assert_eq!(status, 409);
    assert!(body["error"].as_str().unwrap().contains("already applied"));

    send(&state, "POST", &format!("/applications/{a1}/accept"), None);
    let (status, _) = send(
        &state,
        "POST",
        &format!("/jobs/{job_id}/applications"),
        Some(json!({ "volunteerId": v2 })),
    );
    assert_eq!(status, 409);

    let (status, _) = send(
        &state,
        "POST",
        "/jobs/999/applications",
        Some(json!({ "volunteerId": v2 })),
    );
    assert_eq!(status, 404);
}

#[test]
fn cancel_only_while_pending() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let job_id = create_job(&state, requester, "Reading");
    apply(&state, job_id, volunteer);

    let cancel = |state: &crate::state::AppState| {
        send(
            state,
            "POST",
            &format!("/jobs/{job_id}/cancel"),
            Some(json!({ "volunteerId": volunteer })),
        )
        .0
    };

    assert_eq!(cancel(&state), 204);
    assert!(application_statuses(&state, job_id).is_empty());
    assert_eq!(cancel(&state), 404);

    let app = apply(&state, job_id, volunteer);
    send(&state, "POST", &format!("/applications/{app}/accept"), None);
    assert_eq!(cancel(&state), 409);
    assert_eq!(application_statuses(&state, job_id), vec![(app, "accepted".to_string())]);
}

#[test]
fn requester_can_reject_one_application() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let job_id = create_job(&state, requester, "Cooking");
    let app = apply(&state, job_id, volunteer);

    let (status, _) = send(&state, "POST", &format!("/applications/{app}/reject"), None);
    assert_eq!(status, 204);
    assert_eq!(application_statuses(&state, job_id), vec![(app, "rejected".to_string())]);
    assert_eq!(get(&state, &format!("/jobs/{job_id}"))["status"], "open");

    let (status, _) = send(&state, "POST", &format!("/applications/{app}/reject"), None);
    assert_eq!(status, 409);
}

#[test]
fn two_phase_completion_and_rating() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let job_id = create_job(&state, requester, "Hospital visit");
    let app = apply(&state, job_id, volunteer);

    let (status, _) = send(
        &state,
        "POST",
        &format!("/jobs/{job_id}/rating"),
        Some(json!({ "rating": 5, "review": "early" })),
    );
    assert_eq!(status, 409);

    let (status, _) = send(&state, "POST", &format!("/jobs/{job_id}/complete"), None);
    assert_eq!(status, 409);

    send(&state, "POST", &format!("/applications/{app}/accept"), None);
    let (status, _) = send(
        &state,
        "POST",
        &format!("/jobs/{job_id}/complete"),
        Some(json!({ "volunteerId": volunteer })),
    );
    assert_eq!(status, 204);

    let job = get(&state, &format!("/jobs/{job_id}"));
    assert_eq!(job["status"], "completed");
    assert!(job.get("requesterRating").is_none());
    assert_eq!(application_statuses(&state, job_id), vec![(app, "completed".to_string())]);
    let profile = get(&state, &format!("/users/{volunteer}"));
    assert_eq!(profile["completedJobs"], 1);
    assert_eq!(profile["rating"], 0.0);

    let (status, _) = send(
        &state,
        "POST",
        &format!("/jobs/{job_id}/rating"),
        Some(json!({ "rating": 5, "review": "great" })),
    );
    assert_eq!(status, 204);

    let job = get(&state, &format!("/jobs/{job_id}"));
    assert_eq!(job["requesterRating"], 5.0);
    assert_eq!(job["requesterReview"], "great");
    assert_eq!(get(&state, &format!("/users/{volunteer}"))["rating"], 5.0);

    let reviews = get(&state, &format!("/volunteers/{volunteer}/reviews"));
    assert_eq!(reviews[0]["jobTitle"], "Hospital visit");
    assert_eq!(reviews[0]["rating"], 5.0);
    assert_eq!(reviews[0]["review"], "great");
    assert_eq!(reviews[0]["requesterName"], "First222 Last");

    let (status, _) = send(
        &state,
        "POST",
        &format!("/jobs/{job_id}/rating"),
        Some(json!({ "rating": 1, "review": "again" })),
    );
    assert_eq!(status, 409);
    let (status, _) = send(&state, "POST", &format!("/jobs/{job_id}/complete"), None);
    assert_eq!(status, 409);
}

#[test]
fn out_of_range_rating_is_rejected() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let job_id = create_job(&state, requester, "Walk");
    let app = apply(&state, job_id, volunteer);
    send(&state, "POST", &format!("/applications/{app}/accept"), None);
    send(&state, "POST", &format!("/jobs/{job_id}/complete"), None);

    let (status, _) = send(
        &state,
        "POST",
        &format!("/jobs/{job_id}/rating"),
        Some(json!({ "rating": 6 })),
    );
    assert_eq!(status, 400);
    assert!(get(&state, &format!("/jobs/{job_id}"))
        .get("requesterRating")
        .is_none());
}

#[test]
fn one_call_completion_with_rating() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let other = register(&state, "volunteer", "112");

    let mut ratings = Vec::new();
    for (i, rating) in [4.0, 2.0].into_iter().enumerate() {
        let job_id = create_job(&state, requester, &format!("Job {i}"));
        let app = apply(&state, job_id, volunteer);
        send(&state, "POST", &format!("/applications/{app}/accept"), None);

        let (status, _) = send(
            &state,
            "POST",
            &format!("/jobs/{job_id}/complete"),
            Some(json!({ "volunteerId": other, "rating": rating })),
        );
        assert_eq!(status, 409);

        let (status, _) = send(
            &state,
            "POST",
            &format!("/jobs/{job_id}/complete"),
            Some(json!({ "volunteerId": volunteer, "rating": rating, "comment": "thanks" })),
        );
        assert_eq!(status, 204);
        ratings.push(rating);
    }

    let profile = get(&state, &format!("/users/{volunteer}"));
    assert_eq!(profile["completedJobs"], 2);
    assert_eq!(profile["rating"], 3.0);
    let reviews = get(&state, &format!("/volunteers/{volunteer}/reviews"));
    assert_eq!(reviews.as_array().unwrap().len(), ratings.len());
}

#[test]
fn volunteer_sees_own_applications_with_jobs() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let first = create_job(&state, requester, "First");
    let second = create_job(&state, requester, "Second");
    apply(&state, first, volunteer);
    apply(&state, second, volunteer);

    let body = get(&state, &format!("/volunteers/{volunteer}/applications"));
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|i| i["application"]["status"] == "pending" && i["job"]["title"].is_string()));

    let (status, _) = send(&state, "GET", "/volunteers/999/applications", None);
    assert_eq!(status, 404);
}
