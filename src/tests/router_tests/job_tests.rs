use crate::tests::utils::{apply, create_job, init_test_state, register, send};
use serde_json::json;

#[test]
fn created_job_is_open_with_contact_snapshot() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let job_id = create_job(&state, requester, "Market trip");

    let (status, job) = send(&state, "GET", &format!("/jobs/{job_id}"), None);
    assert_eq!(status, 200);
    assert_eq!(job["status"], "open");
    assert!(job.get("acceptedVolunteerId").is_none());
    assert_eq!(job["contactName"], "First222 Last");
    assert_eq!(job["contactNumber"], "0800000000");
    assert_eq!(job["requesterDisabilityType"], "visual");
    assert_eq!(job["distanceKm"], 0.0);
}

#[test]
fn volunteer_cannot_post_job() {
    let state = init_test_state();
    let volunteer = register(&state, "volunteer", "111");
    let (status, _) = send(
        &state,
        "POST",
        "/jobs",
        Some(json!({
            "requesterId": volunteer,
            "title": "x",
            "location": "y",
            "meetingPoint": "z",
            "description": "d",
            "latitude": 0.0,
            "longitude": 0.0,
        })),
    );
    assert_eq!(status, 400);
}

#[test]
fn list_filters_and_annotates() {
    let state = init_test_state();
    let r1 = register(&state, "requester", "201");
    let r2 = register(&state, "requester", "202");
    let volunteer = register(&state, "volunteer", "111");
    let first = create_job(&state, r1, "First");
    create_job(&state, r2, "Second");
    apply(&state, first, volunteer);

    let (status, body) = send(&state, "GET", "/jobs", None);
    assert_eq!(status, 200);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 2);

    let (_, body) = send(&state, "GET", &format!("/api/jobs?requesterId={r1}"), None);
    let jobs = body["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["title"], "First");

    let (_, body) = send(&state, "GET", &format!("/jobs?volunteerId={volunteer}"), None);
    let jobs = body["jobs"].as_array().unwrap();
    let first_view = jobs.iter().find(|j| j["id"] == first).unwrap();
    assert_eq!(first_view["applicationStatus"], "pending");
    assert!(jobs.iter().any(|j| j.get("applicationStatus").is_none()));

    let (_, body) = send(&state, "GET", &format!("/requesters/{r2}/jobs"), None);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 1);
}

#[test]
fn list_measures_distance_from_origin() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    create_job(&state, requester, "Nearby");

    let (status, body) = send(&state, "GET", "/jobs?lat=13.7999&lon=100.5502", None);
    assert_eq!(status, 200);
    assert_eq!(body["jobs"][0]["distanceKm"], 0.0);

    let (_, body) = send(&state, "GET", "/jobs?lat=13.7563&lon=100.5018", None);
    let km = body["jobs"][0]["distanceKm"].as_f64().unwrap();
    assert!(km > 6.0 && km < 8.0, "got {km}");

    let (status, _) = send(&state, "GET", "/jobs?lat=13.7", None);
    assert_eq!(status, 400);
}

#[test]
fn update_allowed_only_while_open() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let job_id = create_job(&state, requester, "Original");

    let (status, job) = send(
        &state,
        "PUT",
        &format!("/jobs/{job_id}"),
        Some(json!({ "title": "Edited", "requirements": ["patience"] })),
    );
    assert_eq!(status, 200);
    assert_eq!(job["title"], "Edited");
    assert_eq!(job["requirements"], json!(["patience"]));

    let app = apply(&state, job_id, volunteer);
    let (status, _) = send(&state, "POST", &format!("/applications/{app}/accept"), None);
    assert_eq!(status, 204);

    let (status, _) = send(
        &state,
        "PUT",
        &format!("/jobs/{job_id}"),
        Some(json!({ "title": "Too late" })),
    );
    assert_eq!(status, 409);
    let (status, _) = send(&state, "PUT", "/jobs/999", Some(json!({ "title": "x" })));
    assert_eq!(status, 404);
}

#[test]
fn delete_cascades_while_unassigned() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let v1 = register(&state, "volunteer", "111");
    let v2 = register(&state, "volunteer", "112");
    let job_id = create_job(&state, requester, "Delete me");
    apply(&state, job_id, v1);
    apply(&state, job_id, v2);

    let (status, _) = send(&state, "DELETE", &format!("/jobs/{job_id}"), None);
    assert_eq!(status, 204);

    let (status, _) = send(&state, "GET", &format!("/jobs/{job_id}"), None);
    assert_eq!(status, 404);
    let (status, _) = send(&state, "GET", &format!("/jobs/{job_id}/applications"), None);
    assert_eq!(status, 404);
    let (_, body) = send(&state, "GET", &format!("/volunteers/{v1}/applications"), None);
    assert_eq!(body["items"], json!([]));
}

#[test]
fn assigned_job_cannot_be_deleted() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let job_id = create_job(&state, requester, "Keep me");
    let app = apply(&state, job_id, volunteer);
    send(&state, "POST", &format!("/applications/{app}/accept"), None);

    let (status, body) = send(&state, "DELETE", &format!("/jobs/{job_id}"), None);
    assert_eq!(status, 409);
    assert!(body["error"].as_str().unwrap().contains("accepted volunteer"));

    let (_, body) = send(&state, "GET", &format!("/jobs/{job_id}/applications"), None);
    assert_eq!(body["applications"].as_array().unwrap().len(), 1);
}

#[test]
fn apply_alias_under_api_prefix() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let volunteer = register(&state, "volunteer", "111");
    let job_id = create_job(&state, requester, "Temple visit");

    let (status, body) = send(
        &state,
        "POST",
        &format!("/api/jobs/{job_id}/apply"),
        Some(json!({ "volunteerId": volunteer })),
    );
    assert_eq!(status, 201, "{body}");
    assert!(body["id"].as_i64().is_some());

    let (status, apps) = send(&state, "GET", &format!("/api/jobs/{job_id}/applications"), None);
    assert_eq!(status, 200);
    assert_eq!(apps["applications"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &state,
        "POST",
        &format!("/api/jobs/{job_id}/apply"),
        Some(json!({ "volunteerId": volunteer })),
    );
    assert_eq!(status, 409);
}
