use crate::tests::utils::{apply, create_job, init_test_state, register, send};
use std::sync::Barrier;
use std::thread;

#[test]
fn racing_accepts_have_exactly_one_winner() {
    let state = init_test_state();
    let requester = register(&state, "requester", "222");
    let v1 = register(&state, "volunteer", "111");
    let v2 = register(&state, "volunteer", "112");
    let job_id = create_job(&state, requester, "Contested");
    let a1 = apply(&state, job_id, v1);
    let a2 = apply(&state, job_id, v2);

    let barrier = Barrier::new(2);
    let statuses: Vec<u16> = thread::scope(|s| {
        let handles: Vec<_> = [a1, a2]
            .into_iter()
            .map(|app| {
                let state = &state;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    send(state, "POST", &format!("/applications/{app}/accept"), None).0
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut sorted = statuses.clone();
    sorted.sort();
    assert_eq!(sorted, vec![204, 409], "got {statuses:?}");

    let (_, body) = send(&state, "GET", &format!("/jobs/{job_id}/applications"), None);
    let apps = body["applications"].as_array().unwrap();
    let accepted: Vec<_> = apps.iter().filter(|a| a["status"] == "accepted").collect();
    assert_eq!(accepted.len(), 1);
    assert!(apps.iter().all(|a| a["status"] != "pending"));

    let (_, job) = send(&state, "GET", &format!("/jobs/{job_id}"), None);
    assert_eq!(job["acceptedVolunteerId"], accepted[0]["volunteerId"]);
}
