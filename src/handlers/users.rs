// src/handlers/users.rs
use astra::Request;
use serde::Serialize;

use crate::domain::application::VolunteerApplication;
use crate::domain::user::ProfileUpdate;
use crate::handlers::jobs::JobList;
use crate::requests::read_json;
use crate::responses::{json_response, ResultResp};
use crate::services::{applications, jobs};
use crate::state::AppState;

#[derive(Serialize)]
struct ApplicationItems<'a> {
    items: &'a [VolunteerApplication],
}

pub fn get_user(id: i64, state: &AppState) -> ResultResp {
    let user = state
        .db
        .with_conn(|conn| state.identity.get_profile(conn, id))?;
    json_response(200, &user)
}

pub fn update_user(id: i64, req: Request, state: &AppState) -> ResultResp {
    let update: ProfileUpdate = read_json(req)?;
    let user = state
        .db
        .with_conn(|conn| state.identity.update_profile(conn, id, update))?;
    json_response(200, &user)
}

pub fn list_reviews(volunteer_id: i64, state: &AppState) -> ResultResp {
    let reviews = state
        .db
        .with_conn(|conn| state.identity.list_reviews(conn, volunteer_id))?;
    json_response(200, &reviews)
}

pub fn list_volunteer_applications(volunteer_id: i64, state: &AppState) -> ResultResp {
    let items = state
        .db
        .with_conn(|conn| applications::list_for_volunteer(conn, volunteer_id))?;
    json_response(200, &ApplicationItems { items: &items })
}

pub fn list_requester_jobs(requester_id: i64, state: &AppState) -> ResultResp {
    let filter = jobs::JobFilter {
        requester_id: Some(requester_id),
        ..Default::default()
    };
    let views = state.db.with_conn(|conn| jobs::list_jobs(conn, &filter))?;
    json_response(200, &JobList { jobs: &views })
}
