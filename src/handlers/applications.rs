// src/handlers/applications.rs
use astra::Request;
use serde::{Deserialize, Serialize};

use crate::domain::application::{ApplicationStatus, ApplicationWithVolunteer};
use crate::errors::ServerError;
use crate::handlers::now;
use crate::requests::{query_params, read_json};
use crate::responses::{json_response, no_content, ResultResp};
use crate::services::{applications, lifecycle};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolunteerRequest {
    volunteer_id: i64,
}

#[derive(Serialize)]
struct Created {
    id: i64,
}

#[derive(Serialize)]
struct ApplicationList<'a> {
    applications: &'a [ApplicationWithVolunteer],
}

pub fn apply(job_id: i64, req: Request, state: &AppState) -> ResultResp {
    let body: VolunteerRequest = read_json(req)?;
    let application = state
        .db
        .with_conn(|conn| applications::apply(conn, job_id, body.volunteer_id, now()))?;
    json_response(201, &Created { id: application.id })
}

pub fn list_for_job(job_id: i64, req: &Request, state: &AppState) -> ResultResp {
    let params = query_params(req);
    let status = match params.get("status").map(|s| s.trim()) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<ApplicationStatus>().map_err(|e| {
            ServerError::BadRequest(e.to_string())
        })?),
    };

    let items = state
        .db
        .with_conn(|conn| applications::list_for_job(conn, job_id, status))?;
    json_response(200, &ApplicationList { applications: &items })
}

pub fn cancel(job_id: i64, req: Request, state: &AppState) -> ResultResp {
    let body: VolunteerRequest = read_json(req)?;
    state
        .db
        .with_conn(|conn| applications::cancel(conn, job_id, body.volunteer_id))?;
    no_content()
}

pub fn accept(application_id: i64, state: &AppState) -> ResultResp {
    state
        .db
        .with_conn(|conn| lifecycle::accept_application(conn, application_id, now()))?;
    no_content()
}

pub fn reject(application_id: i64, state: &AppState) -> ResultResp {
    state
        .db
        .with_conn(|conn| lifecycle::reject_application(conn, application_id, now()))?;
    no_content()
}
