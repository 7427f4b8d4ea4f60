// src/handlers/jobs.rs
use std::collections::HashMap;

use astra::Request;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::geo::validate_coordinates;
use crate::domain::job::{JobUpdate, JobView, NewJob};
use crate::errors::ServerError;
use crate::handlers::now;
use crate::requests::{query_params, query_value, read_json, read_json_or_default};
use crate::responses::{json_response, no_content, ResultResp};
use crate::services::{jobs, lifecycle};
use crate::state::AppState;

#[derive(Serialize)]
pub(crate) struct JobList<'a> {
    pub jobs: &'a [JobView],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    volunteer_id: Option<i64>,
    rating: Option<f64>,
    #[serde(alias = "comment")]
    review: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RatingRequest {
    rating: f64,
    #[serde(default, alias = "comment")]
    review: Option<String>,
}

/// `lat` and `lon` must come together.
fn origin(params: &HashMap<String, String>) -> Result<Option<(f64, f64)>, ServerError> {
    match (query_value(params, "lat")?, query_value(params, "lon")?) {
        (Some(lat), Some(lon)) => {
            validate_coordinates(lat, lon)?;
            Ok(Some((lat, lon)))
        }
        (None, None) => Ok(None),
        _ => Err(ServerError::BadRequest("lat and lon must be given together".into())),
    }
}

pub fn list_jobs(req: &Request, state: &AppState) -> ResultResp {
    let params = query_params(req);
    let filter = jobs::JobFilter {
        requester_id: query_value(&params, "requesterId")?,
        volunteer_id: query_value(&params, "volunteerId")?,
        origin: origin(&params)?,
    };
    debug!(?filter, "listing jobs");

    let views = state.db.with_conn(|conn| jobs::list_jobs(conn, &filter))?;
    json_response(200, &JobList { jobs: &views })
}

pub fn get_job(id: i64, req: &Request, state: &AppState) -> ResultResp {
    let params = query_params(req);
    let volunteer_id = query_value(&params, "volunteerId")?;
    let origin = origin(&params)?;

    let view = state
        .db
        .with_conn(|conn| jobs::get_job(conn, id, volunteer_id, origin))?;
    json_response(200, &view)
}

pub fn create_job(req: Request, state: &AppState) -> ResultResp {
    let job: NewJob = read_json(req)?;
    let view = state.db.with_conn(|conn| jobs::create_job(conn, job, now()))?;
    json_response(201, &view)
}

pub fn update_job(id: i64, req: Request, state: &AppState) -> ResultResp {
    let update: JobUpdate = read_json(req)?;
    let view = state
        .db
        .with_conn(|conn| jobs::update_job(conn, id, update, now()))?;
    json_response(200, &view)
}

pub fn delete_job(id: i64, state: &AppState) -> ResultResp {
    state.db.with_conn(|conn| jobs::delete_job(conn, id))?;
    no_content()
}

/// Without a rating this is the requester marking the job done; with one
/// it also records the rating in the same transaction.
pub fn complete_job(id: i64, req: Request, state: &AppState) -> ResultResp {
    let body: CompleteRequest = read_json_or_default(req)?;
    state.db.with_conn(|conn| match body.rating {
        None => lifecycle::complete_job_by_requester(conn, id, body.volunteer_id, now()).map(drop),
        Some(rating) => {
            lifecycle::complete_job(conn, id, body.volunteer_id, rating, body.review, now())
                .map(drop)
        }
    })?;
    no_content()
}

pub fn rate_job(id: i64, req: Request, state: &AppState) -> ResultResp {
    let body: RatingRequest = read_json(req)?;
    state
        .db
        .with_conn(|conn| lifecycle::submit_rating(conn, id, body.rating, body.review, now()))?;
    no_content()
}
