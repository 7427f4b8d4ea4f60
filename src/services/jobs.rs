// src/services/jobs.rs
use rusqlite::Connection;
use tracing::info;

use crate::db::{self, applications as db_apps, jobs as db_jobs, users as db_users};
use crate::domain::job::{JobStatus, JobUpdate, JobView, NewJob};
use crate::domain::user::Role;
use crate::errors::ServerError;

#[derive(Debug, Clone, Copy, Default)]
pub struct JobFilter {
    pub requester_id: Option<i64>,
    /// Annotates each job with this volunteer's application status.
    pub volunteer_id: Option<i64>,
    /// When set, `distanceKm` is measured from this (lat, lon).
    pub origin: Option<(f64, f64)>,
}

pub fn create_job(conn: &Connection, job: NewJob, now: i64) -> Result<JobView, ServerError> {
    let job = job.normalized()?;
    let requester = db_users::find_user(conn, job.requester_id)?
        .ok_or_else(|| ServerError::NotFound(format!("requester {}", job.requester_id)))?;
    if requester.role != Role::Requester {
        return Err(ServerError::BadRequest("only requesters can post jobs".into()));
    }

    let id = db_jobs::insert_job(conn, &job, &requester.full_name(), &requester.phone, now)?;
    info!(job_id = id, requester_id = requester.id, "job created");
    get_job(conn, id, None, None)
}

pub fn get_job(
    conn: &Connection,
    id: i64,
    volunteer_id: Option<i64>,
    origin: Option<(f64, f64)>,
) -> Result<JobView, ServerError> {
    let query = db_jobs::JobQuery {
        job_id: Some(id),
        volunteer_id,
        ..Default::default()
    };
    db_jobs::list_job_views(conn, &query)?
        .into_iter()
        .next()
        .map(|view| view.with_distance_from(origin))
        .ok_or_else(|| ServerError::NotFound(format!("job {id}")))
}

/// Newest first. Filtering by an unknown requester is `NotFound`.
pub fn list_jobs(conn: &Connection, filter: &JobFilter) -> Result<Vec<JobView>, ServerError> {
    if let Some(requester_id) = filter.requester_id {
        db_users::get_user(conn, requester_id)?;
    }
    let query = db_jobs::JobQuery {
        job_id: None,
        requester_id: filter.requester_id,
        volunteer_id: filter.volunteer_id,
    };
    Ok(db_jobs::list_job_views(conn, &query)?
        .into_iter()
        .map(|view| view.with_distance_from(filter.origin))
        .collect())
}

pub fn update_job(
    conn: &mut Connection,
    id: i64,
    update: JobUpdate,
    now: i64,
) -> Result<JobView, ServerError> {
    let tx = db::write_tx(conn)?;
    let current = db_jobs::get_job(&tx, id)?;
    if current.status != JobStatus::Open || current.is_assigned() {
        return Err(ServerError::InvalidState(format!(
            "job {id} is {} and can no longer be edited",
            current.status.as_str()
        )));
    }

    let update = update.normalized(&current)?;
    if db_jobs::update_job(&tx, id, &update, now)? != 1 {
        return Err(ServerError::InvalidState(format!("job {id} changed concurrently")));
    }
    db::commit(tx)?;

    get_job(conn, id, None, None)
}

/// Deletes an unassigned job together with all of its applications.
/// Returns how many applications were removed.
pub fn delete_job(conn: &mut Connection, id: i64) -> Result<usize, ServerError> {
    let tx = db::write_tx(conn)?;
    let job = db_jobs::get_job(&tx, id)?;
    if job.is_assigned() {
        return Err(ServerError::InvalidState(format!(
            "job {id} already has an accepted volunteer"
        )));
    }

    let removed = db_apps::delete_for_job(&tx, id)?;
    db_jobs::delete_job(&tx, id)?;
    db::commit(tx)?;

    info!(job_id = id, applications = removed, "job deleted");
    Ok(removed)
}
