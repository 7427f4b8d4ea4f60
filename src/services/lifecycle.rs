// src/services/lifecycle.rs
//! Operations that move a job and its applications forward together.
//!
//! Each one runs in a single write transaction. Status changes are guarded
//! updates, so if a concurrent writer got there first the affected-row count
//! is 0 and the operation fails with `InvalidState`; dropping the
//! transaction rolls back anything already written.
//!
//! Completion is two-phase: the requester marks the job completed (the
//! volunteer's `completed_jobs` goes up) and later rates it (the rating is
//! folded into the volunteer's running mean). `complete_job` is the one-call
//! form and runs both phases in one transaction.
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use crate::db::{self, applications as db_apps, jobs as db_jobs, users as db_users};
use crate::domain::application::{Application, ApplicationStatus};
use crate::domain::job::JobStatus;
use crate::domain::rating::{fold_rating, validate_rating};
use crate::domain::non_blank;
use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOutcome {
    pub application: Application,
    pub job_id: i64,
    /// Sibling applications moved from pending to rejected.
    pub rejected: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub job_id: i64,
    pub volunteer_id: i64,
    pub completed_jobs: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    pub job_id: i64,
    pub volunteer_id: i64,
    /// The volunteer's rating after folding this one in.
    pub volunteer_rating: f64,
}

/// Accepts one pending application, assigns its volunteer to the job and
/// rejects every other pending application for that job.
pub fn accept_application(
    conn: &mut Connection,
    application_id: i64,
    now: i64,
) -> Result<AcceptOutcome, ServerError> {
    let tx = db::write_tx(conn)?;
    let application = db_apps::get_application(&tx, application_id)?;
    if application.status != ApplicationStatus::Pending {
        return Err(ServerError::InvalidState(format!(
            "application {application_id} is {}, only pending applications can be accepted",
            application.status.as_str()
        )));
    }
    let job = db_jobs::get_job(&tx, application.job_id)?;
    if job.is_assigned() {
        return Err(ServerError::InvalidState(format!(
            "job {} already has an accepted volunteer",
            job.id
        )));
    }

    let moved = db_apps::transition(
        &tx,
        application_id,
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        now,
    )?;
    if moved != 1 {
        return Err(ServerError::InvalidState(format!(
            "application {application_id} is no longer pending"
        )));
    }
    if db_jobs::assign_volunteer(&tx, job.id, application.volunteer_id, now)? != 1 {
        return Err(ServerError::InvalidState(format!(
            "job {} already has an accepted volunteer",
            job.id
        )));
    }
    let rejected = db_apps::reject_pending_siblings(&tx, job.id, application_id, now)?;
    let application = db_apps::get_application(&tx, application_id)?;
    db::commit(tx)?;

    info!(
        application_id,
        job_id = job.id,
        volunteer_id = application.volunteer_id,
        rejected,
        "application accepted"
    );
    Ok(AcceptOutcome {
        application,
        job_id: job.id,
        rejected,
    })
}

/// Turns down a single pending application.
pub fn reject_application(
    conn: &mut Connection,
    application_id: i64,
    now: i64,
) -> Result<Application, ServerError> {
    let tx = db::write_tx(conn)?;
    let application = db_apps::get_application(&tx, application_id)?;
    let moved = db_apps::transition(
        &tx,
        application_id,
        ApplicationStatus::Pending,
        ApplicationStatus::Rejected,
        now,
    )?;
    if moved != 1 {
        return Err(ServerError::InvalidState(format!(
            "application {application_id} is {}, only pending applications can be rejected",
            application.status.as_str()
        )));
    }
    let application = db_apps::get_application(&tx, application_id)?;
    db::commit(tx)?;

    info!(application_id, job_id = application.job_id, "application rejected");
    Ok(application)
}

/// First completion phase. `volunteer_id`, when given, must name the
/// accepted volunteer.
pub fn complete_job_by_requester(
    conn: &mut Connection,
    job_id: i64,
    volunteer_id: Option<i64>,
    now: i64,
) -> Result<CompletionOutcome, ServerError> {
    let tx = db::write_tx(conn)?;
    let outcome = mark_completed(&tx, job_id, volunteer_id, now)?;
    db::commit(tx)?;

    info!(
        job_id,
        volunteer_id = outcome.volunteer_id,
        completed_jobs = outcome.completed_jobs,
        "job completed"
    );
    Ok(outcome)
}

/// Second completion phase: the requester's rating and review.
pub fn submit_rating(
    conn: &mut Connection,
    job_id: i64,
    rating: f64,
    review: Option<String>,
    now: i64,
) -> Result<RatingOutcome, ServerError> {
    let rating = validate_rating(rating)?;
    let review = non_blank(review);

    let tx = db::write_tx(conn)?;
    let outcome = record_rating(&tx, job_id, rating, review.as_deref(), now)?;
    db::commit(tx)?;

    info!(
        job_id,
        volunteer_id = outcome.volunteer_id,
        rating,
        volunteer_rating = outcome.volunteer_rating,
        "job rated"
    );
    Ok(outcome)
}

/// One-call completion: both phases, committed together.
pub fn complete_job(
    conn: &mut Connection,
    job_id: i64,
    volunteer_id: Option<i64>,
    rating: f64,
    review: Option<String>,
    now: i64,
) -> Result<RatingOutcome, ServerError> {
    let rating = validate_rating(rating)?;
    let review = non_blank(review);

    let tx = db::write_tx(conn)?;
    mark_completed(&tx, job_id, volunteer_id, now)?;
    let outcome = record_rating(&tx, job_id, rating, review.as_deref(), now)?;
    db::commit(tx)?;

    info!(
        job_id,
        volunteer_id = outcome.volunteer_id,
        rating,
        volunteer_rating = outcome.volunteer_rating,
        "job completed and rated"
    );
    Ok(outcome)
}

fn mark_completed(
    conn: &Connection,
    job_id: i64,
    expected_volunteer: Option<i64>,
    now: i64,
) -> Result<CompletionOutcome, ServerError> {
    let job = db_jobs::get_job(conn, job_id)?;
    let Some(volunteer_id) = job.accepted_volunteer_id else {
        return Err(ServerError::InvalidState(format!(
            "job {job_id} has no accepted volunteer"
        )));
    };
    if job.status == JobStatus::Completed {
        return Err(ServerError::InvalidState(format!("job {job_id} is already completed")));
    }
    if let Some(expected) = expected_volunteer {
        if expected != volunteer_id {
            return Err(ServerError::InvalidState(format!(
                "volunteer {expected} is not assigned to job {job_id}"
            )));
        }
    }

    if db_jobs::mark_completed(conn, job_id, now)? != 1 {
        return Err(ServerError::InvalidState(format!("job {job_id} changed concurrently")));
    }
    if db_apps::complete_accepted(conn, job_id, volunteer_id, now)? != 1 {
        return Err(ServerError::InvalidState(format!(
            "job {job_id} has no accepted application for volunteer {volunteer_id}"
        )));
    }
    let completed_jobs = db_users::record_completion(conn, volunteer_id)?;

    Ok(CompletionOutcome {
        job_id,
        volunteer_id,
        completed_jobs,
    })
}

fn record_rating(
    conn: &Connection,
    job_id: i64,
    rating: f64,
    review: Option<&str>,
    now: i64,
) -> Result<RatingOutcome, ServerError> {
    let job = db_jobs::get_job(conn, job_id)?;
    let Some(volunteer_id) = job.accepted_volunteer_id else {
        return Err(ServerError::InvalidState(format!(
            "job {job_id} has no accepted volunteer"
        )));
    };
    if job.status != JobStatus::Completed {
        return Err(ServerError::InvalidState(format!(
            "job {job_id} must be completed before it can be rated"
        )));
    }
    if job.requester_rating.is_some() {
        return Err(ServerError::InvalidState(format!("job {job_id} has already been rated")));
    }

    if db_jobs::record_rating(conn, job_id, rating, review, now)? != 1 {
        return Err(ServerError::InvalidState(format!("job {job_id} changed concurrently")));
    }
    let (old, completed_jobs) = db_users::volunteer_stats(conn, volunteer_id)?;
    let volunteer_rating = fold_rating(old, completed_jobs, rating);
    db_users::set_rating(conn, volunteer_id, volunteer_rating)?;

    Ok(RatingOutcome {
        job_id,
        volunteer_id,
        volunteer_rating,
    })
}
