// src/services/applications.rs
use rusqlite::Connection;
use tracing::info;

use crate::db::{self, applications as db_apps, jobs as db_jobs, users as db_users};
use crate::domain::application::{
    Application, ApplicationStatus, ApplicationWithVolunteer, VolunteerApplication,
};
use crate::domain::job::JobStatus;
use crate::domain::user::Role;
use crate::errors::ServerError;

/// Submits a pending application. The job must be open and unassigned.
pub fn apply(
    conn: &mut Connection,
    job_id: i64,
    volunteer_id: i64,
    now: i64,
) -> Result<Application, ServerError> {
    let tx = db::write_tx(conn)?;
    let job = db_jobs::get_job(&tx, job_id)?;
    let volunteer = db_users::find_user(&tx, volunteer_id)?
        .ok_or_else(|| ServerError::NotFound(format!("volunteer {volunteer_id}")))?;
    if volunteer.role != Role::Volunteer {
        return Err(ServerError::BadRequest("only volunteers can apply to jobs".into()));
    }
    if job.status != JobStatus::Open || job.is_assigned() {
        return Err(ServerError::InvalidState(format!(
            "job {job_id} is not open for applications"
        )));
    }
    if db_apps::find_for_pair(&tx, job_id, volunteer_id)?.is_some() {
        return Err(ServerError::DuplicateApplication);
    }

    let id = db_apps::insert_application(&tx, job_id, volunteer_id, now)?;
    let application = db_apps::get_application(&tx, id)?;
    db::commit(tx)?;

    info!(application_id = id, job_id, volunteer_id, "application submitted");
    Ok(application)
}

/// Withdraws a pending application. The row is deleted, so the volunteer
/// may apply again while the job stays open.
pub fn cancel(conn: &mut Connection, job_id: i64, volunteer_id: i64) -> Result<(), ServerError> {
    let tx = db::write_tx(conn)?;
    let Some(application) = db_apps::find_for_pair(&tx, job_id, volunteer_id)? else {
        return Err(ServerError::NotFound(format!(
            "application of volunteer {volunteer_id} for job {job_id}"
        )));
    };
    if application.status != ApplicationStatus::Pending {
        return Err(ServerError::InvalidState(format!(
            "application {} is {} and cannot be cancelled",
            application.id,
            application.status.as_str()
        )));
    }
    if db_apps::delete_if_pending(&tx, application.id)? != 1 {
        return Err(ServerError::InvalidState(format!(
            "application {} changed concurrently",
            application.id
        )));
    }
    db::commit(tx)?;

    info!(application_id = application.id, job_id, volunteer_id, "application cancelled");
    Ok(())
}

pub fn list_for_job(
    conn: &Connection,
    job_id: i64,
    status: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationWithVolunteer>, ServerError> {
    db_jobs::get_job(conn, job_id)?;
    db_apps::list_for_job(conn, job_id, status)
}

pub fn list_for_volunteer(
    conn: &Connection,
    volunteer_id: i64,
) -> Result<Vec<VolunteerApplication>, ServerError> {
    db_users::get_user(conn, volunteer_id)?;
    db_apps::list_for_volunteer(conn, volunteer_id)
}
