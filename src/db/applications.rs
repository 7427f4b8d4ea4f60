// src/db/applications.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::is_unique_violation;
use crate::db::jobs::{map_job, JOB_COLUMNS, JOB_COLUMN_COUNT};
use crate::db::users::{map_user, USER_COLUMNS};
use crate::domain::application::{
    Application, ApplicationStatus, ApplicationWithVolunteer, VolunteerApplication,
};
use crate::domain::job::JobView;
use crate::domain::timestamp;
use crate::errors::ServerError;

pub const APPLICATION_COLUMNS: &str =
    "a.id, a.job_id, a.volunteer_id, a.status, a.created_at, a.updated_at";

pub const APPLICATION_COLUMN_COUNT: usize = 6;

pub fn map_application(row: &Row<'_>, offset: usize) -> rusqlite::Result<Application> {
    Ok(Application {
        id: row.get(offset)?,
        job_id: row.get(offset + 1)?,
        volunteer_id: row.get(offset + 2)?,
        status: row.get(offset + 3)?,
        created_at: timestamp(row.get(offset + 4)?),
        updated_at: timestamp(row.get(offset + 5)?),
    })
}

/// Inserts a pending application. The (job, volunteer) pair is unique.
pub fn insert_application(
    conn: &Connection,
    job_id: i64,
    volunteer_id: i64,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into applications (job_id, volunteer_id, status, created_at, updated_at)
        values (?, ?, 'pending', ?, ?)
        "#,
        params![job_id, volunteer_id, now, now],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            ServerError::DuplicateApplication
        } else {
            ServerError::DbError(format!("insert application failed: {e}"))
        }
    })?;

    Ok(conn.last_insert_rowid())
}

pub fn find_application(conn: &Connection, id: i64) -> Result<Option<Application>, ServerError> {
    conn.query_row(
        &format!("select {APPLICATION_COLUMNS} from applications a where a.id = ?"),
        params![id],
        |row| map_application(row, 0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select application failed: {e}")))
}

pub fn get_application(conn: &Connection, id: i64) -> Result<Application, ServerError> {
    find_application(conn, id)?.ok_or_else(|| ServerError::NotFound(format!("application {id}")))
}

pub fn find_for_pair(
    conn: &Connection,
    job_id: i64,
    volunteer_id: i64,
) -> Result<Option<Application>, ServerError> {
    conn.query_row(
        &format!(
            "select {APPLICATION_COLUMNS} from applications a where a.job_id = ? and a.volunteer_id = ?"
        ),
        params![job_id, volunteer_id],
        |row| map_application(row, 0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select application failed: {e}")))
}

/// Applications for one job joined with the volunteer, oldest first.
pub fn list_for_job(
    conn: &Connection,
    job_id: i64,
    status: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationWithVolunteer>, ServerError> {
    let sql = format!(
        r#"
        select {APPLICATION_COLUMNS}, {USER_COLUMNS}
        from applications a
        join users u on u.id = a.volunteer_id
        where a.job_id = ?1 and (?2 is null or a.status = ?2)
        order by a.created_at asc, a.id asc
        "#
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare applications failed: {e}")))?;

    let rows = stmt
        .query_map(params![job_id, status], |row| {
            Ok(ApplicationWithVolunteer {
                application: map_application(row, 0)?,
                volunteer: map_user(row, APPLICATION_COLUMN_COUNT)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("query applications failed: {e}")))?;

    let mut items = Vec::new();
    for r in rows {
        items.push(r.map_err(|e| ServerError::DbError(format!("read application failed: {e}")))?);
    }
    Ok(items)
}

/// A volunteer's applications joined with their jobs, newest first.
pub fn list_for_volunteer(
    conn: &Connection,
    volunteer_id: i64,
) -> Result<Vec<VolunteerApplication>, ServerError> {
    let sql = format!(
        r#"
        select {APPLICATION_COLUMNS}, {JOB_COLUMNS}, r.disability_type
        from applications a
        join jobs j on j.id = a.job_id
        join users r on r.id = j.requester_id
        where a.volunteer_id = ?
        order by a.created_at desc, a.id desc
        "#
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare volunteer applications failed: {e}")))?;

    let rows = stmt
        .query_map(params![volunteer_id], |row| {
            let application = map_application(row, 0)?;
            let status = application.status;
            Ok(VolunteerApplication {
                application,
                job: JobView {
                    job: map_job(row, APPLICATION_COLUMN_COUNT)?,
                    accepted_volunteer_name: None,
                    requester_disability_type: row
                        .get(APPLICATION_COLUMN_COUNT + JOB_COLUMN_COUNT)?,
                    application_status: Some(status),
                },
            })
        })
        .map_err(|e| ServerError::DbError(format!("query volunteer applications failed: {e}")))?;

    let mut items = Vec::new();
    for r in rows {
        items.push(r.map_err(|e| ServerError::DbError(format!("read application failed: {e}")))?);
    }
    Ok(items)
}

/// Moves one application from `from` to `to`. Returns rows changed, so a
/// caller that lost a race sees 0.
pub fn transition(
    conn: &Connection,
    id: i64,
    from: ApplicationStatus,
    to: ApplicationStatus,
    now: i64,
) -> Result<usize, ServerError> {
    conn.execute(
        "update applications set status = ?, updated_at = ? where id = ? and status = ?",
        params![to, now, id, from],
    )
    .map_err(|e| ServerError::DbError(format!("update application failed: {e}")))
}

/// Rejects every other pending application of the job.
pub fn reject_pending_siblings(
    conn: &Connection,
    job_id: i64,
    accepted_id: i64,
    now: i64,
) -> Result<usize, ServerError> {
    conn.execute(
        r#"
        update applications set status = 'rejected', updated_at = ?
        where job_id = ? and id <> ? and status = 'pending'
        "#,
        params![now, job_id, accepted_id],
    )
    .map_err(|e| ServerError::DbError(format!("reject applications failed: {e}")))
}

/// Marks the accepted application of the job's volunteer completed.
pub fn complete_accepted(
    conn: &Connection,
    job_id: i64,
    volunteer_id: i64,
    now: i64,
) -> Result<usize, ServerError> {
    conn.execute(
        r#"
        update applications set status = 'completed', updated_at = ?
        where job_id = ? and volunteer_id = ? and status = 'accepted'
        "#,
        params![now, job_id, volunteer_id],
    )
    .map_err(|e| ServerError::DbError(format!("complete application failed: {e}")))
}

pub fn delete_if_pending(conn: &Connection, id: i64) -> Result<usize, ServerError> {
    conn.execute(
        "delete from applications where id = ? and status = 'pending'",
        params![id],
    )
    .map_err(|e| ServerError::DbError(format!("delete application failed: {e}")))
}

pub fn delete_for_job(conn: &Connection, job_id: i64) -> Result<usize, ServerError> {
    conn.execute("delete from applications where job_id = ?", params![job_id])
        .map_err(|e| ServerError::DbError(format!("delete job applications failed: {e}")))
}

#[cfg(test)]
pub fn count_with_status(
    conn: &Connection,
    job_id: i64,
    status: ApplicationStatus,
) -> Result<i64, ServerError> {
    conn.query_row(
        "select count(*) from applications where job_id = ? and status = ?",
        params![job_id, status],
        |r| r.get(0),
    )
    .map_err(|e| ServerError::DbError(format!("count applications failed: {e}")))
}
