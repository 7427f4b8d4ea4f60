// src/db/jobs.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::job::{Job, JobUpdate, JobView, NewJob};
use crate::domain::rating::Review;
use crate::domain::{decode_list, encode_list, timestamp};
use crate::errors::ServerError;

/// Column list for `jobs j`, in the order `map_job` reads them.
pub const JOB_COLUMNS: &str = "j.id, j.requester_id, j.title, j.work_date, j.start_time, j.end_time, \
     j.location, j.distance_km, j.status, j.accepted_volunteer_id, j.description, j.meeting_point, \
     j.requirements, j.latitude, j.longitude, j.contact_name, j.contact_number, \
     j.requester_rating, j.requester_review, j.created_at, j.updated_at, j.completed_at";

pub const JOB_COLUMN_COUNT: usize = 22;

pub fn map_job(row: &Row<'_>, offset: usize) -> rusqlite::Result<Job> {
    let requirements: String = row.get(offset + 12)?;
    let completed_at: Option<i64> = row.get(offset + 21)?;
    Ok(Job {
        id: row.get(offset)?,
        requester_id: row.get(offset + 1)?,
        title: row.get(offset + 2)?,
        work_date: row.get(offset + 3)?,
        start_time: row.get(offset + 4)?,
        end_time: row.get(offset + 5)?,
        location: row.get(offset + 6)?,
        distance_km: row.get(offset + 7)?,
        status: row.get(offset + 8)?,
        accepted_volunteer_id: row.get(offset + 9)?,
        description: row.get(offset + 10)?,
        meeting_point: row.get(offset + 11)?,
        requirements: decode_list(&requirements),
        latitude: row.get(offset + 13)?,
        longitude: row.get(offset + 14)?,
        contact_name: row.get(offset + 15)?,
        contact_number: row.get(offset + 16)?,
        requester_rating: row.get(offset + 17)?,
        requester_review: row.get(offset + 18)?,
        created_at: timestamp(row.get(offset + 19)?),
        updated_at: timestamp(row.get(offset + 20)?),
        completed_at: completed_at.map(timestamp),
    })
}

/// Filters for `list_job_views`. `volunteer_id` does not filter; it only
/// annotates each job with that volunteer's application status.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobQuery {
    pub job_id: Option<i64>,
    pub requester_id: Option<i64>,
    pub volunteer_id: Option<i64>,
}

/// Inserts an open, unassigned job. Contact details are a snapshot of the
/// requester at creation time.
pub fn insert_job(
    conn: &Connection,
    job: &NewJob,
    contact_name: &str,
    contact_number: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into jobs (
            requester_id, title, work_date, start_time, end_time, location, distance_km,
            status, description, meeting_point, requirements, latitude, longitude,
            contact_name, contact_number, created_at, updated_at
        ) values (?, ?, ?, ?, ?, ?, 0, 'open', ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            job.requester_id,
            job.title,
            job.work_date,
            job.start_time,
            job.end_time,
            job.location,
            job.description,
            job.meeting_point,
            encode_list(&job.requirements),
            job.latitude,
            job.longitude,
            contact_name,
            contact_number,
            now,
            now,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert job failed: {e}")))?;

    Ok(conn.last_insert_rowid())
}

pub fn find_job(conn: &Connection, id: i64) -> Result<Option<Job>, ServerError> {
    conn.query_row(
        &format!("select {JOB_COLUMNS} from jobs j where j.id = ?"),
        params![id],
        |row| map_job(row, 0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select job failed: {e}")))
}

pub fn get_job(conn: &Connection, id: i64) -> Result<Job, ServerError> {
    find_job(conn, id)?.ok_or_else(|| ServerError::NotFound(format!("job {id}")))
}

/// Jobs joined with requester, accepted volunteer and (optionally) one
/// volunteer's application. Newest first.
pub fn list_job_views(conn: &Connection, q: &JobQuery) -> Result<Vec<JobView>, ServerError> {
    let sql = format!(
        r#"
        select {JOB_COLUMNS}, r.disability_type, v.first_name, v.last_name, a.status
        from jobs j
        join users r on r.id = j.requester_id
        left join users v on v.id = j.accepted_volunteer_id
        left join applications a on a.job_id = j.id and a.volunteer_id = ?1
        where (?2 is null or j.requester_id = ?2)
          and (?3 is null or j.id = ?3)
        order by j.created_at desc, j.id desc
        "#
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(format!("prepare job list failed: {e}")))?;

    let rows = stmt
        .query_map(params![q.volunteer_id, q.requester_id, q.job_id], |row| {
            let first: Option<String> = row.get(JOB_COLUMN_COUNT + 1)?;
            let last: Option<String> = row.get(JOB_COLUMN_COUNT + 2)?;
            Ok(JobView {
                job: map_job(row, 0)?,
                requester_disability_type: row.get(JOB_COLUMN_COUNT)?,
                accepted_volunteer_name: first
                    .map(|f| format!("{f} {}", last.unwrap_or_default()).trim().to_string()),
                application_status: row.get(JOB_COLUMN_COUNT + 3)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("query job list failed: {e}")))?;

    let mut views = Vec::new();
    for r in rows {
        views.push(r.map_err(|e| ServerError::DbError(format!("read job row failed: {e}")))?);
    }
    Ok(views)
}

/// Applies a partial edit to a job that is still open and unassigned.
/// Returns the number of rows changed (0 when the guard did not hold).
pub fn update_job(
    conn: &Connection,
    id: i64,
    update: &JobUpdate,
    now: i64,
) -> Result<usize, ServerError> {
    let requirements = update.requirements.as_deref().map(encode_list);

    conn.execute(
        r#"
        update jobs set
            title         = ifnull(?1, title),
            work_date     = case when ?2 is null then work_date else nullif(trim(?2), '') end,
            start_time    = case when ?3 is null then start_time else nullif(trim(?3), '') end,
            end_time      = case when ?4 is null then end_time else nullif(trim(?4), '') end,
            location      = ifnull(?5, location),
            meeting_point = ifnull(?6, meeting_point),
            description   = ifnull(?7, description),
            requirements  = ifnull(?8, requirements),
            latitude      = ifnull(?9, latitude),
            longitude     = ifnull(?10, longitude),
            updated_at    = ?11
        where id = ?12 and status = 'open' and accepted_volunteer_id is null
        "#,
        params![
            update.title,
            update.work_date,
            update.start_time,
            update.end_time,
            update.location,
            update.meeting_point,
            update.description,
            requirements,
            update.latitude,
            update.longitude,
            now,
            id,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("update job failed: {e}")))
}

pub fn delete_job(conn: &Connection, id: i64) -> Result<usize, ServerError> {
    conn.execute("delete from jobs where id = ?", params![id])
        .map_err(|e| ServerError::DbError(format!("delete job failed: {e}")))
}

/// Sets the accepted volunteer once; an open job moves to in_progress.
pub fn assign_volunteer(
    conn: &Connection,
    job_id: i64,
    volunteer_id: i64,
    now: i64,
) -> Result<usize, ServerError> {
    conn.execute(
        r#"
        update jobs set
            accepted_volunteer_id = ?1,
            status = case when status = 'open' then 'in_progress' else status end,
            updated_at = ?2
        where id = ?3 and accepted_volunteer_id is null
        "#,
        params![volunteer_id, now, job_id],
    )
    .map_err(|e| ServerError::DbError(format!("assign volunteer failed: {e}")))
}

pub fn mark_completed(conn: &Connection, job_id: i64, now: i64) -> Result<usize, ServerError> {
    conn.execute(
        r#"
        update jobs set status = 'completed', completed_at = ?1, updated_at = ?1
        where id = ?2 and status <> 'completed' and accepted_volunteer_id is not null
        "#,
        params![now, job_id],
    )
    .map_err(|e| ServerError::DbError(format!("complete job failed: {e}")))
}

/// Stores the requester's feedback once, on a completed job.
pub fn record_rating(
    conn: &Connection,
    job_id: i64,
    rating: f64,
    review: Option<&str>,
    now: i64,
) -> Result<usize, ServerError> {
    conn.execute(
        r#"
        update jobs set requester_rating = ?1, requester_review = ?2, rated_at = ?3, updated_at = ?3
        where id = ?4 and status = 'completed' and requester_rating is null
        "#,
        params![rating, review, now, job_id],
    )
    .map_err(|e| ServerError::DbError(format!("record rating failed: {e}")))
}

/// Reviews left on jobs completed by this volunteer, most recently
/// completed first.
pub fn list_reviews(conn: &Connection, volunteer_id: i64) -> Result<Vec<Review>, ServerError> {
    let mut stmt = conn
        .prepare(
            r#"
            select j.id, j.title, j.requester_rating, j.requester_review,
                   r.first_name, r.last_name, j.rated_at
            from jobs j
            join users r on r.id = j.requester_id
            where j.accepted_volunteer_id = ?
              and j.status = 'completed'
              and j.requester_review is not null
            order by j.completed_at desc, j.id desc
            "#,
        )
        .map_err(|e| ServerError::DbError(format!("prepare reviews failed: {e}")))?;

    let rows = stmt
        .query_map(params![volunteer_id], |row| {
            let first: String = row.get(4)?;
            let last: String = row.get(5)?;
            let rated_at: Option<i64> = row.get(6)?;
            Ok(Review {
                job_id: row.get(0)?,
                job_title: row.get(1)?,
                rating: row.get::<_, Option<f64>>(2)?.unwrap_or_default(),
                review: row.get(3)?,
                requester_name: format!("{first} {last}").trim().to_string(),
                created_at: timestamp(rated_at.unwrap_or_default()),
            })
        })
        .map_err(|e| ServerError::DbError(format!("query reviews failed: {e}")))?;

    let mut reviews = Vec::new();
    for r in rows {
        reviews.push(r.map_err(|e| ServerError::DbError(format!("read review failed: {e}")))?);
    }
    Ok(reviews)
}
