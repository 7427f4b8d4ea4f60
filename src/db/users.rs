// src/db/users.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::is_unique_violation;
use crate::domain::user::{NewUser, ProfileUpdate, UserProfile};
use crate::domain::{decode_list, encode_list, timestamp};
use crate::errors::ServerError;

/// Column list for `users u`, in the order `map_user` reads them.
pub const USER_COLUMNS: &str = "u.id, u.role, u.first_name, u.last_name, u.national_id, u.phone, \
     u.email, u.address, u.skills, u.biography, u.disability_type, u.additional_needs, \
     u.rating, u.completed_jobs, u.created_at";

pub const USER_COLUMN_COUNT: usize = 15;

pub fn map_user(row: &Row<'_>, offset: usize) -> rusqlite::Result<UserProfile> {
    let skills: String = row.get(offset + 8)?;
    let needs: String = row.get(offset + 11)?;
    Ok(UserProfile {
        id: row.get(offset)?,
        role: row.get(offset + 1)?,
        first_name: row.get(offset + 2)?,
        last_name: row.get(offset + 3)?,
        national_id: row.get(offset + 4)?,
        phone: row.get(offset + 5)?,
        email: row.get(offset + 6)?,
        address: row.get(offset + 7)?,
        skills: decode_list(&skills),
        biography: row.get(offset + 9)?,
        disability_type: row.get(offset + 10)?,
        additional_needs: decode_list(&needs),
        rating: row.get(offset + 12)?,
        completed_jobs: row.get(offset + 13)?,
        created_at: timestamp(row.get(offset + 14)?),
    })
}

/// Inserts a new user with zeroed volunteer stats.
/// Fails with `DuplicateIdentity` when the national id is taken.
pub fn insert_user(
    conn: &Connection,
    user: &NewUser,
    password_hash: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into users (
            role, first_name, last_name, national_id, phone, email, address, password_hash,
            skills, biography, disability_type, additional_needs, rating, completed_jobs, created_at
        ) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?)
        "#,
        params![
            user.role,
            user.first_name,
            user.last_name,
            user.national_id,
            user.phone,
            user.email,
            user.address,
            password_hash,
            encode_list(&user.skills),
            user.biography,
            user.disability_type,
            encode_list(&user.additional_needs),
            now,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            ServerError::DuplicateIdentity(user.national_id.clone())
        } else {
            ServerError::DbError(format!("insert user failed: {e}"))
        }
    })?;

    Ok(conn.last_insert_rowid())
}

pub fn find_user(conn: &Connection, id: i64) -> Result<Option<UserProfile>, ServerError> {
    conn.query_row(
        &format!("select {USER_COLUMNS} from users u where u.id = ?"),
        params![id],
        |row| map_user(row, 0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}

pub fn get_user(conn: &Connection, id: i64) -> Result<UserProfile, ServerError> {
    find_user(conn, id)?.ok_or_else(|| ServerError::NotFound(format!("user {id}")))
}

/// Returns the profile and stored password hash for a login attempt.
pub fn find_credentials(
    conn: &Connection,
    national_id: &str,
) -> Result<Option<(UserProfile, String)>, ServerError> {
    conn.query_row(
        &format!("select {USER_COLUMNS}, u.password_hash from users u where u.national_id = ?"),
        params![national_id],
        |row| Ok((map_user(row, 0)?, row.get(USER_COLUMN_COUNT)?)),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select credentials failed: {e}")))
}

/// Applies a role-filtered partial update. For the optional text fields an
/// empty string clears the stored value.
pub fn update_profile(
    conn: &Connection,
    id: i64,
    update: &ProfileUpdate,
) -> Result<(), ServerError> {
    let skills = update.skills.as_deref().map(encode_list);
    let needs = update.additional_needs.as_deref().map(encode_list);

    conn.execute(
        r#"
        update users set
            first_name       = ifnull(?1, first_name),
            last_name        = ifnull(?2, last_name),
            phone            = ifnull(?3, phone),
            email            = case when ?4 is null then email else nullif(trim(?4), '') end,
            address          = case when ?5 is null then address else nullif(trim(?5), '') end,
            skills           = ifnull(?6, skills),
            biography        = ifnull(?7, biography),
            disability_type  = case when ?8 is null then disability_type else nullif(trim(?8), '') end,
            additional_needs = ifnull(?9, additional_needs)
        where id = ?10
        "#,
        params![
            update.first_name,
            update.last_name,
            update.phone,
            update.email,
            update.address,
            skills,
            update.biography,
            update.disability_type,
            needs,
            id,
        ],
    )
    .map_err(|e| ServerError::DbError(format!("update user failed: {e}")))?;
    Ok(())
}

/// Increments `completed_jobs` and returns the new count.
pub fn record_completion(conn: &Connection, volunteer_id: i64) -> Result<i64, ServerError> {
    let updated = conn
        .execute(
            "update users set completed_jobs = completed_jobs + 1 where id = ?",
            params![volunteer_id],
        )
        .map_err(|e| ServerError::DbError(format!("update completed_jobs failed: {e}")))?;
    if updated != 1 {
        return Err(ServerError::NotFound(format!("volunteer {volunteer_id}")));
    }
    volunteer_stats(conn, volunteer_id).map(|(_, completed)| completed)
}

/// Current `(rating, completed_jobs)` for a volunteer.
pub fn volunteer_stats(conn: &Connection, volunteer_id: i64) -> Result<(f64, i64), ServerError> {
    conn.query_row(
        "select rating, completed_jobs from users where id = ?",
        params![volunteer_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select volunteer stats failed: {e}")))?
    .ok_or_else(|| ServerError::NotFound(format!("volunteer {volunteer_id}")))
}

pub fn set_rating(conn: &Connection, volunteer_id: i64, rating: f64) -> Result<(), ServerError> {
    conn.execute(
        "update users set rating = ? where id = ?",
        params![rating, volunteer_id],
    )
    .map_err(|e| ServerError::DbError(format!("update rating failed: {e}")))?;
    Ok(())
}

/// Overwrites both volunteer stats at once.
pub fn set_stats(
    conn: &Connection,
    volunteer_id: i64,
    rating: f64,
    completed_jobs: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "update users set rating = ?, completed_jobs = ? where id = ?",
        params![rating, completed_jobs, volunteer_id],
    )
    .map_err(|e| ServerError::DbError(format!("update volunteer stats failed: {e}")))?;
    Ok(())
}
