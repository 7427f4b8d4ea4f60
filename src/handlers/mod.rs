pub mod applications;
pub mod auth;
pub mod jobs;
pub mod users;

/// Current time as stored in the database.
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
