// src/services/identity.rs
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password, DEFAULT_COST};
use crate::auth::sessions;
use crate::db::{jobs as db_jobs, users as db_users};
use crate::domain::rating::Review;
use crate::domain::user::{NewUser, ProfileUpdate, Role, UserProfile};
use crate::errors::ServerError;

pub const DEMO_NATIONAL_ID: &str = "1234567890123";
pub const DEMO_PASSWORD: &str = "password";
const DEMO_RATING: f64 = 4.8;
const DEMO_COMPLETED_JOBS: i64 = 12;

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Lifetime of a login session in seconds.
    pub session_ttl_secs: i64,
    /// bcrypt cost for new password hashes.
    pub password_cost: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 7 * 24 * 60 * 60,
            password_cost: DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub national_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Raw session token. Only its hash is stored.
    pub token: String,
    pub user: UserProfile,
}

pub struct IdentityService {
    cfg: IdentityConfig,
}

impl IdentityService {
    pub fn new(cfg: IdentityConfig) -> Self {
        Self { cfg }
    }

    pub fn register(
        &self,
        conn: &Connection,
        user: NewUser,
        now: i64,
    ) -> Result<UserProfile, ServerError> {
        let user = user.normalized()?;
        let password_hash = hash_password(&user.password, self.cfg.password_cost)?;
        let id = db_users::insert_user(conn, &user, &password_hash, now)?;

        info!(user_id = id, role = user.role.as_str(), "user registered");
        db_users::get_user(conn, id)
    }

    /// Unknown national id and wrong password fail the same way.
    pub fn login(
        &self,
        conn: &Connection,
        req: &LoginRequest,
        now: i64,
    ) -> Result<LoginResponse, ServerError> {
        let Some((user, stored)) = db_users::find_credentials(conn, req.national_id.trim())? else {
            return Err(ServerError::InvalidCredentials);
        };
        if !verify_password(&req.password, &stored) {
            return Err(ServerError::InvalidCredentials);
        }

        let token = sessions::create_session(conn, user.id, now, self.cfg.session_ttl_secs)?;
        info!(user_id = user.id, "user logged in");
        Ok(LoginResponse { token, user })
    }

    pub fn get_profile(&self, conn: &Connection, id: i64) -> Result<UserProfile, ServerError> {
        db_users::get_user(conn, id)
    }

    /// Fields belonging to the other role are ignored.
    pub fn update_profile(
        &self,
        conn: &Connection,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<UserProfile, ServerError> {
        let current = db_users::get_user(conn, id)?;
        let update = update.for_role(current.role)?;
        db_users::update_profile(conn, id, &update)?;
        db_users::get_user(conn, id)
    }

    pub fn list_reviews(
        &self,
        conn: &Connection,
        volunteer_id: i64,
    ) -> Result<Vec<Review>, ServerError> {
        db_users::get_user(conn, volunteer_id)?;
        db_jobs::list_reviews(conn, volunteer_id)
    }

    /// Resolves a bearer token to its user.
    pub fn current_user(
        &self,
        conn: &Connection,
        token: &str,
        now: i64,
    ) -> Result<UserProfile, ServerError> {
        let Some(user_id) = sessions::load_user_from_session(conn, token, now)? else {
            return Err(ServerError::Unauthorized("invalid or expired session".into()));
        };
        db_users::get_user(conn, user_id)
    }

    /// Creates the demo volunteer account unless its national id is taken.
    /// Returns the new user id, or `None` when nothing was inserted.
    pub fn seed_demo_volunteer(
        &self,
        conn: &Connection,
        now: i64,
    ) -> Result<Option<i64>, ServerError> {
        if db_users::find_credentials(conn, DEMO_NATIONAL_ID)?.is_some() {
            return Ok(None);
        }
        let demo = NewUser {
            role: Role::Volunteer,
            first_name: "Somchai".into(),
            last_name: "Jai Dee".into(),
            national_id: DEMO_NATIONAL_ID.into(),
            phone: "081-234-5678".into(),
            password: DEMO_PASSWORD.into(),
            email: None,
            address: None,
            skills: vec![
                "wheelchair_support".into(),
                "thai_language".into(),
                "first_aid".into(),
            ],
            biography: "Seeded helper account".into(),
            disability_type: None,
            additional_needs: Vec::new(),
        }
        .normalized()?;

        let password_hash = hash_password(&demo.password, self.cfg.password_cost)?;
        let id = match db_users::insert_user(conn, &demo, &password_hash, now) {
            Ok(id) => id,
            Err(ServerError::DuplicateIdentity(_)) => {
                warn!("demo volunteer was created concurrently");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        db_users::set_stats(conn, id, DEMO_RATING, DEMO_COMPLETED_JOBS)?;

        info!(user_id = id, "demo volunteer seeded");
        Ok(Some(id))
    }

    pub fn logout(&self, conn: &Connection, token: &str, now: i64) -> Result<(), ServerError> {
        if !sessions::revoke_session(conn, token, now)? {
            return Err(ServerError::Unauthorized("invalid or expired session".into()));
        }
        Ok(())
    }
}
