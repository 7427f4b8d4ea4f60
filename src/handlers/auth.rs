// src/handlers/auth.rs
use astra::Request;

use crate::domain::user::NewUser;
use crate::handlers::now;
use crate::requests::{bearer_token, read_json};
use crate::responses::{json_response, no_content, ResultResp};
use crate::services::identity::LoginRequest;
use crate::state::AppState;

pub fn register(req: Request, state: &AppState) -> ResultResp {
    let user: NewUser = read_json(req)?;
    let profile = state
        .db
        .with_conn(|conn| state.identity.register(conn, user, now()))?;
    json_response(201, &profile)
}

pub fn login(req: Request, state: &AppState) -> ResultResp {
    let login: LoginRequest = read_json(req)?;
    let resp = state
        .db
        .with_conn(|conn| state.identity.login(conn, &login, now()))?;
    json_response(200, &resp)
}

pub fn me(req: &Request, state: &AppState) -> ResultResp {
    let token = bearer_token(req)?;
    let user = state
        .db
        .with_conn(|conn| state.identity.current_user(conn, &token, now()))?;
    json_response(200, &user)
}

pub fn logout(req: &Request, state: &AppState) -> ResultResp {
    let token = bearer_token(req)?;
    state
        .db
        .with_conn(|conn| state.identity.logout(conn, &token, now()))?;
    no_content()
}
