use std::time::Instant;

use astra::{Request, Response};
use tracing::{error, info, warn};

use crate::errors::ServerError;
use crate::handlers::{applications, auth, jobs, users};
use crate::requests::parse_id;
use crate::responses::{error_to_response, ResultResp};
use crate::state::AppState;

/// Entry point for the server loop: routes, converts errors and logs.
pub fn respond(req: Request, state: &AppState) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let resp = handle(req, state).unwrap_or_else(|err| {
        if err.is_server_side() {
            error!(%method, %path, error = %err, "request failed");
        } else {
            warn!(%method, %path, error = %err, "request rejected");
        }
        error_to_response(&err)
    });

    info!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}

/// Every route is also served under `/api`.
pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let segments = match segments.as_slice() {
        ["api", rest @ ..] => rest,
        all => all,
    };

    match (method.as_str(), segments) {
        // Identity
        ("POST", ["register"] | ["auth", "register"]) => auth::register(req, state),
        ("POST", ["login"] | ["auth", "login"]) => auth::login(req, state),
        ("POST", ["logout"] | ["auth", "logout"]) => auth::logout(&req, state),
        ("GET", ["me"] | ["auth", "me"]) => auth::me(&req, state),

        // Users
        ("GET", ["users", id]) => users::get_user(parse_id(id)?, state),
        ("PUT", ["users", id]) => users::update_user(parse_id(id)?, req, state),
        ("GET", ["volunteers", id, "reviews"]) => users::list_reviews(parse_id(id)?, state),
        ("GET", ["volunteers", id, "applications"]) => {
            users::list_volunteer_applications(parse_id(id)?, state)
        }
        ("GET", ["requesters", id, "jobs"]) => users::list_requester_jobs(parse_id(id)?, state),

        // Jobs
        ("GET", ["jobs"]) => jobs::list_jobs(&req, state),
        ("POST", ["jobs"]) => jobs::create_job(req, state),
        ("GET", ["jobs", id]) => jobs::get_job(parse_id(id)?, &req, state),
        ("PUT", ["jobs", id]) => jobs::update_job(parse_id(id)?, req, state),
        ("DELETE", ["jobs", id]) => jobs::delete_job(parse_id(id)?, state),
        ("POST", ["jobs", id, "complete"]) => jobs::complete_job(parse_id(id)?, req, state),
        ("POST", ["jobs", id, "rating"]) => jobs::rate_job(parse_id(id)?, req, state),

        // Applications
        ("GET", ["jobs", id, "applications"]) => {
            applications::list_for_job(parse_id(id)?, &req, state)
        }
        ("POST", ["jobs", id, "applications"] | ["jobs", id, "apply"]) => {
            applications::apply(parse_id(id)?, req, state)
        }
        ("POST", ["jobs", id, "cancel"]) => applications::cancel(parse_id(id)?, req, state),
        ("POST", ["applications", id, "accept"]) => applications::accept(parse_id(id)?, state),
        ("POST", ["applications", id, "reject"]) => applications::reject(parse_id(id)?, state),

        _ => Err(ServerError::NotFound(format!("route {method} {path}"))),
    }
}
