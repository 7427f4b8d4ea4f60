// errors.rs
use std::fmt;

/// Errors originating from either the service logic
/// (routing, lifecycle rules, etc.) or downstream layers (DB).
#[derive(Debug)]
pub enum ServerError {
    NotFound(String),
    BadRequest(String),
    InvalidState(String),
    DuplicateIdentity(String),
    DuplicateApplication,
    InvalidCredentials,
    Unauthorized(String),
    DbError(String),
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound(_) => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::InvalidState(_)
            | ServerError::DuplicateIdentity(_)
            | ServerError::DuplicateApplication => 409,
            ServerError::InvalidCredentials | ServerError::Unauthorized(_) => 401,
            ServerError::DbError(_) | ServerError::InternalError => 500,
        }
    }

    pub fn is_server_side(&self) -> bool {
        self.status() >= 500
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound(what) => write!(f, "{what} not found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            ServerError::DuplicateIdentity(id) => {
                write!(f, "national id {id} is already registered")
            }
            ServerError::DuplicateApplication => {
                write!(f, "volunteer has already applied to this job")
            }
            ServerError::InvalidCredentials => write!(f, "Invalid credentials"),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}
