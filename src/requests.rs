// src/requests.rs
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use astra::Request;
use serde::de::DeserializeOwned;

use crate::errors::ServerError;

const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Parse the request body as JSON.
pub fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, ServerError> {
    let bytes = read_body(req)?;
    parse_json(&bytes)
}

/// Like `read_json`, but an empty body yields `T::default()`.
pub fn read_json_or_default<T: DeserializeOwned + Default>(req: Request) -> Result<T, ServerError> {
    let bytes = read_body(req)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_json(&bytes)
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ServerError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))
}

fn read_body(req: Request) -> Result<Vec<u8>, ServerError> {
    let mut body = req.into_body();
    let mut buf = Vec::new();
    body.reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("failed to read body: {e}")))?;
    if buf.len() as u64 > MAX_BODY_BYTES {
        return Err(ServerError::BadRequest("request body too large".into()));
    }
    Ok(buf)
}

/// Decoded query string. Later duplicates win.
pub fn query_params(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// A typed query parameter; absent or empty means `None`.
pub fn query_value<T>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, ServerError>
where
    T: FromStr,
{
    match params.get(key).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("invalid {key}: {raw:?}"))),
    }
}

pub fn parse_id(segment: &str) -> Result<i64, ServerError> {
    segment
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid id: {segment:?}")))
}

/// The token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &Request) -> Result<String, ServerError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::Unauthorized("missing bearer token".into()))?;

    match header.split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim().to_string())
        }
        _ => Err(ServerError::Unauthorized("malformed authorization header".into())),
    }
}
