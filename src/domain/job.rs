// src/domain/job.rs
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::application::ApplicationStatus;
use super::{geo, non_blank, text_column, UnknownVariant};
use crate::errors::ServerError;

/// Jobs only move forward: open -> in_progress -> completed.
/// `Cancelled` is reserved; no transition produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for JobStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(JobStatus::Open),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(UnknownVariant {
                kind: "job status",
                value: other.to_string(),
            }),
        }
    }
}

impl FromSql for JobStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

impl ToSql for JobStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub requester_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub location: String,
    pub distance_km: f64,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_volunteer_id: Option<i64>,
    pub description: String,
    pub meeting_point: String,
    pub requirements: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_name: String,
    pub contact_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_assigned(&self) -> bool {
        self.accepted_volunteer_id.is_some()
    }
}

/// A job plus the joined, caller-dependent annotations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_volunteer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_disability_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_status: Option<ApplicationStatus>,
}

impl JobView {
    /// Replaces the stored distance with the distance from `origin`.
    pub fn with_distance_from(mut self, origin: Option<(f64, f64)>) -> Self {
        if let Some((lat, lon)) = origin {
            let km = geo::haversine_km(lat, lon, self.job.latitude, self.job.longitude);
            self.job.distance_km = (km * 10.0).round() / 10.0;
        }
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub requester_id: i64,
    pub title: String,
    pub location: String,
    pub meeting_point: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub work_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl NewJob {
    pub fn normalized(mut self) -> Result<Self, ServerError> {
        for (name, value) in [
            ("title", &mut self.title),
            ("location", &mut self.location),
            ("meetingPoint", &mut self.meeting_point),
            ("description", &mut self.description),
        ] {
            *value = value.trim().to_string();
            if value.is_empty() {
                return Err(ServerError::BadRequest(format!("{name} is required")));
            }
        }
        geo::validate_coordinates(self.latitude, self.longitude)?;

        self.requirements = self
            .requirements
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        self.work_date = non_blank(self.work_date);
        self.start_time = non_blank(self.start_time);
        self.end_time = non_blank(self.end_time);
        Ok(self)
    }
}

/// Partial job edit. For the schedule fields an empty string clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub title: Option<String>,
    pub work_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub meeting_point: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl JobUpdate {
    pub fn normalized(mut self, current: &Job) -> Result<Self, ServerError> {
        for (name, value) in [
            ("title", &mut self.title),
            ("location", &mut self.location),
            ("meetingPoint", &mut self.meeting_point),
            ("description", &mut self.description),
        ] {
            if let Some(v) = value {
                *v = v.trim().to_string();
                if v.is_empty() {
                    return Err(ServerError::BadRequest(format!("{name} cannot be blank")));
                }
            }
        }
        if self.latitude.is_some() || self.longitude.is_some() {
            geo::validate_coordinates(
                self.latitude.unwrap_or(current.latitude),
                self.longitude.unwrap_or(current.longitude),
            )?;
        }
        self.requirements = self.requirements.map(|reqs| {
            reqs.into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect()
        });
        Ok(self)
    }
}
