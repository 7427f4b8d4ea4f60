// src/domain/user.rs
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{normalize_set, text_column, UnknownVariant};
use crate::errors::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Volunteer,
    Requester,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Volunteer => "volunteer",
            Role::Requester => "requester",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volunteer" => Ok(Role::Volunteer),
            "requester" => Ok(Role::Requester),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        text_column(value)
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Public view of a user. The password hash never leaves `db::users`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub skills: Vec<String>,
    pub biography: String,
    pub rating: f64,
    pub completed_jobs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disability_type: Option<String>,
    pub additional_needs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub disability_type: Option<String>,
    #[serde(default)]
    pub additional_needs: Vec<String>,
}

impl NewUser {
    /// Trims required fields, rejects blanks and clears the fields that do
    /// not belong to the chosen role.
    pub fn normalized(mut self) -> Result<Self, ServerError> {
        for (name, value) in [
            ("firstName", &mut self.first_name),
            ("lastName", &mut self.last_name),
            ("nationalId", &mut self.national_id),
            ("phone", &mut self.phone),
        ] {
            *value = value.trim().to_string();
            if value.is_empty() {
                return Err(ServerError::BadRequest(format!("{name} is required")));
            }
        }
        if self.password.is_empty() {
            return Err(ServerError::BadRequest("password is required".into()));
        }

        self.email = super::non_blank(self.email);
        self.address = super::non_blank(self.address);

        match self.role {
            Role::Volunteer => {
                self.skills = normalize_set(self.skills);
                self.biography = self.biography.trim().to_string();
                self.disability_type = None;
                self.additional_needs = Vec::new();
            }
            Role::Requester => {
                self.skills = Vec::new();
                self.biography = String::new();
                self.disability_type = super::non_blank(self.disability_type);
                self.additional_needs = normalize_set(self.additional_needs);
            }
        }
        Ok(self)
    }
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub skills: Option<Vec<String>>,
    pub biography: Option<String>,
    pub disability_type: Option<String>,
    pub additional_needs: Option<Vec<String>>,
}

impl ProfileUpdate {
    /// Drops fields that belong to the other role and normalizes the rest.
    pub fn for_role(mut self, role: Role) -> Result<Self, ServerError> {
        for (name, value) in [
            ("firstName", &mut self.first_name),
            ("lastName", &mut self.last_name),
            ("phone", &mut self.phone),
        ] {
            if let Some(v) = value {
                *v = v.trim().to_string();
                if v.is_empty() {
                    return Err(ServerError::BadRequest(format!("{name} cannot be blank")));
                }
            }
        }

        match role {
            Role::Volunteer => {
                self.disability_type = None;
                self.additional_needs = None;
                self.skills = self.skills.map(normalize_set);
            }
            Role::Requester => {
                self.skills = None;
                self.biography = None;
                self.additional_needs = self.additional_needs.map(normalize_set);
            }
        }
        Ok(self)
    }
}
