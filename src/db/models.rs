use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::job::models::{JobRecord, JobStatus, Salary};
use crate::auth::UserId;
use crate::db::job_repository::RepositoryError;

/// Database representation of a job application with all fields
#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub owner_id: String,
    pub company: String,
    pub role: String,
    pub status: String,
    pub location: Option<String>,
    pub salary: Option<Json<Salary>>,
    pub date_applied: Option<NaiveDate>,
    pub notes: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = RepositoryError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status: JobStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::Corrupt(format!("job {}: {}", row.id, e)))?;

        Ok(JobRecord {
            id: row.id,
            owner_id: UserId::new(row.owner_id),
            company: row.company,
            role: row.role,
            status,
            location: row.location,
            salary: row.salary.map(|Json(salary)| salary),
            date_applied: row.date_applied,
            notes: row.notes,
            link: row.link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
