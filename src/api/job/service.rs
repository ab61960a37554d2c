use actix_web::{HttpResponse, ResponseError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::api::validation::ErrorResponse;
use crate::auth::UserId;
use crate::db::{JobFilter, JobRepository, RepositoryError};
use super::dto::JobSummary;
use super::models::{JobPatch, JobQuery, JobRecord, JobStatus, NewJob};

/// Message shared by every not-found outcome, owned or not
const NOT_FOUND_MESSAGE: &str = "Job not found";

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client input failed the required-field rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// No record matches both the id and the caller
    #[error("Job not found")]
    NotFound,

    /// Persistence failed
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Repository(e) => {
                error!("Repository error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Internal server error"}),
                })
            }
            ServiceError::Validation(msg) => {
                warn!("Validation error: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
            ServiceError::NotFound => HttpResponse::NotFound().json(ErrorResponse {
                error: "Not found".to_string(),
                fields: serde_json::json!({"message": NOT_FOUND_MESSAGE}),
            }),
        }
    }
}

/// Flatten validator output into one message, ordered by field name
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Job service containing business logic
///
/// Every repository call goes through a filter scoped to the caller, so
/// records owned by someone else behave exactly like missing ones.
pub struct JobService {
    repository: Arc<dyn JobRepository>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        Self { repository }
    }

    /// Create a job owned by `owner`
    ///
    /// # Business Logic
    /// - Requires non-blank company and role
    /// - Status defaults to Applied
    /// - The owner always comes from the resolved identity
    ///
    /// # Returns
    /// - `Ok(JobRecord)` - Job created with its generated id and timestamps
    /// - `Err(ServiceError)` - Validation or persistence failed
    pub async fn create(&self, owner: &UserId, job: NewJob) -> Result<JobRecord, ServiceError> {
        job.validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        info!("Service: Creating job for owner={} company={}", owner, job.company.trim());

        let record = self.repository.insert(job.into_draft(owner.clone())).await?;

        info!("Service: Job created successfully with id={}", record.id);
        Ok(record)
    }

    /// List the caller's jobs, newest first
    ///
    /// Status values outside the fixed set leave the status filter off; blank
    /// company/search values are ignored.
    pub async fn list(&self, owner: &UserId, query: &JobQuery) -> Result<Vec<JobRecord>, ServiceError> {
        let mut filter = JobFilter::owned_by(owner.clone());

        if let Some(status) = query.status.as_deref().and_then(|s| s.parse::<JobStatus>().ok()) {
            filter = filter.with_status(status);
        }
        if let Some(company) = non_blank(query.company.as_deref()) {
            filter = filter.with_company(company);
        }
        if let Some(search) = non_blank(query.search.as_deref()) {
            filter = filter.with_search(search);
        }

        let jobs = self.repository.find_many(&filter).await?;
        info!("Service: Listed {} jobs for owner={}", jobs.len(), owner);
        Ok(jobs)
    }

    pub async fn get_one(&self, owner: &UserId, id: Uuid) -> Result<JobRecord, ServiceError> {
        let filter = JobFilter::owned_by(owner.clone()).with_id(id);

        self.repository
            .find_one(&filter)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Replace only the fields present in `patch`
    ///
    /// `company` and `role`, when present, must still be non-blank.
    pub async fn update(&self, owner: &UserId, id: Uuid, patch: JobPatch) -> Result<JobRecord, ServiceError> {
        patch
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(&e)))?;

        let filter = JobFilter::owned_by(owner.clone()).with_id(id);
        let record = self
            .repository
            .update_one(&filter, &patch.into_changes())
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!("Service: Job updated id={} owner={}", id, owner);
        Ok(record)
    }

    /// Permanently remove a job
    pub async fn delete(&self, owner: &UserId, id: Uuid) -> Result<(), ServiceError> {
        let filter = JobFilter::owned_by(owner.clone()).with_id(id);

        if !self.repository.delete_one(&filter).await? {
            return Err(ServiceError::NotFound);
        }

        info!("Service: Job deleted id={} owner={}", id, owner);
        Ok(())
    }

    /// Status counts over all of the caller's jobs
    pub async fn summary(&self, owner: &UserId) -> Result<JobSummary, ServiceError> {
        let jobs = self
            .repository
            .find_many(&JobFilter::owned_by(owner.clone()))
            .await?;

        Ok(JobSummary::from_records(&jobs))
    }

    pub async fn health(&self) -> Result<(), RepositoryError> {
        self.repository.ping().await
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::Salary;
    use crate::db::MemoryJobRepository;
    use async_trait::async_trait;
    use serde_json::json;

    fn service() -> JobService {
        JobService::new(Arc::new(MemoryJobRepository::new()))
    }

    fn new_job(value: serde_json::Value) -> NewJob {
        serde_json::from_value(value).unwrap()
    }

    fn patch(value: serde_json::Value) -> JobPatch {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_requires_company_and_role() {
        let svc = service();
        let owner = UserId::new("alice");

        let err = svc
            .create(&owner, new_job(json!({"company": "", "role": "X"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("Company")));

        let err = svc
            .create(&owner, new_job(json!({"company": "X", "role": "  "})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("Role")));

        let job = svc
            .create(&owner, new_job(json!({"company": "X", "role": "Y"})))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Applied);
        assert_eq!(job.owner_id, owner);
    }

    #[tokio::test]
    async fn create_ignores_owner_in_payload() {
        let svc = service();
        let owner = UserId::new("alice");

        let job = svc
            .create(
                &owner,
                new_job(json!({"company": "X", "role": "Y", "ownerId": "mallory"})),
            )
            .await
            .unwrap();
        assert_eq!(job.owner_id, owner);
    }

    #[tokio::test]
    async fn records_are_invisible_to_other_owners() {
        let svc = service();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        let job = svc
            .create(&alice, new_job(json!({"company": "Acme", "role": "Dev"})))
            .await
            .unwrap();

        assert!(matches!(svc.get_one(&bob, job.id).await, Err(ServiceError::NotFound)));
        assert!(matches!(
            svc.update(&bob, job.id, patch(json!({"company": "Evil"}))).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(svc.delete(&bob, job.id).await, Err(ServiceError::NotFound)));
        assert!(svc.list(&bob, &JobQuery::default()).await.unwrap().is_empty());

        // Untouched for the owner
        let stored = svc.get_one(&alice, job.id).await.unwrap();
        assert_eq!(stored, job);
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let svc = service();
        let owner = UserId::new("alice");

        for company in ["t1", "t2", "t3"] {
            svc.create(&owner, new_job(json!({"company": company, "role": "Dev"})))
                .await
                .unwrap();
        }

        let jobs = svc.list(&owner, &JobQuery::default()).await.unwrap();
        let companies: Vec<&str> = jobs.iter().map(|j| j.company.as_str()).collect();
        assert_eq!(companies, ["t3", "t2", "t1"]);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_company() {
        let svc = service();
        let owner = UserId::new("alice");

        svc.create(&owner, new_job(json!({"company": "Google", "role": "SRE"})))
            .await
            .unwrap();
        svc.create(
            &owner,
            new_job(json!({"company": "Stripe", "role": "Backend", "status": "Interview"})),
        )
        .await
        .unwrap();

        let interviews = svc
            .list(
                &owner,
                &JobQuery {
                    status: Some("Interview".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(interviews.len(), 1);
        assert!(interviews.iter().all(|j| j.status == JobStatus::Interview));

        let google = svc
            .list(
                &owner,
                &JobQuery {
                    company: Some("goo".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(google.len(), 1);
        assert_eq!(google[0].company, "Google");

        let by_role = svc
            .list(
                &owner,
                &JobQuery {
                    search: Some("BACKEND".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_role.len(), 1);
        assert_eq!(by_role[0].company, "Stripe");
    }

    #[tokio::test]
    async fn unknown_status_filter_is_ignored() {
        let svc = service();
        let owner = UserId::new("alice");

        svc.create(&owner, new_job(json!({"company": "A", "role": "B"})))
            .await
            .unwrap();

        let all = svc
            .list(
                &owner,
                &JobQuery {
                    status: Some("All".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let svc = service();
        let owner = UserId::new("alice");

        let job = svc
            .create(
                &owner,
                new_job(json!({"company": "Acme", "role": "Dev", "status": "Interview", "salary": "100k"})),
            )
            .await
            .unwrap();

        let updated = svc
            .update(&owner, job.id, patch(json!({"notes": "x"})))
            .await
            .unwrap();

        assert_eq!(updated.notes.as_deref(), Some("x"));
        assert_eq!(updated.company, job.company);
        assert_eq!(updated.role, job.role);
        assert_eq!(updated.status, job.status);
        assert_eq!(updated.salary, Some(Salary::Text("100k".to_string())));
        assert_eq!(updated.id, job.id);
        assert_eq!(updated.created_at, job.created_at);
        assert!(updated.updated_at >= job.updated_at);
    }

    #[tokio::test]
    async fn update_cannot_reassign_protected_fields() {
        let svc = service();
        let owner = UserId::new("alice");

        let job = svc
            .create(&owner, new_job(json!({"company": "Acme", "role": "Dev"})))
            .await
            .unwrap();

        let updated = svc
            .update(
                &owner,
                job.id,
                patch(json!({
                    "id": uuid::Uuid::new_v4(),
                    "ownerId": "mallory",
                    "createdAt": "2000-01-01T00:00:00Z"
                })),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, job.id);
        assert_eq!(updated.owner_id, owner);
        assert_eq!(updated.created_at, job.created_at);
        assert!(svc.get_one(&UserId::new("mallory"), job.id).await.is_err());
    }

    #[tokio::test]
    async fn update_rejects_blank_company() {
        let svc = service();
        let owner = UserId::new("alice");

        let job = svc
            .create(&owner, new_job(json!({"company": "Acme", "role": "Dev"})))
            .await
            .unwrap();

        let err = svc
            .update(&owner, job.id, patch(json!({"company": "   "})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.get_one(&owner, job.id).await.unwrap().company, "Acme");
    }

    #[tokio::test]
    async fn deleting_missing_job_is_not_found_every_time() {
        let svc = service();
        let owner = UserId::new("alice");
        let missing = Uuid::new_v4();

        assert!(matches!(svc.delete(&owner, missing).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.delete(&owner, missing).await, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn delete_is_permanent() {
        let svc = service();
        let owner = UserId::new("alice");

        let job = svc
            .create(&owner, new_job(json!({"company": "Acme", "role": "Dev"})))
            .await
            .unwrap();

        svc.delete(&owner, job.id).await.unwrap();
        assert!(matches!(svc.get_one(&owner, job.id).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.delete(&owner, job.id).await, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn create_then_get_round_trips_client_fields() {
        let svc = service();
        let owner = UserId::new("alice");

        let created = svc
            .create(
                &owner,
                new_job(json!({
                    "company": "Acme",
                    "role": "Dev",
                    "status": "Offer",
                    "location": "Berlin",
                    "salary": 85000,
                    "dateApplied": "2024-05-01",
                    "notes": "referral",
                    "link": "https://acme.example/jobs/1"
                })),
            )
            .await
            .unwrap();

        let fetched = svc.get_one(&owner, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.location.as_deref(), Some("Berlin"));
        assert_eq!(fetched.link.as_deref(), Some("https://acme.example/jobs/1"));
        assert_eq!(fetched.date_applied.map(|d| d.to_string()).as_deref(), Some("2024-05-01"));
    }

    #[tokio::test]
    async fn summary_counts_only_the_callers_jobs() {
        let svc = service();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        for status in ["Applied", "Applied", "Interview", "Rejected"] {
            svc.create(&alice, new_job(json!({"company": "A", "role": "B", "status": status})))
                .await
                .unwrap();
        }
        svc.create(&bob, new_job(json!({"company": "A", "role": "B", "status": "Offer"})))
            .await
            .unwrap();

        let summary = svc.summary(&alice).await.unwrap();
        assert_eq!(
            summary,
            JobSummary {
                total: 4,
                applied: 2,
                interview: 1,
                offer: 0,
                rejected: 1,
            }
        );
    }

    struct FailingRepository;

    #[async_trait]
    impl JobRepository for FailingRepository {
        async fn insert(&self, _: crate::api::job::models::JobDraft) -> Result<JobRecord, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_many(&self, _: &JobFilter) -> Result<Vec<JobRecord>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_one(&self, _: &JobFilter) -> Result<Option<JobRecord>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn update_one(
            &self,
            _: &JobFilter,
            _: &crate::api::job::models::JobChanges,
        ) -> Result<Option<JobRecord>, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn delete_one(&self, _: &JobFilter) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn ping(&self) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn close(&self) {}
    }

    #[tokio::test]
    async fn repository_failures_surface_as_repository_errors() {
        let svc = JobService::new(Arc::new(FailingRepository));
        let owner = UserId::new("alice");

        let err = svc
            .create(&owner, new_job(json!({"company": "A", "role": "B"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));
        assert_eq!(err.error_response().status(), 500);

        let err = svc.get_one(&owner, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));
    }
}
