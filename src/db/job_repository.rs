use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::api::job::models::{JobChanges, JobDraft, JobRecord, JobStatus};
use crate::auth::UserId;

/// Persistence-layer failures
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a record
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Conjunctive filter over job records
///
/// The owner clause is mandatory: a filter can only be built for one owner,
/// so every lookup and mutation is owner-scoped.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFilter {
    owner_id: UserId,
    id: Option<Uuid>,
    status: Option<JobStatus>,
    company: Option<String>,
    search: Option<String>,
}

impl JobFilter {
    pub fn owned_by(owner_id: UserId) -> Self {
        Self {
            owner_id,
            id: None,
            status: None,
            company: None,
            search: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Case-insensitive substring match on company
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Case-insensitive substring match on company or role
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn status(&self) -> Option<JobStatus> {
        self.status
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Evaluate the filter against a record
    pub fn matches(&self, record: &JobRecord) -> bool {
        record.owner_id == self.owner_id
            && self.id.map_or(true, |id| record.id == id)
            && self.status.map_or(true, |status| record.status == status)
            && self
                .company
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(&record.company, needle))
            && self.search.as_deref().map_or(true, |needle| {
                contains_ignore_case(&record.company, needle)
                    || contains_ignore_case(&record.role, needle)
            })
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Generic store of job records
///
/// Holds no ownership logic of its own; callers scope every call through a
/// [`JobFilter`]. Each call is individually atomic.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Persist a new record, assigning its id and timestamps
    async fn insert(&self, draft: JobDraft) -> Result<JobRecord, RepositoryError>;

    /// All matching records, newest `created_at` first
    async fn find_many(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, RepositoryError>;

    async fn find_one(&self, filter: &JobFilter) -> Result<Option<JobRecord>, RepositoryError>;

    /// Apply `changes` to the first match and return the updated record
    async fn update_one(
        &self,
        filter: &JobFilter,
        changes: &JobChanges,
    ) -> Result<Option<JobRecord>, RepositoryError>;

    /// Remove the first match; `false` when nothing matched
    async fn delete_one(&self, filter: &JobFilter) -> Result<bool, RepositoryError>;

    /// Check the store is reachable
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Release underlying resources on shutdown
    async fn close(&self);
}
